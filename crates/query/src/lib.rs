//! Strata Query - expression evaluation and aggregation for graph queries.
//!
//! This crate provides:
//!
//! - `ast`: Arena-allocated expression trees
//! - `symbol_table`: Variable to record-column mapping
//! - `context`: Runtime context (graph access, plugins, parameters)
//! - `functions`: Built-in scalar functions
//! - `aggregate`: Aggregate accumulators (sum, avg, count, percentiles, ...)
//! - `detector`: Aggregate detection and validation of return items
//! - `evaluator`: The expression evaluator
//! - `executor`: Pull-based operators, including the grouping operator
//! - `config`: Aggregation settings
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Entry, FieldData, Record};
//! use strata_query::ast::ExprArena;
//! use strata_query::context::{InMemoryGraph, RuntimeContext};
//! use strata_query::evaluator::Evaluator;
//! use strata_query::symbol_table::{SymbolKind, SymbolTable};
//!
//! let mut graph = InMemoryGraph::new();
//! graph.add_node(1, ["Person"], [("age", FieldData::from(30i64))]);
//!
//! let mut symbols = SymbolTable::new();
//! symbols.insert("a", SymbolKind::Node);
//!
//! let mut arena = ExprArena::new();
//! let age = arena.var_prop("a", "age");
//! let one = arena.int(1);
//! let root = arena.add(age, one);
//!
//! let ctx = RuntimeContext::new(&graph);
//! let record = Record::from_entries(vec![Entry::Node(1)]);
//! let mut eval = Evaluator::new(&arena, root, &symbols);
//! assert_eq!(eval.evaluate(&ctx, &record).unwrap(), Entry::constant(31i64));
//! ```

#![no_std]

extern crate alloc;

pub mod aggregate;
pub mod ast;
pub mod config;
pub mod context;
pub mod detector;
pub mod evaluator;
pub mod executor;
pub mod functions;
pub mod symbol_table;

pub use config::{AggregateConfig, GroupKeyMode};
pub use evaluator::Evaluator;
pub use executor::{AggregateOperator, OpResult, Operator, ReturnItem};
