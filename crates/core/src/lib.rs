//! Strata Core - value model for the Strata graph query engine.
//!
//! This crate provides the foundational types shared by the evaluator and operators:
//!
//! - `ScalarValue`: leaf property values (Null, Bool, integers, reals, String, temporal,
//!   spatial, vectors)
//! - `FieldData`: scalar, list or map values together with their operator semantics
//! - `Entry`: a record slot, either a constant or a graph-entity reference
//! - `Record`: one row of entries flowing between operators
//! - `Error`: the error taxonomy for evaluation and aggregation
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Entry, FieldData, Record};
//!
//! let age = FieldData::from(30i64);
//! let next = age.add(&FieldData::from(1i64)).unwrap();
//! assert_eq!(next, FieldData::from(31i64));
//!
//! let mut record = Record::new(2);
//! record.set(0, Entry::Node(7));
//! record.set(1, Entry::Constant(next));
//! assert_eq!(record.get(0).unwrap().to_string(), "V[7]");
//! ```

#![no_std]

extern crate alloc;

mod entry;
mod error;
mod field_data;
mod record;
mod value;

pub use entry::{EdgeId, Entry, NodeId};
pub use error::{Error, Result};
pub use field_data::{CmpOp, FieldData};
pub use record::Record;
pub use value::{Geometry, ScalarValue};
