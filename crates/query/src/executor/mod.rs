//! Pull-based operators driving the evaluator.

mod aggregate;
mod filter;
mod operator;
mod project;
mod values;

pub use aggregate::{AggregateOperator, ReturnItem};
pub use filter::FilterOp;
pub use operator::{OpResult, Operator};
pub use project::ProjectOp;
pub use values::ValuesOp;
