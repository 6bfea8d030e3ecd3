//! Pull-based operator protocol.

use crate::context::RuntimeContext;
use strata_core::{Record, Result};

/// Outcome of one `consume` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpResult {
    /// A record is available through [`Operator::record`].
    Ok,
    /// The operator has no more records.
    Depleted,
}

/// A query operator producing one record per `consume` call.
///
/// Operators form a tree; each pulls from its children on demand. Execution is
/// single-threaded and a record is only valid until the next `consume`.
pub trait Operator {
    /// Prepares the operator and its children for consumption.
    fn initialize(&mut self, ctx: &RuntimeContext<'_>) -> Result<()>;

    /// Produces the next record.
    fn consume(&mut self, ctx: &RuntimeContext<'_>) -> Result<OpResult>;

    /// Rewinds the operator. A complete reset also drops what `initialize` set up.
    fn reset(&mut self, complete: bool) -> Result<()>;

    /// The record produced by the last successful `consume`.
    fn record(&self) -> &Record;

    /// Operator name for logs.
    fn name(&self) -> &'static str;
}
