//! Source operator over pre-built records.

use super::{OpResult, Operator};
use crate::context::RuntimeContext;
use alloc::vec::Vec;
use strata_core::{Record, Result};

/// Emits a fixed list of records in order.
pub struct ValuesOp {
    rows: Vec<Record>,
    cursor: usize,
    empty: Record,
}

impl ValuesOp {
    /// Creates a source over `rows`.
    pub fn new(rows: Vec<Record>) -> Self {
        Self {
            rows,
            cursor: 0,
            empty: Record::default(),
        }
    }
}

impl Operator for ValuesOp {
    fn initialize(&mut self, _ctx: &RuntimeContext<'_>) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn consume(&mut self, _ctx: &RuntimeContext<'_>) -> Result<OpResult> {
        if self.cursor >= self.rows.len() {
            return Ok(OpResult::Depleted);
        }
        self.cursor += 1;
        Ok(OpResult::Ok)
    }

    fn reset(&mut self, _complete: bool) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn record(&self) -> &Record {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .unwrap_or(&self.empty)
    }

    fn name(&self) -> &'static str {
        "Values"
    }
}
