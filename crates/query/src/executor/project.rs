//! Project operator.

use super::{OpResult, Operator};
use crate::context::RuntimeContext;
use crate::evaluator::Evaluator;
use alloc::boxed::Box;
use alloc::vec::Vec;
use strata_core::{Record, Result};

/// Evaluates one expression per output column for every child record.
pub struct ProjectOp<'a> {
    child: Box<dyn Operator + 'a>,
    items: Vec<Evaluator<'a>>,
    record: Record,
}

impl<'a> ProjectOp<'a> {
    /// Creates a projection of `items` over `child`.
    pub fn new(child: Box<dyn Operator + 'a>, items: Vec<Evaluator<'a>>) -> Self {
        let record = Record::new(items.len());
        Self {
            child,
            items,
            record,
        }
    }
}

impl Operator for ProjectOp<'_> {
    fn initialize(&mut self, ctx: &RuntimeContext<'_>) -> Result<()> {
        self.record = Record::new(self.items.len());
        self.child.initialize(ctx)
    }

    fn consume(&mut self, ctx: &RuntimeContext<'_>) -> Result<OpResult> {
        if self.child.consume(ctx)? == OpResult::Depleted {
            return Ok(OpResult::Depleted);
        }
        let input = self.child.record();
        for (i, item) in self.items.iter_mut().enumerate() {
            let value = item.evaluate(ctx, input)?;
            self.record.set(i, value);
        }
        Ok(OpResult::Ok)
    }

    fn reset(&mut self, complete: bool) -> Result<()> {
        self.child.reset(complete)
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn name(&self) -> &'static str {
        "Project"
    }
}
