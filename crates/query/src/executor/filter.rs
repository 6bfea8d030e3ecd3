//! Filter operator.

use super::{OpResult, Operator};
use crate::context::RuntimeContext;
use crate::evaluator::Evaluator;
use alloc::boxed::Box;
use strata_core::{FieldData, Record, Result};

/// Passes through the child's records for which the predicate is `true`.
///
/// Null and `false` both reject the row.
pub struct FilterOp<'a> {
    child: Box<dyn Operator + 'a>,
    predicate: Evaluator<'a>,
}

impl<'a> FilterOp<'a> {
    /// Creates a filter over `child`.
    pub fn new(child: Box<dyn Operator + 'a>, predicate: Evaluator<'a>) -> Self {
        Self { child, predicate }
    }
}

impl Operator for FilterOp<'_> {
    fn initialize(&mut self, ctx: &RuntimeContext<'_>) -> Result<()> {
        self.child.initialize(ctx)
    }

    fn consume(&mut self, ctx: &RuntimeContext<'_>) -> Result<OpResult> {
        while self.child.consume(ctx)? == OpResult::Ok {
            let verdict = self.predicate.evaluate(ctx, self.child.record())?;
            if verdict.as_constant().and_then(FieldData::as_bool) == Some(true) {
                return Ok(OpResult::Ok);
            }
        }
        Ok(OpResult::Depleted)
    }

    fn reset(&mut self, complete: bool) -> Result<()> {
        self.child.reset(complete)
    }

    fn record(&self) -> &Record {
        self.child.record()
    }

    fn name(&self) -> &'static str {
        "Filter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprArena;
    use crate::context::InMemoryGraph;
    use crate::executor::ValuesOp;
    use crate::symbol_table::{SymbolKind, SymbolTable};
    use alloc::vec;
    use alloc::vec::Vec;
    use strata_core::Entry;

    #[test]
    fn test_filter_keeps_true_rows_only() {
        let mut symbols = SymbolTable::new();
        symbols.insert("x", SymbolKind::Constant);
        let mut arena = ExprArena::new();
        let x = arena.var("x");
        let fifteen = arena.int(15);
        let pred = arena.gt(x, fifteen);

        let rows = [
            Entry::constant(10i64),
            Entry::constant(20i64),
            Entry::null(),
            Entry::constant(30i64),
        ]
        .into_iter()
        .map(|e| Record::from_entries(vec![e]))
        .collect();
        let graph = InMemoryGraph::new();
        let ctx = RuntimeContext::new(&graph);
        let mut op = FilterOp::new(
            Box::new(ValuesOp::new(rows)),
            Evaluator::new(&arena, pred, &symbols),
        );
        op.initialize(&ctx).unwrap();
        let mut seen = Vec::new();
        while op.consume(&ctx).unwrap() == OpResult::Ok {
            seen.push(op.record().get(0).cloned().unwrap());
        }
        assert_eq!(seen, vec![Entry::constant(20i64), Entry::constant(30i64)]);
    }
}
