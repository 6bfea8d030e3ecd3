//! Grouping / aggregate operator.
//!
//! Return items are split into group-by items (no aggregate call) and aggregated
//! items. The child is drained on the first `consume`: every row is bucketed by its
//! group-by values and fed to that group's accumulators. Afterwards each `consume`
//! hands off one group as an output record, in the order groups were first seen.

use super::{OpResult, Operator};
use crate::ast::{Expr, ExprArena, ExprId};
use crate::config::{AggregateConfig, GroupKeyMode};
use crate::context::RuntimeContext;
use crate::detector::AggregateDetector;
use crate::evaluator::Evaluator;
use crate::symbol_table::{SymbolKind, SymbolTable};
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use log::{debug, trace};
use strata_core::{Entry, Error, Record, Result};

/// One output column of the operator.
#[derive(Clone, Debug)]
pub struct ReturnItem {
    pub expr: ExprId,
    pub alias: String,
}

impl ReturnItem {
    pub fn new(expr: ExprId, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: alias.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Initialized,
    Consuming,
    Depleted,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Structured(Vec<Entry>),
    Text(String),
}

impl GroupKey {
    fn build(mode: GroupKeyMode, values: &[Entry]) -> Self {
        match mode {
            GroupKeyMode::Structured => GroupKey::Structured(values.to_vec()),
            GroupKeyMode::Text => GroupKey::Text(
                values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

struct Group<'a> {
    /// Snapshotted group-by values of the first row of the group.
    keys: Vec<Entry>,
    /// One evaluator per aggregated item.
    evaluators: Vec<Evaluator<'a>>,
    /// Most recent row of the group.
    last: Record,
}

/// Groups in first-seen order plus a lookup by key.
struct GroupTable<'a> {
    mode: GroupKeyMode,
    groups: Vec<Group<'a>>,
    index: HashMap<GroupKey, usize>,
}

impl<'a> GroupTable<'a> {
    fn new(mode: GroupKeyMode) -> Self {
        Self {
            mode,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
    }

    fn aggregate_record(
        &mut self,
        ctx: &RuntimeContext<'_>,
        group_by: &mut [(usize, Evaluator<'a>)],
        templates: &[(usize, Evaluator<'a>)],
        row: &Record,
    ) -> Result<()> {
        let mut keys = Vec::with_capacity(group_by.len());
        for (_, eval) in group_by.iter_mut() {
            keys.push(eval.evaluate(ctx, row)?.snapshot());
        }
        let key = GroupKey::build(self.mode, &keys);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                trace!("new group {:?}", key);
                let slot = self.groups.len();
                self.groups.push(Group {
                    keys,
                    evaluators: templates.iter().map(|(_, t)| t.fresh()).collect(),
                    last: row.clone(),
                });
                self.index.insert(key, slot);
                slot
            }
        };
        trace!("row routed to group {}", slot);
        let group = &mut self.groups[slot];
        for eval in group.evaluators.iter_mut() {
            eval.aggregate(ctx, row)?;
        }
        group.last.clone_from(row);
        Ok(())
    }
}

/// Groups the child's rows and evaluates aggregated return items per group.
pub struct AggregateOperator<'a> {
    child: Box<dyn Operator + 'a>,
    arena: &'a ExprArena,
    symbols: &'a SymbolTable,
    config: AggregateConfig,
    items: Vec<ReturnItem>,
    /// Output column and evaluator of each group-by item.
    group_by: Vec<(usize, Evaluator<'a>)>,
    /// Output column and template evaluator of each aggregated item.
    aggregated: Vec<(usize, Evaluator<'a>)>,
    table: GroupTable<'a>,
    cursor: usize,
    state: State,
    record: Record,
}

impl<'a> AggregateOperator<'a> {
    /// Creates the operator. Fails if a return item nests aggregates or mixes
    /// aggregated and bare variables.
    pub fn new(
        child: Box<dyn Operator + 'a>,
        items: Vec<ReturnItem>,
        arena: &'a ExprArena,
        symbols: &'a SymbolTable,
        config: AggregateConfig,
    ) -> Result<Self> {
        let mut group_by = Vec::new();
        let mut aggregated = Vec::new();
        for (column, item) in items.iter().enumerate() {
            let detector = AggregateDetector::new(arena, item.expr);
            detector.validate_result()?;
            let eval = Evaluator::new(arena, item.expr, symbols).with_config(config.clone());
            if detector.has_valid_agg_func() {
                aggregated.push((column, eval));
            } else {
                group_by.push((column, eval));
            }
        }
        Ok(Self {
            child,
            arena,
            symbols,
            table: GroupTable::new(config.group_key_mode()),
            config,
            record: Record::new(items.len()),
            items,
            group_by,
            aggregated,
            cursor: 0,
            state: State::Uninitialized,
        })
    }

    /// Output column names in declared order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.alias.as_str())
    }

    fn drain_child(&mut self, ctx: &RuntimeContext<'_>) -> Result<()> {
        let mut rows = 0usize;
        while self.child.consume(ctx)? == OpResult::Ok {
            self.table.aggregate_record(
                ctx,
                &mut self.group_by,
                &self.aggregated,
                self.child.record(),
            )?;
            rows += 1;
        }
        if self.table.groups.is_empty()
            && self.group_by.is_empty()
            && self.config.emit_empty_global_group()
        {
            self.table.groups.push(Group {
                keys: Vec::new(),
                evaluators: self.aggregated.iter().map(|(_, t)| t.fresh()).collect(),
                last: Record::new(self.symbols.len()),
            });
        }
        debug!(
            "{}: aggregated {} rows into {} groups",
            self.child.name(),
            rows,
            self.table.groups.len()
        );
        Ok(())
    }

    fn hand_off(&mut self, ctx: &RuntimeContext<'_>) -> Result<()> {
        let group = &mut self.table.groups[self.cursor];
        let mut record = Record::new(self.items.len());
        for ((column, _), key) in self.group_by.iter().zip(group.keys.iter()) {
            record.set(*column, key.clone());
        }
        for ((column, template), eval) in self.aggregated.iter().zip(group.evaluators.iter_mut()) {
            eval.reduce()?;
            check_mixed_operands(self.arena, self.symbols, template.root())?;
            let value = eval.evaluate(ctx, &group.last)?;
            record.set(*column, value);
        }
        self.record = record;
        self.cursor += 1;
        Ok(())
    }
}

impl Operator for AggregateOperator<'_> {
    fn initialize(&mut self, ctx: &RuntimeContext<'_>) -> Result<()> {
        self.child.initialize(ctx)?;
        self.record = Record::new(self.items.len());
        self.table.clear();
        self.cursor = 0;
        self.state = State::Initialized;
        debug!(
            "{}: initialized with {} group-by and {} aggregated items",
            self.name(),
            self.group_by.len(),
            self.aggregated.len()
        );
        Ok(())
    }

    fn consume(&mut self, ctx: &RuntimeContext<'_>) -> Result<OpResult> {
        match self.state {
            State::Uninitialized => {
                return Err(Error::internal("aggregate operator consumed before initialize"))
            }
            State::Initialized => {
                self.drain_child(ctx)?;
                self.state = State::Consuming;
            }
            State::Consuming => {}
            State::Depleted => return Ok(OpResult::Depleted),
        }
        if self.cursor >= self.table.groups.len() {
            self.state = State::Depleted;
            return Ok(OpResult::Depleted);
        }
        self.hand_off(ctx)?;
        Ok(OpResult::Ok)
    }

    fn reset(&mut self, complete: bool) -> Result<()> {
        self.child.reset(complete)?;
        self.table.clear();
        self.cursor = 0;
        self.state = if complete {
            State::Uninitialized
        } else {
            State::Initialized
        };
        debug!("{}: reset (complete: {})", self.name(), complete);
        Ok(())
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn name(&self) -> &'static str {
        "Aggregate"
    }
}

/// Rejects an aggregated item whose top-level operator combines an aggregate with a
/// per-row variable, as in `collect(a) + a`. Literals, parameters and variables of
/// kind `Constant` may appear next to an aggregate.
fn check_mixed_operands(arena: &ExprArena, symbols: &SymbolTable, root: ExprId) -> Result<()> {
    let operands: Vec<ExprId> = match arena.node(root)? {
        Expr::Binary { left, right, .. } => alloc::vec![*left, *right],
        Expr::Unary { expr, .. } => alloc::vec![*expr],
        _ => return Ok(()),
    };
    for id in operands {
        if AggregateDetector::new(arena, id).has_valid_agg_func() {
            continue;
        }
        let base = match arena.node(id)? {
            Expr::GetField { expr, .. } => arena.node(*expr)?,
            other => other,
        };
        if let Expr::Ref(name) = base {
            if !matches!(symbols.resolve(name), Some((_, SymbolKind::Constant))) {
                return Err(Error::unimplemented(format!(
                    "combining an aggregate with the per-row variable {}",
                    name
                )));
            }
        }
    }
    Ok(())
}
