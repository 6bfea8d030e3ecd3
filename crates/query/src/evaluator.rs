//! Expression evaluator.
//!
//! An `Evaluator` is bound to one expression tree and owns the aggregate state of
//! that tree. It is driven in two ways:
//!
//! - [`evaluate`](Evaluator::evaluate) computes the value of the tree for a record.
//!   Aggregate calls yield their finalized result.
//! - [`aggregate`](Evaluator::aggregate) feeds one record to every aggregate call of
//!   the tree without computing anything else. Once a group is exhausted,
//!   [`reduce`](Evaluator::reduce) finalizes the accumulators.
//!
//! ```ignore
//! let mut eval = Evaluator::new(&arena, root, &symbols);
//! for record in rows {
//!     eval.aggregate(&ctx, &record)?;
//! }
//! eval.reduce()?;
//! let value = eval.evaluate(&ctx, &last_record)?;
//! ```

use crate::aggregate::{self, Accumulator};
use crate::ast::{BinaryOp, Expr, ExprArena, ExprId, PathPattern, UnaryOp};
use crate::config::AggregateConfig;
use crate::context::RuntimeContext;
use crate::detector::AggregateDetector;
use crate::functions::{self, TO_PATH};
use crate::symbol_table::{SymbolKind, SymbolTable};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::mem;
use hashbrown::HashSet;
use log::trace;
use strata_core::{CmpOp, Entry, Error, FieldData, Record, Result};

/// State of one aggregate call.
enum AggSlot {
    Active(Box<dyn Accumulator>),
    Done(Entry),
}

/// Evaluates one expression tree against records.
pub struct Evaluator<'a> {
    arena: &'a ExprArena,
    root: ExprId,
    symbols: &'a SymbolTable,
    config: AggregateConfig,
    /// Outermost aggregate calls of the tree.
    aggregates: Vec<ExprId>,
    /// Aggregate state in first-visit order. Few per expression, so a linear scan.
    contexts: Vec<(ExprId, AggSlot)>,
    /// Comprehension bindings, innermost last.
    scopes: Vec<(String, Entry)>,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator for the tree rooted at `root`.
    pub fn new(arena: &'a ExprArena, root: ExprId, symbols: &'a SymbolTable) -> Self {
        let mut aggregates = Vec::new();
        collect_outermost_aggregates(arena, root, &mut aggregates);
        Self {
            arena,
            root,
            symbols,
            config: AggregateConfig::default(),
            aggregates,
            contexts: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Sets the configuration used when creating accumulators.
    pub fn with_config(mut self, config: AggregateConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns an evaluator over the same tree with no aggregate state.
    pub fn fresh(&self) -> Evaluator<'a> {
        Evaluator {
            arena: self.arena,
            root: self.root,
            symbols: self.symbols,
            config: self.config.clone(),
            aggregates: self.aggregates.clone(),
            contexts: Vec::new(),
            scopes: Vec::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> ExprId {
        self.root
    }

    /// Returns true if the tree calls a registered aggregate.
    pub fn contains_aggregation(&self) -> bool {
        AggregateDetector::new(self.arena, self.root).has_valid_agg_func()
    }

    /// Computes the value of the tree for `record`.
    pub fn evaluate(&mut self, ctx: &RuntimeContext<'_>, record: &Record) -> Result<Entry> {
        self.eval(ctx, record, self.root)
    }

    /// Steps every aggregate call of the tree with the values of `record`.
    pub fn aggregate(&mut self, ctx: &RuntimeContext<'_>, record: &Record) -> Result<()> {
        for i in 0..self.aggregates.len() {
            let id = self.aggregates[i];
            self.step_aggregate(ctx, record, id)?;
        }
        Ok(())
    }

    /// Finalizes every aggregate call. Calls that never saw a row are finalized empty.
    ///
    /// Already finalized calls are left alone, so calling this twice is harmless.
    pub fn reduce(&mut self) -> Result<()> {
        for i in 0..self.aggregates.len() {
            let id = self.aggregates[i];
            if self.slot_index(id).is_none() {
                let acc = self.create_accumulator(id)?;
                self.contexts.push((id, AggSlot::Active(acc)));
            }
        }
        for (id, slot) in self.contexts.iter_mut() {
            if let AggSlot::Active(_) = slot {
                let AggSlot::Active(acc) = mem::replace(slot, AggSlot::Done(Entry::null())) else {
                    continue;
                };
                let result = acc.finish()?;
                trace!("aggregate node {} reduced to {}", id.0, result);
                *slot = AggSlot::Done(result);
            }
        }
        Ok(())
    }

    fn slot_index(&self, id: ExprId) -> Option<usize> {
        self.contexts.iter().position(|(slot_id, _)| *slot_id == id)
    }

    fn create_accumulator(&self, id: ExprId) -> Result<Box<dyn Accumulator>> {
        match self.arena.node(id)? {
            Expr::Aggregate { func, .. } => aggregate::create(func, &self.config),
            other => Err(Error::internal(format!(
                "expected an aggregate call, found {:?}",
                other
            ))),
        }
    }

    fn step_aggregate(
        &mut self,
        ctx: &RuntimeContext<'_>,
        record: &Record,
        id: ExprId,
    ) -> Result<()> {
        let arena = self.arena;
        let Expr::Aggregate {
            func,
            distinct,
            args,
        } = arena.node(id)?
        else {
            return Err(Error::internal("aggregate step on a non-aggregate node"));
        };
        let step_args = if args.is_empty() && func.eq_ignore_ascii_case("count") {
            let count_in = if record.is_null_marker() {
                Entry::null()
            } else {
                Entry::constant(1.0)
            };
            alloc::vec![count_in]
        } else {
            let mut values = Vec::with_capacity(args.len() + 1);
            values.push(Entry::constant(*distinct));
            for arg in args {
                values.push(self.eval(ctx, record, *arg)?);
            }
            values
        };
        let index = match self.slot_index(id) {
            Some(i) => i,
            None => {
                let acc = aggregate::create(func, &self.config)?;
                self.contexts.push((id, AggSlot::Active(acc)));
                self.contexts.len() - 1
            }
        };
        match &mut self.contexts[index].1 {
            AggSlot::Active(acc) => acc.step(&step_args),
            AggSlot::Done(_) => Err(Error::internal(format!(
                "{}: stepped after the group was reduced",
                func
            ))),
        }
    }

    fn eval(&mut self, ctx: &RuntimeContext<'_>, record: &Record, id: ExprId) -> Result<Entry> {
        let arena = self.arena;
        match arena.node(id)? {
            Expr::Bool(b) => Ok(Entry::constant(*b)),
            Expr::Int(i) => Ok(Entry::constant(*i)),
            Expr::Double(d) => Ok(Entry::constant(*d)),
            Expr::String(s) => Ok(Entry::constant(s.as_str())),
            Expr::Null => Ok(Entry::null()),
            Expr::Ref(name) => self.eval_ref(ctx, record, name),
            Expr::Param(name) => ctx
                .parameter(name)
                .cloned()
                .map(Entry::Constant)
                .ok_or_else(|| Error::undefined_parameter(name.as_str())),
            Expr::Unary { op, expr } => {
                let value = self.eval(ctx, record, *expr)?;
                let name = match op {
                    UnaryOp::Not => "NOT",
                    UnaryOp::Neg => "-",
                };
                let c = operand(name, &value)?;
                let out = match op {
                    UnaryOp::Not => c.not()?,
                    UnaryOp::Neg => c.neg()?,
                };
                Ok(Entry::Constant(out))
            }
            Expr::Binary { op, left, right } => self.eval_binary(ctx, record, *op, *left, *right),
            Expr::GetField { expr, field } => {
                let base = self.eval(ctx, record, *expr)?;
                get_field(ctx, &base, field)
            }
            Expr::Function { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(ctx, record, *arg)?);
                }
                functions::invoke(ctx, name, &values).map(Entry::Constant)
            }
            Expr::Aggregate { func, .. } => match self.slot_index(id) {
                Some(i) => match &self.contexts[i].1 {
                    AggSlot::Done(result) => Ok(result.clone()),
                    AggSlot::Active(_) => Err(Error::internal(format!(
                        "{}: evaluated before the group was reduced",
                        func
                    ))),
                },
                None if aggregate::is_aggregate(func) => Ok(Entry::null()),
                None => Err(Error::plugin_not_found(func.as_str())),
            },
            Expr::Case {
                input,
                branches,
                else_,
            } => self.eval_case(ctx, record, *input, branches, *else_),
            Expr::If { cond, then, else_ } => {
                let c = self.eval(ctx, record, *cond)?;
                if is_true(&c) {
                    self.eval(ctx, record, *then)
                } else {
                    match else_ {
                        Some(e) => self.eval(ctx, record, *e),
                        None => Ok(Entry::null()),
                    }
                }
            }
            Expr::MkList(items) | Expr::MkTuple(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.eval(ctx, record, *item)?;
                    out.push(element_value(value)?);
                }
                Ok(Entry::Constant(FieldData::Array(out)))
            }
            Expr::MkSet(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut seen = HashSet::with_capacity(items.len());
                for item in items {
                    let value = element_value(self.eval(ctx, record, *item)?)?;
                    if seen.insert(value.clone()) {
                        out.push(value);
                    }
                }
                Ok(Entry::Constant(FieldData::Array(out)))
            }
            Expr::MkMap(pairs) | Expr::MkRecord(pairs) => {
                let mut out = BTreeMap::new();
                for (key, item) in pairs {
                    let value = self.eval(ctx, record, *item)?;
                    out.insert(key.clone(), element_value(value)?);
                }
                Ok(Entry::Constant(FieldData::Map(out)))
            }
            Expr::IsNull { expr, negated } => {
                let value = self.eval(ctx, record, *expr)?;
                Ok(Entry::constant(value.is_null() != *negated))
            }
            Expr::IsLabeled { expr, label } => {
                let base = self.eval(ctx, record, *expr)?;
                if base.is_null() {
                    return Ok(Entry::null());
                }
                if base.is_node() || base.is_relationship() {
                    return ctx.graph().has_label(&base, label).map(Entry::constant);
                }
                Err(Error::type_mismatch(
                    "label check",
                    format!("expected an entity, got {}", base.kind_name()),
                ))
            }
            Expr::Exists(pattern) => Ok(Entry::constant(self.path_exists(ctx, record, pattern))),
            Expr::ListComprehension {
                variable,
                list,
                filter,
                projection,
            } => self.eval_comprehension(ctx, record, variable, *list, *filter, *projection),
        }
    }

    fn lookup_scope(&self, name: &str) -> Option<&Entry> {
        self.scopes
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, entry)| entry)
    }

    fn eval_ref(&mut self, ctx: &RuntimeContext<'_>, record: &Record, name: &str) -> Result<Entry> {
        if let Some(entry) = self.lookup_scope(name) {
            return Ok(entry.clone());
        }
        let (index, kind) = self
            .symbols
            .resolve(name)
            .ok_or_else(|| Error::undefined_variable(name))?;
        if kind == SymbolKind::NamedPath {
            let symbols = self.symbols;
            let elements = symbols.path_elements(name).unwrap_or(&[]);
            let mut parts = Vec::with_capacity(elements.len());
            for element in elements {
                parts.push(self.eval_ref(ctx, record, element)?);
            }
            return functions::invoke(ctx, TO_PATH, &parts).map(Entry::Constant);
        }
        match record.get(index) {
            Some(entry) if !entry.is_unknown() => Ok(entry.clone()),
            _ => Err(Error::undefined_variable(name)),
        }
    }

    fn eval_binary(
        &mut self,
        ctx: &RuntimeContext<'_>,
        record: &Record,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<Entry> {
        let symbol = op.symbol();
        let lhs = self.eval(ctx, record, left)?;
        if is_equality(op) && !lhs.is_constant() {
            let rhs = self.eval(ctx, record, right)?;
            return Ok(entity_equality(op, &lhs, &rhs));
        }
        let l = operand(symbol, &lhs)?;
        // Short-circuit on the deciding value; Null still needs the right side.
        match (op, l.as_bool()) {
            (BinaryOp::And, Some(false)) => return Ok(Entry::constant(false)),
            (BinaryOp::Or, Some(true)) => return Ok(Entry::constant(true)),
            _ => {}
        }
        let rhs = self.eval(ctx, record, right)?;
        if is_equality(op) && !rhs.is_constant() {
            return Ok(entity_equality(op, &lhs, &rhs));
        }
        let r = operand(symbol, &rhs)?;
        let out = match op {
            BinaryOp::Add => l.add(r)?,
            BinaryOp::Sub => l.sub(r)?,
            BinaryOp::Mul => l.mul(r)?,
            BinaryOp::Div => l.div(r)?,
            BinaryOp::Mod => l.modulo(r)?,
            BinaryOp::Pow => l.pow(r)?,
            BinaryOp::And => l.and(r)?,
            BinaryOp::Or => l.or(r)?,
            BinaryOp::Xor => l.xor(r)?,
            BinaryOp::Eq => l.compare(CmpOp::Eq, r)?,
            BinaryOp::NotEq => l.compare(CmpOp::NotEq, r)?,
            BinaryOp::Lt => l.compare(CmpOp::Lt, r)?,
            BinaryOp::LtEq => l.compare(CmpOp::LtEq, r)?,
            BinaryOp::Gt => l.compare(CmpOp::Gt, r)?,
            BinaryOp::GtEq => l.compare(CmpOp::GtEq, r)?,
            BinaryOp::In => membership(l, r)?,
            BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::Shl
            | BinaryOp::Shr => {
                return Err(Error::unimplemented(format!("bitwise operator {}", symbol)))
            }
        };
        Ok(Entry::Constant(out))
    }

    fn eval_case(
        &mut self,
        ctx: &RuntimeContext<'_>,
        record: &Record,
        input: Option<ExprId>,
        branches: &[(ExprId, ExprId)],
        else_: Option<ExprId>,
    ) -> Result<Entry> {
        match input {
            None => {
                for (when, then) in branches {
                    let cond = self.eval(ctx, record, *when)?;
                    if is_true(&cond) {
                        return self.eval(ctx, record, *then);
                    }
                }
                match else_ {
                    Some(e) => self.eval(ctx, record, e),
                    None => Ok(Entry::null()),
                }
            }
            Some(input) => {
                let subject = self.eval(ctx, record, input)?;
                for (when, then) in branches {
                    let candidate = self.eval(ctx, record, *when)?;
                    if values_equal(&subject, &candidate)? {
                        return self.eval(ctx, record, *then);
                    }
                }
                match else_ {
                    Some(e) => self.eval(ctx, record, e),
                    None => Err(Error::CaseNoMatch),
                }
            }
        }
    }

    /// False as soon as one alias is unbound, Null or no longer valid.
    fn path_exists(
        &self,
        ctx: &RuntimeContext<'_>,
        record: &Record,
        pattern: &PathPattern,
    ) -> bool {
        pattern.aliases.iter().all(|alias| {
            let entry = match self.lookup_scope(alias) {
                Some(entry) => Some(entry),
                None => self
                    .symbols
                    .resolve(alias)
                    .and_then(|(index, _)| record.get(index)),
            };
            match entry {
                Some(e) if e.is_unknown() || e.is_null() => false,
                Some(e) => ctx.graph().is_valid(e),
                None => false,
            }
        })
    }

    fn eval_comprehension(
        &mut self,
        ctx: &RuntimeContext<'_>,
        record: &Record,
        variable: &str,
        list: ExprId,
        filter: Option<ExprId>,
        projection: Option<ExprId>,
    ) -> Result<Entry> {
        let input = self.eval(ctx, record, list)?;
        let items = match input.as_constant() {
            Some(c) if c.is_null() => return Ok(Entry::null()),
            Some(FieldData::Array(items)) => items.clone(),
            _ => {
                return Err(Error::type_mismatch(
                    "list comprehension",
                    format!("expected a List, got {}", input.kind_name()),
                ))
            }
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            self.scopes
                .push((variable.to_string(), Entry::Constant(item.clone())));
            let result = self.comprehension_item(ctx, record, item, filter, projection);
            self.scopes.pop();
            if let Some(value) = result? {
                out.push(value);
            }
        }
        Ok(Entry::Constant(FieldData::Array(out)))
    }

    fn comprehension_item(
        &mut self,
        ctx: &RuntimeContext<'_>,
        record: &Record,
        item: FieldData,
        filter: Option<ExprId>,
        projection: Option<ExprId>,
    ) -> Result<Option<FieldData>> {
        if let Some(f) = filter {
            if !is_true(&self.eval(ctx, record, f)?) {
                return Ok(None);
            }
        }
        match projection {
            Some(p) => element_value(self.eval(ctx, record, p)?).map(Some),
            None => Ok(Some(item)),
        }
    }
}

fn collect_outermost_aggregates(arena: &ExprArena, id: ExprId, out: &mut Vec<ExprId>) {
    match arena.get(id) {
        Some(Expr::Aggregate { func, .. }) if aggregate::is_aggregate(func) => out.push(id),
        Some(node) => {
            for child in node.children() {
                collect_outermost_aggregates(arena, child, out);
            }
        }
        None => {}
    }
}

/// Operators only apply to values.
fn operand<'e>(op: &str, entry: &'e Entry) -> Result<&'e FieldData> {
    entry.as_constant().ok_or_else(|| {
        Error::unimplemented(format!("operator {} on {}", op, entry.kind_name()))
    })
}

fn is_equality(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Eq | BinaryOp::NotEq)
}

/// `=` / `<>` with at least one entity side. Entities are equal when they name the
/// same graph element, live or snapshotted; an entity never equals a constant.
fn entity_equality(op: BinaryOp, lhs: &Entry, rhs: &Entry) -> Entry {
    let same = lhs.snapshot() == rhs.snapshot();
    Entry::constant(if op == BinaryOp::Eq { same } else { !same })
}

fn is_true(entry: &Entry) -> bool {
    matches!(entry.as_constant().and_then(FieldData::as_bool), Some(true))
}

fn membership(needle: &FieldData, haystack: &FieldData) -> Result<FieldData> {
    if needle.is_null() {
        return Ok(FieldData::null());
    }
    match haystack.as_array() {
        Some(items) if needle.is_scalar() => {
            Ok(FieldData::from(items.iter().any(|item| item == needle)))
        }
        _ => Err(Error::type_mismatch(
            "IN",
            format!(
                "expected a scalar and a List, got {} and {}",
                needle.type_name(),
                haystack.type_name()
            ),
        )),
    }
}

fn values_equal(a: &Entry, b: &Entry) -> Result<bool> {
    match (a, b) {
        (Entry::Constant(x), Entry::Constant(y)) => {
            Ok(x.compare(CmpOp::Eq, y)? == FieldData::from(true))
        }
        _ => Ok(a.snapshot() == b.snapshot()),
    }
}

fn get_field(ctx: &RuntimeContext<'_>, base: &Entry, field: &str) -> Result<Entry> {
    match base {
        Entry::Constant(c) if c.is_null() => Ok(Entry::null()),
        Entry::Constant(FieldData::Map(map)) => Ok(Entry::Constant(
            map.get(field).cloned().unwrap_or_default(),
        )),
        Entry::Constant(c) => Err(Error::type_mismatch(
            "property access",
            format!("cannot read .{} of {}", field, c.type_name()),
        )),
        e if e.is_node() || e.is_relationship() => {
            ctx.graph().entity_field(e, field).map(Entry::Constant)
        }
        other => Err(Error::type_mismatch(
            "property access",
            format!("cannot read .{} of {}", field, other.kind_name()),
        )),
    }
}

/// Collection elements are values; entities are stored by their display form.
fn element_value(entry: Entry) -> Result<FieldData> {
    match entry {
        Entry::Constant(c) => Ok(c),
        Entry::Unknown => Err(Error::internal("unbound value in collection")),
        entity => Ok(FieldData::from(entity.to_string())),
    }
}
