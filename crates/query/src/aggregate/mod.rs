//! Aggregate accumulators.
//!
//! One accumulator exists per (aggregate expression, group) pair. The evaluator feeds
//! it one argument vector per row and finalizes it once the group is exhausted:
//!
//! - `step(args)`: `args[0]` is always the `Bool` DISTINCT flag, followed by the
//!   evaluated operands. `count(*)` is the one exception: it passes a single
//!   "count-in" argument that is Null for null-marker rows.
//! - `finish()`: consumes the accumulator and yields the result entry, so a group
//!   cannot be reduced twice.

mod basic;
mod count;
mod dispersion;
mod percentile;

use crate::config::AggregateConfig;
use alloc::boxed::Box;
use alloc::format;
use hashbrown::HashSet;
use strata_core::{Entry, Error, FieldData, Result};

pub use basic::{Avg, Extremum, Sum};
pub use count::{Collect, Count};
pub use dispersion::{Dispersion, DispersionKind};
pub use percentile::{Percentile, PercentileKind};

/// Accumulator state machine for one aggregate call in one group.
pub trait Accumulator {
    /// Consumes one row's arguments.
    fn step(&mut self, args: &[Entry]) -> Result<()>;

    /// Finalizes the accumulator.
    fn finish(self: Box<Self>) -> Result<Entry>;
}

type Factory = fn(&AggregateConfig) -> Box<dyn Accumulator>;

/// Registered aggregates, sorted by name.
static AGGREGATES: &[(&str, Factory)] = &[
    ("avg", |_| Box::new(Avg::default())),
    ("collect", |_| Box::new(Collect::default())),
    ("count", |_| Box::new(Count::default())),
    ("max", |_| Box::new(Extremum::max())),
    ("min", |_| Box::new(Extremum::min())),
    ("percentilecont", |c| {
        Box::new(Percentile::new(PercentileKind::Cont, c.percentile_initial_capacity()))
    }),
    ("percentiledisc", |c| {
        Box::new(Percentile::new(PercentileKind::Disc, c.percentile_initial_capacity()))
    }),
    ("stdev", |_| Box::new(Dispersion::new(DispersionKind::StDev))),
    ("stdevp", |_| Box::new(Dispersion::new(DispersionKind::StDevP))),
    ("sum", |_| Box::new(Sum::default())),
    ("variance", |_| Box::new(Dispersion::new(DispersionKind::Variance))),
    ("variancep", |_| Box::new(Dispersion::new(DispersionKind::VarianceP))),
];

fn factory(name: &str) -> Option<Factory> {
    AGGREGATES
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| AGGREGATES[i].1)
}

/// Returns true if `name` (any case) is a registered aggregate.
pub fn is_aggregate(name: &str) -> bool {
    factory(&name.to_lowercase()).is_some()
}

/// Creates a fresh accumulator for the aggregate `name` (any case).
pub fn create(name: &str, config: &AggregateConfig) -> Result<Box<dyn Accumulator>> {
    factory(&name.to_lowercase())
        .map(|f| f(config))
        .ok_or_else(|| Error::plugin_not_found(name))
}

/// Splits a step argument vector into the DISTINCT flag and the operands.
pub(crate) fn split_args<'a>(func: &str, args: &'a [Entry]) -> Result<(bool, &'a [Entry])> {
    match args.split_first() {
        Some((Entry::Constant(flag), rest)) if flag.is_bool() => {
            Ok((flag.as_bool().unwrap_or(false), rest))
        }
        _ => Err(Error::internal(format!(
            "{}: first step argument must be the DISTINCT flag",
            func
        ))),
    }
}

/// Reads an operand as a number. Null reads as `None`.
pub(crate) fn numeric_operand(func: &str, arg: &Entry) -> Result<Option<f64>> {
    match arg {
        Entry::Constant(c) if c.is_null() => Ok(None),
        Entry::Constant(c) => c.as_f64().map(Some).ok_or_else(|| {
            Error::aggregate_step(func, format!("expected a number, got {}", c.type_name()))
        }),
        other => Err(Error::aggregate_step(
            func,
            format!("expected a number, got {}", other.kind_name()),
        )),
    }
}

/// First operand after the DISTINCT flag.
pub(crate) fn first_operand<'a>(func: &str, operands: &'a [Entry]) -> Result<&'a Entry> {
    operands
        .first()
        .ok_or_else(|| Error::aggregate_step(func, "missing argument"))
}

/// Tracks values already seen by a DISTINCT aggregate.
#[derive(Debug, Default)]
pub(crate) struct DistinctFilter {
    seen: HashSet<FieldData>,
}

impl DistinctFilter {
    /// Returns true the first time a value is offered.
    pub(crate) fn first_time(&mut self, value: &FieldData) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.clone());
        true
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use alloc::vec::Vec;

    /// Steps a fresh accumulator over the given operand lists and finishes it.
    pub fn run(name: &str, distinct: bool, rows: Vec<Vec<Entry>>) -> Result<Entry> {
        let mut acc = create(name, &AggregateConfig::default())?;
        for row in rows {
            let mut args = Vec::with_capacity(row.len() + 1);
            args.push(Entry::constant(distinct));
            args.extend(row);
            acc.step(&args)?;
        }
        acc.finish()
    }

    pub fn v(x: impl Into<FieldData>) -> Entry {
        Entry::constant(x)
    }
}
