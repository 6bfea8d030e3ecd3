//! Sum, average and extrema.

use super::{first_operand, numeric_operand, split_args, Accumulator, DistinctFilter};
use alloc::boxed::Box;
use strata_core::{Entry, FieldData, Result};

/// Applies the DISTINCT filter to one operand; returns the number to fold, if any.
fn next_value(
    func: &str,
    args: &[Entry],
    distinct: &mut Option<DistinctFilter>,
) -> Result<Option<f64>> {
    let (is_distinct, operands) = split_args(func, args)?;
    let arg = first_operand(func, operands)?;
    let Some(x) = numeric_operand(func, arg)? else {
        return Ok(None);
    };
    if is_distinct {
        let filter = distinct.get_or_insert_with(DistinctFilter::default);
        if let Entry::Constant(c) = arg {
            if !filter.first_time(c) {
                return Ok(None);
            }
        }
    }
    Ok(Some(x))
}

/// `sum(x)`: Double; the empty sum is `0.0`.
#[derive(Debug, Default)]
pub struct Sum {
    total: f64,
    distinct: Option<DistinctFilter>,
}

impl Accumulator for Sum {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        if let Some(x) = next_value("sum", args, &mut self.distinct)? {
            self.total += x;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Entry> {
        Ok(Entry::constant(self.total))
    }
}

/// `avg(x)`: Double; Null over no values.
#[derive(Debug, Default)]
pub struct Avg {
    total: f64,
    count: u64,
    distinct: Option<DistinctFilter>,
}

impl Accumulator for Avg {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        if let Some(x) = next_value("avg", args, &mut self.distinct)? {
            self.total += x;
            self.count += 1;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Entry> {
        if self.count == 0 {
            return Ok(Entry::null());
        }
        Ok(Entry::constant(self.total / self.count as f64))
    }
}

/// `max(x)` / `min(x)` over numbers, returned as Double; Null over no values.
#[derive(Debug)]
pub struct Extremum {
    func: &'static str,
    best: f64,
    seen: bool,
    better: fn(f64, f64) -> bool,
}

impl Extremum {
    pub fn max() -> Self {
        Self {
            func: "max",
            best: f64::NEG_INFINITY,
            seen: false,
            better: |x, best| x > best,
        }
    }

    pub fn min() -> Self {
        Self {
            func: "min",
            best: f64::INFINITY,
            seen: false,
            better: |x, best| x < best,
        }
    }
}

impl Accumulator for Extremum {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        let (_, operands) = split_args(self.func, args)?;
        let arg = first_operand(self.func, operands)?;
        if let Some(x) = numeric_operand(self.func, arg)? {
            if !self.seen || (self.better)(x, self.best) {
                self.best = x;
            }
            self.seen = true;
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Entry> {
        if !self.seen {
            return Ok(Entry::null());
        }
        Ok(Entry::Constant(FieldData::from(self.best)))
    }
}
