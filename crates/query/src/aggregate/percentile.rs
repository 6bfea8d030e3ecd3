//! `percentileDisc` and `percentileCont`.

use super::{first_operand, numeric_operand, split_args, Accumulator, DistinctFilter};
use alloc::boxed::Box;
use alloc::vec::Vec;
use strata_core::{Entry, Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PercentileKind {
    /// Nearest-rank: the smallest value whose cumulative share reaches `p`.
    Disc,
    /// Linear interpolation between the two closest ranks.
    Cont,
}

impl PercentileKind {
    fn name(self) -> &'static str {
        match self {
            PercentileKind::Disc => "percentileDisc",
            PercentileKind::Cont => "percentileCont",
        }
    }
}

/// Buffers every value of the group and picks the requested percentile on finish.
///
/// Steps as `(distinct, value, p)`. `p` is read from the first step and must lie
/// in `[0, 1]`.
#[derive(Debug)]
pub struct Percentile {
    kind: PercentileKind,
    p: Option<f64>,
    values: Vec<f64>,
    distinct: Option<DistinctFilter>,
}

impl Percentile {
    pub fn new(kind: PercentileKind, capacity: usize) -> Self {
        Self {
            kind,
            p: None,
            values: Vec::with_capacity(capacity),
            distinct: None,
        }
    }

    fn read_percentile(&self, arg: &Entry) -> Result<f64> {
        let func = self.kind.name();
        let p = numeric_operand(func, arg)?
            .ok_or_else(|| Error::aggregate_step(func, "percentile must not be null"))?;
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidPercentile { value: p });
        }
        Ok(p)
    }
}

impl Accumulator for Percentile {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        let func = self.kind.name();
        let (is_distinct, operands) = split_args(func, args)?;
        if operands.len() < 2 {
            return Err(Error::aggregate_step(func, "expected (value, percentile)"));
        }
        if self.p.is_none() {
            self.p = Some(self.read_percentile(&operands[operands.len() - 1])?);
        }
        let arg = first_operand(func, operands)?;
        let Some(x) = numeric_operand(func, arg)? else {
            return Ok(());
        };
        if is_distinct {
            let filter = self.distinct.get_or_insert_with(DistinctFilter::default);
            if let Entry::Constant(c) = arg {
                if !filter.first_time(c) {
                    return Ok(());
                }
            }
        }
        self.values.push(x);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Entry> {
        let (Some(p), false) = (self.p, self.values.is_empty()) else {
            return Ok(Entry::null());
        };
        let mut values = self.values;
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let result = match self.kind {
            PercentileKind::Disc => {
                let rank = if p > 0.0 {
                    (libm::ceil(p * n as f64) as usize).saturating_sub(1)
                } else {
                    0
                };
                values[rank.min(n - 1)]
            }
            PercentileKind::Cont => {
                if n == 1 || p >= 1.0 {
                    values[n - 1]
                } else {
                    let pos = p * (n - 1) as f64;
                    let lower = libm::floor(pos) as usize;
                    let frac = pos - lower as f64;
                    match values.get(lower + 1) {
                        Some(&upper) => values[lower] + frac * (upper - values[lower]),
                        None => values[lower],
                    }
                }
            }
        };
        Ok(Entry::constant(result))
    }
}
