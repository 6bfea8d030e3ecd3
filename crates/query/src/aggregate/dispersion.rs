//! Standard deviation and variance, sample and population.

use super::{first_operand, numeric_operand, split_args, Accumulator, DistinctFilter};
use alloc::boxed::Box;
use alloc::vec::Vec;
use strata_core::{Entry, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispersionKind {
    StDev,
    StDevP,
    Variance,
    VarianceP,
}

impl DispersionKind {
    fn name(self) -> &'static str {
        match self {
            DispersionKind::StDev => "stDev",
            DispersionKind::StDevP => "stDevP",
            DispersionKind::Variance => "variance",
            DispersionKind::VarianceP => "varianceP",
        }
    }

    fn is_sample(self) -> bool {
        matches!(self, DispersionKind::StDev | DispersionKind::Variance)
    }

    fn is_stdev(self) -> bool {
        matches!(self, DispersionKind::StDev | DispersionKind::StDevP)
    }
}

/// Buffers the group's values; fewer than two values yield `0.0`.
#[derive(Debug)]
pub struct Dispersion {
    kind: DispersionKind,
    values: Vec<f64>,
    distinct: Option<DistinctFilter>,
}

impl Dispersion {
    pub fn new(kind: DispersionKind) -> Self {
        Self {
            kind,
            values: Vec::new(),
            distinct: None,
        }
    }
}

/// Neumaier-compensated sum.
fn compensated_sum(xs: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut c = 0.0;
    for x in xs {
        let t = sum + x;
        if libm::fabs(sum) >= libm::fabs(x) {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

impl Accumulator for Dispersion {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        let func = self.kind.name();
        let (is_distinct, operands) = split_args(func, args)?;
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
        let n = self.values.len();
        if n < 2 {
            return Ok(Entry::constant(0.0));
        }
        let mean = compensated_sum(self.values.iter().copied()) / n as f64;
        let squares = compensated_sum(self.values.iter().map(|&x| (x - mean) * (x - mean)));
        let denom = if self.kind.is_sample() { n - 1 } else { n };
        let variance = (squares / denom as f64).max(0.0);
        let out = if self.kind.is_stdev() {
            libm::sqrt(variance)
        } else {
            variance
        };
        Ok(Entry::constant(out))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use alloc::vec;
    use strata_core::FieldData;

    fn rows(xs: &[f64]) -> Vec<Vec<Entry>> {
        xs.iter().map(|&x| vec![v(x)]).collect()
    }

    fn result(name: &str, xs: &[f64]) -> f64 {
        run(name, false, rows(xs))
            .unwrap()
            .as_constant()
            .and_then(FieldData::as_f64)
            .unwrap()
    }

    #[test]
    fn test_known_values() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(libm::fabs(result("varianceP", &xs) - 4.0) < 1e-12);
        assert!(libm::fabs(result("stdevp", &xs) - 2.0) < 1e-12);
        assert!(libm::fabs(result("variance", &xs) - 32.0 / 7.0) < 1e-12);
        assert!(libm::fabs(result("stdev", &xs) - libm::sqrt(32.0 / 7.0)) < 1e-12);
    }

    #[test]
    fn test_fewer_than_two_values() {
        assert_eq!(result("stdev", &[]), 0.0);
        assert_eq!(result("variancep", &[3.0]), 0.0);
    }

    #[test]
    fn test_large_offset_is_stable() {
        let xs = [1e9 + 4.0, 1e9 + 7.0, 1e9 + 13.0, 1e9 + 16.0];
        assert!(libm::fabs(result("variance", &xs) - 30.0) < 1e-6);
    }

    #[test]
    fn test_constant_series_is_non_negative() {
        let var = result("variance", &[0.1, 0.1, 0.1]);
        assert!((0.0..1e-30).contains(&var));
    }
}
