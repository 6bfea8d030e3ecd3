//! Property-based tests for aggregate accumulators.

use proptest::prelude::*;
use strata_core::{Entry, FieldData};
use strata_query::aggregate::{self, Accumulator};
use strata_query::AggregateConfig;

/// Runs aggregate `name` over `values`, appending `extra` operands to every step.
fn run(name: &str, distinct: bool, values: &[f64], extra: &[Entry]) -> Entry {
    let mut acc: Box<dyn Accumulator> =
        aggregate::create(name, &AggregateConfig::default()).unwrap();
    for v in values {
        let mut args = vec![Entry::constant(distinct), Entry::constant(*v)];
        args.extend_from_slice(extra);
        acc.step(&args).unwrap();
    }
    acc.finish().unwrap()
}

fn as_f64(entry: &Entry) -> f64 {
    entry.as_constant().and_then(FieldData::as_f64).unwrap()
}

fn values_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 0..64)
}

proptest! {
    /// Property: the average of a single value is that value, exactly.
    #[test]
    fn avg_of_one_value_is_identity(v in -1e12f64..1e12) {
        prop_assert_eq!(run("avg", false, &[v], &[]), Entry::constant(v));
    }

    /// Property: variance and standard deviation are never negative.
    #[test]
    fn dispersion_is_non_negative(values in values_strategy()) {
        for name in ["variance", "varianceP", "stDev", "stDevP"] {
            let out = as_f64(&run(name, false, &values, &[]));
            prop_assert!(out >= 0.0, "{} gave {}", name, out);
        }
    }

    /// Property: a constant series has zero variance.
    #[test]
    fn constant_series_has_no_spread(v in -1e6f64..1e6, n in 2usize..32) {
        let out = as_f64(&run("varianceP", false, &vec![v; n], &[]));
        prop_assert!(out <= 1e-6, "variance {} for a constant series", out);
    }

    /// Property: percentileDisc at 0 is the minimum and at 1 the maximum.
    #[test]
    fn percentile_disc_boundaries(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = run("percentileDisc", false, &values, &[Entry::constant(0.0)]);
        let hi = run("percentileDisc", false, &values, &[Entry::constant(1.0)]);
        prop_assert_eq!(as_f64(&lo), min);
        prop_assert_eq!(as_f64(&hi), max);
    }

    /// Property: percentileCont lies between the minimum and the maximum.
    #[test]
    fn percentile_cont_is_bounded(
        values in prop::collection::vec(-1e6f64..1e6, 1..64),
        p in 0.0f64..=1.0,
    ) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let out = as_f64(&run("percentileCont", false, &values, &[Entry::constant(p)]));
        prop_assert!(out >= min - 1e-9 && out <= max + 1e-9);
    }

    /// Property: count(distinct x) equals the number of distinct values, and
    /// collect(distinct x) has that many elements.
    #[test]
    fn distinct_count_matches_collect(values in prop::collection::vec(0i64..16, 0..64)) {
        let mut count = aggregate::create("count", &AggregateConfig::default()).unwrap();
        let mut collect = aggregate::create("collect", &AggregateConfig::default()).unwrap();
        for v in &values {
            let args = [Entry::constant(true), Entry::constant(*v)];
            count.step(&args).unwrap();
            collect.step(&args).unwrap();
        }
        let mut unique = values.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(count.finish().unwrap(), Entry::constant(unique.len() as i64));
        let collected = collect.finish().unwrap();
        let len = collected.as_constant().and_then(FieldData::as_array).map(<[FieldData]>::len);
        prop_assert_eq!(len, Some(unique.len()));
    }

    /// Property: sum matches a plain fold within rounding.
    #[test]
    fn sum_matches_fold(values in values_strategy()) {
        let expected: f64 = values.iter().sum();
        let out = as_f64(&run("sum", false, &values, &[]));
        prop_assert!((out - expected).abs() <= 1e-6 * (1.0 + expected.abs()));
    }
}
