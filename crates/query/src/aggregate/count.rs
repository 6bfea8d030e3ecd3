//! Counting and collecting.

use super::{first_operand, split_args, Accumulator};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashSet;
use strata_core::{Entry, FieldData, Result};

/// `count(x)` and `count(*)`.
///
/// `count(x)` counts non-null operands. `count(*)` steps with a single count-in
/// argument and counts every step whose count-in is not Null. The DISTINCT flag is
/// latched on the first step.
#[derive(Debug, Default)]
pub struct Count {
    count: i64,
    distinct: Option<bool>,
    seen: HashSet<Entry>,
}

impl Accumulator for Count {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        if let [count_in] = args {
            if !count_in.is_null() {
                self.count += 1;
            }
            return Ok(());
        }
        let (flag, operands) = split_args("count", args)?;
        let distinct = *self.distinct.get_or_insert(flag);
        let arg = first_operand("count", operands)?;
        if arg.is_null() {
            return Ok(());
        }
        if distinct {
            let key = arg.snapshot();
            if self.seen.contains(&key) {
                return Ok(());
            }
            self.seen.insert(key);
        }
        self.count += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Entry> {
        Ok(Entry::constant(self.count))
    }
}

/// `collect(x)`: a list of the non-null operands in arrival order.
///
/// Graph entities are collected by their display form. DISTINCT compares display forms.
#[derive(Debug, Default)]
pub struct Collect {
    items: Vec<FieldData>,
    seen: HashSet<String>,
}

impl Accumulator for Collect {
    fn step(&mut self, args: &[Entry]) -> Result<()> {
        let (distinct, operands) = split_args("collect", args)?;
        let arg = first_operand("collect", operands)?;
        if arg.is_null() {
            return Ok(());
        }
        if distinct {
            let key = arg.to_string();
            if self.seen.contains(&key) {
                return Ok(());
            }
            self.seen.insert(key);
        }
        let item = match arg {
            Entry::Constant(c) => c.clone(),
            entity => FieldData::from(entity.to_string()),
        };
        self.items.push(item);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Entry> {
        Ok(Entry::Constant(FieldData::Array(self.items)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::config::AggregateConfig;
    use alloc::vec;
    use strata_core::EdgeId;

    #[test]
    fn test_count_skips_nulls() {
        let rows = vec![vec![v(1i64)], vec![v(FieldData::null())], vec![v("a")]];
        assert_eq!(run("count", false, rows).unwrap(), v(2i64));
        assert_eq!(run("count", false, vec![]).unwrap(), v(0i64));
    }

    #[test]
    fn test_count_distinct() {
        let rows = vec![
            vec![v(1i64)],
            vec![v(1i64)],
            vec![Entry::Node(7)],
            vec![Entry::NodeSnapshot(7)],
        ];
        assert_eq!(run("count", true, rows).unwrap(), v(2i64));
    }

    #[test]
    fn test_count_star() {
        let mut acc = super::super::create("count", &AggregateConfig::default()).unwrap();
        acc.step(&[v(1.0)]).unwrap();
        acc.step(&[v(1.0)]).unwrap();
        acc.step(&[Entry::null()]).unwrap();
        assert_eq!(acc.finish().unwrap(), v(2i64));
    }

    #[test]
    fn test_collect() {
        let rows = vec![
            vec![v(1i64)],
            vec![v(FieldData::null())],
            vec![Entry::Relationship(EdgeId::new(1, 2, 0))],
            vec![v(1i64)],
        ];
        let out = run("collect", false, rows.clone()).unwrap();
        assert_eq!(
            out,
            v(FieldData::Array(vec![
                FieldData::from(1i64),
                FieldData::from("E[1_2_0]"),
                FieldData::from(1i64),
            ]))
        );
        let out = run("collect", true, rows).unwrap();
        assert_eq!(out.as_constant().and_then(FieldData::as_array).map(<[_]>::len), Some(2));
        assert_eq!(run("collect", false, vec![]).unwrap(), v(FieldData::Array(vec![])));
    }
}
