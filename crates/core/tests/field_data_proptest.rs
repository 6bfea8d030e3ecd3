//! Property-based tests for value arithmetic and ordering.

use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use strata_core::{CmpOp, Error, FieldData};

type BinOp = fn(&FieldData, &FieldData) -> strata_core::Result<FieldData>;

const OPS: [(&str, BinOp); 6] = [
    ("add", FieldData::add),
    ("sub", FieldData::sub),
    ("mul", FieldData::mul),
    ("div", FieldData::div),
    ("mod", FieldData::modulo),
    ("pow", FieldData::pow),
];

fn hash_of(v: &FieldData) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

/// Numeric values of every width, plus Null.
fn operand_strategy() -> impl Strategy<Value = FieldData> {
    prop_oneof![
        Just(FieldData::null()),
        any::<i8>().prop_map(FieldData::from),
        any::<i16>().prop_map(FieldData::from),
        any::<i32>().prop_map(FieldData::from),
        (-1_000_000i64..1_000_000).prop_map(FieldData::from),
        (-1e6f64..1e6).prop_map(FieldData::from),
    ]
}

proptest! {
    /// Property: any arithmetic operator with a Null operand yields Null.
    #[test]
    fn null_propagates(x in operand_strategy()) {
        let null = FieldData::null();
        for (name, op) in OPS {
            prop_assert!(op(&null, &x).unwrap().is_null(), "{} with Null on the left", name);
            prop_assert!(op(&x, &null).unwrap().is_null(), "{} with Null on the right", name);
        }
    }

    /// Property: +, -, * over integers stay integers; mixing in a real gives a real.
    #[test]
    fn integer_real_closure(
        a in -1_000_000i64..1_000_000,
        b in -1_000_000i64..1_000_000,
        r in -1e6f64..1e6,
    ) {
        let (ia, ib, rr) = (FieldData::from(a), FieldData::from(b), FieldData::from(r));
        for (_, op) in &OPS[..3] {
            prop_assert!(op(&ia, &ib).unwrap().is_integer());
            prop_assert!(op(&ia, &rr).unwrap().is_real());
            prop_assert!(op(&rr, &ib).unwrap().is_real());
        }
    }

    /// Property: division and modulo by zero fail for integer and real zeros alike.
    #[test]
    fn division_by_zero(x in (-1_000_000i64..1_000_000).prop_map(FieldData::from)) {
        for zero in [FieldData::from(0i64), FieldData::from(0.0)] {
            prop_assert_eq!(x.div(&zero), Err(Error::DivisionByZero));
            prop_assert_eq!(x.modulo(&zero), Err(Error::DivisionByZero));
        }
    }

    /// Property: values that compare equal hash equally, across numeric widths.
    #[test]
    fn eq_implies_same_hash(n in -1_000_000i32..1_000_000) {
        let int = FieldData::from(n);
        let long = FieldData::from(n as i64);
        let real = FieldData::from(n as f64);
        prop_assert_eq!(&int, &long);
        prop_assert_eq!(&long, &real);
        prop_assert_eq!(hash_of(&int), hash_of(&real));
        prop_assert_eq!(long.compare(CmpOp::Eq, &real).unwrap(), FieldData::from(true));
    }

    /// Property: ordering agrees with the comparison operators.
    #[test]
    fn ordering_matches_compare(a in operand_strategy(), b in operand_strategy()) {
        prop_assume!(!a.is_null() && !b.is_null());
        let lt = a.compare(CmpOp::Lt, &b).unwrap() == FieldData::from(true);
        prop_assert_eq!(lt, a < b);
    }
}
