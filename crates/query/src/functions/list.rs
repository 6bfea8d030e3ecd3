//! List and general-purpose functions.

use super::{constant, expect_arity, expect_arity_range, int_arg, mismatch};
use crate::context::RuntimeContext;
use alloc::vec::Vec;
use strata_core::{Entry, Error, FieldData, Result, ScalarValue};

/// `size(list)` / `size(string)`. Strings are measured in characters.
pub(super) fn size(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("size", args, 1)?;
    let c = constant("size", &args[0])?;
    if c.is_null() {
        return Ok(FieldData::null());
    }
    if let Some(items) = c.as_array() {
        return Ok(FieldData::from(items.len() as i64));
    }
    if let Some(s) = c.as_str() {
        return Ok(FieldData::from(s.chars().count() as i64));
    }
    Err(mismatch("size", "String or List", &args[0]))
}

pub(super) fn head(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("head", args, 1)?;
    let c = constant("head", &args[0])?;
    if c.is_null() {
        return Ok(FieldData::null());
    }
    let items = c.as_array().ok_or_else(|| mismatch("head", "List", &args[0]))?;
    Ok(items.first().cloned().unwrap_or_else(FieldData::null))
}

pub(super) fn last(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("last", args, 1)?;
    let c = constant("last", &args[0])?;
    if c.is_null() {
        return Ok(FieldData::null());
    }
    let items = c.as_array().ok_or_else(|| mismatch("last", "List", &args[0]))?;
    Ok(items.last().cloned().unwrap_or_else(FieldData::null))
}

/// `range(start, end[, step])`, inclusive of `end` when the step lands on it.
pub(super) fn range(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity_range("range", args, 2, 3)?;
    let start = int_arg("range", &args[0])?;
    let end = int_arg("range", &args[1])?;
    let step = match args.get(2) {
        Some(s) => int_arg("range", s)?,
        None => 1,
    };
    if step == 0 {
        return Err(Error::invalid_argument("range", "step must not be zero"));
    }
    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i <= end) || (step < 0 && i >= end) {
        out.push(FieldData::from(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(FieldData::Array(out))
}

/// Resolves a possibly negative position against `len`; negatives count from the end.
fn resolve_index(index: i64, len: usize) -> i64 {
    if index < 0 {
        (len as i64).saturating_add(index)
    } else {
        index
    }
}

/// `subscript(list, i)` returns one element, Null when out of range.
/// `subscript(list, from, to)` returns the half-open slice, clamped to the list.
pub(super) fn subscript(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity_range("subscript", args, 2, 3)?;
    let c = constant("subscript", &args[0])?;
    if c.is_null() || args[1..].iter().any(Entry::is_null) {
        return Ok(FieldData::null());
    }
    let items = c
        .as_array()
        .ok_or_else(|| mismatch("subscript", "List", &args[0]))?;
    let len = items.len();
    let from = resolve_index(int_arg("subscript", &args[1])?, len);
    let Some(to) = args.get(2) else {
        return Ok(usize::try_from(from)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or_else(FieldData::null));
    };
    let to = resolve_index(int_arg("subscript", to)?, len);
    let clamp = |i: i64| i.clamp(0, len as i64) as usize;
    let (from, to) = (clamp(from), clamp(to));
    if from >= to {
        return Ok(FieldData::Array(Vec::new()));
    }
    Ok(FieldData::Array(items[from..to].to_vec()))
}

/// Returns the first non-null argument.
pub(super) fn coalesce(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    if args.is_empty() {
        return Err(Error::invalid_argument("coalesce", "expected at least 1 argument"));
    }
    for arg in args {
        let c = constant("coalesce", arg)?;
        if !c.is_null() {
            return Ok(c.clone());
        }
    }
    Ok(FieldData::null())
}

/// `exists(x)`: true when `x` is bound to a non-null value.
pub(super) fn exists(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("exists", args, 1)?;
    Ok(FieldData::from(!args[0].is_null() && !args[0].is_unknown()))
}

/// Converts a numeric list into a float vector.
pub(super) fn to_float32_list(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("tofloat32list", args, 1)?;
    let c = constant("tofloat32list", &args[0])?;
    let items = c
        .as_array()
        .ok_or_else(|| mismatch("tofloat32list", "List of numbers", &args[0]))?;
    let floats = items
        .iter()
        .map(|v| {
            v.as_f64().map(|f| f as f32).ok_or_else(|| {
                Error::invalid_argument("tofloat32list", "list elements must be numbers")
            })
        })
        .collect::<Result<Vec<f32>>>()?;
    Ok(FieldData::Scalar(ScalarValue::FloatVector(floats)))
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use alloc::vec;

    fn ints(v: &[i64]) -> FieldData {
        FieldData::Array(v.iter().map(|i| FieldData::from(*i)).collect())
    }

    #[test]
    fn test_size() {
        assert_eq!(call("size", &[c(ints(&[1, 2, 3]))]).unwrap(), FieldData::from(3i64));
        assert_eq!(call("length", &[c("héllo")]).unwrap(), FieldData::from(5i64));
        assert!(call("size", &[c(FieldData::null())]).unwrap().is_null());
        assert!(call("size", &[c(1i64)]).is_err());
    }

    #[test]
    fn test_head_last() {
        assert_eq!(call("head", &[c(ints(&[4, 5]))]).unwrap(), FieldData::from(4i64));
        assert_eq!(call("last", &[c(ints(&[4, 5]))]).unwrap(), FieldData::from(5i64));
        assert!(call("head", &[c(ints(&[]))]).unwrap().is_null());
        assert!(call("last", &[c("x")]).is_err());
    }

    #[test]
    fn test_range() {
        assert_eq!(call("range", &[c(1i64), c(4i64)]).unwrap(), ints(&[1, 2, 3, 4]));
        assert_eq!(call("range", &[c(0i64), c(10i64), c(5i64)]).unwrap(), ints(&[0, 5, 10]));
        assert_eq!(call("range", &[c(5i64), c(1i64), c(-2i64)]).unwrap(), ints(&[5, 3, 1]));
        assert_eq!(call("range", &[c(5i64), c(1i64)]).unwrap(), ints(&[]));
        assert!(matches!(
            call("range", &[c(1i64), c(2i64), c(0i64)]),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_subscript_index() {
        let list = c(ints(&[10, 20, 30]));
        assert_eq!(call("subscript", &[list.clone(), c(1i64)]).unwrap(), FieldData::from(20i64));
        assert_eq!(call("subscript", &[list.clone(), c(-1i64)]).unwrap(), FieldData::from(30i64));
        assert!(call("subscript", &[list.clone(), c(3i64)]).unwrap().is_null());
        assert!(call("subscript", &[list.clone(), c(-4i64)]).unwrap().is_null());
        assert!(call("subscript", &[list.clone(), c(i64::MIN)]).unwrap().is_null());
        assert!(call("subscript", &[list, c(FieldData::null())]).unwrap().is_null());
        assert!(call("subscript", &[c(FieldData::null()), c(0i64)]).unwrap().is_null());
        assert!(call("subscript", &[c("abc"), c(0i64)]).is_err());
    }

    #[test]
    fn test_subscript_slice_is_clamped() {
        let list = c(ints(&[10, 20, 30, 40]));
        assert_eq!(
            call("subscript", &[list.clone(), c(1i64), c(3i64)]).unwrap(),
            ints(&[20, 30])
        );
        assert_eq!(
            call("subscript", &[list.clone(), c(-2i64), c(i64::MAX)]).unwrap(),
            ints(&[30, 40])
        );
        assert_eq!(
            call("subscript", &[list.clone(), c(-10i64), c(1i64)]).unwrap(),
            ints(&[10])
        );
        assert_eq!(call("subscript", &[list, c(3i64), c(1i64)]).unwrap(), ints(&[]));
    }

    #[test]
    fn test_coalesce_and_exists() {
        assert_eq!(
            call("coalesce", &[c(FieldData::null()), c(2i64), c(3i64)]).unwrap(),
            FieldData::from(2i64)
        );
        assert!(call("coalesce", &[c(FieldData::null())]).unwrap().is_null());
        assert_eq!(call("exists", &[c(FieldData::null())]).unwrap(), FieldData::from(false));
        assert_eq!(call("exists", &[Entry::Node(1)]).unwrap(), FieldData::from(true));
    }

    #[test]
    fn test_to_float32_list() {
        let input = c(vec![FieldData::from(1i64), FieldData::from(0.5)]);
        let v = call("toFloat32List", &[input]).unwrap();
        assert_eq!(v, FieldData::Scalar(ScalarValue::FloatVector(vec![1.0, 0.5])));
        assert!(call("tofloat32list", &[c(vec![FieldData::from("a")])]).is_err());
    }
}
