//! Numeric functions. Integers pass through rounding functions unchanged.

use super::{constant, expect_arity, mismatch};
use crate::context::RuntimeContext;
use strata_core::{Entry, FieldData, Result};

/// Applies `int_op` to integers and `real_op` to reals; Null stays Null.
fn numeric(
    function: &str,
    args: &[Entry],
    int_op: fn(i64) -> Option<FieldData>,
    real_op: fn(f64) -> FieldData,
) -> Result<FieldData> {
    expect_arity(function, args, 1)?;
    let c = constant(function, &args[0])?;
    if c.is_null() {
        return Ok(FieldData::null());
    }
    if let Some(i) = c.as_i64() {
        return int_op(i).ok_or_else(|| mismatch(function, "Integer in range", &args[0]));
    }
    match c.as_f64() {
        Some(r) => Ok(real_op(r)),
        None => Err(mismatch(function, "Integer or Float", &args[0])),
    }
}

pub(super) fn abs(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    numeric(
        "abs",
        args,
        |i| i.checked_abs().map(FieldData::from),
        |r| FieldData::from(libm::fabs(r)),
    )
}

pub(super) fn ceil(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    numeric("ceil", args, |i| Some(FieldData::from(i)), |r| FieldData::from(libm::ceil(r)))
}

pub(super) fn floor(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    numeric("floor", args, |i| Some(FieldData::from(i)), |r| FieldData::from(libm::floor(r)))
}

pub(super) fn round(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    numeric("round", args, |i| Some(FieldData::from(i)), |r| FieldData::from(libm::round(r)))
}

/// Returns -1 for values with the sign bit set, 1 otherwise.
pub(super) fn sign(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    numeric(
        "sign",
        args,
        |i| Some(FieldData::from(if i < 0 { -1i64 } else { 1 })),
        |r| FieldData::from(if r.is_sign_negative() { -1i64 } else { 1 }),
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;

    #[test]
    fn test_abs() {
        assert_eq!(call("abs", &[c(-3i64)]).unwrap(), FieldData::from(3i64));
        assert_eq!(call("abs", &[c(-2.5)]).unwrap(), FieldData::from(2.5));
        assert!(call("abs", &[c(i64::MIN)]).is_err());
        assert!(call("abs", &[c("x")]).is_err());
    }

    #[test]
    fn test_rounding_keeps_integers() {
        assert_eq!(call("ceil", &[c(4i64)]).unwrap(), FieldData::from(4i64));
        assert_eq!(call("ceil", &[c(1.2)]).unwrap(), FieldData::from(2.0));
        assert_eq!(call("floor", &[c(-1.2)]).unwrap(), FieldData::from(-2.0));
        assert_eq!(call("round", &[c(2.5)]).unwrap(), FieldData::from(3.0));
        assert!(call("round", &[c(FieldData::null())]).unwrap().is_null());
    }

    #[test]
    fn test_sign() {
        assert_eq!(call("sign", &[c(-9i64)]).unwrap(), FieldData::from(-1i64));
        assert_eq!(call("sign", &[c(0i64)]).unwrap(), FieldData::from(1i64));
        assert_eq!(call("sign", &[c(-0.0)]).unwrap(), FieldData::from(-1i64));
    }
}
