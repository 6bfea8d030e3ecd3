//! Type conversion functions. Null converts to Null.

use super::{constant, expect_arity, mismatch};
use crate::context::RuntimeContext;
use alloc::string::ToString;
use log::warn;
use strata_core::{Entry, Error, FieldData, Result};

pub(super) fn to_boolean(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("toboolean", args, 1)?;
    let c = constant("toboolean", &args[0])?;
    if c.is_null() || c.is_bool() {
        return Ok(c.clone());
    }
    match c.as_str() {
        Some("true") | Some("True") => Ok(FieldData::from(true)),
        Some("false") | Some("False") => Ok(FieldData::from(false)),
        _ => Err(mismatch("toboolean", "Bool or boolean string", &args[0])),
    }
}

pub(super) fn to_float(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("tofloat", args, 1)?;
    let c = constant("tofloat", &args[0])?;
    if c.is_null() {
        return Ok(FieldData::null());
    }
    if let Some(i) = c.as_i64() {
        return Ok(FieldData::from(i as f64));
    }
    if c.is_real() {
        return Ok(FieldData::from(c.as_f64().unwrap_or(f64::NAN)));
    }
    if let Some(s) = c.as_str() {
        return s.trim().parse::<f64>().map(FieldData::from).map_err(|e| {
            warn!("tofloat: cannot parse {:?}: {}", s, e);
            Error::invalid_argument("tofloat", e.to_string())
        });
    }
    Err(mismatch("tofloat", "number or numeric string", &args[0]))
}

/// Reals truncate toward zero.
pub(super) fn to_integer(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("tointeger", args, 1)?;
    let c = constant("tointeger", &args[0])?;
    if c.is_null() {
        return Ok(FieldData::null());
    }
    if let Some(i) = c.as_i64() {
        return Ok(FieldData::from(i));
    }
    if let Some(r) = c.as_f64() {
        return Ok(FieldData::from(r as i64));
    }
    if let Some(s) = c.as_str() {
        return s.trim().parse::<i64>().map(FieldData::from).map_err(|e| {
            warn!("tointeger: cannot parse {:?}: {}", s, e);
            Error::invalid_argument("tointeger", e.to_string())
        });
    }
    Err(mismatch("tointeger", "number or numeric string", &args[0]))
}

pub(super) fn to_string(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("tostring", args, 1)?;
    let c = constant("tostring", &args[0])?;
    if c.is_null() || c.is_string() {
        return Ok(c.clone());
    }
    if c.is_scalar() {
        return Ok(FieldData::from(c.to_string()));
    }
    Err(mismatch("tostring", "scalar value", &args[0]))
}
