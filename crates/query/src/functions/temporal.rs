//! Temporal constructors.
//!
//! The engine has no clock, so the zero-argument forms are rejected.

use super::{constant, expect_arity, expect_arity_range, mismatch};
use crate::context::RuntimeContext;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use strata_core::{Entry, Error, FieldData, Result, ScalarValue};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn single_arg<'e>(function: &str, args: &'e [Entry]) -> Result<&'e FieldData> {
    expect_arity_range(function, args, 0, 1)?;
    match args.first() {
        Some(arg) => constant(function, arg),
        None => Err(Error::invalid_argument(
            function,
            "current time is not available; pass an ISO-8601 string",
        )),
    }
}

/// `date(str)` parses `YYYY-MM-DD`; a DateTime argument is truncated to its date.
pub(super) fn date(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    let c = single_arg("date", args)?;
    match c.as_scalar() {
        Some(ScalarValue::Null) | Some(ScalarValue::Date(_)) => Ok(c.clone()),
        Some(ScalarValue::DateTime(dt)) => Ok(FieldData::from(dt.date())),
        Some(ScalarValue::String(s)) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(FieldData::from)
            .map_err(|e| Error::invalid_argument("date", alloc::format!("{:?}: {}", s, e))),
        _ => Err(mismatch("date", "String or temporal value", &args[0])),
    }
}

/// `datetime(str)` accepts `YYYY-MM-DDTHH:MM:SS` or a space separator; a Date
/// argument becomes midnight of that day.
pub(super) fn datetime(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    let c = single_arg("datetime", args)?;
    match c.as_scalar() {
        Some(ScalarValue::Null) | Some(ScalarValue::DateTime(_)) => Ok(c.clone()),
        Some(ScalarValue::Date(d)) => Ok(FieldData::from(NaiveDateTime::from(*d))),
        Some(ScalarValue::String(s)) => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
            .map(FieldData::from)
            .ok_or_else(|| {
                Error::invalid_argument("datetime", alloc::format!("cannot parse {:?}", s))
            }),
        _ => Err(mismatch("datetime", "String or temporal value", &args[0])),
    }
}

/// `datetimecomponent(value, component)` extracts one field of a Date or DateTime.
/// Components: year, month, day, hour, minute, second, microsecond. A Date has a
/// zero time of day.
pub(super) fn datetime_component(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("datetimecomponent", args, 2)?;
    let value = constant("datetimecomponent", &args[0])?;
    let at = match value.as_scalar() {
        Some(ScalarValue::Null) => return Ok(FieldData::null()),
        Some(ScalarValue::Date(d)) => NaiveDateTime::from(*d),
        Some(ScalarValue::DateTime(dt)) => *dt,
        _ => return Err(mismatch("datetimecomponent", "Date or DateTime", &args[0])),
    };
    let Some(component) = constant("datetimecomponent", &args[1])?.as_str() else {
        return Err(mismatch("datetimecomponent", "String", &args[1]));
    };
    let n = match component.to_lowercase().as_str() {
        "year" => i64::from(at.year()),
        "month" => i64::from(at.month()),
        "day" => i64::from(at.day()),
        "hour" => i64::from(at.hour()),
        "minute" => i64::from(at.minute()),
        "second" => i64::from(at.second()),
        "microsecond" => i64::from(at.nanosecond() / 1_000),
        other => {
            return Err(Error::invalid_argument(
                "datetimecomponent",
                alloc::format!("unknown component {:?}", other),
            ))
        }
    };
    Ok(FieldData::from(n))
}
