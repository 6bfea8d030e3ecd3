//! String functions.
//!
//! Positions and lengths count characters, not bytes.

use super::{expect_arity, int_arg, string_arg, strings};
use crate::context::RuntimeContext;
use alloc::format;
use alloc::string::String;
use strata_core::{Entry, Error, FieldData, Result};

/// Applies `f` to a single string argument; Null stays Null.
fn map_string(function: &str, args: &[Entry], f: fn(&str) -> String) -> Result<FieldData> {
    expect_arity(function, args, 1)?;
    Ok(match string_arg(function, &args[0])? {
        Some(s) => FieldData::from(f(s)),
        None => FieldData::null(),
    })
}

pub(super) fn to_lower(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    map_string("tolower", args, |s| s.to_lowercase())
}

pub(super) fn to_upper(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    map_string("toupper", args, |s| s.to_uppercase())
}

pub(super) fn trim(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    map_string("trim", args, |s| String::from(s.trim()))
}

pub(super) fn ltrim(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    map_string("ltrim", args, |s| String::from(s.trim_start()))
}

pub(super) fn rtrim(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    map_string("rtrim", args, |s| String::from(s.trim_end()))
}

pub(super) fn reverse(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    map_string("reverse", args, |s| s.chars().rev().collect())
}

/// `replace(subject, search, replacement)`, all occurrences.
pub(super) fn replace(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("replace", args, 3)?;
    let (Some(s), Some(from), Some(to)) = (
        string_arg("replace", &args[0])?,
        string_arg("replace", &args[1])?,
        string_arg("replace", &args[2])?,
    ) else {
        return Ok(FieldData::null());
    };
    if from.is_empty() {
        return Ok(FieldData::from(s));
    }
    Ok(FieldData::from(s.replace(from, to)))
}

/// `split(subject, delimiters)` splits on any of the delimiter characters.
pub(super) fn split(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("split", args, 2)?;
    let (Some(s), Some(delims)) = (string_arg("split", &args[0])?, string_arg("split", &args[1])?)
    else {
        return Ok(FieldData::null());
    };
    if delims.is_empty() {
        return Ok(strings([String::from(s)]));
    }
    Ok(strings(
        s.split(|ch: char| delims.contains(ch)).map(String::from),
    ))
}

fn non_negative(function: &str, arg: &Entry) -> Result<usize> {
    let n = int_arg(function, arg)?;
    if n < 0 {
        return Err(Error::invalid_argument(
            function,
            format!("length must not be negative, got {}", n),
        ));
    }
    Ok(n as usize)
}

pub(super) fn left(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("left", args, 2)?;
    let n = non_negative("left", &args[1])?;
    Ok(match string_arg("left", &args[0])? {
        Some(s) => FieldData::from(s.chars().take(n).collect::<String>()),
        None => FieldData::null(),
    })
}

pub(super) fn right(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("right", args, 2)?;
    let n = non_negative("right", &args[1])?;
    Ok(match string_arg("right", &args[0])? {
        Some(s) => {
            let len = s.chars().count();
            FieldData::from(s.chars().skip(len.saturating_sub(n)).collect::<String>())
        }
        None => FieldData::null(),
    })
}

/// `substring(subject, start, length)` with a 1-based start. Both the start and the
/// end of the requested range must fall inside the string.
pub(super) fn substring(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    expect_arity("substring", args, 3)?;
    let s = string_arg("substring", &args[0])?.unwrap_or("");
    let start = int_arg("substring", &args[1])?;
    let length = int_arg("substring", &args[2])?;
    let size = s.chars().count() as i64;
    if start < 1 || start > size {
        return Err(Error::invalid_argument(
            "substring",
            format!("start {} out of range 1..={}", start, size),
        ));
    }
    if length < 1 || length > size - (start - 1) {
        return Err(Error::invalid_argument(
            "substring",
            format!("length {} runs past the end of the string", length),
        ));
    }
    let out: String = s
        .chars()
        .skip((start - 1) as usize)
        .take(length as usize)
        .collect();
    Ok(FieldData::from(out))
}

/// `concat(a, b, ...)`; every argument must be a string. A Null first argument reads as "".
pub(super) fn concat(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    if args.len() < 2 {
        return Err(Error::invalid_argument("concat", "expected at least 2 arguments"));
    }
    let mut out = String::from(string_arg("concat", &args[0])?.unwrap_or(""));
    for (i, arg) in args.iter().enumerate().skip(1) {
        match string_arg("concat", arg)? {
            Some(s) => out.push_str(s),
            None => {
                return Err(Error::invalid_argument(
                    "concat",
                    format!("argument {} expects String, got Null", i + 1),
                ))
            }
        }
    }
    Ok(FieldData::from(out))
}

/// Shared shape of `startswith` / `endswith` / `contains`: `(subject, needle)`.
/// A Null subject reads as the empty string.
fn string_predicate(
    function: &str,
    args: &[Entry],
    test: fn(&str, &str) -> bool,
) -> Result<FieldData> {
    expect_arity(function, args, 2)?;
    let subject = string_arg(function, &args[0])?.unwrap_or("");
    let Some(needle) = string_arg(function, &args[1])? else {
        return Ok(FieldData::null());
    };
    Ok(FieldData::from(test(subject, needle)))
}

pub(super) fn starts_with(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    string_predicate("startswith", args, |s, p| s.starts_with(p))
}

pub(super) fn ends_with(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    string_predicate("endswith", args, |s, p| s.ends_with(p))
}

pub(super) fn contains(_ctx: &RuntimeContext<'_>, args: &[Entry]) -> Result<FieldData> {
    string_predicate("contains", args, |s, p| s.contains(p))
}
