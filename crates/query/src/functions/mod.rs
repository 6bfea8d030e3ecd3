//! Built-in scalar functions.
//!
//! The registry is a static, sorted table shared read-only by every evaluator. Names
//! are matched after lowercasing; names that are not built in are forwarded to the
//! runtime context's plugin host.

mod convert;
mod entity;
mod list;
mod math;
mod string;
mod temporal;

use crate::context::RuntimeContext;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::{Entry, Error, FieldData, Result};

/// Signature shared by all built-in functions. Arguments are already evaluated.
pub type BuiltinFn = fn(&RuntimeContext<'_>, &[Entry]) -> Result<FieldData>;

/// Name of the internal function that turns path elements into a path value.
pub const TO_PATH: &str = "_topath";

/// Built-ins, sorted by name.
static BUILTINS: &[(&str, BuiltinFn)] = &[
    ("_topath", entity::to_path),
    ("abs", math::abs),
    ("ceil", math::ceil),
    ("coalesce", list::coalesce),
    ("concat", string::concat),
    ("contains", string::contains),
    ("date", temporal::date),
    ("datetime", temporal::datetime),
    ("datetimecomponent", temporal::datetime_component),
    ("endnode", entity::end_node),
    ("endswith", string::ends_with),
    ("euid", entity::euid),
    ("exists", list::exists),
    ("floor", math::floor),
    ("head", list::head),
    ("id", entity::id),
    ("keys", entity::keys),
    ("label", entity::label),
    ("labels", entity::labels),
    ("last", list::last),
    ("left", string::left),
    ("length", list::size),
    ("ltrim", string::ltrim),
    ("properties", entity::properties),
    ("range", list::range),
    ("replace", string::replace),
    ("reverse", string::reverse),
    ("right", string::right),
    ("round", math::round),
    ("rtrim", string::rtrim),
    ("sign", math::sign),
    ("size", list::size),
    ("split", string::split),
    ("startnode", entity::start_node),
    ("startswith", string::starts_with),
    ("subscript", list::subscript),
    ("substring", string::substring),
    ("toboolean", convert::to_boolean),
    ("tofloat", convert::to_float),
    ("tofloat32list", list::to_float32_list),
    ("tointeger", convert::to_integer),
    ("tolower", string::to_lower),
    ("tostring", convert::to_string),
    ("toupper", string::to_upper),
    ("trim", string::trim),
    ("type", entity::rel_type),
];

/// Looks up a built-in by lowercase name.
pub fn lookup(name: &str) -> Option<BuiltinFn> {
    BUILTINS
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| BUILTINS[i].1)
}

/// Calls a function by name: built-ins first, then the plugin host.
pub fn invoke(ctx: &RuntimeContext<'_>, name: &str, args: &[Entry]) -> Result<FieldData> {
    let lower = name.to_lowercase();
    if let Some(f) = lookup(&lower) {
        return f(ctx, args);
    }
    let Some(host) = ctx.plugins() else {
        return Err(Error::plugin_not_found(name));
    };
    let values = args
        .iter()
        .map(|a| match a {
            Entry::Constant(c) => Ok(c.clone()),
            other => Err(Error::invalid_argument(
                name,
                format!("plugins accept values only, got {}", other.kind_name()),
            )),
        })
        .collect::<Result<Vec<_>>>()?;
    host.call(name, &values)?
        .ok_or_else(|| Error::plugin_not_found(name))
}

// ---- argument helpers shared by the function modules ----

pub(crate) fn expect_arity(function: &str, args: &[Entry], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(Error::invalid_argument(
            function,
            format!("expected {} argument(s), got {}", expected, args.len()),
        ));
    }
    Ok(())
}

pub(crate) fn expect_arity_range(
    function: &str,
    args: &[Entry],
    min: usize,
    max: usize,
) -> Result<()> {
    if args.len() < min || args.len() > max {
        return Err(Error::invalid_argument(
            function,
            format!("expected {} to {} arguments, got {}", min, max, args.len()),
        ));
    }
    Ok(())
}

pub(crate) fn constant<'e>(function: &str, arg: &'e Entry) -> Result<&'e FieldData> {
    arg.as_constant().ok_or_else(|| {
        Error::invalid_argument(function, format!("expected a value, got {}", arg.kind_name()))
    })
}

/// Reads a string argument. Null reads as `None`.
pub(crate) fn string_arg<'e>(function: &str, arg: &'e Entry) -> Result<Option<&'e str>> {
    let c = constant(function, arg)?;
    if c.is_null() {
        return Ok(None);
    }
    c.as_str().map(Some).ok_or_else(|| {
        Error::invalid_argument(function, format!("expected String, got {}", c.type_name()))
    })
}

/// Reads a required integer argument.
pub(crate) fn int_arg(function: &str, arg: &Entry) -> Result<i64> {
    let c = constant(function, arg)?;
    c.as_i64().ok_or_else(|| {
        Error::invalid_argument(function, format!("expected Integer, got {}", c.type_name()))
    })
}

pub(crate) fn mismatch(function: &str, expected: &str, got: &Entry) -> Error {
    Error::invalid_argument(
        function,
        format!("expected {}, got {}", expected, got.kind_name()),
    )
}

pub(crate) fn strings(items: impl IntoIterator<Item = String>) -> FieldData {
    FieldData::Array(items.into_iter().map(FieldData::from).collect())
}
