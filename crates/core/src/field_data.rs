//! Property values and their operator semantics.
//!
//! `FieldData` is either a scalar, an array, or a string-keyed map. All arithmetic,
//! comparison and logical operators used by the expression evaluator are defined here
//! so that null propagation and numeric promotion live in one place.
//!
//! Numeric rules:
//! - Integer with Integer stays Integer (checked i64 arithmetic).
//! - Any Real operand promotes the operation to f64.
//! - `pow` always yields a Double.
//! - Division or modulo by zero raises `DivisionByZero`.

use crate::error::{Error, Result};
use crate::value::ScalarValue;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use chrono::{NaiveDate, NaiveDateTime};
use core::cmp::Ordering;
use core::fmt;

/// A property value: scalar, array, or map.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldData {
    Scalar(ScalarValue),
    Array(Vec<FieldData>),
    Map(BTreeMap<String, FieldData>),
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    pub fn name(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "<>",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        }
    }

    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::NotEq => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::LtEq => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::GtEq => ord != Ordering::Less,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl ArithOp {
    fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "Add",
            ArithOp::Sub => "Sub",
            ArithOp::Mul => "Mul",
            ArithOp::Div => "Div",
            ArithOp::Mod => "Mod",
            ArithOp::Pow => "Pow",
        }
    }
}

impl FieldData {
    /// Returns a Null scalar.
    #[inline]
    pub fn null() -> Self {
        FieldData::Scalar(ScalarValue::Null)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldData::Scalar(ScalarValue::Null))
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self, FieldData::Scalar(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, FieldData::Array(_))
    }

    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, FieldData::Map(_))
    }

    pub fn is_bool(&self) -> bool {
        self.as_scalar().is_some_and(ScalarValue::is_bool)
    }

    pub fn is_integer(&self) -> bool {
        self.as_scalar().is_some_and(ScalarValue::is_integer)
    }

    pub fn is_real(&self) -> bool {
        self.as_scalar().is_some_and(ScalarValue::is_real)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_scalar().is_some_and(ScalarValue::is_numeric)
    }

    pub fn is_string(&self) -> bool {
        self.as_scalar().is_some_and(ScalarValue::is_string)
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            FieldData::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_scalar().and_then(ScalarValue::as_bool)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(ScalarValue::as_i64)
    }

    /// Returns the numeric value as f64 for integers and reals.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(ScalarValue::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    pub fn as_array(&self) -> Option<&[FieldData]> {
        match self {
            FieldData::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FieldData>> {
        match self {
            FieldData::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldData::Scalar(s) => s.type_name(),
            FieldData::Array(_) => "List",
            FieldData::Map(_) => "Map",
        }
    }

    pub fn add(&self, rhs: &FieldData) -> Result<FieldData> {
        self.arith(ArithOp::Add, rhs)
    }

    pub fn sub(&self, rhs: &FieldData) -> Result<FieldData> {
        self.arith(ArithOp::Sub, rhs)
    }

    pub fn mul(&self, rhs: &FieldData) -> Result<FieldData> {
        self.arith(ArithOp::Mul, rhs)
    }

    pub fn div(&self, rhs: &FieldData) -> Result<FieldData> {
        self.arith(ArithOp::Div, rhs)
    }

    pub fn modulo(&self, rhs: &FieldData) -> Result<FieldData> {
        self.arith(ArithOp::Mod, rhs)
    }

    pub fn pow(&self, rhs: &FieldData) -> Result<FieldData> {
        self.arith(ArithOp::Pow, rhs)
    }

    fn arith(&self, op: ArithOp, rhs: &FieldData) -> Result<FieldData> {
        if self.is_null() || rhs.is_null() {
            return Ok(FieldData::null());
        }
        if op == ArithOp::Add {
            match (self, rhs) {
                (FieldData::Array(l), FieldData::Array(r)) => {
                    let mut out = l.clone();
                    out.extend(r.iter().cloned());
                    return Ok(FieldData::Array(out));
                }
                (FieldData::Array(l), other) => {
                    let mut out = l.clone();
                    out.push(other.clone());
                    return Ok(FieldData::Array(out));
                }
                (other, FieldData::Array(r)) => {
                    let mut out = Vec::with_capacity(r.len() + 1);
                    out.push(other.clone());
                    out.extend(r.iter().cloned());
                    return Ok(FieldData::Array(out));
                }
                _ => {}
            }
            if self.is_string() || rhs.is_string() {
                if self.is_bool() || rhs.is_bool() || self.is_map() || rhs.is_map() {
                    return Err(self.mismatch(op.name(), rhs));
                }
                let mut out = self.to_string();
                out.push_str(&rhs.to_string());
                return Ok(FieldData::from(out));
            }
        }
        let (l, r) = match (self.as_scalar(), rhs.as_scalar()) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => (l, r),
            _ => return Err(self.mismatch(op.name(), rhs)),
        };
        if op != ArithOp::Pow {
            if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
                return integer_arith(op, a, b).map(FieldData::from);
            }
        }
        // Both numeric, so both convert to f64.
        let a = l.as_f64().unwrap_or(0.0);
        let b = r.as_f64().unwrap_or(0.0);
        real_arith(op, a, b).map(FieldData::from)
    }

    /// Arithmetic negation. Null stays Null.
    pub fn neg(&self) -> Result<FieldData> {
        match self.as_scalar() {
            Some(ScalarValue::Null) => Ok(FieldData::null()),
            Some(s) if s.is_integer() => s
                .as_i64()
                .and_then(i64::checked_neg)
                .map(FieldData::from)
                .ok_or_else(|| Error::type_mismatch("Neg", "integer overflow")),
            Some(s) if s.is_real() => Ok(FieldData::from(-s.as_f64().unwrap_or(0.0))),
            _ => Err(Error::type_mismatch(
                "Neg",
                format!("cannot negate {}", self.type_name()),
            )),
        }
    }

    /// Boolean negation. Null stays Null.
    pub fn not(&self) -> Result<FieldData> {
        if self.is_null() {
            return Ok(FieldData::null());
        }
        match self.as_bool() {
            Some(b) => Ok(FieldData::from(!b)),
            None => Err(Error::type_mismatch(
                "Not",
                format!("expected Bool, got {}", self.type_name()),
            )),
        }
    }

    /// Three-valued AND.
    pub fn and(&self, rhs: &FieldData) -> Result<FieldData> {
        let (l, r) = (logic_operand("And", self)?, logic_operand("And", rhs)?);
        Ok(match (l, r) {
            (Some(false), _) | (_, Some(false)) => FieldData::from(false),
            (Some(true), Some(true)) => FieldData::from(true),
            _ => FieldData::null(),
        })
    }

    /// Three-valued OR.
    pub fn or(&self, rhs: &FieldData) -> Result<FieldData> {
        let (l, r) = (logic_operand("Or", self)?, logic_operand("Or", rhs)?);
        Ok(match (l, r) {
            (Some(true), _) | (_, Some(true)) => FieldData::from(true),
            (Some(false), Some(false)) => FieldData::from(false),
            _ => FieldData::null(),
        })
    }

    /// Three-valued XOR.
    pub fn xor(&self, rhs: &FieldData) -> Result<FieldData> {
        let (l, r) = (logic_operand("Xor", self)?, logic_operand("Xor", rhs)?);
        Ok(match (l, r) {
            (Some(a), Some(b)) => FieldData::from(a ^ b),
            _ => FieldData::null(),
        })
    }

    /// Applies a comparison operator.
    ///
    /// `Null = Null` is true and `Null <> Null` is false. With exactly one Null side,
    /// equality is false, inequality is true and ordering operators yield Null.
    /// Comparing a scalar against a list or map is a type error.
    pub fn compare(&self, op: CmpOp, rhs: &FieldData) -> Result<FieldData> {
        if self.is_null() || rhs.is_null() {
            let both = self.is_null() && rhs.is_null();
            return Ok(match op {
                CmpOp::Eq => FieldData::from(both),
                CmpOp::NotEq => FieldData::from(!both),
                _ => FieldData::null(),
            });
        }
        if self.is_scalar() != rhs.is_scalar() || self.is_array() != rhs.is_array() {
            return Err(self.mismatch(op.name(), rhs));
        }
        Ok(FieldData::from(op.holds(self.cmp(rhs))))
    }

    fn mismatch(&self, op: &str, rhs: &FieldData) -> Error {
        Error::type_mismatch(op, format!("{} and {}", self.type_name(), rhs.type_name()))
    }
}

fn logic_operand(op: &str, v: &FieldData) -> Result<Option<bool>> {
    if v.is_null() {
        return Ok(None);
    }
    v.as_bool()
        .map(Some)
        .ok_or_else(|| Error::type_mismatch(op, format!("expected Bool, got {}", v.type_name())))
}

fn integer_arith(op: ArithOp, a: i64, b: i64) -> Result<i64> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div | ArithOp::Mod if b == 0 => return Err(Error::DivisionByZero),
        ArithOp::Div => a.checked_div(b),
        ArithOp::Mod => a.checked_rem(b),
        ArithOp::Pow => return Err(Error::internal("integer pow is computed as real")),
    };
    result.ok_or_else(|| Error::type_mismatch(op.name(), "integer overflow"))
}

fn real_arith(op: ArithOp, a: f64, b: f64) -> Result<f64> {
    Ok(match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div | ArithOp::Mod if b == 0.0 => return Err(Error::DivisionByZero),
        ArithOp::Div => a / b,
        ArithOp::Mod => a % b,
        ArithOp::Pow => libm::pow(a, b),
    })
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldData::Scalar(s) => write!(f, "{}", s),
            FieldData::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FieldData::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Default for FieldData {
    fn default() -> Self {
        FieldData::null()
    }
}

impl From<ScalarValue> for FieldData {
    fn from(v: ScalarValue) -> Self {
        FieldData::Scalar(v)
    }
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldData {
                fn from(v: $t) -> Self {
                    FieldData::Scalar(ScalarValue::from(v))
                }
            }
        )*
    };
}

scalar_from!(bool, i8, i16, i32, i64, f32, f64, String, &str, NaiveDate, NaiveDateTime);

impl From<Vec<FieldData>> for FieldData {
    fn from(v: Vec<FieldData>) -> Self {
        FieldData::Array(v)
    }
}

impl From<BTreeMap<String, FieldData>> for FieldData {
    fn from(v: BTreeMap<String, FieldData>) -> Self {
        FieldData::Map(v)
    }
}
