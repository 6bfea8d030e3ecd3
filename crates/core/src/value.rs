//! Scalar value definitions.
//!
//! `ScalarValue` is the leaf of the value model. It carries a total order across
//! kinds so that sorting, grouping and comparison operators agree with each other:
//!
//! `Null < Bool < numeric < String < Date < DateTime < Point < LineString < Polygon < FloatVector`
//!
//! Within the numeric kinds, values compare by mathematical value regardless of width,
//! so `Int32(1) == Int64(1) == Double(1.0)`. NaN sorts above every other number.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use chrono::{NaiveDate, NaiveDateTime};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A spatial value stored as its well-known-text form plus spatial reference id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Geometry {
    pub srid: u32,
    pub wkt: String,
}

impl Geometry {
    pub fn new(srid: u32, wkt: impl Into<String>) -> Self {
        Self {
            srid,
            wkt: wkt.into(),
        }
    }
}

/// A single, non-composite property value.
#[derive(Clone, Debug)]
pub enum ScalarValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without zone
    DateTime(NaiveDateTime),
    /// Spatial point
    Point(Geometry),
    /// Spatial line string
    LineString(Geometry),
    /// Spatial polygon
    Polygon(Geometry),
    /// Dense float vector (embeddings)
    FloatVector(Vec<f32>),
}

/// Numeric view used for cross-width comparison and hashing.
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Real(f64),
}

const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Returns the exact integer value of `r` if it has one that fits in i64.
fn integral(r: f64) -> Option<i64> {
    if r >= I64_LOWER && r < I64_UPPER {
        let i = r as i64;
        if i as f64 == r {
            return Some(i);
        }
    }
    None
}

fn real_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn int_real_cmp(i: i64, r: f64) -> Ordering {
    if r.is_nan() || r >= I64_UPPER {
        return Ordering::Less;
    }
    if r < I64_LOWER {
        return Ordering::Greater;
    }
    match integral(r) {
        Some(ri) => i.cmp(&ri),
        None => real_cmp(i as f64, r),
    }
}

impl Num {
    fn cmp(self, other: Num) -> Ordering {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.cmp(&b),
            (Num::Real(a), Num::Real(b)) => real_cmp(a, b),
            (Num::Int(a), Num::Real(b)) => int_real_cmp(a, b),
            (Num::Real(a), Num::Int(b)) => int_real_cmp(b, a).reverse(),
        }
    }
}

impl ScalarValue {
    /// Returns the rank of this value's kind in the cross-kind total order.
    pub fn kind_rank(&self) -> u8 {
        match self {
            ScalarValue::Null => 0,
            ScalarValue::Bool(_) => 1,
            ScalarValue::Int8(_)
            | ScalarValue::Int16(_)
            | ScalarValue::Int32(_)
            | ScalarValue::Int64(_)
            | ScalarValue::Float(_)
            | ScalarValue::Double(_) => 2,
            ScalarValue::String(_) => 3,
            ScalarValue::Date(_) => 4,
            ScalarValue::DateTime(_) => 5,
            ScalarValue::Point(_) => 6,
            ScalarValue::LineString(_) => 7,
            ScalarValue::Polygon(_) => 8,
            ScalarValue::FloatVector(_) => 9,
        }
    }

    /// Returns a short name for this value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Null => "Null",
            ScalarValue::Bool(_) => "Bool",
            ScalarValue::Int8(_) => "Int8",
            ScalarValue::Int16(_) => "Int16",
            ScalarValue::Int32(_) => "Int32",
            ScalarValue::Int64(_) => "Int64",
            ScalarValue::Float(_) => "Float",
            ScalarValue::Double(_) => "Double",
            ScalarValue::String(_) => "String",
            ScalarValue::Date(_) => "Date",
            ScalarValue::DateTime(_) => "DateTime",
            ScalarValue::Point(_) => "Point",
            ScalarValue::LineString(_) => "LineString",
            ScalarValue::Polygon(_) => "Polygon",
            ScalarValue::FloatVector(_) => "FloatVector",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, ScalarValue::Bool(_))
    }

    /// Returns true for any of the integer widths.
    #[inline]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ScalarValue::Int8(_)
                | ScalarValue::Int16(_)
                | ScalarValue::Int32(_)
                | ScalarValue::Int64(_)
        )
    }

    /// Returns true for Float or Double.
    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self, ScalarValue::Float(_) | ScalarValue::Double(_))
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_real()
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, ScalarValue::String(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value widened to i64 if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int8(v) => Some(*v as i64),
            ScalarValue::Int16(v) => Some(*v as i64),
            ScalarValue::Int32(v) => Some(*v as i64),
            ScalarValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as f64 if this is an integer or real.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(v) => Some(*v as f64),
            ScalarValue::Double(v) => Some(*v),
            _ => self.as_i64().map(|i| i as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_num(&self) -> Option<Num> {
        match self {
            ScalarValue::Float(v) => Some(Num::Real(*v as f64)),
            ScalarValue::Double(v) => Some(Num::Real(*v)),
            _ => self.as_i64().map(Num::Int),
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return a.cmp(b);
        }
        match (self, other) {
            (ScalarValue::Null, ScalarValue::Null) => Ordering::Equal,
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a.cmp(b),
            (ScalarValue::String(a), ScalarValue::String(b)) => a.cmp(b),
            (ScalarValue::Date(a), ScalarValue::Date(b)) => a.cmp(b),
            (ScalarValue::DateTime(a), ScalarValue::DateTime(b)) => a.cmp(b),
            (ScalarValue::Point(a), ScalarValue::Point(b))
            | (ScalarValue::LineString(a), ScalarValue::LineString(b))
            | (ScalarValue::Polygon(a), ScalarValue::Polygon(b)) => a.cmp(b),
            (ScalarValue::FloatVector(a), ScalarValue::FloatVector(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.total_cmp(y) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            // Different kinds: order by kind rank
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind_rank().hash(state);
        if let Some(num) = self.as_num() {
            // Equal numbers must hash equally across widths.
            match num {
                Num::Int(i) => i.hash(state),
                Num::Real(r) if r.is_nan() => u64::MAX.hash(state),
                Num::Real(r) => match integral(r) {
                    Some(i) => i.hash(state),
                    None => r.to_bits().hash(state),
                },
            }
            return;
        }
        match self {
            ScalarValue::Bool(b) => b.hash(state),
            ScalarValue::String(s) => s.hash(state),
            ScalarValue::Date(d) => d.hash(state),
            ScalarValue::DateTime(d) => d.hash(state),
            ScalarValue::Point(g) | ScalarValue::LineString(g) | ScalarValue::Polygon(g) => {
                g.hash(state)
            }
            ScalarValue::FloatVector(v) => {
                v.len().hash(state);
                for f in v {
                    f.to_bits().hash(state);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Int8(v) => write!(f, "{}", v),
            ScalarValue::Int16(v) => write!(f, "{}", v),
            ScalarValue::Int32(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::Float(v) => write!(f, "{:?}", v),
            ScalarValue::Double(v) => write!(f, "{:?}", v),
            ScalarValue::String(s) => write!(f, "{}", s),
            ScalarValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ScalarValue::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            ScalarValue::Point(g) | ScalarValue::LineString(g) | ScalarValue::Polygon(g) => {
                write!(f, "{}", g.wkt)
            }
            ScalarValue::FloatVector(v) => {
                let items: Vec<String> = v.iter().map(|x| format!("{:?}", x)).collect();
                write!(f, "[{}]", items.join(","))
            }
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i8> for ScalarValue {
    fn from(v: i8) -> Self {
        ScalarValue::Int8(v)
    }
}

impl From<i16> for ScalarValue {
    fn from(v: i16) -> Self {
        ScalarValue::Int16(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int32(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int64(v)
    }
}

impl From<f32> for ScalarValue {
    fn from(v: f32) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Double(v)
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::String(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::String(v.to_string())
    }
}

impl From<NaiveDate> for ScalarValue {
    fn from(v: NaiveDate) -> Self {
        ScalarValue::Date(v)
    }
}

impl From<NaiveDateTime> for ScalarValue {
    fn from(v: NaiveDateTime) -> Self {
        ScalarValue::DateTime(v)
    }
}

impl<T> From<Option<T>> for ScalarValue
where
    T: Into<ScalarValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => ScalarValue::Null,
        }
    }
}
