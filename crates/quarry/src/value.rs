//! Runtime value types for field comparison.
//!
//! [`Value`] is what an [`Entity`](crate::Entity) hands back when a predicate
//! leaf or sort descriptor asks for one of its fields. [`Value::None`] is the
//! null value: it is what nullable sort keys rank and what `is_null` tests.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Runtime value for comparison, borrowed from the candidate entity.
///
/// # Example
///
/// ```
/// use quarry::{Entity, Number, Value};
///
/// struct Product {
///     name: String,
///     price: u32,
///     discontinued_on: Option<i64>,
/// }
///
/// impl Entity for Product {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "price" => Value::Number(Number::from(self.price)),
///             "discontinued_on" => self
///                 .discontinued_on
///                 .map_or(Value::None, |ms| Value::Timestamp(ms.into())),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Null, absent, or not queryable.
    None,
}

impl Value<'_> {
    /// Returns `true` if this is the null value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl<'a, V> From<Option<V>> for Value<'a>
where
    V: Into<Value<'a>>,
{
    fn from(value: Option<V>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(s)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value<'_> {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Timestamp> for Value<'_> {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Comparisons between variants are exact: `I64(5)`, `U64(5)` and `F64(5.0)`
/// are equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Returns `true` for a floating point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        Some(self.total_cmp(other))
    }

    /// Total order over numbers: NaN is greater than every other number and
    /// equal to itself.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a.cmp(&b),
            (Number::U64(a), Number::U64(b)) => a.cmp(&b),
            (Number::F64(a), Number::F64(b)) => match (a.is_nan(), b.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            },
            (Number::I64(a), Number::U64(b)) => i128::from(a).cmp(&i128::from(b)),
            (Number::U64(a), Number::I64(b)) => i128::from(a).cmp(&i128::from(b)),
            (Number::I64(a), Number::F64(b)) => compare_int_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => compare_int_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => compare_int_float(i128::from(b), a).reverse(),
            (Number::F64(a), Number::U64(b)) => compare_int_float(i128::from(b), a).reverse(),
        }
    }
}

// Exact for every i64/u64, unlike a round-trip through f64.
fn compare_int_float(int: i128, float: f64) -> Ordering {
    const BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127

    if float.is_nan() || float >= BOUND {
        return Ordering::Less;
    }
    if float < -BOUND {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(float - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(*other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

macro_rules! number_from {
    ($variant:ident: $target:ty => $($src:ty),+) => {
        $(
            impl From<$src> for Number {
                fn from(n: $src) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )+
    };
}

number_from!(I64: i64 => i8, i16, i32, i64, isize);
number_from!(U64: u64 => u8, u16, u32, u64, usize);
number_from!(F64: f64 => f32, f64);

macro_rules! value_from_number {
    ($($src:ty),+) => {
        $(
            impl From<$src> for Value<'_> {
                fn from(n: $src) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )+
    };
}

value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use quarry::Timestamp;
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}
