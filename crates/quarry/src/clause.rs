//! Leaf conditions for predicate trees.
//!
//! A [`Clause`] is a single condition: a field name, an operator, and an owned
//! comparison value. Clauses are plain data, so a tree of them can be handed to
//! an external translator as-is.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::op::Op;
use crate::value::{Number, Timestamp, Value};

/// A single filter condition.
///
/// ```
/// use quarry::{Clause, Op, Value};
///
/// let clause = Clause::gt("price", 150);
/// assert_eq!(clause.op, Op::Gt);
/// assert!(clause.matches(&Value::Number(200u32.into())));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: ClauseValue,
}

impl Clause {
    /// Creates a new clause.
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<ClauseValue>) -> Self {
        Clause {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Clause::new(field, Op::Eq, value)
    }

    /// Field does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Clause::new(field, Op::Ne, value)
    }

    /// Field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Clause::new(field, Op::Gt, value)
    }

    /// Field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Clause::new(field, Op::Gte, value)
    }

    /// Field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Clause::new(field, Op::Lt, value)
    }

    /// Field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<ClauseValue>) -> Self {
        Clause::new(field, Op::Lte, value)
    }

    /// Substring match.
    pub fn contains(field: impl Into<String>, value: &str) -> Self {
        Clause::new(field, Op::Contains, value)
    }

    /// String field starts with `value`.
    pub fn starts_with(field: impl Into<String>, value: &str) -> Self {
        Clause::new(field, Op::StartsWith, value)
    }

    /// String field ends with `value`.
    pub fn ends_with(field: impl Into<String>, value: &str) -> Self {
        Clause::new(field, Op::EndsWith, value)
    }

    /// Timestamp strictly earlier than `ts`.
    pub fn before(field: impl Into<String>, ts: Timestamp) -> Self {
        Clause::new(field, Op::Before, ts)
    }

    /// Timestamp strictly later than `ts`.
    pub fn after(field: impl Into<String>, ts: Timestamp) -> Self {
        Clause::new(field, Op::After, ts)
    }

    /// Enum discriminant is one of `values`.
    pub fn is_in<I>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Clause::new(field, Op::In, ClauseValue::EnumSet(values.into_iter().collect()))
    }

    /// Field is null.
    pub fn is_null(field: impl Into<String>) -> Self {
        Clause::new(field, Op::IsNull, ClauseValue::Null)
    }

    /// Field is not null.
    pub fn not_null(field: impl Into<String>) -> Self {
        Clause::new(field, Op::NotNull, ClauseValue::Null)
    }

    /// Regular expression match. The pattern is compiled here.
    pub fn regex(field: impl Into<String>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Clause::new(field, Op::Regex, Pattern(regex)))
    }

    /// Evaluates this clause against a field value.
    ///
    /// Null values only satisfy `IsNull`. Type mismatches never match.
    pub fn matches(&self, field_value: &Value<'_>) -> bool {
        match self.op {
            Op::IsNull => return field_value.is_none(),
            Op::NotNull => return !field_value.is_none(),
            _ => {}
        }

        match (&self.value, field_value) {
            (ClauseValue::String(pattern), Value::String(s)) => self.match_string(s, pattern),
            (ClauseValue::Regex(pattern), Value::String(s)) => {
                self.op == Op::Regex && pattern.0.is_match(s)
            }
            (ClauseValue::Number(clause_num), Value::Number(field_num)) => field_num
                .compare(*clause_num)
                .is_some_and(|ordering| self.op.eval_ordering(ordering)),
            (ClauseValue::Timestamp(clause_ts), Value::Timestamp(field_ts)) => {
                self.op.eval_ordering(field_ts.cmp(clause_ts))
            }
            (ClauseValue::Enum(clause_disc), Value::Enum(field_disc)) => {
                self.match_equality(field_disc == clause_disc)
            }
            (ClauseValue::EnumSet(set), Value::Enum(field_disc)) => {
                self.op == Op::In && set.contains(field_disc)
            }
            (ClauseValue::Bool(clause_bool), Value::Bool(field_bool)) => {
                self.match_equality(field_bool == clause_bool)
            }
            _ => false,
        }
    }

    fn match_string(&self, field: &str, pattern: &str) -> bool {
        match self.op.normalize() {
            Op::Eq => field == pattern,
            Op::Ne => field != pattern,
            Op::StartsWith => field.starts_with(pattern),
            Op::EndsWith => field.ends_with(pattern),
            Op::Contains => field.contains(pattern),
            Op::Gt | Op::Gte | Op::Lt | Op::Lte => self.op.eval_ordering(field.cmp(pattern)),
            _ => false,
        }
    }

    fn match_equality(&self, equal: bool) -> bool {
        match self.op.normalize() {
            Op::Eq => equal,
            Op::Ne => !equal,
            _ => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.is_null_check() {
            write!(f, "{} {}", self.field, self.op)
        } else {
            write!(f, "{} {} {}", self.field, self.op, self.value)
        }
    }
}

/// Owned value stored in a clause.
///
/// Unlike [`Value`], which borrows from the candidate, `ClauseValue` owns its
/// data so it can live inside a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClauseValue {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    /// Single enum discriminant.
    Enum(u32),
    /// Set of enum discriminants (for `In`).
    EnumSet(Vec<u32>),
    Bool(bool),
    /// Compiled regular expression.
    Regex(Pattern),
    /// Operand of the nullability operators.
    Null,
}

impl fmt::Display for ClauseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseValue::String(s) => write!(f, "{s:?}"),
            ClauseValue::Number(Number::I64(n)) => write!(f, "{n}"),
            ClauseValue::Number(Number::U64(n)) => write!(f, "{n}"),
            ClauseValue::Number(Number::F64(n)) => write!(f, "{n}"),
            ClauseValue::Timestamp(ts) => write!(f, "@{}", ts.as_millis()),
            ClauseValue::Enum(d) => write!(f, "#{d}"),
            ClauseValue::EnumSet(set) => write!(f, "{set:?}"),
            ClauseValue::Bool(b) => write!(f, "{b}"),
            ClauseValue::Regex(p) => write!(f, "/{}/", p.as_str()),
            ClauseValue::Null => f.write_str("null"),
        }
    }
}

/// A compiled regular expression that serializes as its source pattern.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Returns the source pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source)
            .map(Pattern)
            .map_err(serde::de::Error::custom)
    }
}

impl From<Pattern> for ClauseValue {
    fn from(p: Pattern) -> Self {
        ClauseValue::Regex(p)
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        ClauseValue::String(s)
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::String(s.to_string())
    }
}

impl From<Number> for ClauseValue {
    fn from(n: Number) -> Self {
        ClauseValue::Number(n)
    }
}

impl From<Timestamp> for ClauseValue {
    fn from(t: Timestamp) -> Self {
        ClauseValue::Timestamp(t)
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        ClauseValue::Bool(b)
    }
}

impl From<Vec<u32>> for ClauseValue {
    fn from(v: Vec<u32>) -> Self {
        ClauseValue::EnumSet(v)
    }
}

macro_rules! clause_value_from_number {
    ($($t:ty),+) => {
        $(
            impl From<$t> for ClauseValue {
                fn from(n: $t) -> Self {
                    ClauseValue::Number(Number::from(n))
                }
            }
        )+
    };
}

clause_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
