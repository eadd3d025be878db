//! Comparison operators for predicate leaves.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator of a [`Clause`](crate::Clause).
///
/// `Before`/`After` read naturally on timestamps and `Is` on booleans; they
/// evaluate as `Lt`/`Gt`/`Eq`. `IsNull` and `NotNull` ignore the clause value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,

    StartsWith,
    EndsWith,
    Contains,
    Regex,

    Before,
    After,
    /// Enum discriminant is one of a set.
    In,
    Is,

    IsNull,
    NotNull,
}

impl Op {
    /// Returns `true` if the operator only inspects nullability.
    pub fn is_null_check(self) -> bool {
        matches!(self, Op::IsNull | Op::NotNull)
    }

    /// Resolves `Before`, `After` and `Is` to the operator they evaluate as.
    pub fn normalize(self) -> Op {
        match self {
            Op::Before => Op::Lt,
            Op::After => Op::Gt,
            Op::Is => Op::Eq,
            other => other,
        }
    }

    /// Decides the clause from `field.cmp(operand)`.
    ///
    /// Operators that are not comparisons never hold.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self.normalize() {
            Op::Eq => ordering.is_eq(),
            Op::Ne => ordering.is_ne(),
            Op::Gt => ordering.is_gt(),
            Op::Gte => ordering.is_ge(),
            Op::Lt => ordering.is_lt(),
            Op::Lte => ordering.is_le(),
            _ => false,
        }
    }

    /// The operator's serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::StartsWith => "starts_with",
            Op::EndsWith => "ends_with",
            Op::Contains => "contains",
            Op::Regex => "regex",
            Op::Before => "before",
            Op::After => "after",
            Op::In => "in",
            Op::Is => "is",
            Op::IsNull => "is_null",
            Op::NotNull => "not_null",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
