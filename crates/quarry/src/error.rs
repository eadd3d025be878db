//! Error types for building specifications.
//!
//! Every variant is a construction-time failure. Builders return them
//! immediately, so a [`Specification`](crate::Specification) that exists is
//! always well formed.

use thiserror::Error;

use crate::var::Var;

/// Errors raised while building criteria, sort chains, or specifications.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A chain combinator was used where the grammar forbids it.
    #[error("malformed criteria chain: {rule}")]
    MalformedChain { rule: &'static str },

    /// A group closure returned without adding any condition.
    #[error("group produced no condition")]
    EmptyGroup,

    /// A secondary sort operation was used before `order_by`.
    #[error("{operation} requires a preceding order_by()")]
    MissingPrimarySort { operation: &'static str },

    /// Skip/take or page arguments are out of range.
    #[error("invalid pagination: {reason}")]
    InvalidPagination { reason: &'static str },

    /// A required argument was empty.
    #[error("{argument} must not be empty")]
    NullArgument { argument: &'static str },

    /// An eager-load path contains an empty segment.
    #[error("invalid include path '{path}': empty segment")]
    InvalidIncludePath { path: String },

    /// A predicate leaf references a variable the specification does not bind.
    #[error("predicate references unbound variable '{var}'")]
    UnboundVariable { var: Var },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Result type for specification building.
pub type Result<T> = std::result::Result<T, SpecError>;
