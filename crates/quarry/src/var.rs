//! Bound entity variables.
//!
//! Every predicate leaf names the variable it reads from. A specification
//! binds exactly one variable, but two independently built specifications may
//! bind different ones, which is what [`Unifier`](crate::Unifier) reconciles.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the variable used when none is given.
pub const DEFAULT_VAR: &str = "x";

/// A named slot standing for the entity instance a predicate is evaluated on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Var(Cow<'static, str>);

impl Var {
    /// Creates a variable with the given name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Var(name.into())
    }

    /// Returns the variable name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Var {
    fn default() -> Self {
        Var(Cow::Borrowed(DEFAULT_VAR))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Var {
    fn from(name: &'static str) -> Self {
        Var::new(name)
    }
}

impl From<String> for Var {
    fn from(name: String) -> Self {
        Var::new(name)
    }
}
