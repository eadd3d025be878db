//! Eager-load paths.
//!
//! An [`EagerPath`] names a relation to fetch together with the primary
//! entity, written as dot-separated segments (`"supplier"`,
//! `"order.lines.product"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpecError};

/// A validated, dot-separated relation path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EagerPath {
    segments: Vec<String>,
}

impl EagerPath {
    /// Parses a dotted path. Empty paths and empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(SpecError::NullArgument {
                argument: "include path",
            });
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(SpecError::InvalidIncludePath {
                path: path.to_string(),
            });
        }
        Ok(EagerPath { segments })
    }

    /// Extends this path by one nested relation.
    pub fn then(&self, segment: &str) -> Result<Self> {
        if segment.is_empty() || segment.contains('.') {
            return Err(SpecError::InvalidIncludePath {
                path: format!("{self}.{segment}"),
            });
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(EagerPath { segments })
    }

    /// Returns the path segments, outermost relation first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first relation on the path.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Returns the number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for EagerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for EagerPath {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self> {
        EagerPath::parse(s)
    }
}

impl TryFrom<String> for EagerPath {
    type Error = SpecError;

    fn try_from(s: String) -> Result<Self> {
        EagerPath::parse(&s)
    }
}

impl TryFrom<&str> for EagerPath {
    type Error = SpecError;

    fn try_from(s: &str) -> Result<Self> {
        EagerPath::parse(s)
    }
}

impl From<EagerPath> for String {
    fn from(path: EagerPath) -> Self {
        path.to_string()
    }
}
