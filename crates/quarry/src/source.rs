//! Query sources.
//!
//! A [`QuerySource`] is whatever a specification is eventually run against:
//! an ORM query builder, a remote API client, or the in-memory
//! [`MemorySource`]. The evaluator only ever calls these five operations, in
//! pipeline order, and hands the resulting source back to the caller, which
//! decides when (and whether) to execute it.

use crate::entity::Entity;
use crate::include::EagerPath;
use crate::node::Node;
use crate::sort::{compare_by_descriptors, SortDescriptor};
use crate::var::Var;

/// Operations a backend exposes to the evaluator.
///
/// Each operation consumes the source and returns the refined one, the way a
/// lazy query builder is chained. Backends that cannot express an operation
/// should translate what they can in a custom [`Stage`](crate::Stage).
pub trait QuerySource: Sized {
    /// The entity type the source yields.
    type Item;

    /// Keeps candidates for which `criteria`, bound to `var`, holds.
    fn filter(self, var: &Var, criteria: &Node) -> Self;

    /// Orders candidates lexicographically by `sorts`.
    fn order_by(self, sorts: &[SortDescriptor]) -> Self;

    fn skip(self, count: usize) -> Self;

    fn take(self, count: usize) -> Self;

    /// Requests that the relation at `path` be loaded with each candidate.
    fn include(self, path: &EagerPath) -> Self;
}

/// A [`QuerySource`] over borrowed, in-memory entities.
///
/// Includes have nothing to load in memory; they are recorded so callers can
/// see which relations were requested.
#[derive(Debug)]
pub struct MemorySource<'a, T> {
    items: Vec<&'a T>,
    included: Vec<EagerPath>,
}

impl<'a, T> MemorySource<'a, T> {
    /// Creates a source over every item of `items`, in order.
    pub fn new(items: &'a [T]) -> Self {
        MemorySource {
            items: items.iter().collect(),
            included: Vec::new(),
        }
    }

    /// Returns the number of remaining items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no item remains.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the first remaining item.
    pub fn first(&self) -> Option<&'a T> {
        self.items.first().copied()
    }

    /// Returns the remaining items.
    pub fn items(&self) -> &[&'a T] {
        &self.items
    }

    /// Paths passed to [`QuerySource::include`], in call order.
    pub fn included(&self) -> &[EagerPath] {
        &self.included
    }

    /// Consumes the source, returning the remaining items.
    pub fn into_vec(self) -> Vec<&'a T> {
        self.items
    }
}

impl<'a, T> FromIterator<&'a T> for MemorySource<'a, T> {
    fn from_iter<I: IntoIterator<Item = &'a T>>(iter: I) -> Self {
        MemorySource {
            items: iter.into_iter().collect(),
            included: Vec::new(),
        }
    }
}

impl<'a, T: Entity> QuerySource for MemorySource<'a, T> {
    type Item = T;

    fn filter(mut self, var: &Var, criteria: &Node) -> Self {
        self.items.retain(|item| criteria.evaluate(var, *item));
        self
    }

    fn order_by(mut self, sorts: &[SortDescriptor]) -> Self {
        if !sorts.is_empty() {
            // sort_by is stable, so equal keys keep their input order.
            self.items.sort_by(|a, b| compare_by_descriptors(sorts, *a, *b));
        }
        self
    }

    fn skip(mut self, count: usize) -> Self {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.items.truncate(count);
        self
    }

    fn include(mut self, path: &EagerPath) -> Self {
        self.included.push(path.clone());
        self
    }
}
