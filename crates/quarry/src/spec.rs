//! Specifications and their builder.
//!
//! A [`Specification`] bundles everything one query needs: an optional
//! predicate tree bound to a variable, a sort chain, a pagination window and a
//! set of eager-load paths. It is immutable once built; combining two
//! specifications allocates a new one.
//!
//! # Example
//!
//! ```
//! use quarry::{Clause, Direction, Entity, Specification, Value};
//!
//! struct Product {
//!     name: &'static str,
//!     price: i64,
//!     active: bool,
//! }
//!
//! impl Entity for Product {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "name" => Value::from(self.name),
//!             "price" => Value::from(self.price),
//!             "active" => Value::from(self.active),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! # fn main() -> quarry::Result<()> {
//! let spec = Specification::<Product>::builder()
//!     .criteria(|c| c.where_(Clause::eq("active", true))?.or(Clause::gt("price", 150)))?
//!     .order_by("price", Direction::Descending)?
//!     .take(10)?
//!     .build();
//!
//! let products = [
//!     Product { name: "lamp", price: 40, active: true },
//!     Product { name: "desk", price: 120, active: false },
//!     Product { name: "sofa", price: 900, active: false },
//! ];
//!
//! let names: Vec<_> = spec.filter(&products).iter().map(|p| p.name).collect();
//! assert_eq!(names, ["sofa", "lamp"]);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::clause::Clause;
use crate::criteria::Criteria;
use crate::entity::Entity;
use crate::error::{Result, SpecError};
use crate::evaluator::Evaluator;
use crate::include::EagerPath;
use crate::node::Node;
use crate::page::{Page, Window};
use crate::sort::{Direction, SortChain};
use crate::source::MemorySource;
use crate::unify::{and_criteria, not_criteria, or_criteria};
use crate::var::Var;

/// An immutable, composable query over entities of type `T`.
///
/// `criteria() == None` means the specification matches every candidate.
/// The type parameter only ties the specification to an entity type; it is
/// never stored, so a specification is `Send + Sync` whatever `T` is.
#[derive(Serialize, Deserialize)]
#[serde(
    try_from = "SpecificationParts",
    into = "SpecificationParts",
    bound = ""
)]
pub struct Specification<T> {
    var: Var,
    criteria: Option<Node>,
    sorts: SortChain,
    window: Window,
    includes: BTreeSet<EagerPath>,
    _entity: PhantomData<fn(&T)>,
}

impl<T> Specification<T> {
    /// Starts a builder bound to the default variable.
    pub fn builder() -> SpecificationBuilder<T> {
        SpecificationBuilder::new()
    }

    /// A specification that matches every candidate.
    pub fn all() -> Self {
        Specification::with_criteria(Var::default(), None)
    }

    /// A specification that matches nothing.
    pub fn none() -> Self {
        Specification::with_criteria(Var::default(), Some(Node::Never))
    }

    /// Validates raw parts and assembles a specification from them.
    ///
    /// Every leaf of the criteria must be bound to `parts.var`.
    pub fn from_parts(parts: SpecificationParts) -> Result<Self> {
        Specification::try_from(parts)
    }

    fn with_criteria(var: Var, criteria: Option<Node>) -> Self {
        Specification {
            var,
            criteria,
            sorts: SortChain::default(),
            window: Window::default(),
            includes: BTreeSet::new(),
            _entity: PhantomData,
        }
    }

    /// Returns the variable the criteria are bound to.
    pub fn var(&self) -> &Var {
        &self.var
    }

    /// Returns the predicate tree, or `None` when every entity matches.
    pub fn criteria(&self) -> Option<&Node> {
        self.criteria.as_ref()
    }

    /// Returns the sort chain.
    pub fn sorts(&self) -> &SortChain {
        &self.sorts
    }

    /// Returns the number of results to skip, if set.
    pub fn skip(&self) -> Option<usize> {
        self.window.skip()
    }

    /// Returns the maximum number of results, if set.
    pub fn take(&self) -> Option<usize> {
        self.window.take()
    }

    /// Returns the skip/take window.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Returns the relation paths to load eagerly.
    pub fn includes(&self) -> &BTreeSet<EagerPath> {
        &self.includes
    }

    /// Returns `true` if the specification has no criteria.
    pub fn matches_all(&self) -> bool {
        self.criteria.is_none()
    }

    /// `self AND other`. The result has no sorts, window or includes.
    pub fn and(&self, other: &Self) -> Self {
        trace!(left = %self.var, right = %other.var, "composing specifications with and");
        let criteria = and_criteria(
            self.criteria.as_ref(),
            &self.var,
            other.criteria.as_ref(),
            &other.var,
        );
        Specification::with_criteria(self.var.clone(), criteria)
    }

    /// `self OR other`. The result has no sorts, window or includes.
    pub fn or(&self, other: &Self) -> Self {
        trace!(left = %self.var, right = %other.var, "composing specifications with or");
        let criteria = or_criteria(
            self.criteria.as_ref(),
            &self.var,
            other.criteria.as_ref(),
            &other.var,
        );
        Specification::with_criteria(self.var.clone(), criteria)
    }

    /// `NOT self`. The result has no sorts, window or includes.
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        Specification::with_criteria(self.var.clone(), not_criteria(self.criteria.as_ref()))
    }

    /// A builder holding this specification's state, for re-attaching sorts,
    /// pagination or includes after composition.
    pub fn to_builder(&self) -> SpecificationBuilder<T> {
        SpecificationBuilder {
            criteria: Criteria::resume(self.var.clone(), self.criteria.clone()),
            sorts: self.sorts.clone(),
            window: self.window,
            includes: self.includes.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Specification<T> {
    /// Evaluates the criteria against one candidate.
    ///
    /// Sorting, pagination and includes play no part here.
    pub fn is_satisfied_by(&self, candidate: &T) -> bool {
        match &self.criteria {
            None => true,
            Some(node) => node.evaluate(&self.var, candidate),
        }
    }

    /// The criteria as a predicate borrowing this specification.
    pub fn to_predicate(&self) -> impl Fn(&T) -> bool + '_ {
        move |candidate| self.is_satisfied_by(candidate)
    }

    /// Runs the full pipeline over a slice.
    pub fn filter<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        Evaluator::default()
            .apply(MemorySource::new(items), self)
            .into_vec()
    }

    /// Like [`filter`](Self::filter), returning owned clones.
    pub fn filter_cloned(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        self.filter(items).into_iter().cloned().collect()
    }

    /// Counts the items the pipeline would return, window included.
    pub fn count(&self, items: &[T]) -> usize {
        Evaluator::default()
            .apply_for_count(MemorySource::new(items), self)
            .len()
    }

    /// Returns `true` if at least one item is selected.
    pub fn any(&self, items: &[T]) -> bool {
        !Evaluator::default()
            .apply_for_exists(MemorySource::new(items), self)
            .is_empty()
    }

    /// First item of the pipeline's result.
    pub fn find<'a>(&self, items: &'a [T]) -> Option<&'a T> {
        Evaluator::default()
            .apply(MemorySource::new(items), self)
            .first()
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Specification {
            var: self.var.clone(),
            criteria: self.criteria.clone(),
            sorts: self.sorts.clone(),
            window: self.window,
            includes: self.includes.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("var", &self.var)
            .field("criteria", &self.criteria)
            .field("sorts", &self.sorts)
            .field("window", &self.window)
            .field("includes", &self.includes)
            .finish()
    }
}

impl<T> PartialEq for Specification<T> {
    fn eq(&self, other: &Self) -> bool {
        self.var == other.var
            && self.criteria == other.criteria
            && self.sorts == other.sorts
            && self.window == other.window
            && self.includes == other.includes
    }
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Specification::all()
    }
}

impl<T> fmt::Display for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} where ", self.var)?;
        match &self.criteria {
            Some(node) => write!(f, "{node}")?,
            None => f.write_str("true")?,
        }
        if !self.sorts.is_empty() {
            write!(f, " order by {}", self.sorts)?;
        }
        if let Some(skip) = self.window.skip() {
            write!(f, " skip {skip}")?;
        }
        if let Some(take) = self.window.take() {
            write!(f, " take {take}")?;
        }
        for path in &self.includes {
            write!(f, " include {path}")?;
        }
        Ok(())
    }
}

impl<T> BitAnd for &Specification<T> {
    type Output = Specification<T>;

    fn bitand(self, rhs: Self) -> Specification<T> {
        self.and(rhs)
    }
}

impl<T> BitOr for &Specification<T> {
    type Output = Specification<T>;

    fn bitor(self, rhs: Self) -> Specification<T> {
        self.or(rhs)
    }
}

impl<T> Not for &Specification<T> {
    type Output = Specification<T>;

    fn not(self) -> Specification<T> {
        Specification::not(self)
    }
}

/// The serialized form of a [`Specification`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificationParts {
    #[serde(default)]
    pub var: Var,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Node>,
    #[serde(default, skip_serializing_if = "SortChain::is_empty")]
    pub sorts: SortChain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub includes: BTreeSet<EagerPath>,
}

impl<T> TryFrom<SpecificationParts> for Specification<T> {
    type Error = SpecError;

    fn try_from(parts: SpecificationParts) -> Result<Self> {
        if let Some(node) = &parts.criteria {
            if let Some(foreign) = node.free_vars().into_iter().find(|v| **v != parts.var) {
                return Err(SpecError::UnboundVariable {
                    var: foreign.clone(),
                });
            }
        }
        let sorts = SortChain::from_descriptors(parts.sorts.descriptors().to_vec())?;
        let window = Window::new(parts.skip, parts.take)?;
        Ok(Specification {
            var: parts.var,
            criteria: parts.criteria,
            sorts,
            window,
            includes: parts.includes,
            _entity: PhantomData,
        })
    }
}

impl<T> From<Specification<T>> for SpecificationParts {
    fn from(spec: Specification<T>) -> Self {
        SpecificationParts {
            var: spec.var,
            criteria: spec.criteria,
            sorts: spec.sorts,
            skip: spec.window.skip(),
            take: spec.window.take(),
            includes: spec.includes,
        }
    }
}

/// Builds a [`Specification`] one concern at a time.
///
/// Every method validates its arguments and fails immediately, so `build()`
/// itself cannot fail.
pub struct SpecificationBuilder<T> {
    criteria: Criteria,
    sorts: SortChain,
    window: Window,
    includes: BTreeSet<EagerPath>,
    _entity: PhantomData<fn(&T)>,
}

impl<T> SpecificationBuilder<T> {
    /// Creates a builder bound to the default variable with nothing set.
    pub fn new() -> Self {
        SpecificationBuilder {
            criteria: Criteria::new(),
            sorts: SortChain::new(),
            window: Window::default(),
            includes: BTreeSet::new(),
            _entity: PhantomData,
        }
    }

    /// Rebinds the criteria to `var`, discarding any criteria built so far.
    pub fn bound_to(mut self, var: impl Into<Var>) -> Self {
        self.criteria = Criteria::bound_to(var);
        self
    }

    /// Continues the criteria chain with `build`.
    ///
    /// The chain handed to `build` is the one accumulated so far, so repeated
    /// calls keep extending it.
    pub fn criteria<F>(mut self, build: F) -> Result<Self>
    where
        F: FnOnce(Criteria) -> Result<Criteria>,
    {
        self.criteria = build(self.criteria)?;
        Ok(self)
    }

    /// Shorthand for `criteria(|c| c.where_(clause))`.
    pub fn where_(self, clause: Clause) -> Result<Self> {
        self.criteria(|c| c.where_(clause))
    }

    /// Resets the sort chain to a single primary key.
    pub fn order_by(mut self, key: impl Into<String>, direction: Direction) -> Result<Self> {
        self.sorts = self.sorts.order_by(key, direction)?;
        Ok(self)
    }

    /// Appends a secondary sort level.
    pub fn then_by(mut self, key: impl Into<String>, direction: Direction) -> Result<Self> {
        self.sorts = self.sorts.then_by(key, direction)?;
        Ok(self)
    }

    /// Puts nulls first at the last sort level.
    pub fn nulls_first(mut self) -> Result<Self> {
        self.sorts = self.sorts.nulls_first()?;
        Ok(self)
    }

    /// Puts nulls last at the last sort level.
    pub fn nulls_last(mut self) -> Result<Self> {
        self.sorts = self.sorts.nulls_last()?;
        Ok(self)
    }

    /// Skips `skip` results.
    pub fn skip(mut self, skip: usize) -> Self {
        self.window = self.window.with_skip(skip);
        self
    }

    /// `take` must be at least 1.
    pub fn take(mut self, take: usize) -> Result<Self> {
        self.window = self.window.with_take(take)?;
        Ok(self)
    }

    /// Sets skip and take from a 1-based page number and a page size.
    pub fn page(mut self, number: usize, size: usize) -> Result<Self> {
        self.window = Window::from_page(Page::new(number, size)?);
        Ok(self)
    }

    /// Adds an eager-load path. Duplicates collapse.
    pub fn include(mut self, path: &str) -> Result<Self> {
        self.includes.insert(EagerPath::parse(path)?);
        Ok(self)
    }

    /// Finishes the specification.
    pub fn build(self) -> Specification<T> {
        let var = self.criteria.var().clone();
        Specification {
            var,
            criteria: self.criteria.build(),
            sorts: self.sorts,
            window: self.window,
            includes: self.includes,
            _entity: PhantomData,
        }
    }
}

impl<T> Default for SpecificationBuilder<T> {
    fn default() -> Self {
        SpecificationBuilder::new()
    }
}

impl<T> fmt::Debug for SpecificationBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecificationBuilder")
            .field("criteria", &self.criteria)
            .field("sorts", &self.sorts)
            .field("window", &self.window)
            .field("includes", &self.includes)
            .finish()
    }
}
