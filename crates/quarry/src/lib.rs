//! Quarry - composable query specifications.
//!
//! A [`Specification`] describes one query as plain data: a predicate tree
//! over a named variable, a multi-level sort chain, a pagination window and a
//! set of eager-load paths. Specifications are built once, validated while
//! they are built, and then evaluated against any [`QuerySource`]: an
//! in-memory slice through [`MemorySource`], or a backend of your own.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{Clause, Direction, Entity, Specification, Value};
//!
//! struct Product {
//!     id: u32,
//!     category: &'static str,
//!     price: i64,
//!     active: bool,
//! }
//!
//! impl Entity for Product {
//!     fn field_value(&self, field: &str) -> Value<'_> {
//!         match field {
//!             "id" => Value::from(self.id),
//!             "category" => Value::from(self.category),
//!             "price" => Value::from(self.price),
//!             "active" => Value::from(self.active),
//!             _ => Value::None,
//!         }
//!     }
//! }
//!
//! # fn main() -> quarry::Result<()> {
//! let products = vec![
//!     Product { id: 1, category: "tools", price: 100, active: true },
//!     Product { id: 2, category: "tools", price: 120, active: false },
//!     Product { id: 3, category: "garden", price: 200, active: false },
//! ];
//!
//! // active OR (price > 150 AND category = "garden")
//! let spec = Specification::<Product>::builder()
//!     .criteria(|c| {
//!         c.where_(Clause::eq("active", true))?
//!             .or_group(|g| g.where_(Clause::gt("price", 150))?.and(Clause::eq("category", "garden")))
//!     })?
//!     .order_by("price", Direction::Descending)?
//!     .build();
//!
//! let ids: Vec<u32> = spec.filter(&products).iter().map(|p| p.id).collect();
//! assert_eq!(ids, [3, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! # Criteria Grammar
//!
//! Each scope (the root chain and every group) is either empty or started:
//!
//! ```text
//! chain := where (and | or | not | group | or_group)*
//! group := where (and | or | not | group | or_group)*
//! ```
//!
//! `and`/`or`/`not`/`group`/`or_group` on an empty scope fail with
//! [`SpecError::MalformedChain`]. Combinators fold left, so
//! `where_(a).or(b).and(c)` is `(a ∨ b) ∧ c`; use groups for anything else.
//!
//! # Composition
//!
//! Specifications combine with [`Specification::and`], [`Specification::or`]
//! and [`Specification::not`] (also `&a & &b`, `&a | &b`, `!&a`). Leaves of
//! the right operand are rebound to the left operand's variable, so the merged
//! tree is still plain data. Only criteria combine; re-attach ordering,
//! paging or includes through [`Specification::to_builder`].
//!
//! A specification without criteria matches everything:
//!
//! | Operation | Result |
//! |-----------|--------|
//! | `all ∧ s` | `s` |
//! | `all ∨ s` | `all` |
//! | `¬all` | nothing ([`Node::Never`]) |
//!
//! # Field Types and Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | String | `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte`, `StartsWith`, `EndsWith`, `Contains`, `Regex` |
//! | Number | `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Timestamp | `Eq`, `Ne`, `Before`, `After`, `Gt`, `Gte`, `Lt`, `Lte` |
//! | Enum | `Eq`, `Ne`, `In` |
//! | Bool | `Eq`, `Ne`, `Is` |
//! | any | `IsNull`, `NotNull` |

mod clause;
mod criteria;
mod entity;
mod error;
mod evaluator;
mod include;
mod node;
mod op;
mod page;
mod sort;
mod source;
mod spec;
mod unify;
mod value;
mod var;

pub use clause::{Clause, ClauseValue, Pattern};
pub use criteria::Criteria;
pub use entity::{Entity, EntityEnum, EntityTimestamp};
pub use error::{Result, SpecError};
pub use evaluator::{
    Evaluator, EvaluatorConfig, FilterStage, IncludeStage, Intent, OrderStage, PaginationStage,
    Stage, StageContext,
};
pub use include::EagerPath;
pub use node::Node;
pub use op::Op;
pub use page::{Page, Window};
pub use sort::{
    compare_by_descriptors, compare_values, Direction, NullPolicy, SortChain, SortDescriptor,
};
pub use source::{MemorySource, QuerySource};
pub use spec::{Specification, SpecificationBuilder, SpecificationParts};
pub use unify::{and_criteria, not_criteria, or_criteria, Unifier};
pub use value::{Number, Timestamp, Value};
pub use var::{Var, DEFAULT_VAR};
