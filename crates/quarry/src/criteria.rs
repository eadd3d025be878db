//! Criteria chains.
//!
//! [`Criteria`] builds a predicate tree one combinator at a time and enforces
//! a two-state grammar per scope: a scope starts `Empty`, the first
//! [`where_`](Criteria::where_) moves it to `Started`, and only a started scope
//! accepts `and`/`or`/`not`/`group`/`or_group`. Each group opens a fresh
//! scope, so the rule applies at every nesting depth.
//!
//! ```
//! use quarry::{Clause, Criteria};
//!
//! # fn main() -> quarry::Result<()> {
//! let tree = Criteria::new()
//!     .where_(Clause::eq("category", "Electronics"))?
//!     .or_group(|g| {
//!         g.where_(Clause::eq("active", true))?
//!             .and(Clause::lt("price", 100))
//!     })?
//!     .build();
//!
//! assert_eq!(
//!     tree.unwrap().to_string(),
//!     "(x.category eq \"Electronics\" or (x.active eq true and x.price lt 100))"
//! );
//! # Ok(())
//! # }
//! ```

use crate::clause::Clause;
use crate::error::{Result, SpecError};
use crate::node::Node;
use crate::unify::Unifier;
use crate::var::Var;

const GROUP_MUST_START_WITH_WHERE: &str = "groups must start with where_()";
const CHAIN_MUST_START_WITH_WHERE: &str = "and()/or()/not()/group() require a preceding where_()";
const GROUP_HAS_ONE_WHERE: &str = "where_() may only open a group once; use and()/or()";

#[derive(Debug, Clone, PartialEq)]
enum ChainState {
    Empty,
    Started(Node),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Top-level chain. Repeated `where_` calls accumulate with AND.
    Root,
    /// Sub-chain opened by `group`/`or_group`.
    Group,
}

/// A grammar-enforcing predicate builder bound to one entity variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    var: Var,
    scope: Scope,
    state: ChainState,
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria::new()
    }
}

impl Criteria {
    /// Creates an empty top-level chain bound to the default variable.
    pub fn new() -> Self {
        Criteria::bound_to(Var::default())
    }

    /// Creates an empty top-level chain bound to `var`.
    pub fn bound_to(var: impl Into<Var>) -> Self {
        Criteria {
            var: var.into(),
            scope: Scope::Root,
            state: ChainState::Empty,
        }
    }

    /// A top-level chain that already holds `node`.
    pub(crate) fn resume(var: Var, node: Option<Node>) -> Self {
        let state = match node {
            Some(node) => ChainState::Started(node),
            None => ChainState::Empty,
        };
        Criteria {
            var,
            scope: Scope::Root,
            state,
        }
    }

    fn group_scope(var: Var) -> Self {
        Criteria {
            var,
            scope: Scope::Group,
            state: ChainState::Empty,
        }
    }

    /// The variable every leaf of this chain is bound to.
    pub fn var(&self) -> &Var {
        &self.var
    }

    /// Returns `true` once a base condition has been set.
    pub fn is_started(&self) -> bool {
        matches!(self.state, ChainState::Started(_))
    }

    /// Sets the base condition of this scope.
    ///
    /// On a started top-level chain the condition is AND-ed onto the current
    /// tree. On a started group it is a [`SpecError::MalformedChain`].
    pub fn where_(self, clause: Clause) -> Result<Self> {
        let leaf = self.leaf(clause)?;
        match (self.state, self.scope) {
            (ChainState::Empty, _) => Ok(Criteria {
                var: self.var,
                scope: self.scope,
                state: ChainState::Started(leaf),
            }),
            (ChainState::Started(current), Scope::Root) => Ok(Criteria {
                var: self.var,
                scope: self.scope,
                state: ChainState::Started(Node::and(current, leaf)),
            }),
            (ChainState::Started(_), Scope::Group) => Err(SpecError::MalformedChain {
                rule: GROUP_HAS_ONE_WHERE,
            }),
        }
    }

    /// `current AND clause`.
    pub fn and(self, clause: Clause) -> Result<Self> {
        let leaf = self.leaf(clause)?;
        self.extend(leaf, Node::and)
    }

    /// `current OR clause`.
    pub fn or(self, clause: Clause) -> Result<Self> {
        let leaf = self.leaf(clause)?;
        self.extend(leaf, Node::or)
    }

    /// `current AND NOT clause`.
    pub fn not(self, clause: Clause) -> Result<Self> {
        let leaf = self.leaf(clause)?;
        self.extend(Node::not(leaf), Node::and)
    }

    /// `current AND (group)`, where the group is built by `build` on a fresh scope.
    pub fn group<F>(self, build: F) -> Result<Self>
    where
        F: FnOnce(Criteria) -> Result<Criteria>,
    {
        self.nest(build, Node::and)
    }

    /// `current OR (group)`, where the group is built by `build` on a fresh scope.
    pub fn or_group<F>(self, build: F) -> Result<Self>
    where
        F: FnOnce(Criteria) -> Result<Criteria>,
    {
        self.nest(build, Node::or)
    }

    /// Returns the compiled tree, or `None` if no condition was added.
    pub fn build(self) -> Option<Node> {
        match self.state {
            ChainState::Empty => None,
            ChainState::Started(node) => Some(node),
        }
    }

    fn leaf(&self, clause: Clause) -> Result<Node> {
        if clause.field.is_empty() {
            return Err(SpecError::NullArgument {
                argument: "clause field",
            });
        }
        Ok(Node::leaf(self.var.clone(), clause))
    }

    fn start_violation(scope: Scope) -> SpecError {
        let rule = match scope {
            Scope::Root => CHAIN_MUST_START_WITH_WHERE,
            Scope::Group => GROUP_MUST_START_WITH_WHERE,
        };
        SpecError::MalformedChain { rule }
    }

    fn extend(self, next: Node, combine: fn(Node, Node) -> Node) -> Result<Self> {
        let current = match self.state {
            ChainState::Started(current) => current,
            ChainState::Empty => return Err(Self::start_violation(self.scope)),
        };
        Ok(Criteria {
            var: self.var,
            scope: self.scope,
            state: ChainState::Started(combine(current, next)),
        })
    }

    fn nest<F>(self, build: F, combine: fn(Node, Node) -> Node) -> Result<Self>
    where
        F: FnOnce(Criteria) -> Result<Criteria>,
    {
        if !self.is_started() {
            return Err(Self::start_violation(self.scope));
        }

        let sub = build(Criteria::group_scope(self.var.clone()))?;
        let subtree = match sub.state {
            ChainState::Started(node) => node,
            ChainState::Empty => return Err(SpecError::EmptyGroup),
        };

        // A closure may hand back a chain it built itself; restate it in our variable.
        let subtree = if sub.var == self.var {
            subtree
        } else {
            Unifier::new(&sub.var, &self.var).rewrite(&subtree)
        };

        self.extend(subtree, combine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::value::{Number, Value};

    #[derive(Debug)]
    struct Product {
        category: &'static str,
        price: i64,
        active: bool,
    }

    impl Entity for Product {
        fn field_value(&self, field: &str) -> Value<'_> {
            match field {
                "category" => Value::String(self.category),
                "price" => Value::Number(Number::I64(self.price)),
                "active" => Value::Bool(self.active),
                _ => Value::None,
            }
        }
    }

    fn products() -> Vec<Product> {
        vec![
            Product {
                category: "Electronics",
                price: 100,
                active: true,
            },
            Product {
                category: "Electronics",
                price: 50,
                active: false,
            },
            Product {
                category: "Furniture",
                price: 200,
                active: true,
            },
        ]
    }

    fn matching(tree: &Node) -> Vec<usize> {
        let var = Var::default();
        products()
            .iter()
            .enumerate()
            .filter(|(_, p)| tree.evaluate(&var, *p))
            .map(|(i, _)| i + 1)
            .collect()
    }

    fn is_malformed(result: Result<Criteria>) -> bool {
        matches!(result, Err(SpecError::MalformedChain { .. }))
    }

    #[test]
    fn untouched_chain_builds_none() {
        assert_eq!(Criteria::new().build(), None);
    }

    #[test]
    fn active_or_expensive_scenario() {
        let tree = Criteria::new()
            .where_(Clause::eq("active", true))
            .and_then(|c| c.or(Clause::gt("price", 150)))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(matching(&tree), [1, 3]);
    }

    #[test]
    fn not_is_and_not() {
        let tree = Criteria::new()
            .where_(Clause::eq("category", "Electronics"))
            .and_then(|c| c.not(Clause::eq("active", true)))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(matching(&tree), [2]);
        assert!(matches!(tree, Node::And { ref right, .. } if matches!(**right, Node::Not { .. })));
    }

    #[test]
    fn combinators_on_empty_root_are_malformed() {
        assert!(is_malformed(Criteria::new().and(Clause::eq("a", 1))));
        assert!(is_malformed(Criteria::new().or(Clause::eq("a", 1))));
        assert!(is_malformed(Criteria::new().not(Clause::eq("a", 1))));
        assert!(is_malformed(
            Criteria::new().group(|g| g.where_(Clause::eq("a", 1)))
        ));
    }

    #[test]
    fn repeated_root_where_accumulates_with_and() {
        let tree = Criteria::new()
            .where_(Clause::eq("category", "Electronics"))
            .and_then(|c| c.where_(Clause::eq("active", true)))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(matching(&tree), [1]);
    }

    #[test]
    fn group_must_start_with_where() {
        let result = Criteria::new()
            .where_(Clause::eq("active", true))
            .and_then(|c| c.group(|g| g.and(Clause::gt("price", 10))));
        match result {
            Err(SpecError::MalformedChain { rule }) => assert_eq!(rule, GROUP_MUST_START_WITH_WHERE),
            other => panic!("expected MalformedChain, got {other:?}"),
        }

        let result = Criteria::new()
            .where_(Clause::eq("active", true))
            .and_then(|c| c.or_group(|g| g.or(Clause::gt("price", 10))));
        assert!(is_malformed(result));
    }

    #[test]
    fn nested_group_must_start_with_where_at_depth_three() {
        let result = Criteria::new().where_(Clause::eq("active", true)).and_then(|c| {
            c.group(|g1| {
                g1.where_(Clause::gt("price", 10))?
                    .or_group(|g2| g2.where_(Clause::lt("price", 5))?.group(|g3| g3.or(Clause::eq("a", 1))))
            })
        });
        assert!(is_malformed(result));
    }

    #[test]
    fn second_where_inside_group_is_malformed() {
        let result = Criteria::new().where_(Clause::eq("active", true)).and_then(|c| {
            c.group(|g| g.where_(Clause::gt("price", 10))?.where_(Clause::lt("price", 500)))
        });
        assert!(is_malformed(result));
    }

    #[test]
    fn empty_group_is_rejected() {
        let result = Criteria::new()
            .where_(Clause::eq("active", true))
            .and_then(|c| c.group(Ok));
        assert!(matches!(result, Err(SpecError::EmptyGroup)));
    }

    #[test]
    fn empty_field_is_a_null_argument() {
        let result = Criteria::new().where_(Clause::eq("", 1));
        assert!(matches!(
            result,
            Err(SpecError::NullArgument {
                argument: "clause field"
            })
        ));
    }

    #[test]
    fn groups_combine_with_and_or() {
        // category = Furniture OR (active AND price < 150)
        let tree = Criteria::new()
            .where_(Clause::eq("category", "Furniture"))
            .and_then(|c| {
                c.or_group(|g| g.where_(Clause::eq("active", true))?.and(Clause::lt("price", 150)))
            })
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(matching(&tree), [1, 3]);

        // active AND (price < 60 OR price > 150)
        let tree = Criteria::new()
            .where_(Clause::eq("active", true))
            .and_then(|c| {
                c.group(|g| g.where_(Clause::lt("price", 60))?.or(Clause::gt("price", 150)))
            })
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(matching(&tree), [3]);
    }

    #[test]
    fn foreign_group_chain_is_rebound() {
        let tree = Criteria::bound_to("p")
            .where_(Clause::eq("active", true))
            .and_then(|c| c.group(|_| Criteria::bound_to("q").where_(Clause::gt("price", 150))))
            .unwrap()
            .build()
            .unwrap();
        assert!(tree.is_closed_over(&Var::new("p")));
        assert_eq!(tree.to_string(), "(p.active eq true and p.price gt 150)");
    }
}
