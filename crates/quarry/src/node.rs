//! The predicate tree.
//!
//! A [`Node`] is a boolean expression over one bound entity variable. Leaves
//! are [`Clause`]s tagged with the [`Var`] they read from; inner nodes are the
//! usual connectives. Trees are immutable values: every combinator returns a
//! new tree and leaves its operands untouched.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clause::Clause;
use crate::entity::Entity;
use crate::var::Var;

/// A node of a predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A single condition on a field of `var`.
    Leaf { var: Var, clause: Clause },
    And { left: Box<Node>, right: Box<Node> },
    Or { left: Box<Node>, right: Box<Node> },
    Not { node: Box<Node> },
    /// Matches no candidate. Produced by negating a match-all specification.
    Never,
}

impl Node {
    /// Creates a leaf evaluating `clause` against `var`.
    pub fn leaf(var: Var, clause: Clause) -> Self {
        Node::Leaf { var, clause }
    }

    /// Creates a conjunction of two subtrees.
    pub fn and(left: Node, right: Node) -> Self {
        Node::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a disjunction of two subtrees.
    pub fn or(left: Node, right: Node) -> Self {
        Node::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a negation of a subtree.
    #[allow(clippy::should_implement_trait)]
    pub fn not(node: Node) -> Self {
        Node::Not {
            node: Box::new(node),
        }
    }

    /// Evaluates the tree with `var` bound to `candidate`.
    ///
    /// A leaf bound to any other variable is unbound here and evaluates to
    /// `false`; specifications never contain such leaves.
    pub fn evaluate<T>(&self, var: &Var, candidate: &T) -> bool
    where
        T: Entity + ?Sized,
    {
        match self {
            Node::Leaf { var: bound, clause } => {
                bound == var && clause.matches(&candidate.field_value(&clause.field))
            }
            Node::And { left, right } => {
                left.evaluate(var, candidate) && right.evaluate(var, candidate)
            }
            Node::Or { left, right } => {
                left.evaluate(var, candidate) || right.evaluate(var, candidate)
            }
            Node::Not { node } => !node.evaluate(var, candidate),
            Node::Never => false,
        }
    }

    /// Returns every variable referenced by a leaf of this tree.
    pub fn free_vars(&self) -> BTreeSet<&Var> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars<'a>(&'a self, out: &mut BTreeSet<&'a Var>) {
        match self {
            Node::Leaf { var, .. } => {
                out.insert(var);
            }
            Node::And { left, right } | Node::Or { left, right } => {
                left.collect_vars(out);
                right.collect_vars(out);
            }
            Node::Not { node } => node.collect_vars(out),
            Node::Never => {}
        }
    }

    /// Returns `true` if every leaf is bound to `var`.
    pub fn is_closed_over(&self, var: &Var) -> bool {
        self.free_vars().into_iter().all(|v| v == var)
    }

    /// Returns the leaf clauses in left-to-right order.
    pub fn clauses(&self) -> Vec<&Clause> {
        let mut out = Vec::new();
        self.collect_clauses(&mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a Clause>) {
        match self {
            Node::Leaf { clause, .. } => out.push(clause),
            Node::And { left, right } | Node::Or { left, right } => {
                left.collect_clauses(out);
                right.collect_clauses(out);
            }
            Node::Not { node } => node.collect_clauses(out),
            Node::Never => {}
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Node::Leaf { .. } | Node::Never => 1,
            Node::And { left, right } | Node::Or { left, right } => {
                1 + left.size() + right.size()
            }
            Node::Not { node } => 1 + node.size(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf { var, clause } => write!(f, "{var}.{clause}"),
            Node::And { left, right } => write!(f, "({left} and {right})"),
            Node::Or { left, right } => write!(f, "({left} or {right})"),
            Node::Not { node } => write!(f, "not {node}"),
            Node::Never => f.write_str("never"),
        }
    }
}
