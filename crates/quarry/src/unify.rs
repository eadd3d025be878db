//! Variable unification and criteria composition.
//!
//! Two specifications built independently bind their leaves to their own
//! variables. Before their trees can share one `And`/`Or` node, the foreign
//! tree is restated in terms of the target variable. This is a rewrite of the
//! AST itself, so the merged tree stays plain data an external translator can
//! walk; nothing is wrapped in a closure.
//!
//! The predicate language has no binders below the root, so substitution
//! cannot capture: the only way `to` can already occur in the foreign tree is
//! if the tree was built over it, in which case the rewrite is the identity on
//! those leaves.

use tracing::trace;

use crate::node::Node;
use crate::var::Var;

/// Rewrites every leaf bound to `from` so that it is bound to `to`.
#[derive(Debug, Clone, Copy)]
pub struct Unifier<'a> {
    from: &'a Var,
    to: &'a Var,
}

impl<'a> Unifier<'a> {
    /// Creates a unifier rewriting `from` to `to`.
    pub fn new(from: &'a Var, to: &'a Var) -> Self {
        Unifier { from, to }
    }

    /// Returns a structurally identical tree with `from` replaced by `to`.
    ///
    /// Leaves bound to other variables are copied unchanged.
    pub fn rewrite(&self, node: &Node) -> Node {
        if self.from == self.to {
            return node.clone();
        }
        trace!(from = %self.from, to = %self.to, nodes = node.size(), "unifying predicate tree");
        self.substitute(node)
    }

    fn substitute(&self, node: &Node) -> Node {
        match node {
            Node::Leaf { var, clause } => {
                let var = if var == self.from { self.to } else { var };
                Node::leaf(var.clone(), clause.clone())
            }
            Node::And { left, right } => Node::and(self.substitute(left), self.substitute(right)),
            Node::Or { left, right } => Node::or(self.substitute(left), self.substitute(right)),
            Node::Not { node } => Node::not(self.substitute(node)),
            Node::Never => Node::Never,
        }
    }
}

/// `a AND b`, with `b` restated over `a_var`.
///
/// `None` stands for "matches everything", the identity of AND, so a missing
/// side yields the other side.
pub fn and_criteria(
    a: Option<&Node>,
    a_var: &Var,
    b: Option<&Node>,
    b_var: &Var,
) -> Option<Node> {
    let b = b.map(|b| Unifier::new(b_var, a_var).rewrite(b));
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(Node::and(a.clone(), b)),
    }
}

/// `a OR b`, with `b` restated over `a_var`.
///
/// A missing side matches everything and absorbs the other, so the result is
/// `None` as well.
pub fn or_criteria(
    a: Option<&Node>,
    a_var: &Var,
    b: Option<&Node>,
    b_var: &Var,
) -> Option<Node> {
    match (a, b) {
        (Some(a), Some(b)) => Some(Node::or(
            a.clone(),
            Unifier::new(b_var, a_var).rewrite(b),
        )),
        _ => None,
    }
}

/// `NOT a`. Negating "matches everything" yields [`Node::Never`] and back.
pub fn not_criteria(a: Option<&Node>) -> Option<Node> {
    match a {
        None => Some(Node::Never),
        Some(Node::Never) => None,
        Some(node) => Some(Node::not(node.clone())),
    }
}
