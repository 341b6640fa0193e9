//! Combinator trees
//!
//! A [`Tree`] is either a single [`Rule`] or a binary [`Node`] joining two
//! sub-trees with a [`Junction`]: `All` (AND) or `Any` (OR).
//!
//! Trees are built with `.and()` / `.or()`, with the `&` / `|` operators, or
//! with the free functions [`all`] and [`any`]. Every composition returns a
//! new tree; operands are never touched, so a sub-tree can be shared by as
//! many trees as needed.
//!
//! The tree keeps exactly the shape that was written. Nothing is flattened or
//! rebalanced. With the operators, Rust's own precedence applies: `&` binds
//! tighter than `|`, and both associate to the left.
//!
//! # Example
//!
//! ```rust
//! use passable::{Rule, Tree};
//!
//! fn has(needle: &'static str) -> Rule<str, &'static str> {
//!     Rule::named(needle, move |s: &str| {
//!         if s.contains(needle) { Ok(()) } else { Err("missing") }
//!     })
//! }
//!
//! let (ab, cd, ef) = (has("ab"), has("cd"), has("ef"));
//! let tree: Tree<str, &str> = &ab | &cd & &ef;
//!
//! assert_eq!(tree.to_string(), "ab | (cd & ef)");
//! assert_eq!(tree.len(), 3);
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

use crate::rule::Rule;

/// How a [`Node`] combines its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Junction {
    /// Logical AND: both children must pass.
    All,
    /// Logical OR: at least one child must pass.
    Any,
}

impl Junction {
    /// `true` for [`Junction::Any`].
    pub fn is_any(self) -> bool {
        matches!(self, Junction::Any)
    }

    /// The operator symbol used when rendering a tree.
    pub fn symbol(self) -> &'static str {
        match self {
            Junction::All => "&",
            Junction::Any => "|",
        }
    }
}

/// A binary node of a combinator tree.
pub struct Node<A: ?Sized, E> {
    left: Tree<A, E>,
    right: Tree<A, E>,
    junction: Junction,
}

impl<A: ?Sized, E> Node<A, E> {
    /// Join two sub-trees.
    pub fn new(left: Tree<A, E>, right: Tree<A, E>, junction: Junction) -> Self {
        Node {
            left,
            right,
            junction,
        }
    }

    /// The left child, always evaluated first.
    pub fn left(&self) -> &Tree<A, E> {
        &self.left
    }

    /// The right child.
    pub fn right(&self) -> &Tree<A, E> {
        &self.right
    }

    /// How the children are combined.
    pub fn junction(&self) -> Junction {
        self.junction
    }

    /// `true` for OR nodes.
    pub fn is_any(&self) -> bool {
        self.junction.is_any()
    }
}

/// An immutable tree of rules joined by AND / OR.
///
/// Cloning is cheap: leaves share their rule and nodes are reference counted.
pub enum Tree<A: ?Sized, E> {
    /// A single rule.
    Leaf(Rule<A, E>),
    /// Two sub-trees joined by a [`Junction`].
    Node(Arc<Node<A, E>>),
}

impl<A: ?Sized, E> Tree<A, E> {
    /// A tree holding a single rule.
    pub fn leaf(rule: Rule<A, E>) -> Self {
        Tree::Leaf(rule)
    }

    /// Join two trees with the given junction.
    pub fn join(
        left: impl Into<Tree<A, E>>,
        right: impl Into<Tree<A, E>>,
        junction: Junction,
    ) -> Self {
        Tree::Node(Arc::new(Node::new(left.into(), right.into(), junction)))
    }

    /// `self AND other`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::{rule, Junction};
    ///
    /// let positive = rule(|n: &i32| if *n > 0 { Ok(()) } else { Err("not positive") });
    /// let small = rule(|n: &i32| if *n < 10 { Ok(()) } else { Err("too big") });
    ///
    /// let tree = positive.and(small);
    /// assert_eq!(tree.as_node().map(|n| n.junction()), Some(Junction::All));
    /// assert_eq!(tree.evaluate(&5), Ok(()));
    /// assert_eq!(tree.evaluate(&50), Err("too big"));
    /// ```
    pub fn and(self, other: impl Into<Tree<A, E>>) -> Self {
        Tree::join(self, other, Junction::All)
    }

    /// `self OR other`.
    pub fn or(self, other: impl Into<Tree<A, E>>) -> Self {
        Tree::join(self, other, Junction::Any)
    }

    /// The rule, if this tree is a single leaf.
    pub fn as_rule(&self) -> Option<&Rule<A, E>> {
        match self {
            Tree::Leaf(rule) => Some(rule),
            Tree::Node(_) => None,
        }
    }

    /// The root node, unless this tree is a single leaf.
    pub fn as_node(&self) -> Option<&Node<A, E>> {
        match self {
            Tree::Leaf(_) => None,
            Tree::Node(node) => Some(node),
        }
    }

    /// Iterate over the leaf rules in pre-order, left before right.
    ///
    /// A rule used in several places is yielded once per place.
    pub fn leaves(&self) -> Leaves<'_, A, E> {
        Leaves { stack: vec![self] }
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves().count()
    }

    /// Always `false`: a tree holds at least one rule.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Height of the tree; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Tree::Leaf(_) => 1,
            Tree::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }
}

/// `a AND b`.
pub fn all<A: ?Sized, E>(
    left: impl Into<Tree<A, E>>,
    right: impl Into<Tree<A, E>>,
) -> Tree<A, E> {
    Tree::join(left, right, Junction::All)
}

/// `a OR b`.
pub fn any<A: ?Sized, E>(
    left: impl Into<Tree<A, E>>,
    right: impl Into<Tree<A, E>>,
) -> Tree<A, E> {
    Tree::join(left, right, Junction::Any)
}

impl<A: ?Sized, E> Rule<A, E> {
    /// `self AND other`, as a new tree.
    pub fn and(self, other: impl Into<Tree<A, E>>) -> Tree<A, E> {
        Tree::join(self, other, Junction::All)
    }

    /// `self OR other`, as a new tree.
    pub fn or(self, other: impl Into<Tree<A, E>>) -> Tree<A, E> {
        Tree::join(self, other, Junction::Any)
    }
}

/// Pre-order iterator over the leaves of a [`Tree`].
///
/// Created by [`Tree::leaves`].
pub struct Leaves<'a, A: ?Sized, E> {
    stack: Vec<&'a Tree<A, E>>,
}

impl<'a, A: ?Sized, E> Iterator for Leaves<'a, A, E> {
    type Item = &'a Rule<A, E>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(tree) = self.stack.pop() {
            match tree {
                Tree::Leaf(rule) => return Some(rule),
                Tree::Node(node) => {
                    self.stack.push(&node.right);
                    self.stack.push(&node.left);
                }
            }
        }
        None
    }
}

impl<A: ?Sized, E> fmt::Debug for Leaves<'_, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaves").field("pending", &self.stack.len()).finish()
    }
}

impl<A: ?Sized, E> From<Rule<A, E>> for Tree<A, E> {
    fn from(rule: Rule<A, E>) -> Self {
        Tree::Leaf(rule)
    }
}

impl<A: ?Sized, E> From<&Rule<A, E>> for Tree<A, E> {
    fn from(rule: &Rule<A, E>) -> Self {
        Tree::Leaf(rule.clone())
    }
}

impl<A: ?Sized, E> From<&Tree<A, E>> for Tree<A, E> {
    fn from(tree: &Tree<A, E>) -> Self {
        tree.clone()
    }
}

impl<A: ?Sized, E> Clone for Tree<A, E> {
    fn clone(&self) -> Self {
        match self {
            Tree::Leaf(rule) => Tree::Leaf(rule.clone()),
            Tree::Node(node) => Tree::Node(Arc::clone(node)),
        }
    }
}

// Operator forms. `&` binds tighter than `|`, matching the usual reading of
// AND over OR.

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitAnd<R> for Tree<A, E> {
    type Output = Tree<A, E>;

    fn bitand(self, rhs: R) -> Tree<A, E> {
        self.and(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitOr<R> for Tree<A, E> {
    type Output = Tree<A, E>;

    fn bitor(self, rhs: R) -> Tree<A, E> {
        self.or(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitAnd<R> for &Tree<A, E> {
    type Output = Tree<A, E>;

    fn bitand(self, rhs: R) -> Tree<A, E> {
        self.clone().and(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitOr<R> for &Tree<A, E> {
    type Output = Tree<A, E>;

    fn bitor(self, rhs: R) -> Tree<A, E> {
        self.clone().or(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitAnd<R> for Rule<A, E> {
    type Output = Tree<A, E>;

    fn bitand(self, rhs: R) -> Tree<A, E> {
        self.and(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitOr<R> for Rule<A, E> {
    type Output = Tree<A, E>;

    fn bitor(self, rhs: R) -> Tree<A, E> {
        self.or(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitAnd<R> for &Rule<A, E> {
    type Output = Tree<A, E>;

    fn bitand(self, rhs: R) -> Tree<A, E> {
        self.clone().and(rhs)
    }
}

impl<A: ?Sized, E, R: Into<Tree<A, E>>> BitOr<R> for &Rule<A, E> {
    type Output = Tree<A, E>;

    fn bitor(self, rhs: R) -> Tree<A, E> {
        self.clone().or(rhs)
    }
}

fn fmt_operand<A: ?Sized, E>(tree: &Tree<A, E>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match tree {
        Tree::Leaf(rule) => write!(f, "{}", rule),
        Tree::Node(node) => write!(f, "({})", node),
    }
}

impl<A: ?Sized, E> fmt::Display for Node<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_operand(&self.left, f)?;
        write!(f, " {} ", self.junction.symbol())?;
        fmt_operand(&self.right, f)
    }
}

impl<A: ?Sized, E> fmt::Display for Tree<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(rule) => write!(f, "{}", rule),
            Tree::Node(node) => write!(f, "{}", node),
        }
    }
}

impl<A: ?Sized, E> fmt::Debug for Node<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("junction", &self.junction)
            .finish()
    }
}

impl<A: ?Sized, E> fmt::Debug for Tree<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(rule) => f.debug_tuple("Leaf").field(rule).finish(),
            Tree::Node(node) => f.debug_tuple("Node").field(&**node).finish(),
        }
    }
}
