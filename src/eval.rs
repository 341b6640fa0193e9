//! Plain and passable evaluation
//!
//! Both evaluators walk the tree depth-first, left before right, and
//! short-circuit the same way:
//!
//! - AND: a failing left child decides the node; the right child is not
//!   evaluated. Otherwise the node's result is the right child's result.
//! - OR: a passing left child decides the node; the right child is not
//!   evaluated. Otherwise the node passes if the right child passes, and
//!   fails with the **left** child's error if both fail.
//!
//! The passable evaluator additionally records each rule it evaluates.

use crate::record::{Entry, Evaluation, Record};
use crate::rule::Rule;
use crate::tree::{Junction, Tree};

impl<A: ?Sized, E> Tree<A, E> {
    /// Evaluate the tree, returning the single representative error on
    /// failure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::Rule;
    ///
    /// let l: Rule<(), &str> = Rule::from_fn(|_: &()| Err("E1"));
    /// let r: Rule<(), &str> = Rule::from_fn(|_: &()| Err("E2"));
    ///
    /// // When both sides of an OR fail, the left error wins.
    /// assert_eq!((&l | &r).evaluate(&()), Err("E1"));
    /// assert_eq!((&l & &r).evaluate(&()), Err("E1"));
    /// ```
    pub fn evaluate(&self, args: &A) -> Result<(), E> {
        match self {
            Tree::Leaf(rule) => check_leaf(rule, args),
            Tree::Node(node) => match node.junction() {
                Junction::All => {
                    node.left().evaluate(args)?;
                    node.right().evaluate(args)
                }
                Junction::Any => match node.left().evaluate(args) {
                    Ok(()) => Ok(()),
                    Err(left_error) => match node.right().evaluate(args) {
                        Ok(()) => Ok(()),
                        Err(_) => Err(left_error),
                    },
                },
            },
        }
    }

    /// Evaluate the tree and record every rule visited.
    ///
    /// The verdict and error are identical to [`Tree::evaluate`]. The record
    /// lists the visited rules in pre-order with their failed flags; rules
    /// in branches skipped by short-circuiting do not appear.
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::Rule;
    ///
    /// let ab: Rule<str, &str> = Rule::named("ab", |s: &str| if s.contains("ab") { Ok(()) } else { Err("ab") });
    /// let cd: Rule<str, &str> = Rule::named("cd", |s: &str| if s.contains("cd") { Ok(()) } else { Err("cd") });
    /// let ef: Rule<str, &str> = Rule::named("ef", |s: &str| if s.contains("ef") { Ok(()) } else { Err("ef") });
    ///
    /// let tree = &ab & (&cd | &ef);
    /// let evaluation = tree.evaluate_passable("ab-ef");
    ///
    /// assert!(evaluation.is_valid());
    /// let flags: Vec<_> = evaluation.record().iter().map(|e| (e.rule().to_string(), e.failed())).collect();
    /// assert_eq!(
    ///     flags,
    ///     vec![("ab".to_string(), false), ("cd".to_string(), true), ("ef".to_string(), false)]
    /// );
    /// ```
    pub fn evaluate_passable(&self, args: &A) -> Evaluation<A, E> {
        let mut entries = Vec::new();
        let error = self.record_into(args, &mut entries).err();
        Evaluation::new(Record::from_entries(entries), error)
    }

    // Appending to one buffer in visit order yields the same sequence as
    // concatenating the left and right records at every node.
    fn record_into(&self, args: &A, entries: &mut Vec<Entry<A, E>>) -> Result<(), E> {
        match self {
            Tree::Leaf(rule) => {
                let result = check_leaf(rule, args);
                entries.push(Entry::new(rule.clone(), result.is_err()));
                result
            }
            Tree::Node(node) => match node.junction() {
                Junction::All => {
                    node.left().record_into(args, entries)?;
                    node.right().record_into(args, entries)
                }
                Junction::Any => match node.left().record_into(args, entries) {
                    Ok(()) => Ok(()),
                    Err(left_error) => match node.right().record_into(args, entries) {
                        Ok(()) => Ok(()),
                        Err(_) => Err(left_error),
                    },
                },
            },
        }
    }
}

impl<A: ?Sized, E> Rule<A, E> {
    /// Evaluate this rule as a one-leaf tree, recording it.
    pub fn evaluate_passable(&self, args: &A) -> Evaluation<A, E> {
        let result = check_leaf(self, args);
        let entry = Entry::new(self.clone(), result.is_err());
        Evaluation::new(Record::from_entries(vec![entry]), result.err())
    }
}

/// Evaluate a tree in plain mode.
pub fn evaluate<A: ?Sized, E>(tree: &Tree<A, E>, args: &A) -> Result<(), E> {
    tree.evaluate(args)
}

/// Evaluate a tree in passable mode.
pub fn evaluate_passable<A: ?Sized, E>(tree: &Tree<A, E>, args: &A) -> Evaluation<A, E> {
    tree.evaluate_passable(args)
}

#[inline]
fn check_leaf<A: ?Sized, E>(rule: &Rule<A, E>, args: &A) -> Result<(), E> {
    let result = rule.check(args);
    #[cfg(feature = "tracing")]
    tracing::trace!(rule = %rule, failed = result.is_err(), "rule evaluated");
    result
}
