//! Guarding functions with a rule tree
//!
//! A [`Guard`] evaluates a tree against a call's arguments before letting the
//! call through. If the tree fails, the call returns the tree's error and the
//! target is never invoked.
//!
//! The target states whether it wants to know *which* rules passed by how it
//! is wrapped:
//!
//! - [`Guard::wrap`] takes `Fn(&A) -> R`. The tree runs in plain mode and
//!   only gates the call.
//! - [`Guard::wrap_passed`] takes `Fn(&A, Passed<A, E>) -> R`. The tree runs
//!   in passable mode and the rules that passed are handed to the target.
//!
//! # Example
//!
//! ```rust
//! use passable::{requires, Rule};
//!
//! fn has(needle: &'static str) -> Rule<str, &'static str> {
//!     Rule::named(needle, move |s: &str| {
//!         if s.contains(needle) { Ok(()) } else { Err("Invalid") }
//!     })
//! }
//!
//! let (ab, cd, ef, gh) = (has("ab"), has("cd"), has("ef"), has("gh"));
//!
//! let target = requires(&ab | &cd & (&ef | &gh))
//!     .wrap_passed(|s: &str, passed| (s.to_string(), passed.labels()));
//!
//! assert_eq!(target.call("abcdefgh"), Ok(("abcdefgh".to_string(), vec!["ab".to_string()])));
//! assert_eq!(
//!     target.call("cdgh"),
//!     Ok(("cdgh".to_string(), vec!["cd".to_string(), "gh".to_string()]))
//! );
//! assert_eq!(target.call("xy"), Err("Invalid"));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::record::Passed;
use crate::tree::Tree;

/// Name under which passed rules are reported unless configured otherwise.
pub const DEFAULT_PASSED_KEY: &str = "passed";

/// Plain mode marker: the target only gets its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Plain;

/// Passable mode marker: the target also gets the passed rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Passable;

/// A rule tree guarding calls.
///
/// Built with [`requires`] or [`Guard::new`]. The tree is evaluated afresh
/// on every call and never modified.
pub struct Guard<A: ?Sized, E> {
    tree: Tree<A, E>,
    passed_key: Cow<'static, str>,
}

/// Guard calls with the given tree.
///
/// Shorthand for [`Guard::new`].
pub fn requires<A: ?Sized, E>(tree: impl Into<Tree<A, E>>) -> Guard<A, E> {
    Guard::new(tree)
}

impl<A: ?Sized, E> Guard<A, E> {
    /// Create a guard over a tree (or a single rule).
    pub fn new(tree: impl Into<Tree<A, E>>) -> Self {
        Guard {
            tree: tree.into(),
            passed_key: Cow::Borrowed(DEFAULT_PASSED_KEY),
        }
    }

    /// Set the name the passed rules are reported under in traces.
    ///
    /// Defaults to [`DEFAULT_PASSED_KEY`].
    pub fn with_passed_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.passed_key = key.into();
        self
    }

    /// The configured passed-rules key.
    pub fn passed_key(&self) -> &str {
        &self.passed_key
    }

    /// The guarding tree.
    pub fn tree(&self) -> &Tree<A, E> {
        &self.tree
    }

    /// Run the tree in plain mode.
    pub fn check(&self, args: &A) -> Result<(), E> {
        let result = self.tree.evaluate(args);
        #[cfg(feature = "tracing")]
        {
            if result.is_err() {
                tracing::debug!(tree = %self.tree, "guard rejected call");
            }
        }
        result
    }

    /// Run the tree in passable mode and return the passed rules.
    pub fn check_passed(&self, args: &A) -> Result<Passed<A, E>, E> {
        let result = self.tree.evaluate_passable(args).into_result();
        #[cfg(feature = "tracing")]
        {
            match &result {
                Ok(passed) => tracing::trace!(
                    tree = %self.tree,
                    key = %self.passed_key,
                    passed = %passed,
                    "guard admitted call"
                ),
                Err(_) => tracing::debug!(tree = %self.tree, "guard rejected call"),
            }
        }
        result
    }

    /// Wrap a target that only takes the call's arguments.
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::{requires, rule};
    ///
    /// let positive = rule(|n: &i64| if *n > 0 { Ok(()) } else { Err("must be positive") });
    /// let sqrt = requires(positive).wrap(|n: &i64| (*n as f64).sqrt());
    ///
    /// assert_eq!(sqrt.call(&16), Ok(4.0));
    /// assert_eq!(sqrt.call(&-1), Err("must be positive"));
    /// ```
    pub fn wrap<F, R>(self, target: F) -> Guarded<A, E, F, Plain>
    where
        F: Fn(&A) -> R,
    {
        Guarded::new(self, target)
    }

    /// Wrap a target that also takes the rules that passed.
    pub fn wrap_passed<F, R>(self, target: F) -> Guarded<A, E, F, Passable>
    where
        F: Fn(&A, Passed<A, E>) -> R,
    {
        Guarded::new(self, target)
    }
}

impl<A: ?Sized, E> Clone for Guard<A, E> {
    fn clone(&self) -> Self {
        Guard {
            tree: self.tree.clone(),
            passed_key: self.passed_key.clone(),
        }
    }
}

impl<A: ?Sized, E> fmt::Debug for Guard<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("tree", &format_args!("{}", self.tree))
            .field("passed_key", &self.passed_key)
            .finish()
    }
}

/// A target function behind a [`Guard`].
///
/// `M` is [`Plain`] or [`Passable`] and selects the evaluation mode.
pub struct Guarded<A: ?Sized, E, F, M> {
    guard: Guard<A, E>,
    target: F,
    mode: PhantomData<M>,
}

impl<A: ?Sized, E, F, M> Guarded<A, E, F, M> {
    fn new(guard: Guard<A, E>, target: F) -> Self {
        Guarded {
            guard,
            target,
            mode: PhantomData,
        }
    }

    /// The guard in front of the target.
    pub fn guard(&self) -> &Guard<A, E> {
        &self.guard
    }

    /// The wrapped target.
    pub fn target(&self) -> &F {
        &self.target
    }

    /// Split into the guard and the target.
    pub fn into_inner(self) -> (Guard<A, E>, F) {
        (self.guard, self.target)
    }
}

impl<A: ?Sized, E, F> Guarded<A, E, F, Plain> {
    /// Evaluate the tree; call the target if it passed.
    pub fn call<R>(&self, args: &A) -> Result<R, E>
    where
        F: Fn(&A) -> R,
    {
        self.guard.check(args)?;
        Ok((self.target)(args))
    }
}

impl<A: ?Sized, E, F> Guarded<A, E, F, Passable> {
    /// Evaluate the tree; call the target with the passed rules if it
    /// passed.
    pub fn call<R>(&self, args: &A) -> Result<R, E>
    where
        F: Fn(&A, Passed<A, E>) -> R,
    {
        let passed = self.guard.check_passed(args)?;
        Ok((self.target)(args, passed))
    }
}

impl<A: ?Sized, E, F: Clone, M> Clone for Guarded<A, E, F, M> {
    fn clone(&self) -> Self {
        Guarded::new(self.guard.clone(), self.target.clone())
    }
}

impl<A: ?Sized, E, F, M> fmt::Debug for Guarded<A, E, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded")
            .field("guard", &self.guard)
            .field("mode", &std::any::type_name::<M>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use crate::testing::{probe, Probe};
    use std::cell::Cell;

    fn has(needle: &'static str) -> Rule<str, &'static str> {
        Rule::named(needle, move |s: &str| {
            if s.contains(needle) {
                Ok(())
            } else {
                Err("Invalid")
            }
        })
    }

    #[test]
    fn test_plain_gate_calls_target_unchanged() {
        let calls = Cell::new(0);
        let guarded = requires(has("ab")).wrap(|s: &str| {
            calls.set(calls.get() + 1);
            s.len()
        });

        assert_eq!(guarded.call("xxab"), Ok(4));
        assert_eq!(guarded.call("xx"), Err("Invalid"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_passable_target_not_invoked_on_error() {
        let calls = Cell::new(0);
        let guarded = requires(&has("ab") & &has("cd")).wrap_passed(|_: &str, _| {
            calls.set(calls.get() + 1);
        });

        assert_eq!(guarded.call("ab"), Err("Invalid"));
        assert_eq!(calls.get(), 0);
        assert_eq!(guarded.call("abcd"), Ok(()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_passed_rules_in_record_order() {
        let (ab, cd, ef) = (has("ab"), has("cd"), has("ef"));
        let guarded = requires(&ab & (&cd | &ef)).wrap_passed(|_: &str, passed| passed.into_vec());

        assert_eq!(guarded.call("ab-ef"), Ok(vec![ab.clone(), ef.clone()]));
        assert_eq!(guarded.call("abcdef"), Ok(vec![ab, cd]));
    }

    #[test]
    fn test_plain_mode_skips_record() {
        let (counted, calls): (Rule<str, &str>, Probe) = probe("counted", Ok(()));
        let guard = requires(&has("ab") | &counted);

        assert_eq!(guard.check("ab"), Ok(()));
        assert_eq!(calls.count(), 0);
        assert_eq!(guard.check("zz"), Ok(()));
        assert_eq!(calls.count(), 1);
    }

    #[test]
    fn test_reevaluates_every_call() {
        let (counted, calls): (Rule<str, &str>, Probe) = probe("counted", Ok(()));
        let guarded = requires(counted).wrap(|_: &str| ());

        for _ in 0..3 {
            assert_eq!(guarded.call("x"), Ok(()));
        }
        assert_eq!(calls.count(), 3);
    }

    #[test]
    fn test_passed_key() {
        let guard = requires(has("ab"));
        assert_eq!(guard.passed_key(), DEFAULT_PASSED_KEY);

        let guard = guard.with_passed_key("matched");
        assert_eq!(guard.passed_key(), "matched");
        assert_eq!(guard.tree().to_string(), "ab");
    }

    #[test]
    fn test_target_is_the_wrapped_function() {
        let guarded = requires(has("ab")).wrap(|s: &str| s.len());
        assert_eq!((guarded.target())("abc"), 3);
        assert_eq!(guarded.call("zz"), Err("Invalid"));
    }

    #[test]
    fn test_into_inner() {
        let guarded = requires(has("ab")).wrap(|s: &str| s.to_uppercase());
        let (guard, target) = guarded.into_inner();
        assert_eq!(guard.check("ab"), Ok(()));
        assert_eq!(target("ab"), "AB");
    }

    #[cfg(feature = "tracing")]
    #[tracing_test::traced_test]
    #[test]
    fn test_traces_guard_decisions() {
        let guard = requires(&has("ab") | &has("cd")).with_passed_key("matched");

        assert_eq!(guard.check_passed("zz").map(|p| p.len()), Err("Invalid"));
        assert!(logs_contain("rule evaluated"));
        assert!(logs_contain("guard rejected call"));

        assert!(guard.check_passed("cd").is_ok());
        assert!(logs_contain("guard admitted call"));
        assert!(logs_contain("key=matched"));
    }
}
