//! Testing utilities
//!
//! Helpers for testing code built on rule trees: a [`Probe`] rule that
//! counts how often it was evaluated (handy for checking short-circuiting),
//! and assertion macros for verdicts and records.
//!
//! # Examples
//!
//! ## Probes
//!
//! ```rust
//! use passable::testing::probe;
//! use passable::Rule;
//!
//! let failing: Rule<(), &str> = Rule::from_fn(|_: &()| Err("nope"));
//! let (counted, calls) = probe::<(), &str>("counted", Ok(()));
//!
//! // AND stops at the first failure.
//! assert_eq!((&failing & &counted).evaluate(&()), Err("nope"));
//! assert_eq!(calls.count(), 0);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use passable::{assert_fails, assert_passes, Rule};
//!
//! let even: Rule<u8, &str> = Rule::from_fn(|n: &u8| if n % 2 == 0 { Ok(()) } else { Err("odd") });
//!
//! assert_passes!(even, &4);
//! assert_fails!(even, &3);
//! assert_fails!(even, &3, "odd");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::rule::{Check, Rule};

/// Invocation counter of a rule created by [`probe`].
#[derive(Debug, Clone, Default)]
pub struct Probe {
    calls: Arc<AtomicUsize>,
}

impl Probe {
    /// How many times the probed rule has been checked.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `true` once the probed rule has been checked at least once.
    pub fn was_called(&self) -> bool {
        self.count() > 0
    }

    /// Reset the counter to zero.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

struct ProbeCheck<E> {
    calls: Arc<AtomicUsize>,
    outcome: Result<(), E>,
}

impl<A: ?Sized, E: Clone + Send + Sync> Check<A, E> for ProbeCheck<E> {
    fn check(&self, _args: &A) -> Result<(), E> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// A labelled rule that always returns `outcome`, and a [`Probe`] counting
/// its evaluations.
pub fn probe<A: ?Sized, E>(
    label: impl Into<String>,
    outcome: Result<(), E>,
) -> (Rule<A, E>, Probe)
where
    E: Clone + Send + Sync + 'static,
{
    let counter = Probe::default();
    let check = ProbeCheck {
        calls: Arc::clone(&counter.calls),
        outcome,
    };
    (Rule::named(label, check), counter)
}

/// Assert that a rule or tree passes for the given arguments.
///
/// Accepts anything `Tree::from(&x)` accepts: a `Rule` or a `Tree`.
#[macro_export]
macro_rules! assert_passes {
    ($tree:expr, $args:expr) => {
        match $crate::Tree::from(&$tree).evaluate($args) {
            Ok(()) => {}
            Err(e) => {
                panic!("Expected rules to pass, got error: {:?}", e);
            }
        }
    };
}

/// Assert that a rule or tree fails, optionally with a specific error.
#[macro_export]
macro_rules! assert_fails {
    ($tree:expr, $args:expr) => {
        match $crate::Tree::from(&$tree).evaluate($args) {
            Err(_) => {}
            Ok(()) => {
                panic!("Expected rules to fail, but they passed");
            }
        }
    };
    ($tree:expr, $args:expr, $expected:expr) => {
        match $crate::Tree::from(&$tree).evaluate($args) {
            Err(e) => {
                assert_eq!(e, $expected);
            }
            Ok(()) => {
                panic!("Expected rules to fail with {:?}, but they passed", $expected);
            }
        }
    };
}

/// Assert the exact record of an [`Evaluation`](crate::Evaluation).
///
/// # Example
///
/// ```rust
/// use passable::{assert_record, Rule};
///
/// let a: Rule<(), &str> = Rule::named("a", |_: &()| Err("a"));
/// let b: Rule<(), &str> = Rule::named("b", |_: &()| Ok(()));
///
/// let evaluation = (&a | &b).evaluate_passable(&());
/// assert_record!(evaluation, [(a, true), (b, false)]);
/// ```
#[macro_export]
macro_rules! assert_record {
    ($evaluation:expr, [$(($rule:expr, $failed:expr)),* $(,)?]) => {{
        let actual: ::std::vec::Vec<_> = $evaluation
            .record()
            .iter()
            .map(|entry| (entry.rule().clone(), entry.failed()))
            .collect();
        let expected = ::std::vec![$(($rule.clone(), $failed)),*];
        assert_eq!(actual, expected, "record mismatch");
    }};
}
