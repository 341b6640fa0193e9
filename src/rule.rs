//! Leaf rules
//!
//! A [`Rule`] is the atomic unit of a combinator tree. It wraps a [`Check`]
//! (any `Fn(&A) -> Result<(), E>` closure, or a type implementing the trait)
//! behind a shared handle that carries an identity.
//!
//! Identity is what the passable record refers to: cloning a `Rule` gives
//! back the *same* rule, while two separately built rules are distinct even
//! when their checks behave identically.
//!
//! # Example
//!
//! ```rust
//! use passable::Rule;
//!
//! let not_empty: Rule<str, &str> = Rule::named("not_empty", |s: &str| {
//!     if s.is_empty() { Err("must not be empty") } else { Ok(()) }
//! });
//!
//! assert_eq!(not_empty.check("hello"), Ok(()));
//! assert_eq!(not_empty.check(""), Err("must not be empty"));
//!
//! let same = not_empty.clone();
//! assert_eq!(same, not_empty);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A validation check over call arguments of type `A`.
///
/// Returns `Ok(())` when the arguments pass and `Err(error)` otherwise. The
/// engine only looks at which variant came back; the error payload is
/// handed to the caller untouched.
///
/// Closures implement this trait through a blanket impl.
///
/// # Example
///
/// ```rust
/// use passable::Check;
///
/// struct MinLen(usize);
///
/// impl Check<str, String> for MinLen {
///     fn check(&self, args: &str) -> Result<(), String> {
///         if args.len() >= self.0 {
///             Ok(())
///         } else {
///             Err(format!("shorter than {}", self.0))
///         }
///     }
/// }
///
/// assert!(MinLen(3).check("abc").is_ok());
/// assert!(MinLen(3).check("ab").is_err());
/// ```
pub trait Check<A: ?Sized, E>: Send + Sync {
    /// Check the arguments.
    fn check(&self, args: &A) -> Result<(), E>;
}

impl<A: ?Sized, E, F> Check<A, E> for F
where
    F: Fn(&A) -> Result<(), E> + Send + Sync,
{
    #[inline]
    fn check(&self, args: &A) -> Result<(), E> {
        self(args)
    }
}

/// Process-unique identity of a [`Rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u64);

impl RuleId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        RuleId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shared, identity-carrying handle to a [`Check`].
///
/// `Rule` is cheap to clone; clones compare equal and hash the same because
/// they share one [`RuleId`]. The check itself is never mutated by the
/// engine.
pub struct Rule<A: ?Sized, E> {
    id: RuleId,
    label: Option<Arc<str>>,
    check: Arc<dyn Check<A, E>>,
}

impl<A: ?Sized, E> Rule<A, E> {
    /// Create an unlabelled rule from any [`Check`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::Rule;
    ///
    /// let positive: Rule<i32, &str> = Rule::new(|n: &i32| {
    ///     if *n > 0 { Ok(()) } else { Err("not positive") }
    /// });
    /// assert!(positive.check(&5).is_ok());
    /// assert_eq!(positive.label(), None);
    /// ```
    pub fn new<C>(check: C) -> Self
    where
        C: Check<A, E> + 'static,
    {
        Rule {
            id: RuleId::next(),
            label: None,
            check: Arc::new(check),
        }
    }

    /// Create a labelled rule. The label shows up in `Display`, in tracing
    /// output and in [`Outcome`](crate::Outcome) reports.
    pub fn named<C>(label: impl Into<String>, check: C) -> Self
    where
        C: Check<A, E> + 'static,
    {
        Rule {
            id: RuleId::next(),
            label: Some(Arc::from(label.into())),
            check: Arc::new(check),
        }
    }

    /// Create an unlabelled rule from a closure.
    ///
    /// Same as [`Rule::new`], with the closure bound spelled out so the
    /// argument and error types can be inferred from the closure alone.
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::Rule;
    ///
    /// let even = Rule::from_fn(|n: &u32| if n % 2 == 0 { Ok(()) } else { Err(*n) });
    /// assert_eq!(even.check(&3), Err(3));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&A) -> Result<(), E> + Send + Sync + 'static,
    {
        Rule::new(f)
    }

    /// Run the check against the arguments.
    #[inline]
    pub fn check(&self, args: &A) -> Result<(), E> {
        self.check.check(args)
    }

    /// This rule's identity.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// This rule's label, if it has one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Create an unlabelled rule from a closure.
///
/// Shorthand for [`Rule::from_fn`].
///
/// # Example
///
/// ```rust
/// use passable::rule;
///
/// let short = rule(|s: &str| if s.len() < 5 { Ok(()) } else { Err("too long") });
/// assert!(short.check("abc").is_ok());
/// ```
pub fn rule<A: ?Sized, E, F>(f: F) -> Rule<A, E>
where
    F: Fn(&A) -> Result<(), E> + Send + Sync + 'static,
{
    Rule::from_fn(f)
}

impl<A: ?Sized, E> Clone for Rule<A, E> {
    fn clone(&self) -> Self {
        Rule {
            id: self.id,
            label: self.label.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<A: ?Sized, E> PartialEq for Rule<A, E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A: ?Sized, E> Eq for Rule<A, E> {}

impl<A: ?Sized, E> Hash for Rule<A, E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A: ?Sized, E> fmt::Debug for Rule<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("label", &self.label())
            .finish()
    }
}

impl<A: ?Sized, E> fmt::Display for Rule<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "rule{}", self.id),
        }
    }
}
