//! # Passable
//!
//! Compose validation rules with AND / OR and let the guarded function know
//! which rules passed.
//!
//! A [`Rule`] is any `Fn(&A) -> Result<(), E>`. Rules combine into a
//! [`Tree`] with `&` and `|` (or `.and()` / `.or()`), and a tree evaluates in
//! two modes:
//!
//! - **plain**: [`Tree::evaluate`] short-circuits and returns `Ok(())` or one
//!   representative error;
//! - **passable**: [`Tree::evaluate_passable`] returns the same verdict plus
//!   the ordered [`Record`] of every rule it actually evaluated.
//!
//! A [`Guard`] puts a tree in front of a function. Wrapped with
//! [`Guard::wrap_passed`], the function receives the rules that passed, so it
//! can tell *which* alternative of an OR let the call through.
//!
//! ## Quick Example
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
//! // `&` binds tighter than `|`: ab | (cd & (ef | gh))
//! let upper = requires(&ab | &cd & (&ef | &gh)).wrap_passed(|s: &str, passed| {
//!     let mut out = vec![s.to_string()];
//!     out.extend(passed.iter().map(|rule| rule.to_string().to_uppercase()));
//!     out
//! });
//!
//! let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
//!
//! assert_eq!(upper.call("abcdefgh"), Ok(words(&["abcdefgh", "AB"])));
//! assert_eq!(upper.call("cdefgh"), Ok(words(&["cdefgh", "CD", "EF"])));
//! assert_eq!(upper.call("cdgh"), Ok(words(&["cdgh", "CD", "GH"])));
//! assert_eq!(upper.call("xy"), Err("Invalid"));
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events for rule evaluation, guard decisions
//!   and expression compilation.
//! - `serde`: derive `Serialize` / `Deserialize` for [`Junction`] and
//!   [`Outcome`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod eval;
pub mod guard;
pub mod record;
pub mod rule;
pub mod testing;
pub mod tree;

// Re-exports
pub use catalog::Catalog;
pub use error::{ComposeError, ComposeResult};
pub use eval::{evaluate, evaluate_passable};
pub use guard::{requires, Guard, Guarded, Passable, Plain, DEFAULT_PASSED_KEY};
pub use record::{Entry, Evaluation, Outcome, Passed, Record};
pub use rule::{rule, Check, Rule, RuleId};
pub use tree::{all, any, Junction, Leaves, Node, Tree};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::error::{ComposeError, ComposeResult};
    pub use crate::guard::{requires, Guard, Guarded};
    pub use crate::record::{Evaluation, Passed, Record};
    pub use crate::rule::{rule, Check, Rule};
    pub use crate::tree::{all, any, Junction, Tree};
}
