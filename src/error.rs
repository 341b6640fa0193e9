//! Construction-time errors
//!
//! Rule failures are the caller's own error values and never pass through
//! this module. [`ComposeError`] covers the one place where composition can
//! fail at runtime: assembling a tree from text with
//! [`Catalog::compile`](crate::Catalog::compile).

use thiserror::Error;

/// A tree could not be built.
///
/// Offsets are byte offsets into the compiled expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// An operand position holds something that is neither a rule nor a
    /// parenthesised sub-expression, such as a number or a string literal.
    #[error("operand at offset {offset} is not a rule or sub-expression: `{found}`")]
    TypeMismatch {
        /// Where the operand starts.
        offset: usize,
        /// The offending text.
        found: String,
    },

    /// A name that is not registered in the catalog.
    #[error("unknown rule `{name}` at offset {offset}")]
    UnknownRule {
        /// Where the name starts.
        offset: usize,
        /// The name as written.
        name: String,
    },

    /// A token that cannot appear at this point.
    #[error("unexpected `{found}` at offset {offset}")]
    UnexpectedToken {
        /// Where the token starts.
        offset: usize,
        /// The token as written.
        found: String,
    },

    /// The expression stopped where an operand was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A `(` without its `)`.
    #[error("unclosed `(` at offset {offset}")]
    UnclosedParen {
        /// Where the `(` is.
        offset: usize,
    },

    /// Parentheses nested deeper than the compiler accepts.
    #[error("`(` at offset {offset} nests deeper than {limit} levels")]
    TooDeep {
        /// Where the offending `(` is.
        offset: usize,
        /// The nesting limit.
        limit: usize,
    },

    /// The expression contains no rules at all.
    #[error("empty expression")]
    Empty,

    /// A catalog already has a rule under this name.
    #[error("rule `{0}` is already registered")]
    DuplicateRule(String),
}

/// Result alias for tree construction.
pub type ComposeResult<T> = Result<T, ComposeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ComposeError::TypeMismatch {
            offset: 5,
            found: "42".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operand at offset 5 is not a rule or sub-expression: `42`"
        );

        let err = ComposeError::UnknownRule {
            offset: 0,
            name: "zz".to_string(),
        };
        assert_eq!(err.to_string(), "unknown rule `zz` at offset 0");

        let err = ComposeError::TooDeep {
            offset: 128,
            limit: 128,
        };
        assert_eq!(err.to_string(), "`(` at offset 128 nests deeper than 128 levels");

        assert_eq!(
            ComposeError::DuplicateRule("ab".to_string()).to_string(),
            "rule `ab` is already registered"
        );
    }

    #[test]
    fn test_is_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ComposeError>();
    }
}
