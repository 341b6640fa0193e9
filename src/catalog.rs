//! Named rules and text expressions
//!
//! A [`Catalog`] maps names to rules and compiles expressions such as
//! `"ab | cd & (ef | gh)"` into trees built from those same rules. This
//! suits trees whose shape comes from configuration rather than code.
//!
//! Grammar, with `&` binding tighter than `|` and both left-associative:
//!
//! ```text
//! expr    := conj ( '|' conj )*
//! conj    := operand ( '&' operand )*
//! operand := NAME | '(' expr ')'
//! NAME    := [A-Za-z_][A-Za-z0-9_.-]*
//! ```
//!
//! Anything else in operand position is rejected before a tree is built:
//! number and string literals with [`ComposeError::TypeMismatch`], unknown
//! names with [`ComposeError::UnknownRule`]. Parentheses may nest at most
//! [`MAX_DEPTH`] levels; deeper input fails with [`ComposeError::TooDeep`].
//!
//! # Example
//!
//! ```rust
//! use passable::Catalog;
//!
//! let mut catalog: Catalog<str, &str> = Catalog::new();
//! for needle in ["ab", "cd", "ef", "gh"] {
//!     catalog
//!         .register(needle, move |s: &str| if s.contains(needle) { Ok(()) } else { Err("Invalid") })
//!         .unwrap();
//! }
//!
//! let tree = catalog.compile("ab | cd & (ef | gh)").unwrap();
//! assert_eq!(tree.to_string(), "ab | (cd & (ef | gh))");
//! assert_eq!(tree.evaluate_passable("cdgh").passed().labels(), ["cd", "gh"]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ComposeError, ComposeResult};
use crate::rule::{Check, Rule};
use crate::tree::Tree;

/// A registry of named rules.
pub struct Catalog<A: ?Sized, E> {
    rules: BTreeMap<String, Rule<A, E>>,
}

impl<A: ?Sized, E> Catalog<A, E> {
    /// An empty catalog.
    pub fn new() -> Self {
        Catalog {
            rules: BTreeMap::new(),
        }
    }

    /// Register an existing rule under `name`.
    ///
    /// Fails with [`ComposeError::DuplicateRule`] if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, rule: Rule<A, E>) -> ComposeResult<()> {
        let name = name.into();
        if self.rules.contains_key(&name) {
            return Err(ComposeError::DuplicateRule(name));
        }
        self.rules.insert(name, rule);
        Ok(())
    }

    /// Build a rule labelled `name` from `check`, register it and return
    /// the handle.
    pub fn register<C>(&mut self, name: impl Into<String>, check: C) -> ComposeResult<Rule<A, E>>
    where
        C: Check<A, E> + 'static,
    {
        let name = name.into();
        let rule = Rule::named(name.clone(), check);
        self.insert(name, rule.clone())?;
        Ok(rule)
    }

    /// The rule registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Rule<A, E>> {
        self.rules.get(name)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Compile an expression into a tree of this catalog's rules.
    ///
    /// The tree holds the registered handles themselves, so a name used
    /// twice yields the same rule twice.
    pub fn compile(&self, expr: &str) -> ComposeResult<Tree<A, E>> {
        let tokens = Lexer::new(expr).tokenize()?;
        let tree = Parser::new(self, tokens).parse()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(expr, tree = %tree, "compiled rule expression");
        Ok(tree)
    }
}

impl<A: ?Sized, E> Default for Catalog<A, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized, E> Clone for Catalog<A, E> {
    fn clone(&self) -> Self {
        Catalog {
            rules: self.rules.clone(),
        }
    }
}

impl<A: ?Sized, E> fmt::Debug for Catalog<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Name,
    Literal,
    Amp,
    Pipe,
    LeftParen,
    RightParen,
    Eof,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    offset: usize,
}

struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    fn tokenize(mut self) -> ComposeResult<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            tokens.push(token);
            if token.kind == TokenKind::Eof {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> ComposeResult<Token<'a>> {
        self.skip_whitespace();
        let start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: "",
                offset: start,
            });
        };

        let kind = match ch {
            '&' => {
                self.advance();
                TokenKind::Amp
            }
            '|' => {
                self.advance();
                TokenKind::Pipe
            }
            '(' => {
                self.advance();
                TokenKind::LeftParen
            }
            ')' => {
                self.advance();
                TokenKind::RightParen
            }
            '"' | '\'' => {
                self.advance();
                loop {
                    match self.current_char() {
                        Some(c) if c == ch => {
                            self.advance();
                            break;
                        }
                        Some(_) => self.advance(),
                        None => return Err(ComposeError::UnexpectedEnd),
                    }
                }
                TokenKind::Literal
            }
            c if c.is_ascii_digit() => {
                self.advance_while(is_name_continue);
                TokenKind::Literal
            }
            c if is_name_start(c) => {
                self.advance_while(is_name_continue);
                TokenKind::Name
            }
            other => {
                return Err(ComposeError::UnexpectedToken {
                    offset: start,
                    found: other.to_string(),
                })
            }
        };

        Ok(Token {
            kind,
            text: &self.input[start..self.position],
            offset: start,
        })
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.position += c.len_utf8();
        }
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.current_char().is_some_and(&pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Deepest parenthesis nesting [`Catalog::compile`] accepts.
pub const MAX_DEPTH: usize = 128;

struct Parser<'c, 'a, A: ?Sized, E> {
    catalog: &'c Catalog<A, E>,
    tokens: Vec<Token<'a>>,
    position: usize,
    depth: usize,
}

impl<'c, 'a, A: ?Sized, E> Parser<'c, 'a, A, E> {
    fn new(catalog: &'c Catalog<A, E>, tokens: Vec<Token<'a>>) -> Self {
        Parser {
            catalog,
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> ComposeResult<Tree<A, E>> {
        if self.current().kind == TokenKind::Eof {
            return Err(ComposeError::Empty);
        }
        let tree = self.parse_any()?;
        let token = self.current();
        match token.kind {
            TokenKind::Eof => Ok(tree),
            _ => Err(unexpected(token)),
        }
    }

    // The lexer always ends the stream with `Eof`, and `advance` never
    // moves past it.
    fn current(&self) -> Token<'a> {
        self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn parse_any(&mut self) -> ComposeResult<Tree<A, E>> {
        let mut tree = self.parse_all()?;
        while self.current().kind == TokenKind::Pipe {
            self.advance();
            let right = self.parse_all()?;
            tree = tree.or(right);
        }
        Ok(tree)
    }

    fn parse_all(&mut self) -> ComposeResult<Tree<A, E>> {
        let mut tree = self.parse_operand()?;
        while self.current().kind == TokenKind::Amp {
            self.advance();
            let right = self.parse_operand()?;
            tree = tree.and(right);
        }
        Ok(tree)
    }

    fn parse_operand(&mut self) -> ComposeResult<Tree<A, E>> {
        let token = self.current();
        match token.kind {
            TokenKind::Name => {
                self.advance();
                match self.catalog.get(token.text) {
                    Some(rule) => Ok(Tree::Leaf(rule.clone())),
                    None => Err(ComposeError::UnknownRule {
                        offset: token.offset,
                        name: token.text.to_string(),
                    }),
                }
            }
            TokenKind::LeftParen => {
                if self.depth == MAX_DEPTH {
                    return Err(ComposeError::TooDeep {
                        offset: token.offset,
                        limit: MAX_DEPTH,
                    });
                }
                self.advance();
                self.depth += 1;
                let tree = self.parse_any()?;
                self.depth -= 1;
                let close = self.current();
                match close.kind {
                    TokenKind::RightParen => {
                        self.advance();
                        Ok(tree)
                    }
                    TokenKind::Eof => Err(ComposeError::UnclosedParen {
                        offset: token.offset,
                    }),
                    _ => Err(unexpected(close)),
                }
            }
            TokenKind::Literal => Err(ComposeError::TypeMismatch {
                offset: token.offset,
                found: token.text.to_string(),
            }),
            TokenKind::Eof => Err(ComposeError::UnexpectedEnd),
            TokenKind::Amp | TokenKind::Pipe | TokenKind::RightParen => Err(unexpected(token)),
        }
    }
}

fn unexpected(token: Token<'_>) -> ComposeError {
    ComposeError::UnexpectedToken {
        offset: token.offset,
        found: token.text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog<str, &'static str> {
        let mut catalog = Catalog::new();
        for needle in ["ab", "cd", "ef", "gh"] {
            catalog
                .register(needle, move |s: &str| {
                    if s.contains(needle) {
                        Ok(())
                    } else {
                        Err(needle)
                    }
                })
                .unwrap();
        }
        catalog
    }

    #[test]
    fn test_compile_respects_precedence() {
        let tree = catalog().compile("ab | cd & (ef | gh)").unwrap();
        assert_eq!(tree.to_string(), "ab | (cd & (ef | gh))");
    }

    #[test]
    fn test_compile_left_associative() {
        let catalog = catalog();
        assert_eq!(catalog.compile("ab | cd | ef").unwrap().to_string(), "(ab | cd) | ef");
        assert_eq!(catalog.compile("ab & cd & ef").unwrap().to_string(), "(ab & cd) & ef");
        assert_eq!(catalog.compile("((ab))").unwrap().to_string(), "ab");
    }

    #[test]
    fn test_compiled_tree_uses_catalog_handles() {
        let catalog = catalog();
        let tree = catalog.compile("ab & ab").unwrap();
        let ab = catalog.get("ab").unwrap();
        assert!(tree.leaves().all(|rule| rule == ab));
    }

    #[test]
    fn test_literal_operand_is_type_mismatch() {
        let catalog = catalog();
        assert_eq!(
            catalog.compile("ab & 42").unwrap_err(),
            ComposeError::TypeMismatch {
                offset: 5,
                found: "42".to_string()
            }
        );
        assert_eq!(
            catalog.compile("'ab' | cd").unwrap_err(),
            ComposeError::TypeMismatch {
                offset: 0,
                found: "'ab'".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_rule() {
        assert_eq!(
            catalog().compile("ab | zz").unwrap_err(),
            ComposeError::UnknownRule {
                offset: 5,
                name: "zz".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_expressions() {
        let catalog = catalog();
        assert_eq!(catalog.compile("").unwrap_err(), ComposeError::Empty);
        assert_eq!(catalog.compile("   ").unwrap_err(), ComposeError::Empty);
        assert_eq!(catalog.compile("ab &").unwrap_err(), ComposeError::UnexpectedEnd);
        assert_eq!(
            catalog.compile("(ab | cd").unwrap_err(),
            ComposeError::UnclosedParen { offset: 0 }
        );
        assert_eq!(
            catalog.compile("ab cd").unwrap_err(),
            ComposeError::UnexpectedToken {
                offset: 3,
                found: "cd".to_string()
            }
        );
        assert_eq!(
            catalog.compile("ab & | cd").unwrap_err(),
            ComposeError::UnexpectedToken {
                offset: 5,
                found: "|".to_string()
            }
        );
        assert_eq!(
            catalog.compile("ab ! cd").unwrap_err(),
            ComposeError::UnexpectedToken {
                offset: 3,
                found: "!".to_string()
            }
        );
        assert_eq!(catalog.compile("ab | \"cd").unwrap_err(), ComposeError::UnexpectedEnd);
    }

    #[test]
    fn test_nesting_limit() {
        let catalog = catalog();
        let nested = |n: usize| format!("{}ab{}", "(".repeat(n), ")".repeat(n));

        let tree = catalog.compile(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(tree.to_string(), "ab");

        assert_eq!(
            catalog.compile(&nested(MAX_DEPTH + 1)).unwrap_err(),
            ComposeError::TooDeep {
                offset: MAX_DEPTH,
                limit: MAX_DEPTH
            }
        );
        assert_eq!(
            catalog.compile(&format!("cd & {}", nested(MAX_DEPTH + 1))).unwrap_err(),
            ComposeError::TooDeep {
                offset: 5 + MAX_DEPTH,
                limit: MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_nesting_limit_on_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(1024 * 1024)
            .spawn(|| {
                let n = 200_000;
                let expr = format!("{}ab{}", "(".repeat(n), ")".repeat(n));
                catalog().compile(&expr).map(|tree| tree.to_string())
            })
            .unwrap();
        assert!(matches!(
            handle.join().unwrap(),
            Err(ComposeError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_sibling_groups_do_not_accumulate_depth() {
        let group = format!("{}ab{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let expr = format!("{} | {}", group, group);
        assert!(catalog().compile(&expr).is_ok());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut catalog = catalog();
        let err = catalog.register("ab", |_: &str| Ok(())).unwrap_err();
        assert_eq!(err, ComposeError::DuplicateRule("ab".to_string()));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_names_sorted() {
        let names: Vec<_> = catalog().names().map(str::to_string).collect();
        assert_eq!(names, ["ab", "cd", "ef", "gh"]);
    }

    #[test]
    fn test_compiled_tree_evaluates() {
        let tree = catalog().compile("ab | cd & (ef | gh)").unwrap();
        assert_eq!(tree.evaluate("abcdefgh"), Ok(()));
        assert_eq!(tree.evaluate("xy"), Err("ab"));
        assert_eq!(tree.evaluate_passable("cdefgh").passed().labels(), ["cd", "ef"]);
    }

    #[cfg(feature = "tracing")]
    #[tracing_test::traced_test]
    #[test]
    fn test_traces_compiled_expression() {
        catalog().compile("ab & cd").unwrap();
        assert!(logs_contain("compiled rule expression"));
    }
}
