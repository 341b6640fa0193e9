//! Results of passable evaluation
//!
//! [`Tree::evaluate_passable`](crate::Tree::evaluate_passable) returns an
//! [`Evaluation`]: the same verdict as plain evaluation, plus a [`Record`] of
//! every rule that was actually evaluated, in evaluation order, and whether
//! it failed. Rules skipped by short-circuiting are absent from the record.
//!
//! [`Passed`] is the slice of the record a guarded function cares about:
//! the rules that passed, in order.

use std::fmt;

use crate::rule::Rule;

/// One evaluated rule and whether it failed.
pub struct Entry<A: ?Sized, E> {
    rule: Rule<A, E>,
    failed: bool,
}

impl<A: ?Sized, E> Entry<A, E> {
    pub(crate) fn new(rule: Rule<A, E>, failed: bool) -> Self {
        Entry { rule, failed }
    }

    /// The evaluated rule.
    pub fn rule(&self) -> &Rule<A, E> {
        &self.rule
    }

    /// Whether the rule's check returned an error.
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Whether the rule's check passed.
    pub fn passed(&self) -> bool {
        !self.failed
    }

    /// Split into the rule and its failed flag.
    pub fn into_parts(self) -> (Rule<A, E>, bool) {
        (self.rule, self.failed)
    }
}

impl<A: ?Sized, E> Clone for Entry<A, E> {
    fn clone(&self) -> Self {
        Entry::new(self.rule.clone(), self.failed)
    }
}

impl<A: ?Sized, E> PartialEq for Entry<A, E> {
    fn eq(&self, other: &Self) -> bool {
        self.rule == other.rule && self.failed == other.failed
    }
}

impl<A: ?Sized, E> Eq for Entry<A, E> {}

impl<A: ?Sized, E> fmt::Debug for Entry<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("rule", &self.rule)
            .field("failed", &self.failed)
            .finish()
    }
}

/// Ordered record of the rules visited by one passable evaluation.
///
/// Entries appear in pre-order, left before right, restricted to the
/// branches that were actually visited. A rule used in several places of a
/// tree appears once per visit.
pub struct Record<A: ?Sized, E> {
    entries: Vec<Entry<A, E>>,
}

impl<A: ?Sized, E> Record<A, E> {
    pub(crate) fn from_entries(entries: Vec<Entry<A, E>>) -> Self {
        Record { entries }
    }

    /// All entries, in evaluation order.
    pub fn entries(&self) -> &[Entry<A, E>] {
        &self.entries
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry<A, E>> {
        self.entries.iter()
    }

    /// Number of evaluated rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing was evaluated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The rules that passed, in evaluation order.
    pub fn passed(&self) -> Passed<A, E> {
        Passed::new(
            self.entries
                .iter()
                .filter(|entry| entry.passed())
                .map(|entry| entry.rule.clone())
                .collect(),
        )
    }

    /// The rules that failed, in evaluation order.
    ///
    /// A plain `Vec` rather than [`Passed`]: `Passed` is what a guard hands
    /// to its target, and failed rules never reach a target.
    pub fn failed(&self) -> Vec<Rule<A, E>> {
        self.entries
            .iter()
            .filter(|entry| entry.failed())
            .map(|entry| entry.rule.clone())
            .collect()
    }

    /// Consume the record, keeping the rules that passed.
    pub fn into_passed(self) -> Passed<A, E> {
        Passed::new(
            self.entries
                .into_iter()
                .filter(Entry::passed)
                .map(|entry| entry.rule)
                .collect(),
        )
    }

    /// A plain-data view of the record, one [`Outcome`] per entry.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.entries
            .iter()
            .map(|entry| Outcome {
                rule: entry.rule.to_string(),
                failed: entry.failed,
            })
            .collect()
    }
}

impl<A: ?Sized, E> Clone for Record<A, E> {
    fn clone(&self) -> Self {
        Record::from_entries(self.entries.clone())
    }
}

impl<A: ?Sized, E> PartialEq for Record<A, E> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<A: ?Sized, E> Eq for Record<A, E> {}

impl<A: ?Sized, E> fmt::Debug for Record<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<A: ?Sized, E> IntoIterator for Record<A, E> {
    type Item = Entry<A, E>;
    type IntoIter = std::vec::IntoIter<Entry<A, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, A: ?Sized, E> IntoIterator for &'a Record<A, E> {
    type Item = &'a Entry<A, E>;
    type IntoIter = std::slice::Iter<'a, Entry<A, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Plain-data form of an [`Entry`]: the rule's display name and its flag.
///
/// Serializable with the `serde` feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    /// The rule's label, or `rule#<id>` when it has none.
    pub rule: String,
    /// Whether the rule failed.
    pub failed: bool,
}

/// The rules that passed during one evaluation, in evaluation order.
///
/// This is what a passable guard hands to its target.
pub struct Passed<A: ?Sized, E> {
    rules: Vec<Rule<A, E>>,
}

impl<A: ?Sized, E> Passed<A, E> {
    pub(crate) fn new(rules: Vec<Rule<A, E>>) -> Self {
        Passed { rules }
    }

    /// The passed rules as a slice.
    pub fn as_slice(&self) -> &[Rule<A, E>] {
        &self.rules
    }

    /// Iterate over the passed rules.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule<A, E>> {
        self.rules.iter()
    }

    /// Number of passed entries (a rule visited twice counts twice).
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` if no rule passed.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether the given rule passed at least once.
    pub fn contains(&self, rule: &Rule<A, E>) -> bool {
        self.rules.contains(rule)
    }

    /// Labels of the passed rules (see [`Rule`]'s `Display`).
    pub fn labels(&self) -> Vec<String> {
        self.rules.iter().map(ToString::to_string).collect()
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<Rule<A, E>> {
        self.rules
    }
}

impl<A: ?Sized, E> Clone for Passed<A, E> {
    fn clone(&self) -> Self {
        Passed::new(self.rules.clone())
    }
}

impl<A: ?Sized, E> PartialEq for Passed<A, E> {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl<A: ?Sized, E> Eq for Passed<A, E> {}

impl<A: ?Sized, E> PartialEq<Vec<Rule<A, E>>> for Passed<A, E> {
    fn eq(&self, other: &Vec<Rule<A, E>>) -> bool {
        &self.rules == other
    }
}

impl<A: ?Sized, E> fmt::Debug for Passed<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

impl<A: ?Sized, E> fmt::Display for Passed<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", rule)?;
        }
        f.write_str("]")
    }
}

impl<A: ?Sized, E> IntoIterator for Passed<A, E> {
    type Item = Rule<A, E>;
    type IntoIter = std::vec::IntoIter<Rule<A, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a, A: ?Sized, E> IntoIterator for &'a Passed<A, E> {
    type Item = &'a Rule<A, E>;
    type IntoIter = std::slice::Iter<'a, Rule<A, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Outcome of a passable evaluation: a [`Record`] and at most one error.
///
/// The error is the same representative error plain evaluation would
/// return for the same tree and arguments.
pub struct Evaluation<A: ?Sized, E> {
    record: Record<A, E>,
    error: Option<E>,
}

impl<A: ?Sized, E> Evaluation<A, E> {
    pub(crate) fn new(record: Record<A, E>, error: Option<E>) -> Self {
        Evaluation { record, error }
    }

    /// The rules visited, with their flags.
    pub fn record(&self) -> &Record<A, E> {
        &self.record
    }

    /// The representative error, if the tree failed.
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// `true` when the tree passed.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The rules that passed, in evaluation order.
    pub fn passed(&self) -> Passed<A, E> {
        self.record.passed()
    }

    /// Split into the record and the error.
    pub fn into_parts(self) -> (Record<A, E>, Option<E>) {
        (self.record, self.error)
    }

    /// `Ok(passed rules)` when the tree passed, `Err(error)` otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use passable::Rule;
    ///
    /// let a: Rule<i32, &str> = Rule::named("a", |n: &i32| if *n > 0 { Ok(()) } else { Err("a") });
    /// let b: Rule<i32, &str> = Rule::named("b", |n: &i32| if *n > 5 { Ok(()) } else { Err("b") });
    /// let tree = &a | &b;
    ///
    /// let passed = tree.evaluate_passable(&1).into_result().unwrap();
    /// assert_eq!(passed, vec![a.clone()]);
    ///
    /// assert_eq!(tree.evaluate_passable(&0).into_result(), Err("a"));
    /// ```
    pub fn into_result(self) -> Result<Passed<A, E>, E> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.record.into_passed()),
        }
    }
}

impl<A: ?Sized, E: Clone> Clone for Evaluation<A, E> {
    fn clone(&self) -> Self {
        Evaluation::new(self.record.clone(), self.error.clone())
    }
}

impl<A: ?Sized, E: PartialEq> PartialEq for Evaluation<A, E> {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.error == other.error
    }
}

impl<A: ?Sized, E: fmt::Debug> fmt::Debug for Evaluation<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluation")
            .field("record", &self.record)
            .field("error", &self.error)
            .finish()
    }
}
