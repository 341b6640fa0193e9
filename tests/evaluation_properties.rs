//! Property-based tests for plain and passable evaluation
//!
//! Arguments are a vector of failure flags: rule `i` fails with error `i`
//! exactly when `flags[i]` is set. Random trees over those rules are checked
//! against a direct model of the evaluation recursion.

use passable::{Catalog, Rule, Tree};
use proptest::prelude::*;

const RULES: usize = 6;

#[derive(Debug, Clone)]
enum Shape {
    Leaf(usize),
    All(Box<Shape>, Box<Shape>),
    Any(Box<Shape>, Box<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = (0..RULES).prop_map(Shape::Leaf);
    leaf.prop_recursive(5, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Shape::All(Box::new(l), Box::new(r))),
            (inner.clone(), inner).prop_map(|(l, r)| Shape::Any(Box::new(l), Box::new(r))),
        ]
    })
}

fn flags() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), RULES)
}

fn rules() -> Vec<Rule<[bool], usize>> {
    (0..RULES)
        .map(|i| {
            Rule::named(format!("r{}", i), move |flags: &[bool]| {
                if flags[i] {
                    Err(i)
                } else {
                    Ok(())
                }
            })
        })
        .collect()
}

fn build(shape: &Shape, rules: &[Rule<[bool], usize>]) -> Tree<[bool], usize> {
    match shape {
        Shape::Leaf(i) => Tree::from(&rules[*i]),
        Shape::All(l, r) => build(l, rules) & build(r, rules),
        Shape::Any(l, r) => build(l, rules) | build(r, rules),
    }
}

fn expression(shape: &Shape) -> String {
    match shape {
        Shape::Leaf(i) => format!("r{}", i),
        Shape::All(l, r) => format!("({}) & ({})", expression(l), expression(r)),
        Shape::Any(l, r) => format!("({}) | ({})", expression(l), expression(r)),
    }
}

/// Record and error computed by concatenating child records at every node.
fn model(shape: &Shape, flags: &[bool]) -> (Vec<(usize, bool)>, Option<usize>) {
    match shape {
        Shape::Leaf(i) => (vec![(*i, flags[*i])], flags[*i].then_some(*i)),
        Shape::All(l, r) => {
            let (mut record, error) = model(l, flags);
            if error.is_some() {
                return (record, error);
            }
            let (right, right_error) = model(r, flags);
            record.extend(right);
            (record, right_error)
        }
        Shape::Any(l, r) => {
            let (mut record, error) = model(l, flags);
            if error.is_none() {
                return (record, None);
            }
            let (right, right_error) = model(r, flags);
            record.extend(right);
            (record, right_error.and(error))
        }
    }
}

fn indexed(
    tree: &Tree<[bool], usize>,
    rules: &[Rule<[bool], usize>],
    flags: &[bool],
) -> Vec<(usize, bool)> {
    tree.evaluate_passable(flags)
        .record()
        .iter()
        .map(|entry| {
            let index = rules
                .iter()
                .position(|rule| rule == entry.rule())
                .unwrap();
            (index, entry.failed())
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_passable_verdict_matches_plain(shape in shape(), flags in flags()) {
        let rules = rules();
        let tree = build(&shape, &rules);

        let plain = tree.evaluate(&flags);
        let passable = tree.evaluate_passable(&flags);

        prop_assert_eq!(plain.err(), passable.error().copied());
    }

    #[test]
    fn prop_passable_matches_model(shape in shape(), flags in flags()) {
        let rules = rules();
        let tree = build(&shape, &rules);
        let (expected_record, expected_error) = model(&shape, &flags);

        prop_assert_eq!(indexed(&tree, &rules, &flags), expected_record);
        prop_assert_eq!(tree.evaluate(&flags).err(), expected_error);
    }

    #[test]
    fn prop_failed_flags_are_truthful(shape in shape(), flags in flags()) {
        let rules = rules();
        let tree = build(&shape, &rules);

        for (index, failed) in indexed(&tree, &rules, &flags) {
            prop_assert_eq!(failed, flags[index]);
        }
    }

    #[test]
    fn prop_record_never_exceeds_leaves(shape in shape(), flags in flags()) {
        let rules = rules();
        let tree = build(&shape, &rules);
        let evaluation = tree.evaluate_passable(&flags);

        prop_assert!(!evaluation.record().is_empty());
        prop_assert!(evaluation.record().len() <= tree.len());
    }

    #[test]
    fn prop_error_is_a_failed_leaf(shape in shape(), flags in flags()) {
        let rules = rules();
        let tree = build(&shape, &rules);

        if let Err(error) = tree.evaluate(&flags) {
            prop_assert!(flags[error]);
            prop_assert!(tree.leaves().any(|rule| rule == &rules[error]));
        }
    }

    #[test]
    fn prop_all_passing_flags_pass(shape in shape()) {
        let rules = rules();
        let tree = build(&shape, &rules);
        let flags = vec![false; RULES];

        prop_assert_eq!(tree.evaluate(&flags), Ok(()));
    }

    #[test]
    fn prop_compiled_expression_matches_built_tree(shape in shape(), flags in flags()) {
        let rules = rules();
        let mut catalog: Catalog<[bool], usize> = Catalog::new();
        for (i, rule) in rules.iter().enumerate() {
            catalog.insert(format!("r{}", i), rule.clone()).unwrap();
        }

        let built = build(&shape, &rules);
        let compiled = catalog.compile(&expression(&shape)).unwrap();

        prop_assert_eq!(compiled.to_string(), built.to_string());
        prop_assert_eq!(compiled.evaluate_passable(&flags), built.evaluate_passable(&flags));
    }
}
