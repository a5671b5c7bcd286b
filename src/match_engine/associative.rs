//! Associative matcher (A), §4.6. `|patterns| <= |subjects|`; element
//! order is significant, grouping is not.

use crate::atom::{AlgProp, Atom};
use crate::bindings::Bindings;
use crate::context::{MatchContext, Operator};
use crate::error::{Fail, FailReason};
use crate::outcome::Outcome;

use super::grouping::GroupingIter;
use super::{helpers, sequence};

pub fn match_associative(
    patterns: &[Atom],
    subjects: &[Atom],
    props: &AlgProp,
    op: Option<&Operator>,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    if ctx.is_expired() {
        return Outcome::fail(Fail::timed_out());
    }

    if patterns.len() > subjects.len() {
        return Outcome::fail(Fail::new(FailReason::LengthMismatch {
            patterns: patterns.len(),
            subjects: subjects.len(),
        }));
    }

    if patterns.len() == subjects.len() {
        return sequence::match_positional(patterns, subjects, binds, ctx);
    }

    if patterns.len() == 1 {
        let whole = helpers::wrap_whole(subjects, props, op);
        return crate::match_engine::match_atom(&patterns[0], &whole, binds, ctx);
    }

    let grouping = match GroupingIter::new(subjects.to_vec(), patterns.len(), props.clone(), op.cloned()) {
        Some(g) => g,
        None => {
            return Outcome::fail(Fail::new(FailReason::InvalidGrouping {
                patterns: patterns.len(),
                subjects: subjects.len(),
            }))
        }
    };

    let patterns = patterns.to_vec();
    let binds = binds.clone();
    Outcome::many(grouping.flat_map(move |grouped_subjects| {
        sequence::match_positional(&patterns, &grouped_subjects, &binds, ctx).into_iter_boxed()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::RootType;
    use crate::context::test_context;

    #[test]
    fn grouping_under_a_yields_two_matches_in_divider_order() {
        // g[A]($a, $b) vs g[A](1, 2, 3) (§8 scenario 3).
        let patterns = vec![Atom::var(RootType::Any, "a"), Atom::var(RootType::Any, "b")];
        let subjects = vec![Atom::int(1), Atom::int(2), Atom::int(3)];
        let props = AlgProp::assoc();
        let op = Operator {
            name: crate::atom::name("g"),
            params: props.clone(),
        };
        let results: Vec<_> = match_associative(
            &patterns,
            &subjects,
            &props,
            Some(&op),
            &Bindings::new(),
            test_context(),
        )
        .into_iter_boxed()
        .collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].lookup("a"), Some(&Atom::int(1)));
        match results[0].lookup("b") {
            Some(Atom::Apply(head, arg)) => {
                assert_eq!(**head, Atom::op_ref("g"));
                match arg.as_ref() {
                    Atom::AtomSeq(seq) => assert_eq!(seq.atoms(), &[Atom::int(2), Atom::int(3)]),
                    other => panic!("expected AtomSeq, got {other:?}"),
                }
            }
            other => panic!("expected Apply binding, got {other:?}"),
        }
        assert_eq!(results[1].lookup("b"), Some(&Atom::int(3)));
    }

    #[test]
    fn equal_length_delegates_to_sequence_matcher() {
        let patterns = vec![Atom::var(RootType::Any, "x"), Atom::int(2)];
        let subjects = vec![Atom::int(1), Atom::int(2)];
        let outcome = match_associative(
            &patterns,
            &subjects,
            &AlgProp::assoc(),
            None,
            &Bindings::new(),
            test_context(),
        );
        let results: Vec<_> = outcome.into_iter_boxed().collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].lookup("x"), Some(&Atom::int(1)));
    }

    #[test]
    fn single_pattern_matches_the_whole_wrapped_subject_list() {
        let patterns = vec![Atom::var(RootType::Any, "all")];
        let subjects = vec![Atom::int(1), Atom::int(2), Atom::int(3)];
        let op = Operator {
            name: crate::atom::name("g"),
            params: AlgProp::assoc(),
        };
        let results: Vec<_> = match_associative(
            &patterns,
            &subjects,
            &AlgProp::assoc(),
            Some(&op),
            &Bindings::new(),
            test_context(),
        )
        .into_iter_boxed()
        .collect();
        assert_eq!(results.len(), 1);
        match results[0].lookup("all") {
            Some(Atom::Apply(head, _)) => assert_eq!(**head, Atom::op_ref("g")),
            other => panic!("expected wrapped Apply, got {other:?}"),
        }
    }

    #[test]
    fn more_patterns_than_subjects_fails() {
        let patterns = vec![Atom::int(1), Atom::int(2)];
        let subjects = vec![Atom::int(1)];
        let outcome = match_associative(
            &patterns,
            &subjects,
            &AlgProp::assoc(),
            None,
            &Bindings::new(),
            test_context(),
        );
        assert!(outcome.is_fail());
    }
}
