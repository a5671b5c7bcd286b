//! Sequence matcher (§4.3): positional matching of two equal-length atom
//! lists. The innermost matcher every other matcher in this module
//! eventually calls.

use crate::atom::Atom;
use crate::bindings::Bindings;
use crate::context::MatchContext;
use crate::error::{Fail, FailReason};
use crate::outcome::Outcome;

use super::helpers;

/// Matches `patterns[0..n]` against `subjects[0..n]`, `n` equal on both
/// sides. Runs the mandatory-bindings pre-pass first to fail fast and to
/// seed the starting bindings (§4.3, §4.8).
pub fn match_positional(
    patterns: &[Atom],
    subjects: &[Atom],
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    if ctx.is_expired() {
        return Outcome::fail(Fail::timed_out());
    }
    if patterns.len() != subjects.len() {
        return Outcome::fail(Fail::new(FailReason::LengthMismatch {
            patterns: patterns.len(),
            subjects: subjects.len(),
        }));
    }

    let seeded = match helpers::mandatory_bindings(patterns, subjects, binds, ctx) {
        None => return Outcome::fail(Fail::new(FailReason::NoPossibleMatch)),
        Some(b) => b,
    };

    match_from(patterns.to_vec(), subjects.to_vec(), 0, &seeded, ctx)
}

/// Walks position `i` to the end. Recursion depth equals the number of
/// positions still to try along one search path, bounded by list length;
/// `find_next`-shaped suspension within a single position stays a plain
/// loop inside `Outcome::flat_map_bindings`/`Iterator::flat_map`, per the
/// no-recursion requirement on `findNext` itself (§5).
fn match_from(
    patterns: Vec<Atom>,
    subjects: Vec<Atom>,
    i: usize,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    if ctx.is_expired() {
        return Outcome::fail(Fail::timed_out());
    }
    if i == patterns.len() {
        return Outcome::one(binds.clone());
    }

    let p = patterns[i].clone();
    let s = subjects[i].clone();

    crate::match_engine::match_atom(&p, &s, binds, ctx)
        .flat_map_bindings(move |b| match_from(patterns.clone(), subjects.clone(), i + 1, &b, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::RootType;
    use crate::context::test_context;

    #[test]
    fn matches_position_by_position() {
        let patterns = vec![Atom::var(RootType::Any, "x"), Atom::int(2)];
        let subjects = vec![Atom::int(1), Atom::int(2)];
        let outcome = match_positional(&patterns, &subjects, &Bindings::new(), test_context());
        let results: Vec<_> = outcome.into_iter_boxed().collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].lookup("x"), Some(&Atom::int(1)));
    }

    #[test]
    fn fails_on_positional_mismatch() {
        let patterns = vec![Atom::int(9)];
        let subjects = vec![Atom::int(1)];
        let outcome = match_positional(&patterns, &subjects, &Bindings::new(), test_context());
        assert!(outcome.is_fail());
    }

    #[test]
    fn fails_on_length_mismatch() {
        let patterns = vec![Atom::int(1)];
        let subjects = vec![Atom::int(1), Atom::int(2)];
        let outcome = match_positional(&patterns, &subjects, &Bindings::new(), test_context());
        assert!(outcome.is_fail());
    }

    #[test]
    fn repeated_variable_requires_consistent_binding() {
        let patterns = vec![Atom::var(RootType::Any, "x"), Atom::var(RootType::Any, "x")];
        let ok_subjects = vec![Atom::int(1), Atom::int(1)];
        let ok = match_positional(&patterns, &ok_subjects, &Bindings::new(), test_context());
        assert!(!ok.is_fail());

        let bad_subjects = vec![Atom::int(1), Atom::int(2)];
        let bad = match_positional(&patterns, &bad_subjects, &Bindings::new(), test_context());
        assert!(bad.is_fail());
    }
}
