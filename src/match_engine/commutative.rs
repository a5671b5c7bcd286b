//! Commutative matcher (C), §4.5. Same-length pattern/subject lists,
//! any subject permutation admissible.

use itertools::Itertools;

use crate::atom::Atom;
use crate::bindings::Bindings;
use crate::context::MatchContext;
use crate::error::{Fail, FailReason};
use crate::outcome::Outcome;

use super::{helpers, sequence};

/// Preconditions: `|patterns| = |subjects|` (§4.5).
pub fn match_commutative(
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

    let (p_res, s_res) = match helpers::eliminate_constants(patterns, subjects) {
        Some(t) => t,
        None => return Outcome::fail(Fail::new(FailReason::StructuralMismatch)),
    };

    let unbound = helpers::match_unbindables(p_res, s_res, binds.clone(), ctx);

    Outcome::many(unbound.flat_map(move |(b, residual_patterns, residual_subjects)| {
        // Enumeration order over permutations is lexicographic on subject
        // indices (§4.5, §5 ordering guarantee i).
        let n = residual_subjects.len();
        let rp = residual_patterns;
        let rs = residual_subjects;
        (0..n).permutations(n).flat_map(move |idxs| {
            let permuted: Vec<Atom> = idxs.into_iter().map(|i| rs[i].clone()).collect();
            sequence::match_positional(&rp, &permuted, &b, ctx).into_iter_boxed()
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::RootType;
    use crate::context::test_context;

    #[test]
    fn simple_commutative_scenario_one_match() {
        // f[C]($x, 2) vs f[C](2, 5) -> {x -> 5} (§8 scenario 1).
        let patterns = vec![Atom::var(RootType::Any, "x"), Atom::int(2)];
        let subjects = vec![Atom::int(2), Atom::int(5)];
        let results: Vec<_> =
            match_commutative(&patterns, &subjects, &Bindings::new(), test_context())
                .into_iter_boxed()
                .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].lookup("x"), Some(&Atom::int(5)));
    }

    #[test]
    fn fails_when_a_constant_pattern_has_no_subject_match() {
        let patterns = vec![Atom::int(2), Atom::int(9)];
        let subjects = vec![Atom::int(2), Atom::int(5)];
        let outcome =
            match_commutative(&patterns, &subjects, &Bindings::new(), test_context());
        assert!(outcome.is_fail());
    }

    #[test]
    fn two_free_variables_enumerate_every_permutation() {
        let patterns = vec![Atom::var(RootType::Any, "x"), Atom::var(RootType::Any, "y")];
        let subjects = vec![Atom::int(1), Atom::int(2)];
        let results: Vec<_> =
            match_commutative(&patterns, &subjects, &Bindings::new(), test_context())
                .into_iter_boxed()
                .collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].lookup("x"), Some(&Atom::int(1)));
        assert_eq!(results[0].lookup("y"), Some(&Atom::int(2)));
        assert_eq!(results[1].lookup("x"), Some(&Atom::int(2)));
        assert_eq!(results[1].lookup("y"), Some(&Atom::int(1)));
    }
}
