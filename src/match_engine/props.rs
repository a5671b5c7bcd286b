//! Algebraic-properties match (§4.9): the five `AlgProp` components are
//! matched pairwise as ordinary atoms wrapped in `Option`, combining their
//! outcomes the same way the sequence matcher combines positions.

use crate::atom::AlgProp;
use crate::bindings::Bindings;
use crate::context::MatchContext;
use crate::error::{Fail, FailReason};
use crate::outcome::Outcome;

/// `None` matches anything on either side (unspecified); two `Some`s match
/// as ordinary atoms, which may themselves bind variables (a property
/// expressed as a variable or guarded expression) and so may yield `Many`.
pub fn match_props(
    pattern: &AlgProp,
    subject: &AlgProp,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    let slots = [
        (pattern.associative.clone(), subject.associative.clone()),
        (pattern.commutative.clone(), subject.commutative.clone()),
        (pattern.idempotent.clone(), subject.idempotent.clone()),
        (pattern.absorber.clone(), subject.absorber.clone()),
        (pattern.identity.clone(), subject.identity.clone()),
    ];

    let mut outcome = Outcome::one(binds.clone());
    for (p_slot, s_slot) in slots {
        outcome = outcome.flat_map_bindings(move |b| match_slot(&p_slot, &s_slot, &b, ctx));
        if outcome.is_fail() {
            return outcome;
        }
    }
    outcome
}

fn match_slot(
    p_slot: &Option<std::sync::Arc<crate::atom::Atom>>,
    s_slot: &Option<std::sync::Arc<crate::atom::Atom>>,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    match (p_slot, s_slot) {
        (None, _) => Outcome::one(binds.clone()),
        (Some(_), None) => Outcome::fail(Fail::new(FailReason::StructuralMismatch)),
        (Some(p), Some(s)) => crate::match_engine::match_atom(p, s, binds, ctx),
    }
}
