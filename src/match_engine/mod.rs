//! The matching engine (§4, §6): single-atom dispatch plus the four
//! sequence matchers it delegates to.
//!
//! Control flow mirrors §2's table: `match_atom` on an `AtomSeq` pair
//! calls `match_sequence`, which matches the two `AlgProp` records
//! (§4.9) and then dispatches on the *subject's* concrete (A, C) pair to
//! AC / A / C / plain positional matching. Each of those, in turn,
//! bottoms out in `sequence::match_positional` and in recursive calls
//! back into `match_atom` for non-`AtomSeq` children.

pub mod ac;
pub mod associative;
pub mod commutative;
pub mod grouping;
pub mod helpers;
pub mod props;
pub mod sequence;

use crate::atom::{AlgProp, Atom};
use crate::bindings::{is_true_literal, Bindings};
use crate::context::{MatchContext, Operator};
use crate::error::{Fail, FailReason};
use crate::outcome::Outcome;

/// `tryMatch(subject, binds) -> Outcome` (§4.4), implemented as a tagged
/// dispatch over `Atom` rather than a virtual method on it (§9: atoms
/// stay opaque data, matching logic lives in this module).
pub fn match_atom(
    pattern: &Atom,
    subject: &Atom,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    if ctx.is_expired() {
        return Outcome::fail(Fail::timed_out());
    }

    match pattern {
        Atom::Variable(v) => match_variable(v, subject, binds, ctx),
        Atom::Apply(h1, a1) => match_apply(h1, a1, subject, binds, ctx),
        Atom::AtomSeq(p_seq) => match_atomseq(p_seq, subject, binds, ctx),
        Atom::Literal(_)
        | Atom::NamedRootType(_)
        | Atom::OperatorRef(_)
        | Atom::Lambda(..)
        | Atom::MapPair(..)
        | Atom::SpecialForm(..)
        | Atom::BindingsAtom(_) => {
            if pattern == subject {
                Outcome::one(binds.clone())
            } else {
                Outcome::fail(Fail::new(FailReason::StructuralMismatch).at(pattern, subject))
            }
        }
    }
}

fn match_variable(
    v: &crate::atom::Variable,
    subject: &Atom,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    if let Some(existing) = binds.lookup(&v.name) {
        return if existing == subject {
            Outcome::one(binds.clone())
        } else {
            Outcome::fail(Fail::new(FailReason::StructuralMismatch))
        };
    }

    match &v.guard {
        None => match binds.add(&v.name, subject.clone()) {
            Some(b) => Outcome::one(b),
            None => Outcome::fail(Fail::new(FailReason::BindingConflict)),
        },
        Some(guard) => {
            let trial = match binds.add(&v.name, subject.clone()) {
                Some(b) => b,
                None => return Outcome::fail(Fail::new(FailReason::BindingConflict)),
            };
            let rewritten = ctx.rewriter.rewrite(guard, &trial);
            if is_true_literal(&rewritten) {
                Outcome::one(trial)
            } else {
                Outcome::fail(Fail::new(FailReason::StructuralMismatch))
            }
        }
    }
}

fn match_apply(
    h1: &std::sync::Arc<Atom>,
    a1: &std::sync::Arc<Atom>,
    subject: &Atom,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    let (h2, a2) = match subject {
        Atom::Apply(h2, a2) => (h2.clone(), a2.clone()),
        _ => {
            return Outcome::fail(
                Fail::new(FailReason::StructuralMismatch).at(&Atom::Apply(h1.clone(), a1.clone()), subject),
            )
        }
    };
    let a1 = a1.clone();
    let h1 = h1.clone();
    match_atom(&h1, &h2, binds, ctx).flat_map_bindings(move |b| {
        // An operator application's argument list is matched as a whole
        // `AtomSeq` pair (§3: "for operator applications `head` is an
        // `OperatorRef` and `arg` is an `AtomSeq`"), which lets the
        // associative matcher wrap multi-element groups under the
        // governing operator (§4.6 step 4) instead of losing its name.
        match (h1.as_ref(), a1.as_ref(), a2.as_ref()) {
            (Atom::OperatorRef(op_name), Atom::AtomSeq(p_seq), Atom::AtomSeq(s_seq)) => {
                let op = ctx.operators.lookup(op_name).unwrap_or(Operator {
                    name: op_name.clone(),
                    params: s_seq.props.clone(),
                });
                match_sequence(p_seq, s_seq, &b, Some(&op), ctx)
            }
            _ => match_atom(&a1, &a2, &b, ctx),
        }
    })
}

fn match_atomseq(
    p_seq: &crate::atom::AtomSeq,
    subject: &Atom,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    let s_seq = match subject {
        Atom::AtomSeq(s) => s,
        _ => return Outcome::fail(Fail::new(FailReason::StructuralMismatch)),
    };

    let p_props = p_seq.props.clone();
    let p_atoms = p_seq.atoms().to_vec();
    let s_props = s_seq.props.clone();
    let s_atoms = s_seq.atoms().to_vec();

    props::match_props(&p_props, &s_props, binds, ctx).flat_map_bindings(move |b| {
        dispatch(&p_atoms, &s_atoms, &s_props, None, &b, ctx)
    })
}

/// Dispatches on the subject's concrete `(associative, commutative)`
/// pair (§4.4, §2): the subject is always ground, so its properties
/// decide which algorithm applies regardless of what the pattern's own
/// (possibly unspecified or variable) property slots said.
fn dispatch(
    patterns: &[Atom],
    subjects: &[Atom],
    props: &AlgProp,
    op: Option<&Operator>,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    match (props.is_associative(), props.is_commutative()) {
        (true, true) => ac::match_ac(patterns, subjects, props, op, binds, ctx),
        (true, false) => associative::match_associative(patterns, subjects, props, op, binds, ctx),
        (false, true) => commutative::match_commutative(patterns, subjects, binds, ctx),
        (false, false) => sequence::match_positional(patterns, subjects, binds, ctx),
    }
}

/// `match_sequence(patterns, subjects, binds, op) -> Outcome` (§6): the
/// top entry used by `match_atom` for nested `AtomSeq`, also exposed
/// publicly so a host can match two top-level operator argument lists
/// directly (e.g. the two sides of an `Apply` whose `arg` is an
/// `AtomSeq`) without first wrapping them back into `Atom::AtomSeq`.
pub fn match_sequence(
    patterns: &crate::atom::AtomSeq,
    subjects: &crate::atom::AtomSeq,
    binds: &Bindings,
    op: Option<&Operator>,
    ctx: MatchContext<'static>,
) -> Outcome {
    props::match_props(&patterns.props, &subjects.props, binds, ctx).flat_map_bindings({
        let p_atoms = patterns.atoms().to_vec();
        let s_atoms = subjects.atoms().to_vec();
        let s_props = subjects.props.clone();
        let op = op.cloned();
        move |b| dispatch(&p_atoms, &s_atoms, &s_props, op.as_ref(), &b, ctx)
    })
}
