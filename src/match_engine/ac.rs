//! AC matcher (§4.7): the full associative-commutative search. Neither
//! order nor grouping is significant; `|patterns| <= |subjects|`.

use itertools::Itertools;
use tracing::trace;

use crate::atom::{AlgProp, Atom};
use crate::bindings::Bindings;
use crate::context::{MatchContext, Operator};
use crate::error::{Fail, FailReason};
use crate::outcome::{BindingsIter, Outcome};

use super::{associative, commutative, helpers};

pub fn match_ac(
    patterns: &[Atom],
    subjects: &[Atom],
    props: &AlgProp,
    op: Option<&Operator>,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Outcome {
    // 1. Timeout check (§5).
    if ctx.is_expired() {
        trace!(target: "acmatch::ac", patterns = patterns.len(), subjects = subjects.len(), "deadline exceeded");
        return Outcome::fail(Fail::timed_out());
    }

    // 2. Mandatory-bindings pre-pass (§4.8).
    let base = match helpers::mandatory_bindings(patterns, subjects, binds, ctx) {
        None => return Outcome::fail(Fail::new(FailReason::NoPossibleMatch)),
        Some(b) => b,
    };

    // 3. Size shortcuts.
    if patterns.len() > subjects.len() {
        return Outcome::fail(Fail::new(FailReason::LengthMismatch {
            patterns: patterns.len(),
            subjects: subjects.len(),
        }));
    }
    if patterns.is_empty() && subjects.is_empty() {
        return Outcome::one(base);
    }
    if patterns.is_empty() || subjects.is_empty() {
        return Outcome::fail(Fail::new(FailReason::LengthMismatch {
            patterns: patterns.len(),
            subjects: subjects.len(),
        }));
    }
    if patterns.len() == subjects.len() {
        return commutative::match_commutative(patterns, subjects, &base, ctx);
    }
    if patterns.len() == 1 {
        let whole = helpers::wrap_whole(subjects, props, op);
        return crate::match_engine::match_atom(&patterns[0], &whole, &base, ctx);
    }

    // 4. Constant elimination (§4.8).
    let (p_res, s_res) = match helpers::eliminate_constants(patterns, subjects) {
        Some(t) => t,
        None => return Outcome::fail(Fail::new(FailReason::StructuralMismatch)),
    };

    // 5. Unbindable matching (§4.8) over the residuals.
    let aggressive = ctx.settings.rewrite_aggressive_fail;
    let props_no_comm = props.without_commutative();
    let op_owned = op.cloned();
    let unbound = helpers::match_unbindables(p_res, s_res, base, ctx);

    // 6. Per partial result: direct extraction if every residual pattern
    // is already bound, otherwise the AC sub-iterator over permutations
    // feeding the Associative matcher.
    Outcome::many(unbound.flat_map(move |(b, residual_vars, residual_subjects)| {
        if aggressive && residual_vars.len() == 1 {
            trace!(target: "acmatch::ac", "rewrite_aggressive_fail: matching sole residual pattern directly");
            return match_one_residual_directly(
                &residual_vars[0],
                &residual_subjects,
                &props_no_comm,
                op_owned.as_ref(),
                &b,
                ctx,
            );
        }

        if all_already_bound(&residual_vars, &b) {
            return match extract_bound_values(&residual_vars, &residual_subjects, &b) {
                Some(matched) => Box::new(std::iter::once(matched)) as BindingsIter,
                None => Box::new(std::iter::empty()) as BindingsIter,
            };
        }

        let n = residual_subjects.len();
        let rp = residual_vars.clone();
        let rs = residual_subjects.clone();
        let props2 = props_no_comm.clone();
        let op2 = op_owned.clone();
        Box::new((0..n).permutations(n).flat_map(move |idxs| {
            let permuted: Vec<Atom> = idxs.into_iter().map(|i| rs[i].clone()).collect();
            associative::match_associative(&rp, &permuted, &props2, op2.as_ref(), &b, ctx)
                .into_iter_boxed()
        })) as BindingsIter
    }))
}

fn all_already_bound(residual_vars: &[Atom], binds: &Bindings) -> bool {
    residual_vars.iter().all(|v| match v {
        Atom::Variable(vv) => binds.lookup(&vv.name).is_some(),
        _ => false,
    })
}

/// Every residual pattern variable is already bound: verify each bound
/// value is still present (once) among the residual subjects.
fn extract_bound_values(
    residual_vars: &[Atom],
    residual_subjects: &[Atom],
    binds: &Bindings,
) -> Option<Bindings> {
    let mut pool = residual_subjects.to_vec();
    for v in residual_vars {
        let name = match v {
            Atom::Variable(vv) => &vv.name,
            _ => return None,
        };
        let value = binds.lookup(name)?.clone();
        let pos = pool.iter().position(|s| *s == value)?;
        pool.remove(pos);
    }
    if !pool.is_empty() {
        return None;
    }
    Some(binds.clone())
}

fn match_one_residual_directly(
    pattern: &Atom,
    residual_subjects: &[Atom],
    props: &AlgProp,
    op: Option<&Operator>,
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> BindingsIter {
    let whole = helpers::wrap_whole(residual_subjects, props, op);
    crate::match_engine::match_atom(pattern, &whole, binds, ctx).into_iter_boxed()
}
