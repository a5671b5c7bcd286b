//! Match helpers (§4.8): constant elimination, variable/constant stripping,
//! unbindable-atom matching, the mandatory-bindings pre-pass, and binding
//! peel/wrap.
//!
//! Per §9's redesign note, the unbindable matcher returns residual
//! pattern/subject lists as an explicit tuple rather than smuggling them
//! through extra fields on `Bindings`.

use std::collections::HashMap;

use crate::atom::Atom;
use crate::bindings::Bindings;
use crate::context::{MatchContext, Operator};

/// Pair up every constant pattern with a structurally-equal constant
/// subject and remove both. `None` iff some constant pattern has no
/// match left in `subjects` (§4.8 "Constant elimination").
///
/// A precomputed index from atom to candidate subject positions keeps
/// this linear rather than quadratic.
pub fn eliminate_constants(patterns: &[Atom], subjects: &[Atom]) -> Option<(Vec<Atom>, Vec<Atom>)> {
    let mut index: HashMap<&Atom, Vec<usize>> = HashMap::new();
    for (i, s) in subjects.iter().enumerate() {
        index.entry(s).or_default().push(i);
    }

    let mut consumed = vec![false; subjects.len()];
    let mut residual_patterns = Vec::with_capacity(patterns.len());

    for p in patterns {
        if p.is_constant() {
            let slot = index
                .get(p)
                .and_then(|idxs| idxs.iter().copied().find(|&i| !consumed[i]));
            match slot {
                Some(i) => consumed[i] = true,
                None => return None,
            }
        } else {
            residual_patterns.push(p.clone());
        }
    }

    let residual_subjects = subjects
        .iter()
        .zip(consumed.iter())
        .filter(|(_, used)| !**used)
        .map(|(s, _)| s.clone())
        .collect();

    Some((residual_patterns, residual_subjects))
}

/// `(nonVariables, variables)` (§4.8 "Variable/constant stripping").
pub fn partition_variables(atoms: &[Atom]) -> (Vec<Atom>, Vec<Atom>) {
    let mut non_variables = Vec::new();
    let mut variables = Vec::new();
    for a in atoms {
        if a.is_bindable() {
            variables.push(a.clone());
        } else {
            non_variables.push(a.clone());
        }
    }
    (non_variables, variables)
}

/// Unbindable matching (§4.8): pair every non-variable, non-constant
/// pattern ("unbindable") with a subject it can match, backtracking over
/// subject choices left to right (§5 ordering guarantee iii), and yield
/// `(bindings, residual_variables, residual_subjects)` once every
/// unbindable has been paired.
///
/// `patterns`/`subjects` are assumed already passed through
/// `eliminate_constants`, so every remaining pattern is either a
/// variable or a genuine unbindable (an atom containing a variable
/// somewhere below a non-variable root, e.g. an `Apply`).
pub fn match_unbindables(
    patterns: Vec<Atom>,
    subjects: Vec<Atom>,
    binds: Bindings,
    ctx: MatchContext<'static>,
) -> Box<dyn Iterator<Item = (Bindings, Vec<Atom>, Vec<Atom>)>> {
    let (unbindables, variables) = partition_variables(&patterns);
    recurse_unbindables(unbindables, variables, subjects, binds, ctx)
}

fn recurse_unbindables(
    mut unbindables: Vec<Atom>,
    variables: Vec<Atom>,
    subjects: Vec<Atom>,
    binds: Bindings,
    ctx: MatchContext<'static>,
) -> Box<dyn Iterator<Item = (Bindings, Vec<Atom>, Vec<Atom>)>> {
    if unbindables.is_empty() {
        return Box::new(std::iter::once((binds, variables, subjects)));
    }
    let head = unbindables.remove(0);
    let rest = unbindables;

    let step = (0..subjects.len()).flat_map(move |i| {
        let mut remaining = subjects.clone();
        let candidate = remaining.remove(i);
        let head = head.clone();
        crate::match_engine::match_atom(&head, &candidate, &binds, ctx)
            .into_iter_boxed()
            .map(move |b| (b, remaining.clone()))
    });

    Box::new(step.flat_map(move |(b, remaining)| {
        recurse_unbindables(rest.clone(), variables.clone(), remaining, b, ctx)
    }))
}

/// Mandatory-bindings pre-pass (§4.8, §9): best-effort pruning. Returns
/// `None` iff a mandatory binding is provably impossible; otherwise the
/// bindings forced under every possible match, starting from `binds`.
///
/// This is deliberately incomplete (§9 "Mandatory-bindings algorithm
/// completeness"): it only forces bindings when (a) the pattern has an
/// `op(...)` apply matched by exactly one same-operator apply in the
/// residual subjects, recursing into their argument lists, or (b)
/// exactly one pattern variable and one subject atom remain after
/// constant elimination. Anything it misses is still caught by the
/// full matcher that runs afterward; this pass exists only to fail
/// fast and to seed a starting binding set.
pub fn mandatory_bindings(
    patterns: &[Atom],
    subjects: &[Atom],
    binds: &Bindings,
    ctx: MatchContext<'static>,
) -> Option<Bindings> {
    let (p_res, s_res) = eliminate_constants(patterns, subjects)?;
    let (non_vars, vars) = partition_variables(&p_res);

    let mut acc = binds.clone();

    for p in &non_vars {
        if let Atom::Apply(head, arg) = p {
            let op_name = match head.as_ref() {
                Atom::OperatorRef(n) => n,
                _ => continue,
            };
            let same_op: Vec<&Atom> = s_res
                .iter()
                .filter(|s| match s {
                    Atom::Apply(h2, _) => matches!(h2.as_ref(), Atom::OperatorRef(n2) if n2 == op_name),
                    _ => false,
                })
                .collect();
            if same_op.len() != 1 {
                continue;
            }
            if let Atom::Apply(_, s_arg) = same_op[0] {
                if let (Atom::AtomSeq(pa), Atom::AtomSeq(sa)) = (arg.as_ref(), s_arg.as_ref()) {
                    acc = mandatory_bindings(pa.atoms(), sa.atoms(), &acc, ctx)?;
                }
            }
        }
    }

    if vars.len() == 1 && s_res.len() == 1 {
        if let Atom::Variable(v) = &vars[0] {
            acc = acc.add(&v.name, s_res[0].clone())?;
        }
    }

    Some(acc)
}

/// `peelBindings(b, f)` (§4.8): rewrite every binding value of the form
/// `f(xs...)` to the bare `xs` atom-sequence, for passing a bindings
/// view from the top level down into `f`'s own argument universe.
pub fn peel_bindings(binds: &Bindings, op_name: &str) -> Bindings {
    let mut out = Bindings::new();
    for (name, atom) in binds.iter() {
        let peeled = match atom {
            Atom::Apply(h, arg) if matches!(h.as_ref(), Atom::OperatorRef(n) if n.as_ref() == op_name) => {
                (**arg).clone()
            }
            other => other.clone(),
        };
        out = out
            .add(name, peeled)
            .expect("bindings keys are distinct by construction");
    }
    out
}

/// `wrapBindings(b, f)` (§4.8): reverse of `peel_bindings`, re-wrapping
/// every `AtomSeq`-valued binding as `f(xs...)`.
pub fn wrap_bindings(binds: &Bindings, op_name: &str) -> Bindings {
    let mut out = Bindings::new();
    for (name, atom) in binds.iter() {
        let wrapped = match atom {
            Atom::AtomSeq(_) => Atom::apply(Atom::op_ref(op_name), atom.clone()),
            other => other.clone(),
        };
        out = out
            .add(name, wrapped)
            .expect("bindings keys are distinct by construction");
    }
    out
}

/// Wrap a whole residual subject list under the governing operator, as
/// used by the `|patterns| = 1` shortcuts in §4.6 step 3 and §4.7 step 3.
pub fn wrap_whole(atoms: &[Atom], props: &crate::atom::AlgProp, op: Option<&Operator>) -> Atom {
    super::grouping::wrap_group(atoms, props, &op.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{AlgProp, RootType};
    use crate::context::test_context;

    #[test]
    fn eliminate_constants_pairs_equal_atoms_and_leaves_residuals() {
        let patterns = vec![Atom::int(1), Atom::var(RootType::Any, "x")];
        let subjects = vec![Atom::int(2), Atom::int(1)];
        let (rp, rs) = eliminate_constants(&patterns, &subjects).unwrap();
        assert_eq!(rp, vec![Atom::var(RootType::Any, "x")]);
        assert_eq!(rs, vec![Atom::int(2)]);
    }

    #[test]
    fn eliminate_constants_fails_on_unmatched_constant() {
        let patterns = vec![Atom::int(99)];
        let subjects = vec![Atom::int(1), Atom::int(2)];
        assert!(eliminate_constants(&patterns, &subjects).is_none());
    }

    #[test]
    fn mandatory_bindings_forces_the_sole_remaining_pair() {
        let patterns = vec![Atom::int(1), Atom::var(RootType::Any, "x")];
        let subjects = vec![Atom::int(1), Atom::int(7)];
        let ctx = test_context();
        let forced = mandatory_bindings(&patterns, &subjects, &Bindings::new(), ctx).unwrap();
        assert_eq!(forced.lookup("x"), Some(&Atom::int(7)));
    }

    #[test]
    fn mandatory_bindings_recurses_into_sole_same_operator_apply() {
        let inner_pattern = Atom::seq(AlgProp::assoc(), vec![Atom::var(RootType::Any, "x")]);
        let pattern_apply = Atom::apply(Atom::op_ref("g"), inner_pattern);
        let inner_subject = Atom::seq(AlgProp::assoc(), vec![Atom::int(9)]);
        let subject_apply = Atom::apply(Atom::op_ref("g"), inner_subject);

        let patterns = vec![pattern_apply];
        let subjects = vec![subject_apply];
        let ctx = test_context();
        let forced = mandatory_bindings(&patterns, &subjects, &Bindings::new(), ctx).unwrap();
        assert_eq!(forced.lookup("x"), Some(&Atom::int(9)));
    }

    #[test]
    fn peel_and_wrap_bindings_round_trip() {
        let inner = Atom::seq(AlgProp::assoc(), vec![Atom::int(1), Atom::int(2)]);
        let wrapped_value = Atom::apply(Atom::op_ref("f"), inner.clone());
        let b = Bindings::new().add("x", wrapped_value.clone()).unwrap();

        let peeled = peel_bindings(&b, "f");
        assert_eq!(peeled.lookup("x"), Some(&inner));

        let rewrapped = wrap_bindings(&peeled, "f");
        assert_eq!(rewrapped.lookup("x"), Some(&wrapped_value));
    }
}
