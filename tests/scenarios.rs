//! End-to-end scenarios for the matching core, exercised purely through
//! the public `match_atom` entry point against `f[props](...)`-style
//! operator applications.

use std::time::{Duration, Instant};

use acmatch::atom::{AlgProp, Atom, RootType};
use acmatch::bindings::Bindings;
use acmatch::context::{EmptyOperatorLibrary, IdentityRewriter, MatchContext};
use acmatch::match_engine::match_atom;

fn ctx() -> MatchContext<'static> {
    static OPS: EmptyOperatorLibrary = EmptyOperatorLibrary;
    static REWRITER: IdentityRewriter = IdentityRewriter;
    MatchContext::new(&OPS, &REWRITER)
}

fn apply(op: &str, props: AlgProp, args: Vec<Atom>) -> Atom {
    Atom::apply(Atom::op_ref(op), Atom::seq(props, args))
}

#[test]
fn simple_commutative() {
    let pattern = apply("f", AlgProp::comm(), vec![Atom::var(RootType::Any, "x"), Atom::int(2)]);
    let subject = apply("f", AlgProp::comm(), vec![Atom::int(2), Atom::int(5)]);

    let results: Vec<_> = match_atom(&pattern, &subject, &Bindings::new(), ctx())
        .into_iter_boxed()
        .collect();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lookup("x"), Some(&Atom::int(5)));
}

#[test]
fn constant_elimination_with_ac() {
    let pattern = apply(
        "f",
        AlgProp::assoc_comm(),
        vec![Atom::int(1), Atom::int(2), Atom::var(RootType::Any, "x")],
    );
    let subject = apply("f", AlgProp::assoc_comm(), vec![Atom::int(3), Atom::int(2), Atom::int(1)]);

    let results: Vec<_> = match_atom(&pattern, &subject, &Bindings::new(), ctx())
        .into_iter_boxed()
        .collect();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].lookup("x"), Some(&Atom::int(3)));
}

#[test]
fn grouping_under_associative() {
    let pattern = apply(
        "g",
        AlgProp::assoc(),
        vec![Atom::var(RootType::Any, "a"), Atom::var(RootType::Any, "b")],
    );
    let subject = apply("g", AlgProp::assoc(), vec![Atom::int(1), Atom::int(2), Atom::int(3)]);

    let results: Vec<_> = match_atom(&pattern, &subject, &Bindings::new(), ctx())
        .into_iter_boxed()
        .collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].lookup("a"), Some(&Atom::int(1)));
    assert_eq!(
        results[0].lookup("b"),
        Some(&apply("g", AlgProp::assoc(), vec![Atom::int(2), Atom::int(3)]))
    );
    assert_eq!(
        results[1].lookup("a"),
        Some(&apply("g", AlgProp::assoc(), vec![Atom::int(1), Atom::int(2)]))
    );
    assert_eq!(results[1].lookup("b"), Some(&Atom::int(3)));
}

#[test]
fn repeated_variable_ac() {
    let pattern = apply(
        "f",
        AlgProp::assoc_comm(),
        vec![
            Atom::var(RootType::Any, "x"),
            Atom::var(RootType::Any, "x"),
            Atom::var(RootType::Any, "y"),
        ],
    );
    let subject = apply("f", AlgProp::assoc_comm(), vec![Atom::int(1), Atom::int(1), Atom::int(2)]);

    let results: Vec<_> = match_atom(&pattern, &subject, &Bindings::new(), ctx())
        .into_iter_boxed()
        .collect();

    assert!(results
        .iter()
        .any(|b| b.lookup("x") == Some(&Atom::int(1)) && b.lookup("y") == Some(&Atom::int(2))));
    assert!(!results.iter().any(|b| b.lookup("x") == Some(&Atom::int(2))));
}

#[test]
fn idempotent_absorption() {
    let props = AlgProp::none().with_idempotent();
    let pattern = Atom::seq(props.clone(), vec![Atom::int(1), Atom::int(2)]);
    let subject = Atom::seq(props, vec![Atom::int(1), Atom::int(1), Atom::int(2)]);

    let results: Vec<_> = match_atom(&pattern, &subject, &Bindings::new(), ctx())
        .into_iter_boxed()
        .collect();

    assert_eq!(results.len(), 1);
    assert!(results[0].is_empty());
}

#[test]
fn timeout_on_a_nontrivial_ac_match() {
    static OPS: EmptyOperatorLibrary = EmptyOperatorLibrary;
    static REWRITER: IdentityRewriter = IdentityRewriter;
    let expired = MatchContext::new(&OPS, &REWRITER).with_deadline(Instant::now() - Duration::from_secs(1));

    let pattern = apply(
        "f",
        AlgProp::assoc_comm(),
        vec![Atom::var(RootType::Any, "x"), Atom::var(RootType::Any, "y"), Atom::var(RootType::Any, "z")],
    );
    let subject = apply(
        "f",
        AlgProp::assoc_comm(),
        vec![Atom::int(1), Atom::int(2), Atom::int(3), Atom::int(4)],
    );

    let outcome = match_atom(&pattern, &subject, &Bindings::new(), expired);
    assert!(outcome.is_fail());
}
