//! Read-only collaborator seams and the explicit match context (§6, §9).
//!
//! The distilled spec's source used process-wide singletons for settings
//! and the deadline; the redesign note in §9 calls for passing a context
//! explicitly instead. `MatchContext` borrows its two collaborators so the
//! host can supply real operator/ruleset libraries and a real rewriter
//! without this crate depending on either.

use std::time::Instant;

use crate::atom::{AlgProp, AName, Atom};
use crate::bindings::Bindings;

/// `Operator(name, type, params, ...)` (§3) as consumed by the matcher: it
/// reads only the declared argument-list properties, never the operator's
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: AName,
    pub params: AlgProp,
}

/// §6: "Operator library: `lookup(name) -> Operator`".
pub trait OperatorLibrary {
    fn lookup(&self, name: &str) -> Option<Operator>;
}

/// §6: "Rewriter for guards: given an atom and bindings, returns an atom".
pub trait Rewriter {
    fn rewrite(&self, atom: &Atom, binds: &Bindings) -> Atom;
}

/// An `OperatorLibrary` with no registered operators; useful for matching
/// problems that never reference an `OperatorRef`.
pub struct EmptyOperatorLibrary;

impl OperatorLibrary for EmptyOperatorLibrary {
    fn lookup(&self, _name: &str) -> Option<Operator> {
        None
    }
}

/// A `Rewriter` that never reduces a guard, i.e. treats every guard as
/// already being in normal form. Suitable for tests and for hosts whose
/// variables never carry guards.
pub struct IdentityRewriter;

impl Rewriter for IdentityRewriter {
    fn rewrite(&self, atom: &Atom, _binds: &Bindings) -> Atom {
        atom.clone()
    }
}

/// Read-only settings bag (§6: "a key-value bag returning booleans ... and
/// a monotonic deadline").
#[derive(Debug, Clone, Copy, Default)]
pub struct Settings {
    pub rewrite_aggressive_fail: bool,
}

/// The context threaded by reference through every matcher call (§9: no
/// process-wide singleton). Constructed once per top-level `match_atom`/
/// `match_sequence` call.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub settings: Settings,
    pub deadline: Option<Instant>,
    pub operators: &'a dyn OperatorLibrary,
    pub rewriter: &'a dyn Rewriter,
}

impl<'a> MatchContext<'a> {
    pub fn new(operators: &'a dyn OperatorLibrary, rewriter: &'a dyn Rewriter) -> Self {
        MatchContext {
            settings: Settings::default(),
            deadline: None,
            operators,
            rewriter,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// §5: checked "at the head of every outer matcher (`try_match`) and
    /// at the top of every `find_next`".
    pub fn is_expired(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

}

#[cfg(any(test, feature = "test-util"))]
pub fn test_context() -> MatchContext<'static> {
    MatchContext::new(&EMPTY_OPS, &IDENTITY_REWRITER)
}

#[cfg(any(test, feature = "test-util"))]
static EMPTY_OPS: EmptyOperatorLibrary = EmptyOperatorLibrary;
#[cfg(any(test, feature = "test-util"))]
static IDENTITY_REWRITER: IdentityRewriter = IdentityRewriter;

#[cfg(any(test, feature = "test-util"))]
pub fn context_with_deadline(deadline: Instant) -> MatchContext<'static> {
    test_context().with_deadline(deadline)
}

#[cfg(any(test, feature = "test-util"))]
pub fn context_with_aggressive_fail() -> MatchContext<'static> {
    test_context().with_settings(Settings {
        rewrite_aggressive_fail: true,
    })
}

/// A typed settings bag for building a throwaway context in tests and
/// benchmarks, in the host's style of a small explicit config struct
/// with defaults rather than scattered constants. This is not real
/// environment-variable parsing — the crate is a library, not a CLI —
/// `from_env` only reads the handful of `ACMATCH_*` variables a
/// developer might set locally while profiling.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub rewrite_aggressive_fail: bool,
    pub deadline_millis: Option<u64>,
}

#[cfg(any(test, feature = "test-util"))]
impl Config {
    pub fn from_env() -> Self {
        Config {
            rewrite_aggressive_fail: std::env::var("ACMATCH_AGGRESSIVE_FAIL")
                .map(|v| v == "1")
                .unwrap_or(false),
            deadline_millis: std::env::var("ACMATCH_DEADLINE_MILLIS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl MatchContext<'static> {
    pub fn from_env() -> Self {
        let config = Config::from_env();
        let mut ctx = test_context().with_settings(Settings {
            rewrite_aggressive_fail: config.rewrite_aggressive_fail,
        });
        if let Some(millis) = config.deadline_millis {
            ctx = ctx.with_deadline(Instant::now() + std::time::Duration::from_millis(millis));
        }
        ctx
    }
}
