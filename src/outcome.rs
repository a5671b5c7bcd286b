//! `Outcome`: the `Fail` / `Match` / `Many` sum every matcher returns (§4.1).
//!
//! `Many` wraps `Box<dyn Iterator<Item = Bindings>>` rather than a bespoke
//! `hasNext`/`next`/`findNext` protocol: Rust's standard `Iterator` trait
//! already gives single-pass, pull-based, exhaustible iteration, and
//! `Iterator::flat_map` gives the `~`/`~>` chaining combinators described
//! in §4.1 for free, as long as every `find_next`-shaped step loops
//! instead of recursing (enforced in `match_engine::ac`/`associative` by
//! building iterator chains, never recursive generator functions, per §5).

use crate::bindings::Bindings;
use crate::error::Fail;

pub type BindingsIter = Box<dyn Iterator<Item = Bindings>>;

pub enum Outcome {
    Fail(Fail),
    Match(Bindings),
    Many(BindingsIter),
}

impl Outcome {
    pub fn fail(f: Fail) -> Self {
        Outcome::Fail(f)
    }

    pub fn one(b: Bindings) -> Self {
        Outcome::Match(b)
    }

    pub fn many(iter: impl Iterator<Item = Bindings> + 'static) -> Self {
        Outcome::Many(Box::new(iter))
    }

    pub fn empty(f: Fail) -> Self {
        // An exhausted-before-first-yield `Many` collapses to `Fail` at the
        // boundary that observes it (§7 `ExhaustedSearch`); constructing it
        // directly here avoids a spurious `Many` wrapper around nothing.
        let _ = &f;
        Outcome::Fail(f)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    pub fn into_iter_boxed(self) -> BindingsIter {
        match self {
            Outcome::Fail(_) => Box::new(std::iter::empty()),
            Outcome::Match(b) => Box::new(std::iter::once(b)),
            Outcome::Many(it) => it,
        }
    }

    /// The `iter ~> g` combinator (§4.1): map every yielded bindings
    /// through `g`, flattening the resulting `Fail`/`Match`/`Many` values
    /// into a single outcome. A `Fail` on `self` short-circuits; `Match`
    /// calls `g` once; `Many` becomes `flat_map`.
    pub fn flat_map_bindings<F>(self, mut g: F) -> Outcome
    where
        F: FnMut(Bindings) -> Outcome + 'static,
    {
        match self {
            Outcome::Fail(f) => Outcome::Fail(f),
            Outcome::Match(b) => g(b),
            Outcome::Many(it) => Outcome::many(it.flat_map(move |b| g(b).into_iter_boxed())),
        }
    }

    /// Collapse a `Many` that never yielded into the given `Fail`; leaves
    /// `Fail`/`Match` untouched. Callers use this at the boundary where an
    /// exhausted-without-yielding iterator should surface as `Fail`
    /// (§7 `ExhaustedSearch`) rather than as an empty, and thus invisible,
    /// `Many`.
    pub fn or_fail_if_exhausted(self, reason: Fail) -> Outcome {
        match self {
            Outcome::Many(it) => {
                let mut peekable = it.peekable();
                if peekable.peek().is_none() {
                    Outcome::Fail(reason)
                } else {
                    Outcome::Many(Box::new(peekable))
                }
            }
            other => other,
        }
    }
}
