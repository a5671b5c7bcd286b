//! Typed failure reasons carried by `Outcome::Fail` (§7).
//!
//! `Fail` values are informational only — proof that a branch has no
//! solution, never a diagnostic to recover from (§7). They are built from
//! `FailReason` rather than bare strings: a plain enum with `Display` and
//! `std::error::Error` impls, built by hand rather than with `thiserror`.

use std::fmt;

use crate::atom::Atom;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// Two atoms that cannot be reconciled by any binding.
    StructuralMismatch,
    /// `Bindings::add`/`merge` found a conflicting rebind.
    BindingConflict,
    /// Two sequences that must align positionally have different lengths.
    LengthMismatch { patterns: usize, subjects: usize },
    /// The mandatory-bindings pre-pass proved no match is possible.
    NoPossibleMatch,
    /// An iterator exhausted without ever yielding a solution.
    ExhaustedSearch,
    /// The context's deadline (§5) has passed.
    TimedOut,
    /// A grouping was requested outside `1 < P < S` (§4.10 precondition).
    InvalidGrouping { patterns: usize, subjects: usize },
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::StructuralMismatch => write!(f, "structural mismatch"),
            FailReason::BindingConflict => write!(f, "binding conflict"),
            FailReason::LengthMismatch { patterns, subjects } => write!(
                f,
                "length mismatch: {patterns} pattern(s) vs {subjects} subject(s)"
            ),
            FailReason::NoPossibleMatch => write!(f, "no possible match"),
            FailReason::ExhaustedSearch => write!(f, "search exhausted with no match"),
            FailReason::TimedOut => write!(f, "Timed out"),
            FailReason::InvalidGrouping { patterns, subjects } => write!(
                f,
                "invalid grouping request: {patterns} pattern(s) over {subjects} subject(s)"
            ),
        }
    }
}

impl std::error::Error for FailReason {}

/// The full diagnostic payload of a `Fail` outcome (§4.1, §7). Carries
/// snapshots, never ownership the caller could mistake for a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fail {
    pub reason: FailReason,
    pub pattern: Option<Atom>,
    pub subject: Option<Atom>,
    pub position: Option<usize>,
    pub inner: Option<Box<Fail>>,
}

impl Fail {
    pub fn new(reason: FailReason) -> Self {
        Fail {
            reason,
            pattern: None,
            subject: None,
            position: None,
            inner: None,
        }
    }

    pub fn at(mut self, pattern: &Atom, subject: &Atom) -> Self {
        self.pattern = Some(pattern.clone());
        self.subject = Some(subject.clone());
        self
    }

    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn wrapping(mut self, inner: Fail) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    pub fn timed_out() -> Self {
        Fail::new(FailReason::TimedOut)
    }
}

impl fmt::Display for Fail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(pos) = self.position {
            write!(f, " at position {pos}")?;
        }
        if let (Some(p), Some(s)) = (&self.pattern, &self.subject) {
            write!(f, " (pattern `{p}` vs subject `{s}`)")?;
        }
        Ok(())
    }
}

impl std::error::Error for Fail {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.as_deref().map(|f| f as &(dyn std::error::Error + 'static))
    }
}
