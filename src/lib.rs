//! acmatch - associative/commutative/idempotent term matching core
//!
//! Given a pattern atom and a subject atom drawn from the same algebra,
//! [`match_engine::match_atom`] decides whether the subject can be
//! produced from the pattern by consistently assigning atoms to the
//! pattern's variables, honouring three algebraic properties an
//! operator's argument list may declare: associativity, commutativity,
//! and idempotency.
//!
//! # Example
//!
//! ```rust
//! use acmatch::atom::{Atom, AlgProp, RootType};
//! use acmatch::bindings::Bindings;
//! use acmatch::context::{EmptyOperatorLibrary, IdentityRewriter, MatchContext};
//! use acmatch::match_engine::match_atom;
//!
//! // f[C]($x, 2) vs f[C](2, 5) -> {x -> 5}
//! let props = AlgProp::comm();
//! let pattern = Atom::apply(
//!     Atom::op_ref("f"),
//!     Atom::seq(props.clone(), vec![Atom::var(RootType::Any, "x"), Atom::int(2)]),
//! );
//! let subject = Atom::apply(
//!     Atom::op_ref("f"),
//!     Atom::seq(props, vec![Atom::int(2), Atom::int(5)]),
//! );
//!
//! static OPS: EmptyOperatorLibrary = EmptyOperatorLibrary;
//! static REWRITER: IdentityRewriter = IdentityRewriter;
//! let ctx = MatchContext::new(&OPS, &REWRITER);
//! let results: Vec<_> = match_atom(&pattern, &subject, &Bindings::new(), ctx)
//!     .into_iter_boxed()
//!     .collect();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].lookup("x"), Some(&Atom::int(5)));
//! ```
//!
//! Everything around this — surface syntax parsing, rewrite-rule
//! application, ruleset storage, visualisation — is an external
//! collaborator; this crate covers exactly the matching engine, its
//! term data model, and the bindings machinery it consumes.

pub mod atom;
pub mod bindings;
pub mod context;
pub mod error;
pub mod match_engine;
pub mod outcome;

pub use atom::{AName, Atom, AlgProp, RootType};
pub use bindings::Bindings;
pub use context::MatchContext;
pub use error::{Fail, FailReason};
pub use match_engine::{match_atom, match_sequence};
pub use outcome::Outcome;
