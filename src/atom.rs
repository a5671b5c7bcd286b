//! The atom model: an immutable, value-equal tree of typed terms.
//!
//! Every variant is structurally equal by value; atoms are never mutated
//! after construction (see `SPEC_FULL.md` §3). `AtomSeq` is the only
//! variant whose constructor does nontrivial work: it enforces the
//! five canonicalisation invariants (flattening, identity/absorber
//! reduction, idempotent dedup, commutative ordering) documented on
//! its `new`/`with_mode` constructors.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::bindings::Bindings;

/// Interned-friendly name type. Cloning is an `Arc` bump, not a string copy.
pub type AName = Arc<str>;

pub fn name(s: impl AsRef<str>) -> AName {
    Arc::from(s.as_ref())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Integer(BigInt),
    /// `(significand, exponent, radix)` — exact, no `f64` in the equality path.
    Float {
        significand: BigInt,
        exponent: i64,
        radix: u32,
    },
    BitString(Vec<u8>),
    Str(String),
    Symbol(AName),
    Boolean(bool),
}

impl LiteralValue {
    pub fn true_() -> Self {
        LiteralValue::Boolean(true)
    }

    pub fn false_() -> Self {
        LiteralValue::Boolean(false)
    }

    fn rank(&self) -> u8 {
        match self {
            LiteralValue::Integer(_) => 0,
            LiteralValue::Float { .. } => 1,
            LiteralValue::BitString(_) => 2,
            LiteralValue::Str(_) => 3,
            LiteralValue::Symbol(_) => 4,
            LiteralValue::Boolean(_) => 5,
        }
    }
}

/// The small closed set of root type symbols (§3). `UserType` covers `^TYPE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootType {
    Any,
    Boolean,
    Integer,
    Str,
    Symbol,
    Float,
    BitString,
    OpRef,
    RsRef,
    UserType(AName),
}

impl RootType {
    fn rank(&self) -> u8 {
        match self {
            RootType::Any => 0,
            RootType::Boolean => 1,
            RootType::Integer => 2,
            RootType::Str => 3,
            RootType::Symbol => 4,
            RootType::Float => 5,
            RootType::BitString => 6,
            RootType::OpRef => 7,
            RootType::RsRef => 8,
            RootType::UserType(_) => 9,
        }
    }
}

/// `Variable(type, name, guard, tags, byName)`. `guard` rewrites to a
/// boolean literal through the `Rewriter` collaborator (§6); `MetaVariable`
/// is modelled as the same struct with `is_meta = true` since matching
/// treats the two flavours identically (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub var_type: RootType,
    pub name: AName,
    pub guard: Option<Arc<Atom>>,
    pub tags: Vec<AName>,
    pub by_name: bool,
    pub is_meta: bool,
}

impl Variable {
    pub fn new(var_type: RootType, name: impl AsRef<str>) -> Self {
        Variable {
            var_type,
            name: self::name(name),
            guard: None,
            tags: Vec::new(),
            by_name: false,
            is_meta: false,
        }
    }

    pub fn with_guard(mut self, guard: Atom) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }
}

/// Five independent optional algebraic properties on an `AtomSeq`.
///
/// Each is `None` (unspecified), `Some(Literal(Boolean(_)))` (a concrete
/// truth value), or `Some(other)` (a variable/expression, matched
/// structurally per §4.9 rather than evaluated by this crate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AlgProp {
    pub associative: Option<Arc<Atom>>,
    pub commutative: Option<Arc<Atom>>,
    pub idempotent: Option<Arc<Atom>>,
    pub absorber: Option<Arc<Atom>>,
    pub identity: Option<Arc<Atom>>,
}

impl AlgProp {
    pub fn none() -> Self {
        Self::default()
    }

    /// `A` with everything else unspecified.
    pub fn assoc() -> Self {
        AlgProp {
            associative: Some(Arc::new(Atom::bool_lit(true))),
            ..Default::default()
        }
    }

    /// `C` with everything else unspecified.
    pub fn comm() -> Self {
        AlgProp {
            commutative: Some(Arc::new(Atom::bool_lit(true))),
            ..Default::default()
        }
    }

    /// `AC` with everything else unspecified.
    pub fn assoc_comm() -> Self {
        AlgProp {
            associative: Some(Arc::new(Atom::bool_lit(true))),
            commutative: Some(Arc::new(Atom::bool_lit(true))),
            ..Default::default()
        }
    }

    pub fn with_idempotent(mut self) -> Self {
        self.idempotent = Some(Arc::new(Atom::bool_lit(true)));
        self
    }

    pub fn with_identity(mut self, identity: Atom) -> Self {
        self.identity = Some(Arc::new(identity));
        self
    }

    pub fn with_absorber(mut self, absorber: Atom) -> Self {
        self.absorber = Some(Arc::new(absorber));
        self
    }

    fn flag(slot: &Option<Arc<Atom>>) -> bool {
        matches!(
            slot.as_deref(),
            Some(Atom::Literal(LiteralValue::Boolean(true)))
        )
    }

    pub fn is_associative(&self) -> bool {
        Self::flag(&self.associative)
    }

    pub fn is_commutative(&self) -> bool {
        Self::flag(&self.commutative)
    }

    pub fn is_idempotent(&self) -> bool {
        Self::flag(&self.idempotent)
    }

    /// `AlgProp` with commutativity cleared but everything else kept, used
    /// when the AC matcher hands a fixed permutation down to the A matcher
    /// (Open Question in §9: this must not trigger invariant 5 re-sorting).
    pub fn without_commutative(&self) -> Self {
        AlgProp {
            commutative: None,
            ..self.clone()
        }
    }
}

/// Controls whether `AtomSeq::with_mode` re-sorts a commutative sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Apply all five canonicalisation invariants, including re-sorting a
    /// commutative sequence into the stable total order.
    Canonicalize,
    /// Skip invariant 5's re-sort. Used exclusively by the AC matcher when
    /// handing a specific subject permutation to the A matcher: re-sorting
    /// here would silently collapse the very permutation being tried.
    AsGiven,
}

/// `AtomSeq(props, atoms)` — the central container; see module docs for
/// the canonicalisation invariants enforced by its constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AtomSeq {
    pub props: AlgProp,
    atoms: Vec<Atom>,
}

impl AtomSeq {
    pub fn new(props: AlgProp, atoms: Vec<Atom>) -> Self {
        Self::with_mode(props, atoms, BuildMode::Canonicalize)
    }

    pub fn with_mode(props: AlgProp, atoms: Vec<Atom>, mode: BuildMode) -> Self {
        let mut atoms = atoms;

        // Invariant 1: flatten nested AtomSeq elements with exactly-equal props.
        if props.is_associative() {
            atoms = flatten_associative(atoms, &props);
        }

        // Invariant 3: absorber dominates.
        if let Some(absorber) = props.absorber.as_deref() {
            if atoms.iter().any(|a| a == absorber) {
                return AtomSeq {
                    atoms: vec![absorber.clone()],
                    props,
                };
            }
        }

        // Invariant 2: drop identity elements, unless that would empty the sequence.
        if let Some(identity) = props.identity.as_deref() {
            let filtered: Vec<Atom> = atoms.iter().filter(|a| *a != identity).cloned().collect();
            atoms = if filtered.is_empty() {
                vec![identity.clone()]
            } else {
                filtered
            };
        }

        // Invariant 4: idempotent dedup, preserving first occurrence.
        if props.is_idempotent() {
            let mut seen: Vec<Atom> = Vec::with_capacity(atoms.len());
            for a in atoms {
                if !seen.contains(&a) {
                    seen.push(a);
                }
            }
            atoms = seen;
        }

        // Invariant 5: commutative sequences carry a fixed total order.
        if props.is_commutative() && mode == BuildMode::Canonicalize {
            atoms.sort_by(atom_cmp);
        }

        AtomSeq { props, atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn into_atoms(self) -> Vec<Atom> {
        self.atoms
    }
}

fn flatten_associative(atoms: Vec<Atom>, props: &AlgProp) -> Vec<Atom> {
    let mut out = Vec::with_capacity(atoms.len());
    for a in atoms {
        match a {
            Atom::AtomSeq(inner) if &inner.props == props => {
                out.extend(inner.atoms);
            }
            other => out.push(other),
        }
    }
    out
}

/// Closed sum of immutable, value-equal term variants (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    Literal(LiteralValue),
    Variable(Variable),
    NamedRootType(RootType),
    OperatorRef(AName),
    /// `Apply(head, arg)`; operator applications store `arg` as an `AtomSeq`.
    Apply(Arc<Atom>, Arc<Atom>),
    AtomSeq(AtomSeq),
    Lambda(Variable, Arc<Atom>),
    MapPair(Arc<Atom>, Arc<Atom>),
    SpecialForm(AName, Arc<Atom>),
    BindingsAtom(Box<Bindings>),
}

impl Atom {
    pub fn bool_lit(b: bool) -> Self {
        Atom::Literal(LiteralValue::Boolean(b))
    }

    pub fn int(i: i64) -> Self {
        Atom::Literal(LiteralValue::Integer(BigInt::from(i)))
    }

    pub fn symbol(s: impl AsRef<str>) -> Self {
        Atom::Literal(LiteralValue::Symbol(name(s)))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Atom::Literal(LiteralValue::Str(s.into()))
    }

    pub fn var(var_type: RootType, name: impl AsRef<str>) -> Self {
        Atom::Variable(Variable::new(var_type, name))
    }

    pub fn op_ref(name_: impl AsRef<str>) -> Self {
        Atom::OperatorRef(name(name_))
    }

    pub fn seq(props: AlgProp, atoms: Vec<Atom>) -> Self {
        Atom::AtomSeq(AtomSeq::new(props, atoms))
    }

    pub fn apply(head: Atom, arg: Atom) -> Self {
        Atom::Apply(Arc::new(head), Arc::new(arg))
    }

    /// Invariant 7: `isConstant(a)` ⇔ `a` has no variables.
    pub fn is_constant(&self) -> bool {
        !self.has_variable()
    }

    /// Invariant 7: `isBindable(a)` ⇔ `a` is a variable.
    pub fn is_bindable(&self) -> bool {
        matches!(self, Atom::Variable(_))
    }

    fn has_variable(&self) -> bool {
        match self {
            Atom::Variable(_) => true,
            Atom::Literal(_) | Atom::NamedRootType(_) | Atom::OperatorRef(_) => false,
            Atom::Apply(h, a) => h.has_variable() || a.has_variable(),
            Atom::AtomSeq(seq) => seq.atoms.iter().any(Atom::has_variable),
            Atom::Lambda(_, body) => body.has_variable(),
            Atom::MapPair(l, r) => l.has_variable() || r.has_variable(),
            Atom::SpecialForm(_, content) => content.has_variable(),
            Atom::BindingsAtom(_) => false,
        }
    }

    /// Invariant 6: `depth = 1 + max child depth`; constants carry `depth = 0`.
    pub fn depth(&self) -> u32 {
        match self {
            Atom::Literal(_) | Atom::NamedRootType(_) | Atom::OperatorRef(_) => 0,
            Atom::Variable(_) => 0,
            Atom::Apply(h, a) => 1 + h.depth().max(a.depth()),
            Atom::AtomSeq(seq) => 1 + seq.atoms.iter().map(Atom::depth).max().unwrap_or(0),
            Atom::Lambda(_, body) => 1 + body.depth(),
            Atom::MapPair(l, r) => 1 + l.depth().max(r.depth()),
            Atom::SpecialForm(_, content) => 1 + content.depth(),
            Atom::BindingsAtom(_) => 0,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Atom::Literal(_) => 0,
            Atom::Variable(_) => 1,
            Atom::NamedRootType(_) => 2,
            Atom::OperatorRef(_) => 3,
            Atom::Apply(..) => 4,
            Atom::AtomSeq(_) => 5,
            Atom::Lambda(..) => 6,
            Atom::MapPair(..) => 7,
            Atom::SpecialForm(..) => 8,
            Atom::BindingsAtom(_) => 9,
        }
    }
}

/// Stable total order over atoms (§3 invariant 5, §6 "Comparator for
/// atoms"). Opaque beyond totality and stability: it is a deterministic
/// function of structure only, never of allocation address or insertion
/// order.
pub fn atom_cmp(a: &Atom, b: &Atom) -> Ordering {
    match (a, b) {
        (Atom::Literal(x), Atom::Literal(y)) => literal_cmp(x, y),
        (Atom::Variable(x), Atom::Variable(y)) => x.name.cmp(&y.name),
        (Atom::NamedRootType(x), Atom::NamedRootType(y)) => root_type_cmp(x, y),
        (Atom::OperatorRef(x), Atom::OperatorRef(y)) => x.cmp(y),
        (Atom::Apply(xh, xa), Atom::Apply(yh, ya)) => {
            atom_cmp(xh, yh).then_with(|| atom_cmp(xa, ya))
        }
        (Atom::AtomSeq(x), Atom::AtomSeq(y)) => atomseq_cmp(x, y),
        (Atom::Lambda(xv, xb), Atom::Lambda(yv, yb)) => {
            xv.name.cmp(&yv.name).then_with(|| atom_cmp(xb, yb))
        }
        (Atom::MapPair(xl, xr), Atom::MapPair(yl, yr)) => {
            atom_cmp(xl, yl).then_with(|| atom_cmp(xr, yr))
        }
        (Atom::SpecialForm(xt, xc), Atom::SpecialForm(yt, yc)) => {
            xt.cmp(yt).then_with(|| atom_cmp(xc, yc))
        }
        (Atom::BindingsAtom(x), Atom::BindingsAtom(y)) => bindings_cmp(x, y),
        _ => a.rank().cmp(&b.rank()),
    }
}

fn literal_cmp(a: &LiteralValue, b: &LiteralValue) -> Ordering {
    match (a, b) {
        (LiteralValue::Integer(x), LiteralValue::Integer(y)) => x.cmp(y),
        (
            LiteralValue::Float {
                significand: xs,
                exponent: xe,
                radix: xr,
            },
            LiteralValue::Float {
                significand: ys,
                exponent: ye,
                radix: yr,
            },
        ) => xs.cmp(ys).then(xe.cmp(ye)).then(xr.cmp(yr)),
        (LiteralValue::BitString(x), LiteralValue::BitString(y)) => x.cmp(y),
        (LiteralValue::Str(x), LiteralValue::Str(y)) => x.cmp(y),
        (LiteralValue::Symbol(x), LiteralValue::Symbol(y)) => x.cmp(y),
        (LiteralValue::Boolean(x), LiteralValue::Boolean(y)) => x.cmp(y),
        _ => a.rank().cmp(&b.rank()),
    }
}

fn root_type_cmp(a: &RootType, b: &RootType) -> Ordering {
    match (a, b) {
        (RootType::UserType(x), RootType::UserType(y)) => x.cmp(y),
        _ => a.rank().cmp(&b.rank()),
    }
}

fn atomseq_cmp(a: &AtomSeq, b: &AtomSeq) -> Ordering {
    a.atoms
        .len()
        .cmp(&b.atoms.len())
        .then_with(|| {
            a.atoms
                .iter()
                .zip(b.atoms.iter())
                .map(|(x, y)| atom_cmp(x, y))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        })
}

fn bindings_cmp(a: &Bindings, b: &Bindings) -> Ordering {
    let mut ax: Vec<_> = a.iter().collect();
    let mut bx: Vec<_> = b.iter().collect();
    ax.sort_by(|x, y| x.0.cmp(y.0));
    bx.sort_by(|x, y| x.0.cmp(y.0));
    ax.len().cmp(&bx.len()).then_with(|| {
        ax.iter()
            .zip(bx.iter())
            .map(|((xn, xv), (yn, yv))| xn.cmp(yn).then_with(|| atom_cmp(xv, yv)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    })
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(atom_cmp(self, other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        atom_cmp(self, other)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Literal(LiteralValue::Symbol(s)) => write!(f, "{s}"),
            Atom::Literal(LiteralValue::Str(s)) => write!(f, "{s:?}"),
            Atom::Literal(LiteralValue::Integer(i)) => write!(f, "{i}"),
            Atom::Literal(LiteralValue::Boolean(b)) => write!(f, "{b}"),
            Atom::Literal(LiteralValue::Float {
                significand,
                exponent,
                radix,
            }) => write!(f, "{significand}e{exponent}r{radix}"),
            Atom::Literal(LiteralValue::BitString(bits)) => write!(f, "#{}", bits.len()),
            Atom::Variable(v) => write!(f, "{}", v.name),
            Atom::NamedRootType(t) => write!(f, "{t:?}"),
            Atom::OperatorRef(n) => write!(f, "{n}"),
            Atom::Apply(h, a) => write!(f, "({h} {a})"),
            Atom::AtomSeq(seq) => {
                write!(f, "[")?;
                for (i, a) in seq.atoms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, "]")
            }
            Atom::Lambda(v, body) => write!(f, "(\\{} {body})", v.name),
            Atom::MapPair(l, r) => write!(f, "({l} -> {r})"),
            Atom::SpecialForm(tag, content) => write!(f, "<{tag} {content}>"),
            Atom::BindingsAtom(_) => write!(f, "<bindings>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_associative_sequence_splices_inner() {
        let props = AlgProp::assoc();
        let inner = Atom::seq(props.clone(), vec![Atom::int(2), Atom::int(3)]);
        let outer = Atom::seq(props, vec![Atom::int(1), inner]);
        match outer {
            Atom::AtomSeq(seq) => {
                assert_eq!(seq.atoms(), &[Atom::int(1), Atom::int(2), Atom::int(3)]);
            }
            _ => panic!("expected AtomSeq"),
        }
    }

    #[test]
    fn identity_is_dropped_unless_it_would_empty_the_sequence() {
        let props = AlgProp::assoc().with_identity(Atom::int(0));
        let seq = Atom::seq(props.clone(), vec![Atom::int(0), Atom::int(5)]);
        assert_eq!(seq, Atom::seq(props.clone(), vec![Atom::int(5)]));

        let only_identity = Atom::seq(props.clone(), vec![Atom::int(0)]);
        assert_eq!(only_identity, Atom::seq(props, vec![Atom::int(0)]));
    }

    #[test]
    fn absorber_dominates() {
        let props = AlgProp::assoc().with_absorber(Atom::int(0));
        let seq = Atom::seq(props, vec![Atom::int(5), Atom::int(0), Atom::int(9)]);
        assert_eq!(seq, Atom::Literal(LiteralValue::Integer(BigInt::from(0))));
    }

    #[test]
    fn idempotent_keeps_first_occurrence() {
        let props = AlgProp::none().with_idempotent();
        let seq = Atom::seq(
            props,
            vec![Atom::int(1), Atom::int(1), Atom::int(2), Atom::int(1)],
        );
        match seq {
            Atom::AtomSeq(seq) => assert_eq!(seq.atoms(), &[Atom::int(1), Atom::int(2)]),
            _ => panic!("expected AtomSeq"),
        }
    }

    #[test]
    fn commutative_sequences_canonicalise_regardless_of_input_order() {
        let props = AlgProp::comm();
        let a = Atom::seq(props.clone(), vec![Atom::int(2), Atom::int(1)]);
        let b = Atom::seq(props, vec![Atom::int(1), Atom::int(2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn as_given_mode_preserves_order_for_a_commutative_sequence() {
        let props = AlgProp::comm();
        let ordered = AtomSeq::with_mode(
            props,
            vec![Atom::int(2), Atom::int(1)],
            BuildMode::AsGiven,
        );
        assert_eq!(ordered.atoms(), &[Atom::int(2), Atom::int(1)]);
    }

    #[test]
    fn canonicalisation_is_idempotent() {
        let props = AlgProp::assoc_comm().with_idempotent();
        let once = Atom::seq(props.clone(), vec![Atom::int(3), Atom::int(1), Atom::int(3)]);
        let twice = match &once {
            Atom::AtomSeq(seq) => Atom::seq(props, seq.atoms().to_vec()),
            _ => unreachable!(),
        };
        assert_eq!(once, twice);
    }
}
