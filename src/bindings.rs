//! Name→atom bindings with consistency checking on conflicting rebind.
//!
//! Mirrors the host's `SmartBindings` hybrid (empty / single / small-vec)
//! generalised to atoms: leaf matches overwhelmingly bind zero or one
//! variable, so those cases are allocation-free, and the common small
//! arities stay on the stack via `SmallVec` before spilling to the heap.

use smallvec::SmallVec;
use std::fmt;

use crate::atom::{AName, Atom, LiteralValue, RootType};

const INLINE_CAP: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Bindings {
    #[default]
    Empty,
    Single(AName, Atom),
    Small(SmallVec<[(AName, Atom); INLINE_CAP]>),
}

impl Bindings {
    pub fn new() -> Self {
        Bindings::Empty
    }

    pub fn len(&self) -> usize {
        match self {
            Bindings::Empty => 0,
            Bindings::Single(..) => 1,
            Bindings::Small(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Bindings::Empty)
    }

    pub fn lookup(&self, name: &str) -> Option<&Atom> {
        match self {
            Bindings::Empty => None,
            Bindings::Single(n, a) => (n.as_ref() == name).then_some(a),
            Bindings::Small(v) => v.iter().find(|(n, _)| n.as_ref() == name).map(|(_, a)| a),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AName, &Atom)> {
        BindingsIter {
            bindings: self,
            index: 0,
        }
    }

    /// `add(binds, name, atom)` (§4.2): `None` iff `name` is already bound
    /// to a structurally different atom. A prior binding to the universal
    /// root type `ANY` is compatible with any value (§9 open question:
    /// follow the richer `(name: &str, Atom)` semantics).
    pub fn add(&self, name: &str, atom: Atom) -> Option<Bindings> {
        if let Some(existing) = self.lookup(name) {
            if is_any_placeholder(existing) || existing == &atom {
                return Some(self.clone());
            }
            return None;
        }
        let mut out = self.clone();
        out.insert_new(name, atom);
        Some(out)
    }

    fn insert_new(&mut self, name: &str, atom: Atom) {
        let name: AName = crate::atom::name(name);
        match self {
            Bindings::Empty => *self = Bindings::Single(name, atom),
            Bindings::Single(n, a) => {
                let mut v: SmallVec<[(AName, Atom); INLINE_CAP]> = SmallVec::new();
                v.push((n.clone(), a.clone()));
                v.push((name, atom));
                *self = Bindings::Small(v);
            }
            Bindings::Small(v) => v.push((name, atom)),
        }
    }

    /// `merge(b1, b2)` (§4.2): sequential `add` over every entry of `b2`.
    pub fn merge(&self, other: &Bindings) -> Option<Bindings> {
        let mut acc = self.clone();
        for (name, atom) in other.iter() {
            acc = acc.add(name, atom.clone())?;
        }
        Some(acc)
    }

    /// Two bindings are compatible iff every shared key maps to
    /// structurally-equal atoms.
    pub fn compatible_with(&self, other: &Bindings) -> bool {
        self.iter().all(|(name, atom)| {
            other
                .lookup(name)
                .map(|a| is_any_placeholder(atom) || is_any_placeholder(a) || a == atom)
                .unwrap_or(true)
        })
    }
}

fn is_any_placeholder(a: &Atom) -> bool {
    matches!(a, Atom::NamedRootType(RootType::Any))
}

struct BindingsIter<'a> {
    bindings: &'a Bindings,
    index: usize,
}

impl<'a> Iterator for BindingsIter<'a> {
    type Item = (&'a AName, &'a Atom);

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.bindings {
            Bindings::Empty => None,
            Bindings::Single(n, a) => (self.index == 0).then_some((n, a)),
            Bindings::Small(v) => v.get(self.index).map(|(n, a)| (n, a)),
        };
        if item.is_some() {
            self.index += 1;
        }
        item
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (n, a)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{n} -> {a}")?;
        }
        write!(f, "}}")
    }
}

/// Substitute every bound variable in `pattern` with its binding, leaving
/// unbound variables untouched. Used by the soundness property in §8
/// (`canon(p[b]) = canon(s)`), not by the matcher's hot path.
pub fn substitute(pattern: &Atom, binds: &Bindings) -> Atom {
    match pattern {
        Atom::Variable(v) => binds.lookup(&v.name).cloned().unwrap_or_else(|| pattern.clone()),
        Atom::Apply(h, a) => Atom::Apply(
            std::sync::Arc::new(substitute(h, binds)),
            std::sync::Arc::new(substitute(a, binds)),
        ),
        Atom::AtomSeq(seq) => Atom::seq(
            seq.props.clone(),
            seq.atoms().iter().map(|a| substitute(a, binds)).collect(),
        ),
        Atom::Lambda(v, body) => {
            Atom::Lambda(v.clone(), std::sync::Arc::new(substitute(body, binds)))
        }
        Atom::MapPair(l, r) => Atom::MapPair(
            std::sync::Arc::new(substitute(l, binds)),
            std::sync::Arc::new(substitute(r, binds)),
        ),
        Atom::SpecialForm(tag, content) => {
            Atom::SpecialForm(tag.clone(), std::sync::Arc::new(substitute(content, binds)))
        }
        Atom::Literal(_)
        | Atom::NamedRootType(_)
        | Atom::OperatorRef(_)
        | Atom::BindingsAtom(_) => pattern.clone(),
    }
}

pub fn is_true_literal(a: &Atom) -> bool {
    matches!(a, Atom::Literal(LiteralValue::Boolean(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    #[test]
    fn add_rejects_conflicting_rebind() {
        let b = Bindings::new().add("x", Atom::int(1)).unwrap();
        assert!(b.add("x", Atom::int(2)).is_none());
        assert_eq!(b.add("x", Atom::int(1)), Some(b.clone()));
    }

    #[test]
    fn any_placeholder_is_compatible_with_anything() {
        let b = Bindings::new()
            .add("x", Atom::NamedRootType(RootType::Any))
            .unwrap();
        assert!(b.add("x", Atom::int(42)).is_some());
    }

    #[test]
    fn merge_unions_compatible_bindings() {
        let a = Bindings::new().add("x", Atom::int(1)).unwrap();
        let b = Bindings::new().add("y", Atom::int(2)).unwrap();
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.lookup("x"), Some(&Atom::int(1)));
        assert_eq!(merged.lookup("y"), Some(&Atom::int(2)));
    }

    #[test]
    fn merge_fails_on_incompatible_entries() {
        let a = Bindings::new().add("x", Atom::int(1)).unwrap();
        let b = Bindings::new().add("x", Atom::int(2)).unwrap();
        assert!(a.merge(&b).is_none());
    }

    #[test]
    fn spills_to_small_vec_beyond_one_binding() {
        let mut b = Bindings::new();
        for i in 0..5 {
            b = b.add(&format!("v{i}"), Atom::int(i)).unwrap();
        }
        assert_eq!(b.len(), 5);
        assert!(matches!(b, Bindings::Small(_)));
    }
}
