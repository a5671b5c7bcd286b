//! Grouping iterator (§4.10): every way to split `S` ordered subjects into
//! exactly `P` non-empty contiguous groups.
//!
//! Modelled in the host's explicit index-counter style (see
//! `eval::cartesian::CartesianProductIter`): a fixed-size marker array
//! mutated in place by `advance`, an `exhausted` flag checked up front,
//! and a plain `Iterator` impl — no recursion, no generator.

use smallvec::SmallVec;

use crate::atom::{AlgProp, Atom, BuildMode};
use crate::context::Operator;

/// `P-1` monotonically increasing divider positions. `markers[i]` is the
/// index (within `subjects`) of the last element of group `i`, ranging
/// over `[i, S - P + i]` inclusive so that every later group still has
/// room for at least one element.
pub struct GroupingIter {
    subjects: Vec<Atom>,
    group_count: usize,
    markers: SmallVec<[usize; 8]>,
    exhausted: bool,
    props: AlgProp,
    op: Option<Operator>,
}

impl GroupingIter {
    /// Preconditions: `1 < group_count < subjects.len()` (§4.10). The
    /// equal- and singleton-pattern-count cases are handled by the
    /// associative matcher before it ever constructs this iterator.
    pub fn new(
        subjects: Vec<Atom>,
        group_count: usize,
        props: AlgProp,
        op: Option<Operator>,
    ) -> Option<Self> {
        let s = subjects.len();
        let p = group_count;
        if !(1 < p && p < s) {
            return None;
        }
        let markers: SmallVec<[usize; 8]> = (0..p - 1).collect();
        Some(GroupingIter {
            subjects,
            group_count,
            markers,
            exhausted: false,
            props,
            op,
        })
    }

    fn bound(&self, marker_index: usize) -> usize {
        self.subjects.len() - self.group_count + marker_index
    }

    fn advance(&mut self) {
        let k = self.markers.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.exhausted = true;
                return;
            }
            i -= 1;
            if self.markers[i] < self.bound(i) {
                self.markers[i] += 1;
                for j in (i + 1)..k {
                    self.markers[j] = self.markers[i] + (j - i);
                }
                return;
            }
        }
    }

    fn current_grouping(&self) -> Vec<Atom> {
        let mut groups = Vec::with_capacity(self.group_count);
        let mut start = 0usize;
        for &m in self.markers.iter() {
            groups.push(wrap_group(&self.subjects[start..=m], &self.props, &self.op));
            start = m + 1;
        }
        groups.push(wrap_group(&self.subjects[start..], &self.props, &self.op));
        groups
    }
}

pub(crate) fn wrap_group(group: &[Atom], props: &AlgProp, op: &Option<Operator>) -> Atom {
    if group.len() == 1 {
        return group[0].clone();
    }
    let seq = Atom::AtomSeq(crate::atom::AtomSeq::with_mode(
        props.clone(),
        group.to_vec(),
        BuildMode::AsGiven,
    ));
    match op {
        Some(o) => Atom::apply(Atom::op_ref(o.name.as_ref()), seq),
        None => seq,
    }
}

impl Iterator for GroupingIter {
    type Item = Vec<Atom>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.current_grouping();
        self.advance();
        Some(item)
    }
}

/// `C(n, k)`, used only by tests to check §8 invariant 8 (completeness).
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
    }
    result as usize
}
