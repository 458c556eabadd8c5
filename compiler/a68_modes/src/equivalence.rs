//! Structural equivalence of modes.
//!
//! Two modes are equivalent when they have the same constructor and
//! equivalent components. Mode graphs are cyclic, so the test is
//! coinductive: before comparing the components of a pair, the pair is
//! postulated equivalent. A comparison that reaches a postulated pair again
//! succeeds. Postulates are discarded when the comparison that made them
//! returns.

use a68_ir::{MoidArena, MoidId, MoidKind};
use a68_stack::ensure_sufficient_stack;

/// Equivalence tester over one arena.
pub struct Equivalencer<'a> {
    moids: &'a MoidArena,
    postulates: Vec<(MoidId, MoidId)>,
}

impl<'a> Equivalencer<'a> {
    pub fn new(moids: &'a MoidArena) -> Self {
        Equivalencer {
            moids,
            postulates: Vec::new(),
        }
    }

    fn postulated(&self, a: MoidId, b: MoidId) -> bool {
        self.postulates
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Whether `a` and `b` denote the same mode.
    pub fn equivalent(&mut self, a: MoidId, b: MoidId) -> bool {
        let (a, b) = (self.moids.canonical(a), self.moids.canonical(b));
        if a == b || self.postulated(a, b) {
            return true;
        }
        let (ma, mb) = (&self.moids[a], &self.moids[b]);
        if ma.kind != mb.kind {
            return false;
        }
        let mark = self.postulates.len();
        self.postulates.push((a, b));
        let result = ensure_sufficient_stack(|| self.components(a, b));
        self.postulates.truncate(mark);
        result
    }

    fn components(&mut self, a: MoidId, b: MoidId) -> bool {
        let moids = self.moids;
        let (ma, mb) = (&moids[a], &moids[b]);
        match ma.kind {
            MoidKind::Standard => ma.dim == mb.dim && ma.symbol == mb.symbol,
            MoidKind::Ref | MoidKind::Flex => self.equivalent(moids.sub(a), moids.sub(b)),
            MoidKind::Row => ma.dim == mb.dim && self.equivalent(moids.sub(a), moids.sub(b)),
            MoidKind::Proc => {
                ma.pack.len() == mb.pack.len()
                    && ma.pack.iter().zip(&mb.pack).all(|(x, y)| self.equivalent(x.moid, y.moid))
                    && self.equivalent(moids.sub(a), moids.sub(b))
            }
            MoidKind::Struct => {
                ma.pack.len() == mb.pack.len()
                    && ma
                        .pack
                        .iter()
                        .zip(&mb.pack)
                        .all(|(x, y)| x.text == y.text && self.equivalent(x.moid, y.moid))
            }
            MoidKind::Union => self.covers(a, b) && self.covers(b, a),
            MoidKind::Series | MoidKind::Stowed => {
                ma.pack.len() == mb.pack.len()
                    && ma.pack.iter().zip(&mb.pack).all(|(x, y)| self.equivalent(x.moid, y.moid))
            }
            // Unresolved indicants and the special modes are only equal to
            // themselves.
            _ => false,
        }
    }

    /// Every member of union `a` is equivalent to some member of `b`.
    fn covers(&mut self, a: MoidId, b: MoidId) -> bool {
        let moids = self.moids;
        moids[a]
            .pack
            .iter()
            .all(|x| moids[b].pack.iter().any(|y| self.equivalent(x.moid, y.moid)))
    }

    /// Whether `m` is equivalent to a member of union `u`.
    pub fn is_member(&mut self, m: MoidId, u: MoidId) -> bool {
        let moids = self.moids;
        let u = moids.canonical(u);
        moids[u].pack.iter().any(|e| self.equivalent(m, e.moid))
    }
}

/// Whether `a` and `b` are equivalent in `moids`.
pub fn equivalent(moids: &MoidArena, a: MoidId, b: MoidId) -> bool {
    Equivalencer::new(moids).equivalent(a, b)
}

#[cfg(test)]
mod tests;
