//! Declarers, reduced right to left so that `REF [] FLEX [] INT` builds
//! from the innermost declarer outwards.

use a68_diagnostic::PhaseResult;
use a68_ir::{Attribute, NodeId};

use super::{Pat, Reducer, Segment};

impl Reducer<'_> {
    pub(crate) fn declarers(&mut self, seg: Segment) -> PhaseResult {
        for &p in self.nodes(seg).iter().rev() {
            self.declarer_at(p);
        }
        Ok(())
    }

    fn declarer_at(&mut self, p: NodeId) {
        use Pat::A;
        let attr = self.attr(p);
        match attr {
            Attribute::Indicant | Attribute::VoidSymbol => {
                self.wrap(p, p, Attribute::Declarer);
            }
            Attribute::LongSymbol | Attribute::ShortSymbol => self.longety(p),
            Attribute::RefSymbol | Attribute::FlexSymbol => {
                self.try_reduction(p, Attribute::Declarer, &[A(attr), A(Attribute::Declarer)]);
            }
            Attribute::StructSymbol => {
                self.try_reduction(p, Attribute::Declarer, &[A(attr), A(Attribute::StructurePack)]);
            }
            Attribute::UnionSymbol => {
                self.try_reduction(p, Attribute::Declarer, &[A(attr), A(Attribute::UnionPack)]);
            }
            Attribute::ProcSymbol => {
                let _ = self.try_reduction(
                    p,
                    Attribute::Declarer,
                    &[A(attr), A(Attribute::FormalDeclarers), A(Attribute::Declarer)],
                ) || self.try_reduction(p, Attribute::Declarer, &[A(attr), A(Attribute::Declarer)]);
            }
            Attribute::SubSymbol if self.tree().sub(p).is_some() => {
                if self.is(self.next(p), Attribute::Declarer) {
                    self.bounds(p);
                    self.try_reduction(p, Attribute::Declarer, &[A(Attribute::Bounds), A(Attribute::Declarer)]);
                }
            }
            _ => {}
        }
    }

    /// `LONG LONG decl` or `SHORT decl`; reduced at the first token of the
    /// run. A run before a denotation stays a bare longety.
    fn longety(&mut self, p: NodeId) {
        let starts_run = !self
            .previous(p)
            .is_some_and(|q| matches!(self.attr(q), Attribute::LongSymbol | Attribute::ShortSymbol));
        if !starts_run {
            return;
        }
        let attr = self.attr(p);
        let mut last = p;
        while let Some(q) = self.next(last).filter(|&q| self.tree().is(q, attr)) {
            last = q;
        }
        let kind = if attr == Attribute::LongSymbol {
            Attribute::Longety
        } else {
            Attribute::Shortety
        };
        self.wrap(p, last, kind);
        self.try_reduction(p, Attribute::Declarer, &[Pat::A(kind), Pat::A(Attribute::Declarer)]);
    }

    /// Turn an item packet into bounds: every unit or trimmer is a bound.
    fn bounds(&mut self, p: NodeId) {
        for c in self.tree().child_ids(p) {
            match self.attr(c) {
                Attribute::Unit => {
                    self.wrap(c, c, Attribute::Bound);
                }
                Attribute::Trimmer => self.program.tree[c].attribute = Attribute::Bound,
                _ => {}
            }
        }
        self.program.tree[p].attribute = Attribute::Bounds;
    }
}
