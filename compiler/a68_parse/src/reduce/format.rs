//! Format texts: `$ picture, picture, .. $`.
//!
//! A picture is a run of format items, literals, replicators and
//! collections. Two patterns in one picture that can both absorb the same
//! characters are ambiguous and must be separated by a comma.

use a68_diagnostic::{error_at, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId};
use a68_stack::ensure_sufficient_stack;

use super::{Reducer, Segment};

impl Reducer<'_> {
    pub(crate) fn format_text(&mut self, p: NodeId) -> PhaseResult {
        let seg = self.contents(p);
        self.pictures(seg)?;
        self.program.tree[p].attribute = Attribute::FormatText;
        Ok(())
    }

    /// Reduce the comma-separated pictures of `seg`.
    fn pictures(&mut self, seg: Segment) -> PhaseResult {
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            match self.attr(q) {
                Attribute::FormatOpenSymbol if self.tree().sub(q).is_some() => {
                    let inner = self.contents(q);
                    ensure_sufficient_stack(|| self.pictures(inner))?;
                    self.program.tree[q].attribute = Attribute::Collection;
                }
                Attribute::FormatItem if self.is_packet(self.next(q), Attribute::OpenSymbol) => {
                    if let Some(clause) = self.next(q) {
                        self.enclosed(clause)?;
                        self.wrap(q, clause, Attribute::DynamicReplicator);
                    }
                }
                _ => {}
            }
            p = self.next(q);
        }
        let nodes = self.nodes(seg);
        let groups: Vec<&[NodeId]> = nodes.split(|&q| self.tree().is(q, Attribute::CommaSymbol)).collect();
        for group in groups {
            let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
                continue;
            };
            self.ambiguity(group)?;
            self.wrap(first, last, Attribute::Picture);
        }
        Ok(())
    }

    /// A sign mould after digit frames starts a second number pattern,
    /// unless it signs an exponent.
    fn ambiguity(&mut self, group: &[NodeId]) -> PhaseResult {
        let mut digits = false;
        let mut previous = "";
        for &q in group {
            if !self.tree().is(q, Attribute::FormatItem) {
                continue;
            }
            let text = self.program.text(q);
            match text {
                "d" | "z" => digits = true,
                "+" | "-" if digits && previous != "e" => {
                    let span = self.program.tree[q].span;
                    return self.diags.report(error_at(
                        ErrorCode::E1013,
                        span,
                        "ambiguous patterns in one picture must be separated by a comma",
                    ));
                }
                _ => {}
            }
            previous = text;
        }
        Ok(())
    }
}
