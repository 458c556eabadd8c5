//! Serial and collateral clauses.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId};

use super::{ChainShape, Pat, Reducer, Segment};

fn is_item(attr: Attribute) -> bool {
    matches!(attr, Attribute::Unit | Attribute::LabeledUnit | Attribute::DeclarationList)
}

fn is_separator(attr: Attribute) -> bool {
    matches!(attr, Attribute::SemiSymbol | Attribute::ExitSymbol | Attribute::CommaSymbol)
}

impl Reducer<'_> {
    /// Reduce a fully reduced chain to a serial clause, or recognise it as
    /// a collateral list of units.
    pub(crate) fn serial_clause(&mut self, seg: Segment) -> PhaseResult<ChainShape> {
        self.labeled_units(seg)?;
        let nodes = self.nodes(seg);
        let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
            return Ok(ChainShape::Empty);
        };
        let shaped = nodes.iter().enumerate().all(|(i, &q)| {
            let attr = self.attr(q);
            if i % 2 == 0 { is_item(attr) } else { is_separator(attr) }
        });
        if !shaped {
            return self.recover(seg);
        }
        let commas = nodes.iter().any(|&q| self.tree().is(q, Attribute::CommaSymbol));
        let serial = nodes.iter().any(|&q| {
            matches!(
                self.attr(q),
                Attribute::SemiSymbol | Attribute::ExitSymbol | Attribute::DeclarationList | Attribute::LabeledUnit
            )
        });
        if commas && !serial {
            return Ok(ChainShape::Collateral);
        }
        if commas {
            let comma = nodes.iter().copied().find(|&q| self.tree().is(q, Attribute::CommaSymbol)).unwrap_or(first);
            self.syntax_error(comma, ErrorCode::E1004, "units of a serial clause are separated by semicolons")?;
        }
        // A clause ending in a declaration list yields VOID.
        if is_separator(self.attr(last)) {
            self.syntax_error(last, ErrorCode::E1003, "serial clause ends with a separator")?;
        }
        self.serial_rules(&nodes)?;
        self.wrap(first, last, Attribute::SerialClause);
        Ok(ChainShape::Serial(first))
    }

    /// `label: unit`, built right to left so a unit may carry several labels.
    fn labeled_units(&mut self, seg: Segment) -> PhaseResult {
        let nodes = self.nodes(seg);
        for &q in nodes.iter().rev() {
            if !self.tree().is(q, Attribute::Label) {
                continue;
            }
            let labeled = [Pat::A(Attribute::Label), Pat::A(Attribute::ColonSymbol), Pat::A(Attribute::Unit)];
            let relabeled = [Pat::A(Attribute::Label), Pat::A(Attribute::ColonSymbol), Pat::A(Attribute::LabeledUnit)];
            if self.try_reduction(q, Attribute::LabeledUnit, &labeled)
                || self.try_reduction(q, Attribute::LabeledUnit, &relabeled)
            {
                continue;
            }
            let after = self.matches(q, &[Pat::A(Attribute::Label), Pat::A(Attribute::ColonSymbol), Pat::Any]);
            if self.is(after, Attribute::DeclarationList) {
                self.syntax_error(q, ErrorCode::E1008, "a declaration cannot follow a label")?;
            }
        }
        Ok(())
    }

    /// Labels and completers: a unit after EXIT must be labeled, and no
    /// declaration may follow a label.
    fn serial_rules(&mut self, nodes: &[NodeId]) -> PhaseResult {
        let mut labeled = false;
        for &q in nodes {
            match self.attr(q) {
                Attribute::LabeledUnit => labeled = true,
                Attribute::DeclarationList if labeled => {
                    self.syntax_error(q, ErrorCode::E1008, "a declaration cannot follow a label")?;
                }
                Attribute::ExitSymbol => {
                    let unlabeled = [Pat::A(Attribute::ExitSymbol), Pat::Not(Attribute::LabeledUnit)];
                    if let Some(after) = self.matches(q, &unlabeled).filter(|a| nodes.contains(a)) {
                        self.syntax_error(after, ErrorCode::E1007, "a unit after EXIT must be labeled")?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}
