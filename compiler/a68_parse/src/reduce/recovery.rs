//! Recovery from chains that do not reduce to a clause.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Attribute, Status};

use super::{ChainShape, Reducer, Segment};

impl Reducer<'_> {
    /// Report the first phrase that breaks the chain, then fold the chain
    /// into an erroneous serial clause so that parsing can go on.
    ///
    /// A chain already holding an error is folded silently; its first
    /// error explains the rest.
    pub(crate) fn recover(&mut self, seg: Segment) -> PhaseResult<ChainShape> {
        let nodes = self.nodes(seg);
        let (Some(&first), Some(&last)) = (nodes.first(), nodes.last()) else {
            return Ok(ChainShape::Empty);
        };
        let reported = nodes.iter().any(|&q| self.program.tree[q].status.contains(Status::ERROR));
        if !reported {
            let offender = nodes
                .iter()
                .copied()
                .find(|&q| {
                    !matches!(
                        self.attr(q),
                        Attribute::Unit
                            | Attribute::LabeledUnit
                            | Attribute::DeclarationList
                            | Attribute::SemiSymbol
                            | Attribute::ExitSymbol
                            | Attribute::CommaSymbol
                    )
                })
                .unwrap_or(first);
            let phrase: Vec<String> = nodes
                .iter()
                .skip_while(|&&q| q != offender)
                .take(4)
                .map(|&q| self.attr(q).name().to_lowercase().replace('_', " "))
                .collect();
            self.syntax_error(offender, ErrorCode::E1004, format!("invalid sequence: {}", phrase.join(", ")))?;
        }
        let head = self.wrap(first, last, Attribute::SerialClause);
        self.program.tree[head].status |= Status::ERROR;
        Ok(ChainShape::Serial(head))
    }
}
