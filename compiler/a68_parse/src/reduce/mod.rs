//! Bottom-up reduction.
//!
//! Each packet and part is reduced innermost first. Within a chain the
//! passes run in a fixed order: inner packets, declarers, declaration
//! binding, units (primaries up to assignations), declarations and finally
//! the clause the chain forms. Reductions rewrite the tree in place with
//! [`a68_ir::Tree::make_sub`], so node ids held across a reduction keep
//! denoting the phrase that starts there.

mod clauses;
mod declarations;
mod declarers;
mod format;
mod packets;
mod recovery;
mod units;

use smallvec::SmallVec;
use tracing::info;

use a68_diagnostic::{syntax_error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Program, Status, TableId, Tree};

use crate::extract::Binder;

pub use units::MONADIC_PRIORITY;

/// One element of a reduction pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Pat {
    /// A node with this attribute.
    A(Attribute),
    /// Any node except one with this attribute.
    Not(Attribute),
    /// Any phrase built by the parser.
    Any,
}

impl Pat {
    fn accepts(self, tree: &Tree, p: NodeId) -> bool {
        let attr = tree.attribute(p);
        match self {
            Pat::A(a) => attr == a,
            Pat::Not(a) => attr != a,
            Pat::Any => !attr.is_terminal() || tree.sub(p).is_some(),
        }
    }
}

/// The nodes of a chain from `first` up to, not including, `stop`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub first: Option<NodeId>,
    pub stop: Option<NodeId>,
}

impl Segment {
    pub(crate) fn is_empty(self) -> bool {
        self.first.is_none() || self.first == self.stop
    }
}

pub(crate) struct Reducer<'a> {
    pub(crate) program: &'a mut Program,
    pub(crate) diags: &'a mut DiagnosticQueue,
}

/// Reduce the structured chain starting at `top` to a particular program.
#[tracing::instrument(level = "debug", skip_all)]
pub fn reduce_program(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let mut reducer = Reducer { program, diags };
    let seg = Segment { first: Some(top), stop: None };
    if reducer.serial(seg)? == ChainShape::Collateral {
        reducer.syntax_error(top, ErrorCode::E1004, "a program is a serial clause, not a list of units")?;
        let last = reducer.tree().last_sibling(top);
        reducer.wrap(top, last, Attribute::SerialClause);
    }
    reducer.wrap(top, top, Attribute::ParticularProgram);
    Ok(())
}

impl Reducer<'_> {
    pub(crate) fn tree(&self) -> &Tree {
        &self.program.tree
    }

    pub(crate) fn attr(&self, p: NodeId) -> Attribute {
        self.program.tree.attribute(p)
    }

    pub(crate) fn is(&self, p: Option<NodeId>, attr: Attribute) -> bool {
        self.program.tree.is_opt(p, attr)
    }

    pub(crate) fn next(&self, p: NodeId) -> Option<NodeId> {
        self.program.tree.next(p)
    }

    pub(crate) fn previous(&self, p: NodeId) -> Option<NodeId> {
        self.program.tree.previous(p)
    }

    pub(crate) fn table_of(&self, p: NodeId) -> TableId {
        self.program.tree[p].table.unwrap_or(TableId::STANDENV)
    }

    /// A bracket packet (rather than the bracket token) with `attr`.
    pub(crate) fn is_packet(&self, p: Option<NodeId>, attr: Attribute) -> bool {
        p.is_some_and(|p| self.tree().is(p, attr) && self.tree().sub(p).is_some())
    }

    /// Current nodes of `seg`.
    pub(crate) fn nodes(&self, seg: Segment) -> SmallVec<[NodeId; 16]> {
        let mut out = SmallVec::new();
        let mut p = seg.first;
        while let Some(q) = p {
            if Some(q) == seg.stop {
                break;
            }
            out.push(q);
            p = self.next(q);
        }
        out
    }

    /// Contents of a packet: between the opener and the closer token.
    pub(crate) fn contents(&self, packet: NodeId) -> Segment {
        let Some(opener) = self.tree().sub(packet) else {
            return Segment { first: None, stop: None };
        };
        let last = self.tree().last_sibling(opener);
        let closer = self.attr(last);
        let stop = (last != opener && (closer.is_closer() || closer == Attribute::FormatDelimiterSymbol)).then_some(last);
        Segment {
            first: self.next(opener),
            stop,
        }
    }

    /// Contents of a part: everything after its keyword.
    pub(crate) fn part_contents(&self, part: NodeId) -> Segment {
        Segment {
            first: self.tree().sub(part).and_then(|k| self.next(k)),
            stop: None,
        }
    }

    /// Make `p..=q` a phrase with attribute `attr`.
    pub(crate) fn wrap(&mut self, p: NodeId, q: NodeId, attr: Attribute) -> NodeId {
        let head = self.program.tree.make_sub(p, q, attr);
        if self.program.options.reductions {
            let children: Vec<&str> = self.tree().children(head).map(|c| self.attr(c).name()).collect();
            info!(target: "a68::reductions", "{attr} <- {}", children.join(" "));
        }
        head
    }

    /// Last node of a match of `pats` starting at `p`.
    pub(crate) fn matches(&self, p: NodeId, pats: &[Pat]) -> Option<NodeId> {
        let mut at = Some(p);
        let mut last = p;
        for pat in pats {
            let q = at?;
            if !pat.accepts(self.tree(), q) {
                return None;
            }
            last = q;
            at = self.next(q);
        }
        Some(last)
    }

    /// Reduce `p` and its successors to `result` when they match `pats`.
    pub(crate) fn try_reduction(&mut self, p: NodeId, result: Attribute, pats: &[Pat]) -> bool {
        match self.matches(p, pats) {
            Some(last) => {
                self.wrap(p, last, result);
                true
            }
            None => false,
        }
    }

    pub(crate) fn syntax_error(&mut self, p: NodeId, code: ErrorCode, message: impl Into<String>) -> PhaseResult {
        self.program.tree[p].status |= Status::ERROR;
        let span = self.program.tree[p].span;
        self.diags.report(syntax_error_at(code, span, message))
    }

    pub(crate) fn binder(&mut self) -> Binder<'_> {
        Binder {
            program: &mut *self.program,
            diags: &mut *self.diags,
        }
    }

    /// Chain of a serial clause, enquiry clause or program body.
    ///
    /// Returns the serial clause the chain reduced to, or tells that the
    /// chain is a collateral list of units.
    pub(crate) fn serial(&mut self, seg: Segment) -> PhaseResult<ChainShape> {
        if seg.is_empty() {
            return Ok(ChainShape::Empty);
        }
        self.packets(seg)?;
        self.declarers(seg)?;
        self.bind_declarations(seg)?;
        self.units(seg)?;
        self.declarations(seg)?;
        self.serial_clause(seg)
    }

    /// Chain of units separated by commas, as in an IN part or a bound.
    pub(crate) fn unit_list(&mut self, seg: Segment) -> PhaseResult {
        if seg.is_empty() {
            return Ok(());
        }
        self.packets(seg)?;
        self.declarers(seg)?;
        self.units(seg)?;
        self.specified_units(seg);
        Ok(())
    }
}

/// What a serial chain reduced to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChainShape {
    Empty,
    Serial(NodeId),
    Collateral,
}

#[cfg(test)]
mod tests;
