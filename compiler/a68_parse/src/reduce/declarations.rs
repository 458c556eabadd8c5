//! Declarations.
//!
//! Defining identifiers and labels are bound before the units of a chain
//! are reduced, so that an applied identifier can never be mistaken for a
//! defining one. The declarations themselves are assembled after the units
//! they contain.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Attribute, HeapQualifier, NodeId, TagKind};

use super::{Pat, Reducer, Segment};

/// Declaration list being continued after a comma.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Binding {
    Identity,
    Variable,
    Procedure,
    ProcedureVariable,
}

impl Reducer<'_> {
    /// Bind defining identifiers and labels at the start of each phrase.
    pub(crate) fn bind_declarations(&mut self, seg: Segment) -> PhaseResult {
        let mut list = None;
        let mut at_start = true;
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            match self.attr(q) {
                Attribute::SemiSymbol | Attribute::ExitSymbol => {
                    list = None;
                    at_start = true;
                }
                Attribute::CommaSymbol => at_start = list.is_some(),
                Attribute::ModeSymbol | Attribute::PrioSymbol | Attribute::OpSymbol => {
                    list = None;
                    at_start = false;
                }
                Attribute::ColonSymbol if self.is(self.previous(q), Attribute::Label) => at_start = true,
                _ if at_start => {
                    at_start = false;
                    if let Some(kind) = list.and_then(|kind| self.continues(q, kind)) {
                        self.bind_identifier(q, kind)?;
                    } else {
                        list = self.declaration_start(q)?;
                    }
                }
                _ => {}
            }
            p = self.next(q);
        }
        Ok(())
    }

    /// Whether `id` continues a list of `kind` declarations.
    fn continues(&self, id: NodeId, kind: Binding) -> Option<Binding> {
        if !self.tree().is(id, Attribute::Identifier) {
            return None;
        }
        let after = self.next(id).map(|n| self.attr(n));
        let ok = match kind {
            Binding::Identity | Binding::Procedure => after == Some(Attribute::EqualsSymbol),
            Binding::ProcedureVariable => after == Some(Attribute::AssignSymbol),
            Binding::Variable => matches!(
                after,
                None | Some(
                    Attribute::AssignSymbol | Attribute::CommaSymbol | Attribute::SemiSymbol | Attribute::ExitSymbol
                )
            ),
        };
        ok.then_some(kind)
    }

    /// Recognise the start of a declaration or a label at `q`.
    fn declaration_start(&mut self, q: NodeId) -> PhaseResult<Option<Binding>> {
        let heap = match self.attr(q) {
            Attribute::HeapSymbol => Some(HeapQualifier::Heap),
            Attribute::LocSymbol => Some(HeapQualifier::Loc),
            _ => None,
        };
        let head = if heap.is_some() { self.next(q) } else { Some(q) };
        let Some(head) = head else {
            return Ok(None);
        };
        let id = self.next(head).filter(|&id| self.tree().is(id, Attribute::Identifier));
        match (self.attr(head), id) {
            (Attribute::Identifier, _) if heap.is_none() && self.is(self.next(head), Attribute::ColonSymbol) => {
                self.program.tree[head].attribute = Attribute::Label;
                let name = self.tree().symbol(head);
                self.binder().declare(head, TagKind::Label, name)?;
                Ok(None)
            }
            (Attribute::Declarer, Some(id)) => {
                let kind = if heap.is_none() && self.is(self.next(id), Attribute::EqualsSymbol) {
                    Binding::Identity
                } else if self.continues(id, Binding::Variable).is_some() {
                    Binding::Variable
                } else {
                    return Ok(None);
                };
                let tag = self.bind_identifier(id, kind)?;
                self.program.tables.tag_mut(tag).heap = heap.unwrap_or(HeapQualifier::Loc);
                Ok(Some(kind))
            }
            (Attribute::ProcSymbol, Some(id)) => {
                let kind = match self.next(id).map(|n| self.attr(n)) {
                    Some(Attribute::EqualsSymbol) if heap.is_none() => Binding::Procedure,
                    Some(Attribute::AssignSymbol) => Binding::ProcedureVariable,
                    _ => return Ok(None),
                };
                let tag = self.bind_identifier(id, kind)?;
                self.program.tables.tag_mut(tag).heap = heap.unwrap_or(HeapQualifier::Loc);
                Ok(Some(kind))
            }
            _ => Ok(None),
        }
    }

    fn bind_identifier(&mut self, id: NodeId, kind: Binding) -> PhaseResult<a68_ir::TagId> {
        self.program.tree[id].attribute = Attribute::DefiningIdentifier;
        let name = self.tree().symbol(id);
        let tag = self.binder().declare(id, TagKind::Identifier, name)?;
        self.program.tables.tag_mut(tag).is_routine = kind == Binding::Procedure;
        Ok(tag)
    }

    /// Assemble declarations and join comma-separated runs into lists.
    pub(crate) fn declarations(&mut self, seg: Segment) -> PhaseResult {
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            if self.declaration(q)?.is_some() {
                self.join_declarations(q, seg.stop)?;
            }
            p = self.next(q);
        }
        Ok(())
    }

    /// Reduce the declaration starting at `q`, if any.
    fn declaration(&mut self, q: NodeId) -> PhaseResult<Option<Attribute>> {
        use Attribute as A;
        let value = Pat::A(A::Unit);
        let (attr, items) = match self.attr(q) {
            A::ModeSymbol => (
                A::ModeDeclaration,
                self.items(self.next(q), A::DefiningIndicant, A::EqualsSymbol, Pat::A(A::Declarer), false),
            ),
            A::PrioSymbol => (
                A::PriorityDeclaration,
                self.items(self.next(q), A::DefiningOperator, A::EqualsSymbol, Pat::A(A::Priority), false),
            ),
            A::OpSymbol => {
                let plan = self.next(q).filter(|&f| self.tree().is(f, A::FormalDeclarers));
                if let Some(plan) = plan {
                    self.try_reduction(plan, A::OperatorPlan, &[Pat::A(A::FormalDeclarers), Pat::A(A::Declarer)]);
                    let first = self.next(plan);
                    (A::OperatorDeclaration, self.items(first, A::DefiningOperator, A::EqualsSymbol, value, false))
                } else {
                    let first = self.next(q);
                    (A::BriefOperatorDeclaration, self.items(first, A::DefiningOperator, A::EqualsSymbol, value, false))
                }
            }
            A::LocSymbol | A::HeapSymbol | A::Declarer | A::ProcSymbol => {
                let head = if matches!(self.attr(q), A::LocSymbol | A::HeapSymbol) { self.next(q) } else { Some(q) };
                let Some(head) = head else {
                    return Ok(None);
                };
                let first = self.next(head);
                if !self.is(first, A::DefiningIdentifier) {
                    return Ok(None);
                }
                let equals = first.and_then(|f| self.next(f)).is_some_and(|n| self.tree().is(n, A::EqualsSymbol));
                match (self.attr(head), equals) {
                    (A::ProcSymbol, true) => {
                        (A::ProcedureDeclaration, self.items(first, A::DefiningIdentifier, A::EqualsSymbol, value, false))
                    }
                    (A::ProcSymbol, false) => (
                        A::ProcedureVariableDeclaration,
                        self.items(first, A::DefiningIdentifier, A::AssignSymbol, value, false),
                    ),
                    (_, true) => {
                        (A::IdentityDeclaration, self.items(first, A::DefiningIdentifier, A::EqualsSymbol, value, false))
                    }
                    (_, false) => {
                        (A::VariableDeclaration, self.items(first, A::DefiningIdentifier, A::AssignSymbol, value, true))
                    }
                }
            }
            _ => return Ok(None),
        };
        match items {
            Some(last) => {
                self.wrap(q, last, attr);
                Ok(Some(attr))
            }
            None => {
                self.syntax_error(q, ErrorCode::E1003, format!("invalid {}", attr.name().to_lowercase()))?;
                Ok(None)
            }
        }
    }

    /// `head joiner value (, head joiner value)*`; returns the last node.
    fn items(
        &self,
        first: Option<NodeId>,
        head: Attribute,
        joiner: Attribute,
        value: Pat,
        optional: bool,
    ) -> Option<NodeId> {
        let mut at = first;
        loop {
            let h = at.filter(|&h| self.tree().is(h, head))?;
            let mut last = h;
            match self.next(h) {
                Some(j) if self.tree().is(j, joiner) => {
                    last = self.next(j).filter(|&v| self.matches(v, &[value]).is_some())?;
                }
                _ if optional => {}
                _ => return None,
            }
            let comma = self.next(last).filter(|&c| self.tree().is(c, Attribute::CommaSymbol));
            match comma.and_then(|c| self.next(c)) {
                Some(n) if self.tree().is(n, head) => at = Some(n),
                _ => return Some(last),
            }
        }
    }

    /// Join `decl , decl , ..` starting at `q` into a declaration list.
    fn join_declarations(&mut self, q: NodeId, stop: Option<NodeId>) -> PhaseResult {
        let mut last = q;
        loop {
            let comma = self.next(last).filter(|&c| Some(c) != stop && self.tree().is(c, Attribute::CommaSymbol));
            let Some(after) = comma.and_then(|c| self.next(c)) else {
                break;
            };
            if self.declaration(after)?.is_none() {
                break;
            }
            last = after;
        }
        self.wrap(q, last, Attribute::DeclarationList);
        Ok(())
    }
}
