//! Declarations: sources stand in strong positions.

use a68_diagnostic::PhaseResult;
use a68_ir::{Attribute, MoidId, MoidKind, NodeId};
use a68_stack::ensure_sufficient_stack;

use super::Checker;
use crate::soid::Soid;

impl Checker<'_> {
    pub(super) fn declarations(&mut self, p: NodeId) -> PhaseResult {
        for d in self.children(p) {
            match self.attr(d) {
                Attribute::DeclarationList => ensure_sufficient_stack(|| self.declarations(d))?,
                Attribute::ModeDeclaration | Attribute::VariableDeclaration => {
                    for c in self.children(d) {
                        if self.program.tree.is(c, Attribute::Declarer) {
                            self.bounds(c)?;
                        }
                    }
                    if self.attr(d) == Attribute::VariableDeclaration {
                        self.sources(d, true)?;
                    }
                }
                Attribute::IdentityDeclaration
                | Attribute::ProcedureDeclaration
                | Attribute::OperatorDeclaration
                | Attribute::BriefOperatorDeclaration => self.sources(d, false)?,
                Attribute::ProcedureVariableDeclaration => self.sources(d, true)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Check the source of every defining occurrence in declaration `p`.
    ///
    /// A variable's source is assigned to the name the declaration
    /// generates, so it takes the mode the name refers to.
    fn sources(&mut self, p: NodeId, variable: bool) -> PhaseResult {
        let identity = self.attr(p) == Attribute::IdentityDeclaration;
        let operator = matches!(
            self.attr(p),
            Attribute::OperatorDeclaration | Attribute::BriefOperatorDeclaration
        );
        for d in self.children(p) {
            if !matches!(self.attr(d), Attribute::DefiningIdentifier | Attribute::DefiningOperator) {
                continue;
            }
            let source = self
                .program
                .tree
                .next(d)
                .and_then(|joiner| self.program.tree.next(joiner))
                .filter(|&u| self.program.tree.is(u, Attribute::Unit));
            let Some(source) = source else {
                continue;
            };
            let tag = self.program.tree[d].tag;
            let declared = tag
                .and_then(|t| self.program.tables.tag(t).moid)
                .or(self.program.tree[d].moid)
                .map_or(MoidId::ERROR, |m| self.canonical(m));
            let target = if variable && self.program.moids.is(declared, MoidKind::Ref) {
                self.canonical(self.program.moids.sub(declared))
            } else if variable {
                MoidId::ERROR
            } else {
                declared
            };
            let tracked = if identity { tag } else { None };
            let defined = if operator { tag } else { None };
            self.initialise(tracked, source);
            self.defining_operators.extend(defined);
            let checked = self.unit(source, Soid::strong(target));
            if defined.is_some() {
                self.defining_operators.pop();
            }
            self.initialised(tracked);
            checked?;
        }
        Ok(())
    }
}
