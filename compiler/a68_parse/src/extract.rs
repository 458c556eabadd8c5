//! Binding of indicants, priorities and operators before reduction.
//!
//! The reducer needs to know which bold words are mode indicants and what
//! priority each dyadic operator has, so these declarations are picked out
//! of the token chains first. Bold tags are then elaborated into
//! `INDICANT` or `OPERATOR` nodes.

use a68_diagnostic::{error_at, syntax_error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, Name, NodeId, Program, Status, TableId, TagId, TagKind};

/// Bind `MODE`, `PRIO` and `OP` declarations, then elaborate bold tags.
#[tracing::instrument(level = "debug", skip_all)]
pub fn extract(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let nodes = program.tree.preorder(Some(top));
    let mut binder = Binder { program, diags };
    for &p in &nodes {
        match binder.program.tree.attribute(p) {
            Attribute::ModeSymbol => binder.modes(p)?,
            Attribute::PrioSymbol => binder.priorities(p)?,
            Attribute::OpSymbol => binder.operators(p)?,
            _ => {}
        }
    }
    for &p in &nodes {
        if binder.program.tree.is(p, Attribute::BoldTag) {
            binder.elaborate(p)?;
        }
    }
    Ok(())
}

pub(crate) struct Binder<'a> {
    pub(crate) program: &'a mut Program,
    pub(crate) diags: &'a mut DiagnosticQueue,
}

fn is_operator_token(attr: Attribute) -> bool {
    matches!(attr, Attribute::Operator | Attribute::BoldTag | Attribute::EqualsSymbol)
}

impl Binder<'_> {
    fn table_of(&self, p: NodeId) -> TableId {
        self.program.tree[p].table.unwrap_or(TableId::STANDENV)
    }

    fn followed_by(&self, p: NodeId, attr: Attribute) -> bool {
        self.program.tree.is_opt(self.program.tree.next(p), attr)
    }

    /// Next comma of the declaration list starting at `p`, if the list
    /// continues with a phrase accepted by `continues`.
    fn list_continuation(&self, p: NodeId, continues: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        let tree = &self.program.tree;
        let mut r = tree.next(p);
        while let Some(n) = r {
            match tree.attribute(n) {
                Attribute::SemiSymbol | Attribute::ExitSymbol => return None,
                Attribute::CommaSymbol => {
                    if let Some(after) = tree.next(n) {
                        if continues(after) {
                            return Some(after);
                        }
                    }
                }
                _ => {}
            }
            r = tree.next(n);
        }
        None
    }

    /// Bind a tag of `kind` in `p`'s table, reporting a duplicate.
    pub(crate) fn declare(&mut self, p: NodeId, kind: TagKind, name: Name) -> PhaseResult<TagId> {
        let table = self.table_of(p);
        let clash = match kind {
            TagKind::Identifier | TagKind::Label => self
                .program
                .tables
                .find_local(table, TagKind::Identifier, name)
                .or_else(|| self.program.tables.find_local(table, TagKind::Label, name)),
            TagKind::Indicant | TagKind::Priority => self.program.tables.find_local(table, kind, name),
            TagKind::Operator | TagKind::Anonymous => None,
        };
        if clash.is_some() {
            let text = self.program.interner.lookup(name);
            let span = self.program.tree[p].span;
            self.diags.report(error_at(
                ErrorCode::E1006,
                span,
                format!("tag \"{text}\" declared more than once in the same range"),
            ))?;
        }
        let tag = self.program.tables.add_tag(table, kind, name);
        self.program.tables.tag_mut(tag).node = Some(p);
        self.program.tree[p].tag = Some(tag);
        Ok(tag)
    }

    fn modes(&mut self, mode: NodeId) -> PhaseResult {
        let mut at = self.program.tree.next(mode);
        while let Some(p) = at {
            let tree = &self.program.tree;
            if !self.followed_by(p, Attribute::EqualsSymbol) {
                let span = tree[p].span;
                return self
                    .diags
                    .report(syntax_error_at(ErrorCode::E1003, span, "mode declaration expects an indicant"));
            }
            if !tree.is(p, Attribute::BoldTag) {
                let attr = tree.attribute(p);
                let span = tree[p].span;
                if attr.is_terminal() && attr != Attribute::Identifier && attr != Attribute::Operator {
                    let text = self.program.text(p);
                    return self.diags.report(error_at(
                        ErrorCode::E1009,
                        span,
                        format!("keyword \"{text}\" cannot be redefined"),
                    ));
                }
                return self
                    .diags
                    .report(syntax_error_at(ErrorCode::E1003, span, "mode declaration expects an indicant"));
            }
            self.program.tree[p].attribute = Attribute::DefiningIndicant;
            let name = self.program.tree.symbol(p);
            self.declare(p, TagKind::Indicant, name)?;
            at = self.list_continuation(p, |q| {
                self.program.tree.is(q, Attribute::BoldTag) && self.followed_by(q, Attribute::EqualsSymbol)
            });
        }
        Ok(())
    }

    fn priorities(&mut self, prio: NodeId) -> PhaseResult {
        let mut at = self.program.tree.next(prio);
        while let Some(p) = at {
            let tree = &self.program.tree;
            let digit = tree.next(p).and_then(|e| tree.next(e));
            let shaped = is_operator_token(tree.attribute(p))
                && self.followed_by(p, Attribute::EqualsSymbol)
                && tree.is_opt(digit, Attribute::IntDenotation);
            let Some(digit) = digit.filter(|_| shaped) else {
                let span = tree[p].span;
                return self
                    .diags
                    .report(syntax_error_at(ErrorCode::E1003, span, "priority declaration expects OP = digit"));
            };
            let text = self.program.text(digit);
            let priority = match text.parse::<u8>() {
                Ok(n @ 1..=9) => n,
                _ => {
                    let span = self.program.tree[digit].span;
                    self.diags.report(error_at(
                        ErrorCode::E1011,
                        span,
                        format!("priority {text} is not between 1 and 9"),
                    ))?;
                    9
                }
            };
            self.program.tree[p].attribute = Attribute::DefiningOperator;
            self.program.tree[digit].attribute = Attribute::Priority;
            self.program.tree[digit].priority = priority;
            let name = self.program.tree.symbol(p);
            let tag = self.declare(p, TagKind::Priority, name)?;
            self.program.tables.tag_mut(tag).priority = priority;
            self.program.tree[p].priority = priority;
            at = self.list_continuation(digit, |q| {
                is_operator_token(self.program.tree.attribute(q)) && self.followed_by(q, Attribute::EqualsSymbol)
            });
        }
        Ok(())
    }

    fn operators(&mut self, op: NodeId) -> PhaseResult {
        let tree = &self.program.tree;
        let first = tree
            .siblings(tree.next(op))
            .take_while(|&p| !tree.is(p, Attribute::SemiSymbol))
            .find(|&p| is_operator_token(tree.attribute(p)) && self.followed_by(p, Attribute::EqualsSymbol));
        let Some(first) = first else {
            let span = tree.next(op).map_or(tree[op].span, |p| tree[p].span);
            return self
                .diags
                .report(error_at(ErrorCode::E1012, span, "operator declaration has no valid operator tag"));
        };
        let mut at = Some(first);
        while let Some(p) = at {
            self.program.tree[p].attribute = Attribute::DefiningOperator;
            let name = self.program.tree.symbol(p);
            self.declare(p, TagKind::Operator, name)?;
            at = self.list_continuation(p, |q| {
                is_operator_token(self.program.tree.attribute(q)) && self.followed_by(q, Attribute::EqualsSymbol)
            });
        }
        Ok(())
    }

    /// Decide whether a bold tag is an indicant or an operator.
    fn elaborate(&mut self, p: NodeId) -> PhaseResult {
        let table = self.table_of(p);
        let name = self.program.tree.symbol(p);
        let tables = &self.program.tables;
        if let Some(tag) = tables.find_global(table, TagKind::Indicant, name) {
            self.program.tree[p].attribute = Attribute::Indicant;
            self.program.tree[p].tag = Some(tag);
            return Ok(());
        }
        let is_operator = tables.find_global(table, TagKind::Operator, name).is_some()
            || tables.find_global(table, TagKind::Priority, name).is_some();
        if is_operator {
            self.program.tree[p].attribute = Attribute::Operator;
            return Ok(());
        }
        let text = self.program.text(p);
        let span = self.program.tree[p].span;
        self.program.tree[p].attribute = Attribute::Indicant;
        self.program.tree[p].status |= Status::ERROR;
        self.diags
            .report(error_at(ErrorCode::E1005, span, format!("tag \"{text}\" has not been declared")))
    }
}

#[cfg(test)]
mod tests;
