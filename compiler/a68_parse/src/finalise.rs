//! Symbol-table finalisation.
//!
//! After reduction the preliminary tables become the definitive ranges:
//! routine texts and specified units get the ranges their parameters live
//! in, loop identifiers move to the range of the part they govern, and
//! every applied identifier and indicant is bound to its tag.

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Program, Status, TableId, TagKind};
use a68_stack::ensure_sufficient_stack;

use crate::tables;

/// Finalise the tables of the reduced program at `top`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn finalise(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let nodes = program.tree.preorder(Some(top));
    for &p in &nodes {
        match program.tree.attribute(p) {
            Attribute::RoutineText => routine_range(program, p),
            Attribute::SpecifiedUnit => specified_range(program, p),
            Attribute::LoopClause => loop_range(program, p),
            _ => {}
        }
    }
    tables::relevel(program);
    nest(program, Some(top), None);
    rearrange_goto_less_jumps(program, top);
    let mut finaliser = Finaliser { program, diags };
    for p in finaliser.program.tree.preorder(Some(top)) {
        finaliser.bind(p)?;
    }
    for p in finaliser.program.tree.preorder(Some(top)) {
        finaliser.declaration(p)?;
    }
    tracing::debug!(tables = finaliser.program.tables.table_count(), "finalisation complete");
    Ok(())
}

/// Give a routine text its own range, holding its parameters if any.
fn routine_range(program: &mut Program, routine: NodeId) {
    let Some(outer) = program.tree[routine].table else {
        return;
    };
    let children = program.tree.child_ids(routine);
    let pack = children
        .first()
        .copied()
        .filter(|&c| program.tree.is(c, Attribute::ParameterPack));
    let range = match pack.and_then(|pp| tables::inner_table(program, pp)) {
        Some(range) => range,
        None => program.tables.new_table(outer),
    };
    program.tables.table_mut(range).attribute = Some(Attribute::RoutineText);
    for &c in children.iter().filter(|&&c| Some(c) != pack) {
        tables::adopt(program, c, outer, range);
    }
    program.tables.table_mut(outer).initialise_frame = true;
}

/// A conformity alternative sees the identifier of its specifier.
fn specified_range(program: &mut Program, unit: NodeId) {
    let Some(outer) = program.tree[unit].table else {
        return;
    };
    let children = program.tree.child_ids(unit);
    let Some(range) = children.first().and_then(|&s| tables::inner_table(program, s)) else {
        return;
    };
    for &c in children.iter().skip(1) {
        tables::adopt(program, c, outer, range);
    }
}

/// Move a loop identifier into the range of the WHILE or DO part.
fn loop_range(program: &mut Program, clause: NodeId) {
    let children = program.tree.child_ids(clause);
    let part = |attr| children.iter().copied().find(|&c| program.tree.is(c, attr));
    let Some(id) = part(Attribute::ForPart)
        .and_then(|f| program.tree.find_child(f, Attribute::DefiningIdentifier))
    else {
        return;
    };
    let governed = part(Attribute::WhilePart)
        .or_else(|| part(Attribute::DoPart))
        .and_then(|p| tables::inner_table(program, p));
    let (Some(range), Some(tag)) = (governed, program.tree[id].tag) else {
        return;
    };
    program.tables.move_tag(tag, range);
    program.tree[id].table = Some(range);
}

/// Record the innermost routine or format text around every node.
fn nest(program: &mut Program, first: Option<NodeId>, routine: Option<NodeId>) {
    let chain: Vec<NodeId> = program.tree.siblings(first).collect();
    for p in chain {
        program.tree[p].nest = routine;
        if routine.is_some() && program.tree.is(p, Attribute::DefiningIdentifier) {
            if let Some(tag) = program.tree[p].tag {
                program.tables.tag_mut(tag).in_proc = true;
            }
        }
        let inner = match program.tree.attribute(p) {
            Attribute::RoutineText | Attribute::FormatText => Some(p),
            _ => routine,
        };
        let sub = program.tree.sub(p);
        ensure_sufficient_stack(|| nest(program, sub, inner));
    }
}

/// A label in unit position is a jump without `GOTO`: rewrite
/// `UNIT (TERTIARY (SECONDARY (PRIMARY (IDENTIFIER))))` to
/// `UNIT (JUMP (IDENTIFIER))`.
fn rearrange_goto_less_jumps(program: &mut Program, top: NodeId) {
    for unit in program.tree.preorder(Some(top)) {
        if !program.tree.is(unit, Attribute::Unit) {
            continue;
        }
        let Some(tertiary) = program.tree.sub(unit).filter(|&t| program.tree.is(t, Attribute::Tertiary)) else {
            continue;
        };
        let id = program
            .tree
            .descend(tertiary, &[Attribute::Tertiary, Attribute::Secondary, Attribute::Primary]);
        if !program.tree.is(id, Attribute::Identifier) {
            continue;
        }
        let table = program.tree[id].table.unwrap_or(TableId::STANDENV);
        let name = program.tree.symbol(id);
        let is_label = program.tables.find_global(table, TagKind::Identifier, name).is_none()
            && program.tables.find_global(table, TagKind::Label, name).is_some();
        if is_label {
            program.tree[tertiary].attribute = Attribute::Jump;
            program.tree[tertiary].sub = Some(id);
            program.tree[id].previous = None;
            program.tree[id].next = None;
        }
    }
}

struct Finaliser<'a> {
    program: &'a mut Program,
    diags: &'a mut DiagnosticQueue,
}

impl Finaliser<'_> {
    fn undeclared(&mut self, p: NodeId) -> PhaseResult {
        if self.program.tree[p].status.contains(Status::ERROR) {
            return Ok(());
        }
        self.program.tree[p].status |= Status::ERROR;
        let text = self.program.text(p);
        let span = self.program.tree[p].span;
        self.diags
            .report(error_at(ErrorCode::E1005, span, format!("tag \"{text}\" has not been declared")))
    }

    /// Bind an applied identifier, label or indicant.
    fn bind(&mut self, p: NodeId) -> PhaseResult {
        let tree = &self.program.tree;
        let table = tree[p].table.unwrap_or(TableId::STANDENV);
        let name = tree.symbol(p);
        let kind = match tree.attribute(p) {
            Attribute::Jump => {
                let Some(id) = tree.find_child(p, Attribute::Identifier) else {
                    return Ok(());
                };
                let table = tree[id].table.unwrap_or(table);
                let name = tree.symbol(id);
                return match self.program.tables.find_global(table, TagKind::Label, name) {
                    Some(tag) => {
                        self.program.tree[id].tag = Some(tag);
                        self.program.tables.tag_mut(tag).used = true;
                        Ok(())
                    }
                    None => self.undeclared(id),
                };
            }
            Attribute::Identifier if tree[p].tag.is_none() => TagKind::Identifier,
            Attribute::Indicant if tree[p].tag.is_none() => TagKind::Indicant,
            _ => return Ok(()),
        };
        match self.program.tables.find_global(table, kind, name) {
            Some(tag) => {
                self.program.tree[p].tag = Some(tag);
                self.program.tables.tag_mut(tag).used = true;
                Ok(())
            }
            None => self.undeclared(p),
        }
    }

    /// Link declared tags to what they stand for and check that dyadic
    /// operators have a priority.
    fn declaration(&mut self, p: NodeId) -> PhaseResult {
        let tree = &self.program.tree;
        match tree.attribute(p) {
            Attribute::ModeDeclaration => {
                for ind in tree.children(p).filter(|&c| tree.is(c, Attribute::DefiningIndicant)).collect::<Vec<_>>() {
                    let declarer = self.program.tree.next(ind).and_then(|e| self.program.tree.next(e));
                    if let Some(tag) = self.program.tree[ind].tag {
                        self.program.tables.tag_mut(tag).body = declarer;
                    }
                }
            }
            Attribute::IdentityDeclaration
            | Attribute::ProcedureDeclaration
            | Attribute::OperatorDeclaration
            | Attribute::BriefOperatorDeclaration => {
                let defining: Vec<NodeId> = tree
                    .children(p)
                    .filter(|&c| tree.is(c, Attribute::DefiningIdentifier) || tree.is(c, Attribute::DefiningOperator))
                    .collect();
                let plan = tree.find_child(p, Attribute::OperatorPlan);
                for d in defining {
                    let source = self.program.tree.next(d).and_then(|e| self.program.tree.next(e));
                    let routine = source.and_then(|u| self.routine_text(u));
                    let Some(tag) = self.program.tree[d].tag else {
                        continue;
                    };
                    if routine.is_some() {
                        let t = self.program.tables.tag_mut(tag);
                        t.body = routine;
                        t.is_routine = true;
                    }
                    if self.program.tree.is(d, Attribute::DefiningOperator) {
                        let arity = match plan {
                            Some(plan) => self.plan_arity(plan),
                            None => routine.map_or(0, |r| self.routine_arity(r)),
                        };
                        self.dyadic_priority(d, arity)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Routine text that `unit` consists of, if any.
    fn routine_text(&self, unit: NodeId) -> Option<NodeId> {
        let tree = &self.program.tree;
        tree.sub(unit).filter(|&r| tree.is(r, Attribute::RoutineText))
    }

    fn plan_arity(&self, plan: NodeId) -> usize {
        let tree = &self.program.tree;
        tree.find_child(plan, Attribute::FormalDeclarers)
            .map_or(0, |f| tree.children(f).filter(|&c| tree.is(c, Attribute::Declarer)).count())
    }

    fn routine_arity(&self, routine: NodeId) -> usize {
        let tree = &self.program.tree;
        tree.find_child(routine, Attribute::ParameterPack).map_or(0, |pack| {
            tree.children(pack)
                .filter(|&c| tree.is(c, Attribute::Parameter))
                .map(|param| tree.children(param).filter(|&c| tree.is(c, Attribute::DefiningIdentifier)).count())
                .sum()
        })
    }

    fn dyadic_priority(&mut self, op: NodeId, arity: usize) -> PhaseResult {
        if arity != 2 {
            return Ok(());
        }
        let table = self.program.tree[op].table.unwrap_or(TableId::STANDENV);
        let name = self.program.tree.symbol(op);
        if self.program.tables.priority_of(table, name).is_some() {
            return Ok(());
        }
        let text = self.program.text(op);
        let span = self.program.tree[op].span;
        self.diags.report(error_at(
            ErrorCode::E1010,
            span,
            format!("dyadic operator \"{text}\" is declared without a priority"),
        ))
    }
}
