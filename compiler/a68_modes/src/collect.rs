//! Mode collection.
//!
//! Gives every declarer a mode and every declared tag the mode it is
//! declared with. Mode indicants get a placeholder that the equivalencer
//! later resolves to the indicant's definition.

use a68_diagnostic::{error_at, warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, MoidId, MoidKind, Name, NodeId, Program, Span, TableId, TagId};
use a68_stack::ensure_sufficient_stack;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Collect the modes of the program at `top`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn collect(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let nodes = program.tree.preorder(Some(top));
    let mut collector = Collector {
        program,
        diags,
        flexes: Vec::new(),
    };
    for &p in &nodes {
        if collector.program.tree.is(p, Attribute::DefiningIndicant) {
            collector.indicant(p);
        }
    }
    for &p in &nodes {
        if collector.program.tree.is(p, Attribute::Declarer) {
            collector.declarer(p)?;
        }
    }
    for &p in &nodes {
        if collector.program.tree.is(p, Attribute::RoutineText) {
            collector.routine_text(p);
        }
    }
    for &p in &nodes {
        collector.declaration(p);
    }
    collector.check_flexes()?;
    tracing::debug!(moids = collector.program.moids.len(), "mode collection complete");
    Ok(())
}

/// Modes `LONG`/`SHORT` may be applied to, by LONG count from zero.
const LENGTHS: &[&[MoidId]] = &[
    &[MoidId::INT, MoidId::LONG_INT, MoidId::LONG_LONG_INT],
    &[MoidId::REAL, MoidId::LONG_REAL, MoidId::LONG_LONG_REAL],
    &[MoidId::COMPLEX, MoidId::LONG_COMPLEX, MoidId::LONG_LONG_COMPLEX],
    &[MoidId::BITS, MoidId::LONG_BITS, MoidId::LONG_LONG_BITS],
    &[MoidId::BYTES, MoidId::LONG_BYTES],
];

/// `base` with `longs` LONGs (negative for SHORTs) applied.
///
/// Lengths the implementation lacks are clamped with a warning; a mode
/// that has no lengths at all is an error.
pub fn lengthen(
    program: &Program,
    base: MoidId,
    longs: i32,
    span: Span,
    diags: &mut DiagnosticQueue,
) -> PhaseResult<MoidId> {
    if longs == 0 || base == MoidId::ERROR {
        return Ok(base);
    }
    let Some(row) = LENGTHS.iter().find(|row| row[0] == base) else {
        diags.report(error_at(
            ErrorCode::E2009,
            span,
            format!("mode {} has no other lengths", program.moid_text(base)),
        ))?;
        return Ok(MoidId::ERROR);
    };
    let max = row.len() as i32 - 1;
    let clamped = longs.clamp(0, max);
    let result = row[clamped as usize];
    if clamped != longs {
        diags.report(warning_at(
            ErrorCode::E2009,
            span,
            format!("length not supported, {} is used", program.moid_text(result)),
        ))?;
    }
    Ok(result)
}

/// LONG count of a `LONGETY` or `SHORTETY` node.
pub fn longs_of(program: &Program, p: NodeId) -> i32 {
    let tree = &program.tree;
    let n = tree.children(p).count() as i32;
    if tree.is(p, Attribute::Shortety) {
        -n
    } else {
        n
    }
}

struct Collector<'a> {
    program: &'a mut Program,
    diags: &'a mut DiagnosticQueue,
    /// `FLEX` declarers and their modes, checked once indicants are known.
    flexes: Vec<(NodeId, MoidId)>,
}

impl Collector<'_> {
    fn table_of(&self, p: NodeId) -> TableId {
        self.program.tree[p].table.unwrap_or(TableId::STANDENV)
    }

    /// Record `m` as introduced at `p`.
    fn register(&mut self, p: NodeId, m: MoidId) -> MoidId {
        if !m.is_standard() && self.program.moids[m].node.is_none() {
            self.program.moids[m].node = Some(p);
        }
        let table = self.table_of(p);
        let moids = &mut self.program.tables.table_mut(table).moids;
        if !m.is_standard() && !moids.contains(&m) {
            moids.push(m);
        }
        self.program.tree[p].moid = Some(m);
        m
    }

    fn indicant(&mut self, p: NodeId) {
        let symbol = self.program.tree.symbol(p);
        let m = self.program.moids.indicant(symbol, Some(p));
        if let Some(tag) = self.program.tree[p].tag {
            self.program.tables.tag_mut(tag).moid = Some(m);
        }
        self.register(p, m);
    }

    /// Mode of the declarer at `p`, collecting nested declarers first.
    fn declarer(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        if let Some(m) = self.program.tree[p].moid {
            return Ok(m);
        }
        let children = self.program.tree.child_ids(p);
        let Some(&head) = children.first() else {
            return Ok(self.register(p, MoidId::ERROR));
        };
        let inner = children.last().copied().filter(|&d| self.program.tree.is(d, Attribute::Declarer));
        let sub = match inner {
            Some(d) if d != head => ensure_sufficient_stack(|| self.declarer(d))?,
            _ => MoidId::ERROR,
        };
        let m = match self.program.tree.attribute(head) {
            Attribute::Indicant => {
                let tag = self.program.tree[head].tag;
                tag.and_then(|t| self.program.tables.tag(t).moid).unwrap_or(MoidId::ERROR)
            }
            Attribute::VoidSymbol => MoidId::VOID,
            Attribute::Longety | Attribute::Shortety => {
                let longs = longs_of(self.program, head);
                let span = self.program.tree[head].span;
                lengthen(self.program, sub, longs, span, self.diags)?
            }
            Attribute::RefSymbol => self.program.moids.ref_of(sub),
            Attribute::FlexSymbol => {
                let m = self.program.moids.flex_of(sub);
                self.flexes.push((p, m));
                m
            }
            Attribute::Bounds => {
                let commas = self
                    .program
                    .tree
                    .children(head)
                    .filter(|&c| self.program.tree.is(c, Attribute::CommaSymbol))
                    .count();
                self.program.moids.row_of(sub, commas as i32 + 1)
            }
            Attribute::StructSymbol => self.structure(children.get(1).copied())?,
            Attribute::UnionSymbol => {
                let members = self.pack_declarers(children.get(1).copied())?;
                self.program.moids.union_of(&members)
            }
            Attribute::ProcSymbol => {
                let formals = children
                    .get(1)
                    .copied()
                    .filter(|&f| self.program.tree.is(f, Attribute::FormalDeclarers));
                let params = self.pack_declarers(formals)?;
                self.program.moids.proc_of(&params, sub)
            }
            _ => MoidId::ERROR,
        };
        Ok(self.register(p, m))
    }

    /// Modes of the declarers directly inside a pack.
    fn pack_declarers(&mut self, pack: Option<NodeId>) -> PhaseResult<SmallVec<[MoidId; 8]>> {
        let Some(pack) = pack else {
            return Ok(SmallVec::new());
        };
        let mut out = SmallVec::new();
        for d in self.program.tree.child_ids(pack) {
            if self.program.tree.is(d, Attribute::Declarer) {
                out.push(self.declarer(d)?);
            }
        }
        Ok(out)
    }

    fn structure(&mut self, pack: Option<NodeId>) -> PhaseResult<MoidId> {
        let mut fields: SmallVec<[(MoidId, Name); 8]> = SmallVec::new();
        let mut seen = FxHashSet::default();
        let groups = pack.map(|p| self.program.tree.child_ids(p)).unwrap_or_default();
        for group in groups {
            if !self.program.tree.is(group, Attribute::StructuredField) {
                continue;
            }
            let items = self.program.tree.child_ids(group);
            let Some(&declarer) = items.first() else {
                continue;
            };
            let m = self.declarer(declarer)?;
            let field_ids: Vec<NodeId> =
                items.iter().copied().filter(|&f| self.program.tree.is(f, Attribute::FieldIdentifier)).collect();
            for f in field_ids {
                let name = self.program.tree.symbol(f);
                if !seen.insert(name) {
                    let span = self.program.tree[f].span;
                    let text = self.program.text(f);
                    self.diags.report(error_at(
                        ErrorCode::E2004,
                        span,
                        format!("field \"{text}\" is declared twice in the structure"),
                    ))?;
                }
                self.program.tree[f].moid = Some(m);
                fields.push((m, name));
            }
        }
        Ok(self.program.moids.struct_of(&fields))
    }

    /// `PROC (params) result` of a routine text; binds the parameters.
    fn routine_text(&mut self, p: NodeId) {
        let children = self.program.tree.child_ids(p);
        let mut params: SmallVec<[MoidId; 8]> = SmallVec::new();
        let mut result = MoidId::ERROR;
        for &c in &children {
            match self.program.tree.attribute(c) {
                Attribute::ParameterPack => {
                    for param in self.program.tree.child_ids(c) {
                        if !self.program.tree.is(param, Attribute::Parameter) {
                            continue;
                        }
                        let items = self.program.tree.child_ids(param);
                        let m = items.first().and_then(|&d| self.program.tree[d].moid).unwrap_or(MoidId::ERROR);
                        let ids: Vec<NodeId> = items
                            .iter()
                            .copied()
                            .filter(|&i| self.program.tree.is(i, Attribute::DefiningIdentifier))
                            .collect();
                        for id in ids {
                            self.bind(id, m);
                            params.push(m);
                        }
                    }
                }
                Attribute::Declarer => result = self.program.tree[c].moid.unwrap_or(MoidId::ERROR),
                _ => {}
            }
        }
        let m = self.program.moids.proc_of(&params, result);
        self.register(p, m);
    }

    fn bind(&mut self, id: NodeId, m: MoidId) {
        self.program.tree[id].moid = Some(m);
        if let Some(tag) = self.program.tree[id].tag {
            self.program.tables.tag_mut(tag).moid = Some(m);
        }
    }

    /// Mode of the routine text a source unit consists of.
    fn routine_of(&self, unit: Option<NodeId>) -> Option<MoidId> {
        let tree = &self.program.tree;
        unit.and_then(|u| tree.sub(u))
            .filter(|&r| tree.is(r, Attribute::RoutineText))
            .and_then(|r| tree[r].moid)
    }

    /// Source unit after `id` and its joiner.
    fn source_of(&self, id: NodeId) -> Option<NodeId> {
        let tree = &self.program.tree;
        tree.next(id).and_then(|j| tree.next(j)).filter(|&u| tree.is(u, Attribute::Unit))
    }

    fn declaration(&mut self, p: NodeId) {
        let tree = &self.program.tree;
        let children = tree.child_ids(p);
        let declarer = children.iter().copied().find(|&c| tree.is(c, Attribute::Declarer));
        let declared = declarer.and_then(|d| tree[d].moid).unwrap_or(MoidId::ERROR);
        let defining: SmallVec<[NodeId; 4]> = children
            .iter()
            .copied()
            .filter(|&c| tree.is(c, Attribute::DefiningIdentifier) || tree.is(c, Attribute::DefiningOperator))
            .collect();
        match tree.attribute(p) {
            Attribute::IdentityDeclaration => {
                for id in defining {
                    self.bind(id, declared);
                }
            }
            Attribute::VariableDeclaration => {
                let name = self.program.moids.ref_of(declared);
                self.register(p, name);
                for id in defining {
                    self.bind(id, name);
                }
            }
            Attribute::ProcedureDeclaration | Attribute::BriefOperatorDeclaration => {
                for id in defining {
                    if let Some(m) = self.routine_of(self.source_of(id)) {
                        self.bind(id, m);
                    }
                }
            }
            Attribute::ProcedureVariableDeclaration => {
                for id in defining {
                    if let Some(m) = self.routine_of(self.source_of(id)) {
                        let name = self.program.moids.ref_of(m);
                        self.register(id, name);
                        self.bind(id, name);
                    }
                }
            }
            Attribute::OperatorDeclaration => {
                let plan = children.iter().copied().find(|&c| tree.is(c, Attribute::OperatorPlan));
                let Some(plan) = plan else {
                    return;
                };
                let plan_children = tree.child_ids(plan);
                let formals = plan_children
                    .iter()
                    .copied()
                    .find(|&c| tree.is(c, Attribute::FormalDeclarers))
                    .map(|f| {
                        tree.children(f)
                            .filter(|&d| tree.is(d, Attribute::Declarer))
                            .map(|d| tree[d].moid.unwrap_or(MoidId::ERROR))
                            .collect::<SmallVec<[MoidId; 2]>>()
                    })
                    .unwrap_or_default();
                let result = plan_children
                    .iter()
                    .copied()
                    .rev()
                    .find(|&c| tree.is(c, Attribute::Declarer))
                    .and_then(|d| tree[d].moid)
                    .unwrap_or(MoidId::ERROR);
                let m = self.program.moids.proc_of(&formals, result);
                self.register(plan, m);
                for id in defining {
                    self.bind(id, m);
                }
            }
            Attribute::Specifier => {
                self.program.tree[p].moid = Some(declared);
                for id in defining {
                    self.bind(id, declared);
                }
            }
            _ => {}
        }
    }

    /// Definition an indicant placeholder stands for, following chains of
    /// indicants. `None` for a chain that never reaches a declarer.
    fn resolve_indicant(&self, mut m: MoidId) -> Option<MoidId> {
        let mut seen = FxHashSet::default();
        while self.program.moids.is(m, MoidKind::Indicant) {
            if !seen.insert(m) {
                return None;
            }
            m = indicant_body(self.program, m)?;
        }
        Some(m)
    }

    fn check_flexes(&mut self) -> PhaseResult {
        for (p, flex) in std::mem::take(&mut self.flexes) {
            let sub = self.program.moids.sub(flex);
            let Some(row) = self.resolve_indicant(sub) else {
                continue;
            };
            if matches!(self.program.moids.kind(row), MoidKind::Row | MoidKind::Error) {
                continue;
            }
            let span = self.program.tree[p].span;
            let text = self.program.moid_text(row);
            self.program.tree[p].moid = Some(MoidId::ERROR);
            self.diags
                .report(error_at(ErrorCode::E2003, span, format!("FLEX must be followed by a row, not {text}")))?;
        }
        Ok(())
    }
}

/// Mode of the declarer an indicant placeholder was declared with.
pub fn indicant_body(program: &Program, m: MoidId) -> Option<MoidId> {
    let defining = program.moids[m].node?;
    let tag: TagId = program.tree[defining].tag?;
    let body = program.tables.tag(tag).body?;
    program.tree[body].moid
}
