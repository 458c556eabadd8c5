//! The mode checker.
//!
//! Walks the program top-down with the soid of each position. Every phrase
//! gets its a priori mode; every unit whose a priori mode differs from what
//! its position demands gets a [`Coercion`], applied later by
//! [`crate::insert`].
//!
//! A position whose mode is not fixed by its context (an operand, the
//! destination of an assignation, a branch of a balanced clause) is checked
//! with an unknown soid first. Once the operator, the name or the balanced
//! mode is known, [`Checker::settle`] pushes the final mode down to the
//! units that yield the value.

mod clauses;
mod declarations;
mod formulae;
mod units;

use a68_diagnostic::{error_at, warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, MoidId, MoidKind, NodeId, Program, Status, TableId, TagId};
use a68_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::coercion::{coercion_path, Path};
use crate::derive;
use crate::soid::{Deflexing, Soid, Sort};

/// Coercions to wrap around one unit, innermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coercion {
    pub node: NodeId,
    pub path: Path,
    /// The unit is the clause of a cast.
    pub cast: bool,
}

/// Wrappers that pass their only child's value through.
pub(crate) const WRAPPERS: &[Attribute] = &[
    Attribute::Unit,
    Attribute::Tertiary,
    Attribute::Secondary,
    Attribute::Primary,
    Attribute::EnclosedClause,
];

/// Check the modes of the program at `top`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult<Vec<Coercion>> {
    let mut checker = Checker {
        program,
        diags,
        coercions: Vec::new(),
        initialising: Vec::new(),
        defining_operators: Vec::new(),
    };
    if let Some(serial) = checker.program.tree.find_child(top, Attribute::SerialClause) {
        checker.serial(serial, Soid::strong(MoidId::VOID))?;
    }
    checker.program.tree[top].moid = Some(MoidId::VOID);
    let coercions = checker.coercions;
    tracing::debug!(coercions = coercions.len(), "mode check complete");
    Ok(coercions)
}

pub(crate) struct Checker<'a> {
    pub(crate) program: &'a mut Program,
    pub(crate) diags: &'a mut DiagnosticQueue,
    coercions: Vec<Coercion>,
    /// Tags whose declaration is being checked, with the routine text
    /// their source stands in.
    initialising: Vec<(TagId, Option<NodeId>)>,
    /// Operators whose own source is being checked; formulae there see
    /// the operators of the enclosing ranges.
    defining_operators: Vec<TagId>,
}

impl Checker<'_> {
    pub(crate) fn attr(&self, p: NodeId) -> Attribute {
        self.program.tree.attribute(p)
    }

    pub(crate) fn children(&self, p: NodeId) -> SmallVec<[NodeId; 8]> {
        self.program.tree.child_ids(p)
    }

    pub(crate) fn canonical(&self, m: MoidId) -> MoidId {
        self.program.moids.canonical(m)
    }

    pub(crate) fn table_of(&self, p: NodeId) -> TableId {
        self.program.tree[p].table.unwrap_or(TableId::STANDENV)
    }

    pub(crate) fn text(&self, m: MoidId) -> String {
        self.program.moid_text(m)
    }

    pub(crate) fn set_moid(&mut self, p: NodeId, m: MoidId) {
        self.program.tree[p].moid = Some(m);
    }

    /// Mode after `make`, with derived forms in place for new modes.
    pub(crate) fn fresh(&mut self, make: impl FnOnce(&mut a68_ir::MoidArena) -> MoidId) -> MoidId {
        let before = self.program.moids.len();
        let m = make(&mut self.program.moids);
        if self.program.moids.len() > before {
            let new: SmallVec<[MoidId; 4]> = self.program.moids.ids().skip(before).collect();
            for n in new {
                derive::derive(&mut self.program.moids, n);
            }
        }
        self.canonical(m)
    }

    pub(crate) fn ref_of(&mut self, m: MoidId) -> MoidId {
        self.fresh(|moids| moids.ref_of(m))
    }

    pub(crate) fn row_of(&mut self, m: MoidId, dim: i32) -> MoidId {
        self.fresh(|moids| moids.row_of(m, dim))
    }

    /// Report `diag` once per node.
    pub(crate) fn error(&mut self, p: NodeId, code: ErrorCode, message: impl Into<String>) -> PhaseResult {
        if self.program.tree[p].status.contains(Status::ERROR) {
            return Ok(());
        }
        self.program.tree[p].status |= Status::ERROR;
        let span = self.program.tree[p].span;
        self.diags.report(error_at(code, span, message))
    }

    pub(crate) fn warning(&mut self, p: NodeId, code: ErrorCode, message: impl Into<String>) -> PhaseResult {
        let span = self.program.tree[p].span;
        self.diags.report(warning_at(code, span, message))
    }

    /// Check unit `p` in a position described by `soid`.
    ///
    /// Returns the mode the unit has in that position: the demanded mode
    /// when the soid is known, the a priori mode otherwise.
    pub(crate) fn unit(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        let yielded = ensure_sufficient_stack(|| self.phrase(p, soid))?;
        self.set_moid(p, yielded);
        self.coerce(p, yielded, soid)
    }

    /// A priori mode of the phrase at `p`.
    fn phrase(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        use Attribute as A;
        let attr = self.attr(p);
        if WRAPPERS.contains(&attr) {
            let Some(inner) = self.program.tree.sub(p) else {
                return Ok(MoidId::ERROR);
            };
            let m = ensure_sufficient_stack(|| self.phrase(inner, soid))?;
            self.set_moid(inner, m);
            return Ok(m);
        }
        match attr {
            A::Identifier => self.identifier(p),
            A::Denotation => self.denotation(p),
            A::Cast => self.cast(p),
            A::Generator => self.generator(p),
            A::Specification | A::Call | A::Slice => self.specification(p),
            A::Selection => self.selection(p),
            A::Formula => self.formula(p),
            A::MonadicFormula => self.monadic_formula(p),
            A::Nihil => Ok(MoidId::HIP),
            A::Skip => Ok(MoidId::HIP),
            A::Jump => Ok(MoidId::HIP),
            A::Assignation => self.assignation(p),
            A::IdentityRelation => self.identity_relation(p),
            A::RoutineText => self.routine_text(p),
            A::FormatText => self.format_text(p),
            A::ClosedClause => self.closed(p, soid),
            A::CollateralClause => self.collateral(p, soid),
            A::ParallelClause => self.parallel(p),
            A::ConditionalClause | A::ElifClause => self.conditional(p, soid),
            A::IntegerCaseClause | A::UnitedCaseClause | A::OuseClause => self.case_clause(p, soid),
            A::LoopClause => self.loop_clause(p),
            A::SerialClause => self.serial(p, soid),
            A::LabeledUnit => match self.program.tree.sub(p) {
                Some(first) => {
                    let u = self.program.tree.last_sibling(first);
                    self.unit(u, soid)
                }
                None => Ok(MoidId::ERROR),
            },
            _ => Ok(MoidId::ERROR),
        }
    }

    /// The phrase a unit consists of, below its wrappers.
    pub(crate) fn inner(&self, p: NodeId) -> NodeId {
        self.program.tree.descend(p, WRAPPERS)
    }

    /// Record the coercions from `from` to the mode `soid` demands.
    pub(crate) fn coerce(&mut self, p: NodeId, from: MoidId, soid: Soid) -> PhaseResult<MoidId> {
        if !soid.is_known() {
            return Ok(from);
        }
        let to = self.canonical(soid.moid);
        let from = self.canonical(from);
        if from == MoidId::ERROR || to == MoidId::ERROR {
            return Ok(to);
        }
        if from == MoidId::HIP {
            self.adapt(p, to)?;
            return Ok(to);
        }
        let inner = self.inner(p);
        let path = if to == MoidId::VOID && self.program.tree.is(inner, Attribute::RoutineText) {
            let mut path = Path::new();
            path.push(crate::coercion::Step {
                attribute: Attribute::Voiding,
                to: MoidId::VOID,
            });
            Some(path)
        } else {
            coercion_path(&self.program.moids, from, to, soid.sort, Deflexing::SafeDeflexing)
        };
        match path {
            Some(path) => {
                if !path.is_empty() {
                    self.coercions.push(Coercion {
                        node: p,
                        path,
                        cast: soid.cast,
                    });
                }
            }
            None => self.cannot_coerce(p, from, soid)?,
        }
        Ok(to)
    }

    fn cannot_coerce(&mut self, p: NodeId, from: MoidId, soid: Soid) -> PhaseResult {
        if from == MoidId::VOID {
            return self.error(
                p,
                ErrorCode::E3015,
                format!("clause yields no value where {} is expected", self.text(soid.moid)),
            );
        }
        let message = format!(
            "{} cannot be coerced to {} in a {} position",
            self.text(from),
            self.text(soid.moid),
            soid.sort
        );
        self.error(p, ErrorCode::E3001, message)
    }

    /// SKIP, NIL and jumps take the mode of their position.
    fn adapt(&mut self, p: NodeId, to: MoidId) -> PhaseResult {
        let inner = self.inner(p);
        if self.program.tree.is(inner, Attribute::Nihil) && to != MoidId::VOID && !self.program.moids.is(to, MoidKind::Ref) {
            return self.error(inner, ErrorCode::E3001, format!("NIL cannot be coerced to {}", self.text(to)));
        }
        // A jump where a PROC VOID is wanted becomes a procedure doing the jump.
        if self.program.tree.is(inner, Attribute::Jump) && to == self.canonical(MoidId::PROC_VOID) {
            let mut path = Path::new();
            path.push(crate::coercion::Step {
                attribute: Attribute::Proceduring,
                to,
            });
            self.coercions.push(Coercion { node: p, path, cast: false });
        }
        let mut q = p;
        loop {
            self.set_moid(q, to);
            if q == inner {
                break;
            }
            match self.program.tree.sub(q) {
                Some(s) => q = s,
                None => break,
            }
        }
        Ok(())
    }

    /// Give the units yielding the value of `p` the mode `soid` demands.
    ///
    /// `p` was checked with an unknown soid. Inside a balanced clause the
    /// yielding units stand in strong positions.
    pub(crate) fn settle(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        self.settle_in(p, soid, false)
    }

    pub(super) fn settle_in(&mut self, p: NodeId, soid: Soid, balanced: bool) -> PhaseResult<MoidId> {
        if !soid.is_known() {
            return Ok(self.program.tree[p].moid.unwrap_or(MoidId::ERROR));
        }
        let inner = self.inner(p);
        let sites = self.yield_sites(inner);
        if sites.is_empty() {
            let from = self.program.tree[p].moid.unwrap_or(MoidId::ERROR);
            let soid = if balanced { Soid { sort: Sort::Strong, ..soid } } else { soid };
            return self.coerce(p, from, soid);
        }
        let balanced = balanced || sites.len() > 1;
        for site in sites {
            ensure_sufficient_stack(|| self.settle_in(site, soid, balanced))?;
        }
        let to = self.canonical(soid.moid);
        let mut q = p;
        loop {
            self.set_moid(q, to);
            if q == inner {
                break;
            }
            match self.program.tree.sub(q) {
                Some(s) => q = s,
                None => break,
            }
        }
        Ok(to)
    }

    /// Units whose value a clause yields; empty for anything but a clause
    /// that passes a unit's value through.
    pub(crate) fn yield_sites(&self, p: NodeId) -> SmallVec<[NodeId; 4]> {
        use Attribute as A;
        let tree = &self.program.tree;
        let mut sites = SmallVec::new();
        match tree.attribute(p) {
            A::ClosedClause => {
                if let Some(serial) = tree.find_child(p, A::SerialClause) {
                    sites.push(serial);
                }
            }
            A::SerialClause => {
                let items = tree.child_ids(p);
                for (i, &item) in items.iter().enumerate() {
                    let last = i + 1 == items.len();
                    let before_exit = items.get(i + 1).is_some_and(|&s| tree.is(s, A::ExitSymbol));
                    if (last || before_exit) && !tree.is(item, A::DeclarationList) {
                        sites.push(item);
                    }
                }
            }
            A::LabeledUnit => sites.extend(tree.sub(p).map(|first| tree.last_sibling(first))),
            A::ConditionalClause | A::ElifClause | A::IntegerCaseClause | A::UnitedCaseClause | A::OuseClause => {
                for part in tree.children(p) {
                    match tree.attribute(part) {
                        A::ThenPart | A::ElsePart | A::OutPart => sites.extend(tree.find_child(part, A::SerialClause)),
                        A::ElifClause | A::OuseClause => sites.push(part),
                        A::InPart => {
                            for item in tree.children(part) {
                                match tree.attribute(item) {
                                    A::Unit => sites.push(item),
                                    A::SpecifiedUnit => sites.extend(tree.find_child(item, A::Unit)),
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        sites
    }

    /// Balance the a priori modes of `sites`, reporting at `p` when no
    /// mode fits them all.
    pub(crate) fn balance(&mut self, p: NodeId, modes: &[MoidId], sort: Sort) -> PhaseResult<MoidId> {
        if modes.iter().any(|&m| self.canonical(m) == MoidId::ERROR) {
            return Ok(MoidId::ERROR);
        }
        match crate::coercion::balance(&self.program.moids, modes, sort) {
            Some(m) => Ok(m),
            None => {
                let listed: Vec<String> = modes.iter().map(|&m| self.text(m)).collect();
                self.error(
                    p,
                    ErrorCode::E3011,
                    format!("no unique mode balances {}", listed.join(", ")),
                )?;
                Ok(MoidId::ERROR)
            }
        }
    }

    /// Start checking the source of a declaration of `tag`.
    pub(crate) fn initialise(&mut self, tag: Option<TagId>, source: NodeId) {
        if let Some(tag) = tag {
            let nest = self.program.tree[source].nest;
            self.initialising.push((tag, nest));
        }
    }

    pub(crate) fn initialised(&mut self, tag: Option<TagId>) {
        if tag.is_some() {
            self.initialising.pop();
        }
    }

    /// Whether `id`, applying `tag`, stands in its own declaration outside
    /// any routine text of the source.
    pub(crate) fn is_uninitialised(&self, id: NodeId, tag: TagId) -> bool {
        let nest = self.program.tree[id].nest;
        self.initialising.iter().any(|&(t, n)| t == tag && n == nest)
    }
}

#[cfg(test)]
mod tests;
