//! Units that are not clauses or formulae.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Attribute, MoidArena, MoidId, MoidKind, NodeId, Status};
use a68_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use super::Checker;
use crate::coercion::is_coercible;
use crate::collect::{lengthen, longs_of};
use crate::derive;
use crate::soid::{Deflexing, Soid, Sort};

impl Checker<'_> {
    pub(super) fn identifier(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let Some(tag) = self.program.tree[p].tag else {
            return Ok(MoidId::ERROR);
        };
        if self.is_uninitialised(p, tag) {
            self.program.tree[p].status |= Status::UNINITIALISED;
            let text = self.program.text(p);
            self.warning(
                p,
                ErrorCode::E5004,
                format!("identifier \"{text}\" is used before it is initialised"),
            )?;
        }
        let m = self.program.tables.tag(tag).moid.unwrap_or(MoidId::ERROR);
        Ok(self.canonical(m))
    }

    pub(super) fn denotation(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let mut longs = 0;
        let mut base = MoidId::ERROR;
        for c in self.children(p) {
            base = match self.attr(c) {
                Attribute::Longety | Attribute::Shortety => {
                    longs = longs_of(self.program, c);
                    continue;
                }
                Attribute::IntDenotation => MoidId::INT,
                Attribute::RealDenotation => MoidId::REAL,
                Attribute::BitsDenotation => MoidId::BITS,
                Attribute::RowCharDenotation if self.program.text(c).chars().count() == 1 => MoidId::CHAR,
                Attribute::RowCharDenotation => MoidId::ROW_CHAR,
                Attribute::TrueSymbol | Attribute::FalseSymbol => MoidId::BOOL,
                Attribute::EmptySymbol => MoidId::VOID,
                _ => MoidId::ERROR,
            };
        }
        let span = self.program.tree[p].span;
        let m = lengthen(self.program, base, longs, span, self.diags)?;
        if let Some(int) = self.program.tree.find_child(p, Attribute::IntDenotation) {
            let text = self.program.text(int);
            let fits = match m {
                MoidId::INT => text.parse::<i64>().is_ok(),
                MoidId::LONG_INT => text.parse::<i128>().is_ok(),
                _ => true,
            };
            if !fits {
                let wanted = self.text(m);
                self.error(p, ErrorCode::E0005, format!("denotation {text} is out of range for {wanted}"))?;
                return Ok(MoidId::ERROR);
            }
        }
        Ok(m)
    }

    pub(super) fn cast(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let (Some(&declarer), Some(&clause)) = (children.first(), children.get(1)) else {
            return Ok(MoidId::ERROR);
        };
        self.bounds(declarer)?;
        let m = self.declarer_mode(declarer);
        self.unit(clause, Soid::strong(m).as_cast())?;
        Ok(m)
    }

    pub(super) fn generator(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let Some(declarer) = self.program.tree.find_child(p, Attribute::Declarer) else {
            return Ok(MoidId::ERROR);
        };
        self.bounds(declarer)?;
        let m = self.declarer_mode(declarer);
        if m == MoidId::ERROR {
            return Ok(m);
        }
        Ok(self.ref_of(m))
    }

    pub(crate) fn declarer_mode(&self, declarer: NodeId) -> MoidId {
        self.canonical(self.program.tree[declarer].moid.unwrap_or(MoidId::ERROR))
    }

    /// Check the bound units of an actual declarer.
    pub(crate) fn bounds(&mut self, declarer: NodeId) -> PhaseResult {
        for c in self.children(declarer) {
            match self.attr(c) {
                Attribute::Bound => {
                    for u in self.children(c) {
                        if self.program.tree.is(u, Attribute::Unit) {
                            self.unit(u, Soid::meek(MoidId::INT))?;
                        }
                    }
                }
                Attribute::Unit | Attribute::RoutineText => {}
                _ => ensure_sufficient_stack(|| self.bounds(c))?,
            }
        }
        Ok(())
    }

    /// Follow deproceduring and dereferencing from `m` until `want` holds.
    ///
    /// With `keep_name`, a name of a wanted mode is returned as it is.
    pub(crate) fn strip(&self, mut m: MoidId, keep_name: bool, want: impl Fn(&MoidArena, MoidId) -> bool) -> Option<MoidId> {
        let moids = &self.program.moids;
        for _ in 0..moids.len() {
            m = moids.canonical(m);
            if want(moids, m) {
                return Some(m);
            }
            if keep_name && moids.is(m, MoidKind::Ref) && want(moids, moids.canonical(moids.sub(m))) {
                return Some(m);
            }
            if !moids.is_deprefable(m) {
                return None;
            }
            m = moids.sub(m);
        }
        None
    }

    /// `f (x)` or `a [i]`: which one depends on the mode of the primary.
    pub(super) fn specification(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let (Some(&primary), Some(&argument)) = (children.first(), children.get(1)) else {
            return Ok(MoidId::ERROR);
        };
        let m = self.unit(primary, Soid::unknown(Sort::Weak))?;
        if m == MoidId::ERROR {
            self.arguments_unchecked(argument)?;
            return Ok(MoidId::ERROR);
        }
        let is_row = |moids: &MoidArena, x: MoidId| matches!(moids.kind(x), MoidKind::Row | MoidKind::Flex);
        let is_call = |moids: &MoidArena, x: MoidId| moids.is(x, MoidKind::Proc) && !moids[x].pack.is_empty();
        if let Some(row) = self.strip(m, true, is_row) {
            self.slice(p, primary, argument, row)
        } else if let Some(proc) = self.strip(m, false, is_call) {
            self.call(p, primary, argument, proc)
        } else {
            self.arguments_unchecked(argument)?;
            let text = self.text(m);
            self.error(p, ErrorCode::E3007, format!("{text} is neither a row nor a procedure"))?;
            Ok(MoidId::ERROR)
        }
    }

    /// Units of an argument list whose primary has no usable mode.
    fn arguments_unchecked(&mut self, argument: NodeId) -> PhaseResult {
        for item in self.children(argument) {
            match self.attr(item) {
                Attribute::Unit => {
                    self.unit(item, Soid::unknown(Sort::Strong))?;
                }
                Attribute::Trimmer => {
                    for u in self.children(item) {
                        if self.program.tree.is(u, Attribute::Unit) {
                            self.unit(u, Soid::meek(MoidId::INT))?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn slice(&mut self, p: NodeId, primary: NodeId, indexer: NodeId, target: MoidId) -> PhaseResult<MoidId> {
        self.program.tree[p].attribute = Attribute::Slice;
        self.program.tree[indexer].attribute = Attribute::Indexer;
        self.settle(primary, Soid::new(Sort::Weak, target))?;

        let moids = &self.program.moids;
        let is_name = moids.is(target, MoidKind::Ref);
        let row = if is_name { moids.canonical(moids.sub(target)) } else { target };
        let flex = moids.is(row, MoidKind::Flex);
        let row = if flex { moids.canonical(moids.sub(row)) } else { row };
        let dim = moids[row].dim;
        let element = moids.canonical(moids.sub(row));

        let mut subscripts = 0;
        let mut trimmers = 0;
        for item in self.children(indexer) {
            match self.attr(item) {
                Attribute::Unit => {
                    subscripts += 1;
                    self.unit(item, Soid::meek(MoidId::INT))?;
                }
                Attribute::Trimmer => {
                    trimmers += 1;
                    for u in self.children(item) {
                        if self.program.tree.is(u, Attribute::Unit) {
                            self.unit(u, Soid::meek(MoidId::INT))?;
                        }
                    }
                }
                _ => {}
            }
        }
        if subscripts + trimmers != dim {
            let text = self.text(target);
            let given = subscripts + trimmers;
            self.error(
                indexer,
                ErrorCode::E3013,
                format!("{text} has {dim} dimensions but {given} indexers are given"),
            )?;
            return Ok(MoidId::ERROR);
        }
        let value = if trimmers == 0 { element } else { self.row_of(element, trimmers) };
        if !is_name {
            return Ok(value);
        }
        if flex {
            self.program.tree[p].status |= Status::TRANSIENT;
        }
        Ok(self.ref_of(value))
    }

    fn call(&mut self, p: NodeId, primary: NodeId, argument: NodeId, proc: MoidId) -> PhaseResult<MoidId> {
        self.program.tree[p].attribute = Attribute::Call;
        self.program.tree[argument].attribute = Attribute::Argument;
        self.settle(primary, Soid::meek(proc))?;
        let params: SmallVec<[MoidId; 8]> = self.program.moids[proc].pack.iter().map(|e| e.moid).collect();
        let units: SmallVec<[NodeId; 8]> = self
            .children(argument)
            .into_iter()
            .filter(|&u| self.program.tree.is(u, Attribute::Unit))
            .collect();
        if units.len() != params.len() {
            let text = self.text(proc);
            self.error(
                argument,
                ErrorCode::E3010,
                format!("{text} takes {} arguments but {} are given", params.len(), units.len()),
            )?;
            for u in units {
                self.unit(u, Soid::unknown(Sort::Strong))?;
            }
            return Ok(MoidId::ERROR);
        }
        for (u, param) in units.into_iter().zip(params) {
            self.unit(u, Soid::strong(param))?;
        }
        Ok(self.canonical(self.program.moids.sub(proc)))
    }

    /// `field OF secondary`, also on rows of structures.
    pub(super) fn selection(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let (Some(&field), Some(&secondary)) = (children.first(), children.last()) else {
            return Ok(MoidId::ERROR);
        };
        let m = self.unit(secondary, Soid::unknown(Sort::Weak))?;
        if m == MoidId::ERROR {
            return Ok(m);
        }
        let selectable = |moids: &MoidArena, x: MoidId| {
            let row = moids.canonical(moids.deflex(x));
            let row = if moids.is(row, MoidKind::Flex) { moids.canonical(moids.sub(row)) } else { row };
            moids.is(x, MoidKind::Struct)
                || (moids.is(row, MoidKind::Row) && moids.is(moids.canonical(moids.sub(row)), MoidKind::Struct))
        };
        let Some(target) = self.strip(m, true, selectable) else {
            let text = self.text(m);
            self.error(p, ErrorCode::E3005, format!("{text} is not a structure"))?;
            return Ok(MoidId::ERROR);
        };
        self.settle(secondary, Soid::new(Sort::Weak, target))?;

        let is_name = self.program.moids.is(target, MoidKind::Ref);
        let value = if is_name { self.canonical(self.program.moids.sub(target)) } else { target };
        let flex = self.program.moids.is(value, MoidKind::Flex);
        let (structure, names_inside) = if self.program.moids.is(value, MoidKind::Struct) {
            (value, false)
        } else {
            match self.fresh(|moids| derive::multiple(moids, target).unwrap_or(MoidId::ERROR)) {
                MoidId::ERROR => return Ok(MoidId::ERROR),
                multiple => (multiple, is_name),
            }
        };
        let name = self.program.tree.symbol(field);
        let found = self.program.moids[structure]
            .pack
            .iter()
            .find(|e| e.text == Some(name))
            .map(|e| e.moid);
        let Some(f) = found else {
            let text = self.text(structure);
            let field_text = self.program.text(field);
            self.error(field, ErrorCode::E3006, format!("{text} has no field \"{field_text}\""))?;
            return Ok(MoidId::ERROR);
        };
        let f = self.canonical(f);
        self.set_moid(field, f);
        if !is_name || names_inside {
            return Ok(f);
        }
        if flex {
            self.program.tree[p].status |= Status::TRANSIENT;
        }
        Ok(self.ref_of(f))
    }

    pub(super) fn assignation(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let (Some(&destination), Some(&source)) = (children.first(), children.last()) else {
            return Ok(MoidId::ERROR);
        };
        let m = self.unit(destination, Soid::unknown(Sort::Soft))?;
        let name = if m == MoidId::ERROR {
            None
        } else {
            self.strip_soft(m)
        };
        let Some(name) = name else {
            if m != MoidId::ERROR {
                let text = self.text(m);
                self.error(destination, ErrorCode::E3004, format!("{text} is not a name and cannot be assigned to"))?;
            }
            self.unit(source, Soid::unknown(Sort::Strong))?;
            return Ok(MoidId::ERROR);
        };
        self.settle(destination, Soid::new(Sort::Soft, name))?;
        let value = self.canonical(self.program.moids.sub(name));
        self.unit(source, Soid::strong(value))?;
        Ok(name)
    }

    /// Name reached from `m` by deproceduring alone.
    fn strip_soft(&self, m: MoidId) -> Option<MoidId> {
        let moids = &self.program.moids;
        let mut x = moids.canonical(m);
        for _ in 0..moids.len() {
            if !moids.is_proc_void_args(x) {
                break;
            }
            x = moids.canonical(moids.sub(x));
        }
        moids.is(x, MoidKind::Ref).then_some(x)
    }

    /// `a :=: b`: one side is soft, the other strong, and the two meet at
    /// a name.
    pub(super) fn identity_relation(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let (Some(&lhs), Some(&rhs)) = (children.first(), children.last()) else {
            return Ok(MoidId::BOOL);
        };
        let a = self.unit(lhs, Soid::unknown(Sort::Soft))?;
        let b = self.unit(rhs, Soid::unknown(Sort::Soft))?;
        if a == MoidId::ERROR || b == MoidId::ERROR {
            return Ok(MoidId::BOOL);
        }
        let (ra, rb) = (self.strip_soft(a), self.strip_soft(b));
        let coercible = |checker: &Self, from: MoidId, to: MoidId| {
            is_coercible(&checker.program.moids, from, to, Sort::Strong, Deflexing::SafeDeflexing)
        };
        let choice = match (ra, rb) {
            (Some(ra), _) if coercible(self, b, ra) => Some((ra, Sort::Soft, Sort::Strong)),
            (_, Some(rb)) if coercible(self, a, rb) => Some((rb, Sort::Strong, Sort::Soft)),
            _ => None,
        };
        match choice {
            Some((name, left, right)) => {
                self.settle(lhs, Soid::new(left, name))?;
                self.settle(rhs, Soid::new(right, name))?;
            }
            None => {
                let message = format!(
                    "{} and {} cannot be compared for identity",
                    self.text(a),
                    self.text(b)
                );
                self.error(p, ErrorCode::E3001, message)?;
            }
        }
        Ok(MoidId::BOOL)
    }

    pub(super) fn routine_text(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let m = self.canonical(self.program.tree[p].moid.unwrap_or(MoidId::ERROR));
        let result = if self.program.moids.is(m, MoidKind::Proc) {
            self.canonical(self.program.moids.sub(m))
        } else {
            MoidId::ERROR
        };
        if let Some(body) = self.children(p).into_iter().rev().find(|&c| self.program.tree.is(c, Attribute::Unit)) {
            self.unit(body, Soid::strong(result))?;
        }
        Ok(m)
    }

    /// Replicators of a format text are meek integers.
    pub(super) fn format_text(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        self.replicators(p)?;
        Ok(MoidId::FORMAT)
    }

    fn replicators(&mut self, p: NodeId) -> PhaseResult {
        for q in self.children(p) {
            if self.attr(q) != Attribute::DynamicReplicator {
                ensure_sufficient_stack(|| self.replicators(q))?;
                continue;
            }
            if let Some(clause) = self.children(q).into_iter().find(|&c| self.attr(c) != Attribute::FormatItem) {
                self.unit(clause, Soid::meek(MoidId::INT))?;
            }
        }
        Ok(())
    }
}
