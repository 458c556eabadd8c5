//! Formulae and operator identification.
//!
//! Operands stand in firm positions. The innermost range declaring an
//! operator of that symbol whose parameters accept the operands firmly
//! wins. Failing that, a second search admits strong coercion of the
//! operands, so `1 + 2.0` finds the REAL operator by widening. Inside
//! its own declaration an operator is not yet visible.
//!
//! When no operator fits, the vector and matrix operators of the standard
//! environ say what is wrong with a row operand: its dimensions or its
//! components.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{MoidId, MoidKind, Name, NodeId, TableId, TagId};
use smallvec::SmallVec;

use super::Checker;
use crate::coercion::is_coercible;
use crate::soid::{Deflexing, Soid, Sort};

impl Checker<'_> {
    pub(super) fn formula(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let [lhs, op, rhs] = children.as_slice() else {
            return Ok(MoidId::ERROR);
        };
        let a = self.unit(*lhs, Soid::unknown(Sort::Firm))?;
        let b = self.unit(*rhs, Soid::unknown(Sort::Firm))?;
        self.operate(*op, &[(*lhs, a), (*rhs, b)])
    }

    pub(super) fn monadic_formula(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        let children = self.children(p);
        let [op, operand] = children.as_slice() else {
            return Ok(MoidId::ERROR);
        };
        let a = self.unit(*operand, Soid::unknown(Sort::Firm))?;
        self.operate(*op, &[(*operand, a)])
    }

    fn operate(&mut self, op: NodeId, operands: &[(NodeId, MoidId)]) -> PhaseResult<MoidId> {
        if operands.iter().any(|&(_, m)| m == MoidId::ERROR) {
            return Ok(MoidId::ERROR);
        }
        if let Some(&(node, _)) = operands.iter().find(|&&(_, m)| m == MoidId::VOID) {
            let text = self.program.text(op);
            self.error(node, ErrorCode::E3014, format!("operand of \"{text}\" yields no value"))?;
            return Ok(MoidId::ERROR);
        }
        let table = self.table_of(op);
        let name = self.program.tree.symbol(op);
        let modes: SmallVec<[MoidId; 2]> = operands.iter().map(|&(_, m)| m).collect();
        let found = self
            .find_operator(table, name, &modes, Sort::Firm)
            .map(|tag| (tag, Sort::Firm))
            .or_else(|| self.find_operator(table, name, &modes, Sort::Strong).map(|tag| (tag, Sort::Strong)));
        let Some((tag, sort)) = found else {
            return self.no_operator(op, &modes);
        };
        let m = self.canonical(self.program.tables.tag(tag).moid.unwrap_or(MoidId::ERROR));
        self.program.tree[op].tag = Some(tag);
        self.set_moid(op, m);
        self.program.tables.tag_mut(tag).used = true;
        let params: SmallVec<[MoidId; 2]> = self.program.moids[m].pack.iter().map(|e| e.moid).collect();
        for (&(node, _), param) in operands.iter().zip(params) {
            self.settle(node, Soid::new(sort, param))?;
        }
        Ok(self.canonical(self.program.moids.sub(m)))
    }

    /// Operator `name` visible from `table` taking `modes` in positions of
    /// `sort`.
    pub(crate) fn find_operator(&self, table: TableId, name: Name, modes: &[MoidId], sort: Sort) -> Option<TagId> {
        let tables = &self.program.tables;
        let moids = &self.program.moids;
        tables.chain(table).find_map(|t| {
            tables.operators_named(t, name).find(|&tag| {
                if self.defining_operators.contains(&tag) {
                    return false;
                }
                let Some(m) = tables.tag(tag).moid.map(|m| moids.canonical(m)) else {
                    return false;
                };
                moids.is(m, MoidKind::Proc)
                    && moids[m].pack.len() == modes.len()
                    && moids[m]
                        .pack
                        .iter()
                        .zip(modes)
                        .all(|(param, &x)| is_coercible(moids, x, param.moid, sort, Deflexing::SafeDeflexing))
            })
        })
    }

    fn no_operator(&mut self, op: NodeId, modes: &[MoidId]) -> PhaseResult<MoidId> {
        let text = self.program.text(op);
        if let Some((code, message)) = self.row_mismatch(op, modes) {
            self.error(op, code, message)?;
            return Ok(MoidId::ERROR);
        }
        let listed: Vec<String> = modes.iter().map(|&m| self.text(m)).collect();
        let (code, message) = match listed.as_slice() {
            [a] => (ErrorCode::E3002, format!("monadic operator \"{text}\" is not defined for {a}")),
            _ => (
                ErrorCode::E3003,
                format!("dyadic operator \"{text}\" is not defined for {}", listed.join(" and ")),
            ),
        };
        self.error(op, code, message)?;
        Ok(MoidId::ERROR)
    }

    /// What keeps the operands from the closest standard vector or matrix
    /// operator of this symbol. Operands that are not rows at all, or
    /// that miss a scalar parameter, rule an operator out.
    fn row_mismatch(&self, op: NodeId, modes: &[MoidId]) -> Option<(ErrorCode, String)> {
        let tables = &self.program.tables;
        let moids = &self.program.moids;
        let name = self.program.tree.symbol(op);
        let text = self.program.text(op);
        let mut closest: Option<(usize, ErrorCode, String)> = None;
        for tag in tables.operators_named(TableId::STANDENV, name) {
            let Some(m) = tables.tag(tag).moid.map(|m| moids.canonical(m)) else {
                continue;
            };
            if !moids.is(m, MoidKind::Proc) || moids[m].pack.len() != modes.len() {
                continue;
            }
            let params: SmallVec<[MoidId; 2]> = moids[m].pack.iter().map(|e| moids.canonical(e.moid)).collect();
            if !params.iter().any(|&param| self.is_real_row(param)) {
                continue;
            }
            let mut misses: SmallVec<[(ErrorCode, String); 2]> = SmallVec::new();
            let fits = params.iter().zip(modes).all(|(&param, &x)| {
                if !self.is_real_row(param) {
                    return is_coercible(moids, x, param, Sort::Strong, Deflexing::SafeDeflexing);
                }
                let Some((element, dim)) = self.row_shape(x) else {
                    return false;
                };
                let shown = self.text(x);
                if dim != moids[param].dim {
                    misses.push(match moids[param].dim {
                        1 => (ErrorCode::E3009, format!("operand {shown} of \"{text}\" is not a vector")),
                        _ => (ErrorCode::E3008, format!("operand {shown} of \"{text}\" is not a matrix")),
                    });
                } else if element != moids.canonical(moids.sub(param)) {
                    let wanted = self.text(moids.sub(param));
                    misses.push((
                        ErrorCode::E3012,
                        format!("components of {shown} are not {wanted} as \"{text}\" needs"),
                    ));
                }
                true
            });
            if !fits || misses.is_empty() {
                continue;
            }
            let count = misses.len();
            if !closest.as_ref().is_some_and(|&(best, ..)| best <= count) {
                let (code, message) = misses.swap_remove(0);
                closest = Some((count, code, message));
            }
        }
        closest.map(|(_, code, message)| (code, message))
    }

    fn is_real_row(&self, m: MoidId) -> bool {
        let moids = &self.program.moids;
        moids.is(m, MoidKind::Row) && matches!(moids.canonical(moids.sub(m)), MoidId::REAL | MoidId::COMPLEX)
    }

    /// Component mode and dimensions of the row `m` yields, once names
    /// and procedures are taken away.
    fn row_shape(&self, mut m: MoidId) -> Option<(MoidId, i32)> {
        let moids = &self.program.moids;
        while moids.is_deprefable(m) {
            let next = moids.canonical(moids.sub(m));
            if next == m {
                return None;
            }
            m = next;
        }
        let mut d = moids.canonical(moids.deflex(m));
        if moids.is(d, MoidKind::Flex) {
            d = moids.canonical(moids.sub(d));
        }
        moids
            .is(d, MoidKind::Row)
            .then(|| (moids.canonical(moids.sub(d)), moids[d].dim))
    }
}
