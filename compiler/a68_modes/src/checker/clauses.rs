//! Enclosed clauses and balancing.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Attribute, MoidId, MoidKind, NodeId};
use smallvec::SmallVec;

use super::Checker;
use crate::coercion::{coercion_path, is_same, is_unitable};
use crate::soid::{Deflexing, Soid, Sort};

impl Checker<'_> {
    pub(super) fn serial(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        let sites = self.yield_sites(p);
        for item in self.children(p) {
            match self.attr(item) {
                Attribute::DeclarationList => self.declarations(item)?,
                Attribute::Unit | Attribute::LabeledUnit if !sites.contains(&item) => {
                    self.unit(item, Soid::strong(MoidId::VOID))?;
                }
                _ => {}
            }
        }
        if sites.is_empty() {
            return Ok(MoidId::VOID);
        }
        self.branches(p, &sites, soid)
    }

    /// Check the units that yield the value of clause `p`.
    ///
    /// In a strong position every unit takes the demanded mode. Otherwise
    /// the units are balanced first; with a known soid the balanced mode
    /// must suit the position, and every unit is then coerced strongly.
    fn branches(&mut self, p: NodeId, sites: &[NodeId], soid: Soid) -> PhaseResult<MoidId> {
        let known = soid.is_known();
        if sites.len() <= 1 || (known && soid.sort == Sort::Strong) {
            let mut m = MoidId::VOID;
            for &s in sites {
                m = self.unit(s, soid)?;
            }
            return Ok(if known { self.canonical(soid.moid) } else { m });
        }
        let mut modes: SmallVec<[MoidId; 8]> = SmallVec::new();
        for &s in sites {
            modes.push(self.unit(s, Soid::unknown(soid.sort))?);
        }
        let balanced = self.balance(p, &modes, soid.sort)?;
        if !known || balanced == MoidId::ERROR {
            return Ok(balanced);
        }
        let target = self.canonical(soid.moid);
        let suits = balanced == MoidId::HIP
            || coercion_path(&self.program.moids, balanced, target, soid.sort, Deflexing::SafeDeflexing).is_some();
        if !suits {
            let message = format!(
                "{} cannot be coerced to {} in a {} position",
                self.text(balanced),
                self.text(target),
                soid.sort
            );
            self.error(p, ErrorCode::E3001, message)?;
            return Ok(target);
        }
        for &s in sites {
            self.settle_in(s, soid, true)?;
        }
        Ok(target)
    }

    pub(super) fn closed(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        let Some(serial) = self.program.tree.find_child(p, Attribute::SerialClause) else {
            return Ok(MoidId::VOID);
        };
        let m = self.serial(serial, soid)?;
        self.set_moid(serial, m);
        Ok(m)
    }

    /// A collateral clause is a row or structure display, or a list of
    /// voided units.
    pub(super) fn collateral(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        let units: SmallVec<[NodeId; 8]> = self
            .children(p)
            .into_iter()
            .filter(|&u| self.program.tree.is(u, Attribute::Unit))
            .collect();
        if !soid.is_known() || soid.sort != Sort::Strong {
            for &u in &units {
                self.unit(u, Soid::unknown(Sort::Strong))?;
            }
            self.error(p, ErrorCode::E3001, "a display needs a strong position that fixes its mode")?;
            return Ok(MoidId::ERROR);
        }
        let target = self.canonical(soid.moid);
        if target == MoidId::VOID {
            for &u in &units {
                self.unit(u, Soid::strong(MoidId::VOID))?;
            }
            return Ok(MoidId::VOID);
        }
        if units.is_empty() {
            return Ok(MoidId::VACUUM);
        }
        let moids = &self.program.moids;
        let flat = moids.canonical(moids.deflex(target));
        let row = if moids.is(flat, MoidKind::Flex) { moids.canonical(moids.sub(flat)) } else { flat };
        if moids.is(row, MoidKind::Row) {
            let element = match moids[row].slice {
                Some(s) => moids.canonical(s),
                None => moids.canonical(moids.sub(row)),
            };
            for &u in &units {
                self.unit(u, Soid::strong(element))?;
            }
            return Ok(target);
        }
        if moids.is(target, MoidKind::Struct) {
            let fields: SmallVec<[MoidId; 8]> = moids[target].pack.iter().map(|e| e.moid).collect();
            if fields.len() != units.len() {
                let message = format!(
                    "a display of {} units cannot yield {}",
                    units.len(),
                    self.text(target)
                );
                self.error(p, ErrorCode::E3001, message)?;
                return Ok(MoidId::ERROR);
            }
            for (&u, field) in units.iter().zip(fields) {
                self.unit(u, Soid::strong(field))?;
            }
            return Ok(target);
        }
        for &u in &units {
            self.unit(u, Soid::unknown(Sort::Strong))?;
        }
        let text = self.text(target);
        self.error(p, ErrorCode::E3001, format!("a display cannot yield {text}"))?;
        Ok(MoidId::ERROR)
    }

    pub(super) fn parallel(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        if let Some(collateral) = self.program.tree.find_child(p, Attribute::CollateralClause) {
            self.collateral(collateral, Soid::strong(MoidId::VOID))?;
            self.set_moid(collateral, MoidId::VOID);
        }
        Ok(MoidId::VOID)
    }

    /// Enquiry serial clause inside part `part`.
    fn enquiry(&mut self, part: Option<NodeId>, soid: Soid) -> PhaseResult<MoidId> {
        match part.and_then(|q| self.program.tree.find_child(q, Attribute::SerialClause)) {
            Some(serial) => self.unit(serial, soid),
            None => Ok(MoidId::ERROR),
        }
    }

    /// `IF .. THEN .. ELSE .. FI` and its `ELIF` continuations.
    pub(super) fn conditional(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        let part = self
            .program
            .tree
            .find_child(p, Attribute::IfPart)
            .or_else(|| self.program.tree.find_child(p, Attribute::ElifPart));
        self.enquiry(part, Soid::meek(MoidId::BOOL))?;
        let sites = self.yield_sites(p);
        self.branches(p, &sites, soid)
    }

    /// `CASE` clauses and their `OUSE` continuations. A clause whose IN
    /// part has specifiers is a conformity clause.
    pub(super) fn case_clause(&mut self, p: NodeId, soid: Soid) -> PhaseResult<MoidId> {
        let part = self
            .program
            .tree
            .find_child(p, Attribute::CasePart)
            .or_else(|| self.program.tree.find_child(p, Attribute::OusePart));
        let in_part = self.program.tree.find_child(p, Attribute::InPart);
        let specified: SmallVec<[NodeId; 8]> = in_part
            .map(|q| {
                self.children(q)
                    .into_iter()
                    .filter(|&c| self.program.tree.is(c, Attribute::SpecifiedUnit))
                    .collect()
            })
            .unwrap_or_default();
        if self.attr(p) == Attribute::UnitedCaseClause || !specified.is_empty() {
            self.conformity(part, &specified)?;
        } else {
            self.enquiry(part, Soid::meek(MoidId::INT))?;
        }
        let sites = self.yield_sites(p);
        self.branches(p, &sites, soid)
    }

    /// The enquiry of a conformity clause yields a united value; every
    /// specifier names one of its components.
    fn conformity(&mut self, part: Option<NodeId>, specified: &[NodeId]) -> PhaseResult {
        let Some(serial) = part.and_then(|q| self.program.tree.find_child(q, Attribute::SerialClause)) else {
            return Ok(());
        };
        let m = self.unit(serial, Soid::unknown(Sort::Meek))?;
        if m == MoidId::ERROR {
            return Ok(());
        }
        let Some(united) = self.strip(m, false, |moids, x| moids.is(x, MoidKind::Union)) else {
            let text = self.text(m);
            return self.error(serial, ErrorCode::E3001, format!("{text} is not a united mode"));
        };
        self.settle(serial, Soid::meek(united))?;
        for &unit in specified {
            let Some(specifier) = self.program.tree.find_child(unit, Attribute::Specifier) else {
                continue;
            };
            let Some(declarer) = self.program.tree.find_child(specifier, Attribute::Declarer) else {
                continue;
            };
            let spec = self.declarer_mode(declarer);
            let moids = &self.program.moids;
            let fits = spec == MoidId::ERROR
                || spec == united
                || is_unitable(moids, spec, united, Deflexing::SafeDeflexing)
                || moids[united].pack.iter().any(|e| is_same(moids, spec, e.moid, Deflexing::SafeDeflexing));
            if !fits {
                let message = format!("{} is not a component of {}", self.text(spec), self.text(united));
                self.error(specifier, ErrorCode::E3001, message)?;
            }
        }
        Ok(())
    }

    pub(super) fn loop_clause(&mut self, p: NodeId) -> PhaseResult<MoidId> {
        for part in self.children(p) {
            match self.attr(part) {
                Attribute::ForPart => {
                    if let Some(id) = self.program.tree.find_child(part, Attribute::DefiningIdentifier) {
                        self.set_moid(id, MoidId::INT);
                    }
                }
                Attribute::FromPart | Attribute::ByPart | Attribute::ToPart => {
                    if let Some(u) = self.program.tree.find_child(part, Attribute::Unit) {
                        self.unit(u, Soid::meek(MoidId::INT))?;
                    }
                }
                Attribute::WhilePart | Attribute::UntilPart => {
                    self.enquiry(Some(part), Soid::meek(MoidId::BOOL))?;
                }
                Attribute::DoPart => {
                    self.enquiry(Some(part), Soid::strong(MoidId::VOID))?;
                }
                _ => {}
            }
        }
        Ok(MoidId::VOID)
    }
}
