//! Units: primaries, secondaries, formulae, tertiaries and the unit forms
//! built from them.
//!
//! Primaries are found left to right because an argument packet belongs to
//! the primary on its left. Selections, assignations and routine texts nest
//! to the right and are reduced right to left. Dyadic formulae are reduced
//! one priority at a time, highest first, each pass left-associative.

use a68_diagnostic::{error_at, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Status};

use super::{Pat, Reducer, Segment};
use crate::tables;

/// Priority of a monadic operator; binds tighter than any dyadic one.
pub const MONADIC_PRIORITY: u8 = 10;

const CLAUSES: &[Attribute] = &[
    Attribute::ClosedClause,
    Attribute::CollateralClause,
    Attribute::ConditionalClause,
    Attribute::IntegerCaseClause,
    Attribute::UnitedCaseClause,
    Attribute::LoopClause,
];

impl Reducer<'_> {
    pub(crate) fn units(&mut self, seg: Segment) -> PhaseResult {
        self.primaries(seg)?;
        self.secondaries(seg);
        self.formulae(seg)?;
        self.tertiaries(seg);
        self.unit_forms(seg);
        Ok(())
    }

    fn is_clause(&self, p: Option<NodeId>) -> bool {
        p.is_some_and(|p| CLAUSES.contains(&self.attr(p)))
    }

    fn primaries(&mut self, seg: Segment) -> PhaseResult {
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            if self.primary(q) {
                self.wrap(q, q, Attribute::Primary);
                self.arguments(q)?;
            }
            p = self.next(q);
        }
        Ok(())
    }

    /// Reduce the phrase at `q` to something a primary is made of.
    fn primary(&mut self, q: NodeId) -> bool {
        use Attribute as A;
        match self.attr(q) {
            A::Longety | A::Shortety => match self.next(q).filter(|&d| self.attr(d).is_denotation()) {
                Some(d) => {
                    self.wrap(q, d, A::Denotation);
                    true
                }
                None => false,
            },
            attr if attr.is_denotation() => {
                self.wrap(q, q, A::Denotation);
                true
            }
            A::Identifier => {
                if self.is(self.next(q), A::OfSymbol) {
                    self.program.tree[q].attribute = A::FieldIdentifier;
                    false
                } else {
                    !self.is(self.previous(q), A::GotoSymbol)
                }
            }
            A::ParSymbol => match self.next(q).filter(|&c| self.is_clause(Some(c))) {
                Some(c) => {
                    self.wrap(q, c, A::ParallelClause);
                    self.wrap(q, q, A::EnclosedClause);
                    true
                }
                None => false,
            },
            attr if CLAUSES.contains(&attr) => {
                self.wrap(q, q, A::EnclosedClause);
                true
            }
            A::FormatText => true,
            A::Declarer => match self.next(q).filter(|&c| self.is_clause(Some(c))) {
                Some(c) => {
                    self.wrap(c, c, A::EnclosedClause);
                    self.wrap(q, c, A::Cast);
                    true
                }
                None => false,
            },
            A::LocSymbol | A::HeapSymbol => {
                let declarer = self.next(q).filter(|&d| self.tree().is(d, A::Declarer));
                match declarer.filter(|&d| !self.is(self.next(d), A::DefiningIdentifier)) {
                    Some(d) => {
                        self.wrap(q, d, A::Generator);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// An argument packet directly after a primary.
    fn is_argument(&self, a: NodeId) -> bool {
        match self.attr(a) {
            Attribute::ClosedClause | Attribute::CollateralClause => {
                self.tree().sub(a).is_some_and(|open| self.tree().is(open, Attribute::OpenSymbol))
            }
            Attribute::SubSymbol => self.tree().sub(a).is_some(),
            _ => false,
        }
    }

    /// Absorb argument packets: `f (x)`, `a [i, j]`, `m [1:2] (3)`.
    ///
    /// Whether such a specification is a call or a slice depends on the
    /// mode of the primary and is settled by the mode checker.
    fn arguments(&mut self, primary: NodeId) -> PhaseResult {
        while let Some(arg) = self.next(primary).filter(|&a| self.is_argument(a)) {
            if self.tree().is(arg, Attribute::ClosedClause) {
                let children = self.tree().child_ids(arg);
                let single = match children.as_slice() {
                    [_, serial, _] if self.tree().is(*serial, Attribute::SerialClause) => self
                        .tree()
                        .sub(*serial)
                        .filter(|&u| self.tree().is(u, Attribute::Unit) && self.next(u).is_none())
                        .map(|u| (*serial, u)),
                    _ => None,
                };
                match single {
                    Some((serial, unit)) => self.program.tree.replace_with(serial, unit, unit),
                    None => self.syntax_error(arg, ErrorCode::E1003, "an argument must be a unit")?,
                }
            }
            tables::dissolve(self.program, arg);
            self.program.tree[arg].attribute = Attribute::GenericArgument;
            self.wrap(primary, arg, Attribute::Specification);
            self.wrap(primary, primary, Attribute::Primary);
        }
        Ok(())
    }

    fn secondaries(&mut self, seg: Segment) {
        for &q in self.nodes(seg).iter().rev() {
            match self.attr(q) {
                Attribute::Primary => {
                    self.wrap(q, q, Attribute::Secondary);
                }
                Attribute::FieldIdentifier => {
                    let pats = [
                        Pat::A(Attribute::FieldIdentifier),
                        Pat::A(Attribute::OfSymbol),
                        Pat::A(Attribute::Secondary),
                    ];
                    if self.try_reduction(q, Attribute::Selection, &pats) {
                        self.wrap(q, q, Attribute::Secondary);
                    }
                }
                _ => {}
            }
        }
    }

    fn is_operand(&self, p: Option<NodeId>) -> bool {
        p.is_some_and(|p| {
            matches!(
                self.attr(p),
                Attribute::Secondary | Attribute::MonadicFormula | Attribute::Formula
            )
        })
    }

    fn formulae(&mut self, seg: Segment) -> PhaseResult {
        let nodes = self.nodes(seg);
        for &q in &nodes {
            let between = self.is_operand(self.previous(q))
                && self.next(q).is_some_and(|n| {
                    self.tree().is(n, Attribute::Secondary) || self.tree().is(n, Attribute::Operator)
                });
            if self.tree().is(q, Attribute::EqualsSymbol) && between {
                self.program.tree[q].attribute = Attribute::Operator;
            }
        }
        for &q in nodes.iter().rev() {
            if self.tree().is(q, Attribute::Operator)
                && self.is_operand(self.next(q))
                && !self.is_operand(self.previous(q))
            {
                self.program.tree[q].priority = MONADIC_PRIORITY;
                if let Some(operand) = self.next(q) {
                    self.wrap(q, operand, Attribute::MonadicFormula);
                }
            }
        }
        for priority in (1..=9).rev() {
            let mut p = seg.first;
            while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
                if self.is_operand(Some(q)) {
                    while let Some(op) = self.next(q).filter(|&op| self.tree().is(op, Attribute::Operator)) {
                        let Some(rhs) = self.next(op).filter(|&r| self.is_operand(Some(r))) else {
                            break;
                        };
                        if self.dyadic_priority(op)? != priority {
                            break;
                        }
                        self.wrap(q, rhs, Attribute::Formula);
                    }
                }
                p = self.next(q);
            }
        }
        Ok(())
    }

    /// Priority of the dyadic operator at `op`, looked up once.
    fn dyadic_priority(&mut self, op: NodeId) -> PhaseResult<u8> {
        let known = self.program.tree[op].priority;
        if known != 0 {
            return Ok(known);
        }
        let name = self.tree().symbol(op);
        let priority = match self.program.tables.priority_of(self.table_of(op), name) {
            Some(priority) => priority,
            None => {
                let span = self.program.tree[op].span;
                let text = self.program.text(op);
                self.program.tree[op].status |= Status::ERROR;
                self.diags.report(error_at(
                    ErrorCode::E1010,
                    span,
                    format!("dyadic operator \"{text}\" has no priority"),
                ))?;
                1
            }
        };
        self.program.tree[op].priority = priority;
        Ok(priority)
    }

    fn tertiaries(&mut self, seg: Segment) {
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            match self.attr(q) {
                Attribute::NilSymbol => {
                    self.wrap(q, q, Attribute::Nihil);
                    self.wrap(q, q, Attribute::Tertiary);
                }
                Attribute::Secondary | Attribute::MonadicFormula | Attribute::Formula => {
                    self.wrap(q, q, Attribute::Tertiary);
                }
                _ => {}
            }
            p = self.next(q);
        }
    }

    fn unit_forms(&mut self, seg: Segment) {
        use Pat::A;
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            match self.attr(q) {
                Attribute::Tertiary => {
                    let _ = self.try_reduction(
                        q,
                        Attribute::IdentityRelation,
                        &[A(Attribute::Tertiary), A(Attribute::IsSymbol), A(Attribute::Tertiary)],
                    ) || self.try_reduction(
                        q,
                        Attribute::IdentityRelation,
                        &[A(Attribute::Tertiary), A(Attribute::IsntSymbol), A(Attribute::Tertiary)],
                    );
                }
                Attribute::SkipSymbol => {
                    self.wrap(q, q, Attribute::Skip);
                }
                Attribute::GotoSymbol => {
                    self.try_reduction(q, Attribute::Jump, &[A(Attribute::GotoSymbol), A(Attribute::Identifier)]);
                }
                _ => {}
            }
            p = self.next(q);
        }
        for &q in self.nodes(seg).iter().rev() {
            match self.attr(q) {
                Attribute::Tertiary => {
                    let pats = [A(Attribute::Tertiary), A(Attribute::AssignSymbol), A(Attribute::Unit)];
                    if self.try_reduction(q, Attribute::Assignation, &pats) || !self.is(self.next(q), Attribute::AssignSymbol) {
                        self.wrap(q, q, Attribute::Unit);
                    }
                }
                Attribute::IdentityRelation | Attribute::Skip | Attribute::Jump => {
                    self.wrap(q, q, Attribute::Unit);
                }
                Attribute::Declarer => {
                    if self.matches(q, &[A(Attribute::Declarer), A(Attribute::ColonSymbol), A(Attribute::Unit)]).is_some() {
                        let start = self.previous(q).filter(|&pp| self.tree().is(pp, Attribute::ParameterPack)).unwrap_or(q);
                        if let Some(body) = self.next(q).and_then(|c| self.next(c)) {
                            self.wrap(start, body, Attribute::RoutineText);
                            self.wrap(start, start, Attribute::Unit);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// `(decl id): unit` alternatives of a conformity clause.
    pub(crate) fn specified_units(&mut self, seg: Segment) {
        let pats = [Pat::A(Attribute::Specifier), Pat::A(Attribute::ColonSymbol), Pat::A(Attribute::Unit)];
        let mut p = seg.first;
        while let Some(q) = p.filter(|&q| Some(q) != seg.stop) {
            self.try_reduction(q, Attribute::SpecifiedUnit, &pats);
            p = self.next(q);
        }
    }
}
