//! Constructs and how each one is compiled into a function.

use std::fmt;

use a68_ir::{Attribute, MoidId, NodeId};

use crate::basic::nonzero;
use crate::fold::{fold, single_unit};
use crate::inline::{operator, Template};
use crate::modes::CMode;
use crate::{abandon, CodegenContext, Emit, Generator, Pass, WRAPPERS};

/// What kind of unit a compiled function implements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Construct {
    Denotation,
    Identifier,
    DerefIdentifier,
    Slice,
    DerefSlice,
    Selection,
    DerefSelection,
    Formula,
    VoidFormula,
    VoidAssign,
    Identity,
    Cast,
    Call,
    VoidCall,
    Deproc,
    VoidDeproc,
    Collateral,
    Closed,
    Conditional,
    Case,
    Loop,
}

impl Construct {
    /// Name used in function names and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Construct::Denotation => "denotation",
            Construct::Identifier => "identifier",
            Construct::DerefIdentifier => "deref_identifier",
            Construct::Slice => "slice",
            Construct::DerefSlice => "deref_slice",
            Construct::Selection => "selection",
            Construct::DerefSelection => "deref_selection",
            Construct::Formula => "formula",
            Construct::VoidFormula => "void_formula",
            Construct::VoidAssign => "void_assign",
            Construct::Identity => "identity",
            Construct::Cast => "cast",
            Construct::Call => "call",
            Construct::VoidCall => "void_call",
            Construct::Deproc => "deproc",
            Construct::VoidDeproc => "void_deproc",
            Construct::Collateral => "collateral",
            Construct::Closed => "closed",
            Construct::Conditional => "conditional",
            Construct::Case => "case",
            Construct::Loop => "loop",
        }
    }

    /// Lowest optimise level that compiles the construct. Calls of user
    /// procedures need level 3 whatever this says.
    pub fn level(self) -> u8 {
        match self {
            Construct::Denotation => 1,
            Construct::Deproc | Construct::VoidDeproc => 3,
            Construct::Collateral
            | Construct::Closed
            | Construct::Conditional
            | Construct::Case
            | Construct::Loop => 4,
            _ => 2,
        }
    }

    /// Compiled as a statement; pushes nothing.
    pub fn is_void(self) -> bool {
        matches!(
            self,
            Construct::VoidFormula | Construct::VoidAssign | Construct::VoidCall | Construct::VoidDeproc
        )
    }

    pub fn is_clause(self) -> bool {
        self.level() == 4
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Generator<'_> {
    /// The construct `p` is compiled as at the current level, if any.
    pub(crate) fn classify(&self, p: NodeId) -> Option<Construct> {
        let construct = self.construct(p)?;
        let level = match construct {
            Construct::Call | Construct::VoidCall if self.is_user_call(p) => 3,
            c => c.level(),
        };
        (level <= self.level).then_some(construct)
    }

    fn construct(&self, p: NodeId) -> Option<Construct> {
        let program = self.program;
        let tree = &program.tree;
        let q = self.phrase(p);
        match tree.attribute(q) {
            Attribute::Voiding => {
                let r = self.phrase(tree.sub(q)?);
                match tree.attribute(r) {
                    Attribute::Formula if self.is_void_formula(r) => Some(Construct::VoidFormula),
                    Attribute::Call if self.procedure_call(r).is_some() => Some(Construct::VoidCall),
                    Attribute::Deproceduring if self.deprocedured(r).is_some() => Some(Construct::VoidDeproc),
                    Attribute::Assignation if self.is_inline_assignation(r) => Some(Construct::VoidAssign),
                    _ => None,
                }
            }
            Attribute::Deproceduring if self.deprocedured(q).is_some() => Some(Construct::Deproc),
            Attribute::Call if self.procedure_call(q).is_some() => Some(Construct::Call),
            Attribute::ClosedClause
            | Attribute::CollateralClause
            | Attribute::ConditionalClause
            | Attribute::IntegerCaseClause
            | Attribute::LoopClause => self.clause_construct(q),
            _ => self.value_construct(p),
        }
    }

    fn is_user_call(&self, p: NodeId) -> bool {
        let tree = &self.program.tree;
        let mut q = self.phrase(p);
        if tree.is(q, Attribute::Voiding) {
            q = tree.sub(q).map_or(q, |r| self.phrase(r));
        }
        tree.is(q, Attribute::Call) && self.procedure_call(q).is_some()
    }

    /// Clauses compile when nothing coerces them and they yield nothing or
    /// a primitive value. A collateral clause only compiles as a statement.
    fn clause_construct(&self, q: NodeId) -> Option<Construct> {
        let program = self.program;
        let m = program.moid_of(q)?;
        let void = program.moids.canonical(m) == MoidId::VOID;
        if !void && !CMode::of(program, m).is_some_and(CMode::is_primitive) {
            return None;
        }
        match program.tree.attribute(q) {
            Attribute::ClosedClause => Some(Construct::Closed),
            Attribute::CollateralClause if void => Some(Construct::Collateral),
            Attribute::ConditionalClause => Some(Construct::Conditional),
            Attribute::IntegerCaseClause => Some(Construct::Case),
            Attribute::LoopClause => Some(Construct::Loop),
            _ => None,
        }
    }

    fn value_construct(&self, p: NodeId) -> Option<Construct> {
        let program = self.program;
        let mode = self.mode(p)?;
        if fold(program, p).is_some() && (self.level >= 2 || self.is_denotation(p)) {
            return Some(Construct::Denotation);
        }
        if self.level < 2 {
            return None;
        }
        let compiles = if mode.is_long() {
            self.is_long_basic(p)
        } else {
            self.is_basic(p)
        };
        if !compiles {
            return None;
        }
        self.value_kind(p)
    }

    /// Construct named by the innermost phrase of a basic unit.
    fn value_kind(&self, p: NodeId) -> Option<Construct> {
        let tree = &self.program.tree;
        let mut r = self.phrase(p);
        while tree.is(r, Attribute::Widening) {
            r = self.phrase(tree.sub(r)?);
        }
        Some(match tree.attribute(r) {
            Attribute::Denotation => Construct::Denotation,
            Attribute::Identifier => Construct::Identifier,
            Attribute::Dereferencing => match tree.attribute(self.phrase(tree.sub(r)?)) {
                Attribute::Identifier => Construct::DerefIdentifier,
                Attribute::Slice => Construct::DerefSlice,
                Attribute::Selection => Construct::DerefSelection,
                _ => return None,
            },
            Attribute::Slice => Construct::Slice,
            Attribute::Selection => Construct::Selection,
            Attribute::Formula | Attribute::MonadicFormula => Construct::Formula,
            Attribute::Call => Construct::Call,
            Attribute::Cast => Construct::Cast,
            Attribute::IdentityRelation => Construct::Identity,
            Attribute::ClosedClause => return self.value_kind(single_unit(self.program, r)?),
            _ => return None,
        })
    }

    fn is_denotation(&self, p: NodeId) -> bool {
        let tree = &self.program.tree;
        let mut r = self.phrase(p);
        while tree.is(r, Attribute::Widening) {
            match tree.sub(r) {
                Some(s) => r = self.phrase(s),
                None => return false,
            }
        }
        tree.is(r, Attribute::Denotation)
    }

    /// An assigning operator through a basic name, or a basic formula
    /// whose value is thrown away.
    pub(crate) fn is_void_formula(&self, r: NodeId) -> bool {
        let children = self.program.tree.child_ids(r);
        let [lhs, op, rhs] = children.as_slice() else {
            return false;
        };
        match self.operator_of(*op).and_then(operator) {
            Some(inline) if inline.is_assignment() => {
                self.is_name(*lhs)
                    && self.is_basic(*rhs)
                    && (!inline.nonzero_divisor || nonzero(fold(self.program, *rhs)))
            }
            Some(_) => self.is_basic(r),
            None => false,
        }
    }

    fn is_inline_assignation(&self, r: NodeId) -> bool {
        let program = self.program;
        let children = program.tree.child_ids(r);
        let [dest, _, src] = children.as_slice() else {
            return false;
        };
        let Some(referred) = program.moid_of(*dest).and_then(|m| CMode::referred(program, m)) else {
            return false;
        };
        if referred.is_long() {
            let plain = self.plain_identifier(*dest).is_some();
            plain && self.is_long_basic(*src)
        } else {
            self.is_name(*dest) && self.is_basic(*src)
        }
    }

    /// Base of the function name: the identifier or operator the unit is
    /// about, `unit` otherwise.
    pub(crate) fn base_name(&self, p: NodeId, construct: Construct) -> String {
        let program = self.program;
        let tree = &program.tree;
        let mut r = self.phrase(p);
        loop {
            match tree.attribute(r) {
                a if WRAPPERS.contains(&a) => {}
                Attribute::Voiding
                | Attribute::Dereferencing
                | Attribute::Deproceduring
                | Attribute::Widening => {}
                _ => break,
            }
            match tree.sub(r) {
                Some(s) => r = s,
                None => break,
            }
        }
        let named = match (construct, tree.attribute(r)) {
            (Construct::Denotation | Construct::Cast | Construct::Identity, _) => None,
            (_, Attribute::Identifier) => Some(r),
            (_, Attribute::Slice | Attribute::Call) => tree.sub(r).map(|q| self.phrase(q)),
            (_, Attribute::Selection) => tree.sub(r).map(|field| self.phrase(tree.last_sibling(field))),
            (_, Attribute::Assignation) => tree.sub(r).map(|q| self.phrase(q)),
            (_, Attribute::Formula) => {
                let op = tree.child_ids(r).get(1).copied();
                return op
                    .and_then(|op| self.operator_of(op))
                    .and_then(|rt| rt.strip_prefix("genie_"))
                    .and_then(|rest| rest.split('_').next())
                    .map_or_else(|| "unit".to_owned(), str::to_owned);
            }
            (_, Attribute::MonadicFormula) => {
                return tree
                    .sub(r)
                    .and_then(|op| self.operator_of(op))
                    .and_then(|rt| rt.strip_prefix("genie_"))
                    .and_then(|rest| rest.split('_').next())
                    .map_or_else(|| "unit".to_owned(), str::to_owned);
            }
            _ => None,
        };
        named
            .filter(|&q| tree.is(q, Attribute::Identifier))
            .map_or_else(|| "unit".to_owned(), |q| CodegenContext::mangle(program.text(q)))
    }

    /// Write the body of the function for `p`. Returns whether the unit
    /// folded to a constant.
    pub(crate) fn emit(&mut self, p: NodeId, construct: Construct) -> Emit<bool> {
        match construct {
            Construct::Denotation => {
                self.emit_constant(p)?;
                Ok(true)
            }
            Construct::Call | Construct::VoidCall | Construct::Deproc | Construct::VoidDeproc
                if construct != Construct::Call || self.is_user_call(p) =>
            {
                self.emit_call(p, construct)?;
                Ok(false)
            }
            Construct::VoidFormula => {
                self.emit_void_formula(p)?;
                Ok(false)
            }
            Construct::VoidAssign => {
                self.emit_assignation(p)?;
                Ok(false)
            }
            c if c.is_clause() => {
                self.emit_clause(p)?;
                Ok(false)
            }
            _ => {
                self.emit_value(p)?;
                Ok(false)
            }
        }
    }

    fn emit_constant(&mut self, p: NodeId) -> Emit {
        let Some(v) = fold(self.program, p) else {
            return abandon(p, "unit does not fold");
        };
        let Some(mode) = self.mode(p) else {
            return abandon(p, "constant has no mode");
        };
        if v.is_primitive() {
            self.ctx
                .writeln(&format!("PUSH_PRIMITIVE (p, {}, {});", v.literal(), mode.object()));
        } else {
            let pointer = self.inline_long(p, Pass::Declare)?;
            self.ctx.writeln(&format!("PUSH (p, {pointer}, SIZE ({}));", mode.object()));
        }
        Ok(())
    }

    /// Push the value of a basic unit.
    fn emit_value(&mut self, p: NodeId) -> Emit {
        let Some(mode) = self.mode(p) else {
            return abandon(p, "unit has no mode");
        };
        if mode.is_long() {
            self.inline_long(p, Pass::Declare)?;
            self.inline_long(p, Pass::Execute)?;
            let pointer = self.inline_long(p, Pass::Yield)?;
            self.ctx.writeln(&format!("PUSH (p, {pointer}, SIZE ({}));", mode.object()));
            return Ok(());
        }
        let value = self.passes(p)?;
        self.ctx.writeln(&push(mode, &value));
        Ok(())
    }

    /// `name op:= value` or a formula thrown away.
    fn emit_void_formula(&mut self, p: NodeId) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let Some(r) = self.voided(p) else {
            return abandon(p, "not a voided formula");
        };
        let children = tree.child_ids(r);
        let [lhs, op, rhs] = children.as_slice() else {
            return abandon(r, "malformed formula");
        };
        match self.operator_of(*op).and_then(operator) {
            Some(inline) if inline.is_assignment() => {
                let Template::Assign(assign) = inline.template else {
                    return abandon(r, "operator is not inline");
                };
                for pass in [Pass::Declare, Pass::Execute] {
                    self.inline_name(*lhs, pass)?;
                    self.inline_unit(*rhs, pass)?;
                }
                let pointer = self.inline_name(*lhs, Pass::Yield)?;
                let value = self.inline_unit(*rhs, Pass::Yield)?;
                self.ctx.writeln(&format!("VALUE ({pointer}) {assign} {value};"));
                Ok(())
            }
            Some(_) => {
                let value = self.passes(r)?;
                self.ctx.writeln(&format!("(void) ({value});"));
                Ok(())
            }
            None => abandon(r, "operator is not inline"),
        }
    }

    /// The phrase below the voiding of `p`.
    fn voided(&self, p: NodeId) -> Option<NodeId> {
        let tree = &self.program.tree;
        let q = self.phrase(p);
        if !tree.is(q, Attribute::Voiding) {
            return None;
        }
        tree.sub(q).map(|r| self.phrase(r))
    }

    fn emit_assignation(&mut self, p: NodeId) -> Emit {
        let program = self.program;
        let Some(r) = self.voided(p) else {
            return abandon(p, "not a voided assignation");
        };
        let children = program.tree.child_ids(r);
        let [dest, _, src] = children.as_slice() else {
            return abandon(r, "malformed assignation");
        };
        let Some(referred) = program.moid_of(*dest).and_then(|m| CMode::referred(program, m)) else {
            return abandon(r, "destination is not a name of a plain value");
        };
        if referred.is_long() {
            for pass in [Pass::Declare, Pass::Execute] {
                self.inline_name(*dest, pass)?;
                self.inline_long(*src, pass)?;
            }
            let pointer = self.inline_name(*dest, Pass::Yield)?;
            let value = self.inline_long(*src, Pass::Yield)?;
            let object = referred.object();
            if referred == CMode::Complex {
                self.ctx.writeln(&format!(
                    "MOVE ((BYTE_T *) {pointer}, (BYTE_T *) {value}, SIZE ({object}));"
                ));
            } else {
                self.ctx.writeln(&format!("MOVE_MP ({pointer}, {value}, {object});"));
            }
            return Ok(());
        }
        for pass in [Pass::Declare, Pass::Execute] {
            self.inline_name(*dest, pass)?;
            self.inline_unit(*src, pass)?;
        }
        let pointer = self.inline_name(*dest, Pass::Yield)?;
        let value = self.inline_unit(*src, Pass::Yield)?;
        self.ctx.writeln(&format!("STATUS ({pointer}) = INIT_MASK;"));
        self.ctx.writeln(&format!("VALUE ({pointer}) = {value};"));
        Ok(())
    }

    /// Call a user procedure through the run time, keeping the collector
    /// away from the arguments on the stack.
    pub(crate) fn emit_call(&mut self, p: NodeId, construct: Construct) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let r = if construct.is_void() {
            self.voided(p)
        } else {
            Some(self.phrase(p))
        };
        let Some(r) = r else {
            return abandon(p, "not a call");
        };
        let (ident, tag, args) = if tree.is(r, Attribute::Deproceduring) {
            match self.deprocedured(r) {
                Some((ident, tag)) => (ident, tag, smallvec::SmallVec::new()),
                None => return abandon(r, "procedure is not an identifier"),
            }
        } else {
            match self.procedure_call(r) {
                Some(call) => call,
                None => return abandon(r, "call is not basic"),
            }
        };
        let Some(proc_moid) = program.moid_of(ident) else {
            return abandon(ident, "procedure has no mode");
        };
        let result = program.moids.sub(proc_moid);
        let m = proc_moid.index();

        for pass in [Pass::Declare, Pass::Execute] {
            self.frame_object(ident, tag, pass)?;
            for &arg in &args {
                self.inline_unit(arg, pass)?;
            }
        }
        let procedure = self.frame_object(ident, tag, Pass::Yield)?;
        let mut values = Vec::with_capacity(args.len());
        for &arg in &args {
            let Some(mode) = self.mode(arg) else {
                return abandon(arg, "argument has no mode");
            };
            values.push((mode, self.inline_unit(arg, Pass::Yield)?));
        }
        self.pop_sp();
        self.ctx.writeln("pop_sp = A68_SP;");
        self.ctx.writeln("UP_BLOCK_GC;");
        for (mode, value) in &values {
            self.ctx.writeln(&push(*mode, value));
        }
        self.ctx.writeln(&format!(
            "genie_call_procedure (p, M ({m}), M ({m}), M ({m}), {procedure}, pop_sp, A68_FP);"
        ));
        let void_result = program.moids.canonical(result) == MoidId::VOID;
        if construct.is_void() {
            self.ctx.writeln("DOWN_BLOCK_GC;");
            if !void_result {
                self.ctx.writeln("A68_SP = pop_sp;");
            }
        } else {
            if program.moids.has_gc_references(result) {
                self.ctx.writeln("BLOCK_GC_TOS (p);");
            }
            self.ctx.writeln("DOWN_BLOCK_GC;");
        }
        Ok(())
    }
}

/// Statement pushing a value of `mode` on the stack.
pub(crate) fn push(mode: CMode, value: &str) -> String {
    if mode == CMode::Ref {
        format!("PUSH_REF (p, {value});")
    } else {
        format!("PUSH_PRIMITIVE (p, {value}, {});", mode.object())
    }
}
