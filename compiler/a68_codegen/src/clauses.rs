//! Enclosed clauses, compiled whole at level 4.
//!
//! A clause opens the frames of its ranges itself, so the interpreter
//! does not set them up. Declarations and units that are not basic run
//! through `EXECUTE_UNIT`; everything else becomes inline statements.

use a68_ir::{Attribute, MoidId, NodeId, TableId};

use crate::book::Action;
use crate::modes::CMode;
use crate::units::push;
use crate::{abandon, is_unit, Construct, Emit, Generator, Pass};

/// Where a clause leaves its value.
#[derive(Clone, Debug)]
pub(crate) struct Target {
    pub mode: CMode,
    pub var: String,
}

impl Generator<'_> {
    /// Body of a function compiling the clause at `p`. A clause with a
    /// value pushes it once every frame it opened is closed.
    pub(crate) fn emit_clause(&mut self, p: NodeId) -> Emit {
        let program = self.program;
        let q = self.phrase(p);
        let Some(m) = program.moid_of(q) else {
            return abandon(q, "clause has no mode");
        };
        let target = if program.moids.canonical(m) == MoidId::VOID {
            None
        } else {
            let Some(mode) = CMode::of(program, m).filter(|c| c.is_primitive()) else {
                return abandon(q, "clause yields a value that is not primitive");
            };
            let Some(value) = mode.value() else {
                return abandon(q, "clause yields a value that is not primitive");
            };
            let var = format!("_Y_{}", q.raw());
            self.ctx.declare(&format!("{value} {var};"));
            Some(Target { mode, var })
        };
        self.clause(q, target.as_ref())?;
        if let Some(target) = target {
            self.ctx.writeln(&push(target.mode, &target.var));
        }
        Ok(())
    }

    fn clause(&mut self, q: NodeId, target: Option<&Target>) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        match tree.attribute(q) {
            Attribute::ClosedClause => match tree.find_child(q, Attribute::SerialClause) {
                Some(serial) => self.serial(serial, target),
                None => abandon(q, "empty closed clause"),
            },
            Attribute::CollateralClause if target.is_none() => self.collateral(q),
            Attribute::ConditionalClause | Attribute::ElifClause => self.conditional(q, target),
            Attribute::IntegerCaseClause | Attribute::OuseClause => self.case(q, target),
            Attribute::LoopClause if target.is_none() => self.loop_clause(q),
            _ => abandon(q, "clause cannot be compiled"),
        }
    }

    /// Range whose frame the construct at `p` opens.
    fn range_of(&self, p: NodeId) -> Option<TableId> {
        let program = self.program;
        let tree = &program.tree;
        tree.children(p)
            .find(|&c| is_unit(tree, c) || tree.is(c, Attribute::DeclarationList) || tree.is(c, Attribute::SerialClause))
            .or_else(|| tree.sub(p))
            .and_then(|c| tree[c].table)
    }

    /// Open the frame of the range at `p`. Returns the book mark to
    /// release when it closes.
    fn open_frame(&mut self, p: NodeId) -> usize {
        let range = self.range_of(p);
        let n = p.raw();
        self.ctx.writeln(&format!("OPEN_STATIC_FRAME (N ({n}));"));
        self.ctx.writeln(&format!("INIT_STATIC_FRAME (N ({n}));"));
        if range.is_some_and(|t| self.program.tables.table(t).initialise_frame) {
            self.ctx.writeln(&format!("initialise_frame (N ({n}));"));
        }
        self.frames.push(range);
        self.book.mark()
    }

    fn close_frame(&mut self, mark: usize) {
        self.frames.pop();
        self.book.release(mark);
        self.ctx.writeln("CLOSE_FRAME;");
    }

    fn serial(&mut self, serial: NodeId, target: Option<&Target>) -> Emit {
        let mark = self.open_frame(serial);
        self.serial_items(serial, target)?;
        self.close_frame(mark);
        Ok(())
    }

    /// The items of a serial clause, in a frame already open.
    fn serial_items(&mut self, serial: NodeId, target: Option<&Target>) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let items = tree.child_ids(serial);
        let last = items.iter().rposition(|&i| is_unit(tree, i));
        for (k, &item) in items.iter().enumerate() {
            self.forget_fetches();
            match tree.attribute(item) {
                Attribute::DeclarationList => self.execute_unit(item),
                Attribute::LabeledUnit => return abandon(item, "labels are left to the interpreter"),
                Attribute::ExitSymbol => return abandon(item, "completers are left to the interpreter"),
                _ if is_unit(tree, item) => match target {
                    Some(target) if Some(k) == last => self.yield_into(item, target)?,
                    _ => self.statement(item)?,
                },
                _ => {}
            }
        }
        Ok(())
    }

    /// Stored rows and structures may change between items.
    fn forget_fetches(&mut self) {
        for action in [Action::Descriptor, Action::Element, Action::Field] {
            self.book.forget(action);
        }
    }

    /// Hand a unit to the interpreter, discarding what it leaves on the
    /// stack.
    fn execute_unit(&mut self, item: NodeId) {
        self.pop_sp();
        self.ctx.writeln("pop_sp = A68_SP;");
        self.ctx.writeln(&format!("EXECUTE_UNIT (N ({}));", item.raw()));
        self.ctx.writeln("A68_SP = pop_sp;");
        self.forget_fetches();
    }

    /// A unit whose value is thrown away.
    fn statement(&mut self, item: NodeId) -> Emit {
        match self.classify(item) {
            Some(construct) if construct.is_void() => match construct {
                Construct::VoidCall | Construct::VoidDeproc => {
                    self.emit_call(item, construct)?;
                    self.forget_fetches();
                    Ok(())
                }
                _ => {
                    self.emit(item, construct)?;
                    Ok(())
                }
            },
            Some(construct) if construct.is_clause() => {
                let q = self.phrase(item);
                let void = self
                    .program
                    .moid_of(q)
                    .is_some_and(|m| self.program.moids.canonical(m) == MoidId::VOID);
                if void {
                    self.clause(q, None)
                } else {
                    self.execute_unit(item);
                    Ok(())
                }
            }
            _ => {
                self.execute_unit(item);
                Ok(())
            }
        }
    }

    /// A unit whose value becomes the value of the clause.
    fn yield_into(&mut self, item: NodeId, target: &Target) -> Emit {
        if self.mode(item) != Some(target.mode) {
            return abandon(item, "unit does not yield the mode of the clause");
        }
        let var = &target.var;
        if self.is_basic(item) {
            let value = self.passes(item)?;
            self.ctx.writeln(&format!("{var} = {value};"));
            return Ok(());
        }
        let q = self.phrase(item);
        if self.classify(item).is_some_and(Construct::is_clause) {
            return self.clause(q, Some(target));
        }
        let object = target.mode.object();
        let temporary = self.ctx.fresh_temp();
        self.ctx.declare(&format!("{object} {temporary};"));
        self.ctx.writeln(&format!("EXECUTE_UNIT (N ({}));", item.raw()));
        self.ctx.writeln(&format!("POP_OBJECT (p, &{temporary}, {object});"));
        self.ctx.writeln(&format!("{var} = V (&{temporary});"));
        self.forget_fetches();
        Ok(())
    }

    /// The only unit of an enquiry, which must be basic and of `mode`.
    fn enquiry(&self, part: Option<NodeId>, mode: CMode, owner: NodeId) -> Emit<(NodeId, NodeId)> {
        let program = self.program;
        let tree = &program.tree;
        let Some(serial) = part.and_then(|q| tree.find_child(q, Attribute::SerialClause)) else {
            return abandon(owner, "missing enquiry");
        };
        let children = tree.child_ids(serial);
        match children.as_slice() {
            [u] if is_unit(tree, *u) && self.mode(*u) == Some(mode) && self.is_basic(*u) => Ok((serial, *u)),
            _ => abandon(serial, "enquiry is not basic"),
        }
    }

    fn conditional(&mut self, q: NodeId, target: Option<&Target>) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let part = tree
            .find_child(q, Attribute::IfPart)
            .or_else(|| tree.find_child(q, Attribute::ElifPart));
        let (serial, condition) = self.enquiry(part, CMode::Bool, q)?;
        let then_serial = tree
            .find_child(q, Attribute::ThenPart)
            .and_then(|t| tree.find_child(t, Attribute::SerialClause));
        let Some(then_serial) = then_serial else {
            return abandon(q, "missing THEN part");
        };
        let else_part = tree.find_child(q, Attribute::ElsePart);
        let elif = tree.find_child(q, Attribute::ElifClause);
        if target.is_some() && else_part.is_none() && elif.is_none() {
            return abandon(q, "a conditional clause with a value needs an ELSE part");
        }

        let mark = self.open_frame(serial);
        let value = self.passes(condition)?;
        self.ctx.writeln(&format!("if ({value} == A68_TRUE) {{"));
        self.branch(|g| g.serial(then_serial, target))?;
        if let Some(else_serial) = else_part.and_then(|e| tree.find_child(e, Attribute::SerialClause)) {
            self.ctx.writeln("} else {");
            self.branch(|g| g.serial(else_serial, target))?;
        } else if let Some(elif) = elif {
            self.ctx.writeln("} else {");
            self.branch(|g| g.conditional(elif, target))?;
        }
        self.ctx.writeln("}");
        self.close_frame(mark);
        Ok(())
    }

    /// Code on one path only: what it fetches is not known afterwards.
    fn branch(&mut self, f: impl FnOnce(&mut Self) -> Emit) -> Emit {
        let mark = self.book.mark();
        self.ctx.indent();
        let done = f(self);
        self.ctx.dedent();
        self.book.release(mark);
        done
    }

    fn case(&mut self, q: NodeId, target: Option<&Target>) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let part = tree
            .find_child(q, Attribute::CasePart)
            .or_else(|| tree.find_child(q, Attribute::OusePart));
        let (serial, index) = self.enquiry(part, CMode::Int, q)?;
        let Some(in_part) = tree.find_child(q, Attribute::InPart) else {
            return abandon(q, "missing IN part");
        };
        let cases: Vec<NodeId> = tree.children(in_part).filter(|&u| is_unit(tree, u)).collect();
        if tree.children(in_part).any(|u| tree.is(u, Attribute::SpecifiedUnit)) {
            return abandon(q, "conformity clauses are left to the interpreter");
        }
        let out_part = tree.find_child(q, Attribute::OutPart);
        let ouse = tree.find_child(q, Attribute::OuseClause);
        if target.is_some() && out_part.is_none() && ouse.is_none() {
            return abandon(q, "a case clause with a value needs an OUT part");
        }

        let mark = self.open_frame(serial);
        let value = self.passes(index)?;
        self.ctx.writeln(&format!("switch ({value}) {{"));
        for (k, &unit) in cases.iter().enumerate() {
            self.ctx.writeln(&format!("case {}: {{", k + 1));
            self.branch(|g| {
                let mark = g.open_frame(in_part);
                match target {
                    Some(target) => g.yield_into(unit, target)?,
                    None => g.statement(unit)?,
                }
                g.close_frame(mark);
                g.ctx.writeln("break;");
                Ok(())
            })?;
            self.ctx.writeln("}");
        }
        self.ctx.writeln("default: {");
        self.branch(|g| {
            if let Some(out_serial) = out_part.and_then(|o| g.program.tree.find_child(o, Attribute::SerialClause)) {
                g.serial(out_serial, target)?;
            } else if let Some(ouse) = ouse {
                g.case(ouse, target)?;
            }
            g.ctx.writeln("break;");
            Ok(())
        })?;
        self.ctx.writeln("}");
        self.ctx.writeln("}");
        self.close_frame(mark);
        Ok(())
    }

    fn collateral(&mut self, q: NodeId) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let units: Vec<NodeId> = tree.children(q).filter(|&u| is_unit(tree, u)).collect();
        let mark = self.open_frame(q);
        for unit in units {
            self.forget_fetches();
            self.statement(unit)?;
        }
        self.close_frame(mark);
        Ok(())
    }

    /// A FROM, BY or TO unit.
    fn bound(&mut self, part: Option<NodeId>, default: &str) -> Emit<String> {
        let program = self.program;
        let tree = &program.tree;
        let Some(unit) = part.and_then(|p| tree.children(p).find(|&u| is_unit(tree, u))) else {
            return Ok(default.to_owned());
        };
        if self.mode(unit) != Some(CMode::Int) || !self.is_basic(unit) {
            return abandon(unit, "loop bounds are not basic");
        }
        self.passes(unit)
    }

    fn loop_clause(&mut self, q: NodeId) -> Emit {
        let program = self.program;
        let tree = &program.tree;
        let for_part = tree.find_child(q, Attribute::ForPart);
        let to_part = tree.find_child(q, Attribute::ToPart);
        let while_serial = tree
            .find_child(q, Attribute::WhilePart)
            .and_then(|w| tree.find_child(w, Attribute::SerialClause));
        let do_serial = tree
            .find_child(q, Attribute::DoPart)
            .and_then(|d| tree.find_child(d, Attribute::SerialClause));
        let until = tree.find_child(q, Attribute::UntilPart);
        let Some(governing) = while_serial.or(do_serial) else {
            return abandon(q, "loop without a body");
        };
        let downto = to_part.and_then(|t| tree.sub(t)).is_some_and(|s| tree.is(s, Attribute::DowntoSymbol));

        let from = self.bound(tree.find_child(q, Attribute::FromPart), "1")?;
        let by = self.bound(tree.find_child(q, Attribute::ByPart), "1")?;
        let to = match to_part {
            Some(_) => Some(self.bound(to_part, "0")?),
            None => None,
        };
        let n = q.raw();
        let counter = format!("_k_{n}");
        self.ctx.declare(&format!("INT_T {counter}, _by_{n}, _to_{n};"));
        if downto {
            self.ctx.writeln(&format!("_by_{n} = -({by});"));
        } else {
            self.ctx.writeln(&format!("_by_{n} = {by};"));
        }
        let condition = match to {
            Some(to) => {
                self.ctx.writeln(&format!("_to_{n} = {to};"));
                format!("(_by_{n} >= 0 ? {counter} <= _to_{n} : {counter} >= _to_{n})")
            }
            None => String::new(),
        };
        self.ctx.writeln(&format!("for ({counter} = {from}; {condition}; {counter} += _by_{n}) {{"));
        self.branch(|g| {
            let base = g.frames.len();
            let mark = g.open_frame(governing);
            if let Some(identifier) = for_part.and_then(|f| g.program.tree.find_child(f, Attribute::DefiningIdentifier)) {
                g.loop_identifier(identifier, &counter)?;
            }
            if while_serial.is_some() {
                let (_, condition) = g.enquiry(g.program.tree.find_child(q, Attribute::WhilePart), CMode::Bool, q)?;
                g.long_mode_allowed = false;
                let value = g.passes(condition);
                g.long_mode_allowed = true;
                let value = value?;
                g.ctx.writeln(&format!("if ({value} == A68_FALSE) {{"));
                g.ctx.indent();
                g.break_loop(base);
                g.ctx.dedent();
                g.ctx.writeln("}");
                if let Some(do_serial) = do_serial {
                    let inner = g.open_frame(do_serial);
                    g.serial_items(do_serial, None)?;
                    g.until(until, q, base)?;
                    g.close_frame(inner);
                } else {
                    g.until(until, q, base)?;
                }
            } else {
                g.serial_items(governing, None)?;
                g.until(until, q, base)?;
            }
            g.close_frame(mark);
            Ok(())
        })?;
        self.ctx.writeln("}");
        Ok(())
    }

    /// Set the FOR identifier of this iteration in the open frame.
    fn loop_identifier(&mut self, identifier: NodeId, counter: &str) -> Emit {
        let program = self.program;
        let Some(tag) = program.tree[identifier].tag else {
            return abandon(identifier, "loop identifier without a tag");
        };
        let offset = program.tables.tag(tag).offset;
        let name = format!("_N_{}", identifier.raw());
        self.ctx.declare(&format!("A68_INT * {name};"));
        self.ctx.writeln(&format!("{name} = (A68_INT *) FRAME_OBJECT ({offset});"));
        self.ctx.writeln(&format!("STATUS ({name}) = INIT_MASK;"));
        self.ctx.writeln(&format!("VALUE ({name}) = {counter};"));
        if self.shares_fetches() {
            self.book.sign_in(Action::Frame, Pass::Declare, tag, identifier, name.clone());
            self.book.sign_in(Action::Frame, Pass::Execute, tag, identifier, name);
        }
        Ok(())
    }

    fn until(&mut self, until: Option<NodeId>, q: NodeId, base: usize) -> Emit {
        if until.is_none() {
            return Ok(());
        }
        let (_, condition) = self.enquiry(until, CMode::Bool, q)?;
        let value = self.passes(condition)?;
        self.ctx.writeln(&format!("if ({value} == A68_TRUE) {{"));
        self.ctx.indent();
        self.break_loop(base);
        self.ctx.dedent();
        self.ctx.writeln("}");
        Ok(())
    }

    /// Leave the loop, closing every frame opened in this iteration.
    fn break_loop(&mut self, base: usize) {
        for _ in base..self.frames.len() {
            self.ctx.writeln("CLOSE_FRAME;");
        }
        self.ctx.writeln("break;");
    }
}
