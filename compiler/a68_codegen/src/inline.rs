//! Inline C for basic units.
//!
//! Each basic unit is visited three times. The declare pass writes the C
//! variables it needs to the head of the function, the execute pass writes
//! the statements that fetch operands into them, and the yield pass
//! returns the expression for the value. Fetches are signed in to the
//! book so a later phrase reading the same object reuses the variable.

use a68_ir::{Attribute, NodeId, TagId};
use a68_stack::ensure_sufficient_stack;

use crate::book::{same_tree, Action};
use crate::fold::{fold, single_unit};
use crate::modes::{frame_type, CMode};
use crate::{abandon, is_unit, Emit, Generator, Pass, WRAPPERS};

/// How an inline operator is written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Template {
    Infix(&'static str),
    Prefix(&'static str),
    /// A macro, C function or cast applied to the operands.
    Apply(&'static str),
    /// Compound assignment through the name on the left.
    Assign(&'static str),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct InlineOp {
    pub template: Template,
    /// Only inline when the right operand folds to a nonzero value.
    pub nonzero_divisor: bool,
}

impl InlineOp {
    pub fn is_assignment(self) -> bool {
        matches!(self.template, Template::Assign(_))
    }

    pub fn write(self, operands: &[String]) -> String {
        match (self.template, operands) {
            (Template::Infix(op), [a, b]) => format!("({a} {op} {b})"),
            (Template::Prefix(op), [a]) => format!("({op}{a})"),
            (Template::Apply(f), args) => format!("{f} ({})", args.join(", ")),
            (Template::Assign(op), [a, b]) => format!("VALUE ({a}) {op} {b}"),
            (_, args) => args.join(", "),
        }
    }
}

/// Inline form of the standard operator whose run-time routine is
/// `runtime`, e.g. `genie_add_int_int`.
pub(crate) fn operator(runtime: &str) -> Option<InlineOp> {
    let rest = runtime.strip_prefix("genie_")?;
    let (slug, modes) = rest.split_once('_')?;
    let plain = |template| Some(InlineOp { template, nonzero_divisor: false });
    let divisor = |template| Some(InlineOp { template, nonzero_divisor: true });
    let arithmetic = matches!(modes, "int_int" | "real_real");
    let ordered = arithmetic || modes == "char_char";
    let equality = ordered || matches!(modes, "bool_bool" | "bits_bits");
    match (slug, modes) {
        ("add", _) if arithmetic => plain(Template::Infix("+")),
        ("sub", _) if arithmetic => plain(Template::Infix("-")),
        ("mul", _) if arithmetic => plain(Template::Infix("*")),
        ("over", "int_int") => divisor(Template::Apply("A68_OVER_INT")),
        ("mod", "int_int") => divisor(Template::Apply("A68_MOD_INT")),
        ("div", "int_int") => divisor(Template::Apply("DIV_INT")),
        ("div", "real_real") => divisor(Template::Infix("/")),
        ("eq", _) if equality => plain(Template::Infix("==")),
        ("ne", _) if equality => plain(Template::Infix("!=")),
        ("lt", _) if ordered => plain(Template::Infix("<")),
        ("le", _) if ordered => plain(Template::Infix("<=")),
        ("gt", _) if ordered => plain(Template::Infix(">")),
        ("ge", _) if ordered => plain(Template::Infix(">=")),
        ("and", "bool_bool") => plain(Template::Infix("&&")),
        ("or", "bool_bool") => plain(Template::Infix("||")),
        ("and", "bits_bits") => plain(Template::Infix("&")),
        ("or", "bits_bits") => plain(Template::Infix("|")),
        ("not", "bool") => plain(Template::Prefix("!")),
        ("not", "bits") => plain(Template::Prefix("~")),
        ("sub", "int" | "real") => plain(Template::Prefix("-")),
        ("add", "int" | "real") => plain(Template::Prefix("+")),
        ("abs", "int") => plain(Template::Apply("A68_ABS")),
        ("abs", "real") => plain(Template::Apply("fabs")),
        ("abs", "bool") => plain(Template::Apply("(INT_T)")),
        ("abs", "char") => plain(Template::Apply("TO_UCHAR")),
        ("sign", "int" | "real") => plain(Template::Apply("A68_SIGN")),
        ("odd", "int") => plain(Template::Apply("A68_ODD")),
        ("entier", "real") => plain(Template::Apply("A68_ENTIER")),
        ("round", "real") => plain(Template::Apply("A68_ROUND")),
        ("plusab", "ref_int_int" | "ref_real_real") => plain(Template::Assign("+=")),
        ("minusab", "ref_int_int" | "ref_real_real") => plain(Template::Assign("-=")),
        ("timesab", "ref_int_int" | "ref_real_real") => plain(Template::Assign("*=")),
        ("overab", "ref_int_int") | ("divab", "ref_real_real") => divisor(Template::Assign("/=")),
        _ => None,
    }
}

/// C function for a standard routine of the run time.
pub(crate) fn routine(runtime: &str) -> Option<&'static str> {
    Some(match runtime {
        "genie_sqrt" => "sqrt",
        "genie_exp" => "exp",
        "genie_ln" => "log",
        "genie_sin" => "sin",
        "genie_cos" => "cos",
        "genie_tan" => "tan",
        "genie_arctan" => "atan",
        _ => return None,
    })
}

/// `f ()` in the yield pass, nothing otherwise.
fn yielded(pass: Pass, f: impl FnOnce() -> String) -> String {
    if pass == Pass::Yield {
        f()
    } else {
        String::new()
    }
}

impl Generator<'_> {
    /// All three passes over `p`, returning its value expression.
    pub(crate) fn passes(&mut self, p: NodeId) -> Emit<String> {
        self.inline_unit(p, Pass::Declare)?;
        self.inline_unit(p, Pass::Execute)?;
        self.inline_unit(p, Pass::Yield)
    }

    /// One pass over the basic unit `p`.
    pub(crate) fn inline_unit(&mut self, p: NodeId, pass: Pass) -> Emit<String> {
        ensure_sufficient_stack(|| self.inline_phrase(p, pass))
    }

    fn inline_phrase(&mut self, p: NodeId, pass: Pass) -> Emit<String> {
        let program = self.program;
        let tree = &program.tree;
        let attr = tree.attribute(p);
        if WRAPPERS.contains(&attr) {
            let Some(q) = tree.sub(p) else {
                return abandon(p, "empty phrase");
            };
            return self.inline_unit(q, pass);
        }
        if self.mode(p).is_some_and(CMode::is_primitive) {
            if let Some(v) = fold(program, p) {
                return Ok(yielded(pass, || v.literal()));
            }
        }
        match attr {
            Attribute::Identifier => self.inline_identifier(p, pass),
            Attribute::Dereferencing => {
                let Some(q) = tree.sub(p) else {
                    return abandon(p, "empty coercion");
                };
                let address = self.inline_name(q, pass)?;
                Ok(yielded(pass, || format!("V ({address})")))
            }
            Attribute::Widening => {
                let Some(q) = tree.sub(p) else {
                    return abandon(p, "empty coercion");
                };
                let x = self.inline_unit(q, pass)?;
                Ok(yielded(pass, || format!("(REAL_T) ({x})")))
            }
            Attribute::Slice => {
                let (pointer, name) = self.element(p, pass)?;
                Ok(yielded(pass, || {
                    if self.mode(p) == Some(CMode::Ref) {
                        name
                    } else {
                        format!("V ({pointer})")
                    }
                }))
            }
            Attribute::Selection => {
                let (pointer, name) = self.field(p, pass)?;
                Ok(yielded(pass, || {
                    if self.mode(p) == Some(CMode::Ref) {
                        name
                    } else {
                        format!("V ({pointer})")
                    }
                }))
            }
            Attribute::Formula | Attribute::MonadicFormula => self.inline_formula(p, pass),
            Attribute::Call => {
                let Some((function, args)) = self.standard_call(p) else {
                    return abandon(p, "call is not basic");
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.inline_unit(arg, pass)?);
                }
                Ok(yielded(pass, || format!("{function} ({})", values.join(", "))))
            }
            Attribute::Cast => {
                let Some(declarer) = tree.sub(p) else {
                    return abandon(p, "empty cast");
                };
                self.inline_unit(tree.last_sibling(declarer), pass)
            }
            Attribute::ClosedClause => {
                let Some(u) = single_unit(program, p) else {
                    return abandon(p, "closed clause is not basic");
                };
                self.inline_unit(u, pass)
            }
            Attribute::IdentityRelation => {
                let children = tree.child_ids(p);
                let [lhs, relation, rhs] = children.as_slice() else {
                    return abandon(p, "malformed identity relation");
                };
                let a = self.identity_side(*lhs, pass)?;
                let b = self.identity_side(*rhs, pass)?;
                let negate = if tree.is(*relation, Attribute::IsntSymbol) { "!" } else { "" };
                Ok(yielded(pass, || format!("({negate}SAME_REF ({a}, {b}))")))
            }
            _ => abandon(p, "construct is not basic"),
        }
    }

    fn inline_formula(&mut self, p: NodeId, pass: Pass) -> Emit<String> {
        let program = self.program;
        let tree = &program.tree;
        let children = tree.child_ids(p);
        let (op, operands) = match children.as_slice() {
            [lhs, op, rhs] => (*op, vec![*lhs, *rhs]),
            [op, operand] => (*op, vec![*operand]),
            _ => return abandon(p, "malformed formula"),
        };
        let Some(inline) = self.operator_of(op).and_then(operator) else {
            return abandon(p, "operator is not inline");
        };
        let mut values = Vec::with_capacity(operands.len());
        for q in operands {
            values.push(self.inline_unit(q, pass)?);
        }
        Ok(yielded(pass, || inline.write(&values)))
    }

    fn identity_side(&mut self, q: NodeId, pass: Pass) -> Emit<String> {
        let r = self.phrase(q);
        if self.program.tree.is(r, Attribute::Nihil) {
            return Ok(yielded(pass, || "nil_ref".to_owned()));
        }
        self.inline_unit(r, pass)
    }

    /// Pointer to the object the name yielded by `q` refers to.
    pub(crate) fn inline_name(&mut self, q: NodeId, pass: Pass) -> Emit<String> {
        let r = self.phrase(q);
        match self.program.tree.attribute(r) {
            Attribute::Identifier => {
                let Some(tag) = self.frame_tag(r) else {
                    return abandon(r, "identifier has no frame object");
                };
                self.deref(r, tag, pass)
            }
            Attribute::Slice => Ok(self.element(r, pass)?.0),
            Attribute::Selection => Ok(self.field(r, pass)?.0),
            _ => abandon(r, "name is not basic"),
        }
    }

    /// Pointer to a LONG or COMPLEX value.
    pub(crate) fn inline_long(&mut self, p: NodeId, pass: Pass) -> Emit<String> {
        let program = self.program;
        if let Some(v) = fold(program, p).filter(|v| !v.is_primitive()) {
            let Some(mode) = self.mode(p) else {
                return abandon(p, "constant has no mode");
            };
            if pass == Pass::Declare {
                self.ctx.declare(&format!("static {} _K_{} = {};", mode.object(), p.raw(), v.literal()));
            }
            return Ok(format!("&_K_{}", p.raw()));
        }
        let r = self.phrase(p);
        match program.tree.attribute(r) {
            Attribute::Identifier => {
                let Some(tag) = self.frame_tag(r) else {
                    return abandon(r, "identifier has no frame object");
                };
                self.frame_object(r, tag, pass)
            }
            Attribute::Dereferencing => match program.tree.sub(r) {
                Some(q) => self.inline_name(q, pass),
                None => abandon(r, "empty coercion"),
            },
            _ => abandon(r, "long value is not basic"),
        }
    }

    fn inline_identifier(&mut self, p: NodeId, pass: Pass) -> Emit<String> {
        let Some(tag) = self.frame_tag(p) else {
            return abandon(p, "identifier has no frame object");
        };
        let object = self.frame_object(p, tag, pass)?;
        let mode = self.mode(p);
        Ok(yielded(pass, || match mode {
            Some(CMode::Ref) => format!("*{object}"),
            Some(c) if c.is_long() => object,
            _ => format!("V ({object})"),
        }))
    }

    /// Name of the variable for a booked fetch. At level 3 and above the
    /// first declaration for the same object wins.
    fn booked_name(&self, action: Action, tag: TagId, same: impl Fn(NodeId) -> bool, own: String) -> (String, bool) {
        if !self.shares_fetches() {
            return (own, false);
        }
        match self.book.signed_in_where(action, Pass::Declare, tag, same) {
            Some(entry) => (entry.name.clone(), true),
            None => (own, false),
        }
    }

    fn executed(&self, action: Action, tag: TagId, same: impl Fn(NodeId) -> bool) -> bool {
        self.shares_fetches() && self.book.signed_in_where(action, Pass::Execute, tag, same).is_some()
    }

    /// Pointer to the frame object of the identifier `p`.
    pub(crate) fn frame_object(&mut self, p: NodeId, tag: TagId, pass: Pass) -> Emit<String> {
        let program = self.program;
        let t = program.tables.tag(tag);
        let Some(ty) = t.moid.and_then(|m| frame_type(program, m)) else {
            return abandon(p, "identifier has no frame object");
        };
        let (name, booked) = self.booked_name(Action::Frame, tag, |_| true, format!("_N_{}", p.raw()));
        match pass {
            Pass::Declare if !booked => {
                self.ctx.declare(&format!("{ty} * {name};"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Frame, Pass::Declare, tag, p, name.clone());
                }
            }
            Pass::Execute if !self.executed(Action::Frame, tag, |_| true) => {
                let offset = t.offset;
                if self.shares_fetches() && self.frames.last() == Some(&Some(t.table)) {
                    self.ctx.writeln(&format!("{name} = ({ty} *) FRAME_OBJECT ({offset});"));
                } else {
                    let level = program.tables.table(t.table).level;
                    self.ctx.writeln(&format!("GET_FRAME ({name}, {ty}, {level}, {offset});"));
                }
                if self.shares_fetches() {
                    self.book.sign_in(Action::Frame, Pass::Execute, tag, p, name.clone());
                }
            }
            _ => {}
        }
        Ok(name)
    }

    /// Pointer to the object the name held by identifier `p` refers to.
    fn deref(&mut self, p: NodeId, tag: TagId, pass: Pass) -> Emit<String> {
        let program = self.program;
        let Some(referred) = program.tables.tag(tag).moid.and_then(|m| CMode::referred(program, m)) else {
            return abandon(p, "identifier is not a name of a plain value");
        };
        let object = referred.object();
        let (name, booked) = self.booked_name(Action::Deref, tag, |_| true, format!("_D_{}", p.raw()));
        match pass {
            Pass::Declare if !booked => {
                self.frame_object(p, tag, pass)?;
                self.ctx.declare(&format!("{object} * {name};"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Deref, Pass::Declare, tag, p, name.clone());
                }
            }
            Pass::Execute if !self.executed(Action::Deref, tag, |_| true) => {
                let frame = self.frame_object(p, tag, pass)?;
                self.ctx.writeln(&format!("{name} = DEREF ({object}, {frame});"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Deref, Pass::Execute, tag, p, name.clone());
                }
            }
            _ => {}
        }
        Ok(name)
    }

    /// Suffix of the `_A_` and `_T_` variables holding the descriptor of
    /// the row held by identifier `p`.
    fn descriptor(&mut self, p: NodeId, tag: TagId, pass: Pass) -> Emit<String> {
        let program = self.program;
        let (suffix, booked) = self.booked_name(Action::Descriptor, tag, |_| true, p.raw().to_string());
        let through_name = program
            .tables
            .tag(tag)
            .moid
            .is_some_and(|m| CMode::of(program, m) == Some(CMode::Ref));
        match pass {
            Pass::Declare if !booked => {
                self.frame_object(p, tag, pass)?;
                self.ctx.declare(&format!("A68_ARRAY * _A_{suffix};"));
                self.ctx.declare(&format!("A68_TUPLE * _T_{suffix};"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Descriptor, Pass::Declare, tag, p, suffix.clone());
                }
            }
            Pass::Execute if !self.executed(Action::Descriptor, tag, |_| true) => {
                let frame = self.frame_object(p, tag, pass)?;
                let row = if through_name {
                    format!("DEREF (A68_ROW, {frame})")
                } else {
                    frame
                };
                self.ctx.writeln(&format!("GET_DESCRIPTOR (_A_{suffix}, _T_{suffix}, {row});"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Descriptor, Pass::Execute, tag, p, suffix.clone());
                }
            }
            _ => {}
        }
        Ok(suffix)
    }

    /// Element pointer and element name of the slice `p`. Both are only
    /// meaningful in the yield pass.
    fn element(&mut self, p: NodeId, pass: Pass) -> Emit<(String, String)> {
        let Some(parts) = self.slice_parts(p) else {
            return abandon(p, "slice is not basic");
        };
        let program = self.program;
        let tree = &program.tree;
        let sub = tree.sub(parts.indexer);
        let same = |q: NodeId| same_tree(tree, tree.sub(q), sub);
        let representative = if self.shares_fetches() {
            self.book
                .signed_in_where(Action::Element, Pass::Declare, parts.tag, same)
                .map(|e| e.node)
        } else {
            None
        };
        let indexer = representative.unwrap_or(parts.indexer);
        let suffix = indexer.raw();
        let object = parts.element.object();
        let descriptor = self.descriptor(parts.ident, parts.tag, pass)?;
        match pass {
            Pass::Declare if representative.is_none() => {
                for &u in &parts.indices {
                    self.inline_unit(u, pass)?;
                }
                self.ctx.declare(&format!("{object} * _E_{suffix};"));
                self.ctx.declare(&format!("INT_T _K_{suffix};"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Element, Pass::Declare, parts.tag, indexer, format!("_E_{suffix}"));
                }
            }
            Pass::Execute if !self.executed(Action::Element, parts.tag, same) => {
                // The representative's own index units were declared.
                let indices: Vec<NodeId> = tree.children(indexer).filter(|&u| is_unit(tree, u)).collect();
                let mut terms = Vec::with_capacity(indices.len());
                for (k, u) in indices.into_iter().enumerate() {
                    self.inline_unit(u, Pass::Execute)?;
                    let i = self.inline_unit(u, Pass::Yield)?;
                    terms.push(format!("INDEX_1 (p, &_T_{descriptor}[{k}], {i})"));
                }
                self.ctx.writeln(&format!("_K_{suffix} = {};", terms.join(" + ")));
                self.ctx
                    .writeln(&format!("_E_{suffix} = ({object} *) ROW_ELEMENT (_A_{descriptor}, _K_{suffix});"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Element, Pass::Execute, parts.tag, indexer, format!("_E_{suffix}"));
                }
            }
            _ => {}
        }
        Ok((
            format!("_E_{suffix}"),
            format!("ELEMENT_NAME (_A_{descriptor}, _K_{suffix})"),
        ))
    }

    /// Field pointer and field name of the selection `p`.
    fn field(&mut self, p: NodeId, pass: Pass) -> Emit<(String, String)> {
        let Some(parts) = self.selection_parts(p) else {
            return abandon(p, "selection is not basic");
        };
        let program = self.program;
        let tree = &program.tree;
        let symbol = tree.symbol(parts.field);
        let same = |q: NodeId| tree.symbol(q) == symbol;
        let (name, booked) = self.booked_name(Action::Field, parts.tag, same, format!("_F_{}", p.raw()));
        let object = parts.mode.object();
        let offset = parts.offset;
        let frame = self.frame_object(parts.ident, parts.tag, pass)?;
        match pass {
            Pass::Declare if !booked => {
                self.ctx.declare(&format!("{object} * {name};"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Field, Pass::Declare, parts.tag, parts.field, name.clone());
                }
            }
            Pass::Execute if !self.executed(Action::Field, parts.tag, same) => {
                let base = if parts.through_name {
                    format!("DEREF (BYTE_T, {frame})")
                } else {
                    frame.clone()
                };
                self.ctx.writeln(&format!("{name} = ({object} *) FIELD ({base}, {offset});"));
                if self.shares_fetches() {
                    self.book.sign_in(Action::Field, Pass::Execute, parts.tag, parts.field, name.clone());
                }
            }
            _ => {}
        }
        Ok((name, format!("FIELD_NAME (*{frame}, {offset})")))
    }
}
