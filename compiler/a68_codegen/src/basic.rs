//! Which units are basic.
//!
//! A basic unit computes a value the generator can hold in a C variable
//! without calling back into the interpreter: its operands are
//! identifiers, denotations, elements of rows and fields of structures
//! of primitive modes, combined by standard operators and routines the
//! generator writes inline.

use a68_ir::{Attribute, MoidId, MoidKind, NodeId, TableId, TagId, TagKind};
use a68_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::fold::{faults, fold, single_unit, Value};
use crate::inline::{operator, routine};
use crate::modes::{frame_type, row_of, struct_of, CMode};
use crate::{is_unit, Generator, WRAPPERS};

/// A subscripted identifier.
pub(crate) struct SliceParts {
    pub ident: NodeId,
    pub tag: TagId,
    pub indexer: NodeId,
    pub indices: SmallVec<[NodeId; 4]>,
    pub element: CMode,
    /// The identifier holds a name of the row.
    pub through_name: bool,
}

/// A field selected from an identifier.
pub(crate) struct SelectionParts {
    pub field: NodeId,
    pub ident: NodeId,
    pub tag: TagId,
    pub offset: usize,
    pub mode: CMode,
    pub through_name: bool,
}

impl Generator<'_> {
    pub(crate) fn is_basic(&self, p: NodeId) -> bool {
        ensure_sufficient_stack(|| self.basic(p))
    }

    fn basic(&self, p: NodeId) -> bool {
        let program = self.program;
        let tree = &program.tree;
        let attr = tree.attribute(p);
        if WRAPPERS.contains(&attr) {
            return tree.sub(p).is_some_and(|q| self.is_basic(q));
        }
        let Some(mode) = self.mode(p) else {
            return false;
        };
        if mode.is_long() {
            return false;
        }
        if mode.is_primitive() && fold(program, p).is_some() {
            return true;
        }
        match attr {
            Attribute::Identifier => self.frame_tag(p).is_some(),
            Attribute::Dereferencing => tree.sub(p).is_some_and(|q| self.is_name(q)),
            Attribute::Widening => {
                let from = tree.sub(p).and_then(|q| program.moid_of(q));
                mode == CMode::Real && from == Some(MoidId::INT) && tree.sub(p).is_some_and(|q| self.is_basic(q))
            }
            Attribute::Slice => self.slice_parts(p).is_some_and(|s| mode != CMode::Ref || s.through_name),
            Attribute::Selection => self.selection_parts(p).is_some_and(|s| mode != CMode::Ref || s.through_name),
            Attribute::Formula | Attribute::MonadicFormula => self.is_inline_formula(p),
            Attribute::Call => self.standard_call(p).is_some(),
            Attribute::Cast => tree.sub(p).is_some_and(|d| self.is_basic(tree.last_sibling(d))),
            Attribute::ClosedClause => single_unit(program, p).is_some_and(|u| self.is_basic(u)),
            Attribute::IdentityRelation => {
                let children = tree.child_ids(p);
                matches!(children.as_slice(), [a, _, b] if self.is_identity_side(*a) && self.is_identity_side(*b))
            }
            _ => false,
        }
    }

    /// C mode of the value of `p`.
    pub(crate) fn mode(&self, p: NodeId) -> Option<CMode> {
        CMode::of(self.program, self.program.moid_of(p)?)
    }

    /// Tag of an identifier whose value lives in a frame the generator can
    /// address.
    pub(crate) fn frame_tag(&self, p: NodeId) -> Option<TagId> {
        let program = self.program;
        if !program.tree.is(p, Attribute::Identifier) {
            return None;
        }
        let id = program.tree[p].tag?;
        let tag = program.tables.tag(id);
        let framed = tag.kind == TagKind::Identifier
            && tag.table != TableId::STANDENV
            && tag.moid.is_some_and(|m| frame_type(program, m).is_some());
        framed.then_some(id)
    }

    /// Whether `q` yields a name of a primitive object whose address the
    /// generator can compute.
    pub(crate) fn is_name(&self, q: NodeId) -> bool {
        let program = self.program;
        let Some(referred) = program.moid_of(q).and_then(|m| CMode::referred(program, m)) else {
            return false;
        };
        let r = self.phrase(q);
        match program.tree.attribute(r) {
            Attribute::Identifier => self.frame_tag(r).is_some(),
            Attribute::Slice => referred.is_primitive() && self.slice_parts(r).is_some_and(|s| s.through_name),
            Attribute::Selection => {
                referred.is_primitive() && self.selection_parts(r).is_some_and(|s| s.through_name)
            }
            _ => false,
        }
    }

    /// Whether `p` yields a LONG or COMPLEX value the generator can point
    /// at.
    pub(crate) fn is_long_basic(&self, p: NodeId) -> bool {
        let program = self.program;
        if !self.long_mode_allowed || !self.mode(p).is_some_and(CMode::is_long) {
            return false;
        }
        if fold(program, p).is_some_and(|v| !v.is_primitive()) {
            return true;
        }
        let r = self.phrase(p);
        match program.tree.attribute(r) {
            Attribute::Identifier => self.frame_tag(r).is_some(),
            Attribute::Dereferencing => program.tree.sub(r).is_some_and(|q| {
                let s = self.phrase(q);
                self.frame_tag(s).is_some() && program.moid_of(q) == program.moid_of(s)
            }),
            _ => false,
        }
    }

    /// An identifier of a name, or NIL.
    fn is_identity_side(&self, q: NodeId) -> bool {
        let program = self.program;
        let r = self.phrase(q);
        match program.tree.attribute(r) {
            Attribute::Nihil => true,
            Attribute::Identifier => {
                self.frame_tag(r).is_some()
                    && program.moid_of(q) == program.moid_of(r)
                    && self.mode(r) == Some(CMode::Ref)
            }
            _ => false,
        }
    }

    /// The identifier below the wrappers of `q`, when no coercion sits on
    /// the way.
    pub(crate) fn plain_identifier(&self, q: NodeId) -> Option<(NodeId, TagId)> {
        let r = self.phrase(q);
        let tag = self.frame_tag(r)?;
        (self.program.moid_of(q) == self.program.moid_of(r)).then_some((r, tag))
    }

    pub(crate) fn slice_parts(&self, p: NodeId) -> Option<SliceParts> {
        let program = self.program;
        let tree = &program.tree;
        let children = tree.child_ids(p);
        let (&primary, &indexer) = (children.first()?, children.get(1)?);
        if !tree.is(indexer, Attribute::Indexer) {
            return None;
        }
        let (ident, tag) = self.plain_identifier(primary)?;
        let m = program.moid_of(ident)?;
        let (dim, element) = row_of(program, m)?;
        let mut indices = SmallVec::new();
        for item in tree.children(indexer) {
            match tree.attribute(item) {
                _ if is_unit(tree, item) => {
                    if self.mode(item) != Some(CMode::Int) || !self.is_basic(item) {
                        return None;
                    }
                    indices.push(item);
                }
                Attribute::Trimmer => return None,
                _ => {}
            }
        }
        if indices.len() != usize::try_from(dim).ok()? {
            return None;
        }
        Some(SliceParts {
            ident,
            tag,
            indexer,
            indices,
            element,
            through_name: program.moids.is(program.moids.canonical(m), MoidKind::Ref),
        })
    }

    pub(crate) fn selection_parts(&self, p: NodeId) -> Option<SelectionParts> {
        let program = self.program;
        let tree = &program.tree;
        let field = tree.sub(p)?;
        let secondary = tree.last_sibling(field);
        let (ident, tag) = self.plain_identifier(secondary)?;
        let m = program.moid_of(ident)?;
        let structure = struct_of(program, m)?;
        let name = tree.symbol(field);
        let entry = program.moids[structure].pack.iter().find(|e| e.text == Some(name))?;
        let mode = CMode::of(program, entry.moid).filter(|c| c.is_primitive())?;
        Some(SelectionParts {
            field,
            ident,
            tag,
            offset: entry.offset,
            mode,
            through_name: program.moids.is(program.moids.canonical(m), MoidKind::Ref),
        })
    }

    fn is_inline_formula(&self, p: NodeId) -> bool {
        let program = self.program;
        let tree = &program.tree;
        let children = tree.child_ids(p);
        let (op, operands): (NodeId, SmallVec<[NodeId; 2]>) = match children.as_slice() {
            [lhs, op, rhs] => (*op, SmallVec::from_slice(&[*lhs, *rhs])),
            [op, operand] => (*op, SmallVec::from_slice(&[*operand])),
            _ => return false,
        };
        let Some(inline) = self.operator_of(op).and_then(operator) else {
            return false;
        };
        if inline.is_assignment() || !operands.iter().all(|&q| self.is_basic(q)) {
            return false;
        }
        if faults(program, p, &operands) {
            return false;
        }
        !inline.nonzero_divisor || operands.last().is_some_and(|&d| nonzero(fold(program, d)))
    }

    /// Run-time routine of the operator at `op`.
    pub(crate) fn operator_of(&self, op: NodeId) -> Option<&'static str> {
        let tag = self.program.tree[op].tag?;
        self.program.tables.tag(tag).runtime
    }

    /// C function and arguments of a call of a standard routine.
    pub(crate) fn standard_call(&self, p: NodeId) -> Option<(&'static str, SmallVec<[NodeId; 2]>)> {
        let program = self.program;
        let tree = &program.tree;
        let primary = tree.sub(p)?;
        let argument = tree.next(primary).filter(|&a| tree.is(a, Attribute::Argument))?;
        let ident = self.phrase(primary);
        let tag = tree[ident].tag.filter(|_| tree.is(ident, Attribute::Identifier))?;
        let function = routine(program.tables.tag(tag).runtime?)?;
        let args: SmallVec<[NodeId; 2]> = tree.children(argument).filter(|&u| is_unit(tree, u)).collect();
        args.iter().all(|&u| self.is_basic(u)).then_some((function, args))
    }

    /// Procedure identifier and arguments of a call of a user procedure.
    pub(crate) fn procedure_call(&self, p: NodeId) -> Option<(NodeId, TagId, SmallVec<[NodeId; 4]>)> {
        let program = self.program;
        let tree = &program.tree;
        let primary = tree.sub(p)?;
        let argument = tree.next(primary).filter(|&a| tree.is(a, Attribute::Argument))?;
        let (ident, tag) = self.plain_identifier(primary)?;
        let m = program.moid_of(ident)?;
        if !program.moids.is(m, MoidKind::Proc) {
            return None;
        }
        let args: SmallVec<[NodeId; 4]> = tree.children(argument).filter(|&u| is_unit(tree, u)).collect();
        let pushable = |u: NodeId| self.mode(u).is_some_and(|c| !c.is_long()) && self.is_basic(u);
        args.iter().all(|&u| pushable(u)).then_some((ident, tag, args))
    }

    /// Procedure identifier of a deproceduring.
    pub(crate) fn deprocedured(&self, d: NodeId) -> Option<(NodeId, TagId)> {
        let program = self.program;
        let (ident, tag) = self.plain_identifier(program.tree.sub(d)?)?;
        program
            .moid_of(ident)
            .is_some_and(|m| program.moids.is_proc_void_args(m))
            .then_some((ident, tag))
    }
}

pub(crate) fn nonzero(v: Option<Value>) -> bool {
    match v {
        Some(Value::Int(x)) => x != 0,
        Some(Value::Real(x)) => x != 0.0,
        _ => false,
    }
}
