//! Packets: the bracketed constructs of a chain.
//!
//! What an `( )` packet is depends on its neighbours: after `STRUCT`,
//! `UNION`, `PROC` or `OP` it is a pack of declarers, before a declarer and
//! a colon it is a routine text's parameter pack, before a bare colon a
//! conformity specifier, and otherwise an enclosed clause.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Status, TagKind};
use a68_stack::ensure_sufficient_stack;

use super::{ChainShape, Reducer, Segment};
use crate::tables;

/// Clause a choice packet becomes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Choice {
    Conditional,
    Case,
}

impl Reducer<'_> {
    /// Reduce every packet in `seg`, innermost first.
    pub(crate) fn packets(&mut self, seg: Segment) -> PhaseResult {
        for p in self.nodes(seg) {
            if self.tree().sub(p).is_some() {
                ensure_sufficient_stack(|| self.packet(p))?;
            }
        }
        Ok(())
    }

    fn packet(&mut self, p: NodeId) -> PhaseResult {
        match self.attr(p) {
            Attribute::BeginSymbol => self.enclosed(p),
            Attribute::OpenSymbol => self.open_packet(p),
            Attribute::SubSymbol => self.sub_packet(p),
            Attribute::AccoSymbol => {
                self.syntax_error(p, ErrorCode::E1004, "braces are accepted only under PR BRACKETS PR")?;
                self.enclosed(p)
            }
            Attribute::IfSymbol => self.choice(p, Choice::Conditional),
            Attribute::CaseSymbol => self.choice(p, Choice::Case),
            Attribute::LoopClause => self.loop_clause(p),
            Attribute::FormatDelimiterSymbol => self.format_text(p),
            _ => Ok(()),
        }
    }

    /// A node that can start a declarer.
    pub(crate) fn is_declarer_start(&self, p: Option<NodeId>) -> bool {
        let Some(p) = p else {
            return false;
        };
        match self.attr(p) {
            Attribute::Indicant
            | Attribute::Declarer
            | Attribute::LongSymbol
            | Attribute::ShortSymbol
            | Attribute::RefSymbol
            | Attribute::FlexSymbol
            | Attribute::ProcSymbol
            | Attribute::StructSymbol
            | Attribute::UnionSymbol
            | Attribute::VoidSymbol
            | Attribute::Bounds => true,
            Attribute::SubSymbol => self.tree().sub(p).is_some(),
            _ => false,
        }
    }

    fn open_packet(&mut self, p: NodeId) -> PhaseResult {
        if self.tree().children(p).any(|c| self.tree().is(c, Attribute::IfPart)) {
            return self.brief_choice(p);
        }
        match self.previous(p).map(|q| self.attr(q)) {
            Some(Attribute::StructSymbol) => self.declarer_pack(p, Attribute::StructurePack),
            Some(Attribute::UnionSymbol) => self.declarer_pack(p, Attribute::UnionPack),
            Some(Attribute::ProcSymbol | Attribute::OpSymbol) => self.declarer_pack(p, Attribute::FormalDeclarers),
            _ if self.is_parameter_pack(p) => self.declarer_pack(p, Attribute::ParameterPack),
            _ if self.is_specifier(p) => self.specifier(p),
            _ => self.enclosed(p),
        }
    }

    /// `( decl id, .. ) decl :` of a routine text.
    fn is_parameter_pack(&self, p: NodeId) -> bool {
        if !self.is_declarer_start(self.contents(p).first) {
            return false;
        }
        let mut declarers = 0;
        let mut q = self.next(p);
        while self.is_declarer_start(q) || self.is_packet(q, Attribute::OpenSymbol) {
            declarers += 1;
            q = q.and_then(|n| self.next(n));
        }
        declarers > 0 && self.is(q, Attribute::ColonSymbol)
    }

    /// `( decl id ) :` of a conformity clause.
    fn is_specifier(&self, p: NodeId) -> bool {
        self.is_declarer_start(self.contents(p).first) && self.is(self.next(p), Attribute::ColonSymbol)
    }

    /// An enclosed clause in `( )` or `BEGIN END`.
    pub(crate) fn enclosed(&mut self, p: NodeId) -> PhaseResult {
        let seg = self.contents(p);
        let attr = match self.serial(seg)? {
            ChainShape::Serial(_) => Attribute::ClosedClause,
            ChainShape::Empty | ChainShape::Collateral => Attribute::CollateralClause,
        };
        self.program.tree[p].attribute = attr;
        Ok(())
    }

    /// Packs of declarers, optionally each followed by tags.
    fn declarer_pack(&mut self, p: NodeId, attr: Attribute) -> PhaseResult {
        let seg = self.contents(p);
        if seg.is_empty() {
            self.syntax_error(p, ErrorCode::E1003, format!("empty {}", attr.name().to_lowercase().replace('_', " ")))?;
            self.program.tree[p].attribute = attr;
            return Ok(());
        }
        self.packets(seg)?;
        self.declarers(seg)?;
        let (group, tag) = match attr {
            Attribute::StructurePack => (Some(Attribute::StructuredField), Attribute::FieldIdentifier),
            Attribute::ParameterPack => (Some(Attribute::Parameter), Attribute::DefiningIdentifier),
            _ => (None, Attribute::Identifier),
        };
        let mut expect_item = true;
        let mut at = seg.first;
        while let Some(q) = at.filter(|&q| Some(q) != seg.stop) {
            let ok = if expect_item {
                match group {
                    Some(group) => self.tagged_group(q, group, tag)?,
                    None => self.tree().is(q, Attribute::Declarer),
                }
            } else {
                self.tree().is(q, Attribute::CommaSymbol)
            };
            if !ok {
                let what = if expect_item { "declarer" } else { "comma" };
                self.syntax_error(q, ErrorCode::E1003, format!("{what} expected in {}", attr.name().to_lowercase()))?;
                break;
            }
            expect_item = !expect_item;
            at = self.next(q);
        }
        self.program.tree[p].attribute = attr;
        if attr != Attribute::ParameterPack {
            tables::dissolve(self.program, p);
        }
        Ok(())
    }

    /// `decl tag, tag, ..` grouped under `group`.
    fn tagged_group(&mut self, q: NodeId, group: Attribute, tag: Attribute) -> PhaseResult<bool> {
        if !self.tree().is(q, Attribute::Declarer) || !self.is(self.next(q), Attribute::Identifier) {
            return Ok(false);
        }
        let mut last = q;
        while let Some(id) = self.next(last).filter(|&id| self.tree().is(id, Attribute::Identifier)) {
            self.program.tree[id].attribute = tag;
            if tag == Attribute::DefiningIdentifier {
                let name = self.tree().symbol(id);
                self.binder().declare(id, TagKind::Identifier, name)?;
            }
            last = id;
            let more = self.next(id).filter(|&c| self.tree().is(c, Attribute::CommaSymbol));
            match more.and_then(|c| self.next(c)) {
                Some(after) if self.tree().is(after, Attribute::Identifier) => last = more.unwrap_or(id),
                _ => break,
            }
        }
        self.wrap(q, last, group);
        Ok(true)
    }

    fn specifier(&mut self, p: NodeId) -> PhaseResult {
        let seg = self.contents(p);
        self.packets(seg)?;
        self.declarers(seg)?;
        let nodes = self.nodes(seg);
        let shaped = match nodes.as_slice() {
            [d] => self.tree().is(*d, Attribute::Declarer),
            [d, id] => self.tree().is(*d, Attribute::Declarer) && self.tree().is(*id, Attribute::Identifier),
            _ => false,
        };
        if !shaped {
            self.syntax_error(p, ErrorCode::E1003, "specifier must be a declarer and an optional identifier")?;
        } else if let [_, id] = nodes.as_slice() {
            self.program.tree[*id].attribute = Attribute::DefiningIdentifier;
            let name = self.tree().symbol(*id);
            self.binder().declare(*id, TagKind::Identifier, name)?;
        }
        self.program.tree[p].attribute = Attribute::Specifier;
        Ok(())
    }

    /// Brief `( a | b | c )` forms; a comma or specifier in the first
    /// `|` part makes them a case clause.
    fn brief_choice(&mut self, p: NodeId) -> PhaseResult {
        let then = self.tree().children(p).find(|&c| self.tree().is(c, Attribute::ThenPart));
        let is_case = then.is_some_and(|t| {
            self.nodes(self.part_contents(t)).iter().any(|&n| {
                self.tree().is(n, Attribute::CommaSymbol)
                    || (self.is_packet(Some(n), Attribute::OpenSymbol) && self.is(self.next(n), Attribute::ColonSymbol))
            })
        });
        if is_case {
            for c in self.tree().child_ids(p) {
                let renamed = match self.attr(c) {
                    Attribute::IfPart => Attribute::CasePart,
                    Attribute::ThenPart => Attribute::InPart,
                    Attribute::ElifPart => Attribute::OusePart,
                    Attribute::ElsePart => Attribute::OutPart,
                    other => other,
                };
                self.program.tree[c].attribute = renamed;
            }
            self.choice(p, Choice::Case)
        } else {
            self.choice(p, Choice::Conditional)
        }
    }

    fn choice(&mut self, p: NodeId, kind: Choice) -> PhaseResult {
        let (head, body, elif, other, nested) = match kind {
            Choice::Conditional => (
                Attribute::IfPart,
                Attribute::ThenPart,
                Attribute::ElifPart,
                Attribute::ElsePart,
                Attribute::ElifClause,
            ),
            Choice::Case => (
                Attribute::CasePart,
                Attribute::InPart,
                Attribute::OusePart,
                Attribute::OutPart,
                Attribute::OuseClause,
            ),
        };
        let children = self.tree().child_ids(p);
        let mut united = false;
        for &part in &children {
            let attr = self.attr(part);
            let seg = self.part_contents(part);
            if kind == Choice::Case && attr == body {
                self.unit_list(seg)?;
                united |= self.in_part(part, seg)?;
                continue;
            }
            if ![head, body, elif, other].contains(&attr) {
                continue;
            }
            match self.serial(seg)? {
                ChainShape::Serial(_) => {}
                ChainShape::Empty => {
                    self.syntax_error(part, ErrorCode::E1003, format!("{} is empty", attr.name()))?;
                }
                ChainShape::Collateral => {
                    self.syntax_error(part, ErrorCode::E1004, format!("{} holds a list of units", attr.name()))?;
                }
            }
        }
        self.choice_sequence(p, [head, body, elif, other])?;
        let elifs: Vec<NodeId> = children.iter().rev().copied().filter(|&c| self.tree().is(c, elif)).collect();
        for e in elifs {
            let Some(t) = self.next(e).filter(|&t| self.tree().is(t, body)) else {
                continue;
            };
            let end = match self.next(t) {
                Some(n) if self.tree().is(n, other) || self.tree().is(n, nested) => n,
                _ => t,
            };
            self.wrap(e, end, nested);
        }
        self.program.tree[p].attribute = match (kind, united) {
            (Choice::Conditional, _) => Attribute::ConditionalClause,
            (Choice::Case, false) => Attribute::IntegerCaseClause,
            (Choice::Case, true) => Attribute::UnitedCaseClause,
        };
        Ok(())
    }

    /// Check `head body (elif body)* [other] closer`.
    fn choice_sequence(&mut self, p: NodeId, [head, body, elif, other]: [Attribute; 4]) -> PhaseResult {
        let children = self.tree().child_ids(p);
        let mut expected = vec![head];
        for (i, &c) in children.iter().enumerate() {
            let attr = self.attr(c);
            let last = i + 1 == children.len();
            if last && attr.is_closer() {
                if let Some(missing) = expected.first().filter(|&&e| e == head || e == body) {
                    return self.syntax_error(c, ErrorCode::E1003, format!("{} expected", missing.name()));
                }
                break;
            }
            if !expected.contains(&attr) {
                let wanted = expected.first().map_or("closing bracket", |e| e.name());
                return self.syntax_error(c, ErrorCode::E1003, format!("{wanted} expected"));
            }
            expected = if attr == head || attr == elif {
                vec![body]
            } else if attr == body {
                vec![elif, other]
            } else {
                Vec::new()
            };
        }
        Ok(())
    }

    /// Check an IN part; returns whether it holds specified units.
    fn in_part(&mut self, part: NodeId, seg: Segment) -> PhaseResult<bool> {
        let nodes = self.nodes(seg);
        if nodes.is_empty() {
            self.syntax_error(part, ErrorCode::E1003, "IN part is empty")?;
            return Ok(false);
        }
        let mut specified = false;
        for (i, &q) in nodes.iter().enumerate() {
            let attr = self.attr(q);
            let ok = if i % 2 == 0 {
                specified |= attr == Attribute::SpecifiedUnit;
                attr == Attribute::Unit || attr == Attribute::SpecifiedUnit
            } else {
                attr == Attribute::CommaSymbol
            };
            if !ok {
                self.syntax_error(q, ErrorCode::E1004, format!("unexpected {} in IN part", attr.name()))?;
                break;
            }
        }
        Ok(specified)
    }

    /// `[ ]` packets: bounds and indexers, or a clause under brackets.
    fn sub_packet(&mut self, p: NodeId) -> PhaseResult {
        if self.program.options.brackets && !self.is_sub_context(p) {
            return self.alias_brackets(p);
        }
        let seg = self.contents(p);
        self.unit_list(seg)?;
        self.trimmers(seg)
    }

    /// A `[ ]` packet that slices a primary or starts a declarer.
    fn is_sub_context(&self, p: NodeId) -> bool {
        let after_primary = self.previous(p).is_some_and(|q| match self.attr(q) {
            Attribute::Identifier
            | Attribute::Indicant
            | Attribute::ClosedClause
            | Attribute::CollateralClause
            | Attribute::Primary
            | Attribute::GenericArgument => true,
            Attribute::SubSymbol => self.tree().sub(q).is_some(),
            _ => false,
        });
        after_primary || self.is_declarer_start(self.next(p)) || self.next(p).is_none()
    }

    fn alias_brackets(&mut self, p: NodeId) -> PhaseResult {
        let children = self.tree().child_ids(p);
        if let (Some(&first), Some(&close)) = (children.first(), children.last()) {
            let open = self.tree().descend(first, &[Attribute::IfPart]);
            if self.tree().is(open, Attribute::SubSymbol) {
                self.program.tree[open].attribute = Attribute::OpenSymbol;
            }
            if self.tree().is(close, Attribute::BusSymbol) {
                self.program.tree[close].attribute = Attribute::CloseSymbol;
            }
        }
        self.program.tree[p].attribute = Attribute::OpenSymbol;
        self.program.tree[p].status |= Status::ALIAS_BRACKETS;
        self.open_packet(p)
    }

    /// Comma-separated items of a `[ ]` packet: units, or trimmers and
    /// bounds such as `1:n`, `:`, `@0`.
    fn trimmers(&mut self, seg: Segment) -> PhaseResult {
        let nodes = self.nodes(seg);
        let groups: Vec<&[NodeId]> = nodes.split(|&q| self.tree().is(q, Attribute::CommaSymbol)).collect();
        for group in groups {
            let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
                continue;
            };
            if group.len() == 1 && self.tree().is(first, Attribute::Unit) {
                continue;
            }
            let attrs: Vec<Attribute> = group.iter().map(|&q| self.attr(q)).collect();
            if is_trimmer(&attrs) {
                self.wrap(first, last, Attribute::Trimmer);
            } else {
                self.syntax_error(first, ErrorCode::E1004, "invalid bound or trimmer")?;
            }
        }
        Ok(())
    }

    fn loop_clause(&mut self, p: NodeId) -> PhaseResult {
        const ORDER: [Attribute; 8] = [
            Attribute::ForPart,
            Attribute::FromPart,
            Attribute::ByPart,
            Attribute::ToPart,
            Attribute::WhilePart,
            Attribute::DoPart,
            Attribute::UntilPart,
            Attribute::OdSymbol,
        ];
        let mut rank = 0;
        for part in self.tree().child_ids(p) {
            let attr = self.attr(part);
            match ORDER.iter().position(|&a| a == attr) {
                Some(r) if r >= rank => rank = r + 1,
                _ => {
                    self.syntax_error(part, ErrorCode::E1003, format!("{} out of place in loop clause", attr.name()))?;
                    continue;
                }
            }
            let seg = self.part_contents(part);
            match attr {
                Attribute::ForPart => self.for_part(part, seg)?,
                Attribute::FromPart | Attribute::ByPart | Attribute::ToPart => {
                    self.unit_list(seg)?;
                    let nodes = self.nodes(seg);
                    if nodes.len() != 1 || !self.tree().is(nodes[0], Attribute::Unit) {
                        self.syntax_error(part, ErrorCode::E1003, format!("{} needs a single unit", attr.name()))?;
                    }
                }
                Attribute::WhilePart | Attribute::DoPart | Attribute::UntilPart => match self.serial(seg)? {
                    ChainShape::Serial(_) => {}
                    _ => self.syntax_error(part, ErrorCode::E1003, format!("{} needs a serial clause", attr.name()))?,
                },
                _ => {}
            }
        }
        if rank <= 5 {
            self.syntax_error(p, ErrorCode::E1003, "loop clause has no DO part")?;
        }
        Ok(())
    }

    fn for_part(&mut self, part: NodeId, seg: Segment) -> PhaseResult {
        let nodes = self.nodes(seg);
        match nodes.as_slice() {
            [id] if self.tree().is(*id, Attribute::Identifier) => {
                self.program.tree[*id].attribute = Attribute::DefiningIdentifier;
                let name = self.tree().symbol(*id);
                let tag = self.binder().declare(*id, TagKind::Identifier, name)?;
                self.program.tables.tag_mut(tag).moid = Some(a68_ir::MoidId::INT);
                Ok(())
            }
            _ => self.syntax_error(part, ErrorCode::E1003, "FOR must be followed by one identifier"),
        }
    }
}

/// `[unit] [: [unit]] [@ unit]`, with at least a colon or an at.
fn is_trimmer(attrs: &[Attribute]) -> bool {
    let mut i = 0;
    let mut punctuated = false;
    if attrs.get(i) == Some(&Attribute::Unit) {
        i += 1;
    }
    if attrs.get(i) == Some(&Attribute::ColonSymbol) {
        punctuated = true;
        i += 1;
        if attrs.get(i) == Some(&Attribute::Unit) {
            i += 1;
        }
    }
    if attrs.get(i) == Some(&Attribute::AtSymbol) {
        punctuated = true;
        i += 1;
        if attrs.get(i) != Some(&Attribute::Unit) {
            return false;
        }
        i += 1;
    }
    punctuated && i == attrs.len()
}
