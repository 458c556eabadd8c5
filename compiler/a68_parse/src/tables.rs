//! Preliminary symbol tables.
//!
//! Every range gets a table before reduction so declarations can be bound
//! as soon as they are recognised. A range node keeps the table it appears
//! in; its children live in the new table. Parts of a choice or loop clause
//! chain to the part that governs them.

use rustc_hash::FxHashSet;

use a68_ir::{Attribute, NodeId, Program, TableId};
use a68_stack::ensure_sufficient_stack;

/// Open the program's tables. Returns the table of the outermost range.
pub fn open_ranges(program: &mut Program, top: NodeId) -> TableId {
    let table = program.tables.new_table(TableId::STANDENV);
    program.tables.table_mut(table).attribute = Some(Attribute::ParticularProgram);
    assign(program, Some(top), table);
    table
}

fn is_range(program: &Program, p: NodeId) -> bool {
    let tree = &program.tree;
    match tree.attribute(p) {
        Attribute::BeginSymbol | Attribute::OpenSymbol | Attribute::AccoSymbol | Attribute::FormatDelimiterSymbol => {
            tree.sub(p).is_some()
        }
        Attribute::IfPart
        | Attribute::ThenPart
        | Attribute::ElifPart
        | Attribute::ElsePart
        | Attribute::CasePart
        | Attribute::InPart
        | Attribute::OusePart
        | Attribute::OutPart
        | Attribute::WhilePart
        | Attribute::DoPart
        | Attribute::UntilPart => true,
        _ => false,
    }
}

/// Tables of the parts that later parts chain to.
#[derive(Default)]
struct Governing {
    choice: Option<TableId>,
    condition: Option<TableId>,
    body: Option<TableId>,
}

fn assign(program: &mut Program, first: Option<NodeId>, table: TableId) {
    let mut governing = Governing::default();
    let chain: Vec<NodeId> = program.tree.siblings(first).collect();
    for q in chain {
        program.tree[q].table = Some(table);
        let Some(sub) = program.tree.sub(q) else {
            continue;
        };
        let inner = if is_range(program, q) {
            let attr = program.tree.attribute(q);
            let previous = match attr {
                Attribute::ThenPart
                | Attribute::ElifPart
                | Attribute::ElsePart
                | Attribute::InPart
                | Attribute::OusePart
                | Attribute::OutPart => governing.choice,
                Attribute::DoPart => governing.condition,
                Attribute::UntilPart => governing.body,
                _ => None,
            }
            .unwrap_or(table);
            let new = program.tables.new_table(previous);
            let range = program.tables.table_mut(new);
            range.attribute = Some(attr);
            if previous != table {
                range.outer = Some(table);
            }
            match attr {
                Attribute::IfPart | Attribute::ElifPart | Attribute::CasePart | Attribute::OusePart => {
                    governing.choice = Some(new);
                }
                Attribute::WhilePart => governing.condition = Some(new),
                Attribute::DoPart => governing.body = Some(new),
                _ => {}
            }
            new
        } else {
            table
        };
        ensure_sufficient_stack(|| assign(program, Some(sub), inner));
    }
}

/// Table the children of `p` live in.
pub(crate) fn inner_table(program: &Program, p: NodeId) -> Option<TableId> {
    program.tree.sub(p).and_then(|s| program.tree[s].table)
}

/// Fold a packet that turned out not to be a range back into its
/// surroundings.
pub(crate) fn dissolve(program: &mut Program, packet: NodeId) {
    let (Some(inner), Some(outer)) = (inner_table(program, packet), program.tree[packet].table) else {
        return;
    };
    if inner == outer {
        return;
    }
    let children: Vec<NodeId> = program.tree.children(packet).collect();
    for child in children {
        adopt(program, child, inner, outer);
    }
    for tag in program.tables.table(inner).identifiers.clone() {
        program.tables.move_tag(tag, outer);
    }
}

/// Move `body`, written in `outer`, into `range`: its nodes that live in
/// `outer` and the ranges nested directly in `outer`.
pub(crate) fn adopt(program: &mut Program, body: NodeId, outer: TableId, range: TableId) {
    if outer == range {
        return;
    }
    let mut nested = FxHashSet::default();
    let mut nodes = program.tree.descendants(body);
    nodes.push(body);
    for p in nodes {
        match program.tree[p].table {
            Some(t) if t == outer => program.tree[p].table = Some(range),
            Some(t) => {
                nested.insert(t);
            }
            None => {}
        }
    }
    for t in nested {
        if program.tables.table(t).previous == Some(outer) && t != range {
            program.tables.table_mut(t).previous = Some(range);
        }
    }
}

/// Recompute lexical levels after ranges were re-parented.
pub(crate) fn relevel(program: &mut Program) {
    let ids: Vec<TableId> = program.tables.table_ids().collect();
    for t in ids {
        let level = program.tables.chain(t).count() as u32 - 1;
        program.tables.table_mut(t).level = level;
    }
    let tags: Vec<_> = program.tables.tag_ids().collect();
    for tag in tags {
        let table = program.tables.tag(tag).table;
        let level = program.tables.table(table).level;
        program.tables.tag_mut(tag).scope = level;
    }
}
