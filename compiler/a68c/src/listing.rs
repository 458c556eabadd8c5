//! Text listings of a compiled program: the tree and the mode list.

use std::fmt::Write;

use a68_ir::{NodeId, Program};
use a68_stack::ensure_sufficient_stack;

/// The tree from its top, one node per line: source line number,
/// attribute indented by depth, the symbol of a leaf, and the mode after
/// a colon.
pub fn tree_listing(program: &Program) -> String {
    let mut out = String::new();
    list_chain(program, program.tree.top, 0, &mut out);
    out
}

fn list_chain(program: &Program, first: Option<NodeId>, depth: usize, out: &mut String) {
    for p in program.tree.siblings(first) {
        let node = &program.tree[p];
        let line = program.lines.get(node.span.line).map_or(0, |l| l.number);
        let _ = write!(out, "{line:>4} {:indent$}{}", "", node.attribute.name(), indent = depth * 2);
        let text = program.text(p);
        if node.sub.is_none() && !text.is_empty() {
            let _ = write!(out, " \"{text}\"");
        }
        if let Some(m) = node.moid {
            let _ = write!(out, " : {}", program.moid_text(program.moids.canonical(m)));
        }
        if let Some(name) = &node.genie.compile_name {
            let _ = write!(out, " [{name}]");
        }
        out.push('\n');
        ensure_sufficient_stack(|| list_chain(program, node.sub, depth + 1, out));
    }
}

/// Every mode left after equivalencing, by number.
pub fn modes_listing(program: &Program) -> String {
    let moids = &program.moids;
    let mut out = String::new();
    for m in moids.ids().filter(|&m| moids.canonical(m) == m) {
        let _ = writeln!(out, "{:>4} {}", m.index(), program.moid_text(m));
    }
    out
}
