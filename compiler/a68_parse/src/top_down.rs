//! Top-down structuring.
//!
//! Every matched bracket pair becomes a packet: the opener node turns into
//! the head of a sub-tree holding the opener token, the contents and the
//! closer token. Inside packets the keyword-delimited parts (IF/THEN/ELSE,
//! CASE/IN/OUT, brief `|` forms) become part nodes, and loop phrases are
//! gathered into one `LOOP_CLAUSE`.

use smallvec::SmallVec;

use a68_diagnostic::{syntax_error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Program, Tree};
use a68_stack::ensure_sufficient_stack;

use crate::brackets::Matches;

/// Structure the chain starting at `top`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn structure(program: &mut Program, top: NodeId, matches: &Matches, diags: &mut DiagnosticQueue) -> PhaseResult {
    Structurer { program, matches, diags }.chain(top)
}

struct Structurer<'a> {
    program: &'a mut Program,
    matches: &'a Matches,
    diags: &'a mut DiagnosticQueue,
}

fn is_loop_keyword(attr: Attribute) -> bool {
    matches!(
        attr,
        Attribute::ForSymbol
            | Attribute::FromSymbol
            | Attribute::BySymbol
            | Attribute::ToSymbol
            | Attribute::DowntoSymbol
            | Attribute::WhileSymbol
    )
}

fn loop_part(attr: Attribute) -> Attribute {
    match attr {
        Attribute::ForSymbol => Attribute::ForPart,
        Attribute::FromSymbol => Attribute::FromPart,
        Attribute::BySymbol => Attribute::ByPart,
        Attribute::ToSymbol | Attribute::DowntoSymbol => Attribute::ToPart,
        _ => Attribute::WhilePart,
    }
}

/// A token (not a packet) with attribute `attr`.
fn is_token(tree: &Tree, p: NodeId, attr: Attribute) -> bool {
    tree.is(p, attr) && tree.sub(p).is_none()
}

impl Structurer<'_> {
    fn tree(&mut self) -> &mut Tree {
        &mut self.program.tree
    }

    fn chain(&mut self, first: NodeId) -> PhaseResult {
        let mut p = Some(first);
        while let Some(q) = p {
            if let Some(&close) = self.matches.get(&q) {
                ensure_sufficient_stack(|| self.packet(q, close))?;
            }
            p = self.program.tree.next(q);
        }
        self.loops(first)
    }

    fn packet(&mut self, open: NodeId, close: NodeId) -> PhaseResult {
        let attr = self.program.tree.attribute(open);
        self.tree().make_sub(open, close, attr);
        let Some(inner) = self.program.tree.sub(open) else {
            return Ok(());
        };
        self.chain(inner)?;
        match attr {
            Attribute::IfSymbol => self.parts(
                open,
                Attribute::IfPart,
                &[
                    (Attribute::ThenSymbol, Attribute::ThenPart),
                    (Attribute::ElifSymbol, Attribute::ElifPart),
                    (Attribute::ElseSymbol, Attribute::ElsePart),
                ],
            ),
            Attribute::CaseSymbol => self.parts(
                open,
                Attribute::CasePart,
                &[
                    (Attribute::InSymbol, Attribute::InPart),
                    (Attribute::OuseSymbol, Attribute::OusePart),
                    (Attribute::OutSymbol, Attribute::OutPart),
                ],
            ),
            Attribute::OpenSymbol => self.brief_parts(open),
            Attribute::SubSymbol if self.program.options.brackets => self.brief_parts(open),
            Attribute::DoSymbol => self.parts(open, Attribute::DoPart, &[(Attribute::UntilSymbol, Attribute::UntilPart)]),
            _ => {}
        }
        Ok(())
    }

    /// Split a packet's children at the keywords in `table`.
    fn parts(&mut self, packet: NodeId, first: Attribute, table: &[(Attribute, Attribute)]) {
        let children = self.program.tree.child_ids(packet);
        let Some((&close, body)) = children.split_last() else {
            return;
        };
        let mut starts: SmallVec<[(NodeId, Attribute); 8]> = SmallVec::new();
        for (i, &p) in body.iter().enumerate() {
            if i == 0 {
                starts.push((p, first));
            } else if let Some(&(_, part)) = table.iter().find(|(k, _)| is_token(&self.program.tree, p, *k)) {
                starts.push((p, part));
            }
        }
        self.make_parts(&starts, close);
    }

    fn make_parts(&mut self, starts: &[(NodeId, Attribute)], close: NodeId) {
        for (i, &(start, part)) in starts.iter().enumerate() {
            let end = match starts.get(i + 1) {
                Some(&(next, _)) => self.program.tree.previous(next),
                None => self.program.tree.previous(close),
            };
            if let Some(end) = end {
                self.tree().make_sub(start, end, part);
            }
        }
    }

    /// Brief choice clause parts inside `( )`.
    fn brief_parts(&mut self, packet: NodeId) {
        let children = self.program.tree.child_ids(packet);
        let tree = &self.program.tree;
        let has_bar = children
            .iter()
            .any(|&p| is_token(tree, p, Attribute::BarSymbol) || is_token(tree, p, Attribute::BriefElifSymbol));
        if !has_bar {
            return;
        }
        let Some((&close, body)) = children.split_last() else {
            return;
        };
        let mut starts: SmallVec<[(NodeId, Attribute); 8]> = SmallVec::new();
        let mut previous = Attribute::IfPart;
        for (i, &p) in body.iter().enumerate() {
            let part = if i == 0 {
                Attribute::IfPart
            } else if is_token(tree, p, Attribute::BriefElifSymbol) {
                Attribute::ElifPart
            } else if is_token(tree, p, Attribute::BarSymbol) {
                if matches!(previous, Attribute::IfPart | Attribute::ElifPart) {
                    Attribute::ThenPart
                } else {
                    Attribute::ElsePart
                }
            } else {
                continue;
            };
            starts.push((p, part));
            previous = part;
        }
        self.make_parts(&starts, close);
    }

    /// Gather `FOR .. FROM .. BY .. TO .. WHILE .. DO .. OD` into loop clauses.
    fn loops(&mut self, first: NodeId) -> PhaseResult {
        let mut p = Some(first);
        while let Some(q) = p {
            let tree = &self.program.tree;
            let is_do = tree.is(q, Attribute::DoSymbol) && tree.sub(q).is_some();
            if !is_do && !(is_loop_keyword(tree.attribute(q)) && tree.sub(q).is_none()) {
                p = tree.next(q);
                continue;
            }
            let mut keys: SmallVec<[NodeId; 6]> = SmallVec::new();
            let mut r = Some(q);
            let mut body = None;
            while let Some(n) = r {
                if tree.is(n, Attribute::DoSymbol) && tree.sub(n).is_some() {
                    body = Some(n);
                    break;
                }
                if is_loop_keyword(tree.attribute(n)) && tree.sub(n).is_none() {
                    keys.push(n);
                }
                r = tree.next(n);
            }
            let Some(body) = body else {
                let span = tree[q].span;
                self.diags.report(syntax_error_at(ErrorCode::E1003, span, "loop clause has no DO part"))?;
                return Ok(());
            };
            for (i, &key) in keys.iter().enumerate() {
                let end = match keys.get(i + 1) {
                    Some(&next) => self.program.tree.previous(next),
                    None => self.program.tree.previous(body),
                };
                let part = loop_part(self.program.tree.attribute(key));
                if let Some(end) = end {
                    self.tree().make_sub(key, end, part);
                }
            }
            let Some(inner) = self.program.tree.sub(body) else {
                return Ok(());
            };
            let od = self.program.tree.last_sibling(inner);
            self.tree().replace_with(body, inner, od);
            let start = if q == body { inner } else { q };
            self.tree().make_sub(start, od, Attribute::LoopClause);
            p = self.program.tree.next(start);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
