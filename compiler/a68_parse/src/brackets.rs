//! Bracket matching over the flat token chain.

use rustc_hash::FxHashMap;

use a68_diagnostic::{syntax_error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Program};

/// Opener to closer, for every matched pair.
pub type Matches = FxHashMap<NodeId, NodeId>;

pub(crate) fn spelling(attr: Attribute) -> &'static str {
    match attr {
        Attribute::BeginSymbol => "BEGIN",
        Attribute::EndSymbol => "END",
        Attribute::OpenSymbol => "(",
        Attribute::CloseSymbol => ")",
        Attribute::SubSymbol => "[",
        Attribute::BusSymbol => "]",
        Attribute::AccoSymbol => "{",
        Attribute::OccaSymbol => "}",
        Attribute::IfSymbol => "IF",
        Attribute::FiSymbol => "FI",
        Attribute::CaseSymbol => "CASE",
        Attribute::EsacSymbol => "ESAC",
        Attribute::DoSymbol => "DO",
        Attribute::OdSymbol => "OD",
        Attribute::FormatOpenSymbol | Attribute::FormatCloseSymbol => "format parenthesis",
        Attribute::FormatDelimiterSymbol => "$",
        other => other.name(),
    }
}

fn opener_of(closer: Attribute) -> Option<Attribute> {
    Attribute::ALL.iter().copied().find(|a| a.closer() == Some(closer))
}

/// Match every opener in the chain starting at `top` with its closer.
///
/// Unclosed openers and stray closers are reported; the returned map holds
/// only the pairs that matched.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check(program: &Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult<Matches> {
    let tree = &program.tree;
    let mut matches = Matches::default();
    let mut open: Vec<NodeId> = Vec::new();
    for p in tree.siblings(Some(top)) {
        let attr = tree.attribute(p);
        if attr == Attribute::FormatDelimiterSymbol {
            match open.last() {
                Some(&q) if tree.is(q, Attribute::FormatDelimiterSymbol) => {
                    open.pop();
                    matches.insert(q, p);
                }
                _ => open.push(p),
            }
            continue;
        }
        if attr.closer().is_some() {
            open.push(p);
            continue;
        }
        if !attr.is_closer() {
            continue;
        }
        let wanted = opener_of(attr);
        match open.iter().rposition(|&q| Some(tree.attribute(q)) == wanted) {
            Some(at) => {
                for &q in &open[at + 1..] {
                    unmatched(program, q, diags)?;
                }
                matches.insert(open[at], p);
                open.truncate(at);
            }
            None => {
                let opener = wanted.map_or("opener", spelling);
                diags.report(syntax_error_at(
                    ErrorCode::E1002,
                    tree[p].span,
                    format!("\"{}\" without matching \"{opener}\"", spelling(attr)),
                ))?;
            }
        }
    }
    for &q in &open {
        unmatched(program, q, diags)?;
    }
    Ok(matches)
}

fn unmatched(program: &Program, q: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    let attr = program.tree.attribute(q);
    let closer = attr.closer().unwrap_or(attr);
    diags.report(syntax_error_at(
        ErrorCode::E1001,
        program.tree[q].span,
        format!("\"{}\" without matching \"{}\"", spelling(attr), spelling(closer)),
    ))
}

#[cfg(test)]
mod tests;
