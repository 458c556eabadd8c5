//! Refinements.
//!
//! ```text
//! BEGIN read data; print result END.
//! read data: read(x).
//! print result: print(x * x).
//! ```
//!
//! Everything after the first point at bracket depth zero is a list of
//! `identifier : tokens .` definitions. Each applied identifier in the
//! program (or in another refinement) is replaced by the tokens of its
//! definition. A refinement must be applied exactly once.

use rustc_hash::FxHashMap;
use tracing::debug;

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::Attribute;

use crate::token::Token;

struct Refinement {
    name: Token,
    body: Vec<Token>,
    applied: bool,
}

fn depth_change(attribute: Attribute) -> i32 {
    if attribute.closer().is_some() {
        1
    } else if attribute.is_closer() {
        -1
    } else {
        0
    }
}

/// Index of the first point outside all brackets, from `from`.
fn top_level_point(tokens: &[Token], from: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate().skip(from) {
        if depth == 0 && token.is(Attribute::PointSymbol) {
            return Some(i);
        }
        depth += depth_change(token.attribute);
    }
    None
}

/// Substitute refinements into the program text.
pub fn apply_refinements(mut tokens: Vec<Token>, diags: &mut DiagnosticQueue) -> PhaseResult<Vec<Token>> {
    let Some(point) = top_level_point(&tokens, 0) else {
        return Ok(tokens);
    };
    if point + 1 == tokens.len() {
        tokens.truncate(point);
        return Ok(tokens);
    }
    let starts_definition =
        tokens[point + 1].is(Attribute::Identifier) && tokens.get(point + 2).is_some_and(|t| t.is(Attribute::ColonSymbol));
    if !starts_definition {
        return Ok(tokens);
    }

    let mut refinements: Vec<Refinement> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut i = point + 1;
    while i < tokens.len() {
        let well_formed =
            tokens[i].is(Attribute::Identifier) && tokens.get(i + 1).is_some_and(|t| t.is(Attribute::ColonSymbol));
        if !well_formed {
            diags.report(error_at(
                ErrorCode::E0012,
                tokens[i].span,
                "refinement definition expected",
            ))?;
            break;
        }
        let end = top_level_point(&tokens, i + 2).unwrap_or(tokens.len());
        let name = tokens[i].clone();
        if index.contains_key(&name.text) {
            diags.report(error_at(
                ErrorCode::E0008,
                name.span,
                format!("refinement \"{}\" is defined twice", name.text),
            ))?;
            tokens.truncate(point);
            return Ok(tokens);
        }
        index.insert(name.text.clone(), refinements.len());
        refinements.push(Refinement {
            name,
            body: tokens[i + 2..end].to_vec(),
            applied: false,
        });
        i = end + 1;
    }
    debug!(count = refinements.len(), "refinements");

    let main: Vec<Token> = tokens.drain(..point).collect();
    let mut out = Vec::with_capacity(main.len());
    expand(&main, &mut refinements, &index, &mut out, diags)?;
    for r in &refinements {
        if !r.applied {
            diags.report(error_at(
                ErrorCode::E0009,
                r.name.span,
                format!("refinement \"{}\" is not applied", r.name.text),
            ))?;
        }
    }
    Ok(out)
}

fn expand(
    seq: &[Token],
    refinements: &mut [Refinement],
    index: &FxHashMap<String, usize>,
    out: &mut Vec<Token>,
    diags: &mut DiagnosticQueue,
) -> PhaseResult {
    for token in seq {
        let found = token
            .is(Attribute::Identifier)
            .then(|| index.get(&token.text).copied())
            .flatten();
        let Some(k) = found else {
            out.push(token.clone());
            continue;
        };
        if refinements[k].applied {
            diags.report(error_at(
                ErrorCode::E0010,
                token.span,
                format!("refinement \"{}\" is applied more than once", token.text),
            ))?;
            continue;
        }
        refinements[k].applied = true;
        let body = refinements[k].body.clone();
        expand(&body, refinements, index, out, diags)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
