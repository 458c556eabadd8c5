//! Splitting source text into lines.

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{LineId, Name, SourceLine, SourceMap, Span};

/// Control characters other than these are rejected.
fn is_allowed_control(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\x0c')
}

/// Split `text` into numbered lines of `filename`.
///
/// CRLF and LF both end a line. A `\` as the last character of a physical
/// line joins it with the next one; the joined line keeps the first line's
/// number.
pub fn split_lines(filename: Name, text: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut pending: Option<SourceLine> = None;
    for (index, raw) in text.split('\n').enumerate() {
        let number = index as u32 + 1;
        let body = raw.strip_suffix('\r').unwrap_or(raw);
        let (body, continues) = match body.strip_suffix('\\') {
            Some(head) => (head, true),
            None => (body, false),
        };
        let line = match pending.take() {
            Some(mut line) => {
                line.text.push_str(body);
                line
            }
            None => SourceLine::new(filename, number, body),
        };
        if continues {
            pending = Some(line);
        } else {
            lines.push(line);
        }
    }
    if let Some(line) = pending {
        lines.push(line);
    }
    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Report control characters in the lines already placed in `map`.
pub fn check_control_characters(map: &SourceMap, diags: &mut DiagnosticQueue) -> PhaseResult {
    for (id, line) in map.iter() {
        if let Some((column, c)) = line
            .text
            .chars()
            .enumerate()
            .find(|&(_, c)| c.is_control() && !is_allowed_control(c))
        {
            diags.report(error_at(
                ErrorCode::E0013,
                Span::new(id, column as u32, 1),
                format!("control character \\x{:02x} in source", c as u32),
            ))?;
        }
    }
    Ok(())
}

/// Line of `map` at `index`, as an id.
pub(crate) fn line_id(index: usize) -> LineId {
    LineId::new(index as u32)
}
