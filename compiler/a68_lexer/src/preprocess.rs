//! Source-level directives handled before tokenising.
//!
//! `PR INCLUDE "file" PR` and `PR READ "file" PR` splice the lines of the
//! named file in place of the directive. Each file is included at most once;
//! a repeated or recursive include is skipped without comment.
//! `PR NOPREPROCESSOR PR` switches directive handling off until
//! `PR PREPROCESSOR PR`.

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use a68_diagnostic::{error_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Program, SourceLine, Span, Stropping};

use crate::loader::SourceLoader;
use crate::reader::{line_id, split_lines};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Directive {
    Include(String),
    NoPreprocessor,
    Preprocessor,
    Stropping(Stropping),
    Other,
}

/// A directive found on a line, with its character range.
#[derive(Clone, Debug)]
struct Found {
    start: usize,
    end: usize,
    directive: Directive,
}

/// Comment state carried from one line to the next.
#[derive(Clone, Debug, Default)]
enum Comment {
    #[default]
    None,
    Hash,
    Bold(String),
}

/// Splice includes into `program.lines`. `main` is the main file's name.
#[tracing::instrument(level = "debug", skip_all)]
pub fn preprocess(
    program: &mut Program,
    main: &str,
    loader: &dyn SourceLoader,
    diags: &mut DiagnosticQueue,
) -> PhaseResult {
    let mut included: FxHashSet<String> = FxHashSet::default();
    included.insert(main.to_string());
    let mut active = true;
    let mut stropping = program.options.stropping;
    let mut comment = Comment::None;
    let mut index = 0;
    while index < program.lines.len() {
        let id = line_id(index);
        let Some(line) = program.lines.get(id) else {
            break;
        };
        let chars: Vec<char> = line.text.chars().collect();
        let filename = line.filename;
        let number = line.number;
        let mut column = 0;
        while let Some(found) = next_directive(&chars, column, stropping, &mut comment) {
            column = found.end;
            match found.directive {
                Directive::Preprocessor => active = true,
                _ if !active => {}
                Directive::NoPreprocessor => active = false,
                Directive::Stropping(s) => stropping = s,
                Directive::Other => {}
                Directive::Include(name) => {
                    let from = program.interner.lookup(filename);
                    let mut spliced: Vec<SourceLine> = Vec::new();
                    match loader.load(&name, from) {
                        Ok(loaded) if included.contains(&loaded.name) => {
                            trace!(file = %loaded.name, "include skipped");
                        }
                        Ok(loaded) => {
                            debug!(file = %loaded.name, "including");
                            let file = program.interner.intern(&loaded.name);
                            spliced = split_lines(file, &loaded.text);
                            included.insert(loaded.name);
                        }
                        Err(e) => {
                            let len = (found.end - found.start) as u32;
                            diags.report(error_at(
                                ErrorCode::E0006,
                                Span::new(id, found.start as u32, len),
                                format!("cannot include \"{name}\": {e}"),
                            ))?;
                        }
                    }
                    let rest: String = chars[found.end..].iter().collect();
                    if !rest.trim().is_empty() {
                        let pad: String = " ".repeat(found.end);
                        spliced.push(SourceLine::new(filename, number, pad + &rest));
                    }
                    if let Some(line) = program.lines.get_mut(id) {
                        line.text = chars[..found.start].iter().collect();
                    }
                    program.lines.splice_after(id, spliced);
                    break;
                }
            }
        }
        index += 1;
    }
    Ok(())
}

fn is_bold_start(c: char) -> bool {
    c.is_ascii_uppercase()
}

/// Bold word at `pos`, with the position after it.
fn bold_word(chars: &[char], pos: usize, stropping: Stropping) -> Option<(String, usize)> {
    match stropping {
        Stropping::Upper => {
            if !chars.get(pos).copied().is_some_and(is_bold_start) {
                return None;
            }
            let end = chars[pos..]
                .iter()
                .position(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_'))
                .map_or(chars.len(), |n| pos + n);
            Some((chars[pos..end].iter().collect(), end))
        }
        Stropping::Quote => {
            if chars.get(pos) != Some(&'\'') {
                return None;
            }
            let close = chars[pos + 1..].iter().position(|&c| c == '\'')? + pos + 1;
            let word: String = chars[pos + 1..close].iter().collect::<String>().to_ascii_uppercase();
            Some((word, close + 1))
        }
    }
}

/// Option word inside a pragmat: a run of letters, quoted or not.
fn option_word(chars: &[char], pos: usize) -> Option<(String, usize)> {
    let quoted = chars.get(pos) == Some(&'\'');
    let start = if quoted { pos + 1 } else { pos };
    let end = chars[start..]
        .iter()
        .position(|c| !c.is_ascii_alphabetic())
        .map_or(chars.len(), |n| start + n);
    if end == start {
        return None;
    }
    let word: String = chars[start..end].iter().collect::<String>().to_ascii_uppercase();
    let end = if quoted && chars.get(end) == Some(&'\'') { end + 1 } else { end };
    Some((word, end))
}

fn skip_blanks(chars: &[char], mut pos: usize) -> usize {
    while chars.get(pos).is_some_and(|c| c.is_whitespace()) {
        pos += 1;
    }
    pos
}

fn next_directive(chars: &[char], mut pos: usize, stropping: Stropping, comment: &mut Comment) -> Option<Found> {
    while pos < chars.len() {
        match comment {
            Comment::Hash => {
                if chars[pos] == '#' {
                    *comment = Comment::None;
                }
                pos += 1;
                continue;
            }
            Comment::Bold(word) => {
                if let Some((w, end)) = bold_word(chars, pos, stropping) {
                    if w == *word {
                        *comment = Comment::None;
                    }
                    pos = end;
                } else {
                    pos += 1;
                }
                continue;
            }
            Comment::None => {}
        }
        let c = chars[pos];
        if c == '"' {
            pos += 1;
            while pos < chars.len() {
                if chars[pos] == '"' {
                    if chars.get(pos + 1) == Some(&'"') {
                        pos += 2;
                        continue;
                    }
                    break;
                }
                pos += 1;
            }
            pos += 1;
            continue;
        }
        if c == '#' {
            *comment = Comment::Hash;
            pos += 1;
            continue;
        }
        if c.is_ascii_alphanumeric() && stropping == Stropping::Upper && !is_bold_start(c) {
            while chars.get(pos).is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
                pos += 1;
            }
            continue;
        }
        let Some((word, end)) = bold_word(chars, pos, stropping) else {
            pos += 1;
            continue;
        };
        match word.as_str() {
            "CO" | "COMMENT" => {
                *comment = Comment::Bold(word);
                pos = end;
            }
            "PR" | "PRAGMAT" => {
                if let Some(found) = parse_pragmat(chars, pos, end, &word, stropping) {
                    return Some(found);
                }
                pos = end;
            }
            _ => pos = end,
        }
    }
    None
}

/// Parse the pragmat opened by `opener` at `start..body`.
fn parse_pragmat(chars: &[char], start: usize, body: usize, opener: &str, stropping: Stropping) -> Option<Found> {
    let pos = skip_blanks(chars, body);
    let (word, after) = option_word(chars, pos)?;
    let (directive, pos) = match word.as_str() {
        "INCLUDE" | "READ" => {
            let open = skip_blanks(chars, after);
            if chars.get(open) != Some(&'"') {
                return None;
            }
            let close = chars[open + 1..].iter().position(|&c| c == '"')? + open + 1;
            let name: String = chars[open + 1..close].iter().collect();
            (Directive::Include(name), close + 1)
        }
        "NOPREPROCESSOR" => (Directive::NoPreprocessor, after),
        "PREPROCESSOR" => (Directive::Preprocessor, after),
        "QUOTESTROPPING" | "QUOTE" => (Directive::Stropping(Stropping::Quote), after),
        "UPPERSTROPPING" | "UPPER" => (Directive::Stropping(Stropping::Upper), after),
        _ => (Directive::Other, after),
    };
    // The closing word is written in the stropping in force before the pragmat.
    let mut pos = skip_blanks(chars, pos);
    loop {
        if pos >= chars.len() {
            return None;
        }
        if let Some((w, end)) = bold_word(chars, pos, stropping) {
            if w == opener {
                return Some(Found { start, end, directive });
            }
            pos = end;
        } else {
            pos += 1;
        }
    }
}
