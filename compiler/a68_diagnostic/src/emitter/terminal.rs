//! Terminal Emitter
//!
//! Prints `file:line:column: severity[CODE]: message`, the offending source
//! line, and a caret underline at the primary label's column.

use std::io::{self, Write};

use a68_ir::{SourceMap, Span, StringInterner};

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// For `Auto`, `is_tty` decides.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!("unknown color mode '{other}'")),
        }
    }
}

/// Source text used to resolve spans into `file:line:column` and excerpts.
#[derive(Clone, Copy)]
struct SourceContext<'a> {
    lines: &'a SourceMap,
    interner: &'a StringInterner,
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<'a, W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceContext<'a>>,
}

impl<'a, W: Write> TerminalEmitter<'a, W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Resolve spans against `lines`.
    #[must_use]
    pub fn with_source(mut self, lines: &'a SourceMap, interner: &'a StringInterner) -> Self {
        self.source = Some(SourceContext { lines, interner });
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error | Severity::SyntaxError => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(severity.as_str(), color);
    }

    fn write_location(&mut self, span: Span) {
        let Some(source) = self.source else {
            return;
        };
        let Some(line) = source.lines.get(span.line) else {
            return;
        };
        let file = source.interner.lookup(line.filename);
        let location = format!("{file}:{}:{}: ", line.number, span.column + 1);
        self.write_colored(&location, colors::BOLD);
    }

    fn write_excerpt(&mut self, span: Span, label: &str, primary: bool) {
        let Some(source) = self.source else {
            return;
        };
        let Some(line) = source.lines.get(span.line) else {
            return;
        };
        let number = line.number.to_string();
        let gutter = " ".repeat(number.len());
        let text = line.text.trim_end_matches(['\n', '\r']).to_string();
        let _ = writeln!(self.writer, "{number} | {text}");
        let pad: String = text
            .chars()
            .take(span.column as usize)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let marker = if primary { "^" } else { "-" }.repeat(span.len.max(1) as usize);
        let _ = write!(self.writer, "{gutter} | {pad}");
        let color = if primary { colors::ERROR } else { colors::SECONDARY };
        self.write_colored(&marker, color);
        if !label.is_empty() {
            let _ = write!(self.writer, " {label}");
        }
        let _ = writeln!(self.writer);
    }
}

impl<'a> TerminalEmitter<'a, io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        Self::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if let Some(span) = diagnostic.primary_span() {
            self.write_location(span);
        }
        self.write_severity(diagnostic.severity);
        self.write_colored(&format!("[{}]", diagnostic.code), colors::BOLD);
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            self.write_excerpt(label.span, &label.message, label.is_primary);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, phase: &str, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }
        if error_count > 0 {
            self.write_colored(phase, colors::ERROR);
        } else {
            self.write_colored(phase, colors::WARNING);
        }
        let _ = writeln!(
            self.writer,
            ": {error_count} error{}, {warning_count} warning{}",
            plural_s(error_count),
            plural_s(warning_count)
        );
    }
}
