//! The diagnostic record and its builder.

use std::fmt;

use a68_ir::Span;

use crate::ErrorCode;

/// How serious a diagnostic is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    SyntaxError,
    Error,
    Warning,
    Note,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::SyntaxError => "syntax error",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span with a message attached.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// One message from the compiler.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[must_use = "diagnostics should be reported, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    /// Report even when an identical (span, code) pair was already seen.
    pub force: bool,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            force: false,
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    pub fn syntax_error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::SyntaxError)
    }

    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn note(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Note)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Bypass (span, code) deduplication.
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    /// Errors and syntax errors both count toward the error limit.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::SyntaxError)
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Error diagnostic with a single primary label.
pub fn error_at(code: ErrorCode, span: Span, message: impl Into<String>) -> Diagnostic {
    let message = message.into();
    Diagnostic::error(code).with_label(span, "").with_message(message)
}

/// Syntax error with a single primary label.
pub fn syntax_error_at(code: ErrorCode, span: Span, message: impl Into<String>) -> Diagnostic {
    let message = message.into();
    Diagnostic::syntax_error(code).with_label(span, "").with_message(message)
}

/// Warning diagnostic with a single primary label.
pub fn warning_at(code: ErrorCode, span: Span, message: impl Into<String>) -> Diagnostic {
    let message = message.into();
    Diagnostic::warning(code).with_label(span, "").with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a68_ir::LineId;

    #[test]
    fn test_builder_collects_parts() {
        let span = Span::new(LineId::new(0), 4, 2);
        let d = Diagnostic::error(ErrorCode::E1005)
            .with_message("tag \"x\" has not been declared")
            .with_label(span, "here")
            .with_note("declare it before use");
        assert!(d.is_error());
        assert_eq!(d.primary_span(), Some(span));
        assert_eq!(d.notes.len(), 1);
        assert!(!d.force);
    }

    #[test]
    fn test_helpers_set_severity() {
        let span = Span::DUMMY;
        assert!(warning_at(ErrorCode::E5001, span, "extension").is_warning());
        assert!(error_at(ErrorCode::E3001, span, "x").forced().force);
        assert!(syntax_error_at(ErrorCode::E1003, span, "x").is_error());
    }
}
