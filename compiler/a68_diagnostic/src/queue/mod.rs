//! Diagnostic queue: collects, deduplicates and counts diagnostics and
//! decides when a phase has to give up.
//!
//! Features:
//! - Error limit: reporting past [`MAX_ERRORS`] aborts the running phase
//! - Deduplication on (span, code), so two phases meeting the same fault
//!   report it once
//! - One syntax error per source line
//! - Sorted output in source order

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use a68_ir::{LineId, Span};

use crate::{Diagnostic, ErrorCode};

/// Errors tolerated before the running phase is abandoned.
pub const MAX_ERRORS: usize = 5;

/// The running phase stopped because the error limit was passed.
///
/// Phases return this through `?`; the driver keeps what earlier phases
/// produced and skips the rest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("too many errors ({errors}), phase abandoned")]
pub struct PhaseAborted {
    pub errors: usize,
}

/// Result type of a phase.
pub type PhaseResult<T = ()> = Result<T, PhaseAborted>;

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Errors tolerated before a phase aborts (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics repeating a (span, code) pair.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: MAX_ERRORS,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// No limit and no deduplication (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(Span, ErrorCode)>,
    syntax_lines: FxHashSet<LineId>,
    error_count: usize,
    warning_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            syntax_lines: FxHashSet::default(),
            error_count: 0,
            warning_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    /// Record a diagnostic.
    ///
    /// Fails once the number of errors exceeds the configured limit; the
    /// caller propagates the failure out of its phase.
    pub fn report(&mut self, diag: Diagnostic) -> PhaseResult {
        self.add(diag);
        if self.limit_exceeded() {
            debug!(errors = self.error_count, "error limit exceeded");
            return Err(PhaseAborted {
                errors: self.error_count,
            });
        }
        Ok(())
    }

    /// Record a diagnostic without checking the limit.
    ///
    /// Returns `false` when it was filtered as a duplicate.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let span = diag.primary_span().unwrap_or(Span::DUMMY);
        if self.config.deduplicate && !diag.force {
            if self.seen.contains(&(span, diag.code)) {
                return false;
            }
            if diag.code.is_syntax_error()
                && diag.is_error()
                && span != Span::DUMMY
                && self.syntax_lines.contains(&span.line)
            {
                return false;
            }
        }
        self.seen.insert((span, diag.code));
        if diag.is_error() {
            if diag.code.is_syntax_error() {
                self.syntax_lines.insert(span.line);
            }
            self.error_count += 1;
        } else if diag.is_warning() {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    fn limit_exceeded(&self) -> bool {
        self.config.error_limit > 0 && self.error_count > self.config.error_limit
    }

    /// Whether the limit has been reached; one more error aborts.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics so far, without draining.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Take the pending diagnostics in source order.
    ///
    /// Counters survive a flush; they describe the whole compilation.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self.diagnostics.drain(..).collect();
        out.sort_by_key(|d| {
            let span = d.primary_span().unwrap_or(Span::DUMMY);
            (span.line, span.column)
        });
        out
    }
}

#[cfg(test)]
mod tests;
