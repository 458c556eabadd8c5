//! Diagnostic emitters.
//!
//! Only a terminal emitter exists: colored, human-readable output with a
//! source excerpt under each diagnostic.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Summary line naming the phase that stopped the compilation.
    fn emit_summary(&mut self, phase: &str, error_count: usize, warning_count: usize);
}
