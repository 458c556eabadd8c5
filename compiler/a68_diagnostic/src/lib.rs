//! Diagnostics for the Algol 68 compiler.
//!
//! Every phase reports through a [`DiagnosticQueue`]. Reporting past the
//! error limit yields [`PhaseAborted`], which the phase propagates with `?`
//! so the driver can stop cleanly.

mod diagnostic;
pub mod emitter;
mod error_code;
mod queue;

pub use diagnostic::{error_at, syntax_error_at, warning_at, Diagnostic, Label, Severity};
pub use error_code::{ErrorCode, Phase};
pub use queue::{DiagnosticConfig, DiagnosticQueue, PhaseAborted, PhaseResult, MAX_ERRORS};
