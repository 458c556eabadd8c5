//! Parser for Algol 68.
//!
//! Works on the token chain the lexer leaves in [`Program::tree`]:
//! 1. match brackets ([`brackets`])
//! 2. turn bracket pairs into packets and parts ([`top_down`])
//! 3. open the standard environ and a preliminary table per range
//! 4. bind mode indicants, priorities and operators ([`extract`])
//! 5. reduce the packets bottom-up to a particular program ([`reduce`])
//! 6. finalise the tables and bind applied tags ([`finalise`])
//!
//! Every phase reports into the [`DiagnosticQueue`] and carries on; a phase
//! stops early only when the queue's error limit aborts it.

pub mod brackets;
pub mod extract;
pub mod finalise;
pub mod reduce;
pub mod standenv;
pub mod tables;
pub mod top_down;

#[cfg(test)]
mod test_util;

use tracing::debug;

use a68_diagnostic::{DiagnosticQueue, PhaseResult};
use a68_ir::{NodeId, Program};

pub use reduce::MONADIC_PRIORITY;

/// Parse the token chain of `program`.
///
/// Returns the `PARTICULAR_PROGRAM` node, or `None` when there is nothing
/// to parse or the brackets do not match.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(program: &mut Program, diags: &mut DiagnosticQueue) -> PhaseResult<Option<NodeId>> {
    let Some(top) = program.tree.top else {
        return Ok(None);
    };
    let errors = diags.error_count();
    let matches = brackets::check(program, top, diags)?;
    if diags.error_count() > errors {
        return Ok(None);
    }
    top_down::structure(program, top, &matches, diags)?;
    standenv::install(program);
    tables::open_ranges(program, top);
    extract::extract(program, top, diags)?;
    reduce::reduce_program(program, top, diags)?;
    if diags.error_count() == errors {
        finalise::finalise(program, top, diags)?;
    }
    debug!(nodes = program.tree.len(), "parser complete");
    Ok(Some(top))
}
