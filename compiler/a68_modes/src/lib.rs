//! Mode analysis for Algol 68.
//!
//! Runs on a parsed program whose tables are final:
//! 1. give every declarer, routine text and tag its mode ([`collect`])
//! 2. resolve indicants, check well-formedness and reduce the mode list
//!    to one mode per equivalence class ([`expand`])
//! 3. check that united modes and operator declarations are related
//!    properly ([`relations`])
//! 4. mode-check the program, recording the coercions every unit needs
//!    ([`checker`])
//! 5. wrap each unit in its coercion nodes ([`insert`])
//! 6. size modes and lay out frames ([`sizes`])
//! 7. static scope checking ([`scope`]) and portability warnings
//!    ([`portability`])
//!
//! As in the parser, phases report into the [`DiagnosticQueue`] and carry
//! on until its error limit aborts them.

pub mod checker;
pub mod coercion;
pub mod collect;
pub mod derive;
pub mod equivalence;
pub mod expand;
pub mod insert;
pub mod portability;
pub mod relations;
pub mod scope;
pub mod sizes;
pub mod soid;
pub mod well_formed;

#[cfg(test)]
mod test_util;

use tracing::debug;

use a68_diagnostic::{DiagnosticQueue, PhaseResult};
use a68_ir::{NodeId, Program};

pub use checker::Coercion;
pub use coercion::{Path, Step};
pub use soid::{Deflexing, Soid, Sort};

/// Run every mode phase on the particular program at `top`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyse(program: &mut Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    collect::collect(program, top, diags)?;
    expand::expand_contract(program, diags)?;
    relations::check(program, diags)?;
    let coercions = checker::check(program, top, diags)?;
    insert::insert(program, &coercions, diags)?;
    sizes::compute(program);
    scope::check(program, top, diags)?;
    portability::check(program, top, diags)?;
    debug!(moids = program.moids.len(), "mode analysis complete");
    Ok(())
}
