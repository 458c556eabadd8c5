//! Lexer for Algol 68.
//!
//! Turns source text into the initial chain of token nodes:
//! 1. split into lines and reject control characters
//! 2. splice `PR INCLUDE` files ([`preprocess`])
//! 3. tokenise under the current stropping, honouring pragmat options
//! 4. substitute refinements
//! 5. link the tokens as siblings in [`Program::tree`]

mod cursor;
mod format;
mod loader;
mod pragmat;
mod preprocess;
mod reader;
mod refinement;
mod scanner;
mod token;

pub use loader::{FileLoader, LoadedSource, MemoryLoader, SourceLoader};
pub use preprocess::preprocess;
pub use reader::split_lines;
pub use refinement::apply_refinements;
pub use token::{into_tree, Token};

use tracing::debug;

use a68_diagnostic::{DiagnosticQueue, PhaseResult};
use a68_ir::{NodeId, Program};

/// Load `text` as the main file `filename` and tokenise it.
#[tracing::instrument(level = "debug", skip_all, fields(file = filename))]
pub fn lex(
    program: &mut Program,
    filename: &str,
    text: &str,
    loader: &dyn SourceLoader,
    diags: &mut DiagnosticQueue,
) -> PhaseResult<Option<NodeId>> {
    let tokens = tokenise(program, filename, text, loader, diags)?;
    let top = into_tree(program, &tokens);
    debug!(tokens = tokens.len(), lines = program.lines.len(), "lexer complete");
    Ok(top)
}

/// Everything [`lex`] does except building the node chain.
pub fn tokenise(
    program: &mut Program,
    filename: &str,
    text: &str,
    loader: &dyn SourceLoader,
    diags: &mut DiagnosticQueue,
) -> PhaseResult<Vec<Token>> {
    let file = program.interner.intern(filename);
    for line in split_lines(file, text) {
        program.lines.push(line);
    }
    preprocess(program, filename, loader, diags)?;
    reader::check_control_characters(&program.lines, diags)?;
    let tokens = scanner::Scanner::new(program, diags).run()?;
    apply_refinements(tokens, diags)
}
