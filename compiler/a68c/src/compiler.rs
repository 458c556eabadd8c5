//! The compiler context and its phase pipeline.
//!
//! A [`Compiler`] owns one [`Program`] and one [`DiagnosticQueue`]. Phases
//! run in order; after each the driver looks at the error count and skips
//! the rest once there are errors. Warnings never stop anything. A phase
//! that passes the error limit is abandoned where it stands, and what the
//! earlier phases built stays in the program.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use a68_codegen::CodegenResult;
use a68_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};
use a68_diagnostic::{DiagnosticConfig, DiagnosticQueue, Phase, PhaseResult};
use a68_ir::{NodeId, Program};
use a68_lexer::{FileLoader, SourceLoader};

use crate::{Config, DriverError};

/// How far a compilation got.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Phase that reported the first error. Later phases did not run.
    pub failed: Option<Phase>,
    /// The failed phase stopped at the error limit.
    pub aborted: bool,
    /// Set when the C generator ran.
    pub codegen: Option<CodegenResult>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.failed.is_none()
    }
}

pub struct Compiler {
    config: Config,
    pub program: Program,
    pub diags: DiagnosticQueue,
    /// The particular program, once parsed.
    top: Option<NodeId>,
}

impl Compiler {
    pub fn new(config: Config) -> Self {
        let program = Program::new(config.options.clone());
        let diags = DiagnosticQueue::with_config(DiagnosticConfig {
            error_limit: config.error_limit,
            deduplicate: true,
        });
        Compiler {
            config,
            program,
            diags,
            top: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The particular program, when parsing got that far.
    pub fn top(&self) -> Option<NodeId> {
        self.top
    }

    /// Lex, parse and mode-check `text` as the file `filename`.
    pub fn check(&mut self, filename: &str, text: &str, loader: &dyn SourceLoader) -> Outcome {
        let mut outcome = Outcome::default();
        self.front_end(filename, text, loader, &mut outcome);
        outcome
    }

    /// [`Compiler::check`], then generate C when the front end was clean.
    pub fn compile(&mut self, filename: &str, text: &str, loader: &dyn SourceLoader) -> Outcome {
        let mut outcome = Outcome::default();
        let Some(top) = self.front_end(filename, text, loader, &mut outcome) else {
            return outcome;
        };
        outcome.codegen = self.run(Phase::Codegen, &mut outcome, |program, diags| {
            a68_codegen::generate(program, top, diags)
        });
        outcome
    }

    pub fn check_file(&mut self, path: &Path) -> Result<Outcome, DriverError> {
        let text = read_source(path)?;
        let loader = FileLoader::new(self.config.include_paths.clone());
        Ok(self.check(&path.to_string_lossy(), &text, &loader))
    }

    /// Compile the file at `path`, writing the C to the configured file
    /// when there is one.
    pub fn compile_file(&mut self, path: &Path) -> Result<Outcome, DriverError> {
        let text = read_source(path)?;
        let loader = FileLoader::new(self.config.include_paths.clone());
        let outcome = self.compile(&path.to_string_lossy(), &text, &loader);
        if let (Some(out), Some(result)) = (&self.config.emit_c, &outcome.codegen) {
            std::fs::write(out, &result.code).map_err(|source| DriverError::Write {
                path: out.clone(),
                source,
            })?;
            debug!(path = %out.display(), units = result.units.len(), "C written");
        }
        Ok(outcome)
    }

    fn front_end(
        &mut self,
        filename: &str,
        text: &str,
        loader: &dyn SourceLoader,
        outcome: &mut Outcome,
    ) -> Option<NodeId> {
        self.run(Phase::Lexer, outcome, |program, diags| {
            a68_lexer::lex(program, filename, text, loader, diags)
        })??;
        let top = self.run(Phase::Parser, outcome, a68_parse::parse)??;
        self.top = Some(top);
        self.run(Phase::Modes, outcome, |program, diags| {
            a68_modes::analyse(program, top, diags)
        })?;
        Some(top)
    }

    /// Run one phase. `None` when it reported errors or was abandoned.
    fn run<T>(
        &mut self,
        phase: Phase,
        outcome: &mut Outcome,
        f: impl FnOnce(&mut Program, &mut DiagnosticQueue) -> PhaseResult<T>,
    ) -> Option<T> {
        let result = f(&mut self.program, &mut self.diags);
        if let Err(aborted) = &result {
            debug!(phase = phase.name(), errors = aborted.errors, "phase abandoned");
            outcome.aborted = true;
        }
        if result.is_err() || self.diags.has_errors() {
            outcome.failed = Some(self.failing_phase(phase));
            return None;
        }
        result.ok()
    }

    /// The phase named by the first error, which for mode analysis can be
    /// narrower than the phase that ran.
    fn failing_phase(&self, ran: Phase) -> Phase {
        self.diags
            .peek()
            .find(|d| d.is_error())
            .map_or(ran, |d| d.code.phase())
    }

    /// Print the queued diagnostics and the summary line to `writer`.
    pub fn report<W: Write>(&mut self, outcome: &Outcome, writer: W, is_tty: bool) -> W {
        let errors = self.diags.error_count();
        let warnings = self.diags.warning_count();
        let diagnostics = self.diags.flush();
        let phase = outcome
            .failed
            .or_else(|| diagnostics.first().map(|d| d.code.phase()))
            .unwrap_or(Phase::Internal);
        let mut emitter = TerminalEmitter::with_color_mode(writer, self.config.color, is_tty)
            .with_source(&self.program.lines, &self.program.interner);
        emitter.emit_all(&diagnostics);
        emitter.emit_summary(phase.name(), errors, warnings);
        emitter.flush();
        emitter.into_inner()
    }
}

/// Source files are byte streams; anything that is not UTF-8 is kept
/// lossily so the lexer can reject it with a position.
fn read_source(path: &Path) -> Result<String, DriverError> {
    let bytes = std::fs::read(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
