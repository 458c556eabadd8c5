//! Driver for the Algol 68 compiler.
//!
//! Ties the phases together:
//!
//! ```text
//! source → a68_lexer → a68_parse → a68_modes → a68_codegen → C
//! ```
//!
//! [`Compiler`] holds the program and its diagnostics for one compilation
//! and runs the phases in order, stopping after the first phase with
//! errors. [`Config`] and [`parse_args`] are the command line.

mod compiler;
mod config;
mod error;
pub mod listing;

use std::sync::Once;

pub use compiler::{Compiler, Outcome};
pub use config::{parse_args, Command, Config, DEFAULT_OPTIMISE};
pub use error::DriverError;
pub use listing::{modes_listing, tree_listing};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber. Safe to call more than once.
///
/// `RUST_LOG` selects what is logged, e.g. `RUST_LOG=a68_modes=debug`.
/// Without it nothing is installed, unless `reductions` asks for the
/// parser's reduction log.
pub fn init_tracing(reductions: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let mut filter = match std::env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) if reductions => EnvFilter::new("warn"),
            Err(_) => return,
        };
        if reductions {
            if let Ok(directive) = "a68::reductions=info".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(filter)
            .init();
    });
}
