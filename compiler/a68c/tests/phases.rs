// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Phase-based compiler tests.
//!
//! Whole programs run through the driver, with the assertions grouped by
//! the phase whose work they look at. Unit tests inside each crate cover
//! the phases one function at a time; these cover how they fit together.
//!
//! # Organization
//!
//! - `front/` - Lexer, preprocessor and parser (`a68_lexer`, `a68_parse`)
//! - `modes/` - Mode collection, checking, coercion and scope (`a68_modes`)
//! - `codegen/` - C generation (`a68_codegen`)
//! - `common/` - Shared test utilities
//!
//! # Running Phase Tests
//!
//! ```bash
//! cargo test -p a68c --test phases
//! cargo test -p a68c --test phases modes
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/front/mod.rs"]
mod front;

#[path = "phases/modes/mod.rs"]
mod modes;

#[path = "phases/codegen/mod.rs"]
mod codegen;
