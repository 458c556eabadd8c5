//! Lexer, preprocessor and parser, seen through the driver.

mod lexer;
mod parse;
