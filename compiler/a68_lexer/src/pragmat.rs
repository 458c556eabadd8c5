//! Pragmats: `PR option ... PR`.
//!
//! Options take effect after the closing word, which is still written in
//! the stropping that was in force when the pragmat opened.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::{Stropping, MAX_OPTIMISE};

use crate::cursor::Mark;
use crate::scanner::Scanner;

/// What an option word does to the options.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum PragmatOption {
    Stropping(Stropping),
    Portcheck(bool),
    Brackets(bool),
    Reductions(bool),
    Optimise(bool),
    /// Handled by the preprocessor.
    Directive,
}

impl PragmatOption {
    pub(crate) fn parse(word: &str) -> Option<PragmatOption> {
        Some(match word.to_ascii_uppercase().as_str() {
            "QUOTESTROPPING" | "QUOTE" => PragmatOption::Stropping(Stropping::Quote),
            "UPPERSTROPPING" | "UPPER" => PragmatOption::Stropping(Stropping::Upper),
            "PORTCHECK" => PragmatOption::Portcheck(true),
            "NOPORTCHECK" => PragmatOption::Portcheck(false),
            "BRACKETS" => PragmatOption::Brackets(true),
            "NOBRACKETS" => PragmatOption::Brackets(false),
            "REDUCTIONS" => PragmatOption::Reductions(true),
            "NOREDUCTIONS" => PragmatOption::Reductions(false),
            "OPTIMISE" | "OPTIMIZE" => PragmatOption::Optimise(true),
            "NOOPTIMISE" | "NOOPTIMIZE" => PragmatOption::Optimise(false),
            "INCLUDE" | "READ" | "PREPROCESSOR" | "NOPREPROCESSOR" => PragmatOption::Directive,
            _ => return None,
        })
    }
}

impl Scanner<'_> {
    pub(crate) fn pragmat(&mut self, opener: &str, start: Mark) -> PhaseResult {
        let mut options = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                return self.error(ErrorCode::E0003, start, format!("unterminated pragmat, expected \"{opener}\""));
            }
            let word_start = self.cursor.mark();
            let word = match self.read_bold() {
                Some(w) if w == opener => break,
                Some(w) => w,
                None => match self.cursor.peek() {
                    Some('"') => {
                        self.skip_string();
                        continue;
                    }
                    Some(c) if c.is_ascii_alphabetic() => self.cursor.eat_while(|c| c.is_ascii_alphanumeric()),
                    _ => {
                        self.cursor.bump();
                        continue;
                    }
                },
            };
            match PragmatOption::parse(&word) {
                Some(option) => options.push(option),
                None => {
                    let span = self.cursor.span_from(word_start);
                    self.diags.report(a68_diagnostic::warning_at(
                        ErrorCode::E0016,
                        span,
                        format!("unrecognised pragmat option \"{word}\""),
                    ))?;
                }
            }
        }
        for option in options {
            self.apply(option);
        }
        Ok(())
    }

    fn apply(&mut self, option: PragmatOption) {
        let options = &mut self.program.options;
        match option {
            PragmatOption::Stropping(s) => options.stropping = s,
            PragmatOption::Portcheck(on) => options.portcheck = on,
            PragmatOption::Brackets(on) => options.brackets = on,
            PragmatOption::Reductions(on) => options.reductions = on,
            PragmatOption::Optimise(true) => options.optimise = options.optimise.clamp(1, MAX_OPTIMISE),
            PragmatOption::Optimise(false) => options.optimise = 0,
            PragmatOption::Directive => {}
        }
    }

    fn skip_string(&mut self) {
        self.cursor.bump();
        while let Some(c) = self.cursor.peek() {
            self.cursor.bump();
            if c == '"' || c == '\n' {
                break;
            }
        }
    }
}
