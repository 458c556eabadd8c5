//! Format texts: `$ ... $`.
//!
//! Inside a format text letters are format items, digit runs are
//! replicators and parentheses are format brackets. A dynamic replicator
//! `n (clause)` switches back to ordinary tokenising for the clause.

use a68_diagnostic::{ErrorCode, PhaseResult};
use a68_ir::Attribute;

use crate::cursor::Mark;
use crate::scanner::Scanner;

impl Scanner<'_> {
    pub(crate) fn format_text(&mut self, start: Mark) -> PhaseResult {
        self.cursor.bump();
        self.push(Attribute::FormatDelimiterSymbol, "$", start);
        loop {
            self.cursor.skip_whitespace();
            let at = self.cursor.mark();
            let Some(c) = self.cursor.peek() else {
                return self.error(ErrorCode::E0007, start, "unterminated format text");
            };
            match c {
                '$' => {
                    self.cursor.bump();
                    self.push(Attribute::FormatDelimiterSymbol, "$", at);
                    return Ok(());
                }
                '"' => self.string(at)?,
                '#' => {
                    self.cursor.bump();
                    self.cursor.eat_while(|c| c != '#');
                    if !self.cursor.eat('#') {
                        return self.error(ErrorCode::E0002, at, "unterminated comment");
                    }
                }
                '(' | ')' | ',' => {
                    self.cursor.bump();
                    let attribute = match c {
                        '(' => Attribute::FormatOpenSymbol,
                        ')' => Attribute::FormatCloseSymbol,
                        _ => Attribute::CommaSymbol,
                    };
                    self.push(attribute, c.to_string(), at);
                }
                c if c.is_ascii_digit() => {
                    let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
                    self.push(Attribute::Replicator, digits, at);
                }
                'n' | 'N' if self.dynamic_replicator_follows() => {
                    self.cursor.bump();
                    self.push(Attribute::FormatItem, "n", at);
                    self.enclosed_in_format(start)?;
                }
                c if c.is_ascii_alphabetic() || "+-.".contains(c) => {
                    self.cursor.bump();
                    self.push(Attribute::FormatItem, c.to_ascii_lowercase().to_string(), at);
                }
                c => {
                    self.cursor.bump();
                    self.error(ErrorCode::E0004, at, format!("unworthy character '{c}' in format text"))?;
                }
            }
        }
    }

    fn dynamic_replicator_follows(&self) -> bool {
        let mut n = 1;
        while self.cursor.peek_nth(n).is_some_and(|c| c == ' ' || c == '\t') {
            n += 1;
        }
        self.cursor.peek_nth(n) == Some('(')
    }

    /// Tokenise `( ... )` after `n` as ordinary source.
    fn enclosed_in_format(&mut self, format_start: Mark) -> PhaseResult {
        let mut depth = 0usize;
        loop {
            let before = self.tokens.len();
            if !self.next_token()? {
                return self.error(ErrorCode::E0007, format_start, "unterminated format text");
            }
            for token in &self.tokens[before..] {
                match token.attribute {
                    Attribute::OpenSymbol => depth += 1,
                    Attribute::CloseSymbol => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}
