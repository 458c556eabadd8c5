//! The tokeniser proper.
//!
//! Bold words are recognised by stropping: under UPPER stropping an
//! upper-case run is bold and `'abc'` is an identifier; under QUOTE
//! stropping `'ABC'` is bold and letters of either case form identifiers.
//! Identifiers may contain spaces, which are dropped: `max int` is `maxint`.

use tracing::trace;

use a68_diagnostic::{error_at, warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, Program, Status, Stropping};

use crate::cursor::{Cursor, Mark};
use crate::token::Token;

/// Characters that may start an operator.
const MONADS: &str = "+-!?%^&~";
/// Characters that may start or continue an operator.
const NOMADS: &str = "<>/=*";

pub(crate) struct Scanner<'a> {
    pub(crate) program: &'a mut Program,
    pub(crate) diags: &'a mut DiagnosticQueue,
    pub(crate) cursor: Cursor,
    pub(crate) tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub fn new(program: &'a mut Program, diags: &'a mut DiagnosticQueue) -> Self {
        let cursor = Cursor::new(&program.lines);
        Scanner {
            program,
            diags,
            cursor,
            tokens: Vec::new(),
        }
    }

    pub fn run(mut self) -> PhaseResult<Vec<Token>> {
        while self.next_token()? {}
        Ok(self.tokens)
    }

    fn stropping(&self) -> Stropping {
        self.program.options.stropping
    }

    pub(crate) fn push(&mut self, attribute: Attribute, text: impl Into<String>, start: Mark) {
        let span = self.cursor.span_from(start);
        let token = Token::new(attribute, text, span);
        trace!(attribute = %token.attribute, text = %token.text, "token");
        self.tokens.push(token);
    }

    pub(crate) fn error(&mut self, code: ErrorCode, start: Mark, message: impl Into<String>) -> PhaseResult {
        let span = self.cursor.span_from(start);
        self.diags.report(error_at(code, span, message))
    }

    fn warning(&mut self, code: ErrorCode, start: Mark, message: impl Into<String>) -> PhaseResult {
        let span = self.cursor.span_from(start);
        self.diags.report(warning_at(code, span, message))
    }

    /// Scan one token (or skip one comment or pragmat). `false` at the end.
    pub(crate) fn next_token(&mut self) -> PhaseResult<bool> {
        self.cursor.skip_whitespace();
        let Some(c) = self.cursor.peek() else {
            return Ok(false);
        };
        let start = self.cursor.mark();
        match c {
            '#' => self.hash_comment(start)?,
            '"' => self.string(start)?,
            '$' => self.format_text(start)?,
            '\'' => self.quoted(start)?,
            c if c.is_ascii_digit() => self.denotation(start)?,
            '.' if self.cursor.peek_nth(1).is_some_and(|d| d.is_ascii_digit()) => self.denotation(start)?,
            c if c.is_ascii_uppercase() && self.stropping() == Stropping::Upper => {
                let word = self.cursor.eat_while(is_upper_word_char);
                self.bold(word, start)?;
            }
            c if c.is_ascii_alphabetic() => self.identifier(start)?,
            _ => self.symbol(start)?,
        }
        Ok(true)
    }

    /// Bold word at the cursor, if one starts here.
    pub(crate) fn read_bold(&mut self) -> Option<String> {
        match self.stropping() {
            Stropping::Upper => {
                if !self.cursor.peek().is_some_and(|c| c.is_ascii_uppercase()) {
                    return None;
                }
                Some(self.cursor.eat_while(is_upper_word_char))
            }
            Stropping::Quote => {
                if self.cursor.peek() != Some('\'') {
                    return None;
                }
                let mark = self.cursor.mark();
                self.cursor.bump();
                let word = self.cursor.eat_while(|c| c != '\'');
                if self.cursor.eat('\'') {
                    Some(word.to_ascii_uppercase())
                } else {
                    self.cursor.reset(mark);
                    None
                }
            }
        }
    }

    fn quoted(&mut self, start: Mark) -> PhaseResult {
        self.cursor.bump();
        let word = self.cursor.eat_while(|c| c != '\'');
        if !self.cursor.eat('\'') {
            return self.error(ErrorCode::E0004, start, "unworthy character '''");
        }
        match self.stropping() {
            Stropping::Upper => {
                let text: String = word.chars().filter(|c| !c.is_whitespace()).collect();
                self.push(Attribute::Identifier, text, start);
                Ok(())
            }
            Stropping::Quote => self.bold(word.to_ascii_uppercase(), start),
        }
    }

    fn bold(&mut self, word: String, start: Mark) -> PhaseResult {
        match word.as_str() {
            "CO" | "COMMENT" => return self.bold_comment(&word, start),
            "PR" | "PRAGMAT" => return self.pragmat(&word, start),
            "GO" => {
                let mark = self.cursor.mark();
                self.cursor.skip_whitespace();
                if self.read_bold().as_deref() == Some("TO") {
                    self.push(Attribute::GotoSymbol, "GOTO", start);
                    return Ok(());
                }
                self.cursor.reset(mark);
            }
            _ => {}
        }
        let attribute = self.program.keywords.find_keyword(&word).unwrap_or(Attribute::BoldTag);
        self.push(attribute, word, start);
        Ok(())
    }

    fn identifier(&mut self, start: Mark) -> PhaseResult {
        let upper = self.stropping() == Stropping::Upper;
        let part = move |c: char| {
            if upper {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || c == '_'
            }
        };
        let mut text = self.cursor.eat_while(part);
        loop {
            let mut n = 0;
            while self.cursor.peek_nth(n).is_some_and(|c| c == ' ' || c == '\t') {
                n += 1;
            }
            if n == 0 || !self.cursor.peek_nth(n).is_some_and(part) {
                break;
            }
            for _ in 0..n {
                self.cursor.bump();
            }
            text.push_str(&self.cursor.eat_while(part));
        }
        let underscore = text.contains('_');
        self.push(Attribute::Identifier, text, start);
        if underscore && self.program.options.portcheck {
            self.warning(ErrorCode::E5002, start, "tag containing '_' is not portable")?;
        }
        Ok(())
    }

    fn hash_comment(&mut self, start: Mark) -> PhaseResult {
        self.cursor.bump();
        loop {
            match self.cursor.bump() {
                Some('#') => return Ok(()),
                Some(_) => {}
                None => return self.error(ErrorCode::E0002, start, "unterminated comment"),
            }
        }
    }

    fn bold_comment(&mut self, word: &str, start: Mark) -> PhaseResult {
        loop {
            if self.cursor.is_eof() {
                return self.error(ErrorCode::E0002, start, format!("unterminated comment, expected \"{word}\""));
            }
            match self.read_bold() {
                Some(w) if w == word => return Ok(()),
                Some(_) => {}
                None => {
                    self.cursor.bump();
                }
            }
        }
    }

    pub(crate) fn string(&mut self, start: Mark) -> PhaseResult {
        self.cursor.bump();
        let mut text = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return self.error(ErrorCode::E0001, start, "unterminated string denotation");
                }
                Some('"') => {
                    self.cursor.bump();
                    if self.cursor.eat('"') {
                        text.push('"');
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.cursor.bump();
                }
            }
        }
        self.push(Attribute::RowCharDenotation, text, start);
        Ok(())
    }

    fn is_exponent_marker(&self, c: char) -> bool {
        c == 'e' || c == '\\' || (c == 'E' && self.stropping() == Stropping::Quote)
    }

    fn denotation(&mut self, start: Mark) -> PhaseResult {
        let digits = self.cursor.eat_while(|c| c.is_ascii_digit());
        if !digits.is_empty()
            && self.cursor.peek() == Some('r')
            && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_hexdigit())
        {
            self.cursor.bump();
            let body = self.cursor.eat_while(|c| c.is_ascii_alphanumeric());
            let valid = match digits.parse::<u32>() {
                Ok(radix @ (2 | 4 | 8 | 16)) => body.chars().all(|c| c.is_digit(radix)),
                _ => false,
            };
            if !valid {
                return self.error(ErrorCode::E0005, start, format!("invalid bits denotation {digits}r{body}"));
            }
            self.push(Attribute::BitsDenotation, format!("{digits}r{}", body.to_ascii_lowercase()), start);
            return Ok(());
        }
        let mut text = digits;
        let mut real = false;
        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.cursor.bump();
            text.push('.');
            text.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
            real = true;
        }
        if let Some(e) = self.cursor.peek().filter(|&c| self.is_exponent_marker(c)) {
            let signed = matches!(self.cursor.peek_nth(1), Some('+' | '-'));
            let first = self.cursor.peek_nth(if signed { 2 } else { 1 });
            if first.is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.bump();
                text.push('e');
                if signed {
                    text.extend(self.cursor.bump());
                }
                text.push_str(&self.cursor.eat_while(|c| c.is_ascii_digit()));
                real = true;
            } else {
                self.cursor.bump();
                if signed {
                    self.cursor.bump();
                }
                return self.error(ErrorCode::E0005, start, format!("exponent {e} without digits"));
            }
        }
        if text.starts_with('.') {
            text.insert(0, '0');
        }
        let attribute = if real {
            Attribute::RealDenotation
        } else {
            Attribute::IntDenotation
        };
        self.push(attribute, text, start);
        Ok(())
    }

    fn symbol(&mut self, start: Mark) -> PhaseResult {
        let Some(c) = self.cursor.bump() else {
            return Ok(());
        };
        let next = self.cursor.peek();
        let simple = match c {
            '(' => Some(Attribute::OpenSymbol),
            ')' => Some(Attribute::CloseSymbol),
            '[' => Some(Attribute::SubSymbol),
            ']' => Some(Attribute::BusSymbol),
            ',' => Some(Attribute::CommaSymbol),
            ';' => Some(Attribute::SemiSymbol),
            '@' => Some(Attribute::AtSymbol),
            '.' => Some(Attribute::PointSymbol),
            _ => None,
        };
        if let Some(attribute) = simple {
            self.push(attribute, c.to_string(), start);
            return Ok(());
        }
        match c {
            '{' | '}' => return self.brace(c, start),
            ':' => {
                let (attribute, text) = if next == Some('=') && self.cursor.peek_nth(1) == Some(':') {
                    self.cursor.bump();
                    self.cursor.bump();
                    (Attribute::IsSymbol, ":=:")
                } else if next == Some('/')
                    && self.cursor.peek_nth(1) == Some('=')
                    && self.cursor.peek_nth(2) == Some(':')
                {
                    for _ in 0..3 {
                        self.cursor.bump();
                    }
                    (Attribute::IsntSymbol, ":/=:")
                } else if self.cursor.eat('=') {
                    (Attribute::AssignSymbol, ":=")
                } else {
                    (Attribute::ColonSymbol, ":")
                };
                self.push(attribute, text, start);
            }
            '|' => {
                if self.cursor.eat(':') {
                    self.push(Attribute::BriefElifSymbol, "|:", start);
                } else {
                    self.push(Attribute::BarSymbol, "|", start);
                }
            }
            '=' if !next.is_some_and(|n| n == '=' || n == ':') => {
                self.push(Attribute::EqualsSymbol, "=", start);
            }
            c if MONADS.contains(c) || NOMADS.contains(c) => self.operator(c, start),
            c => {
                return self.error(ErrorCode::E0004, start, format!("unworthy character '{}'", c.escape_default()));
            }
        }
        Ok(())
    }

    fn operator(&mut self, first: char, start: Mark) {
        let mut text = String::from(first);
        text.push_str(&self.cursor.eat_while(|c| NOMADS.contains(c)));
        if self.cursor.peek() == Some(':') {
            if self.cursor.peek_nth(1) == Some('=') && self.cursor.peek_nth(2) != Some(':') {
                self.cursor.bump();
                self.cursor.bump();
                text.push_str(":=");
            } else if text.len() > 1 && text.ends_with('=') {
                self.cursor.bump();
                text.push(':');
            }
        }
        self.push(Attribute::Operator, text, start);
    }

    fn brace(&mut self, c: char, start: Mark) -> PhaseResult {
        if !self.program.options.brackets {
            let attribute = if c == '{' {
                Attribute::AccoSymbol
            } else {
                Attribute::OccaSymbol
            };
            self.push(attribute, c.to_string(), start);
            return Ok(());
        }
        let attribute = if c == '{' {
            Attribute::OpenSymbol
        } else {
            Attribute::CloseSymbol
        };
        self.push(attribute, c.to_string(), start);
        if let Some(token) = self.tokens.last_mut() {
            token.status |= Status::ALIAS_BRACKETS;
        }
        if self.program.options.portcheck && c == '{' {
            self.warning(ErrorCode::E5001, start, "brace used as parenthesis is an extension")?;
        }
        Ok(())
    }
}

fn is_upper_word_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}
