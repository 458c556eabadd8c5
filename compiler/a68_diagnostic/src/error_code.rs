//! Error codes for every compiler diagnostic.
//!
//! Codes are grouped by the phase that raises them:
//! - E0xxx lexer and preprocessor
//! - E1xxx parser (bracket check, reductions, tags)
//! - E2xxx mode collection and equivalencing
//! - E3xxx mode checker and coercions
//! - E4xxx static scope
//! - E5xxx portability
//! - E6xxx code generation
//! - E9xxx internal

use std::fmt;

macro_rules! error_codes {
    ($($code:ident => $summary:literal,)*) => {
        /// Searchable identifier of a diagnostic.
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ErrorCode {
            $(
                #[doc = $summary]
                $code,
            )*
        }

        impl ErrorCode {
            /// Every code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$code,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(ErrorCode::$code => stringify!($code),)*
                }
            }

            /// One-line description, used by `--explain` style listings.
            pub fn summary(self) -> &'static str {
                match self {
                    $(ErrorCode::$code => $summary,)*
                }
            }
        }
    };
}

error_codes! {
    // Lexer
    E0001 => "unterminated string denotation",
    E0002 => "unterminated comment",
    E0003 => "unterminated pragmat",
    E0004 => "unworthy character",
    E0005 => "invalid denotation",
    E0006 => "cannot read source file",
    E0007 => "unterminated format text",
    E0008 => "refinement defined twice",
    E0009 => "refinement not applied",
    E0010 => "refinement applied twice",
    E0012 => "malformed refinement",
    E0013 => "control character in source",
    E0016 => "invalid pragmat option",
    // Parser
    E1001 => "opener without matching closer",
    E1002 => "closer without matching opener",
    E1003 => "syntax error",
    E1004 => "invalid sequence of phrases",
    E1005 => "tag has not been declared",
    E1006 => "tag declared more than once in a range",
    E1007 => "labeled unit must follow EXIT",
    E1008 => "declaration follows a label",
    E1009 => "keyword redefined",
    E1010 => "dyadic operator has no priority",
    E1011 => "priority out of range",
    E1012 => "invalid operator tag",
    E1013 => "ambiguous format pattern",
    // Modes
    E2001 => "mode is cyclic without being shielded",
    E2002 => "mode is not well formed",
    E2003 => "FLEX must be followed by a row",
    E2004 => "field selector declared twice",
    E2005 => "united components are related",
    E2006 => "united components are subsets",
    E2007 => "united components are firmly related",
    E2008 => "operator definitions are firmly related",
    E2009 => "length of mode not supported",
    // Mode checker
    E3001 => "cannot coerce",
    E3002 => "no monadic operator for operand",
    E3003 => "no dyadic operator for operands",
    E3004 => "destination is not a name",
    E3005 => "selection from a value that is not a structure",
    E3006 => "structure has no such field",
    E3007 => "value is neither row nor procedure",
    E3008 => "operand is not a matrix",
    E3009 => "operand is not a vector",
    E3010 => "wrong number of arguments",
    E3011 => "no unique mode for balanced clause",
    E3012 => "component has no value",
    E3013 => "wrong number of indexers",
    E3014 => "invalid operand",
    E3015 => "clause does not yield a value",
    E3016 => "value is voided",
    // Scope
    E4001 => "value may escape its scope",
    E4002 => "name may escape its scope",
    E4003 => "transient name used where it may outlive its row",
    // Portability
    E5001 => "construct is an extension",
    E5002 => "tag is not portable",
    E5003 => "widening is not portable",
    E5004 => "tag may be used before it is initialised",
    // Code generation
    E6001 => "code generation abandoned",
    // Internal
    E9001 => "internal compiler error",
}

impl ErrorCode {
    /// Phase group, from the thousands digit.
    pub fn phase(self) -> Phase {
        match self.as_str().as_bytes().get(1) {
            Some(b'0') => Phase::Lexer,
            Some(b'1') => Phase::Parser,
            Some(b'2') => Phase::Modes,
            Some(b'3') => Phase::ModeChecker,
            Some(b'4') => Phase::Scope,
            Some(b'5') => Phase::Portability,
            Some(b'6') => Phase::Codegen,
            _ => Phase::Internal,
        }
    }

    pub fn is_syntax_error(self) -> bool {
        matches!(self.phase(), Phase::Lexer | Phase::Parser)
    }
}

/// Phase that raised a diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Lexer,
    Parser,
    Modes,
    ModeChecker,
    Scope,
    Portability,
    Codegen,
    Internal,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Modes => "mode collector",
            Phase::ModeChecker => "mode checker",
            Phase::Scope => "scope checker",
            Phase::Portability => "portability checker",
            Phase::Codegen => "code generator",
            Phase::Internal => "compiler",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a code such as `"E3001"`, case-insensitively.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
