//! Portability warnings on the checked tree.
//!
//! The lexer reports tags spelt with `_` and braces standing for
//! parentheses as it meets them. What is left needs the parse: square
//! brackets the parser took for parentheses, and operator symbols outside
//! the reference language.

use a68_diagnostic::{warning_at, DiagnosticQueue, ErrorCode, PhaseResult};
use a68_ir::{Attribute, NodeId, Program, Status};

/// Operator spellings the reference language does not define.
const EXTENSION_OPERATORS: &[&str] = &["&", "~", "^", "^=", "~=", "+*", "%*", "%*:="];

#[tracing::instrument(level = "debug", skip_all)]
pub fn check(program: &Program, top: NodeId, diags: &mut DiagnosticQueue) -> PhaseResult {
    if !program.options.portcheck {
        return Ok(());
    }
    let tree = &program.tree;
    let mut warnings = 0usize;
    for p in tree.preorder(Some(top)) {
        let node = &tree[p];
        let message = match node.attribute {
            _ if node.status.contains(Status::ALIAS_BRACKETS) && node.sub.is_some() => {
                "square brackets used as parentheses are an extension".to_owned()
            }
            Attribute::Operator | Attribute::DefiningOperator if EXTENSION_OPERATORS.contains(&program.text(p)) => {
                format!("operator \"{}\" is an extension", program.text(p))
            }
            _ => continue,
        };
        diags.report(warning_at(ErrorCode::E5001, node.span, message))?;
        warnings += 1;
    }
    tracing::debug!(warnings, "portability check complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use a68_diagnostic::ErrorCode::*;
    use a68_ir::Options;

    use crate::test_util::{analysed, analysed_with};

    fn portcheck() -> Options {
        Options {
            portcheck: true,
            ..Options::default()
        }
    }

    #[test]
    fn test_extension_operator() {
        let mut a = analysed_with(portcheck(), "BOOL b = TRUE & FALSE");
        assert_eq!(a.codes(), vec![E5001]);
    }

    #[test]
    fn test_standard_operator_is_portable() {
        let mut a = analysed_with(portcheck(), "BOOL b = TRUE AND FALSE");
        assert_eq!(a.codes(), vec![]);
    }

    #[test]
    fn test_no_warnings_without_portcheck() {
        let mut a = analysed("BOOL b = TRUE & FALSE");
        assert_eq!(a.codes(), vec![]);
    }
}
