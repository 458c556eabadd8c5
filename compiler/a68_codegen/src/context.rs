//! Output buffers for the function being compiled.
//!
//! A function is assembled from two buffers: declarations, which the
//! declare pass fills, and statements, which the execute pass and the
//! construct itself fill. Nothing reaches the C file until the function
//! is finished, so an abandoned compile leaves no trace.

use a68_ir::NodeId;

/// Text of one C function under construction.
pub struct CodegenContext {
    /// Current indentation level of statements.
    indent: usize,
    declarations: String,
    statements: String,
    /// Counter for generating unique temporary names.
    temp_counter: u32,
}

impl Default for CodegenContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CodegenContext {
    pub fn new() -> Self {
        Self {
            indent: 1,
            declarations: String::with_capacity(256),
            statements: String::with_capacity(1024),
            temp_counter: 0,
        }
    }

    /// C identifier for an Algol 68 tag or operator spelling.
    ///
    /// C identifiers can only contain alphanumeric characters and
    /// underscores, and cannot start with a digit.
    pub fn mangle(text: &str) -> String {
        let mut result = String::with_capacity(text.len() + 1);
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            result.push('_');
        }
        for c in text.chars() {
            if c.is_ascii_alphanumeric() {
                result.push(c);
            } else {
                result.push('_');
            }
        }
        result
    }

    /// Generate a unique temporary variable name.
    pub fn fresh_temp(&mut self) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("_tmp{n}")
    }

    /// Add a declaration to the head of the function.
    pub fn declare(&mut self, line: &str) {
        self.declarations.push_str("  ");
        self.declarations.push_str(line);
        self.declarations.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 1, "dedent below the function body");
        self.indent = self.indent.saturating_sub(1).max(1);
    }

    /// Write a statement at the current indentation.
    pub fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.statements.push_str("  ");
        }
        self.statements.push_str(s);
        self.statements.push('\n');
    }

    /// Wrap the buffers in the propagator shell of `name` and reset.
    pub fn finish(&mut self, name: &str, node: NodeId) -> String {
        let mut text = String::with_capacity(self.declarations.len() + self.statements.len() + 64);
        text.push_str(&format!("CODE ({name})\n"));
        text.push_str(&self.declarations);
        text.push_str(&self.statements);
        text.push_str(&format!("EDOC ({name}, N ({}))\n", node.raw()));
        self.discard();
        text
    }

    /// Drop whatever was written for the current function.
    pub fn discard(&mut self) {
        self.indent = 1;
        self.declarations.clear();
        self.statements.clear();
        self.temp_counter = 0;
    }
}
