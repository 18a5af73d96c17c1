//! The root node of a parsed source text.

use getset::Getters;

use crate::{base::SyntaxError, syntax::parser::Parser};

use super::{indent, statement::Statement, Render};

/// Syntax Synopsis:
///
/// ``` ebnf
/// Program:
///     Statement*
///     ;
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Program {
    /// The top-level statements, in source order.
    #[get = "pub"]
    statements: Vec<Statement>,
}

impl Render for Program {
    fn render(&self, depth: usize) -> String {
        let mut result = format!("{}Program\n", indent(depth));
        for statement in &self.statements {
            result += &statement.render(depth + 1);
        }
        result
    }
}

impl Parser {
    /// Parses a whole [`Program`], consuming statements until the end of the
    /// input.
    ///
    /// # Errors
    /// - If any statement fails to parse.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut statements = Vec::new();

        while !self.tk.peek_token()?.is_eof() {
            statements.push(self.parse_statement()?);
        }

        tracing::debug!("parsed {} top-level statements", statements.len());

        Ok(Program { statements })
    }
}
