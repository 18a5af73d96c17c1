//! Contains the [`Parser`] state and its generic token helpers.
//!
//! The parsing functions themselves live next to the nodes they produce, in
//! the [`syntax_tree`](super::syntax_tree) files.

use crate::{
    base::{source_file::SourceElement, SyntaxError},
    lexical::{
        token::{KeywordKind, OperatorKind, Token, TokenKind},
        tokenizer::Tokenizer,
    },
};

/// The recursive-descent parser over a [`Tokenizer`].
///
/// Besides the token source, the parser carries the nesting counters that
/// gate `break`/`continue` (enclosing loops) and `return` (enclosing function
/// or lambda bodies). The counters are checked at parse time; a violation is
/// an immediate [`SyntaxError`].
#[derive(Debug)]
pub struct Parser {
    pub(crate) tk: Tokenizer,
    pub(crate) breakable: usize,
    pub(crate) continuable: usize,
    pub(crate) returnable: usize,
}

impl Parser {
    /// Creates a new parser reading from the given tokenizer.
    #[must_use]
    pub fn new(tk: Tokenizer) -> Self {
        Self {
            tk,
            breakable: 0,
            continuable: 0,
            returnable: 0,
        }
    }

    /// Consumes the next token, which must be the expected keyword.
    ///
    /// # Errors
    /// - If the next token is not the expected keyword.
    pub(crate) fn expect_keyword(&mut self, expected: KeywordKind) -> Result<Token, SyntaxError> {
        let token = self.tk.next_token()?;

        if token.as_keyword()? == expected {
            Ok(token)
        } else {
            Err(SyntaxError::at(
                token.location(),
                format!("Keyword \"{}\" expected", expected.as_str()),
            ))
        }
    }

    /// Consumes the next token, which must be the expected operator.
    ///
    /// # Errors
    /// - If the next token is not the expected operator.
    pub(crate) fn expect_operator(&mut self, expected: OperatorKind) -> Result<Token, SyntaxError> {
        let token = self.tk.next_token()?;

        if token.as_operator()? == expected {
            Ok(token)
        } else {
            Err(SyntaxError::at(
                token.location(),
                format!("Operator \"{}\" expected", expected.as_str()),
            ))
        }
    }

    /// Whether the next significant token is the expected keyword.
    pub(crate) fn is_keyword(&mut self, expected: KeywordKind) -> Result<bool, SyntaxError> {
        let token = self.tk.peek_token()?;
        Ok(token.kind() == &TokenKind::Keyword(expected))
    }

    /// Consumes the next token iff it is the expected keyword.
    pub(crate) fn skip_keyword(&mut self, expected: KeywordKind) -> Result<bool, SyntaxError> {
        if self.is_keyword(expected)? {
            self.tk.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Whether the next significant token is the expected operator.
    pub(crate) fn is_operator(&mut self, expected: OperatorKind) -> Result<bool, SyntaxError> {
        let token = self.tk.peek_token()?;
        Ok(token.kind() == &TokenKind::Operator(expected))
    }

    /// Consumes the next token iff it is the expected operator.
    pub(crate) fn skip_operator(&mut self, expected: OperatorKind) -> Result<bool, SyntaxError> {
        if self.is_operator(expected)? {
            self.tk.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes and returns the next token's operator iff it is one of the
    /// given operators.
    pub(crate) fn read_operators(
        &mut self,
        operators: &[OperatorKind],
    ) -> Result<Option<OperatorKind>, SyntaxError> {
        let token = self.tk.peek_token()?;

        if let TokenKind::Operator(op) = *token.kind() {
            if operators.contains(&op) {
                self.tk.next_token()?;
                return Ok(Some(op));
            }
        }

        Ok(None)
    }

    /// Consumes a statement terminator: a soft newline or a semicolon.
    /// End of input counts as a terminator but is not consumed.
    ///
    /// # Errors
    /// - If the next raw token is not a statement terminator.
    pub(crate) fn end_of_statement(&mut self) -> Result<(), SyntaxError> {
        let token = self.tk.peek_line()?;

        match token.kind() {
            TokenKind::Eof => Ok(()),
            TokenKind::Operator(OperatorKind::NewLine | OperatorKind::Semicolon) => {
                self.tk.next_line()?;
                Ok(())
            }
            _ => Err(SyntaxError::at(
                token.location(),
                format!("Unexpected token {token}"),
            )),
        }
    }
}
