//! The `CommandScript` language front end.
//!
//! `CommandScript` is a small expression-oriented scripting language. This
//! crate turns source text into an abstract syntax tree: the backtracking
//! [`Tokenizer`](lexical::tokenizer::Tokenizer) produces a stream of
//! positioned tokens, and the recursive-descent
//! [`Parser`](syntax::parser::Parser) resolves the grammar's ambiguities
//! (lambda parameter lists vs. tuples, map entry shorthands, destructuring
//! targets) with bounded lookahead and reinterpretation of already-built
//! subtrees. Evaluation of the resulting tree is out of scope.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    clippy::missing_errors_doc
)]
#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::missing_panics_doc, clippy::missing_const_for_fn)]

pub mod base;
pub mod lexical;
pub mod syntax;
pub mod util;

use base::Result;
use lexical::{token::Token, tokenizer::Tokenizer};
use syntax::{parser::Parser, syntax_tree::program::Program};

/// Converts the given source text to its significant tokens, ending with the
/// end-of-input token.
///
/// # Errors
/// - If the source text contains a malformed token.
#[tracing::instrument(level = "debug", skip_all)]
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = tokenizer.next_token()?;
        let eof = token.is_eof();

        tokens.push(token);

        if eof {
            tracing::debug!("tokenized {} tokens", tokens.len());
            return Ok(tokens);
        }
    }
}

/// Parses the given source text into a [`Program`].
///
/// # Errors
/// - If the source text contains a syntax error.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(source: &str) -> Result<Program> {
    let mut parser = Parser::new(Tokenizer::new(source));
    Ok(parser.parse_program()?)
}
