//! The lexical module contains the token model and the backtracking tokenizer.

pub mod token;
pub mod tokenizer;
