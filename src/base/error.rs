use getset::{CopyGetters, Getters};

use super::{
    log::{Message, Severity, SourceCodeDisplay},
    source_file::{Location, SourceFile},
};

/// An error that occurred while lexing or parsing the source code.
///
/// This is the single error taxonomy of the frontend: malformed literals,
/// unexpected tokens, violated structural constraints and wrong-kind token
/// accesses all surface through it, carrying the source position where the
/// error was detected.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Getters, CopyGetters, thiserror::Error,
)]
#[error("syntax error at {row}:{col}: {message}")]
pub struct SyntaxError {
    /// The row of the source code where the error occurred (1-based).
    #[get_copy = "pub"]
    row: usize,

    /// The column of the source code where the error occurred (1-based).
    #[get_copy = "pub"]
    col: usize,

    /// The human-readable description of the error.
    #[get = "pub"]
    message: String,
}

impl SyntaxError {
    /// Creates a new [`SyntaxError`] at the given position.
    #[must_use]
    pub fn new(row: usize, col: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            col,
            message: message.into(),
        }
    }

    /// Creates a new [`SyntaxError`] at the given [`Location`].
    #[must_use]
    pub fn at(location: Location, message: impl Into<String>) -> Self {
        Self::new(location.row, location.col, message)
    }

    /// Renders the error against the source file it was produced from,
    /// including the offending source line.
    #[must_use]
    pub fn display_with(&self, source_file: &SourceFile) -> String {
        let message = Message::new(
            Severity::Error,
            format!("{} [{}:{}]", self.message, self.row, self.col),
        );

        source_file.get_line(self.row).map_or_else(
            || message.to_string(),
            |line| {
                format!(
                    "{message}\n{}",
                    SourceCodeDisplay::new(line, Location::new(self.row, self.col))
                )
            },
        )
    }
}

/// An error that occurred in the frontend.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    SyntaxError(#[from] SyntaxError),
}

/// A specialized [`Result`] type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
