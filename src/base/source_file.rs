//! Module for handling source text and positions within it.

use std::{fmt::Debug, ops::Range};

use getset::Getters;

/// Represents a source file that contains the source code.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Getters)]
pub struct SourceFile {
    /// Get the content of the source file.
    #[get = "pub"]
    content: String,
    lines: Vec<Range<usize>>,
}

#[allow(clippy::missing_fields_in_debug)]
impl Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("lines", &self.lines)
            .finish()
    }
}

impl SourceFile {
    /// Creates a new [`SourceFile`] from the given source text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let lines = get_line_byte_positions(&content);

        Self { content, lines }
    }

    /// Get the line of the source file at the given line number.
    ///
    /// Numbering starts at 1. The line is returned without its terminator.
    #[must_use]
    pub fn get_line(&self, line: usize) -> Option<&str> {
        if line == 0 {
            return None;
        }

        self.lines
            .get(line - 1)
            .map(|range| self.content[range.clone()].trim_end_matches(['\n', '\r']))
    }

    /// Get the number of lines in the source file.
    #[must_use]
    pub fn line_amount(&self) -> usize {
        self.lines.len()
    }
}

/// Pointing to a particular location in a source file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    /// Row number of the location (starts at 1).
    pub row: usize,

    /// Column number of the location (starts at 1).
    pub col: usize,
}

impl Location {
    /// Creates a new [`Location`] from row and column numbers.
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// Represents an element that is located within a source file.
pub trait SourceElement {
    /// Get the location of the element.
    fn location(&self) -> Location;
}

impl<T: SourceElement> SourceElement for Box<T> {
    fn location(&self) -> Location {
        self.as_ref().location()
    }
}

/// Get the byte positions of the lines in the given text.
fn get_line_byte_positions(text: &str) -> Vec<Range<usize>> {
    let mut current_position = 0;
    let mut results = Vec::new();

    let mut skip = false;

    for (byte, char) in text.char_indices() {
        if skip {
            skip = false;
            continue;
        }

        // lf
        if char == '\n' {
            #[allow(clippy::range_plus_one)]
            results.push(current_position..byte + 1);

            current_position = byte + 1;
        }

        // crlf
        if char == '\r' {
            if text.as_bytes().get(byte + 1) == Some(&b'\n') {
                results.push(current_position..byte + 2);

                current_position = byte + 2;

                skip = true;
            } else {
                #[allow(clippy::range_plus_one)]
                results.push(current_position..byte + 1);

                current_position = byte + 1;
            }
        }
    }

    // add the last line
    results.push(current_position..text.len());

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_line() {
        let file = SourceFile::new("first\nsecond\r\nthird");

        assert_eq!(file.line_amount(), 3);
        assert_eq!(file.get_line(1), Some("first"));
        assert_eq!(file.get_line(2), Some("second"));
        assert_eq!(file.get_line(3), Some("third"));
        assert_eq!(file.get_line(0), None);
        assert_eq!(file.get_line(4), None);
    }
}
