//! Utility functions for the `CommandScript` frontend.

use std::borrow::Cow;

/// Escapes `"`, `\` and the common control characters in a string, for use in
/// token and tree dumps.
#[must_use]
pub fn escape_str(s: &str) -> Cow<str> {
    if s.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                c if c.is_control() => escaped.push_str(&format!("\\x{:02x}", c as u32)),
                c => escaped.push(c),
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_str() {
        assert_eq!(escape_str("Hello, world!"), "Hello, world!");
        assert_eq!(escape_str(r#"Hello, "world"!"#), r#"Hello, \"world\"!"#);
        assert_eq!(escape_str(r"Hello, \world\!"), r"Hello, \\world\\!");
        assert_eq!(escape_str("tab\there"), "tab\\there");
        assert_eq!(escape_str("\x07"), "\\x07");
    }
}
