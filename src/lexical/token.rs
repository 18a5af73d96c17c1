//! Contains the [`Token`] struct and its related types.

use std::{collections::HashMap, fmt::Display, str::FromStr, sync::OnceLock};

use derive_more::From;
use enum_as_inner::EnumAsInner;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::{
    base::{
        source_file::{Location, SourceElement},
        SyntaxError,
    },
    util,
};

/// Is an enumeration representing keywords in `CommandScript`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum KeywordKind {
    If,
    Else,
    For,
    While,

    Break,
    Continue,
    Return,

    Try,
    Except,
    Finally,
    Raise,

    As,
    Def,
    Delete,
    Import,
}

/// Is an error that is returned when a string cannot be parsed into a [`KeywordKind`] in
/// [`FromStr`] trait implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, thiserror::Error)]
#[error("invalid string representation of keyword.")]
pub struct KeywordParseError;

impl FromStr for KeywordKind {
    type Err = KeywordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static STRING_KEYWORD_MAP: OnceLock<HashMap<&'static str, KeywordKind>> = OnceLock::new();
        let map = STRING_KEYWORD_MAP.get_or_init(|| {
            let mut map = HashMap::new();

            for keyword in Self::iter() {
                map.insert(keyword.as_str(), keyword);
            }

            map
        });

        map.get(s).copied().ok_or(KeywordParseError)
    }
}

impl KeywordKind {
    /// Gets the string representation of the keyword as a `&str`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Else => "else",
            Self::For => "for",
            Self::While => "while",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Return => "return",
            Self::Try => "try",
            Self::Except => "except",
            Self::Finally => "finally",
            Self::Raise => "raise",
            Self::As => "as",
            Self::Def => "def",
            Self::Delete => "delete",
            Self::Import => "import",
        }
    }
}

/// Is an enumeration representing operators in `CommandScript`.
///
/// Soft newlines, word operators (`and`, `or`, `not`, `is`, `in`) and the
/// synthetic relation tags `IsNot`/`NotIn` are operators too; the latter two
/// are never produced by the lexer, only synthesized by the parser from the
/// two-token forms.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
#[allow(missing_docs)]
pub enum OperatorKind {
    BracketLeft,
    BracketRight,
    IndexLeft,
    IndexRight,
    BlockLeft,
    BlockRight,

    Comma,
    Point,
    Colon,
    Semicolon,
    NewLine,

    Less,
    Greater,
    Leq,
    Geq,
    Equ,
    Neq,

    BoolAnd,
    BoolOr,
    BoolNot,

    Plus,
    Minus,
    Divide,
    Multiply,
    Modulo,
    Power,

    BitAnd,
    BitOr,
    BitNot,
    BitXor,
    ShiftLeft,
    ShiftRight,

    InplaceAdd,
    InplaceSub,
    InplaceMul,
    InplaceDiv,
    InplaceMod,
    InplacePower,

    InplaceBitAnd,
    InplaceBitOr,
    InplaceBitXor,
    InplaceShiftLeft,
    InplaceShiftRight,

    Is,
    In,
    IsNot,
    NotIn,
    Range,
    Assign,
    Pointer,
    Decorator,
}

impl OperatorKind {
    /// Gets the string representation of the operator as a `&str`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BracketLeft => "(",
            Self::BracketRight => ")",
            Self::IndexLeft => "[",
            Self::IndexRight => "]",
            Self::BlockLeft => "{",
            Self::BlockRight => "}",

            Self::Comma => ",",
            Self::Point => ".",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::NewLine => "<NewLine>",

            Self::Less => "<",
            Self::Greater => ">",
            Self::Leq => "<=",
            Self::Geq => ">=",
            Self::Equ => "==",
            Self::Neq => "!=",

            Self::BoolAnd => "and",
            Self::BoolOr => "or",
            Self::BoolNot => "not",

            Self::Plus => "+",
            Self::Minus => "-",
            Self::Divide => "/",
            Self::Multiply => "*",
            Self::Modulo => "%",
            Self::Power => "**",

            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitNot => "~",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",

            Self::InplaceAdd => "+=",
            Self::InplaceSub => "-=",
            Self::InplaceMul => "*=",
            Self::InplaceDiv => "/=",
            Self::InplaceMod => "%=",
            Self::InplacePower => "**=",

            Self::InplaceBitAnd => "&=",
            Self::InplaceBitOr => "|=",
            Self::InplaceBitXor => "^=",
            Self::InplaceShiftLeft => "<<=",
            Self::InplaceShiftRight => ">>=",

            Self::Is => "is",
            Self::In => "in",
            Self::IsNot => "is-not",
            Self::NotIn => "not-in",
            Self::Range => "..",
            Self::Assign => "=",
            Self::Pointer => "->",
            Self::Decorator => "@",
        }
    }

    /// Looks up an identifier spelling in the operator-word table (`and`,
    /// `or`, `not`, `is`, `in`).
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        static WORD_OPERATOR_MAP: OnceLock<HashMap<&'static str, OperatorKind>> = OnceLock::new();
        let map = WORD_OPERATOR_MAP.get_or_init(|| {
            let mut map = HashMap::new();

            for op in [
                Self::BoolAnd,
                Self::BoolOr,
                Self::BoolNot,
                Self::Is,
                Self::In,
            ] {
                map.insert(op.as_str(), op);
            }

            map
        });

        map.get(word).copied()
    }
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Is an enumeration containing the payload of every kind of token in the
/// `CommandScript` language.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, From, EnumAsInner)]
#[allow(missing_docs)]
pub enum TokenKind {
    Eof,
    #[from(ignore)]
    Float(f64),
    #[from(ignore)]
    Integer(i64),
    #[from(ignore)]
    String(String),
    #[from(ignore)]
    Identifier(String),
    Keyword(KeywordKind),
    Operator(OperatorKind),
}

impl TokenKind {
    /// Gets the name of the token kind, as used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Eof => "Eof",
            Self::Float(_) => "Float",
            Self::Integer(_) => "Integer",
            Self::String(_) => "String",
            Self::Identifier(_) => "Identifier",
            Self::Keyword(_) => "Keyword",
            Self::Operator(_) => "Operator",
        }
    }
}

/// A classified, positioned lexical unit.
///
/// Tokens are created only by the [`Tokenizer`](super::tokenizer::Tokenizer)
/// and are immutable after creation. Accessing the payload under the wrong
/// kind fails with a [`SyntaxError`] at the token's own position.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    row: usize,
    col: usize,
    kind: TokenKind,
}

impl Token {
    /// Creates a new token at the given position.
    #[must_use]
    pub fn new(row: usize, col: usize, kind: TokenKind) -> Self {
        Self { row, col, kind }
    }

    /// Gets the kind of the token.
    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Whether the token is the soft newline operator.
    #[must_use]
    pub fn is_soft_newline(&self) -> bool {
        matches!(self.kind, TokenKind::Operator(OperatorKind::NewLine))
    }

    /// Whether the token marks the end of the input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    fn mismatch(&self, expected: &str) -> SyntaxError {
        SyntaxError::new(
            self.row,
            self.col,
            format!("\"{expected}\" expected, but got \"{self}\""),
        )
    }

    /// Gets the floating point payload of the token.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::Float`].
    pub fn as_float(&self) -> Result<f64, SyntaxError> {
        match self.kind {
            TokenKind::Float(value) => Ok(value),
            _ => Err(self.mismatch("Float")),
        }
    }

    /// Gets the integer payload of the token.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::Integer`].
    pub fn as_integer(&self) -> Result<i64, SyntaxError> {
        match self.kind {
            TokenKind::Integer(value) => Ok(value),
            _ => Err(self.mismatch("Integer")),
        }
    }

    /// Gets the decoded string payload of the token.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::String`].
    pub fn as_string(&self) -> Result<&str, SyntaxError> {
        match &self.kind {
            TokenKind::String(value) => Ok(value),
            _ => Err(self.mismatch("String")),
        }
    }

    /// Gets the identifier spelling of the token.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::Identifier`].
    pub fn as_identifier(&self) -> Result<&str, SyntaxError> {
        match &self.kind {
            TokenKind::Identifier(value) => Ok(value),
            _ => Err(self.mismatch("Identifier")),
        }
    }

    /// Gets the keyword tag of the token.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::Keyword`].
    pub fn as_keyword(&self) -> Result<KeywordKind, SyntaxError> {
        match self.kind {
            TokenKind::Keyword(value) => Ok(value),
            _ => Err(self.mismatch("Keyword")),
        }
    }

    /// Gets the operator tag of the token.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::Operator`].
    pub fn as_operator(&self) -> Result<OperatorKind, SyntaxError> {
        match self.kind {
            TokenKind::Operator(value) => Ok(value),
            _ => Err(self.mismatch("Operator")),
        }
    }

    /// Asserts that the token marks the end of the input.
    ///
    /// # Errors
    /// - If the token is not a [`TokenKind::Eof`].
    pub fn expect_eof(&self) -> Result<(), SyntaxError> {
        match self.kind {
            TokenKind::Eof => Ok(()),
            _ => Err(self.mismatch("Eof")),
        }
    }
}

impl SourceElement for Token {
    fn location(&self) -> Location {
        Location::new(self.row, self.col)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TokenKind::Eof => write!(f, "<Eof>"),
            TokenKind::Float(value) => write!(f, "<Float {value}>"),
            TokenKind::Integer(value) => write!(f, "<Integer {value}>"),
            TokenKind::String(value) => write!(f, "<String \"{}\">", util::escape_str(value)),
            TokenKind::Identifier(value) => write!(f, "<Identifier {value}>"),
            TokenKind::Keyword(keyword) => write!(f, "<Keyword {}>", keyword.as_str()),
            TokenKind::Operator(op) => write!(f, "<Operator '{}'>", op.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_before_operator_words() {
        assert_eq!(KeywordKind::from_str("if"), Ok(KeywordKind::If));
        assert_eq!(KeywordKind::from_str("and"), Err(KeywordParseError));
        assert_eq!(OperatorKind::from_word("and"), Some(OperatorKind::BoolAnd));
        assert_eq!(OperatorKind::from_word("in"), Some(OperatorKind::In));
        assert_eq!(OperatorKind::from_word("import"), None);
    }

    #[test]
    fn accessor_mismatch_reports_token_position() {
        let token = Token::new(3, 7, TokenKind::Operator(OperatorKind::Plus));

        let err = token.as_integer().unwrap_err();
        assert_eq!(err.row(), 3);
        assert_eq!(err.col(), 7);
        assert_eq!(err.message(), "\"Integer\" expected, but got \"<Operator '+'>\"");

        assert!(token.expect_eof().is_err());
        assert_eq!(token.as_operator(), Ok(OperatorKind::Plus));
    }
}
