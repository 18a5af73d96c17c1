//! Contains the backtracking [`Tokenizer`] and its cursor state stack.

use std::collections::VecDeque;

use crate::base::{source_file::Location, SyntaxError};

use super::token::{KeywordKind, OperatorKind, Token, TokenKind};

/// A single cursor state of the tokenizer.
///
/// The cache holds tokens that have been scanned ahead by peeking but not yet
/// consumed, so that peeking never loses tokens.
#[derive(Debug, Clone)]
struct State {
    row: usize,
    col: usize,
    pos: usize,
    cache: VecDeque<Token>,
}

/// Converts raw source text into a stream of [`Token`]s.
///
/// The tokenizer owns a stack of cursor states supporting speculative
/// lookahead: [`push_state`](Self::push_state) checkpoints the current
/// position, [`pop_state`](Self::pop_state) rolls back to the checkpoint and
/// [`commit_state`](Self::commit_state) keeps the advanced position while
/// dropping the checkpoint. The bottom frame is the real read position of the
/// whole parse; the stack is never empty.
#[derive(Debug)]
pub struct Tokenizer {
    chars: Vec<char>,
    stack: Vec<State>,
}

impl Tokenizer {
    /// Creates a new tokenizer over the given source text.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            stack: vec![State {
                row: 1,
                col: 1,
                pos: 0,
                cache: VecDeque::new(),
            }],
        }
    }

    /// Gets the current location of the read cursor (1-based).
    #[must_use]
    pub fn location(&self) -> Location {
        let state = self.state();
        Location::new(state.row, state.col)
    }

    /// Duplicates the current state onto the stack so that further reads can
    /// be undone.
    pub fn push_state(&mut self) {
        let top = self.state().clone();
        self.stack.push(top);
    }

    /// Discards the top state, restoring the position saved by the matching
    /// [`push_state`](Self::push_state).
    pub fn pop_state(&mut self) {
        assert!(
            self.stack.len() > 1,
            "cannot roll back the bottom tokenizer state"
        );
        self.stack.pop();
    }

    /// Collapses the top two states into one, keeping the advanced position.
    pub fn commit_state(&mut self) {
        assert!(
            self.stack.len() > 1,
            "cannot commit the bottom tokenizer state"
        );
        let top = self.stack.pop().expect("stack is never empty");
        *self.stack.last_mut().expect("stack is never empty") = top;
    }

    fn state(&self) -> &State {
        self.stack.last().expect("stack is never empty")
    }

    fn state_mut(&mut self) -> &mut State {
        self.stack.last_mut().expect("stack is never empty")
    }

    /// Returns and consumes the next significant token, skipping soft
    /// newlines.
    ///
    /// # Errors
    /// - If scanning the underlying characters fails.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            let token = self.next_line()?;
            if !token.is_soft_newline() {
                return Ok(token);
            }
        }
    }

    /// Returns the next significant token without consuming it, skipping soft
    /// newlines.
    ///
    /// # Errors
    /// - If scanning the underlying characters fails.
    pub fn peek_token(&mut self) -> Result<Token, SyntaxError> {
        let mut index = 0;
        loop {
            if index >= self.state().cache.len() {
                let token = self.read()?;
                self.state_mut().cache.push_back(token);
            }

            let token = &self.state().cache[index];
            if !token.is_soft_newline() {
                return Ok(token.clone());
            }

            index += 1;
        }
    }

    /// Returns and consumes the next token, soft newlines included.
    ///
    /// # Errors
    /// - If scanning the underlying characters fails.
    pub fn next_line(&mut self) -> Result<Token, SyntaxError> {
        if let Some(token) = self.state_mut().cache.pop_front() {
            return Ok(token);
        }

        self.read()
    }

    /// Returns the next token without consuming it, soft newlines included.
    ///
    /// # Errors
    /// - If scanning the underlying characters fails.
    pub fn peek_line(&mut self) -> Result<Token, SyntaxError> {
        if let Some(token) = self.state().cache.front() {
            return Ok(token.clone());
        }

        let token = self.read()?;
        self.state_mut().cache.push_back(token.clone());
        Ok(token)
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.location(), message)
    }

    fn peek_char(&mut self) -> Option<char> {
        let state = self.state();
        let snapshot = (state.row, state.col, state.pos);

        let result = self.next_char();

        let state = self.state_mut();
        (state.row, state.col, state.pos) = snapshot;

        result
    }

    fn next_char(&mut self) -> Option<char> {
        let mut result = *self.chars.get(self.state().pos)?;
        self.state_mut().pos += 1;

        match result {
            '\r' | '\n' => {
                let pair = if result == '\n' { '\r' } else { '\n' };
                let state = self.state_mut();
                state.row += 1;
                state.col = 1;

                result = '\n';

                // '\r\n' or '\n\r'
                if self.chars.get(self.state().pos) == Some(&pair) {
                    self.state_mut().pos += 1;
                }
            }

            // line continuation
            '\\' if matches!(self.chars.get(self.state().pos), Some('\r' | '\n')) => {
                let newline = *self.chars.get(self.state().pos).expect("peeked above");
                let pair = if newline == '\n' { '\r' } else { '\n' };

                let state = self.state_mut();
                state.pos += 1;
                state.row += 1;
                state.col = 1;

                if self.chars.get(self.state().pos) == Some(&pair) {
                    self.state_mut().pos += 1;
                }

                return self.next_char();
            }

            _ => {
                self.state_mut().col += 1;
            }
        }

        Some(result)
    }

    fn skip_spaces(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() || ch == '\n' {
                break;
            }
            self.next_char();
        }
    }

    /// Skips `#` comments up to, but not including, the terminating line
    /// break, so that the soft newline still reaches the parser.
    fn skip_comments(&mut self) {
        loop {
            self.skip_spaces();

            if self.peek_char() != Some('#') {
                break;
            }

            while let Some(ch) = self.peek_char() {
                if ch == '\n' {
                    break;
                }
                self.next_char();
            }
        }
    }

    fn read(&mut self) -> Result<Token, SyntaxError> {
        self.skip_comments();

        let state = self.state();
        let (row, col) = (state.row, state.col);

        match self.peek_char() {
            None => Ok(Token::new(row, col, TokenKind::Eof)),
            Some('\'' | '"') => self.read_string(row, col),
            Some('0'..='9') => Ok(self.read_number(row, col)),
            Some('_' | 'a'..='z' | 'A'..='Z') => Ok(self.read_identifier(row, col)),
            Some(_) => self.read_operator(row, col),
        }
    }

    fn read_escape_sequence(&mut self) -> Result<char, SyntaxError> {
        let escape = self
            .next_char()
            .ok_or_else(|| self.error("Unexpected EOF when parsing escape sequence in strings"))?;

        match escape {
            '\'' | '"' | '\\' => Ok(escape),

            'a' => Ok('\x07'),
            'b' => Ok('\x08'),
            'f' => Ok('\x0c'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'v' => Ok('\x0b'),
            'e' => Ok('\x1b'),

            'x' => {
                let msb = self.next_char().and_then(|c| c.to_digit(16));
                let lsb = self.next_char().and_then(|c| c.to_digit(16));

                match (msb, lsb) {
                    (Some(msb), Some(lsb)) => {
                        Ok(char::from_u32((msb << 4) | lsb).expect("two hex digits fit a char"))
                    }
                    _ => Err(self.error("Invalid '\\x' escape sequence")),
                }
            }

            '0'..='7' => {
                let mut value = escape.to_digit(8).expect("matched an octal digit");

                // may have 2 more digits
                for _ in 0..2 {
                    match self.peek_char().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            self.next_char();
                            value = (value << 3) | digit;
                        }
                        None => break,
                    }
                }

                char::from_u32(value).map_or_else(
                    || Err(self.error("Invalid octal escape sequence")),
                    Ok,
                )
            }

            _ => Err(if escape.is_ascii_graphic() || escape == ' ' {
                self.error(format!("Invalid escape character '{escape}'"))
            } else {
                self.error(format!("Invalid escape character '\\x{:02x}'", escape as u32))
            }),
        }
    }

    fn read_string(&mut self, row: usize, col: usize) -> Result<Token, SyntaxError> {
        let quote = self.next_char().expect("caller peeked the quote");
        let mut result = String::new();

        loop {
            let ch = self
                .next_char()
                .ok_or_else(|| self.error("Unexpected EOF when scanning strings"))?;

            if ch == quote {
                break;
            }

            if ch == '\\' {
                result.push(self.read_escape_sequence()?);
            } else {
                result.push(ch);
            }
        }

        Ok(Token::new(row, col, TokenKind::String(result)))
    }

    fn read_number(&mut self, row: usize, col: usize) -> Token {
        let first = self.next_char().expect("caller peeked a digit");
        let mut base = 10;
        let mut integer = i64::from(first.to_digit(10).expect("caller peeked a digit"));

        if first == '0' {
            match self.peek_char() {
                // decimal number
                Some('.') => {}

                // binary number
                Some('b' | 'B') => {
                    base = 2;
                    self.next_char();
                }

                // hexadecimal number
                Some('x' | 'X') => {
                    base = 16;
                    self.next_char();
                }

                // octal number
                Some('0'..='7') => base = 8,

                // simply integer zero
                _ => return Token::new(row, col, TokenKind::Integer(0)),
            }
        }

        // integer part
        while let Some(digit) = self.peek_char().and_then(|c| c.to_digit(base)) {
            integer = integer
                .wrapping_mul(i64::from(base))
                .wrapping_add(i64::from(digit));
            self.next_char();
        }

        // fraction part only makes sense in base 10
        if base != 10 || self.peek_char() != Some('.') {
            return Token::new(row, col, TokenKind::Integer(integer));
        }

        // the point may also start a "." or ".." operator, so it is only
        // absorbed when a digit follows; otherwise it is un-consumed
        let state = self.state();
        let snapshot = (state.row, state.col, state.pos);
        self.next_char();

        if !matches!(self.peek_char(), Some('0'..='9')) {
            let state = self.state_mut();
            (state.row, state.col, state.pos) = snapshot;
            return Token::new(row, col, TokenKind::Integer(integer));
        }

        let mut factor = 1.0_f64;

        #[allow(clippy::cast_precision_loss)]
        let mut decimal = integer as f64;

        while let Some(digit) = self.peek_char().and_then(|c| c.to_digit(10)) {
            self.next_char();
            factor *= 0.1;
            decimal += f64::from(digit) * factor;
        }

        Token::new(row, col, TokenKind::Float(decimal))
    }

    fn read_identifier(&mut self, row: usize, col: usize) -> Token {
        let mut word = String::new();
        word.push(self.next_char().expect("caller peeked the first character"));

        while let Some(ch) = self.peek_char() {
            if ch == '_' || ch.is_ascii_alphanumeric() {
                self.next_char();
                word.push(ch);
            } else {
                break;
            }
        }

        // keyword table first, then the operator-word table
        let kind = word.parse::<KeywordKind>().map_or_else(
            |_| {
                OperatorKind::from_word(&word)
                    .map_or(TokenKind::Identifier(word), TokenKind::Operator)
            },
            TokenKind::Keyword,
        );

        Token::new(row, col, kind)
    }

    fn read_operator(&mut self, row: usize, col: usize) -> Result<Token, SyntaxError> {
        let make = |op: OperatorKind| Token::new(row, col, TokenKind::Operator(op));
        let op = self.next_char().expect("caller peeked the character");

        match op {
            // single character operators
            '(' => Ok(make(OperatorKind::BracketLeft)),
            ')' => Ok(make(OperatorKind::BracketRight)),
            '[' => Ok(make(OperatorKind::IndexLeft)),
            ']' => Ok(make(OperatorKind::IndexRight)),
            '{' => Ok(make(OperatorKind::BlockLeft)),
            '}' => Ok(make(OperatorKind::BlockRight)),
            '~' => Ok(make(OperatorKind::BitNot)),
            ',' => Ok(make(OperatorKind::Comma)),
            ':' => Ok(make(OperatorKind::Colon)),
            ';' => Ok(make(OperatorKind::Semicolon)),
            '\n' => Ok(make(OperatorKind::NewLine)),
            '@' => Ok(make(OperatorKind::Decorator)),

            // '!' is only valid as part of '!='
            '!' => {
                if self.next_char() == Some('=') {
                    Ok(make(OperatorKind::Neq))
                } else {
                    Err(self.error("Invalid operator '!'"))
                }
            }

            // . ..
            '.' => {
                if self.peek_char() == Some('.') {
                    self.next_char();
                    Ok(make(OperatorKind::Range))
                } else {
                    Ok(make(OperatorKind::Point))
                }
            }

            // = ==
            '=' => {
                if self.peek_char() == Some('=') {
                    self.next_char();
                    Ok(make(OperatorKind::Equ))
                } else {
                    Ok(make(OperatorKind::Assign))
                }
            }

            // + / % & | ^ and their in-place forms
            '+' | '/' | '%' | '&' | '|' | '^' => {
                let (plain, inplace) = match op {
                    '+' => (OperatorKind::Plus, OperatorKind::InplaceAdd),
                    '/' => (OperatorKind::Divide, OperatorKind::InplaceDiv),
                    '%' => (OperatorKind::Modulo, OperatorKind::InplaceMod),
                    '&' => (OperatorKind::BitAnd, OperatorKind::InplaceBitAnd),
                    '|' => (OperatorKind::BitOr, OperatorKind::InplaceBitOr),
                    '^' => (OperatorKind::BitXor, OperatorKind::InplaceBitXor),
                    _ => unreachable!("all cases covered before"),
                };

                if self.peek_char() == Some('=') {
                    self.next_char();
                    Ok(make(inplace))
                } else {
                    Ok(make(plain))
                }
            }

            // - -= ->
            '-' => match self.peek_char() {
                Some('=') => {
                    self.next_char();
                    Ok(make(OperatorKind::InplaceSub))
                }
                Some('>') => {
                    self.next_char();
                    Ok(make(OperatorKind::Pointer))
                }
                _ => Ok(make(OperatorKind::Minus)),
            },

            // * ** *= **= and the < > shift/compare families
            '*' | '<' | '>' => {
                let (plain, compare_eq, doubled, doubled_inplace) = match op {
                    '*' => (
                        OperatorKind::Multiply,
                        OperatorKind::InplaceMul,
                        OperatorKind::Power,
                        OperatorKind::InplacePower,
                    ),
                    '<' => (
                        OperatorKind::Less,
                        OperatorKind::Leq,
                        OperatorKind::ShiftLeft,
                        OperatorKind::InplaceShiftLeft,
                    ),
                    '>' => (
                        OperatorKind::Greater,
                        OperatorKind::Geq,
                        OperatorKind::ShiftRight,
                        OperatorKind::InplaceShiftRight,
                    ),
                    _ => unreachable!("all cases covered before"),
                };

                match self.peek_char() {
                    Some('=') => {
                        self.next_char();
                        Ok(make(compare_eq))
                    }
                    Some(follow) if follow == op => {
                        self.next_char();

                        if self.peek_char() == Some('=') {
                            self.next_char();
                            Ok(make(doubled_inplace))
                        } else {
                            Ok(make(doubled))
                        }
                    }
                    _ => Ok(make(plain)),
                }
            }

            // other invalid operators
            _ => Err(if op.is_ascii_graphic() || op == ' ' {
                self.error(format!("Invalid operator '{op}'"))
            } else {
                self.error(format!("Invalid character '\\x{:02x}'", op as u32))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut tk = Tokenizer::new(source);
        let mut result = Vec::new();
        loop {
            let token = tk.next_token().expect("tokenize failed");
            let eof = token.is_eof();
            result.push(token.kind().clone());
            if eof {
                break;
            }
        }
        result
    }

    #[test]
    fn integer_literal_bases() {
        assert_eq!(
            kinds("0 0b101 0x1F 017 42"),
            vec![
                TokenKind::Integer(0),
                TokenKind::Integer(5),
                TokenKind::Integer(31),
                TokenKind::Integer(15),
                TokenKind::Integer(42),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn float_literals_require_digit_after_point() {
        assert_eq!(
            kinds("1.5 0.0"),
            vec![TokenKind::Float(1.5), TokenKind::Float(0.0), TokenKind::Eof]
        );

        // the point is un-consumed when no digit follows
        assert_eq!(
            kinds("1..5"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Operator(OperatorKind::Range),
                TokenKind::Integer(5),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("1.field"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Operator(OperatorKind::Point),
                TokenKind::Identifier("field".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_operator_words() {
        assert_eq!(
            kinds("if x and not y in z"),
            vec![
                TokenKind::Keyword(KeywordKind::If),
                TokenKind::Identifier("x".to_owned()),
                TokenKind::Operator(OperatorKind::BoolAnd),
                TokenKind::Operator(OperatorKind::BoolNot),
                TokenKind::Identifier("y".to_owned()),
                TokenKind::Operator(OperatorKind::In),
                TokenKind::Identifier("z".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn greedy_operator_chains() {
        assert_eq!(
            kinds("** **= << <<= <= < -> -= - != == ="),
            vec![
                TokenKind::Operator(OperatorKind::Power),
                TokenKind::Operator(OperatorKind::InplacePower),
                TokenKind::Operator(OperatorKind::ShiftLeft),
                TokenKind::Operator(OperatorKind::InplaceShiftLeft),
                TokenKind::Operator(OperatorKind::Leq),
                TokenKind::Operator(OperatorKind::Less),
                TokenKind::Operator(OperatorKind::Pointer),
                TokenKind::Operator(OperatorKind::InplaceSub),
                TokenKind::Operator(OperatorKind::Minus),
                TokenKind::Operator(OperatorKind::Neq),
                TokenKind::Operator(OperatorKind::Equ),
                TokenKind::Operator(OperatorKind::Assign),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#"'a\n\x41\101\''"#),
            vec![TokenKind::String("a\nAA'".to_owned()), TokenKind::Eof]
        );
    }

    #[test]
    fn invalid_escape_is_fatal() {
        let mut tk = Tokenizer::new(r#""\q""#);
        let err = tk.next_token().expect_err("escape must be rejected");
        assert_eq!(err.row(), 1);
        assert!(err.message().contains("Invalid escape character 'q'"));
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut tk = Tokenizer::new("'no end");
        let err = tk.next_token().expect_err("string must be rejected");
        assert!(err.message().contains("Unexpected EOF"));
    }

    #[test]
    fn soft_newlines_and_comments() {
        let mut tk = Tokenizer::new("a # trailing comment\nb");

        assert_eq!(
            tk.next_line().unwrap().kind(),
            &TokenKind::Identifier("a".to_owned())
        );
        // the comment is skipped but its line break survives
        assert!(tk.peek_line().unwrap().is_soft_newline());
        assert_eq!(
            tk.next_token().unwrap().kind(),
            &TokenKind::Identifier("b".to_owned())
        );
    }

    #[test]
    fn line_continuation_is_whitespace() {
        assert_eq!(
            kinds("a \\\nb"),
            vec![
                TokenKind::Identifier("a".to_owned()),
                TokenKind::Identifier("b".to_owned()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn eof_repeats() {
        let mut tk = Tokenizer::new("");
        assert!(tk.next_token().unwrap().is_eof());
        assert!(tk.next_token().unwrap().is_eof());
        assert!(tk.peek_token().unwrap().is_eof());
    }

    #[test]
    fn checkpoint_rollback_and_commit() {
        let mut tk = Tokenizer::new("a b c");

        assert_eq!(tk.next_token().unwrap().as_identifier().unwrap(), "a");

        tk.push_state();
        assert_eq!(tk.next_token().unwrap().as_identifier().unwrap(), "b");
        tk.pop_state();

        // rolled back, "b" is read again
        tk.push_state();
        assert_eq!(tk.next_token().unwrap().as_identifier().unwrap(), "b");
        tk.commit_state();

        // committed, the advanced position is kept
        assert_eq!(tk.next_token().unwrap().as_identifier().unwrap(), "c");
        assert!(tk.next_token().unwrap().is_eof());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut tk = Tokenizer::new("x\ny");

        assert_eq!(tk.peek_token().unwrap().as_identifier().unwrap(), "x");
        assert_eq!(tk.next_token().unwrap().as_identifier().unwrap(), "x");

        // peeking through the newline keeps it cached for peek_line
        assert_eq!(tk.peek_token().unwrap().as_identifier().unwrap(), "y");
        assert!(tk.peek_line().unwrap().is_soft_newline());
    }

    #[test]
    fn token_positions_are_one_based() {
        let mut tk = Tokenizer::new("ab cd\nef");
        use crate::base::source_file::SourceElement;

        assert_eq!(tk.next_token().unwrap().location(), Location::new(1, 1));
        assert_eq!(tk.next_token().unwrap().location(), Location::new(1, 4));
        assert_eq!(tk.next_token().unwrap().location(), Location::new(2, 1));
    }
}
