use thiserror::Error;

use crate::ast::{Token, TokenKind};
use crate::value::Value;

/// Errors raised while splitting an expression into tokens.
///
/// Positions are character offsets into the expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unknown character '{ch}' at position {position}")]
    UnknownCharacter { ch: char, position: usize },

    #[error("unterminated {quote}-quoted token starting at position {position}")]
    Unterminated { quote: char, position: usize },

    #[error("invalid quoted identifier at position {position}: {reason}")]
    InvalidQuotedIdentifier { position: usize, reason: String },

    #[error("invalid literal at position {position}: {reason}")]
    InvalidLiteral { position: usize, reason: String },

    #[error("invalid number at position {position}")]
    InvalidNumber { position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnknownCharacter { position, .. }
            | LexError::Unterminated { position, .. }
            | LexError::InvalidQuotedIdentifier { position, .. }
            | LexError::InvalidLiteral { position, .. }
            | LexError::InvalidNumber { position } => *position,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Length of the source in chars; the parser places its end-of-stream
    /// sentinel here.
    pub fn source_len(&self) -> usize {
        self.input.len()
    }

    /// Consumes the whole input.
    ///
    /// The returned sequence has no end-of-stream token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.current_char() {
            self.advance();
        }
    }

    /// Consumes one char and yields `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consumes one char, plus a second when it equals `second`.
    fn one_or_two(&mut self, second: char, pair: TokenKind, alone: TokenKind) -> TokenKind {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            pair
        } else {
            alone
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_number(&mut self, start: usize) -> Result<TokenKind, LexError> {
        let mut number = String::new();
        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
            .parse::<i64>()
            .map(TokenKind::Number)
            .map_err(|_| LexError::InvalidNumber { position: start })
    }

    /// Returns the raw text between the `quote` at `start` and its matching
    /// close, with escape pairs left in place. `escapable` lists the chars a
    /// backslash may escape without ending the token.
    fn read_delimited(
        &mut self,
        quote: char,
        escapable: &[char],
        start: usize,
    ) -> Result<String, LexError> {
        let mut raw = String::new();
        self.advance(); // opening quote

        loop {
            match self.current_char() {
                None => return Err(LexError::Unterminated { quote, position: start }),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(raw);
                }
                Some('\\') if self.peek_char(1).is_some_and(|c| escapable.contains(&c)) => {
                    raw.push('\\');
                    raw.extend(self.peek_char(1));
                    self.advance();
                    self.advance();
                }
                Some(c) => {
                    raw.push(c);
                    self.advance();
                }
            }
        }
    }

    fn read_quoted_identifier(&mut self, start: usize) -> Result<String, LexError> {
        let raw = self.read_delimited('"', &['"', '\\'], start)?;
        serde_json::from_str::<String>(&format!("\"{}\"", raw)).map_err(|e| {
            LexError::InvalidQuotedIdentifier {
                position: start,
                reason: e.to_string(),
            }
        })
    }

    /// `'...'` strings: only `\'` and `\\` are escapes.
    fn read_raw_string(&mut self, start: usize) -> Result<String, LexError> {
        let raw = self.read_delimited('\'', &['\'', '\\'], start)?;
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                match chars.next() {
                    Some(escaped @ ('\'' | '\\')) => result.push(escaped),
                    Some(other) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => result.push('\\'),
                }
            } else {
                result.push(ch);
            }
        }
        Ok(result)
    }

    /// `` `...` `` literals: the body is decoded as JSON when it looks like
    /// JSON, otherwise as the contents of a JSON string.
    fn read_literal(&mut self, start: usize) -> Result<Value, LexError> {
        let raw = self.read_delimited('`', &['`'], start)?;
        let body = raw.replace("\\`", "`");
        let body = body.trim_start();

        let decoded = if looks_like_json(body) {
            serde_json::from_str::<serde_json::Value>(body)
        } else {
            serde_json::from_str::<serde_json::Value>(&format!("\"{}\"", body))
        };

        decoded.map(Value::from).map_err(|e| LexError::InvalidLiteral {
            position: start,
            reason: e.to_string(),
        })
    }

    fn read_operator(&mut self, ch: char, start: usize) -> Result<TokenKind, LexError> {
        let kind = match ch {
            '!' => self.one_or_two('=', TokenKind::Ne, TokenKind::Not),
            '<' => self.one_or_two('=', TokenKind::Lte, TokenKind::Lt),
            '>' => self.one_or_two('=', TokenKind::Gte, TokenKind::Gt),
            _ => {
                if self.peek_char(1) != Some('=') {
                    return Err(LexError::UnknownCharacter { ch, position: start });
                }
                self.advance();
                self.advance();
                TokenKind::Eq
            }
        };
        Ok(kind)
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let start = self.position;
        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        let kind = match ch {
            c if c.is_ascii_alphabetic() || c == '_' => {
                TokenKind::UnquotedIdentifier(self.read_identifier())
            }
            '.' => self.single(TokenKind::Dot),
            '*' => self.single(TokenKind::Star),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '{' => self.single(TokenKind::Lbrace),
            '}' => self.single(TokenKind::Rbrace),
            ']' => self.single(TokenKind::Rbracket),
            '(' => self.single(TokenKind::Lparen),
            ')' => self.single(TokenKind::Rparen),
            '@' => self.single(TokenKind::Current),
            '[' => {
                self.advance();
                match self.current_char() {
                    Some('?') => self.single(TokenKind::Filter),
                    Some(']') => self.single(TokenKind::Flatten),
                    _ => TokenKind::Lbracket,
                }
            }
            '-' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start)?
            }
            c if c.is_ascii_digit() => self.read_number(start)?,
            '"' => TokenKind::QuotedIdentifier(self.read_quoted_identifier(start)?),
            '\'' => TokenKind::Literal(Value::String(self.read_raw_string(start)?)),
            '`' => TokenKind::Literal(self.read_literal(start)?),
            '<' | '>' | '=' | '!' => self.read_operator(ch, start)?,
            '&' => self.one_or_two('&', TokenKind::And, TokenKind::Expref),
            '|' => self.one_or_two('|', TokenKind::Or, TokenKind::Pipe),
            ch => return Err(LexError::UnknownCharacter { ch, position: start }),
        };

        Ok(Some(Token::new(kind, start)))
    }
}

/// Whether a backtick body should be decoded as a JSON document rather than
/// as string contents.
fn looks_like_json(body: &str) -> bool {
    match body.chars().next() {
        None => false,
        Some('[' | '{' | '"') => true,
        Some('-' | '0'..='9') => serde_json::from_str::<serde_json::Value>(body).is_ok(),
        Some(_) => matches!(body, "true" | "false" | "null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_bracket_disambiguation() {
        assert_eq!(
            kinds("[?[][ ]"),
            vec![
                TokenKind::Filter,
                TokenKind::Flatten,
                TokenKind::Lbracket,
                TokenKind::Rbracket
            ]
        );
    }

    #[test]
    fn test_number_looking_literal_falls_back_to_string() {
        assert_eq!(
            kinds("`-foo`"),
            vec![TokenKind::Literal(Value::String("-foo".to_string()))]
        );
    }

    #[test]
    fn test_lone_minus_is_rejected() {
        let err = Lexer::new("a - b").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnknownCharacter { ch: '-', position: 2 });
    }
}
