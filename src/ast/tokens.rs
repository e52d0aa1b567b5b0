use std::fmt;

use crate::value::Value;

/// A token together with the character offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Offset of the first character, counted in chars
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize) -> Self {
        Token { kind, start }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Eof => write!(f, "{}@{}", self.kind.name(), self.start),
            kind => write!(f, "{}({})@{}", kind.name(), kind.lexeme(), self.start),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers
    /// Bare field or function name
    ///
    /// Must start with an ASCII letter or underscore, followed by ASCII
    /// letters, digits or underscores.
    ///
    /// # Examples
    /// ```text
    /// foo
    /// first_name
    /// _private
    /// ```
    UnquotedIdentifier(String),

    /// Double-quoted field name, decoded with JSON string rules
    ///
    /// # Examples
    /// ```text
    /// "with space"
    /// "été"
    /// ```
    QuotedIdentifier(String),

    // Literals
    /// Literal value from a backtick literal or a raw string
    ///
    /// # Examples
    /// ```text
    /// `{"a": [1, 2]}`
    /// `true`
    /// 'raw string'
    /// ```
    Literal(Value),

    /// Integer used by index and slice expressions
    ///
    /// # Examples
    /// ```text
    /// 0
    /// -1
    /// ```
    Number(i64),

    // Single-character tokens
    Dot,
    Star,
    Comma,
    Colon,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,
    Lparen,
    Rparen,

    /// Current node (`@`)
    Current,

    /// Expression reference prefix (`&`)
    ///
    /// # Examples
    /// ```text
    /// sort_by(people, &age)
    /// ```
    Expref,

    // Bracket variants
    /// Filter opener (`[?`)
    Filter,
    /// Flatten operator (`[]`)
    Flatten,

    // Operators
    /// Pipe (`|`)
    Pipe,
    /// Logical or (`||`)
    Or,
    /// Logical and (`&&`)
    And,
    /// Logical not (`!`)
    Not,
    /// Equality (`==`)
    Eq,
    /// Inequality (`!=`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Lte,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Gte,

    /// End of stream; appended by the parser, never produced by the lexer
    Eof,
}

impl TokenKind {
    /// Name of the token kind, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::UnquotedIdentifier(_) => "UnquotedIdentifier",
            TokenKind::QuotedIdentifier(_) => "QuotedIdentifier",
            TokenKind::Literal(_) => "Literal",
            TokenKind::Number(_) => "Number",
            TokenKind::Dot => "Dot",
            TokenKind::Star => "Star",
            TokenKind::Comma => "Comma",
            TokenKind::Colon => "Colon",
            TokenKind::Lbrace => "Lbrace",
            TokenKind::Rbrace => "Rbrace",
            TokenKind::Lbracket => "Lbracket",
            TokenKind::Rbracket => "Rbracket",
            TokenKind::Lparen => "Lparen",
            TokenKind::Rparen => "Rparen",
            TokenKind::Current => "Current",
            TokenKind::Expref => "Expref",
            TokenKind::Filter => "Filter",
            TokenKind::Flatten => "Flatten",
            TokenKind::Pipe => "Pipe",
            TokenKind::Or => "Or",
            TokenKind::And => "And",
            TokenKind::Not => "Not",
            TokenKind::Eq => "EQ",
            TokenKind::Ne => "NE",
            TokenKind::Lt => "LT",
            TokenKind::Lte => "LTE",
            TokenKind::Gt => "GT",
            TokenKind::Gte => "GTE",
            TokenKind::Eof => "EOF",
        }
    }

    /// Source-like rendering of the token's value.
    pub fn lexeme(&self) -> String {
        match self {
            TokenKind::UnquotedIdentifier(name) => name.clone(),
            TokenKind::QuotedIdentifier(name) => format!("{:?}", name),
            TokenKind::Literal(value) => format!("`{}`", value),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Dot => ".".to_string(),
            TokenKind::Star => "*".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Lbrace => "{".to_string(),
            TokenKind::Rbrace => "}".to_string(),
            TokenKind::Lbracket => "[".to_string(),
            TokenKind::Rbracket => "]".to_string(),
            TokenKind::Lparen => "(".to_string(),
            TokenKind::Rparen => ")".to_string(),
            TokenKind::Current => "@".to_string(),
            TokenKind::Expref => "&".to_string(),
            TokenKind::Filter => "[?".to_string(),
            TokenKind::Flatten => "[]".to_string(),
            TokenKind::Pipe => "|".to_string(),
            TokenKind::Or => "||".to_string(),
            TokenKind::And => "&&".to_string(),
            TokenKind::Not => "!".to_string(),
            TokenKind::Eq => "==".to_string(),
            TokenKind::Ne => "!=".to_string(),
            TokenKind::Lt => "<".to_string(),
            TokenKind::Lte => "<=".to_string(),
            TokenKind::Gt => ">".to_string(),
            TokenKind::Gte => ">=".to_string(),
            TokenKind::Eof => String::new(),
        }
    }
}
