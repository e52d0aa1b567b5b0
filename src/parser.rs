use std::mem;
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{Ast, Comparator, KeyValuePair, Token, TokenKind},
    lexer::{LexError, Lexer},
};

/// Default bound on expression nesting, see [`ParserOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Errors raised while building an [`Ast`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token {found} `{value}` at position {position}")]
    UnexpectedToken {
        found: &'static str,
        value: String,
        position: usize,
    },

    #[error("expected {expected}, found {found} at position {position}")]
    ExpectedToken {
        expected: &'static str,
        found: &'static str,
        position: usize,
    },

    #[error("quoted identifier at position {position} cannot be used as a function name")]
    QuotedFunctionName { position: usize },

    #[error("only an unquoted identifier can be called as a function (position {position})")]
    InvalidFunctionTarget { position: usize },

    #[error("trailing comma at position {position}")]
    TrailingComma { position: usize },

    #[error("expression nests deeper than {limit} levels at position {position}")]
    NestingTooDeep { limit: usize, position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::UnexpectedToken { position, .. }
            | ParseError::ExpectedToken { position, .. }
            | ParseError::QuotedFunctionName { position }
            | ParseError::InvalidFunctionTarget { position }
            | ParseError::TrailingComma { position }
            | ParseError::NestingTooDeep { position, .. } => *position,
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of sub-expressions. Bounds the recursion depth of
    /// both the parser and the interpreter for the resulting tree.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Left binding power of each token kind.
///
/// Tokens that cannot continue an expression bind at 0.
pub fn binding_power(kind: &TokenKind) -> u8 {
    match kind {
        TokenKind::Pipe => 1,
        TokenKind::Or => 2,
        TokenKind::And => 3,
        TokenKind::Eq
        | TokenKind::Ne
        | TokenKind::Lt
        | TokenKind::Lte
        | TokenKind::Gt
        | TokenKind::Gte => 5,
        TokenKind::Flatten => 9,
        TokenKind::Star => 20,
        TokenKind::Filter => 21,
        TokenKind::Dot => 40,
        TokenKind::Not => 45,
        TokenKind::Lbrace => 50,
        TokenKind::Lbracket => 55,
        TokenKind::Lparen => 60,
        _ => 0,
    }
}

/// Projection right-hand sides stop at anything binding below this.
const PROJECTION_STOP: u8 = 10;

/// Top-down operator precedence parser.
///
/// One-shot: build it from a [`Lexer`], call [`Parser::parse`] once.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
    options: ParserOptions,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, ParseError> {
        Self::with_options(lexer, ParserOptions::default())
    }

    pub fn with_options(lexer: Lexer, options: ParserOptions) -> Result<Self, ParseError> {
        let end = lexer.source_len();
        let mut tokens = lexer.tokenize()?;
        tokens.push(Token::new(TokenKind::Eof, end));
        Ok(Parser {
            tokens,
            index: 0,
            depth: 0,
            options,
        })
    }

    /// Parses a complete expression; every token must be consumed.
    pub fn parse(&mut self) -> Result<Ast, ParseError> {
        let ast = self.expression(0)?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.unexpected_current());
        }
        trace!(kind = ast.kind(), "parsed expression");
        Ok(ast)
    }

    fn peek(&self, offset: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)].kind
    }

    fn current_start(&self) -> usize {
        let last = self.tokens.len() - 1;
        self.tokens[self.index.min(last)].start
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(self.peek(0)) == mem::discriminant(kind)
    }

    /// Takes the current token and moves on. The end-of-stream token is
    /// never consumed.
    fn advance(&mut self) -> Token {
        let last = self.tokens.len() - 1;
        if self.index >= last {
            return self.tokens[last].clone();
        }
        let slot = &mut self.tokens[self.index];
        let token = Token::new(mem::replace(&mut slot.kind, TokenKind::Eof), slot.start);
        self.index += 1;
        token
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(ParseError::ExpectedToken {
                expected: expected.name(),
                found: self.peek(0).name(),
                position: self.current_start(),
            });
        }
        self.advance();
        Ok(())
    }

    fn unexpected(token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            found: token.kind.name(),
            value: token.kind.lexeme(),
            position: token.start,
        }
    }

    fn unexpected_current(&self) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.peek(0).name(),
            value: self.peek(0).lexeme(),
            position: self.current_start(),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                position: self.current_start(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn expression(&mut self, rbp: u8) -> Result<Ast, ParseError> {
        self.enter()?;
        let result = self.expression_inner(rbp);
        self.depth -= 1;
        result
    }

    fn expression_inner(&mut self, rbp: u8) -> Result<Ast, ParseError> {
        let token = self.advance();
        let mut left = self.nud(token)?;

        // Every led wraps `left` in a new node, so chained operators count
        // towards the nesting limit like recursion does.
        let base = self.depth;
        while rbp < binding_power(self.peek(0)) {
            self.enter()?;
            let token = self.advance();
            left = self.led(token, left)?;
        }
        self.depth = base;
        Ok(left)
    }

    /// Null denotation: a token that starts an expression.
    fn nud(&mut self, token: Token) -> Result<Ast, ParseError> {
        match token.kind {
            TokenKind::Literal(value) => Ok(Ast::Literal { value }),
            TokenKind::UnquotedIdentifier(name) => Ok(Ast::Field { name }),
            TokenKind::QuotedIdentifier(name) => {
                if self.check(&TokenKind::Lparen) {
                    return Err(ParseError::QuotedFunctionName {
                        position: token.start,
                    });
                }
                Ok(Ast::Field { name })
            }
            TokenKind::Not => {
                let node = self.expression(binding_power(&TokenKind::Not))?;
                Ok(Ast::NotExpression {
                    node: Box::new(node),
                })
            }
            TokenKind::Star => {
                let right = if self.check(&TokenKind::Rbracket) {
                    Ast::Identity
                } else {
                    self.parse_projection_rhs(binding_power(&TokenKind::Star))?
                };
                Ok(Ast::ValueProjection {
                    left: Box::new(Ast::Identity),
                    right: Box::new(right),
                })
            }
            TokenKind::Filter => self.led(token, Ast::Identity),
            TokenKind::Lbrace => self.parse_multi_select_hash(),
            TokenKind::Flatten => {
                let right = self.parse_projection_rhs(binding_power(&TokenKind::Flatten))?;
                Ok(Ast::Projection {
                    left: Box::new(Ast::Flatten {
                        node: Box::new(Ast::Identity),
                    }),
                    right: Box::new(right),
                })
            }
            TokenKind::Lbracket => {
                if matches!(self.peek(0), TokenKind::Number(_) | TokenKind::Colon) {
                    let index = self.parse_index_expression()?;
                    self.project_if_slice(Ast::Identity, index)
                } else if self.check(&TokenKind::Star) && matches!(self.peek(1), TokenKind::Rbracket)
                {
                    self.advance();
                    self.advance();
                    let right = self.parse_projection_rhs(binding_power(&TokenKind::Star))?;
                    Ok(Ast::Projection {
                        left: Box::new(Ast::Identity),
                        right: Box::new(right),
                    })
                } else {
                    self.parse_multi_select_list()
                }
            }
            TokenKind::Current => Ok(Ast::Current),
            TokenKind::Expref => {
                let node = self.expression(binding_power(&TokenKind::Expref))?;
                Ok(Ast::ExpressionReference {
                    node: Arc::new(node),
                })
            }
            TokenKind::Lparen => {
                let node = self.expression(0)?;
                self.expect(TokenKind::Rparen)?;
                Ok(node)
            }
            _ => Err(Self::unexpected(&token)),
        }
    }

    /// Left denotation: a token that continues the expression `left`.
    fn led(&mut self, token: Token, left: Ast) -> Result<Ast, ParseError> {
        let left = Box::new(left);
        match token.kind {
            TokenKind::Dot => {
                let rbp = binding_power(&TokenKind::Dot);
                if self.check(&TokenKind::Star) {
                    self.advance();
                    let right = self.parse_projection_rhs(rbp)?;
                    Ok(Ast::ValueProjection {
                        left,
                        right: Box::new(right),
                    })
                } else {
                    let right = self.parse_dot_rhs(rbp)?;
                    Ok(Ast::Subexpression {
                        left,
                        right: Box::new(right),
                    })
                }
            }
            TokenKind::Pipe => {
                let right = self.expression(binding_power(&TokenKind::Pipe))?;
                Ok(Ast::Pipe {
                    left,
                    right: Box::new(right),
                })
            }
            TokenKind::Or => {
                let right = self.expression(binding_power(&TokenKind::Or))?;
                Ok(Ast::OrExpression {
                    left,
                    right: Box::new(right),
                })
            }
            TokenKind::And => {
                let right = self.expression(binding_power(&TokenKind::And))?;
                Ok(Ast::AndExpression {
                    left,
                    right: Box::new(right),
                })
            }
            TokenKind::Lparen => {
                let Ast::Field { name } = *left else {
                    return Err(ParseError::InvalidFunctionTarget {
                        position: token.start,
                    });
                };
                let args = self.parse_function_args()?;
                Ok(Ast::Function { name, args })
            }
            TokenKind::Filter => {
                let condition = self.expression(0)?;
                self.expect(TokenKind::Rbracket)?;
                let right = if self.check(&TokenKind::Flatten) {
                    Ast::Identity
                } else {
                    self.parse_projection_rhs(binding_power(&TokenKind::Filter))?
                };
                Ok(Ast::FilterProjection {
                    left,
                    right: Box::new(right),
                    condition: Box::new(condition),
                })
            }
            TokenKind::Flatten => {
                let right = self.parse_projection_rhs(binding_power(&TokenKind::Flatten))?;
                Ok(Ast::Projection {
                    left: Box::new(Ast::Flatten { node: left }),
                    right: Box::new(right),
                })
            }
            TokenKind::Eq => self.parse_comparator(Comparator::Equal, left),
            TokenKind::Ne => self.parse_comparator(Comparator::NotEqual, left),
            TokenKind::Lt => self.parse_comparator(Comparator::LessThan, left),
            TokenKind::Lte => self.parse_comparator(Comparator::LessEqual, left),
            TokenKind::Gt => self.parse_comparator(Comparator::GreaterThan, left),
            TokenKind::Gte => self.parse_comparator(Comparator::GreaterEqual, left),
            TokenKind::Lbracket => {
                if matches!(self.peek(0), TokenKind::Number(_) | TokenKind::Colon) {
                    let index = self.parse_index_expression()?;
                    self.project_if_slice(*left, index)
                } else {
                    self.expect(TokenKind::Star)?;
                    self.expect(TokenKind::Rbracket)?;
                    let right = self.parse_projection_rhs(binding_power(&TokenKind::Star))?;
                    Ok(Ast::Projection {
                        left,
                        right: Box::new(right),
                    })
                }
            }
            _ => Err(Self::unexpected(&token)),
        }
    }

    fn parse_comparator(&mut self, op: Comparator, left: Box<Ast>) -> Result<Ast, ParseError> {
        // All comparators share one binding power.
        let right = self.expression(binding_power(&TokenKind::Eq))?;
        Ok(Ast::Comparator {
            op,
            left,
            right: Box::new(right),
        })
    }

    fn parse_function_args(&mut self) -> Result<Vec<Ast>, ParseError> {
        let mut args = vec![];

        if !self.check(&TokenKind::Rparen) {
            loop {
                args.push(self.expression(0)?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(TokenKind::Rparen)?;
        Ok(args)
    }

    /// After `[` with a number or colon ahead: `N]` or a slice.
    fn parse_index_expression(&mut self) -> Result<Ast, ParseError> {
        if self.check(&TokenKind::Colon) || matches!(self.peek(1), TokenKind::Colon) {
            return self.parse_slice_expression();
        }

        let token = self.advance();
        let TokenKind::Number(index) = token.kind else {
            return Err(Self::unexpected(&token));
        };
        self.expect(TokenKind::Rbracket)?;
        Ok(Ast::Index { index })
    }

    fn parse_slice_expression(&mut self) -> Result<Ast, ParseError> {
        let mut parts: [Option<i64>; 3] = [None; 3];
        let mut index = 0;

        while !self.check(&TokenKind::Rbracket) && index < parts.len() {
            match self.peek(0) {
                TokenKind::Colon => {
                    index += 1;
                    self.advance();
                }
                TokenKind::Number(n) if parts[index].is_none() => {
                    parts[index] = Some(*n);
                    self.advance();
                }
                _ => return Err(self.unexpected_current()),
            }
        }

        self.expect(TokenKind::Rbracket)?;
        let [start, stop, step] = parts;
        Ok(Ast::Slice { start, stop, step })
    }

    /// Wraps an index in an `IndexExpression`; a slice additionally starts a
    /// projection over the sliced elements.
    fn project_if_slice(&mut self, left: Ast, right: Ast) -> Result<Ast, ParseError> {
        let is_slice = matches!(right, Ast::Slice { .. });
        let node = Ast::IndexExpression {
            left: Box::new(left),
            right: Box::new(right),
        };

        if !is_slice {
            return Ok(node);
        }

        let rhs = self.parse_projection_rhs(binding_power(&TokenKind::Star))?;
        Ok(Ast::Projection {
            left: Box::new(node),
            right: Box::new(rhs),
        })
    }

    /// Whatever follows a projection. Low-binding continuations end the
    /// projection and leave `Identity` as the per-element expression.
    fn parse_projection_rhs(&mut self, rbp: u8) -> Result<Ast, ParseError> {
        if binding_power(self.peek(0)) < PROJECTION_STOP {
            return Ok(Ast::Identity);
        }

        match self.peek(0) {
            TokenKind::Lbracket | TokenKind::Filter => self.expression(rbp),
            TokenKind::Dot => {
                self.advance();
                self.parse_dot_rhs(rbp)
            }
            _ => Err(self.unexpected_current()),
        }
    }

    fn parse_dot_rhs(&mut self, rbp: u8) -> Result<Ast, ParseError> {
        match self.peek(0) {
            TokenKind::UnquotedIdentifier(_) | TokenKind::QuotedIdentifier(_) | TokenKind::Star => {
                self.expression(rbp)
            }
            TokenKind::Lbracket => {
                self.advance();
                self.parse_multi_select_list()
            }
            TokenKind::Lbrace => {
                self.advance();
                self.parse_multi_select_hash()
            }
            _ => Err(self.unexpected_current()),
        }
    }

    /// `[a, b, ...]` after the opening bracket.
    fn parse_multi_select_list(&mut self) -> Result<Ast, ParseError> {
        let mut elements = vec![];

        loop {
            elements.push(self.expression(0)?);

            match self.peek(0) {
                TokenKind::Comma => {
                    let comma = self.advance();
                    if self.check(&TokenKind::Rbracket) {
                        return Err(ParseError::TrailingComma {
                            position: comma.start,
                        });
                    }
                }
                TokenKind::Rbracket => break,
                _ => {
                    return Err(ParseError::ExpectedToken {
                        expected: "Comma or Rbracket",
                        found: self.peek(0).name(),
                        position: self.current_start(),
                    });
                }
            }
        }

        self.expect(TokenKind::Rbracket)?;
        Ok(Ast::MultiSelectList { elements })
    }

    /// `{key: expr, ...}` after the opening brace.
    fn parse_multi_select_hash(&mut self) -> Result<Ast, ParseError> {
        let mut pairs = vec![];

        loop {
            let key_token = self.advance();
            let key = match key_token.kind {
                TokenKind::UnquotedIdentifier(name) | TokenKind::QuotedIdentifier(name) => name,
                kind => {
                    return Err(ParseError::ExpectedToken {
                        expected: "identifier",
                        found: kind.name(),
                        position: key_token.start,
                    });
                }
            };

            self.expect(TokenKind::Colon)?;
            let value = self.expression(0)?;
            pairs.push(KeyValuePair { key, value });

            match self.peek(0) {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::Rbrace => {
                    self.advance();
                    break;
                }
                _ => {
                    return Err(ParseError::ExpectedToken {
                        expected: "Comma or Rbrace",
                        found: self.peek(0).name(),
                        position: self.current_start(),
                    });
                }
            }
        }

        Ok(Ast::MultiSelectHash { pairs })
    }
}
