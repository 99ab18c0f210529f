use ratplex_solver::{ConstraintOp, Sense, parse_rational};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse a whole problem file
    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    /// Parse a standalone literal such as `[[2, 1], [1, 2]]` or `3/4`
    pub fn parse_value(source: &str) -> Result<Value, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        let value = parser.value()?;
        parser.skip_newlines_and_comments();
        parser.expect(TokenKind::Eof)?;
        Ok(value)
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn skip_newlines_and_comments(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn skip_comments(&mut self) {
        while self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: if t.text.is_empty() {
                    format!("{:?}", t.kind)
                } else {
                    format!("'{}'", t.text)
                },
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();

        loop {
            self.skip_newlines_and_comments();

            let item = match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Max | TokenKind::Min => Item::Sense(self.parse_sense()?),
                TokenKind::Ident => Item::Assign(self.parse_assignment()?),
                _ => return Err(self.unexpected("max, min, or an assignment")),
            };
            items.push(item);

            // One item per line
            self.skip_comments();
            match self.peek_kind() {
                TokenKind::Newline | TokenKind::Eof => {}
                _ => return Err(self.unexpected("end of line")),
            }
        }

        Ok(Program { items })
    }

    fn parse_sense(&mut self) -> Result<SenseDecl, ParseError> {
        let token = self.advance().cloned().ok_or(ParseError::UnexpectedEof)?;
        let sense = if token.kind == TokenKind::Min {
            Sense::Min
        } else {
            Sense::Max
        };
        Ok(SenseDecl {
            span: token.span,
            sense,
        })
    }

    fn parse_assignment(&mut self) -> Result<Assignment, ParseError> {
        let name = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Equals)?;
        let value = self.value()?;

        let end = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span)
            .unwrap_or(name.span);

        Ok(Assignment {
            span: name.span.merge(end),
            name: name.text,
            value,
        })
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_comments();
        match self.peek_kind() {
            TokenKind::LBracket => self.list(),
            TokenKind::Number => self.number(),
            TokenKind::LessEqual => {
                self.advance();
                Ok(Value::Op(ConstraintOp::Le))
            }
            TokenKind::GreaterEqual => {
                self.advance();
                Ok(Value::Op(ConstraintOp::Ge))
            }
            TokenKind::Equals => {
                self.advance();
                Ok(Value::Op(ConstraintOp::Eq))
            }
            _ => Err(self.unexpected("a number, an operator, or a list")),
        }
    }

    fn list(&mut self) -> Result<Value, ParseError> {
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();

        loop {
            self.skip_newlines_and_comments();
            if self.peek_kind() == TokenKind::RBracket {
                break;
            }
            items.push(self.value()?);
            self.skip_newlines_and_comments();
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBracket => break,
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }

        self.expect(TokenKind::RBracket)?;
        Ok(Value::List(items))
    }

    /// `n` or `n/d`
    fn number(&mut self) -> Result<Value, ParseError> {
        let mut text = self.expect(TokenKind::Number)?.text;
        if self.peek_kind() == TokenKind::Slash {
            self.advance();
            let denom = self.expect(TokenKind::Number)?;
            text.push('/');
            text.push_str(&denom.text);
        }
        let value = parse_rational(&text).map_err(|e| ParseError::InvalidNumber(e.to_string()))?;
        Ok(Value::Number(value))
    }
}
