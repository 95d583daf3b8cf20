use std::fmt;
use std::mem;

use log::{debug, info};

/// Token kinds for the Brook language. Literal payloads live inside the
/// variant so a token is self-contained.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone)]
pub enum TokenType {
    // Single-character tokens.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // One or two character tokens.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    // Literals.
    IDENTIFIER,
    STRING(String),
    NUMBER(f64),

    // Keywords.
    AND,
    BREAK,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    TRUE,
    VAR,
    WHILE,

    // Special Characters
    EOF,
}

/// Equality by kind only: the parser dispatches on token kind, so a
/// `NUMBER(1.0)` and a `NUMBER(2.0)` compare equal.
impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        debug!("Comparing TokenType: self={:?}, other={:?}", self, other);

        mem::discriminant(self) == mem::discriminant(other)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, line: usize) -> Self {
        info!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug!(
            "Formatting token: type={:?}, lexeme={}, line={}",
            self.token_type, self.lexeme, self.line
        );

        match &self.token_type {
            TokenType::STRING(literal) => write!(f, "STRING {} {}", self.lexeme, literal),

            TokenType::NUMBER(literal) => {
                if literal.fract() == 0.0 {
                    write!(f, "NUMBER {} {:.1}", self.lexeme, literal)
                } else {
                    write!(f, "NUMBER {} {}", self.lexeme, literal)
                }
            }

            other => write!(f, "{:?} {}", other, self.lexeme),
        }
    }
}
