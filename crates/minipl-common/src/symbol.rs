use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Lexical category of the token a [`Symbol`] was scanned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Identifier,
    Keyword,
    Operator,
    Integer,
    String,
    Type,
    Punctuation,
}

/// The token a syntax node was built from.
///
/// Produced by the parser; the checker only reads it, for identifier lookup
/// and to attribute diagnostics to a source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub lexeme: String,
    pub category: TokenCategory,
    pub position: Position,
}

impl Symbol {
    pub fn new(lexeme: impl Into<String>, category: TokenCategory, position: Position) -> Self {
        Self {
            lexeme: lexeme.into(),
            category,
            position,
        }
    }

    pub fn identifier(name: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(name, TokenCategory::Identifier, Position::new(line, column))
    }

    pub fn keyword(keyword: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(keyword, TokenCategory::Keyword, Position::new(line, column))
    }

    pub fn operator(op: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(op, TokenCategory::Operator, Position::new(line, column))
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }
}
