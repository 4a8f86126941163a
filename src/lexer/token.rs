//! # Token Types
//!
//! Defines all token types for the `.step` instrumented language.
//!
//! ## Token Structure
//!
//! Each token contains:
//! - `kind`: The token type (keyword, identifier, literal, punctuation)
//! - `lexeme`: The original text from source code
//! - `span`: Location in source for error reporting and position derivation

use crate::position::Span;

/// A single lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

/// Token types for the `.step` language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Keywords ===
    KwImport,
    KwFunc,
    KwIf,
    KwElse,
    KwFor,
    KwSwitch,
    KwSelect,
    KwCase,
    KwDefault,
    KwReturn,

    // === Literals & identifiers ===
    Ident(String),
    Number(i64),
    StringLiteral(String),

    // === Punctuation ===
    LBrace, // {
    RBrace, // }
    LParen, // (
    RParen, // )
    Comma,  // ,
    Semi,   // ;
    Dot,    // .
    Colon,  // :
    Assign, // =
    Define, // :=

    Eof,
}

impl TokenKind {
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwImport
                | TokenKind::KwFunc
                | TokenKind::KwIf
                | TokenKind::KwElse
                | TokenKind::KwFor
                | TokenKind::KwSwitch
                | TokenKind::KwSelect
                | TokenKind::KwCase
                | TokenKind::KwDefault
                | TokenKind::KwReturn
        )
    }
}
