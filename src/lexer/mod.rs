//! # `.step` Lexer
//!
//! Tokenizes `.step` source code into a stream of tokens.
//!
//! This plays the role spec §1 calls an external collaborator ("the
//! language's parser/pretty-printer itself... treated as a library
//! producing/consuming ASTs with source-position information"): `.step`
//! is a minimal stand-in language, not a re-implementation of any real
//! compiled language, so that C2/C3/C4 have something concrete to
//! transform, load and emit.
//!
//! ## Features
//!
//! - **Keywords**: `import`, `func`, `if`, `else`, `for`, `switch`,
//!   `select`, `case`, `default`, `return`
//! - **Literals**: decimal integers, double-quoted strings with `\n \r \t
//!   \\ \" \0` escapes
//! - **Comments**: `//` line comments
//! - **Punctuation**: braces, parens, `,` `;` `.` `=` `:=`

pub mod cursor;
pub mod token;


use crate::error::{ErrorKind, SourceError};
use crate::position::Span;
use cursor::Cursor;
use token::{Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<SourceError>,
}

/// Process an escape sequence character and return the actual character
#[inline]
fn process_escape_char(esc: char) -> Option<char> {
    match esc {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        '0' => Some('\0'),
        _ => None,
    }
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    while !cursor.is_at_end() {
        match lex_token(&mut cursor) {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }

    let (b, l, c) = cursor.current_pos();
    tokens.push(Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        span: Span {
            start: b,
            end: b,
            line: l,
            col: c,
        },
    });

    LexResult { tokens, errors }
}

fn lex_token(cursor: &mut Cursor) -> Result<Option<Token>, SourceError> {
    // Skip whitespace, including newlines: statement boundaries are ';', not
    // line breaks, so newlines carry no lexical significance here.
    while matches!(cursor.peek(), Some(' ' | '\t' | '\n' | '\r')) {
        cursor.advance();
    }

    if cursor.is_at_end() {
        return Ok(None);
    }

    let (sb, sl, sc) = cursor.current_pos();
    let ch = cursor.peek().unwrap();

    match ch {
        '/' if cursor.peek_at(1) == Some('/') => lex_line_comment(cursor),
        '"' => lex_string(cursor, sb, sl, sc),
        c if c.is_ascii_digit() => lex_number(cursor, sb, sl, sc),
        c if c.is_ascii_alphabetic() || c == '_' => lex_word(cursor, sb, sl, sc),
        '{' => single(cursor, sb, sl, sc, TokenKind::LBrace, "{"),
        '}' => single(cursor, sb, sl, sc, TokenKind::RBrace, "}"),
        '(' => single(cursor, sb, sl, sc, TokenKind::LParen, "("),
        ')' => single(cursor, sb, sl, sc, TokenKind::RParen, ")"),
        ',' => single(cursor, sb, sl, sc, TokenKind::Comma, ","),
        ';' => single(cursor, sb, sl, sc, TokenKind::Semi, ";"),
        '.' => single(cursor, sb, sl, sc, TokenKind::Dot, "."),
        ':' if cursor.peek_at(1) == Some('=') => {
            cursor.advance();
            cursor.advance();
            Ok(Some(Token {
                kind: TokenKind::Define,
                lexeme: ":=".into(),
                span: cursor.make_span(sb, sl, sc),
            }))
        }
        ':' => single(cursor, sb, sl, sc, TokenKind::Colon, ":"),
        '=' => single(cursor, sb, sl, sc, TokenKind::Assign, "="),
        _ => {
            cursor.advance();
            Err(SourceError::new(
                ErrorKind::UnexpectedCharacter,
                format!("Unexpected character: '{}'", ch),
                cursor.make_span(sb, sl, sc),
            ))
        }
    }
}

fn single(
    cursor: &mut Cursor,
    sb: usize,
    sl: usize,
    sc: usize,
    kind: TokenKind,
    lexeme: &str,
) -> Result<Option<Token>, SourceError> {
    cursor.advance();
    Ok(Some(Token {
        kind,
        lexeme: lexeme.into(),
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_line_comment(cursor: &mut Cursor) -> Result<Option<Token>, SourceError> {
    while let Some(ch) = cursor.peek() {
        if ch == '\n' {
            break;
        }
        cursor.advance();
    }
    Ok(None)
}

fn lex_string(
    cursor: &mut Cursor,
    sb: usize,
    sl: usize,
    sc: usize,
) -> Result<Option<Token>, SourceError> {
    cursor.advance();
    let mut processed = String::new();

    loop {
        if cursor.is_at_end() {
            return Err(SourceError::new(
                ErrorKind::UnterminatedString,
                "Unterminated string literal",
                cursor.make_span(sb, sl, sc),
            ));
        }

        let ch = cursor.peek().unwrap();
        if ch == '\n' {
            return Err(SourceError::new(
                ErrorKind::UnterminatedString,
                "Unterminated string literal",
                cursor.make_span(sb, sl, sc),
            ));
        }

        if ch == '"' {
            cursor.advance();
            break;
        }

        if ch == '\\' {
            cursor.advance();
            if cursor.is_at_end() {
                return Err(SourceError::new(
                    ErrorKind::UnterminatedString,
                    "Unterminated string literal",
                    cursor.make_span(sb, sl, sc),
                ));
            }
            let esc = cursor.peek().unwrap();
            match process_escape_char(esc) {
                Some(resolved) => {
                    processed.push(resolved);
                    cursor.advance();
                }
                None => {
                    return Err(SourceError::new(
                        ErrorKind::UnexpectedCharacter,
                        format!("Invalid escape sequence: \\{}", esc),
                        cursor.make_span(sb, sl, sc),
                    ));
                }
            }
        } else {
            processed.push(cursor.advance().unwrap());
        }
    }

    Ok(Some(Token {
        kind: TokenKind::StringLiteral(processed.clone()),
        lexeme: format!("\"{}\"", processed),
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_number(
    cursor: &mut Cursor,
    sb: usize,
    sl: usize,
    sc: usize,
) -> Result<Option<Token>, SourceError> {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap());
    }

    let value: i64 = digits.parse().map_err(|_| {
        SourceError::new(
            ErrorKind::UnexpectedCharacter,
            format!("Invalid numeric literal: {}", digits),
            cursor.make_span(sb, sl, sc),
        )
    })?;

    Ok(Some(Token {
        kind: TokenKind::Number(value),
        lexeme: digits,
        span: cursor.make_span(sb, sl, sc),
    }))
}

fn lex_word(
    cursor: &mut Cursor,
    sb: usize,
    sl: usize,
    sc: usize,
) -> Result<Option<Token>, SourceError> {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
        word.push(cursor.advance().unwrap());
    }

    let kind = match word.as_str() {
        "import" => TokenKind::KwImport,
        "func" => TokenKind::KwFunc,
        "if" => TokenKind::KwIf,
        "else" => TokenKind::KwElse,
        "for" => TokenKind::KwFor,
        "switch" => TokenKind::KwSwitch,
        "select" => TokenKind::KwSelect,
        "case" => TokenKind::KwCase,
        "default" => TokenKind::KwDefault,
        "return" => TokenKind::KwReturn,
        _ => TokenKind::Ident(word.clone()),
    };

    Ok(Some(Token {
        kind,
        lexeme: word,
        span: cursor.make_span(sb, sl, sc),
    }))
}
