//! # Parser Macros
//!
//! A couple of declarative macros factoring out the "expect this token kind
//! or produce a span-anchored parse error" pattern that otherwise shows up
//! at every call site of the recursive-descent parser below.

/// Expect the current token to match `$pattern`, consuming it; otherwise
/// return a `SourceError` of `$kind` with `$msg` anchored at the current
/// token's span.
macro_rules! expect_token {
    ($parser:expr, $pattern:pat, $kind:expr, $msg:expr) => {{
        match $parser.peek_kind() {
            $pattern => $parser.advance(),
            _ => {
                return Err($crate::error::SourceError::new(
                    $kind,
                    $msg,
                    $parser.peek_span(),
                ))
            }
        }
    }};
}

/// Expect an identifier token, consuming it and yielding the owned `String`.
macro_rules! expect_ident {
    ($parser:expr, $msg:expr) => {{
        match $parser.peek_kind().clone() {
            $crate::lexer::token::TokenKind::Ident(name) => {
                $parser.advance();
                name
            }
            _ => {
                return Err($crate::error::SourceError::new(
                    $crate::error::ErrorKind::ExpectedIdentifier,
                    $msg,
                    $parser.peek_span(),
                ))
            }
        }
    }};
}
