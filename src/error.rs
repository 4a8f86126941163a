use crate::position::Span;

/// A lex/parse error in the instrumented language, in the same shape the
/// teacher's `AsmError` used: a kind tag, a human message, and the span it
/// occurred at.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl SourceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    UnterminatedString,
    UnexpectedCharacter,
    ExpectedToken,
    ExpectedIdentifier,
    ExpectedBlock,
    UnexpectedEof,
    DuplicateFunction,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ERROR (line {}:{}): {}",
            self.span.line, self.span.col, self.message
        )
    }
}

/// Fatal, process-ending failures of the instrumentor (C3/C4), as distinct
/// from the recoverable `SourceError`s collected while lexing/parsing.
/// New failure modes the teacher never had (resolving a package path,
/// writing the scratch tree) use `thiserror` rather than hand-rolled
/// `Display` impls, matching how the rest of the retrieval pack reaches
/// for it (`estuary-flow`, `0xMiden-miden-vm`).
#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    #[error("{path}: no such file or package")]
    PathNotFound { path: String },

    #[error("{path}: could not parse as a package (no .step files found)")]
    NotAPackage { path: String },

    #[error("parse error in {path}: {errors:?}")]
    Parse {
        path: String,
        errors: Vec<SourceError>,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to pretty-print instrumented unit for package {package}: {reason}")]
    PrettyPrint { package: String, reason: String },
}
