//! # Wire codec (C5)
//!
//! Frames the line-oriented event protocol between an instrumented `.step`
//! program and the debug server (spec §4.4, §6). A frame is ASCII text,
//! newline-terminated, colon-delimited: the first field is the command
//! tag, the rest are its arguments.
//!
//! The transform (`crate::transform`) guarantees inserted identifiers and
//! numeric literals never themselves contain `:` or `\n`, so arguments
//! need no escaping on the wire.

use std::fmt;

/// A single release byte: the only synchronisation in the protocol. The
/// target blocks reading this one byte after every frame it sends.
pub const RELEASE_BYTE: u8 = b'\n';

/// One decoded trace event (spec §3 "Trace Event", §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Emitted before executing the original statement at `(filename, line)`
    /// inside `function`.
    Line {
        filename: String,
        line: u32,
        function: String,
    },
    /// Emitted before a bare call statement evaluates its callee.
    Enter { callee: String },
    /// Emitted after that statement returns.
    Exit { callee: String },
}

impl Frame {
    /// The wire tag for this frame kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Frame::Line { .. } => "LINE",
            Frame::Enter { .. } => "ENTER",
            Frame::Exit { .. } => "EXIT",
        }
    }

    /// Serialise to the newline-terminated wire form. Mirrors what the
    /// trace helper (`tracewright-client`) does at run time; used here
    /// mainly so tests can round-trip `decode(encode(frame)) == frame`.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Frame::Line {
                filename,
                line,
                function,
            } => format!("LINE:{filename}:{line}:{function}\n"),
            Frame::Enter { callee } => format!("ENTER:{callee}\n"),
            Frame::Exit { callee } => format!("EXIT:{callee}\n"),
        }
    }
}

/// A malformed frame: wrong arity for a known tag, or an unknown tag
/// entirely. Per spec §7/§9 both are *recoverable* — the caller logs and
/// still sends the release byte rather than desynchronising the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    WrongArity {
        tag: String,
        expected: usize,
        got: usize,
    },
    UnknownTag(String),
    BadLineNumber {
        value: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::WrongArity { tag, expected, got } => write!(
                f,
                "frame '{tag}' expects {expected} argument(s), got {got}"
            ),
            DecodeError::UnknownTag(tag) => write!(f, "unknown frame tag '{tag}'"),
            DecodeError::BadLineNumber { value } => {
                write!(f, "could not parse line number '{value}'")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Parse one line of input (without its trailing newline) into a [`Frame`].
///
/// Arity mismatches and unknown tags are [`DecodeError`]s, not panics: the
/// caller is expected to log and continue (§7), never to desynchronise the
/// stream by skipping the release byte.
pub fn decode_frame(line: &str) -> Result<Frame, DecodeError> {
    let mut fields = line.split(':');
    let tag = fields.next().unwrap_or("");
    let rest: Vec<&str> = fields.collect();

    match tag {
        "LINE" => {
            if rest.len() != 3 {
                return Err(DecodeError::WrongArity {
                    tag: tag.to_string(),
                    expected: 3,
                    got: rest.len(),
                });
            }
            let line_no = rest[1]
                .parse::<u32>()
                .map_err(|_| DecodeError::BadLineNumber {
                    value: rest[1].to_string(),
                })?;
            Ok(Frame::Line {
                filename: rest[0].to_string(),
                line: line_no,
                function: rest[2].to_string(),
            })
        }
        "ENTER" => {
            if rest.len() != 1 {
                return Err(DecodeError::WrongArity {
                    tag: tag.to_string(),
                    expected: 1,
                    got: rest.len(),
                });
            }
            Ok(Frame::Enter {
                callee: rest[0].to_string(),
            })
        }
        "EXIT" => {
            if rest.len() != 1 {
                return Err(DecodeError::WrongArity {
                    tag: tag.to_string(),
                    expected: 1,
                    got: rest.len(),
                });
            }
            Ok(Frame::Exit {
                callee: rest[0].to_string(),
            })
        }
        other => Err(DecodeError::UnknownTag(other.to_string())),
    }
}
