//! # tracewright
//!
//! Source-instrumentation engine for a step-debugger: a tiny statement-
//! oriented language (`.step`), an AST transform that interleaves trace
//! calls around every statement, a package loader, a deterministic
//! emitter, and the wire codec shared with the debug server.
//!
//! ## Pipeline
//!
//! 1. **Loader** ([`loader`]) turns a file or package path into one merged
//!    [`parser::ast::CompilationUnit`].
//! 2. **Transform** ([`transform`]) rewrites every function body to
//!    interleave `trace(...)` calls around each original statement.
//! 3. **Emitter** ([`emitter`]) pretty-prints the transformed unit to a
//!    mirrored location under a scratch root.
//! 4. The emitted `.step` program is built and run by the outside world;
//!    its `trace` calls speak the [`codec`] wire format back to a running
//!    `tracewright-debugger` server.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tracewright::{emitter, loader, transform};
//!
//! let loaded = loader::load(std::path::Path::new("example/simple.step")).unwrap();
//! let transformed = transform::transform_unit(&loaded.unit);
//! let scratch_root = std::env::temp_dir().join("tracewright");
//! let out_path = emitter::emit(&transformed.unit, &scratch_root).unwrap();
//! println!("wrote {}", out_path.display());
//! ```

pub mod codec;
pub mod emitter;
pub mod error;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod position;
pub mod transform;

/// Environment variable overriding the well-known socket path (§6).
pub const SOCKET_ENV_VAR: &str = "JEB_SOCKET";

/// Default local domain socket path, per §6.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/jeb-socket";

/// Resolve the socket path the server listens on and the trace helper
/// dials: `$JEB_SOCKET` if set, else [`DEFAULT_SOCKET_PATH`].
#[must_use]
pub fn socket_path() -> std::path::PathBuf {
    std::env::var_os(SOCKET_ENV_VAR)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_SOCKET_PATH))
}
