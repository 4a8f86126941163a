//! # tracewright-client
//!
//! The trace helper contract consumed by instrumented `.step` programs at
//! run time (spec §6, grounded on `examples/original_source/client/client.go`).
//! A single `trace(tag, args...)` call serialises `tag:args[0]:args[1].../\n`,
//! writes it to the debug server's socket, then blocks reading exactly one
//! byte (the release byte) before returning.
//!
//! Per the "process-wide state in the trace helper" design note (spec §9),
//! the connection is a lazily-initialised module-scope value rather than a
//! bare global `net.Conn`: [`init`] establishes it explicitly (idempotent —
//! safe to call from a generated program's `main` before anything else),
//! and the first `trace()` call also triggers it if `init()` was never
//! called. A connection failure is fatal: there is no debugging without it.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Mirrors `tracewright::SOCKET_ENV_VAR` — duplicated rather than
/// depended on, since this crate ships with instrumented programs and
/// stays dependency-free (spec SPEC_FULL §1: "Zero external dependencies,
/// matching the original's minimalism").
pub const SOCKET_ENV_VAR: &str = "JEB_SOCKET";
/// Mirrors `tracewright::DEFAULT_SOCKET_PATH`.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/jeb-socket";

static CONNECTION: OnceLock<Mutex<UnixStream>> = OnceLock::new();

fn socket_path() -> PathBuf {
    std::env::var_os(SOCKET_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOCKET_PATH))
}

fn dial() -> Mutex<UnixStream> {
    match UnixStream::connect(socket_path()) {
        Ok(stream) => Mutex::new(stream),
        Err(err) => {
            eprintln!("tracewright-client: could not connect to debug server: {err}");
            std::process::exit(1);
        }
    }
}

/// Establish the connection to the debug server if it isn't already open.
/// Idempotent — safe to call unconditionally at program start. The first
/// [`trace`] call does this implicitly if `init()` was never called.
pub fn init() {
    CONNECTION.get_or_init(dial);
}

/// Send one trace frame and block for the release byte.
///
/// `tag` is `"LINE"`, `"ENTER"` or `"EXIT"` as synthesised by the AST
/// transform; `args` are the frame's fields in wire order. Arguments must
/// not themselves contain `:` or `\n` — the transform guarantees this by
/// quoting identifiers and numeric literals it inserts (spec §4.4).
pub fn trace(tag: &str, args: &[&str]) {
    let conn = CONNECTION.get_or_init(dial);
    let mut stream = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let mut line = String::from(tag);
    for arg in args {
        line.push(':');
        line.push_str(arg);
    }
    line.push('\n');

    if stream.write_all(line.as_bytes()).is_err() {
        return;
    }
    let mut release = [0u8; 1];
    let _ = stream.read_exact(&mut release);
}

/// Shut down the connection, if one was ever opened. Not required for a
/// clean exit (the OS reclaims the socket), but lets a long-lived
/// embedding (e.g. a test harness driving several instrumented runs in
/// one process) release it deliberately.
pub fn close() {
    if let Some(conn) = CONNECTION.get() {
        let stream = conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = stream.shutdown(std::net::Shutdown::Both);
    }
}
