//! # tracewright-debugger
//!
//! The server half of the step-debugger (spec §2, components C6–C10):
//! call-stack model, stepping controller, source cache, TUI renderer and
//! input multiplexer, plus the socket session plumbing that ties them to
//! the wire codec shared with `tracewright` (the instrumentor).
//!
//! The binary built from this crate (`tracewright`) is the single
//! two-mode executable spec §6 describes: invoked with a path it
//! instruments, invoked bare it serves a debugging session.

pub mod controller;
pub mod input;
pub mod renderer;
pub mod session;
pub mod source_cache;
pub mod stack;
