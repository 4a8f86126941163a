//! End-to-end wire-protocol test: a real `tracewright-client` connection
//! talking to a hand-driven accept loop built from the same public pieces
//! `session::run` composes internally (codec + controller), mirroring the
//! teacher's own `tests/integration_tests.rs` full-pipeline shape.
//!
//! This is the only test in this binary: `tracewright_client::init()`
//! stashes its connection in a process-wide `OnceLock`, so a second test
//! racing to set `JEB_SOCKET` and dial first would be flaky. One test per
//! process keeps that safe.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;

use tracewright::codec::{decode_frame, Frame, RELEASE_BYTE};
use tracewright_debugger::controller::{ControlFlow, Controller, StepKey};

#[test]
fn trace_client_frames_drive_a_real_controller_through_a_nested_call() {
    let dir = tempfile::tempdir().unwrap();
    let sock_path = dir.path().join("tracewright.sock");
    std::env::set_var(tracewright_client::SOCKET_ENV_VAR, &sock_path);

    let listener = UnixListener::bind(&sock_path).unwrap();

    let target = std::thread::spawn(|| {
        tracewright_client::init();
        tracewright_client::trace("LINE", &["unit.step", "1", "main"]);
        tracewright_client::trace("ENTER", &["helper"]);
        tracewright_client::trace("LINE", &["unit.step", "9", "helper"]);
        tracewright_client::trace("EXIT", &["helper"]);
        tracewright_client::trace("LINE", &["unit.step", "2", "main"]);
        tracewright_client::close();
    });

    let (conn, _) = listener.accept().unwrap();
    let mut writer = conn.try_clone().unwrap();
    let mut reader = BufReader::new(conn);
    let mut controller = Controller::new();
    let mut line_count = 0u32;

    // Step in through every line (spec §8 S1), exactly like the session
    // loop's main dispatch but without the terminal/render half.
    let mut raw = String::new();
    loop {
        raw.clear();
        if reader.read_line(&mut raw).unwrap() == 0 {
            break;
        }
        let trimmed = raw.trim_end_matches(['\n', '\r']);
        match decode_frame(trimmed).unwrap() {
            Frame::Enter { callee } => controller.on_enter(&callee),
            Frame::Exit { callee } => controller.on_exit(&callee),
            Frame::Line { function, .. } => {
                line_count += 1;
                if controller.on_line(&function) {
                    assert_eq!(
                        controller.apply_key(StepKey::StepIn),
                        ControlFlow::Continue
                    );
                }
            }
        }
        writer.write_all(&[RELEASE_BYTE]).unwrap();
    }

    target.join().unwrap();
    assert_eq!(line_count, 3);
    assert_eq!(controller.stack.depth(), 1);
}
