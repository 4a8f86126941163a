//! # Server session plumbing
//!
//! Ties the wire codec (C5), the call-stack model and stepping controller
//! (C6/C7), the source cache (C8), the TUI renderer (C9) and the input
//! multiplexer (C10) into the server's accept-one-connection loop (spec
//! §3 "Server session state", §4.4–§4.8, §5, §6).
//!
//! One controller task drives the socket; the keyboard producer
//! ([`crate::input`]) runs independently. The controller only ever waits
//! on one thing at a time: the socket while running, the keyboard channel
//! while paused (spec §5).

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::mpsc::Receiver;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracewright::codec::{decode_frame, Frame, RELEASE_BYTE};

use crate::controller::{ControlFlow, Controller, StepKey};
use crate::input;
use crate::source_cache::SourceCache;

/// Fatal session-level failures (spec §7: "Socket listen/accept: fatal";
/// "Terminal init failure: fatal").
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("could not bind socket at {path}: {source}")]
    Bind {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not accept connection: {0}")]
    Accept(std::io::Error),
    #[error("terminal initialisation failed: {0}")]
    Terminal(std::io::Error),
}

/// Running totals reported in the end-of-session summary (SPEC_FULL §4,
/// "Symbol-table-style session summary").
#[derive(Debug, Default, Clone, Copy)]
struct EventCounts {
    lines: u64,
    enters: u64,
    exits: u64,
}

/// Bind the socket at `socket_path`, accept exactly one connection, and
/// run the session until EOF or an abort keypress (spec §6 server mode).
/// `tui` selects between the ratatui screen and the plain fallback
/// renderer (SPEC_FULL §4).
pub fn run(socket_path: &Path, tui: bool) -> Result<(), ServerError> {
    if socket_path.exists() {
        let _ = std::fs::remove_file(socket_path);
    }
    let listener = UnixListener::bind(socket_path).map_err(|source| ServerError::Bind {
        path: socket_path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %socket_path.display(), "listening for target connection");

    let (stream, _addr) = listener.accept().map_err(ServerError::Accept)?;
    tracing::info!("target connected");

    let outcome = if tui {
        run_tui_session(stream)
    } else {
        run_plain_session(stream)
    };

    let _ = std::fs::remove_file(socket_path);
    outcome
}

fn run_tui_session(stream: UnixStream) -> Result<(), ServerError> {
    enable_raw_mode().map_err(ServerError::Terminal)?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(ServerError::Terminal)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(ServerError::Terminal)?;
    let _guard = TerminalGuard;

    let key_rx = input::spawn();
    let mut session = Session::new(stream);
    session.drive(|controller, cache, filename, line| {
        let lines = cache.get(filename).to_vec();
        let stack = controller.stack.frames().to_vec();
        let _ = terminal.draw(|frame| crate::renderer::render(frame, &stack, &lines, line));
        recv_key(&key_rx)
    });
    Ok(())
}

/// Restores the terminal on every exit path, including an early return or
/// panic unwind (spec §5 "Scoped acquisition").
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
    }
}

fn run_plain_session(stream: UnixStream) -> Result<(), ServerError> {
    use crossterm::event;
    let mut session = Session::new(stream);
    session.drive(|controller, cache, filename, line| {
        let lines = cache.get(filename);
        crate::renderer::render_plain(controller.stack.frames(), lines, line);
        loop {
            match event::read() {
                Ok(event::Event::Key(key)) if key.kind != event::KeyEventKind::Release => {
                    return Some(key)
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    });
    Ok(())
}

fn recv_key(rx: &Receiver<KeyEvent>) -> Option<KeyEvent> {
    // Blocks indefinitely: the controller is meant to wait here exactly
    // as long as the human takes (spec §5 "a receive from the keyboard
    // channel while paused").
    rx.recv().ok()
}

/// Classify a keypress per spec §4.5 step c.
fn classify_key(key: KeyEvent) -> StepKey {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return StepKey::Abort;
    }
    match key.code {
        KeyCode::Char('s') => StepKey::StepIn,
        KeyCode::Char('n') => StepKey::StepOver,
        _ => StepKey::Other,
    }
}

/// One connected target: codec reader/writer, controller, source cache,
/// and the running event counts (spec §3 "Server session state").
struct Session {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
    controller: Controller,
    cache: SourceCache,
    counts: EventCounts,
}

impl Session {
    fn new(stream: UnixStream) -> Self {
        let writer = stream.try_clone().expect("unix stream clone");
        Self {
            reader: BufReader::new(stream),
            writer,
            controller: Controller::new(),
            cache: SourceCache::new(),
            counts: EventCounts::default(),
        }
    }

    /// Drive the accept loop. `on_pause` renders the current state and
    /// blocks for exactly one keypress; it is injected so the TUI and
    /// plain-fallback paths can share this loop (spec §4.5, §4.7).
    fn drive(&mut self, mut on_pause: impl FnMut(&Controller, &mut SourceCache, &str, usize) -> Option<KeyEvent>) {
        let mut line = String::new();
        loop {
            line.clear();
            let read = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(err) => {
                    tracing::error!(%err, "socket read failed, ending session");
                    break;
                }
            };
            if read == 0 {
                tracing::info!("target disconnected (EOF)");
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }

            match decode_frame(trimmed) {
                Ok(Frame::Enter { callee }) => {
                    self.controller.on_enter(&callee);
                    self.counts.enters += 1;
                    self.release();
                }
                Ok(Frame::Exit { callee }) => {
                    self.controller.on_exit(&callee);
                    self.counts.exits += 1;
                    self.release();
                }
                Ok(Frame::Line {
                    filename,
                    line: line_no,
                    function,
                }) => {
                    self.counts.lines += 1;
                    let paused = self.controller.on_line(&function);
                    if paused {
                        if let Some(key) = on_pause(&self.controller, &mut self.cache, &filename, line_no as usize) {
                            let key = classify_key(key);
                            if self.controller.apply_key(key) == ControlFlow::Abort {
                                tracing::info!("session aborted by user");
                                self.release();
                                return;
                            }
                        }
                    }
                    self.release();
                }
                Err(err) => {
                    tracing::warn!(frame = %trimmed, error = %err, "malformed frame, releasing and continuing");
                    self.release();
                }
            }
        }

        tracing::info!(
            lines = self.counts.lines,
            enters = self.counts.enters,
            exits = self.counts.exits,
            final_depth = self.controller.stack.depth(),
            "session summary"
        );
    }

    /// Send the one-byte release that unblocks the target (spec §4.4).
    fn release(&mut self) {
        if let Err(err) = self.writer.write_all(&[RELEASE_BYTE]) {
            tracing::error!(%err, "failed to send release byte");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::io::Read;

    /// Drives `Session::drive` over an in-process `UnixStream::pair`,
    /// with a scripted "target" thread speaking the wire protocol on one
    /// end and a scripted key sequence standing in for the keyboard on
    /// the other. Exercises the socket-framing half of spec §8's S1-S6
    /// scenarios end to end (the controller's own state-machine behaviour
    /// is covered directly in `crate::controller::tests`).
    fn run_scripted(raw_frames: &[&str], keys: Vec<KeyEvent>) -> (EventCounts, usize) {
        let (server_side, target_side) = UnixStream::pair().unwrap();
        let frames: Vec<String> = raw_frames.iter().map(|s| s.to_string()).collect();

        let target = std::thread::spawn(move || {
            let mut stream = target_side;
            for frame in frames {
                stream.write_all(frame.as_bytes()).unwrap();
                stream.write_all(b"\n").unwrap();
                let mut release = [0u8; 1];
                stream.read_exact(&mut release).unwrap();
                assert_eq!(release, [RELEASE_BYTE]);
            }
            // Dropping the stream here produces the EOF the session loop
            // ends on (spec §7 "Socket EOF: clean session end").
        });

        let mut session = Session::new(server_side);
        let mut keys = keys.into_iter();
        session.drive(|_controller, _cache, _filename, _line| keys.next());

        target.join().unwrap();
        (session.counts, session.controller.stack.depth())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn s1_step_in_counts_every_line_and_unwinds_cleanly() {
        let (counts, depth) = run_scripted(
            &["LINE:f:1:main", "LINE:f:2:main", "LINE:f:3:main"],
            vec![key(KeyCode::Char('s')), key(KeyCode::Char('s')), key(KeyCode::Char('s'))],
        );
        assert_eq!(counts.lines, 3);
        assert_eq!(depth, 1);
    }

    #[test]
    fn s2_step_over_skips_the_nested_calls_release_without_blocking_on_keys() {
        let (counts, depth) = run_scripted(
            &[
                "LINE:f:1:main",
                "ENTER:g",
                "LINE:f:7:g",
                "LINE:f:8:g",
                "EXIT:g",
                "LINE:f:2:main",
            ],
            vec![key(KeyCode::Char('n')), key(KeyCode::Char('s'))],
        );
        assert_eq!(counts.lines, 4);
        assert_eq!(counts.enters, 1);
        assert_eq!(counts.exits, 1);
        assert_eq!(depth, 1);
    }

    #[test]
    fn s6_malformed_frame_is_released_and_does_not_desync_the_stream() {
        let (counts, _depth) = run_scripted(
            &["WAT:x:y", "LINE:f:1:main"],
            vec![key(KeyCode::Char('s'))],
        );
        assert_eq!(counts.lines, 1);
    }

    #[test]
    fn ctrl_c_aborts_before_eof() {
        let (server_side, target_side) = UnixStream::pair().unwrap();
        let target = std::thread::spawn(move || {
            let mut stream = target_side;
            stream.write_all(b"LINE:f:1:main\n").unwrap();
            let mut release = [0u8; 1];
            let _ = stream.read_exact(&mut release);
        });

        let mut session = Session::new(server_side);
        let mut keys = vec![key(KeyCode::Char('c')).into_ctrl()].into_iter();
        session.drive(|_controller, _cache, _filename, _line| keys.next());

        target.join().unwrap();
    }

    trait CtrlExt {
        fn into_ctrl(self) -> Self;
    }
    impl CtrlExt for KeyEvent {
        fn into_ctrl(mut self) -> Self {
            self.modifiers = KeyModifiers::CONTROL;
            self
        }
    }
}
