//! # Input multiplexer (C10)
//!
//! Runs a background producer that polls the terminal for events and
//! forwards only keyboard-kind events into a bounded channel the
//! controller drains exclusively (spec §4.7). Keeps keyboard latency off
//! the socket path and avoids mixing two blocking waits in one thread
//! (spec §5 "Shared resources").

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// How often the producer wakes up to check for a terminal event when
/// nothing is pending. Keeps the background thread responsive to process
/// shutdown without busy-looping.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Spawns the background keyboard producer and returns the receiving end
/// of its channel. Capacity 1: the producer blocks on `send` until the
/// controller consumes the previous key, so at most one keypress is ever
/// in flight (spec §4.7 "bounded channel of capacity one").
#[must_use]
pub fn spawn() -> Receiver<KeyEvent> {
    let (tx, rx) = sync_channel(1);
    std::thread::spawn(move || producer_loop(tx));
    rx
}

/// The producer never inspects the channel beyond sending into it — it
/// has no notion of whether the controller is paused or running (spec
/// §4.7 "the producer never inspects the channel").
fn producer_loop(tx: SyncSender<KeyEvent>) {
    loop {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if tx.send(key).is_err() {
                        return;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%err, "terminal event read failed");
                    return;
                }
            },
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(%err, "terminal poll failed");
                return;
            }
        }
    }
}
