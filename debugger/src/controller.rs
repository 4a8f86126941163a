//! # Stepping controller (C7)
//!
//! Decides, for each LINE event, whether to pause or pass through, and
//! applies keyboard input to `cont_level` (spec §4.5). Kept free of any
//! socket/terminal I/O so the end-to-end scenarios of spec §8 (S1–S6) can
//! drive it directly with literal frame and key sequences.

use crate::stack::Stack;

/// `-1` pauses on every LINE (step-in); `k >= 0` pauses only when
/// `stack.depth() <= k` (step-over at depth `k`). Spec §3 "Stepping mode".
pub type ContLevel = i64;

/// Step-in: pause on every LINE regardless of depth.
pub const STEP_IN: ContLevel = -1;

/// A key the controller reacts to while paused (spec §4.5 step c).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKey {
    /// `s` — step-in.
    StepIn,
    /// `n` — step-over.
    StepOver,
    /// Ctrl-C — terminate the session.
    Abort,
    /// Anything else — "behave as the last accepted mode" (no-op on
    /// `cont_level`).
    Other,
}

/// What the controller wants the session loop to do after a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Abort,
}

/// The stepping state machine: one call-stack plus one `cont_level`.
/// Constructed once per session (spec §3 "Server session state").
#[derive(Debug, Clone)]
pub struct Controller {
    pub stack: Stack,
    pub cont_level: ContLevel,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
            cont_level: STEP_IN,
        }
    }

    /// Handle an ENTER event: push the callee, never pauses.
    pub fn on_enter(&mut self, callee: &str) {
        self.stack.push(callee);
    }

    /// Handle an EXIT event: pop, never pauses.
    pub fn on_exit(&mut self, callee: &str) {
        self.stack.pop(callee);
    }

    /// Handle a LINE event: `cond_push` the enclosing function (spec §4.5
    /// step a) then report whether the controller should pause (step b).
    /// The caller renders and blocks for a key only when this returns
    /// `true`.
    pub fn on_line(&mut self, function: &str) -> bool {
        self.stack.cond_push(function);
        self.should_pause()
    }

    fn should_pause(&self) -> bool {
        self.cont_level == STEP_IN || self.cont_level >= self.stack.depth() as ContLevel
    }

    /// Apply a keypress received while paused (spec §4.5 step c).
    pub fn apply_key(&mut self, key: StepKey) -> ControlFlow {
        match key {
            StepKey::StepIn => {
                self.cont_level = STEP_IN;
                ControlFlow::Continue
            }
            StepKey::StepOver => {
                self.cont_level = self.stack.depth() as ContLevel;
                ControlFlow::Continue
            }
            StepKey::Abort => ControlFlow::Abort,
            StepKey::Other => ControlFlow::Continue,
        }
    }
}
