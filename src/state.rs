//! Session mode tracking.
//!
//! One synchronization point owns the engine's mode and the sticky exit
//! flag. Every mode change goes through [`SessionState::transition`], a
//! compare-and-set: callers name the state they believe they are in, and a
//! `false` return means another task won the race and the caller backs off.
//! This keeps the hook callback thread, the replay worker, and the command
//! surface from interleaving inconsistent transitions.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// What the engine is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Nothing active; the only state replay may be launched from.
    #[default]
    Idle,
    /// Raw input events are being appended to the action log.
    Recording,
    /// A replay pass is walking the action log.
    Replaying,
    /// Waiting for the two calibration reference clicks.
    Calibrating,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::Recording => "recording",
            Mode::Replaying => "replaying",
            Mode::Calibrating => "calibrating",
        };
        f.write_str(name)
    }
}

/// Shared mode and exit flag for one capture/replay session.
///
/// Recording, replaying, and calibrating are mutually exclusive: a
/// transition only succeeds from the exact mode the caller expects.
#[derive(Debug, Default)]
pub struct SessionState {
    mode: Mutex<Mode>,
    exit: AtomicBool,
}

impl SessionState {
    /// Create a new session in `Idle` mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        *self.mode.lock().unwrap()
    }

    /// Compare-and-set mode transition.
    ///
    /// Returns `true` and switches to `to` only if the mode is currently
    /// `from`; otherwise leaves the mode untouched.
    pub fn transition(&self, from: Mode, to: Mode) -> bool {
        let mut mode = self.mode.lock().unwrap();
        if *mode == from {
            *mode = to;
            true
        } else {
            false
        }
    }

    /// Request process shutdown. Sticky: once set it stays set, and active
    /// recording or replay terminates promptly.
    pub fn request_exit(&self) {
        self.exit.store(true, Ordering::SeqCst);
    }

    /// Check whether shutdown has been requested.
    pub fn exit_requested(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let state = SessionState::new();
        assert_eq!(state.mode(), Mode::Idle);
        assert!(!state.exit_requested());
    }

    #[test]
    fn test_transition_is_compare_and_set() {
        let state = SessionState::new();
        assert!(state.transition(Mode::Idle, Mode::Recording));
        assert_eq!(state.mode(), Mode::Recording);

        // Replay cannot start while recording.
        assert!(!state.transition(Mode::Idle, Mode::Replaying));
        assert_eq!(state.mode(), Mode::Recording);

        assert!(state.transition(Mode::Recording, Mode::Idle));
        assert!(state.transition(Mode::Idle, Mode::Replaying));
        assert_eq!(state.mode(), Mode::Replaying);
    }

    #[test]
    fn test_exit_flag_is_sticky() {
        let state = SessionState::new();
        state.request_exit();
        state.request_exit();
        assert!(state.exit_requested());
    }
}
