//! The capture controller: mode machine, hotkeys, and the event pump.
//!
//! The controller is the single consumer of the raw-event stream. Hook
//! callbacks publish into a channel ([`raw_channel`](crate::hook::raw_channel))
//! and the controller interprets each event according to the current mode:
//! appended to the action log while recording, fed to the calibrator while
//! calibrating, ignored otherwise. Four reserved hotkeys double as the
//! command surface and are consumed as commands in every mode, never
//! recorded as content.

use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::calibration::{CalibrationStep, Calibrator, Transform};
use crate::channel::{Status, StatusSink};
use crate::config::CalibrationStore;
use crate::error::{Error, Result};
use crate::event::Action;
use crate::hook::RawEvent;
use crate::inject::{Injector, ScreenProbe};
use crate::keycode::Key;
use crate::recording::{ActionLog, MacroFile};
use crate::replay::Replayer;
use crate::state::{Mode, SessionState};

/// The four reserved control keys.
///
/// These are command signals, not recordable content: they are intercepted
/// in every mode, presses and releases both, even while keyboard capture is
/// recording everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkeys {
    /// Begin/stop recording.
    pub record: Key,
    /// Begin/stop replay.
    pub replay: Key,
    /// Start a two-point calibration.
    pub calibrate: Key,
    /// Hard-exit: terminate recording/replay and unblock the listener.
    pub exit: Key,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            record: Key::ArrowLeft,
            replay: Key::ArrowRight,
            calibrate: Key::ArrowUp,
            exit: Key::ArrowDown,
        }
    }
}

impl Hotkeys {
    fn command_for(&self, key: Key) -> Option<HotkeyCommand> {
        if key == self.record {
            Some(HotkeyCommand::ToggleRecording)
        } else if key == self.replay {
            Some(HotkeyCommand::ToggleReplay)
        } else if key == self.calibrate {
            Some(HotkeyCommand::Calibrate)
        } else if key == self.exit {
            Some(HotkeyCommand::Exit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HotkeyCommand {
    ToggleRecording,
    ToggleReplay,
    Calibrate,
    Exit,
}

/// Owns the session: recording, calibration, log edits, and replay control.
pub struct CaptureController {
    state: Arc<SessionState>,
    log: Arc<Mutex<ActionLog>>,
    transform: Arc<Mutex<Transform>>,
    store: CalibrationStore,
    calibrator: Calibrator,
    replayer: Replayer,
    hotkeys: Hotkeys,
    keyboard_capture: bool,
    last_event_time: Instant,
    sink: Option<Arc<dyn StatusSink>>,
}

impl CaptureController {
    /// Create a controller, loading (or auto-detecting and persisting) the
    /// calibration transform through `store`.
    pub fn new(
        injector: Arc<dyn Injector>,
        probe: &dyn ScreenProbe,
        store: CalibrationStore,
    ) -> Self {
        let state = Arc::new(SessionState::new());
        let log = Arc::new(Mutex::new(ActionLog::new()));
        let transform = Arc::new(Mutex::new(store.load_or_detect(probe)));
        let replayer = Replayer::new(
            state.clone(),
            log.clone(),
            transform.clone(),
            injector,
        );
        Self {
            state,
            log,
            transform,
            store,
            calibrator: Calibrator::new(),
            replayer,
            hotkeys: Hotkeys::default(),
            keyboard_capture: true,
            last_event_time: Instant::now(),
            sink: None,
        }
    }

    /// Subscribe a status sink for log lines and mode changes.
    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Override the reserved control keys.
    pub fn set_hotkeys(&mut self, hotkeys: Hotkeys) {
        self.hotkeys = hotkeys;
    }

    /// Toggle whether key events are recorded (default on).
    pub fn set_keyboard_capture(&mut self, enabled: bool) {
        self.keyboard_capture = enabled;
        let state = if enabled { "enabled" } else { "disabled" };
        self.report(format!("keyboard recording {state}"));
    }

    /// Check whether key events are being recorded.
    pub fn keyboard_capture(&self) -> bool {
        self.keyboard_capture
    }

    /// Set the replay speed multiplier.
    pub fn set_replay_speed(&self, speed: f64) -> Result<()> {
        self.replayer.set_speed(speed)
    }

    /// Toggle continuous replay (default on).
    pub fn set_replay_looping(&self, looping: bool) {
        self.replayer.set_looping(looping);
    }

    /// The current session mode.
    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    /// The shared session state (mode + exit flag).
    pub fn session(&self) -> &Arc<SessionState> {
        &self.state
    }

    /// The active calibration transform.
    pub fn transform(&self) -> Transform {
        *self.transform.lock().unwrap()
    }

    /// Snapshot of the recorded actions, in replay order.
    pub fn actions(&self) -> Vec<Action> {
        self.log.lock().unwrap().actions().to_vec()
    }

    /// Number of recorded actions.
    pub fn action_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Begin or stop recording.
    ///
    /// Entering clears the action log and resets the delay clock; leaving
    /// freezes the log. Rejected with [`Error::LogBusy`] while replaying or
    /// calibrating.
    pub fn toggle_recording(&mut self) -> Result<()> {
        if self.state.transition(Mode::Recording, Mode::Idle) {
            let count = self.log.lock().unwrap().len();
            self.report(format!("recording stopped, {count} actions recorded"));
            self.report_mode();
            return Ok(());
        }
        if !self.state.transition(Mode::Idle, Mode::Recording) {
            return Err(Error::LogBusy);
        }
        self.log.lock().unwrap().clear();
        self.last_event_time = Instant::now();
        self.report("recording started");
        self.report_mode();
        Ok(())
    }

    /// Begin or stop replay.
    pub fn toggle_replay(&mut self) -> Result<()> {
        if self.replayer.is_replaying() {
            self.replayer.stop()?;
            self.report("replay stopped");
            self.report_mode();
            return Ok(());
        }
        self.replayer.start()?;
        self.report("replaying actions");
        self.report_mode();
        Ok(())
    }

    /// Enter calibration mode and wait for the two reference clicks.
    ///
    /// No-op when already calibrating; rejected with [`Error::LogBusy`]
    /// while recording or replaying.
    pub fn start_calibration(&mut self) -> Result<()> {
        if self.state.mode() == Mode::Calibrating {
            return Ok(());
        }
        if !self.state.transition(Mode::Idle, Mode::Calibrating) {
            return Err(Error::LogBusy);
        }
        self.calibrator.reset();
        self.report("calibration started: click the top-left corner of the target screen, then the bottom-right corner");
        self.report_mode();
        Ok(())
    }

    /// Set the exit flag, stop any in-progress replay, and return the
    /// session to idle so the process can shut down.
    pub fn request_exit(&mut self) {
        self.report("exiting");
        self.state.request_exit();
        if let Err(err) = self.replayer.stop() {
            log::warn!("replay did not stop cleanly: {err}");
        }
        self.state.transition(Mode::Recording, Mode::Idle);
        self.state.transition(Mode::Calibrating, Mode::Idle);
        self.report_mode();
    }

    // ------------------------------------------------------------------
    // Log editing (between passes)
    // ------------------------------------------------------------------

    /// Replace the delay of the action at `index`.
    pub fn set_delay(&mut self, index: usize, secs: f64) -> Result<()> {
        self.ensure_editable()?;
        self.log.lock().unwrap().retime(index, secs)?;
        self.report(format!("action {index} delay set to {secs:.3}s"));
        Ok(())
    }

    /// Delete the action at `index`.
    pub fn remove_action(&mut self, index: usize) -> Result<Action> {
        self.ensure_editable()?;
        let removed = self.log.lock().unwrap().remove(index)?;
        self.report(format!("deleted action {index} ({removed})"));
        Ok(removed)
    }

    /// Swap the actions at `a` and `b` (reorder).
    pub fn swap_actions(&mut self, a: usize, b: usize) -> Result<()> {
        self.ensure_editable()?;
        self.log.lock().unwrap().swap(a, b)?;
        Ok(())
    }

    /// Drop all recorded actions.
    pub fn clear_actions(&mut self) -> Result<()> {
        self.ensure_editable()?;
        self.log.lock().unwrap().clear();
        self.report("actions cleared");
        Ok(())
    }

    /// Save the recorded actions as a portable macro file.
    pub fn save_macro(&self, path: impl AsRef<Path>) -> Result<()> {
        let log = self.log.lock().unwrap();
        if log.is_empty() {
            return Err(Error::EmptyLog);
        }
        MacroFile::from_log(&log).save(&path)?;
        drop(log);
        self.report(format!("macro saved to {}", path.as_ref().display()));
        Ok(())
    }

    /// Replace the action log with the contents of a macro file.
    ///
    /// Rejected with [`Error::LogBusy`] while recording or replaying; a
    /// malformed file leaves the current log untouched.
    pub fn load_macro(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        self.ensure_editable()?;
        let file = MacroFile::load(&path)?;
        let created = file.created.clone();
        let loaded = file.into_log();
        let count = loaded.len();
        *self.log.lock().unwrap() = loaded;
        self.report(format!("loaded macro with {count} actions (created {created})"));
        Ok(count)
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.state.mode() {
            Mode::Recording | Mode::Replaying => Err(Error::LogBusy),
            Mode::Idle | Mode::Calibrating => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Raw event handling
    // ------------------------------------------------------------------

    /// Interpret one raw event from the hook stream per the current mode.
    pub fn handle_raw(&mut self, event: RawEvent) {
        match event {
            RawEvent::Key { key, pressed } => {
                // Hotkeys are commands in every mode; both edges are
                // consumed so a release never leaks into a recording.
                if let Some(command) = self.hotkeys.command_for(key) {
                    if pressed {
                        self.dispatch(command);
                    }
                    return;
                }
                if self.state.mode() == Mode::Recording && self.keyboard_capture {
                    let delay = self.take_delay();
                    let name = key.canonical_name();
                    let phase = if pressed { "press" } else { "release" };
                    self.log
                        .lock()
                        .unwrap()
                        .push(Action::key(name.clone(), pressed, delay));
                    self.report(format!("recorded key {phase}: {name}"));
                }
            }
            RawEvent::PointerButton {
                x,
                y,
                button,
                pressed,
            } => {
                if self.state.mode() == Mode::Calibrating {
                    if pressed {
                        self.submit_calibration_point(x, y);
                    }
                    return;
                }
                if self.state.mode() == Mode::Recording {
                    let delay = self.take_delay();
                    self.log.lock().unwrap().push(Action::click(
                        x.round() as i32,
                        y.round() as i32,
                        button,
                        pressed,
                        delay,
                    ));
                    if pressed {
                        self.report(format!("recorded {button} click at ({x:.0}, {y:.0})"));
                    }
                }
            }
            RawEvent::PointerMove { x, y } => {
                if self.state.mode() == Mode::Recording {
                    let delay = self.take_delay();
                    self.log.lock().unwrap().push(Action::move_to(
                        x.round() as i32,
                        y.round() as i32,
                        delay,
                    ));
                }
            }
        }
    }

    /// Pump raw events until exit is requested or the hook disconnects.
    ///
    /// The timeout bounds how long an exit request can go unnoticed while
    /// the hook is quiet.
    pub fn run(&mut self, events: Receiver<RawEvent>) {
        self.report("press the calibrate hotkey to start calibration");
        self.report("press the record hotkey to start/stop recording");
        self.report("press the replay hotkey to start/stop replaying");
        self.report("press the exit hotkey to exit");

        while !self.state.exit_requested() {
            match events.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => self.handle_raw(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        if let Err(err) = self.replayer.stop() {
            log::warn!("replay did not stop cleanly: {err}");
        }
    }

    fn dispatch(&mut self, command: HotkeyCommand) {
        let result = match command {
            HotkeyCommand::ToggleRecording => self.toggle_recording(),
            HotkeyCommand::ToggleReplay => self.toggle_replay(),
            HotkeyCommand::Calibrate => self.start_calibration(),
            HotkeyCommand::Exit => {
                self.request_exit();
                Ok(())
            }
        };
        // Hotkeys have no caller to hand the error to; surface it as a
        // status line instead.
        if let Err(err) = result {
            self.report(err.to_string());
        }
    }

    fn submit_calibration_point(&mut self, x: f64, y: f64) {
        let (width, height) = {
            let transform = self.transform.lock().unwrap();
            (transform.screen_width, transform.screen_height)
        };
        match self.calibrator.submit(x, y, width, height) {
            Ok(CalibrationStep::AwaitingBottomRight) => {
                self.report("top-left corner recorded, now click the bottom-right corner");
            }
            Ok(CalibrationStep::Complete(transform)) => {
                *self.transform.lock().unwrap() = transform;
                if let Err(err) = self.store.save(&transform) {
                    log::warn!("could not persist calibration: {err}");
                }
                self.report(format!(
                    "calibration complete: scale ({:.4}, {:.4}), offset ({}, {})",
                    transform.scale_x, transform.scale_y, transform.offset_x, transform.offset_y
                ));
                self.state.transition(Mode::Calibrating, Mode::Idle);
                self.report_mode();
            }
            Err(err) => {
                // Buffer was discarded; stay calibrating and re-prompt.
                self.report(format!("{err}; click the top-left corner again"));
            }
        }
    }

    fn take_delay(&mut self) -> f64 {
        let now = Instant::now();
        let delay = now.duration_since(self.last_event_time).as_secs_f64();
        self.last_event_time = now;
        delay
    }

    fn report(&self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        if let Some(sink) = &self.sink {
            sink.publish(Status::Message(message));
        }
    }

    fn report_mode(&self) {
        if let Some(sink) = &self.sink {
            sink.publish(Status::Mode(self.state.mode()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::status_channel;
    use crate::event::Button;

    #[derive(Default)]
    struct NullInjector;

    impl Injector for NullInjector {
        fn pointer_move(&self, _x: f64, _y: f64) -> Result<()> {
            Ok(())
        }

        fn button(&self, _button: Button, _pressed: bool) -> Result<()> {
            Ok(())
        }

        fn key(&self, _key: Key, _pressed: bool) -> Result<()> {
            Ok(())
        }
    }

    struct FixedScreen;

    impl ScreenProbe for FixedScreen {
        fn primary_resolution(&self) -> Result<(u32, u32)> {
            Ok((1920, 1080))
        }
    }

    fn controller_in(dir: &std::path::Path) -> CaptureController {
        let store = CalibrationStore::new(dir.join("calibration.json"));
        CaptureController::new(Arc::new(NullInjector), &FixedScreen, store)
    }

    #[test]
    fn test_recording_captures_events_with_delays() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());

        ctl.toggle_recording().unwrap();
        assert_eq!(ctl.mode(), Mode::Recording);

        ctl.handle_raw(RawEvent::PointerMove { x: 10.0, y: 10.0 });
        ctl.handle_raw(RawEvent::PointerButton {
            x: 10.0,
            y: 10.0,
            button: Button::Left,
            pressed: true,
        });
        ctl.handle_raw(RawEvent::Key {
            key: Key::KeyA,
            pressed: true,
        });

        ctl.toggle_recording().unwrap();
        assert_eq!(ctl.mode(), Mode::Idle);

        let actions = ctl.actions();
        assert_eq!(actions.len(), 3);
        assert!(matches!(actions[0], Action::Move { x: 10, y: 10, .. }));
        assert!(matches!(
            actions[1],
            Action::Click {
                button: Button::Left,
                pressed: true,
                ..
            }
        ));
        assert!(matches!(&actions[2], Action::Key { key, pressed: true, .. } if key == "a"));
        assert!(actions.iter().all(|a| a.delay() >= 0.0));
    }

    #[test]
    fn test_entering_recording_clears_previous_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());

        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::PointerMove { x: 1.0, y: 1.0 });
        ctl.toggle_recording().unwrap();
        assert_eq!(ctl.action_count(), 1);

        ctl.toggle_recording().unwrap();
        assert_eq!(ctl.action_count(), 0);
        ctl.toggle_recording().unwrap();
    }

    #[test]
    fn test_hotkeys_are_commands_not_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());

        ctl.toggle_recording().unwrap();
        // Calibrate hotkey during recording: consumed as a command (which
        // is itself rejected while recording), never appended to the log.
        ctl.handle_raw(RawEvent::Key {
            key: Key::ArrowUp,
            pressed: true,
        });
        ctl.handle_raw(RawEvent::Key {
            key: Key::ArrowUp,
            pressed: false,
        });
        assert_eq!(ctl.mode(), Mode::Recording);
        assert_eq!(ctl.action_count(), 0);

        // The record hotkey stops the recording.
        ctl.handle_raw(RawEvent::Key {
            key: Key::ArrowLeft,
            pressed: true,
        });
        assert_eq!(ctl.mode(), Mode::Idle);
        assert_eq!(ctl.action_count(), 0);
    }

    #[test]
    fn test_keyboard_capture_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        ctl.set_keyboard_capture(false);

        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::Key {
            key: Key::KeyA,
            pressed: true,
        });
        ctl.handle_raw(RawEvent::PointerMove { x: 5.0, y: 5.0 });
        ctl.toggle_recording().unwrap();

        // Only the pointer event was captured.
        assert_eq!(ctl.action_count(), 1);
        assert!(matches!(ctl.actions()[0], Action::Move { .. }));
    }

    #[test]
    fn test_calibration_flow_persists_and_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());

        ctl.start_calibration().unwrap();
        assert_eq!(ctl.mode(), Mode::Calibrating);
        // Repeated request is a no-op.
        ctl.start_calibration().unwrap();

        ctl.handle_raw(RawEvent::PointerButton {
            x: 100.0,
            y: 50.0,
            button: Button::Left,
            pressed: true,
        });
        assert_eq!(ctl.mode(), Mode::Calibrating);
        // Releases don't count as reference points.
        ctl.handle_raw(RawEvent::PointerButton {
            x: 100.0,
            y: 50.0,
            button: Button::Left,
            pressed: false,
        });

        ctl.handle_raw(RawEvent::PointerButton {
            x: 2020.0,
            y: 1130.0,
            button: Button::Left,
            pressed: true,
        });
        assert_eq!(ctl.mode(), Mode::Idle);

        let transform = ctl.transform();
        assert_eq!(transform.offset_x, 100.0);
        assert_eq!(transform.offset_y, 50.0);
        assert_eq!(transform.scale_x, 1.0);

        // Persisted for the next run.
        let store = CalibrationStore::new(dir.path().join("calibration.json"));
        assert_eq!(store.load().unwrap(), transform);

        // Calibration clicks were never recorded as actions.
        assert_eq!(ctl.action_count(), 0);
    }

    #[test]
    fn test_degenerate_calibration_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        let before = ctl.transform();

        ctl.start_calibration().unwrap();
        ctl.handle_raw(RawEvent::PointerButton {
            x: 500.0,
            y: 500.0,
            button: Button::Left,
            pressed: true,
        });
        // Inverted bottom-right: rejected, still calibrating.
        ctl.handle_raw(RawEvent::PointerButton {
            x: 100.0,
            y: 100.0,
            button: Button::Left,
            pressed: true,
        });
        assert_eq!(ctl.mode(), Mode::Calibrating);
        assert_eq!(ctl.transform(), before);

        // A valid pair still completes afterwards.
        ctl.handle_raw(RawEvent::PointerButton {
            x: 0.0,
            y: 0.0,
            button: Button::Left,
            pressed: true,
        });
        ctl.handle_raw(RawEvent::PointerButton {
            x: 1920.0,
            y: 1080.0,
            button: Button::Left,
            pressed: true,
        });
        assert_eq!(ctl.mode(), Mode::Idle);
        assert_eq!(ctl.transform().scale_x, 1.0);
    }

    #[test]
    fn test_edits_rejected_while_recording() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());

        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::PointerMove { x: 1.0, y: 1.0 });

        assert!(matches!(ctl.set_delay(0, 0.5), Err(Error::LogBusy)));
        assert!(matches!(ctl.remove_action(0), Err(Error::LogBusy)));
        assert!(matches!(ctl.swap_actions(0, 0), Err(Error::LogBusy)));
        assert!(matches!(ctl.clear_actions(), Err(Error::LogBusy)));

        ctl.toggle_recording().unwrap();
        ctl.set_delay(0, 0.5).unwrap();
        assert_eq!(ctl.actions()[0].delay(), 0.5);
    }

    #[test]
    fn test_negative_retime_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::PointerMove { x: 1.0, y: 1.0 });
        ctl.toggle_recording().unwrap();

        assert!(matches!(
            ctl.set_delay(0, -1.0),
            Err(Error::InvalidDelay(_))
        ));
    }

    #[test]
    fn test_replay_on_empty_log_keeps_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        assert!(matches!(ctl.toggle_replay(), Err(Error::EmptyLog)));
        assert_eq!(ctl.mode(), Mode::Idle);
    }

    #[test]
    fn test_recording_and_replay_mutually_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());

        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::PointerMove { x: 1.0, y: 1.0 });
        assert!(matches!(ctl.toggle_replay(), Err(Error::LogBusy)));
        ctl.toggle_recording().unwrap();

        // And the other direction: a looping replay blocks recording.
        ctl.set_delay(0, 5.0).unwrap();
        ctl.toggle_replay().unwrap();
        assert!(matches!(ctl.toggle_recording(), Err(Error::LogBusy)));
        ctl.toggle_replay().unwrap();
        assert_eq!(ctl.mode(), Mode::Idle);
    }

    #[test]
    fn test_macro_roundtrip_through_controller() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        let path = dir.path().join("macro.json");

        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::PointerMove { x: 7.0, y: 9.0 });
        ctl.handle_raw(RawEvent::Key {
            key: Key::Enter,
            pressed: true,
        });
        ctl.toggle_recording().unwrap();
        let recorded = ctl.actions();

        ctl.save_macro(&path).unwrap();
        ctl.clear_actions().unwrap();
        assert_eq!(ctl.action_count(), 0);

        assert_eq!(ctl.load_macro(&path).unwrap(), 2);
        assert_eq!(ctl.actions(), recorded);
    }

    #[test]
    fn test_save_empty_macro_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctl = controller_in(dir.path());
        assert!(matches!(
            ctl.save_macro(dir.path().join("macro.json")),
            Err(Error::EmptyLog)
        ));
    }

    #[test]
    fn test_malformed_macro_leaves_log_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        let path = dir.path().join("macro.json");
        std::fs::write(&path, "{").unwrap();

        ctl.toggle_recording().unwrap();
        ctl.handle_raw(RawEvent::PointerMove { x: 1.0, y: 2.0 });
        ctl.toggle_recording().unwrap();

        assert!(matches!(
            ctl.load_macro(&path),
            Err(Error::MalformedLog(_))
        ));
        assert_eq!(ctl.action_count(), 1);
    }

    #[test]
    fn test_exit_hotkey_terminates_pump() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctl = controller_in(dir.path());
        let (tap, rx) = crate::hook::raw_channel(16);

        let worker = std::thread::spawn(move || {
            ctl.run(rx);
            ctl
        });

        use crate::hook::EventTap;
        tap.deliver(RawEvent::PointerMove { x: 1.0, y: 1.0 });
        tap.deliver(RawEvent::Key {
            key: Key::ArrowDown,
            pressed: true,
        });

        let ctl = worker.join().unwrap();
        assert!(ctl.session().exit_requested());
        assert_eq!(ctl.mode(), Mode::Idle);
    }

    #[test]
    fn test_status_sink_receives_mode_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, rx) = status_channel(64);
        let store = CalibrationStore::new(dir.path().join("calibration.json"));
        let mut ctl = CaptureController::new(Arc::new(NullInjector), &FixedScreen, store)
            .with_status_sink(Arc::new(sink));

        ctl.toggle_recording().unwrap();
        ctl.toggle_recording().unwrap();

        let updates: Vec<Status> = rx.try_iter().collect();
        assert!(updates.contains(&Status::Mode(Mode::Recording)));
        assert!(updates.contains(&Status::Mode(Mode::Idle)));
        assert!(
            updates
                .iter()
                .any(|s| matches!(s, Status::Message(m) if m.contains("recording started")))
        );
    }
}
