//! The replay scheduler.
//!
//! A replay pass walks the action log in order on its own worker thread:
//! wait out the recorded inter-action delay, map coordinates through the
//! calibration transform, emit the synthetic event through the injection
//! collaborator. Waits go through a condvar with timeout so a stop or exit
//! request interrupts a sleeping pass immediately; worst-case cancellation
//! latency is bounded by one event's delay even if a notification is lost.
//!
//! Failure to replay a single event (unknown key name, injection error) is
//! logged and the event skipped; it never aborts the pass. After a full
//! pass the scheduler loops back to index 0 until stopped, unless looping
//! has been turned off.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::calibration::Transform;
use crate::error::{Error, Result};
use crate::event::Action;
use crate::inject::Injector;
use crate::keycode::Key;
use crate::recording::ActionLog;
use crate::state::{Mode, SessionState};

/// Schedules replay passes over the shared action log.
pub struct Replayer {
    state: Arc<SessionState>,
    log: Arc<Mutex<ActionLog>>,
    transform: Arc<Mutex<Transform>>,
    injector: Arc<dyn Injector>,
    cancel: Arc<(Mutex<bool>, Condvar)>,
    speed: Arc<Mutex<f64>>,
    looping: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Replayer {
    /// Create a scheduler over the session's shared state.
    pub fn new(
        state: Arc<SessionState>,
        log: Arc<Mutex<ActionLog>>,
        transform: Arc<Mutex<Transform>>,
        injector: Arc<dyn Injector>,
    ) -> Self {
        Self {
            state,
            log,
            transform,
            injector,
            cancel: Arc::new((Mutex::new(false), Condvar::new())),
            speed: Arc::new(Mutex::new(1.0)),
            looping: Arc::new(AtomicBool::new(true)),
            worker: Mutex::new(None),
        }
    }

    /// Set the speed multiplier applied to every delay (1.0 = recorded
    /// timing, 2.0 = twice as fast). Rejects non-positive factors.
    pub fn set_speed(&self, speed: f64) -> Result<()> {
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(Error::InvalidSpeed(speed));
        }
        *self.speed.lock().unwrap() = speed;
        Ok(())
    }

    /// Continuous replay (the default): after a full pass, start over at
    /// index 0 until explicitly stopped. With looping off a single pass
    /// returns to idle on its own.
    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::SeqCst);
    }

    /// Check if a replay pass is currently active.
    pub fn is_replaying(&self) -> bool {
        self.state.mode() == Mode::Replaying
    }

    /// Start an asynchronous replay pass.
    ///
    /// Fails with [`Error::EmptyLog`] when there is nothing to replay,
    /// [`Error::ReplayAlready`] when a pass is active, and
    /// [`Error::LogBusy`] while recording or calibrating owns the session.
    /// On success the session is in `Replaying` mode and a worker thread is
    /// walking the log.
    pub fn start(&self) -> Result<()> {
        if self.log.lock().unwrap().is_empty() {
            return Err(Error::EmptyLog);
        }
        if !self.state.transition(Mode::Idle, Mode::Replaying) {
            return match self.state.mode() {
                Mode::Replaying => Err(Error::ReplayAlready),
                _ => Err(Error::LogBusy),
            };
        }

        // Reap a worker from a pass that ended on its own.
        if let Some(handle) = self.worker.lock().unwrap().take() {
            handle
                .join()
                .map_err(|_| Error::ThreadError("failed to join replay thread".into()))?;
        }

        *self.cancel.0.lock().unwrap() = false;

        let state = self.state.clone();
        let log = self.log.clone();
        let transform = self.transform.clone();
        let injector = self.injector.clone();
        let cancel = self.cancel.clone();
        let speed = self.speed.clone();
        let looping = self.looping.clone();

        let handle = std::thread::spawn(move || {
            run_passes(&state, &log, &transform, &*injector, &cancel, &speed, &looping);
            state.transition(Mode::Replaying, Mode::Idle);
        });
        *self.worker.lock().unwrap() = Some(handle);
        Ok(())
    }

    /// Cancel an in-progress or looping pass and wait for the worker to
    /// finish. Idempotent: stopping an idle scheduler is a no-op, and
    /// stopping twice has the same effect as once.
    pub fn stop(&self) -> Result<()> {
        {
            let (lock, cvar) = &*self.cancel;
            *lock.lock().unwrap() = true;
            cvar.notify_all();
        }
        if let Some(handle) = self.worker.lock().unwrap().take() {
            handle
                .join()
                .map_err(|_| Error::ThreadError("failed to join replay thread".into()))?;
        }
        Ok(())
    }
}

/// Walk the log until cancelled, exit-requested, or a non-looping pass ends.
fn run_passes(
    state: &SessionState,
    log: &Mutex<ActionLog>,
    transform: &Mutex<Transform>,
    injector: &dyn Injector,
    cancel: &(Mutex<bool>, Condvar),
    speed: &Mutex<f64>,
    looping: &AtomicBool,
) {
    'passes: loop {
        // The controller rejects log edits while we hold Replaying mode, so
        // a snapshot per pass is coherent and keeps the lock out of the
        // sleep path.
        let actions = log.lock().unwrap().clone();
        let mapping = *transform.lock().unwrap();

        for action in actions.iter() {
            let factor = *speed.lock().unwrap();
            let delay = (action.delay() / factor).max(0.0);
            if wait_cancellable(cancel, Duration::from_secs_f64(delay)) {
                break 'passes;
            }
            if state.exit_requested() {
                break 'passes;
            }
            emit(injector, &mapping, action);
        }

        if state.exit_requested()
            || *cancel.0.lock().unwrap()
            || !looping.load(Ordering::SeqCst)
        {
            break;
        }
    }
}

/// Sleep for `delay`, waking early on cancellation. Returns `true` when the
/// pass has been cancelled.
fn wait_cancellable(cancel: &(Mutex<bool>, Condvar), delay: Duration) -> bool {
    let (lock, cvar) = cancel;
    let guard = lock.lock().unwrap();
    let (guard, _) = cvar
        .wait_timeout_while(guard, delay, |cancelled| !*cancelled)
        .unwrap();
    *guard
}

/// Emit one action through the injector, with calibration applied to any
/// coordinate-bearing event.
fn emit(injector: &dyn Injector, transform: &Transform, action: &Action) {
    let result = match action {
        Action::Move { x, y, .. } => {
            let (tx, ty) = transform.map(*x as f64, *y as f64);
            injector.pointer_move(tx, ty)
        }
        Action::Click {
            x,
            y,
            button,
            pressed,
            ..
        } => {
            let (tx, ty) = transform.map(*x as f64, *y as f64);
            injector
                .pointer_move(tx, ty)
                .and_then(|()| injector.button(*button, *pressed))
        }
        Action::Key { key, pressed, .. } => match Key::from_name(key) {
            Some(resolved) => injector.key(resolved, *pressed),
            None => {
                log::warn!("cannot replay key {key:?}: no such key on this build");
                return;
            }
        },
    };

    if let Err(err) = result {
        log::warn!("skipping action ({action}): {err}");
    }
}
