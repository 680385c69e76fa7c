//! # remio
//!
//! A pure Rust input macro engine: timed capture, screen calibration, and
//! faithful replay.
//!
//! ## Features
//!
//! - Records pointer and keyboard events with their wall-clock gaps and
//!   replays them with the original timing
//! - Two-point screen calibration maps recordings onto displays with a
//!   different resolution or offset (single linear scale+offset transform)
//! - Cancellable replay: stop and exit are observed within one event's delay
//! - Portable macro files with string key/button identities
//! - Clean seams: the OS hook, the synthetic-event injector, and the screen
//!   probe are traits, so the engine runs against any platform layer (or a
//!   test double)
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use remio::{CalibrationStore, CaptureController, Injector, ScreenProbe, raw_channel};
//!
//! # struct Platform;
//! # impl Injector for Platform {
//! #     fn pointer_move(&self, _x: f64, _y: f64) -> remio::Result<()> { Ok(()) }
//! #     fn button(&self, _b: remio::Button, _p: bool) -> remio::Result<()> { Ok(()) }
//! #     fn key(&self, _k: remio::Key, _p: bool) -> remio::Result<()> { Ok(()) }
//! # }
//! # impl ScreenProbe for Platform {
//! #     fn primary_resolution(&self) -> remio::Result<(u32, u32)> { Ok((1920, 1080)) }
//! # }
//! // A platform layer implements Injector + ScreenProbe and feeds raw
//! // events into the tap from its hook thread.
//! let (tap, rx) = raw_channel(256);
//! let mut controller = CaptureController::new(
//!     Arc::new(Platform),
//!     &Platform,
//!     CalibrationStore::at_default_location(),
//! );
//!
//! // The hook collaborator calls `tap.deliver(event)`; the controller pumps
//! // until the exit hotkey fires.
//! controller.run(rx);
//! ```
//!
//! ## Hotkeys
//!
//! Four reserved keys form the built-in command surface and are intercepted
//! in every mode (they are control signals, never recordable content):
//! arrow-left toggles recording, arrow-right toggles replay, arrow-up starts
//! a calibration, arrow-down requests exit. See
//! [`Hotkeys`](controller::Hotkeys) to rebind them.
//!
//! ## Architecture
//!
//! The hook listener publishes into a bounded channel and the
//! [`CaptureController`] is its single consumer, so an OS callback thread
//! never mutates the action log directly. Replay runs on its own worker
//! (see [`Replayer`]) and shares the session mode through compare-and-set
//! transitions (see [`state`]), keeping recording, replaying, and
//! calibrating mutually exclusive.

pub mod calibration;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod hook;
pub mod inject;
pub mod keycode;
pub mod recording;
pub mod replay;
pub mod state;

// Re-exports
pub use calibration::{CalibrationStep, Calibrator, Transform};
pub use channel::{ChannelSink, Status, StatusSink, status_channel};
#[cfg(feature = "tokio")]
pub use channel::{AsyncChannelSink, status_async_channel};
pub use config::{CONFIG_FILE, CalibrationStore};
pub use controller::{CaptureController, Hotkeys};
pub use error::{Error, Result};
pub use event::{Action, Button};
pub use hook::{ChannelTap, EventTap, RawEvent, raw_channel};
pub use inject::{Injector, ScreenProbe};
pub use keycode::Key;
pub use recording::{ActionLog, MacroFile};
pub use replay::Replayer;
pub use state::{Mode, SessionState};
