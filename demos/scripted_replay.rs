//! Replay a scripted macro through a printing injector.
//!
//! Run with: cargo run --example scripted_replay
//!
//! No OS hooks involved: the injector just prints what a platform layer
//! would emit, with a calibration transform that halves x and strips a
//! 100px offset.

use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use remio::{Action, ActionLog, Button, Injector, Key, Replayer, SessionState, Transform};

struct Console;

impl Injector for Console {
    fn pointer_move(&self, x: f64, y: f64) -> remio::Result<()> {
        println!("  pointer -> ({x:.0}, {y:.0})");
        Ok(())
    }

    fn button(&self, button: Button, pressed: bool) -> remio::Result<()> {
        let phase = if pressed { "press" } else { "release" };
        println!("  {button} {phase}");
        Ok(())
    }

    fn key(&self, key: Key, pressed: bool) -> remio::Result<()> {
        let phase = if pressed { "press" } else { "release" };
        println!("  key {phase}: {}", key.canonical_name());
        Ok(())
    }
}

fn main() -> remio::Result<()> {
    let log = ActionLog::from(vec![
        Action::move_to(300, 200, 0.0),
        Action::click(300, 200, Button::Left, true, 0.25),
        Action::click(300, 200, Button::Left, false, 0.1),
        Action::key("h", true, 0.2),
        Action::key("h", false, 0.05),
        Action::key("enter", true, 0.3),
        Action::key("enter", false, 0.05),
    ]);

    let transform = Transform {
        scale_x: 2.0,
        scale_y: 2.0,
        offset_x: 100.0,
        offset_y: 0.0,
        screen_width: 1920,
        screen_height: 1080,
    };

    let replayer = Replayer::new(
        Arc::new(SessionState::new()),
        Arc::new(Mutex::new(log)),
        Arc::new(Mutex::new(transform)),
        Arc::new(Console),
    );
    replayer.set_looping(false);

    println!("Replaying 7 actions (raw (300, 200) should map to (100, 100)):");
    replayer.start()?;
    while replayer.is_replaying() {
        sleep(Duration::from_millis(10));
    }
    replayer.stop()?;
    println!("Pass complete.");

    Ok(())
}
