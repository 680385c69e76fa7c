//! A full capture/replay session with a scripted hook.
//!
//! Run with: cargo run --example session
//!
//! A background thread plays the role of the OS hook layer, delivering a
//! short recording session into the controller's channel: toggle recording,
//! a few pointer/keyboard events, toggle replay, then the exit hotkey.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use remio::hook::EventTap;
use remio::{
    Action, Button, CalibrationStore, CaptureController, Injector, Key, RawEvent, ScreenProbe,
    Status, raw_channel,
};

struct Console;

impl Injector for Console {
    fn pointer_move(&self, x: f64, y: f64) -> remio::Result<()> {
        println!("  [inject] pointer -> ({x:.0}, {y:.0})");
        Ok(())
    }

    fn button(&self, button: Button, pressed: bool) -> remio::Result<()> {
        let phase = if pressed { "press" } else { "release" };
        println!("  [inject] {button} {phase}");
        Ok(())
    }

    fn key(&self, key: Key, pressed: bool) -> remio::Result<()> {
        let phase = if pressed { "press" } else { "release" };
        println!("  [inject] key {phase}: {}", key.canonical_name());
        Ok(())
    }
}

impl ScreenProbe for Console {
    fn primary_resolution(&self) -> remio::Result<(u32, u32)> {
        Ok((1920, 1080))
    }
}

fn main() {
    let store = CalibrationStore::new(std::env::temp_dir().join("remio-demo-calibration.json"));
    let mut controller = CaptureController::new(Arc::new(Console), &Console, store)
        .with_status_sink(Arc::new(|status: Status| match status {
            Status::Mode(mode) => println!("[mode] {mode}"),
            Status::Message(line) => println!("[status] {line}"),
        }));
    controller.set_replay_looping(false);

    let (tap, rx) = raw_channel(256);
    let pump = thread::spawn(move || {
        controller.run(rx);
        controller
    });

    // Scripted hook: record three actions with real wall-clock gaps.
    tap.deliver(RawEvent::Key {
        key: Key::ArrowLeft,
        pressed: true,
    });
    thread::sleep(Duration::from_millis(50));
    tap.deliver(RawEvent::PointerMove { x: 400.0, y: 300.0 });
    thread::sleep(Duration::from_millis(120));
    tap.deliver(RawEvent::PointerButton {
        x: 400.0,
        y: 300.0,
        button: Button::Left,
        pressed: true,
    });
    thread::sleep(Duration::from_millis(80));
    tap.deliver(RawEvent::PointerButton {
        x: 400.0,
        y: 300.0,
        button: Button::Left,
        pressed: false,
    });
    thread::sleep(Duration::from_millis(50));
    tap.deliver(RawEvent::Key {
        key: Key::ArrowLeft,
        pressed: true,
    });

    // Replay the captured actions once, then exit.
    thread::sleep(Duration::from_millis(100));
    tap.deliver(RawEvent::Key {
        key: Key::ArrowRight,
        pressed: true,
    });
    thread::sleep(Duration::from_millis(600));
    tap.deliver(RawEvent::Key {
        key: Key::ArrowDown,
        pressed: true,
    });

    let controller = pump.join().expect("pump thread panicked");
    println!("\nSession over. Recorded actions:");
    for (i, action) in controller.actions().iter().enumerate() {
        match action {
            Action::Move { delay, .. }
            | Action::Click { delay, .. }
            | Action::Key { delay, .. } => {
                println!("  {i}: {action} (+{delay:.3}s)");
            }
        }
    }
}
