//! Async status subscription - receive engine updates over a tokio channel.
//!
//! Run with: cargo run --example status_channel --features tokio
//!
//! The engine stays synchronous; only the command surface is async. This is
//! the shape a GUI or web frontend would use.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use remio::hook::EventTap;
use remio::{
    CalibrationStore, CaptureController, Injector, Key, RawEvent, ScreenProbe, Status,
    raw_channel, status_async_channel,
};

struct Quiet;

impl Injector for Quiet {
    fn pointer_move(&self, _x: f64, _y: f64) -> remio::Result<()> {
        Ok(())
    }

    fn button(&self, _button: remio::Button, _pressed: bool) -> remio::Result<()> {
        Ok(())
    }

    fn key(&self, _key: Key, _pressed: bool) -> remio::Result<()> {
        Ok(())
    }
}

impl ScreenProbe for Quiet {
    fn primary_resolution(&self) -> remio::Result<(u32, u32)> {
        Ok((1920, 1080))
    }
}

#[tokio::main]
async fn main() {
    let (sink, mut rx) = status_async_channel(64);

    let store = CalibrationStore::new(std::env::temp_dir().join("remio-demo-calibration.json"));
    let mut controller =
        CaptureController::new(Arc::new(Quiet), &Quiet, store).with_status_sink(Arc::new(sink));

    let (tap, events) = raw_channel(64);
    let pump = thread::spawn(move || controller.run(events));

    // Scripted commands: a short recording, then exit.
    thread::spawn(move || {
        tap.deliver(RawEvent::Key {
            key: Key::ArrowLeft,
            pressed: true,
        });
        thread::sleep(Duration::from_millis(50));
        tap.deliver(RawEvent::PointerMove { x: 10.0, y: 10.0 });
        thread::sleep(Duration::from_millis(50));
        tap.deliver(RawEvent::Key {
            key: Key::ArrowLeft,
            pressed: true,
        });
        thread::sleep(Duration::from_millis(50));
        tap.deliver(RawEvent::Key {
            key: Key::ArrowDown,
            pressed: true,
        });
    });

    while let Some(status) = rx.recv().await {
        match status {
            Status::Mode(mode) => println!("mode -> {mode}"),
            Status::Message(line) => println!("{line}"),
        }
    }

    pump.join().expect("pump thread panicked");
    println!("done");
}
