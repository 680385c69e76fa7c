//! The seam between the OS input-hook collaborator and the engine.
//!
//! The hook subsystem itself lives outside this crate: some platform layer
//! owns the low-level listener and calls into an [`EventTap`] from its own
//! callback thread. Taps must never block for more than microseconds per
//! callback, so the provided channel tap publishes into a bounded queue with
//! `try_send` and drops events when the consumer falls behind rather than
//! stalling input delivery.

use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::event::Button;
use crate::keycode::Key;

/// A raw input event as delivered by the hook layer.
///
/// Coordinates are physical pixels on the device where the event occurred;
/// no calibration has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// The pointer moved.
    PointerMove {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
    /// A pointer button was pressed or released.
    PointerButton {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Which button.
        button: Button,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// A key was pressed or released.
    Key {
        /// Which key.
        key: Key,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
}

/// Receiver side of a hook callback.
///
/// Implemented for closures, so a platform layer can hand its events over
/// with `tap.deliver(event)` from whatever thread its hook runs on.
pub trait EventTap: Send + Sync {
    /// Called once per raw input event.
    fn deliver(&self, event: RawEvent);
}

impl<F> EventTap for F
where
    F: Fn(RawEvent) + Send + Sync,
{
    fn deliver(&self, event: RawEvent) {
        self(event)
    }
}

/// An [`EventTap`] that forwards into a bounded channel without blocking.
pub struct ChannelTap {
    sender: SyncSender<RawEvent>,
}

impl EventTap for ChannelTap {
    fn deliver(&self, event: RawEvent) {
        // Don't block the hook thread if the consumer is slow; dropping a
        // move event is preferable to stalling input delivery.
        let _ = self.sender.try_send(event);
    }
}

/// Create a bounded raw-event channel.
///
/// The returned tap goes to the hook collaborator; the receiver goes to the
/// capture controller's pump loop.
///
/// # Example
///
/// ```
/// use remio::hook::{EventTap, RawEvent, raw_channel};
///
/// let (tap, rx) = raw_channel(256);
/// tap.deliver(RawEvent::PointerMove { x: 10.0, y: 20.0 });
/// assert!(matches!(rx.recv().unwrap(), RawEvent::PointerMove { .. }));
/// ```
pub fn raw_channel(capacity: usize) -> (ChannelTap, Receiver<RawEvent>) {
    let (sender, receiver) = mpsc::sync_channel(capacity);
    (ChannelTap { sender }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_tap_delivers_in_order() {
        let (tap, rx) = raw_channel(8);
        tap.deliver(RawEvent::PointerMove { x: 1.0, y: 1.0 });
        tap.deliver(RawEvent::Key {
            key: Key::Enter,
            pressed: true,
        });

        assert_eq!(rx.recv().unwrap(), RawEvent::PointerMove { x: 1.0, y: 1.0 });
        assert_eq!(
            rx.recv().unwrap(),
            RawEvent::Key {
                key: Key::Enter,
                pressed: true,
            }
        );
    }

    #[test]
    fn test_full_channel_drops_instead_of_blocking() {
        let (tap, rx) = raw_channel(1);
        tap.deliver(RawEvent::PointerMove { x: 1.0, y: 1.0 });
        // Queue is full; this must return immediately.
        tap.deliver(RawEvent::PointerMove { x: 2.0, y: 2.0 });

        assert_eq!(rx.recv().unwrap(), RawEvent::PointerMove { x: 1.0, y: 1.0 });
        assert!(rx.try_recv().is_err());
    }
}
