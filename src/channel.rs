//! Status delivery to the command surface.
//!
//! The command surface (a GUI, CLI, or test harness) subscribes to log lines
//! and mode changes instead of polling the engine. Sinks are called from the
//! controller and replay threads, so channel-backed implementations publish
//! with `try_send` and drop updates rather than block engine progress.
//!
//! # Example (sync)
//!
//! ```
//! use remio::channel::{Status, status_channel};
//!
//! let (sink, rx) = status_channel(64);
//! // hand `sink` to the controller, then:
//! # use remio::channel::StatusSink;
//! # sink.publish(Status::Message("recording started".into()));
//! while let Ok(status) = rx.try_recv() {
//!     println!("{status:?}");
//! }
//! ```

use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::state::Mode;

/// One update for the command surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// The engine switched modes.
    Mode(Mode),
    /// A human-readable log line.
    Message(String),
}

/// Receives engine status updates.
///
/// Implemented for closures.
pub trait StatusSink: Send + Sync {
    /// Called for every status update.
    fn publish(&self, status: Status);
}

impl<F> StatusSink for F
where
    F: Fn(Status) + Send + Sync,
{
    fn publish(&self, status: Status) {
        self(status)
    }
}

/// A [`StatusSink`] backed by a bounded sync channel.
pub struct ChannelSink {
    sender: SyncSender<Status>,
}

impl StatusSink for ChannelSink {
    fn publish(&self, status: Status) {
        // A slow or detached subscriber must not stall the engine.
        let _ = self.sender.try_send(status);
    }
}

/// Create a bounded status channel: a sink for the engine and a receiver
/// for the command surface.
pub fn status_channel(capacity: usize) -> (ChannelSink, Receiver<Status>) {
    let (sender, receiver) = mpsc::sync_channel(capacity);
    (ChannelSink { sender }, receiver)
}

// ============================================================================
// Tokio async support (behind feature flag)
// ============================================================================

#[cfg(feature = "tokio")]
pub use tokio_channel::*;

#[cfg(feature = "tokio")]
mod tokio_channel {
    use super::*;
    use tokio::sync::mpsc as tokio_mpsc;

    /// A [`StatusSink`] backed by a bounded tokio channel.
    pub struct AsyncChannelSink {
        sender: tokio_mpsc::Sender<Status>,
    }

    impl StatusSink for AsyncChannelSink {
        fn publish(&self, status: Status) {
            let _ = self.sender.try_send(status);
        }
    }

    /// Create a bounded async status channel.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use remio::channel::status_async_channel;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let (sink, mut rx) = status_async_channel(64);
    ///     // hand `sink` to the controller, then:
    ///     while let Some(status) = rx.recv().await {
    ///         println!("{status:?}");
    ///     }
    /// }
    /// ```
    pub fn status_async_channel(
        capacity: usize,
    ) -> (AsyncChannelSink, tokio_mpsc::Receiver<Status>) {
        let (sender, receiver) = tokio_mpsc::channel(capacity);
        (AsyncChannelSink { sender }, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_delivery() {
        let (sink, rx) = status_channel(4);
        sink.publish(Status::Mode(Mode::Recording));
        sink.publish(Status::Message("3 actions recorded".into()));

        assert_eq!(rx.recv().unwrap(), Status::Mode(Mode::Recording));
        assert_eq!(
            rx.recv().unwrap(),
            Status::Message("3 actions recorded".into())
        );
    }

    #[test]
    fn test_full_channel_never_blocks() {
        let (sink, rx) = status_channel(1);
        sink.publish(Status::Mode(Mode::Idle));
        sink.publish(Status::Mode(Mode::Recording));
        assert_eq!(rx.recv().unwrap(), Status::Mode(Mode::Idle));
        assert!(rx.try_recv().is_err());
    }

    #[cfg(feature = "tokio")]
    #[tokio::test]
    async fn test_async_channel_delivery() {
        let (sink, mut rx) = status_async_channel(4);
        sink.publish(Status::Message("hello".into()));
        assert_eq!(rx.recv().await.unwrap(), Status::Message("hello".into()));
    }
}
