//! The seam between the engine and the synthetic-input collaborator.

use crate::error::Result;
use crate::event::Button;
use crate::keycode::Key;

/// Emits synthetic input events on behalf of the replay scheduler.
///
/// An implementation typically wraps a platform simulation layer. Failures
/// are reported per call; the scheduler logs and skips a failed event
/// without aborting the pass.
pub trait Injector: Send + Sync {
    /// Move the pointer to an absolute position, in target-display pixels.
    fn pointer_move(&self, x: f64, y: f64) -> Result<()>;

    /// Press or release a pointer button at the pointer's current position.
    fn button(&self, button: Button, pressed: bool) -> Result<()>;

    /// Press or release a key.
    fn key(&self, key: Key, pressed: bool) -> Result<()>;
}

/// Reports display geometry for calibration defaults.
pub trait ScreenProbe {
    /// Width and height of the primary display in pixels.
    fn primary_resolution(&self) -> Result<(u32, u32)>;
}
