//! Screen calibration: the affine transform and the two-point capture flow.
//!
//! Recordings always store raw capture-space coordinates. The transform maps
//! them onto the display being controlled at replay time:
//!
//! ```text
//! target = (raw - offset) / scale
//! ```
//!
//! A transform is derived from two user clicks bounding the target display:
//! the top-left corner and the bottom-right corner. The clicked span is
//! assumed proportional to the reference resolution captured at detection
//! time, which models a uniform affine map from logical screen coordinates
//! to the physical coordinates where the clicks landed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The screen calibration transform, persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal scale, always positive once derived from calibration.
    pub scale_x: f64,
    /// Vertical scale, always positive once derived from calibration.
    pub scale_y: f64,
    /// Horizontal offset: the top-left reference point.
    pub offset_x: f64,
    /// Vertical offset: the top-left reference point.
    pub offset_y: f64,
    /// Reference display width in pixels.
    pub screen_width: u32,
    /// Reference display height in pixels.
    pub screen_height: u32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity(1920, 1080)
    }
}

impl Transform {
    /// Identity transform (scale 1, offset 0) at the given resolution.
    pub fn identity(screen_width: u32, screen_height: u32) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            screen_width,
            screen_height,
        }
    }

    /// Derive a transform from the two calibration reference points.
    ///
    /// Rejects coincident or inverted points with
    /// [`Error::CalibrationDegenerate`]: a zero or negative span would
    /// produce a non-positive scale and invalidate every mapped position.
    pub fn from_corners(
        top_left: (f64, f64),
        bottom_right: (f64, f64),
        screen_width: u32,
        screen_height: u32,
    ) -> Result<Self> {
        let (tl_x, tl_y) = top_left;
        let (br_x, br_y) = bottom_right;
        if br_x <= tl_x || br_y <= tl_y || screen_width == 0 || screen_height == 0 {
            return Err(Error::CalibrationDegenerate {
                tl_x,
                tl_y,
                br_x,
                br_y,
            });
        }
        Ok(Self {
            scale_x: (br_x - tl_x) / screen_width as f64,
            scale_y: (br_y - tl_y) / screen_height as f64,
            offset_x: tl_x,
            offset_y: tl_y,
            screen_width,
            screen_height,
        })
    }

    /// Map a raw recorded coordinate onto the target display.
    pub fn map(&self, raw_x: f64, raw_y: f64) -> (f64, f64) {
        (
            (raw_x - self.offset_x) / self.scale_x,
            (raw_y - self.offset_y) / self.scale_y,
        )
    }

    /// Inverse of [`map`](Self::map): target coordinates back to raw.
    pub fn unmap(&self, target_x: f64, target_y: f64) -> (f64, f64) {
        (
            target_x * self.scale_x + self.offset_x,
            target_y * self.scale_y + self.offset_y,
        )
    }
}

/// Outcome of feeding one reference point to the [`Calibrator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// Top-left corner stored; the bottom-right corner is still needed.
    AwaitingBottomRight,
    /// Both corners received; calibration is complete.
    Complete(Transform),
}

/// The two-point capture buffer behind a calibration run.
///
/// The mode transition into and out of `Calibrating` belongs to the capture
/// controller; this type only accumulates the reference points and computes
/// the transform once both have arrived.
#[derive(Debug, Default)]
pub struct Calibrator {
    top_left: Option<(f64, f64)>,
}

impl Calibrator {
    /// Create an empty calibrator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any buffered point, restarting the two-point capture.
    pub fn reset(&mut self) {
        self.top_left = None;
    }

    /// Feed one qualifying pointer press.
    ///
    /// The first point is stored as the top-left reference. The second
    /// completes the calibration against the given reference resolution. A
    /// degenerate pair discards the buffer so the caller can re-prompt for
    /// both corners.
    pub fn submit(
        &mut self,
        x: f64,
        y: f64,
        screen_width: u32,
        screen_height: u32,
    ) -> Result<CalibrationStep> {
        match self.top_left.take() {
            None => {
                self.top_left = Some((x, y));
                Ok(CalibrationStep::AwaitingBottomRight)
            }
            Some(top_left) => {
                let transform =
                    Transform::from_corners(top_left, (x, y), screen_width, screen_height)?;
                Ok(CalibrationStep::Complete(transform))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_derivation() {
        let t = Transform::from_corners((100.0, 50.0), (2020.0, 1130.0), 1920, 1080).unwrap();
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
        assert_eq!(t.offset_x, 100.0);
        assert_eq!(t.offset_y, 50.0);
    }

    #[test]
    fn test_scales_always_positive() {
        for (br_x, br_y) in [(500.0, 700.0), (1.5, 0.5), (10_000.0, 10_000.0)] {
            let t = Transform::from_corners((0.0, 0.0), (br_x, br_y), 1920, 1080).unwrap();
            assert!(t.scale_x > 0.0);
            assert!(t.scale_y > 0.0);
        }
    }

    #[test]
    fn test_degenerate_pairs_rejected() {
        // Coincident.
        assert!(matches!(
            Transform::from_corners((10.0, 10.0), (10.0, 10.0), 1920, 1080),
            Err(Error::CalibrationDegenerate { .. })
        ));
        // Inverted horizontally.
        assert!(matches!(
            Transform::from_corners((500.0, 0.0), (100.0, 900.0), 1920, 1080),
            Err(Error::CalibrationDegenerate { .. })
        ));
        // Inverted vertically.
        assert!(matches!(
            Transform::from_corners((0.0, 900.0), (500.0, 100.0), 1920, 1080),
            Err(Error::CalibrationDegenerate { .. })
        ));
    }

    #[test]
    fn test_map_roundtrip() {
        let t = Transform::from_corners((37.0, 21.0), (1500.0, 860.0), 1920, 1080).unwrap();
        for (x, y) in [(0.0, 0.0), (300.5, 712.25), (-40.0, 9999.0)] {
            let (tx, ty) = t.map(x, y);
            let (rx, ry) = t.unmap(tx, ty);
            assert!((rx - x).abs() < 1e-9);
            assert!((ry - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mapping_example() {
        let t = Transform {
            scale_x: 2.0,
            scale_y: 1.0,
            offset_x: 100.0,
            offset_y: 0.0,
            screen_width: 1920,
            screen_height: 1080,
        };
        let (x, _) = t.map(300.0, 0.0);
        assert_eq!(x, 100.0);
    }

    #[test]
    fn test_calibrator_two_point_flow() {
        let mut cal = Calibrator::new();
        assert_eq!(
            cal.submit(10.0, 20.0, 1920, 1080).unwrap(),
            CalibrationStep::AwaitingBottomRight
        );
        match cal.submit(1930.0, 1100.0, 1920, 1080).unwrap() {
            CalibrationStep::Complete(t) => {
                assert_eq!(t.offset_x, 10.0);
                assert_eq!(t.offset_y, 20.0);
            }
            step => panic!("unexpected step: {step:?}"),
        }
    }

    #[test]
    fn test_calibrator_rearms_after_degenerate_pair() {
        let mut cal = Calibrator::new();
        cal.submit(500.0, 500.0, 1920, 1080).unwrap();
        assert!(cal.submit(100.0, 100.0, 1920, 1080).is_err());
        // Buffer was discarded: the next point is a fresh top-left again.
        assert_eq!(
            cal.submit(0.0, 0.0, 1920, 1080).unwrap(),
            CalibrationStep::AwaitingBottomRight
        );
    }
}
