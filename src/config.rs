//! Persistence for the calibration transform.
//!
//! The transform lives in a small JSON record at a well-known location and
//! is loaded once at startup. A missing or corrupt record is never fatal:
//! the store auto-detects the primary display, persists an identity
//! transform at that resolution so subsequent runs load deterministically,
//! and as a last resort falls back to hardcoded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use crate::calibration::Transform;
use crate::error::{Error, Result};
use crate::inject::ScreenProbe;

/// File name of the persisted calibration record.
pub const CONFIG_FILE: &str = "calibration.json";

/// Loads and saves the calibration transform.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    /// A store reading and writing the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at the platform's well-known config location
    /// (`<config dir>/remio/calibration.json`), falling back to the current
    /// directory when the platform reports no config dir.
    pub fn at_default_location() -> Self {
        let path = match dirs::config_dir() {
            Some(dir) => dir.join("remio").join(CONFIG_FILE),
            None => PathBuf::from(CONFIG_FILE),
        };
        Self { path }
    }

    /// Where this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted transform.
    ///
    /// A missing file, unparseable record, or persisted non-positive scale
    /// all surface as [`Error::ConfigLoad`]; callers recover through
    /// [`load_or_detect`](Self::load_or_detect).
    pub fn load(&self) -> Result<Transform> {
        let json = fs::read_to_string(&self.path)
            .map_err(|e| Error::ConfigLoad(format!("{}: {e}", self.path.display())))?;
        let transform: Transform = serde_json::from_str(&json)
            .map_err(|e| Error::ConfigLoad(format!("{}: {e}", self.path.display())))?;
        if !(transform.scale_x > 0.0 && transform.scale_y > 0.0) {
            return Err(Error::ConfigLoad(format!(
                "{}: persisted scale is not positive",
                self.path.display()
            )));
        }
        Ok(transform)
    }

    /// Persist the transform, creating parent directories as needed.
    pub fn save(&self, transform: &Transform) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(transform).map_err(std::io::Error::other)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Load the transform, auto-detecting and persisting a default when no
    /// usable record exists. Never fails.
    pub fn load_or_detect(&self, probe: &dyn ScreenProbe) -> Transform {
        match self.load() {
            Ok(transform) => {
                log::debug!(
                    "loaded calibration: scale ({}, {}), offset ({}, {})",
                    transform.scale_x,
                    transform.scale_y,
                    transform.offset_x,
                    transform.offset_y
                );
                transform
            }
            Err(err) => {
                log::warn!("{err}; auto-detecting screen");
                let transform = match probe.primary_resolution() {
                    Ok((width, height)) => {
                        log::debug!("auto-detected screen: {width}x{height}");
                        Transform::identity(width, height)
                    }
                    Err(probe_err) => {
                        log::warn!("screen detection failed ({probe_err}); using 1920x1080");
                        Transform::default()
                    }
                };
                if let Err(save_err) = self.save(&transform) {
                    log::warn!("could not persist calibration: {save_err}");
                }
                transform
            }
        }
    }
}
