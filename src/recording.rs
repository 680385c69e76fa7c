//! The action log and portable macro files.
//!
//! An [`ActionLog`] is the ordered sequence a recording pass appends to and
//! a replay pass walks: insertion order is temporal order is replay order.
//! Between passes the log may be edited (retime, delete, reorder); the
//! capture controller rejects edits with `LogBusy` while a recording or
//! replay pass owns the log, so the type itself stays plain data.
//!
//! A [`MacroFile`] is the persisted form: a JSON document with the actions
//! in their portable array shape, a creation timestamp, and a count.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::Action;

/// An ordered, append-only-during-recording sequence of actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action at the end.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Drop all actions.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the log has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The action at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// Replace the action at `index`.
    pub fn set(&mut self, index: usize, action: Action) -> Result<()> {
        let slot = self
            .actions
            .get_mut(index)
            .ok_or(Error::InvalidIndex(index))?;
        *slot = action;
        Ok(())
    }

    /// Remove and return the action at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Action> {
        if index >= self.actions.len() {
            return Err(Error::InvalidIndex(index));
        }
        Ok(self.actions.remove(index))
    }

    /// Replace the inter-action delay of the action at `index`.
    pub fn retime(&mut self, index: usize, secs: f64) -> Result<()> {
        if secs < 0.0 {
            return Err(Error::InvalidDelay(secs));
        }
        let action = self
            .actions
            .get_mut(index)
            .ok_or(Error::InvalidIndex(index))?;
        action.set_delay(secs);
        Ok(())
    }

    /// Swap the actions at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.actions.len();
        if a >= len {
            return Err(Error::InvalidIndex(a));
        }
        if b >= len {
            return Err(Error::InvalidIndex(b));
        }
        self.actions.swap(a, b);
        Ok(())
    }

    /// All actions, in replay order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Iterate the actions in replay order.
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    /// Sum of all inter-action delays, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.actions.iter().map(Action::delay).sum()
    }
}

impl From<Vec<Action>> for ActionLog {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl<'a> IntoIterator for &'a ActionLog {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The portable persisted form of an action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroFile {
    /// The recorded actions, in replay order.
    pub actions: Vec<Action>,
    /// Human-readable local timestamp of when the macro was saved.
    pub created: String,
    /// Number of actions at save time.
    pub action_count: usize,
}

impl MacroFile {
    /// Snapshot a log for saving, stamped with the current local time.
    pub fn from_log(log: &ActionLog) -> Self {
        Self {
            actions: log.actions().to_vec(),
            created: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            action_count: log.len(),
        }
    }

    /// Turn the loaded document back into an action log.
    pub fn into_log(self) -> ActionLog {
        ActionLog::from(self.actions)
    }

    /// Write the macro as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a macro file.
    ///
    /// Any missing field, unknown action tag, or otherwise unparseable
    /// document is rejected with [`Error::MalformedLog`]; the caller's state
    /// is untouched.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let file: MacroFile = serde_json::from_str(&json)
            .map_err(|e| Error::MalformedLog(format!("{}: {e}", path.display())))?;
        if file.action_count != file.actions.len() {
            log::warn!(
                "{}: action_count says {} but file holds {} actions",
                path.display(),
                file.action_count,
                file.actions.len()
            );
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Button;

    fn sample_log() -> ActionLog {
        ActionLog::from(vec![
            Action::move_to(10, 10, 0.0),
            Action::click(10, 10, Button::Left, true, 0.05),
            Action::click(10, 10, Button::Left, false, 0.02),
            Action::key("enter", true, 0.5),
            Action::key("enter", false, 0.1),
        ])
    }

    #[test]
    fn test_edit_operations() {
        let mut log = sample_log();

        log.set(0, Action::move_to(20, 20, 0.25)).unwrap();
        assert_eq!(log.get(0), Some(&Action::move_to(20, 20, 0.25)));

        log.swap(0, 1).unwrap();
        assert_eq!(
            log.get(0),
            Some(&Action::click(10, 10, Button::Left, true, 0.05))
        );

        let removed = log.remove(0).unwrap();
        assert_eq!(removed, Action::click(10, 10, Button::Left, true, 0.05));
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_retime() {
        let mut log = sample_log();
        log.retime(3, 1.25).unwrap();
        assert_eq!(log.get(3).unwrap().delay(), 1.25);

        assert!(matches!(
            log.retime(3, -0.1),
            Err(Error::InvalidDelay(_))
        ));
        assert!(matches!(log.retime(99, 0.5), Err(Error::InvalidIndex(99))));
    }

    #[test]
    fn test_out_of_range_edits_rejected() {
        let mut log = sample_log();
        assert!(matches!(
            log.set(99, Action::move_to(0, 0, 0.0)),
            Err(Error::InvalidIndex(99))
        ));
        assert!(matches!(log.remove(99), Err(Error::InvalidIndex(99))));
        assert!(matches!(log.swap(0, 99), Err(Error::InvalidIndex(99))));
        assert_eq!(log, sample_log());
    }

    #[test]
    fn test_total_duration() {
        let log = sample_log();
        assert!((log.total_duration() - 0.67).abs() < 1e-9);
    }

    #[test]
    fn test_macro_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");

        let log = sample_log();
        MacroFile::from_log(&log).save(&path).unwrap();

        let loaded = MacroFile::load(&path).unwrap();
        assert_eq!(loaded.action_count, log.len());
        // Order, fields, and delays preserved exactly.
        assert_eq!(loaded.into_log(), log);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");

        fs::write(&path, r#"{"actions": [["move", 1, 2, 0.0]]}"#).unwrap();
        assert!(matches!(
            MacroFile::load(&path),
            Err(Error::MalformedLog(_))
        ));
    }

    #[test]
    fn test_malformed_action_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");

        fs::write(
            &path,
            r#"{"actions": [["warp", 1, 2, 0.0]], "created": "2024-01-01 00:00:00", "action_count": 1}"#,
        )
        .unwrap();
        assert!(matches!(
            MacroFile::load(&path),
            Err(Error::MalformedLog(_))
        ));
    }
}
