//! Recorded action types and their portable wire form.
//!
//! An [`Action`] is one timestamped step of a macro. The `delay` field is the
//! elapsed time in seconds since the previous recorded action (the first
//! action is measured from the moment recording started), and coordinates are
//! always in the raw coordinate space of the device the macro was captured
//! on. The calibration transform is applied at replay time, never here.
//!
//! Actions serialize as ordered arrays with a leading tag string so macro
//! files stay portable across platforms and releases:
//!
//! ```json
//! ["move", 120, 340, 0.016]
//! ["click", 120, 340, "left", true, 0.05]
//! ["keypress", "enter", false, 0.02]
//! ```

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
}

impl Button {
    /// The portable string tag used in macro files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
        }
    }

    /// Parse a portable string tag back into a button.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded input action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pointer moved to `(x, y)`.
    Move {
        /// X coordinate in raw capture space.
        x: i32,
        /// Y coordinate in raw capture space.
        y: i32,
        /// Seconds since the previous action.
        delay: f64,
    },
    /// Mouse button pressed or released at `(x, y)`.
    Click {
        /// X coordinate in raw capture space.
        x: i32,
        /// Y coordinate in raw capture space.
        y: i32,
        /// Which button.
        button: Button,
        /// `true` for press, `false` for release.
        pressed: bool,
        /// Seconds since the previous action.
        delay: f64,
    },
    /// Key pressed or released.
    Key {
        /// Canonical key identity: printable characters literally ("a"),
        /// control keys by name ("enter", "space", "left").
        key: String,
        /// `true` for press, `false` for release.
        pressed: bool,
        /// Seconds since the previous action.
        delay: f64,
    },
}

impl Action {
    /// Create a pointer-move action.
    pub fn move_to(x: i32, y: i32, delay: f64) -> Self {
        Action::Move { x, y, delay }
    }

    /// Create a button press/release action.
    pub fn click(x: i32, y: i32, button: Button, pressed: bool, delay: f64) -> Self {
        Action::Click {
            x,
            y,
            button,
            pressed,
            delay,
        }
    }

    /// Create a key press/release action.
    pub fn key(key: impl Into<String>, pressed: bool, delay: f64) -> Self {
        Action::Key {
            key: key.into(),
            pressed,
            delay,
        }
    }

    /// Seconds to wait before emitting this action.
    pub fn delay(&self) -> f64 {
        match self {
            Action::Move { delay, .. } | Action::Click { delay, .. } | Action::Key { delay, .. } => {
                *delay
            }
        }
    }

    /// Replace the inter-action delay.
    pub fn set_delay(&mut self, secs: f64) {
        match self {
            Action::Move { delay, .. } | Action::Click { delay, .. } | Action::Key { delay, .. } => {
                *delay = secs
            }
        }
    }

    /// Check if this action carries screen coordinates.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Action::Move { .. } | Action::Click { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { x, y, .. } => write!(f, "move to ({x}, {y})"),
            Action::Click {
                x,
                y,
                button,
                pressed,
                ..
            } => {
                let phase = if *pressed { "press" } else { "release" };
                write!(f, "{button} {phase} at ({x}, {y})")
            }
            Action::Key { key, pressed, .. } => {
                let phase = if *pressed { "press" } else { "release" };
                write!(f, "key {phase}: {key}")
            }
        }
    }
}

impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Action::Move { x, y, delay } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("move")?;
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
                seq.serialize_element(delay)?;
                seq.end()
            }
            Action::Click {
                x,
                y,
                button,
                pressed,
                delay,
            } => {
                let mut seq = serializer.serialize_seq(Some(6))?;
                seq.serialize_element("click")?;
                seq.serialize_element(x)?;
                seq.serialize_element(y)?;
                seq.serialize_element(button.as_str())?;
                seq.serialize_element(pressed)?;
                seq.serialize_element(delay)?;
                seq.end()
            }
            Action::Key {
                key,
                pressed,
                delay,
            } => {
                let mut seq = serializer.serialize_seq(Some(4))?;
                seq.serialize_element("keypress")?;
                seq.serialize_element(key)?;
                seq.serialize_element(pressed)?;
                seq.serialize_element(delay)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ActionVisitor;

        impl<'de> Visitor<'de> for ActionVisitor {
            type Value = Action;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an action array starting with a tag string")
            }

            fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Action, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let tag: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                let action = match tag.as_str() {
                    "move" => Action::Move {
                        x: seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("x"))?,
                        y: seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("y"))?,
                        delay: seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("delay"))?,
                    },
                    "click" => {
                        let x = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("x"))?;
                        let y = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("y"))?;
                        let name: String = seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("button"))?;
                        let button = Button::from_name(&name).ok_or_else(|| {
                            de::Error::invalid_value(
                                de::Unexpected::Str(&name),
                                &"\"left\" or \"right\"",
                            )
                        })?;
                        Action::Click {
                            x,
                            y,
                            button,
                            pressed: seq
                                .next_element()?
                                .ok_or_else(|| de::Error::missing_field("pressed"))?,
                            delay: seq
                                .next_element()?
                                .ok_or_else(|| de::Error::missing_field("delay"))?,
                        }
                    }
                    "keypress" => Action::Key {
                        key: seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("key"))?,
                        pressed: seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("pressed"))?,
                        delay: seq
                            .next_element()?
                            .ok_or_else(|| de::Error::missing_field("delay"))?,
                    },
                    other => {
                        return Err(de::Error::unknown_variant(
                            other,
                            &["move", "click", "keypress"],
                        ));
                    }
                };

                if action.delay() < 0.0 {
                    return Err(de::Error::custom("action delay must be non-negative"));
                }
                Ok(action)
            }
        }

        deserializer.deserialize_seq(ActionVisitor)
    }
}
