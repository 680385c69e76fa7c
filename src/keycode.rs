//! Virtual key code definitions and canonical key names.
//!
//! Macros store key identity as a canonical string so persisted files stay
//! portable: printable keys by their literal character ("a", "7", "-"),
//! control keys by a lower-case name ("enter", "space", "left"). The two
//! mappings here convert between that string form and the [`Key`] codes the
//! hook and injection collaborators speak.

/// Virtual key codes for keyboard keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Letters
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,

    // Numbers (top row)
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Modifiers
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    MetaLeft, // Windows/Command/Super
    MetaRight,

    // Navigation and editing
    Escape,
    Tab,
    CapsLock,
    Space,
    Enter,
    Backspace,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Lock keys
    NumLock,
    ScrollLock,
    PrintScreen,
    Pause,

    // Punctuation and symbols
    Grave,        // ` ~
    Minus,        // - _
    Equal,        // = +
    BracketLeft,  // [ {
    BracketRight, // ] }
    Backslash,    // \ |
    Semicolon,    // ; :
    Quote,        // ' "
    Comma,        // , <
    Period,       // . >
    Slash,        // / ?

    // Unknown key with raw platform code
    Unknown(u32),
}

impl Key {
    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::ShiftLeft
                | Key::ShiftRight
                | Key::ControlLeft
                | Key::ControlRight
                | Key::AltLeft
                | Key::AltRight
                | Key::MetaLeft
                | Key::MetaRight
        )
    }

    /// The literal character this key types, for printable keys.
    pub fn as_char(&self) -> Option<char> {
        let c = match self {
            Key::KeyA => 'a',
            Key::KeyB => 'b',
            Key::KeyC => 'c',
            Key::KeyD => 'd',
            Key::KeyE => 'e',
            Key::KeyF => 'f',
            Key::KeyG => 'g',
            Key::KeyH => 'h',
            Key::KeyI => 'i',
            Key::KeyJ => 'j',
            Key::KeyK => 'k',
            Key::KeyL => 'l',
            Key::KeyM => 'm',
            Key::KeyN => 'n',
            Key::KeyO => 'o',
            Key::KeyP => 'p',
            Key::KeyQ => 'q',
            Key::KeyR => 'r',
            Key::KeyS => 's',
            Key::KeyT => 't',
            Key::KeyU => 'u',
            Key::KeyV => 'v',
            Key::KeyW => 'w',
            Key::KeyX => 'x',
            Key::KeyY => 'y',
            Key::KeyZ => 'z',
            Key::Num0 => '0',
            Key::Num1 => '1',
            Key::Num2 => '2',
            Key::Num3 => '3',
            Key::Num4 => '4',
            Key::Num5 => '5',
            Key::Num6 => '6',
            Key::Num7 => '7',
            Key::Num8 => '8',
            Key::Num9 => '9',
            Key::Grave => '`',
            Key::Minus => '-',
            Key::Equal => '=',
            Key::BracketLeft => '[',
            Key::BracketRight => ']',
            Key::Backslash => '\\',
            Key::Semicolon => ';',
            Key::Quote => '\'',
            Key::Comma => ',',
            Key::Period => '.',
            Key::Slash => '/',
            _ => return None,
        };
        Some(c)
    }

    /// The key for a literal character, if one exists.
    pub fn from_char(c: char) -> Option<Key> {
        let key = match c.to_ascii_lowercase() {
            'a' => Key::KeyA,
            'b' => Key::KeyB,
            'c' => Key::KeyC,
            'd' => Key::KeyD,
            'e' => Key::KeyE,
            'f' => Key::KeyF,
            'g' => Key::KeyG,
            'h' => Key::KeyH,
            'i' => Key::KeyI,
            'j' => Key::KeyJ,
            'k' => Key::KeyK,
            'l' => Key::KeyL,
            'm' => Key::KeyM,
            'n' => Key::KeyN,
            'o' => Key::KeyO,
            'p' => Key::KeyP,
            'q' => Key::KeyQ,
            'r' => Key::KeyR,
            's' => Key::KeyS,
            't' => Key::KeyT,
            'u' => Key::KeyU,
            'v' => Key::KeyV,
            'w' => Key::KeyW,
            'x' => Key::KeyX,
            'y' => Key::KeyY,
            'z' => Key::KeyZ,
            '0' => Key::Num0,
            '1' => Key::Num1,
            '2' => Key::Num2,
            '3' => Key::Num3,
            '4' => Key::Num4,
            '5' => Key::Num5,
            '6' => Key::Num6,
            '7' => Key::Num7,
            '8' => Key::Num8,
            '9' => Key::Num9,
            '`' => Key::Grave,
            '-' => Key::Minus,
            '=' => Key::Equal,
            '[' => Key::BracketLeft,
            ']' => Key::BracketRight,
            '\\' => Key::Backslash,
            ';' => Key::Semicolon,
            '\'' => Key::Quote,
            ',' => Key::Comma,
            '.' => Key::Period,
            '/' => Key::Slash,
            _ => return None,
        };
        Some(key)
    }

    /// The canonical string identity recorded into macros.
    ///
    /// Printable keys render as their literal character, everything else as
    /// a lower-case name. Unrecognized platform codes fall back to a
    /// best-effort `key_<code>` form.
    pub fn canonical_name(&self) -> String {
        if let Some(c) = self.as_char() {
            return c.to_string();
        }
        let name = match self {
            Key::F1 => "f1",
            Key::F2 => "f2",
            Key::F3 => "f3",
            Key::F4 => "f4",
            Key::F5 => "f5",
            Key::F6 => "f6",
            Key::F7 => "f7",
            Key::F8 => "f8",
            Key::F9 => "f9",
            Key::F10 => "f10",
            Key::F11 => "f11",
            Key::F12 => "f12",
            Key::ShiftLeft => "shift",
            Key::ShiftRight => "shift_r",
            Key::ControlLeft => "ctrl",
            Key::ControlRight => "ctrl_r",
            Key::AltLeft => "alt",
            Key::AltRight => "alt_r",
            Key::MetaLeft => "cmd",
            Key::MetaRight => "cmd_r",
            Key::Escape => "esc",
            Key::Tab => "tab",
            Key::CapsLock => "caps_lock",
            Key::Space => "space",
            Key::Enter => "enter",
            Key::Backspace => "backspace",
            Key::Insert => "insert",
            Key::Delete => "delete",
            Key::Home => "home",
            Key::End => "end",
            Key::PageUp => "page_up",
            Key::PageDown => "page_down",
            Key::ArrowUp => "up",
            Key::ArrowDown => "down",
            Key::ArrowLeft => "left",
            Key::ArrowRight => "right",
            Key::NumLock => "num_lock",
            Key::ScrollLock => "scroll_lock",
            Key::PrintScreen => "print_screen",
            Key::Pause => "pause",
            Key::Unknown(code) => return format!("key_{code}"),
            // Printable keys were handled through as_char above.
            _ => unreachable!(),
        };
        name.to_string()
    }

    /// Resolve a canonical name back into a key.
    ///
    /// Single characters resolve literally; multi-character names go through
    /// the name table. Returns `None` for names this build cannot replay.
    pub fn from_name(name: &str) -> Option<Key> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::from_char(c);
        }
        let key = match name {
            "f1" => Key::F1,
            "f2" => Key::F2,
            "f3" => Key::F3,
            "f4" => Key::F4,
            "f5" => Key::F5,
            "f6" => Key::F6,
            "f7" => Key::F7,
            "f8" => Key::F8,
            "f9" => Key::F9,
            "f10" => Key::F10,
            "f11" => Key::F11,
            "f12" => Key::F12,
            "shift" | "shift_l" => Key::ShiftLeft,
            "shift_r" => Key::ShiftRight,
            "ctrl" | "ctrl_l" | "control" => Key::ControlLeft,
            "ctrl_r" => Key::ControlRight,
            "alt" | "alt_l" => Key::AltLeft,
            "alt_r" | "alt_gr" => Key::AltRight,
            "cmd" | "cmd_l" | "super" | "win" | "meta" => Key::MetaLeft,
            "cmd_r" => Key::MetaRight,
            "esc" | "escape" => Key::Escape,
            "tab" => Key::Tab,
            "caps_lock" => Key::CapsLock,
            "space" => Key::Space,
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "insert" => Key::Insert,
            "delete" => Key::Delete,
            "home" => Key::Home,
            "end" => Key::End,
            "page_up" => Key::PageUp,
            "page_down" => Key::PageDown,
            "up" => Key::ArrowUp,
            "down" => Key::ArrowDown,
            "left" => Key::ArrowLeft,
            "right" => Key::ArrowRight,
            "num_lock" => Key::NumLock,
            "scroll_lock" => Key::ScrollLock,
            "print_screen" => Key::PrintScreen,
            "pause" => Key::Pause,
            _ => {
                let code = name.strip_prefix("key_")?.parse().ok()?;
                Key::Unknown(code)
            }
        };
        Some(key)
    }
}
