//! Tracked keys, their symbolic names and virtual-key codes.
//!
//! Every key the engine tracks is a variant of [`Key`]. The discriminant is the
//! Windows virtual-key code, the variant name is the symbolic name written to
//! recording logs. Mouse buttons are keys too (`LButton`, `RButton`, ...), so a
//! button press flows through the same key table and matchers as a keystroke.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! define_keys {
    ($($variant:ident = $code:literal),+ $(,)?) => {
        /// A tracked key or mouse button.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[repr(u8)]
        pub enum Key {
            $($variant = $code),+
        }

        impl Key {
            /// Every tracked key, in virtual-key order.
            pub const ALL: &'static [Key] = &[$(Key::$variant),+];

            /// Symbolic name used in recording logs.
            pub fn name(self) -> &'static str {
                match self {
                    $(Key::$variant => stringify!($variant)),+
                }
            }

            /// Look up a key by its virtual-key code.
            pub fn from_virtual_key(code: u16) -> Option<Key> {
                match code {
                    $($code => Some(Key::$variant),)+
                    _ => None,
                }
            }

            fn from_exact_name(name: &str) -> Option<Key> {
                match name {
                    $(stringify!($variant) => Some(Key::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

define_keys! {
    LButton = 0x01,
    RButton = 0x02,
    Cancel = 0x03,
    MButton = 0x04,
    XButton1 = 0x05,
    XButton2 = 0x06,
    Back = 0x08,
    Tab = 0x09,
    LineFeed = 0x0A,
    Clear = 0x0C,
    Enter = 0x0D,
    ShiftKey = 0x10,
    ControlKey = 0x11,
    Menu = 0x12,
    Pause = 0x13,
    CapsLock = 0x14,
    KanaMode = 0x15,
    JunjaMode = 0x17,
    FinalMode = 0x18,
    KanjiMode = 0x19,
    Escape = 0x1B,
    IMEConvert = 0x1C,
    IMENonconvert = 0x1D,
    IMEAccept = 0x1E,
    IMEModeChange = 0x1F,
    Space = 0x20,
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    Home = 0x24,
    Left = 0x25,
    Up = 0x26,
    Right = 0x27,
    Down = 0x28,
    Select = 0x29,
    Print = 0x2A,
    Execute = 0x2B,
    PrintScreen = 0x2C,
    Insert = 0x2D,
    Delete = 0x2E,
    Help = 0x2F,
    D0 = 0x30,
    D1 = 0x31,
    D2 = 0x32,
    D3 = 0x33,
    D4 = 0x34,
    D5 = 0x35,
    D6 = 0x36,
    D7 = 0x37,
    D8 = 0x38,
    D9 = 0x39,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4A,
    K = 0x4B,
    L = 0x4C,
    M = 0x4D,
    N = 0x4E,
    O = 0x4F,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5A,
    LWin = 0x5B,
    RWin = 0x5C,
    Apps = 0x5D,
    Sleep = 0x5F,
    NumPad0 = 0x60,
    NumPad1 = 0x61,
    NumPad2 = 0x62,
    NumPad3 = 0x63,
    NumPad4 = 0x64,
    NumPad5 = 0x65,
    NumPad6 = 0x66,
    NumPad7 = 0x67,
    NumPad8 = 0x68,
    NumPad9 = 0x69,
    Multiply = 0x6A,
    Add = 0x6B,
    Separator = 0x6C,
    Subtract = 0x6D,
    Decimal = 0x6E,
    Divide = 0x6F,
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
    F13 = 0x7C,
    F14 = 0x7D,
    F15 = 0x7E,
    F16 = 0x7F,
    F17 = 0x80,
    F18 = 0x81,
    F19 = 0x82,
    F20 = 0x83,
    F21 = 0x84,
    F22 = 0x85,
    F23 = 0x86,
    F24 = 0x87,
    NumLock = 0x90,
    Scroll = 0x91,
    LShiftKey = 0xA0,
    RShiftKey = 0xA1,
    LControlKey = 0xA2,
    RControlKey = 0xA3,
    LMenu = 0xA4,
    RMenu = 0xA5,
    BrowserBack = 0xA6,
    BrowserForward = 0xA7,
    BrowserRefresh = 0xA8,
    BrowserStop = 0xA9,
    BrowserSearch = 0xAA,
    BrowserFavorites = 0xAB,
    BrowserHome = 0xAC,
    VolumeMute = 0xAD,
    VolumeDown = 0xAE,
    VolumeUp = 0xAF,
    MediaNextTrack = 0xB0,
    MediaPreviousTrack = 0xB1,
    MediaStop = 0xB2,
    MediaPlayPause = 0xB3,
    LaunchMail = 0xB4,
    SelectMedia = 0xB5,
    LaunchApplication1 = 0xB6,
    LaunchApplication2 = 0xB7,
    OemSemicolon = 0xBA,
    Oemplus = 0xBB,
    Oemcomma = 0xBC,
    OemMinus = 0xBD,
    OemPeriod = 0xBE,
    OemQuestion = 0xBF,
    Oemtilde = 0xC0,
    OemOpenBrackets = 0xDB,
    OemPipe = 0xDC,
    OemCloseBrackets = 0xDD,
    OemQuotes = 0xDE,
    Oem8 = 0xDF,
    OemBackslash = 0xE2,
    ProcessKey = 0xE5,
    Packet = 0xE7,
    Attn = 0xF6,
    Crsel = 0xF7,
    Exsel = 0xF8,
    EraseEof = 0xF9,
    Play = 0xFA,
    Zoom = 0xFB,
    NoName = 0xFC,
    Pa1 = 0xFD,
    OemClear = 0xFE,
}

/// Mouse buttons, in the order the hook reports them.
const MOUSE_BUTTONS: [Key; 5] = [
    Key::LButton,
    Key::RButton,
    Key::MButton,
    Key::XButton1,
    Key::XButton2,
];

impl Key {
    /// The Windows virtual-key code of this key.
    pub fn virtual_key(self) -> u16 {
        self as u8 as u16
    }

    pub fn is_mouse_button(self) -> bool {
        MOUSE_BUTTONS.contains(&self)
    }

    /// The unified modifier a left/right variant contributes to.
    ///
    /// `LShiftKey` and `RShiftKey` both map to `ShiftKey`; non-variant keys
    /// return `None`.
    pub fn unified(self) -> Option<Key> {
        match self {
            Key::LShiftKey | Key::RShiftKey => Some(Key::ShiftKey),
            Key::LControlKey | Key::RControlKey => Some(Key::ControlKey),
            Key::LMenu | Key::RMenu => Some(Key::Menu),
            _ => None,
        }
    }

    /// The (left, right) variants of a unified modifier.
    pub fn variants(self) -> Option<(Key, Key)> {
        match self {
            Key::ShiftKey => Some((Key::LShiftKey, Key::RShiftKey)),
            Key::ControlKey => Some((Key::LControlKey, Key::RControlKey)),
            Key::Menu => Some((Key::LMenu, Key::RMenu)),
            _ => None,
        }
    }

    /// X-button index (1 or 2) carried in the high word of mouse data.
    pub fn from_x_button(index: u16) -> Option<Key> {
        match index {
            1 => Some(Key::XButton1),
            2 => Some(Key::XButton2),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key: {0}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    /// Exact symbolic names first, then a case-insensitive match, then a
    /// few common spellings (`Ctrl`, `Alt`, `Return`, single digits).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(key) = Key::from_exact_name(s) {
            return Ok(key);
        }
        if let Some(key) = Key::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
        {
            return Ok(key);
        }

        let alias = match s.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Key::ControlKey),
            "lctrl" => Some(Key::LControlKey),
            "rctrl" => Some(Key::RControlKey),
            "shift" => Some(Key::ShiftKey),
            "lshift" => Some(Key::LShiftKey),
            "rshift" => Some(Key::RShiftKey),
            "alt" => Some(Key::Menu),
            "lalt" => Some(Key::LMenu),
            "ralt" => Some(Key::RMenu),
            "return" => Some(Key::Enter),
            "backspace" => Some(Key::Back),
            "esc" => Some(Key::Escape),
            "win" | "meta" => Some(Key::LWin),
            digit if digit.len() == 1 && digit.as_bytes()[0].is_ascii_digit() => {
                Key::from_virtual_key(u16::from(digit.as_bytes()[0]))
            }
            _ => None,
        };

        alias.ok_or_else(|| ParseKeyError(s.to_string()))
    }
}
