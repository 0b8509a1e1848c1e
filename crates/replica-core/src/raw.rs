//! Raw hook notifications and their decoding.
//!
//! The low-level hook hands the dispatcher a hook code, a message kind and a
//! payload. Message values follow the Win32 `WM_*` numbering so a native hook
//! can pass its values straight through; other hook adapters build them with
//! the helper constructors.

use crate::{Key, Point};

/// Notional wheel delta of one notch.
pub const WHEEL_DELTA: i32 = 120;

/// Keyboard hook message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMessage {
    KeyDown,
    KeyUp,
    SysKeyDown,
    SysKeyUp,
}

impl KeyMessage {
    pub fn from_raw(message: u32) -> Option<Self> {
        match message {
            0x0100 => Some(KeyMessage::KeyDown),
            0x0101 => Some(KeyMessage::KeyUp),
            0x0104 => Some(KeyMessage::SysKeyDown),
            0x0105 => Some(KeyMessage::SysKeyUp),
            _ => None,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, KeyMessage::KeyDown | KeyMessage::SysKeyDown)
    }
}

/// Mouse hook message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerMessage {
    Move,
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    MiddleDown,
    MiddleUp,
    Wheel,
    XDown,
    XUp,
    Tilt,
}

impl PointerMessage {
    pub fn from_raw(message: u32) -> Option<Self> {
        match message {
            0x0200 => Some(PointerMessage::Move),
            0x0201 => Some(PointerMessage::LeftDown),
            0x0202 => Some(PointerMessage::LeftUp),
            0x0204 => Some(PointerMessage::RightDown),
            0x0205 => Some(PointerMessage::RightUp),
            0x0207 => Some(PointerMessage::MiddleDown),
            0x0208 => Some(PointerMessage::MiddleUp),
            0x020A => Some(PointerMessage::Wheel),
            0x020B => Some(PointerMessage::XDown),
            0x020C => Some(PointerMessage::XUp),
            0x020E => Some(PointerMessage::Tilt),
            _ => None,
        }
    }
}

/// Mouse hook payload: cursor position and message-specific data.
///
/// For wheel and tilt the high word of `data` is the signed delta; for
/// X-button messages it is the button index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerPayload {
    pub x: i32,
    pub y: i32,
    pub data: u32,
}

impl PointerPayload {
    pub fn at(x: i32, y: i32) -> Self {
        Self { x, y, data: 0 }
    }

    /// Payload for a wheel or tilt message carrying `delta`.
    pub fn scroll(delta: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            data: (delta as u32) << 16,
        }
    }

    /// Payload for an X-button message.
    pub fn x_button(index: u16) -> Self {
        Self {
            x: 0,
            y: 0,
            data: u32::from(index) << 16,
        }
    }

    pub fn scroll_delta(&self) -> i32 {
        (self.data as i32) >> 16
    }

    pub fn high_word(&self) -> u16 {
        (self.data >> 16) as u16
    }
}

/// What a pointer notification means for the device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerChange {
    Move(Point),
    Wheel(i32),
    Tilt(i32),
    Button { key: Key, pressed: bool },
}

/// Decode a pointer notification. X-button messages with an unknown index
/// decode to `None`.
pub fn decode_pointer(message: PointerMessage, payload: PointerPayload) -> Option<PointerChange> {
    let button = |key: Key, pressed: bool| Some(PointerChange::Button { key, pressed });
    match message {
        PointerMessage::Move => Some(PointerChange::Move(Point::new(payload.x, payload.y))),
        PointerMessage::Wheel => Some(PointerChange::Wheel(payload.scroll_delta())),
        PointerMessage::Tilt => Some(PointerChange::Tilt(payload.scroll_delta())),
        PointerMessage::LeftDown => button(Key::LButton, true),
        PointerMessage::LeftUp => button(Key::LButton, false),
        PointerMessage::RightDown => button(Key::RButton, true),
        PointerMessage::RightUp => button(Key::RButton, false),
        PointerMessage::MiddleDown => button(Key::MButton, true),
        PointerMessage::MiddleUp => button(Key::MButton, false),
        PointerMessage::XDown => Key::from_x_button(payload.high_word())
            .map(|key| PointerChange::Button { key, pressed: true }),
        PointerMessage::XUp => Key::from_x_button(payload.high_word())
            .map(|key| PointerChange::Button { key, pressed: false }),
    }
}

/// What the hook adapter should do with the notification after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Forward the notification to the next hook / the OS.
    PassThrough,
}
