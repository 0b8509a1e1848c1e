//! Device state: which keys are held and where the pointer is.
//!
//! A [`DeviceState`] is built once per raw notification from the previous one
//! and never mutated after it is handed to matchers. The key table is carried
//! forward from state to state; only the transition of the current
//! notification is applied to it.

use crate::Key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of a device event, as dispatched and as written to recording logs.
///
/// The pointer kinds double as "pointer move", "scroll wheel" and
/// "scroll tilt".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    KeyPress,
    MouseMove,
    MouseWheel,
    MouseTilt,
}

impl EventKind {
    pub fn is_key(self) -> bool {
        matches!(self, EventKind::KeyDown | EventKind::KeyUp | EventKind::KeyPress)
    }

    pub fn is_pointer(self) -> bool {
        !self.is_key()
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::KeyDown => "KeyDown",
            EventKind::KeyUp => "KeyUp",
            EventKind::KeyPress => "KeyPress",
            EventKind::MouseMove => "MouseMove",
            EventKind::MouseWheel => "MouseWheel",
            EventKind::MouseTilt => "MouseTilt",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct ParseEventKindError(pub String);

impl FromStr for EventKind {
    type Err = ParseEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KeyDown" => Ok(EventKind::KeyDown),
            "KeyUp" => Ok(EventKind::KeyUp),
            "KeyPress" => Ok(EventKind::KeyPress),
            "MouseMove" => Ok(EventKind::MouseMove),
            "MouseWheel" => Ok(EventKind::MouseWheel),
            "MouseTilt" => Ok(EventKind::MouseTilt),
            other => Err(ParseEventKindError(other.to_string())),
        }
    }
}

/// Which device produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Initial state, before any notification.
    Nothing,
    Keyboard,
    Mouse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The key or point a notification changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    None,
    Key(Key),
    Point(Point),
}

/// Answers "is this key physically held right now".
///
/// Used once, to seed the key table of the first state.
pub trait KeyProbe: Send + Sync {
    fn is_pressed(&self, key: Key) -> bool;
}

/// Probe that reports every key as released.
pub struct ReleasedProbe;

impl KeyProbe for ReleasedProbe {
    fn is_pressed(&self, _key: Key) -> bool {
        false
    }
}

/// Held/released flag for every tracked key, indexed by virtual-key code.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyTable {
    pressed: [bool; 256],
}

impl KeyTable {
    /// A table with every key released.
    pub fn released() -> Self {
        Self {
            pressed: [false; 256],
        }
    }

    /// A table seeded from the probe's view of every tracked key.
    pub fn probe(probe: &dyn KeyProbe) -> Self {
        let mut table = Self::released();
        for key in Key::ALL {
            table.pressed[key.virtual_key() as usize] = probe.is_pressed(*key);
        }
        // Probes may disagree with themselves between calls; derive the
        // unified flags from the variants we actually stored.
        for unified in [Key::ShiftKey, Key::ControlKey, Key::Menu] {
            table.derive_unified(unified);
        }
        table
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.virtual_key() as usize]
    }

    /// Apply one key transition and re-derive the unified modifier it
    /// belongs to.
    ///
    /// A transition on a unified modifier itself (`ShiftKey`, ...) is applied
    /// to its left variant.
    pub fn apply(mut self, key: Key, pressed: bool) -> Self {
        let key = match key.variants() {
            Some((left, _)) => left,
            None => key,
        };
        self.pressed[key.virtual_key() as usize] = pressed;
        if let Some(unified) = key.unified() {
            self.derive_unified(unified);
        }
        self
    }

    /// Keys currently held, in virtual-key order.
    pub fn held(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.iter().copied().filter(|k| self.is_pressed(*k))
    }

    fn derive_unified(&mut self, unified: Key) {
        if let Some((left, right)) = unified.variants() {
            self.pressed[unified.virtual_key() as usize] =
                self.is_pressed(left) || self.is_pressed(right);
        }
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::released()
    }
}

impl fmt::Debug for KeyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.held()).finish()
    }
}

/// Pointer position and the last scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    pub position: Point,
    /// Wheel delta in `y`, tilt delta in `x`.
    pub scroll: Point,
}

/// Snapshot of the input devices at one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    pub kind: Option<EventKind>,
    pub device: Device,
    pub target: Target,
    pub keys: KeyTable,
    pub pointer: PointerState,
}

impl DeviceState {
    /// The state before any notification, seeded from the probe.
    pub fn initial(probe: &dyn KeyProbe, position: Point) -> Self {
        Self {
            kind: None,
            device: Device::Nothing,
            target: Target::None,
            keys: KeyTable::probe(probe),
            pointer: PointerState {
                position,
                scroll: Point::default(),
            },
        }
    }

    /// Derive the state for a key (or mouse button) transition.
    pub fn with_key(&self, key: Key, pressed: bool) -> Self {
        let device = if key.is_mouse_button() {
            Device::Mouse
        } else {
            Device::Keyboard
        };
        Self {
            kind: Some(if pressed {
                EventKind::KeyDown
            } else {
                EventKind::KeyUp
            }),
            device,
            target: Target::Key(key),
            keys: self.keys.apply(key, pressed),
            pointer: self.pointer,
        }
    }

    /// Derive the state for a pointer move, wheel or tilt.
    ///
    /// Key kinds are not pointer transitions; passing one keeps the pointer
    /// fields untouched.
    pub fn with_pointer(&self, kind: EventKind, point: Point) -> Self {
        let mut pointer = self.pointer;
        match kind {
            EventKind::MouseMove => pointer.position = point,
            EventKind::MouseWheel | EventKind::MouseTilt => pointer.scroll = point,
            _ => {}
        }
        Self {
            kind: Some(kind),
            device: Device::Mouse,
            target: Target::Point(point),
            keys: self.keys,
            pointer,
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.is_pressed(key)
    }

    /// The key this notification changed, if it was a key transition.
    pub fn target_key(&self) -> Option<Key> {
        match self.target {
            Target::Key(key) => Some(key),
            _ => None,
        }
    }

    /// The point this notification carried, if it was a pointer event.
    pub fn target_point(&self) -> Option<Point> {
        match self.target {
            Target::Point(point) => Some(point),
            _ => None,
        }
    }
}
