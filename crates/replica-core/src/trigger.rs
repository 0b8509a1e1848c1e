//! Triggers and the per-trigger matcher state machine.

use crate::{CallbackResult, DeviceState, EventKind, Key};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Namespace of a trigger name. Internal record/playback bindings live in
/// `system`, everything registered by callers in `user`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    System,
    User,
}

impl Namespace {
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::System => "system",
            Namespace::User => "user",
        }
    }

    /// Fully qualified name, e.g. `user:macro.start`.
    pub fn qualify(self, name: &str) -> String {
        format!("{}:{}", self.prefix(), name)
    }
}

impl From<bool> for Namespace {
    /// `true` selects the system namespace.
    fn from(is_system: bool) -> Self {
        if is_system {
            Namespace::System
        } else {
            Namespace::User
        }
    }
}

/// Join name segments with `.`, hashing any segment that itself contains a
/// `.` so dots stay hierarchy delimiters.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| {
            let segment = segment.as_ref();
            if segment.contains('.') {
                hex::encode(Sha256::digest(segment.as_bytes()))
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// True when `name` is `root` or a dotted descendant of it.
pub fn is_within(name: &str, root: &str) -> bool {
    name == root
        || name
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// What a callback receives when its trigger fires.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    /// Fully qualified trigger name.
    pub name: Arc<str>,
    /// The kind the trigger was registered for.
    pub kind: EventKind,
    /// State of the notification that fired the trigger.
    pub state: Arc<DeviceState>,
}

pub type Callback = Arc<dyn Fn(&TriggerEvent) -> CallbackResult + Send + Sync>;

/// One registered trigger: a combination, a kind, a callback, and the latch
/// for the edge-triggered kinds.
pub struct Trigger {
    name: Arc<str>,
    keys: Vec<Key>,
    kind: EventKind,
    armed: bool,
    callback: Callback,
}

impl Trigger {
    pub fn new(name: impl Into<Arc<str>>, keys: Vec<Key>, kind: EventKind, callback: Callback) -> Self {
        Self {
            name: name.into(),
            keys,
            // Presses fire on the first full hold; releases need to see the
            // combination held first.
            armed: kind == EventKind::KeyPress,
            kind,
            callback,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Evaluate one transition. Returns true when the trigger fires.
    ///
    /// `_previous` is part of the matcher contract but no current kind needs
    /// it: the key table of `current` already reflects the transition.
    pub fn evaluate(&mut self, current: &DeviceState, _previous: &DeviceState) -> bool {
        if self.kind.is_pointer() {
            return current.kind == Some(self.kind);
        }

        let held = self.keys.iter().filter(|k| current.is_pressed(**k)).count();
        let all_held = held == self.keys.len();
        let none_held = held == 0;

        match self.kind {
            // Level-sensitive: every notification while the combination is
            // held fires again.
            EventKind::KeyDown => all_held,
            EventKind::KeyPress => {
                if all_held {
                    std::mem::replace(&mut self.armed, false)
                } else {
                    if none_held {
                        self.armed = true;
                    }
                    false
                }
            }
            EventKind::KeyUp => {
                if all_held {
                    self.armed = true;
                    false
                } else if none_held {
                    std::mem::replace(&mut self.armed, false)
                } else {
                    false
                }
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("name", &self.name)
            .field("keys", &self.keys)
            .field("kind", &self.kind)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
