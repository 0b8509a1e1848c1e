//! Registry of named triggers.

use crate::trigger::{is_within, Callback, Namespace, Trigger, TriggerEvent};
use crate::{DeviceState, EventKind, Key, RegistrationError};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A fired trigger, ready to be handed to the callback pool.
pub(crate) struct Fired {
    pub callback: Callback,
    pub event: TriggerEvent,
}

/// Owns every registered trigger, keyed by fully qualified name.
#[derive(Default)]
pub struct TriggerRegistry {
    triggers: Mutex<BTreeMap<String, Trigger>>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Trigger>> {
        self.triggers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a key combination trigger. Returns the qualified name.
    pub fn register_key(
        &self,
        name: &str,
        keys: &[Key],
        kind: EventKind,
        callback: Callback,
        namespace: Namespace,
    ) -> Result<String, RegistrationError> {
        let qualified = namespace.qualify(name);
        if !kind.is_key() {
            return Err(RegistrationError::WrongKind {
                name: qualified,
                kind,
                expected: "key",
            });
        }
        if keys.is_empty() {
            return Err(RegistrationError::EmptyCombination(qualified));
        }
        self.insert(Trigger::new(qualified.clone(), keys.to_vec(), kind, callback))?;
        Ok(qualified)
    }

    /// Register a pointer trigger (move, wheel or tilt). Returns the
    /// qualified name.
    pub fn register_pointer(
        &self,
        name: &str,
        kind: EventKind,
        callback: Callback,
        namespace: Namespace,
    ) -> Result<String, RegistrationError> {
        let qualified = namespace.qualify(name);
        if !kind.is_pointer() {
            return Err(RegistrationError::WrongKind {
                name: qualified,
                kind,
                expected: "pointer",
            });
        }
        self.insert(Trigger::new(qualified.clone(), Vec::new(), kind, callback))?;
        Ok(qualified)
    }

    fn insert(&self, trigger: Trigger) -> Result<(), RegistrationError> {
        let mut triggers = self.lock();
        let name = trigger.name().to_string();
        if triggers.contains_key(&name) {
            return Err(RegistrationError::Duplicate(name));
        }
        debug!(name = %name, kind = %trigger.kind(), keys = ?trigger.keys(), "trigger registered");
        triggers.insert(name, trigger);
        Ok(())
    }

    /// Remove `name` and every trigger below it in the dotted hierarchy.
    /// Returns how many triggers were removed.
    pub fn unregister(&self, name: &str, namespace: Namespace) -> usize {
        let root = namespace.qualify(name);
        let mut triggers = self.lock();
        let before = triggers.len();
        triggers.retain(|n, _| !is_within(n, &root));
        let removed = before - triggers.len();
        if removed > 0 {
            debug!(root = %root, removed, "triggers unregistered");
        }
        removed
    }

    pub fn contains(&self, name: &str, namespace: Namespace) -> bool {
        self.lock().contains_key(&namespace.qualify(name))
    }

    /// Qualified names of every registered trigger, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run every matcher against one transition and collect the fired ones.
    pub(crate) fn evaluate(&self, current: &Arc<DeviceState>, previous: &DeviceState) -> Vec<Fired> {
        let mut triggers = self.lock();
        triggers
            .values_mut()
            .filter_map(|trigger| {
                trigger.evaluate(current, previous).then(|| Fired {
                    callback: trigger.callback().clone(),
                    event: TriggerEvent {
                        name: trigger.name().clone(),
                        kind: trigger.kind(),
                        state: current.clone(),
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Callback {
        Arc::new(|_| Ok(()))
    }

    #[test]
    fn duplicate_names_are_rejected_per_namespace() {
        let registry = TriggerRegistry::new();
        registry
            .register_key("macro", &[Key::A], EventKind::KeyPress, noop(), Namespace::User)
            .unwrap();
        let err = registry
            .register_key("macro", &[Key::B], EventKind::KeyDown, noop(), Namespace::User)
            .unwrap_err();
        assert_eq!(err, RegistrationError::Duplicate("user:macro".into()));

        // Same caller name in the system namespace is a different trigger.
        registry
            .register_key("macro", &[Key::B], EventKind::KeyDown, noop(), Namespace::System)
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn empty_combination_is_rejected() {
        let registry = TriggerRegistry::new();
        let err = registry
            .register_key("empty", &[], EventKind::KeyDown, noop(), Namespace::User)
            .unwrap_err();
        assert_eq!(err, RegistrationError::EmptyCombination("user:empty".into()));
        assert!(registry.is_empty());
    }

    #[test]
    fn kinds_must_match_registration_type() {
        let registry = TriggerRegistry::new();
        assert!(registry
            .register_key("k", &[Key::A], EventKind::MouseMove, noop(), Namespace::User)
            .is_err());
        assert!(registry
            .register_pointer("p", EventKind::KeyPress, noop(), Namespace::User)
            .is_err());
        assert!(registry
            .register_pointer("p", EventKind::MouseTilt, noop(), Namespace::User)
            .is_ok());
    }

    #[test]
    fn unregister_removes_descendants() {
        let registry = TriggerRegistry::new();
        for name in ["macro", "macro.start", "macro.stop", "macros", "other.macro"] {
            registry
                .register_key(name, &[Key::A], EventKind::KeyPress, noop(), Namespace::User)
                .unwrap();
        }
        registry
            .register_key("macro", &[Key::A], EventKind::KeyPress, noop(), Namespace::System)
            .unwrap();

        assert_eq!(registry.unregister("macro", Namespace::User), 3);
        assert_eq!(
            registry.names(),
            vec!["system:macro", "user:macros", "user:other.macro"]
        );
        assert_eq!(registry.unregister("macro", Namespace::User), 0);
    }
}
