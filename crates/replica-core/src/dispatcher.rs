//! Event dispatcher: turns raw hook notifications into device states and
//! fans them out to the recorder and to every registered trigger.

use crate::pool::CallbackPool;
use crate::raw::{
    decode_pointer, HookAction, KeyMessage, PointerChange, PointerMessage, PointerPayload,
};
use crate::trigger::{Callback, Namespace, TriggerEvent};
use crate::{
    CallbackResult, DeviceState, DispatcherConfig, EventKind, Key, KeyProbe, Point,
    RegistrationError, SessionRecorder, TriggerRegistry,
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, trace};

struct Inner {
    /// Latest state; the "previous" of the next notification.
    state: Mutex<Arc<DeviceState>>,
    registry: Arc<TriggerRegistry>,
    recorder: Arc<SessionRecorder>,
    pool: CallbackPool,
}

/// Shared handle to one dispatcher. Clones see the same state and registry.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a dispatcher with its own registry and recorder.
    ///
    /// `probe` seeds the key table; `position` is the initial pointer
    /// position.
    pub fn new(config: &DispatcherConfig, probe: &dyn KeyProbe, position: Point) -> Self {
        Self::with_parts(
            config,
            Arc::new(TriggerRegistry::new()),
            Arc::new(SessionRecorder::new()),
            probe,
            position,
        )
    }

    /// Create a dispatcher around an existing registry and recorder.
    pub fn with_parts(
        config: &DispatcherConfig,
        registry: Arc<TriggerRegistry>,
        recorder: Arc<SessionRecorder>,
        probe: &dyn KeyProbe,
        position: Point,
    ) -> Self {
        let initial = DeviceState::initial(probe, position);
        info!(workers = config.workers, held = ?initial.keys, "dispatcher created");
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(Arc::new(initial)),
                registry,
                recorder,
                pool: CallbackPool::new(config.workers),
            }),
        }
    }

    pub fn registry(&self) -> &Arc<TriggerRegistry> {
        &self.inner.registry
    }

    pub fn recorder(&self) -> &Arc<SessionRecorder> {
        &self.inner.recorder
    }

    /// The state of the most recent notification.
    pub fn state(&self) -> Arc<DeviceState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keyboard hook entry point.
    pub fn handle_raw_key(&self, code: i32, message: KeyMessage, virtual_key: u16) -> HookAction {
        if code < 0 {
            return HookAction::PassThrough;
        }
        match Key::from_virtual_key(virtual_key) {
            Some(key) => self.process(|previous| previous.with_key(key, message.is_down())),
            None => trace!(virtual_key, "untracked key ignored"),
        }
        HookAction::PassThrough
    }

    /// Mouse hook entry point.
    pub fn handle_raw_pointer(
        &self,
        code: i32,
        message: PointerMessage,
        payload: PointerPayload,
    ) -> HookAction {
        if code < 0 {
            return HookAction::PassThrough;
        }
        match decode_pointer(message, payload) {
            Some(PointerChange::Move(point)) => {
                self.process(|previous| previous.with_pointer(EventKind::MouseMove, point))
            }
            Some(PointerChange::Wheel(delta)) => self.process(|previous| {
                previous.with_pointer(EventKind::MouseWheel, Point::new(0, delta))
            }),
            Some(PointerChange::Tilt(delta)) => self.process(|previous| {
                previous.with_pointer(EventKind::MouseTilt, Point::new(delta, 0))
            }),
            Some(PointerChange::Button { key, pressed }) => {
                self.process(|previous| previous.with_key(key, pressed))
            }
            None => trace!(?message, ?payload, "undecodable pointer message ignored"),
        }
        HookAction::PassThrough
    }

    /// Derive the next state, record it, evaluate matchers and queue the
    /// callbacks of every fired trigger, all in arrival order.
    fn process(&self, derive: impl FnOnce(&DeviceState) -> DeviceState) {
        let inner = &*self.inner;
        let mut state = inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = Arc::new(derive(&**state));

        inner.recorder.on_event(&current);
        let fired = inner.registry.evaluate(&current, &**state);
        for fired in fired {
            trace!(trigger = %fired.event.name, "trigger fired");
            inner.pool.submit(fired.callback, fired.event);
        }

        *state = current;
    }

    pub fn register_key(
        &self,
        name: &str,
        keys: &[Key],
        kind: EventKind,
        callback: Callback,
        namespace: Namespace,
    ) -> Result<String, RegistrationError> {
        self.inner
            .registry
            .register_key(name, keys, kind, callback, namespace)
    }

    pub fn register_pointer(
        &self,
        name: &str,
        kind: EventKind,
        callback: Callback,
        namespace: Namespace,
    ) -> Result<String, RegistrationError> {
        self.inner
            .registry
            .register_pointer(name, kind, callback, namespace)
    }

    /// Remove `name` and its dotted descendants.
    pub fn unregister(&self, name: &str, namespace: Namespace) -> usize {
        self.inner.registry.unregister(name, namespace)
    }

    /// Run `f` on every notification while `keys` are all held.
    pub fn on_key_down<F>(&self, name: &str, keys: &[Key], f: F) -> Result<String, RegistrationError>
    where
        F: Fn(&TriggerEvent) -> CallbackResult + Send + Sync + 'static,
    {
        self.register_key(name, keys, EventKind::KeyDown, Arc::new(f), Namespace::User)
    }

    /// Run `f` once when `keys`, after being held together, are all released.
    pub fn on_key_up<F>(&self, name: &str, keys: &[Key], f: F) -> Result<String, RegistrationError>
    where
        F: Fn(&TriggerEvent) -> CallbackResult + Send + Sync + 'static,
    {
        self.register_key(name, keys, EventKind::KeyUp, Arc::new(f), Namespace::User)
    }

    /// Run `f` once each time `keys` become held together.
    pub fn on_key_press<F>(&self, name: &str, keys: &[Key], f: F) -> Result<String, RegistrationError>
    where
        F: Fn(&TriggerEvent) -> CallbackResult + Send + Sync + 'static,
    {
        self.register_key(name, keys, EventKind::KeyPress, Arc::new(f), Namespace::User)
    }

    pub fn on_mouse_move<F>(&self, name: &str, f: F) -> Result<String, RegistrationError>
    where
        F: Fn(&TriggerEvent) -> CallbackResult + Send + Sync + 'static,
    {
        self.register_pointer(name, EventKind::MouseMove, Arc::new(f), Namespace::User)
    }

    pub fn on_mouse_wheel<F>(&self, name: &str, f: F) -> Result<String, RegistrationError>
    where
        F: Fn(&TriggerEvent) -> CallbackResult + Send + Sync + 'static,
    {
        self.register_pointer(name, EventKind::MouseWheel, Arc::new(f), Namespace::User)
    }

    pub fn on_mouse_tilt<F>(&self, name: &str, f: F) -> Result<String, RegistrationError>
    where
        F: Fn(&TriggerEvent) -> CallbackResult + Send + Sync + 'static,
    {
        self.register_pointer(name, EventKind::MouseTilt, Arc::new(f), Namespace::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::WHEEL_DELTA;
    use crate::ReleasedProbe;
    use crossbeam_channel::{unbounded, Receiver};
    use std::time::Duration;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&DispatcherConfig::default(), &ReleasedProbe, Point::default())
    }

    fn key(d: &Dispatcher, key: Key, down: bool) {
        let message = if down { KeyMessage::KeyDown } else { KeyMessage::KeyUp };
        d.handle_raw_key(0, message, key.virtual_key());
    }

    fn recv_all(rx: &Receiver<String>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(name) = rx.recv_timeout(Duration::from_millis(200)) {
            out.push(name);
        }
        out.sort();
        out
    }

    #[test]
    fn negative_code_is_not_processed() {
        let d = dispatcher();
        d.handle_raw_key(-1, KeyMessage::KeyDown, Key::A.virtual_key());
        assert!(!d.state().is_pressed(Key::A));
        assert_eq!(d.state().kind, None);
    }

    #[test]
    fn key_notifications_update_state() {
        let d = dispatcher();
        d.handle_raw_key(0, KeyMessage::SysKeyDown, Key::LMenu.virtual_key());
        let s = d.state();
        assert!(s.is_pressed(Key::Menu));
        assert_eq!(s.target_key(), Some(Key::LMenu));
        d.handle_raw_key(0, KeyMessage::SysKeyUp, Key::LMenu.virtual_key());
        assert!(!d.state().is_pressed(Key::Menu));
    }

    #[test]
    fn rare_virtual_keys_reach_the_recorder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rare.log");
        let d = dispatcher();
        d.recorder().start(&path, Vec::<Key>::new()).unwrap();

        for code in [0x03, 0x2F, 0x5F, 0xE7, 0xFE] {
            d.handle_raw_key(0, KeyMessage::KeyDown, code);
            d.handle_raw_key(0, KeyMessage::KeyUp, code);
        }
        key(&d, Key::A, true);
        d.recorder().stop(&path);

        let log = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<&str> = log
            .lines()
            .map(|l| l.split_once(',').unwrap().1)
            .collect();
        assert_eq!(
            entries,
            vec![
                "KeyDown,Cancel",
                "KeyUp,Cancel",
                "KeyDown,Help",
                "KeyUp,Help",
                "KeyDown,Sleep",
                "KeyUp,Sleep",
                "KeyDown,Packet",
                "KeyUp,Packet",
                "KeyDown,OemClear",
                "KeyUp,OemClear",
                "KeyDown,A",
            ]
        );
    }

    #[test]
    fn pointer_notifications_update_state() {
        let d = dispatcher();
        d.handle_raw_pointer(0, PointerMessage::Move, PointerPayload::at(30, 40));
        assert_eq!(d.state().pointer.position, Point::new(30, 40));

        d.handle_raw_pointer(0, PointerMessage::Wheel, PointerPayload::scroll(-WHEEL_DELTA));
        let s = d.state();
        assert_eq!(s.kind, Some(EventKind::MouseWheel));
        assert_eq!(s.pointer.scroll, Point::new(0, -120));
        assert_eq!(s.pointer.position, Point::new(30, 40));

        d.handle_raw_pointer(0, PointerMessage::XDown, PointerPayload::x_button(1));
        assert!(d.state().is_pressed(Key::XButton1));
    }

    #[test]
    fn fired_triggers_run_callbacks() {
        let d = dispatcher();
        let (tx, rx) = unbounded();
        for name in ["press", "down"] {
            let tx = tx.clone();
            let kind = if name == "press" {
                EventKind::KeyPress
            } else {
                EventKind::KeyDown
            };
            d.register_key(
                name,
                &[Key::ControlKey, Key::K],
                kind,
                Arc::new(move |e: &TriggerEvent| {
                    tx.send(e.name.to_string()).map_err(|e| e.to_string())
                }),
                Namespace::User,
            )
            .unwrap();
        }

        key(&d, Key::LControlKey, true);
        key(&d, Key::K, true);
        key(&d, Key::K, true);
        assert_eq!(
            recv_all(&rx),
            vec!["user:down", "user:down", "user:press"]
        );
    }

    #[test]
    fn failing_callback_does_not_affect_dispatch() {
        let d = dispatcher();
        let (tx, rx) = unbounded();
        d.on_key_press("bad", &[Key::A], |_| Err("broken".into())).unwrap();
        d.on_key_press("good", &[Key::A], move |e| {
            tx.send(e.name.to_string()).map_err(|e| e.to_string())
        })
        .unwrap();

        key(&d, Key::A, true);
        key(&d, Key::A, false);
        key(&d, Key::A, true);
        assert_eq!(recv_all(&rx), vec!["user:good", "user:good"]);
    }

    #[test]
    fn callbacks_can_unregister_themselves() {
        let d = dispatcher();
        let (tx, rx) = unbounded();
        let registry = d.registry().clone();
        d.on_key_press("once", &[Key::Z], move |e| {
            registry.unregister("once", Namespace::User);
            tx.send(e.name.to_string()).map_err(|e| e.to_string())
        })
        .unwrap();

        key(&d, Key::Z, true);
        assert_eq!(recv_all(&rx), vec!["user:once"]);
        key(&d, Key::Z, false);
        key(&d, Key::Z, true);
        assert!(recv_all(&rx).is_empty());
    }
}
