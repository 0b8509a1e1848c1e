//! Global input hook feeding the dispatcher.
//!
//! `rdev::listen` runs on a dedicated thread and blocks for the life of the
//! process. Every rdev event is translated into the raw key / pointer
//! notification the dispatcher expects and handed over synchronously, so
//! notifications reach the dispatcher in arrival order.

use crate::keymap::{from_rdev_button, from_rdev_key};
use crate::{PlatformError, PlatformResult};
use crossbeam_channel::{bounded, RecvTimeoutError};
use rdev::{listen, Event, EventType};
use replica_core::{
    Dispatcher, Key, KeyMessage, PointerMessage, PointerPayload, WHEEL_DELTA,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, info, trace};

/// How long to wait for `listen` to fail before assuming the hook is live.
const INSTALL_GRACE: Duration = Duration::from_millis(300);

/// One translated hook notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawNotification {
    Key(KeyMessage, u16),
    Pointer(PointerMessage, PointerPayload),
}

/// Handle to the hook thread.
pub struct InputHookHandle {
    paused: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl InputHookHandle {
    /// Stop forwarding notifications. The OS hook itself stays installed
    /// until the process exits.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Check if the hook thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Block until the hook thread exits (normally never).
    pub fn wait(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for InputHookHandle {
    fn drop(&mut self) {
        self.pause();
        // The listener never returns; leave the thread detached.
        let _ = self.thread.take();
    }
}

/// Install the global hook and route every notification into `dispatcher`.
pub fn start_input_hook(dispatcher: Dispatcher) -> PlatformResult<InputHookHandle> {
    let paused = Arc::new(AtomicBool::new(false));
    let (failed_tx, failed_rx) = bounded::<String>(1);

    let hook_paused = paused.clone();
    let thread = thread::Builder::new()
        .name("replica-input-hook".into())
        .spawn(move || {
            info!("input hook thread started (rdev)");
            let callback = move |event: Event| {
                if hook_paused.load(Ordering::Relaxed) {
                    return;
                }
                translate(&event.event_type, |raw| forward(&dispatcher, raw));
            };
            if let Err(e) = listen(callback) {
                error!(error = ?e, "input hook error");
                let _ = failed_tx.send(format!("{e:?}"));
            }
            info!("input hook thread exiting");
        })
        .map_err(|e| PlatformError::HookInstall(e.to_string()))?;

    match failed_rx.recv_timeout(INSTALL_GRACE) {
        Err(RecvTimeoutError::Timeout) => {
            info!("input hook installed");
            Ok(InputHookHandle {
                paused,
                thread: Some(thread),
            })
        }
        Ok(reason) => Err(PlatformError::HookInstall(reason)),
        Err(RecvTimeoutError::Disconnected) => Err(PlatformError::HookInstall(
            "hook thread exited during startup".into(),
        )),
    }
}

fn forward(dispatcher: &Dispatcher, raw: RawNotification) {
    match raw {
        RawNotification::Key(message, virtual_key) => {
            dispatcher.handle_raw_key(0, message, virtual_key);
        }
        RawNotification::Pointer(message, payload) => {
            dispatcher.handle_raw_pointer(0, message, payload);
        }
    }
}

/// Translate one rdev event. A wheel event carrying both axes yields two
/// notifications; untracked keys and buttons yield none.
pub fn translate(event: &EventType, mut emit: impl FnMut(RawNotification)) {
    match *event {
        EventType::KeyPress(key) | EventType::KeyRelease(key) => {
            let Some(mapped) = from_rdev_key(key) else {
                trace!(?key, "untracked rdev key");
                return;
            };
            let message = if matches!(event, EventType::KeyPress(_)) {
                KeyMessage::KeyDown
            } else {
                KeyMessage::KeyUp
            };
            emit(RawNotification::Key(message, mapped.virtual_key()));
        }
        EventType::ButtonPress(button) | EventType::ButtonRelease(button) => {
            let pressed = matches!(event, EventType::ButtonPress(_));
            if let Some(raw) = from_rdev_button(button).and_then(|k| button_message(k, pressed)) {
                emit(raw);
            }
        }
        EventType::MouseMove { x, y } => emit(RawNotification::Pointer(
            PointerMessage::Move,
            PointerPayload::at(x.round() as i32, y.round() as i32),
        )),
        // rdev reports whole notches.
        EventType::Wheel { delta_x, delta_y } => {
            if delta_y != 0 {
                emit(RawNotification::Pointer(
                    PointerMessage::Wheel,
                    PointerPayload::scroll(delta_y as i32 * WHEEL_DELTA),
                ));
            }
            if delta_x != 0 {
                emit(RawNotification::Pointer(
                    PointerMessage::Tilt,
                    PointerPayload::scroll(delta_x as i32 * WHEEL_DELTA),
                ));
            }
        }
    }
}

fn button_message(key: Key, pressed: bool) -> Option<RawNotification> {
    let (message, payload) = match (key, pressed) {
        (Key::LButton, true) => (PointerMessage::LeftDown, PointerPayload::default()),
        (Key::LButton, false) => (PointerMessage::LeftUp, PointerPayload::default()),
        (Key::RButton, true) => (PointerMessage::RightDown, PointerPayload::default()),
        (Key::RButton, false) => (PointerMessage::RightUp, PointerPayload::default()),
        (Key::MButton, true) => (PointerMessage::MiddleDown, PointerPayload::default()),
        (Key::MButton, false) => (PointerMessage::MiddleUp, PointerPayload::default()),
        (Key::XButton1, true) => (PointerMessage::XDown, PointerPayload::x_button(1)),
        (Key::XButton1, false) => (PointerMessage::XUp, PointerPayload::x_button(1)),
        (Key::XButton2, true) => (PointerMessage::XDown, PointerPayload::x_button(2)),
        (Key::XButton2, false) => (PointerMessage::XUp, PointerPayload::x_button(2)),
        _ => return None,
    };
    Some(RawNotification::Pointer(message, payload))
}
