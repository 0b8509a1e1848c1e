//! Pressed-state probe used to seed the dispatcher's key table.

use replica_core::{Key, KeyProbe};

/// Asks the OS whether a key is held right now.
///
/// Only Windows exposes an asynchronous key-state query; elsewhere every key
/// reads as released and the table fills in as notifications arrive.
pub struct SystemKeyProbe;

#[cfg(target_os = "windows")]
impl KeyProbe for SystemKeyProbe {
    fn is_pressed(&self, key: Key) -> bool {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

        // SAFETY: GetAsyncKeyState takes a plain virtual-key code and has no
        // memory-safety preconditions.
        let state = unsafe { GetAsyncKeyState(i32::from(key.virtual_key())) };
        (state as u16) & 0x8000 != 0
    }
}

#[cfg(not(target_os = "windows"))]
impl KeyProbe for SystemKeyProbe {
    fn is_pressed(&self, _key: Key) -> bool {
        false
    }
}
