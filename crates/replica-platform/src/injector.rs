//! Input injection using the `enigo` crate.

use crate::keymap::{to_enigo_button, to_enigo_key};
use crate::{PlatformError, PlatformResult};
use enigo::{Axis, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use replica_core::{Injector, Key, Point, SyntheticInput, WHEEL_DELTA};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Real input injector backed by `enigo`.
pub struct EnigoInjector {
    enigo: Mutex<Enigo>,
}

impl EnigoInjector {
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    /// Current pointer position, used as the dispatcher's initial position.
    pub fn cursor_position(&self) -> PlatformResult<Point> {
        let enigo = self.enigo.lock().unwrap_or_else(PoisonError::into_inner);
        let (x, y) = enigo
            .location()
            .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?;
        Ok(Point::new(x, y))
    }

    /// Inject one batch, stopping at the first failure.
    pub fn send(&self, batch: &[SyntheticInput]) -> PlatformResult<()> {
        let mut enigo = self.enigo.lock().unwrap_or_else(PoisonError::into_inner);
        for input in batch {
            debug!(?input, "injecting");
            match input {
                SyntheticInput::KeyDown(key) => press(&mut enigo, *key, Direction::Press)?,
                SyntheticInput::KeyUp(key) => press(&mut enigo, *key, Direction::Release)?,
                SyntheticInput::Text(text) => enigo
                    .text(text)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?,
                SyntheticInput::MoveTo(p) => enigo
                    .move_mouse(p.x, p.y, Coordinate::Abs)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?,
                SyntheticInput::MoveBy(p) => enigo
                    .move_mouse(p.x, p.y, Coordinate::Rel)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?,
                // Windows reports wheel-up as positive; enigo scrolls down
                // for positive lengths.
                SyntheticInput::Wheel(delta) => enigo
                    .scroll(-notches(*delta), Axis::Vertical)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?,
                SyntheticInput::Tilt(delta) => enigo
                    .scroll(notches(*delta), Axis::Horizontal)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?,
            }
        }
        Ok(())
    }
}

impl Injector for EnigoInjector {
    fn inject(&self, batch: &[SyntheticInput]) -> Result<(), String> {
        self.send(batch).map_err(|e| e.to_string())
    }
}

fn press(enigo: &mut Enigo, key: Key, direction: Direction) -> PlatformResult<()> {
    if key.is_mouse_button() {
        let Some(button) = to_enigo_button(key) else {
            warn!(%key, "mouse button not supported by this backend, skipping");
            return Ok(());
        };
        return enigo
            .button(button, direction)
            .map_err(|e| PlatformError::InjectionFailed(e.to_string()));
    }

    match to_enigo_key(key) {
        Some(k) => enigo
            .key(k, direction)
            .map_err(|e| PlatformError::InjectionFailed(e.to_string())),
        None => {
            warn!(error = %PlatformError::InvalidKey(key.to_string()), "key not injectable, skipping");
            Ok(())
        }
    }
}

/// Whole notches for a raw wheel delta; any non-zero delta moves at least one.
fn notches(delta: i32) -> i32 {
    match delta / WHEEL_DELTA {
        0 => delta.signum(),
        n => n,
    }
}
