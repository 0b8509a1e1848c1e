//! replica-platform: platform-specific I/O boundary for replica.
//!
//! This crate provides:
//! - A global input hook via `rdev` that feeds a [`replica_core::Dispatcher`]
//! - Input injection via `enigo`, implementing [`replica_core::Injector`]
//! - A pressed-state probe implementing [`replica_core::KeyProbe`]
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `keymap` - rdev / enigo key translation
//! - `input_hook` - Global hook thread
//! - `injector` - Input injection
//! - `probe` - Pressed-state probe

mod error;
mod injector;
mod input_hook;
mod keymap;
mod probe;

pub use error::{PlatformError, PlatformResult};
pub use injector::EnigoInjector;
pub use input_hook::{start_input_hook, translate, InputHookHandle, RawNotification};
pub use keymap::{from_rdev_button, from_rdev_key, to_enigo_button, to_enigo_key};
pub use probe::SystemKeyProbe;
