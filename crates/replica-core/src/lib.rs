//! replica-core: device state, trigger matching and record/replay.
//!
//! Design goal: keep this crate platform-agnostic. Capturing raw input,
//! injecting synthetic input and probing key state live in
//! `replica-platform` behind the [`KeyProbe`] and [`Injector`] seams.

mod config;
mod dispatcher;
mod error;
mod imitator;
mod inject;
mod journal;
mod key;
mod notify;
mod player;
mod pool;
mod raw;
mod recorder;
mod registry;
mod state;
mod trigger;

pub use config::{DispatcherConfig, PlayerConfig};
pub use dispatcher::Dispatcher;
pub use error::{
    CallbackResult, LineError, PlaybackError, RegistrationError, SessionConflict, SessionError,
};
pub use imitator::Imitator;
pub use inject::{InputBatch, Injector, NoopInjector, Simulator, SyntheticInput};
pub use journal::{EntryTarget, LogEntry};
pub use key::{Key, ParseKeyError};
pub use notify::{Notifier, TracingNotifier};
pub use player::{PlaybackHandle, PlaybackOutcome, SessionPlayer};
pub use pool::CallbackPool;
pub use raw::{
    decode_pointer, HookAction, KeyMessage, PointerChange, PointerMessage, PointerPayload,
    WHEEL_DELTA,
};
pub use recorder::SessionRecorder;
pub use registry::TriggerRegistry;
pub use state::{
    Device, DeviceState, EventKind, KeyProbe, KeyTable, ParseEventKindError, Point, PointerState,
    ReleasedProbe, Target,
};
pub use trigger::{is_within, join_segments, Callback, Namespace, Trigger, TriggerEvent};
