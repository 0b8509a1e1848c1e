//! Error types for replica-core.

use std::path::PathBuf;
use thiserror::Error;

/// A trigger could not be registered. The registry is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("already listening to {0}")]
    Duplicate(String),
    #[error("no keys specified for {0}")]
    EmptyCombination(String),
    #[error("{kind} cannot be registered as a {expected} trigger ({name})")]
    WrongKind {
        name: String,
        kind: crate::EventKind,
        expected: &'static str,
    },
}

/// A record/playback request that conflicts with a running session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionConflict {
    #[error("Already recording to {}", .0.display())]
    AlreadyRecording(PathBuf),
    #[error("Not found {}", .0.display())]
    NotFound(PathBuf),
    #[error("Now recording to {}", .0.display())]
    NowRecording(PathBuf),
    #[error("Already playing {}", .0.display())]
    AlreadyPlaying(PathBuf),
}

/// A recording or playback session could not be started.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Conflict(#[from] SessionConflict),
    #[error("failed to start session for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A recording log line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid elapsed time {0:?}")]
    InvalidElapsed(String),
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
    #[error("unexpected trailing field {0:?}")]
    TrailingField(String),
}

/// Why a playback session ended early.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Failed to parse line {line}.\n{}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: LineError,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned by a trigger callback. It is logged and dropped by the
/// callback pool.
pub type CallbackResult = Result<(), String>;
