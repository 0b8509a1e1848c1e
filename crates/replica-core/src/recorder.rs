//! Session recorder: appends one log line per dispatched event to every
//! active recording.

use crate::journal::LogEntry;
use crate::{DeviceState, Key, SessionError, SessionConflict};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

struct ActiveRecording {
    started: Instant,
    excluded: HashSet<Key>,
    file: File,
}

impl ActiveRecording {
    fn excludes(&self, key: Key) -> bool {
        self.excluded.contains(&key)
            || key.unified().is_some_and(|u| self.excluded.contains(&u))
    }
}

/// The set of recordings in progress, keyed by file path.
#[derive(Default)]
pub struct SessionRecorder {
    sessions: Mutex<HashMap<PathBuf, ActiveRecording>>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, ActiveRecording>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start recording to `path`, replacing any existing file.
    ///
    /// Events whose target key is in `excluded` (or whose left/right variant
    /// maps to an excluded unified modifier) are not written.
    pub fn start(
        &self,
        path: impl AsRef<Path>,
        excluded: impl IntoIterator<Item = Key>,
    ) -> Result<(), SessionError> {
        let path = path.as_ref();
        let mut sessions = self.lock();
        if sessions.contains_key(path) {
            return Err(SessionConflict::AlreadyRecording(path.to_path_buf()).into());
        }

        let io_err = |source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "replaced previous recording"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(e)),
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        sessions.insert(
            path.to_path_buf(),
            ActiveRecording {
                started: Instant::now(),
                excluded: excluded.into_iter().collect(),
                file,
            },
        );
        info!(path = %path.display(), "recording started");
        Ok(())
    }

    /// Stop recording to `path`. Returns false if it was not recording.
    pub fn stop(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let stopped = self.lock().remove(path).is_some();
        if stopped {
            info!(path = %path.display(), "recording stopped");
        }
        stopped
    }

    pub fn is_recording(&self, path: impl AsRef<Path>) -> bool {
        self.lock().contains_key(path.as_ref())
    }

    pub fn active_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Append `state` to every active recording.
    ///
    /// A recording whose file can no longer be written is dropped; the others
    /// keep going.
    pub fn on_event(&self, state: &DeviceState) {
        let mut sessions = self.lock();
        if sessions.is_empty() {
            return;
        }

        sessions.retain(|path, session| {
            if state.target_key().is_some_and(|key| session.excludes(key)) {
                return true;
            }
            let elapsed_ms =
                u64::try_from(session.started.elapsed().as_millis()).unwrap_or(u64::MAX);
            let Some(entry) = LogEntry::from_state(elapsed_ms, state) else {
                return true;
            };
            match writeln!(session.file, "{entry}") {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "recording write failed, dropping recorder"
                    );
                    false
                }
            }
        });
    }
}
