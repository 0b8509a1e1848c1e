//! Session player: replays a recording log through the injector with the
//! recorded relative timing.

use crate::journal::{EntryTarget, LogEntry};
use crate::{
    EventKind, Injector, Key, Notifier, PlaybackError, PlayerConfig, SessionConflict,
    SessionError, SessionRecorder, SyntheticInput,
};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub(crate) const NOTIFY_TITLE: &str = "replica";

/// How a playback session ended.
#[derive(Debug)]
pub enum PlaybackOutcome {
    /// Reached the end of the log.
    Finished,
    /// Stopped before the end.
    Stopped,
    /// Aborted by an unreadable or malformed log.
    Failed(PlaybackError),
}

/// Cancellation flag of one playback session.
#[derive(Debug, Default)]
struct PlaybackSession {
    stopped: AtomicBool,
}

impl PlaybackSession {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

type PlayingMap = HashMap<PathBuf, Arc<PlaybackSession>>;

struct PlayerInner {
    config: PlayerConfig,
    injector: Arc<dyn Injector>,
    notifier: Arc<dyn Notifier>,
    recorder: Arc<SessionRecorder>,
    playing: Mutex<PlayingMap>,
}

impl PlayerInner {
    fn playing(&self) -> MutexGuard<'_, PlayingMap> {
        self.playing.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a running playback thread.
pub struct PlaybackHandle {
    path: PathBuf,
    thread: JoinHandle<PlaybackOutcome>,
}

impl PlaybackHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the session to end. A panicked replay thread reports
    /// `Stopped`; its held keys were already released by the cleanup guard.
    pub fn join(self) -> PlaybackOutcome {
        self.thread.join().unwrap_or(PlaybackOutcome::Stopped)
    }
}

/// Starts and stops playback sessions, one per log path.
#[derive(Clone)]
pub struct SessionPlayer {
    inner: Arc<PlayerInner>,
}

impl SessionPlayer {
    /// `recorder` is consulted so a path being recorded is never replayed.
    pub fn new(
        config: PlayerConfig,
        injector: Arc<dyn Injector>,
        notifier: Arc<dyn Notifier>,
        recorder: Arc<SessionRecorder>,
    ) -> Self {
        Self {
            inner: Arc::new(PlayerInner {
                config,
                injector,
                notifier,
                recorder,
                playing: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Start replaying `path` on a dedicated thread.
    pub fn start(&self, path: impl AsRef<Path>) -> Result<PlaybackHandle, SessionError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(SessionConflict::NotFound(path).into());
        }
        if self.inner.recorder.is_recording(&path) {
            return Err(SessionConflict::NowRecording(path).into());
        }

        let session = Arc::new(PlaybackSession::default());
        {
            let mut playing = self.inner.playing();
            if playing.contains_key(&path) {
                return Err(SessionConflict::AlreadyPlaying(path).into());
            }
            playing.insert(path.clone(), session.clone());
        }

        self.inner
            .notifier
            .notify(NOTIFY_TITLE, &format!("Started playing {}", path.display()));

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let inner = self.inner.clone();
        let thread_path = path.clone();
        let thread_session = session.clone();
        let spawned = thread::Builder::new()
            .name(format!("replica-play-{file_name}"))
            .spawn(move || run_session(&inner, &thread_path, &thread_session));

        match spawned {
            Ok(thread) => {
                info!(path = %path.display(), "playback started");
                Ok(PlaybackHandle { path, thread })
            }
            Err(source) => {
                self.inner.playing().remove(&path);
                Err(SessionError::Io { path, source })
            }
        }
    }

    /// Ask the session replaying `path` to stop. Returns false if it was not
    /// playing.
    pub fn stop(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.inner.playing().remove(path) {
            Some(session) => {
                session.stopped.store(true, Ordering::SeqCst);
                debug!(path = %path.display(), "playback stop requested");
                true
            }
            None => false,
        }
    }

    pub fn is_playing(&self, path: impl AsRef<Path>) -> bool {
        self.inner.playing().contains_key(path.as_ref())
    }

    pub fn active_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.inner.playing().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Stop every session.
    pub fn stop_all(&self) {
        for (_, session) in self.inner.playing().drain() {
            session.stopped.store(true, Ordering::SeqCst);
        }
    }
}

/// Releases every held key and retires the session on every exit path.
struct Cleanup<'a> {
    inner: &'a PlayerInner,
    path: &'a Path,
    session: &'a Arc<PlaybackSession>,
    held: BTreeSet<Key>,
}

impl Drop for Cleanup<'_> {
    fn drop(&mut self) {
        if !self.held.is_empty() {
            let batch: Vec<_> = self.held.iter().map(|k| SyntheticInput::KeyUp(*k)).collect();
            debug!(path = %self.path.display(), keys = ?self.held, "releasing held keys");
            if let Err(e) = self.inner.injector.inject(&batch) {
                warn!(path = %self.path.display(), error = %e, "failed to release held keys");
            }
            self.held.clear();
        }

        // A stop followed by a new start may have replaced the entry.
        let mut playing = self.inner.playing();
        if playing
            .get(self.path)
            .is_some_and(|s| Arc::ptr_eq(s, self.session))
        {
            playing.remove(self.path);
        }
    }
}

fn run_session(inner: &PlayerInner, path: &Path, session: &Arc<PlaybackSession>) -> PlaybackOutcome {
    let outcome = {
        let mut cleanup = Cleanup {
            inner,
            path,
            session,
            held: BTreeSet::new(),
        };
        match replay(inner, path, session, &mut cleanup.held) {
            Ok(true) => PlaybackOutcome::Finished,
            Ok(false) => PlaybackOutcome::Stopped,
            Err(e) => PlaybackOutcome::Failed(e),
        }
    };

    let shown = path.display();
    match &outcome {
        PlaybackOutcome::Finished => {
            info!(path = %shown, "playback finished");
            inner.notifier.notify(NOTIFY_TITLE, &format!("Finished playing {shown}"));
        }
        PlaybackOutcome::Stopped => {
            info!(path = %shown, "playback stopped");
            inner.notifier.notify(NOTIFY_TITLE, &format!("Stopped playing {shown}"));
        }
        PlaybackOutcome::Failed(e) => {
            warn!(path = %shown, error = %e, "playback aborted");
            inner.notifier.notify(NOTIFY_TITLE, &e.to_string());
        }
    }
    outcome
}

/// Replay every line. Returns `Ok(false)` when stopped early.
fn replay(
    inner: &PlayerInner,
    path: &Path,
    session: &PlaybackSession,
    held: &mut BTreeSet<Key>,
) -> Result<bool, PlaybackError> {
    let io_err = |source| PlaybackError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let poll = Duration::from_millis(inner.config.poll_interval_ms.max(1));
    let started = Instant::now();

    for (index, line) in reader.lines().enumerate() {
        if session.is_stopped() {
            return Ok(false);
        }
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LogEntry = line.parse().map_err(|source| PlaybackError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;

        let due = started + Duration::from_millis(entry.elapsed_ms);
        if !sleep_until(due, poll, session) {
            return Ok(false);
        }

        let batch = to_batch(&entry, held);
        debug!(line = index + 1, ?batch, "injecting");
        if let Err(e) = inner.injector.inject(&batch) {
            warn!(path = %path.display(), line = index + 1, error = %e, "injection failed");
        }
    }
    Ok(true)
}

/// Sleep in slices of at most `poll`. Returns false if stopped first.
fn sleep_until(due: Instant, poll: Duration, session: &PlaybackSession) -> bool {
    loop {
        if session.is_stopped() {
            return false;
        }
        let now = Instant::now();
        if now >= due {
            return true;
        }
        thread::sleep((due - now).min(poll));
    }
}

/// The synthetic input for one log entry, keeping `held` in step.
fn to_batch(entry: &LogEntry, held: &mut BTreeSet<Key>) -> Vec<SyntheticInput> {
    match (entry.kind, entry.target) {
        (EventKind::KeyDown, EntryTarget::Key(key)) => {
            held.insert(key);
            vec![SyntheticInput::KeyDown(key)]
        }
        (EventKind::KeyUp, EntryTarget::Key(key)) => {
            held.remove(&key);
            vec![SyntheticInput::KeyUp(key)]
        }
        (EventKind::KeyPress, EntryTarget::Key(key)) => {
            held.remove(&key);
            vec![SyntheticInput::KeyDown(key), SyntheticInput::KeyUp(key)]
        }
        (EventKind::MouseMove, EntryTarget::Point(p)) => vec![SyntheticInput::MoveTo(p)],
        (EventKind::MouseWheel, EntryTarget::Point(p)) => vec![SyntheticInput::Wheel(p.y)],
        (EventKind::MouseTilt, EntryTarget::Point(p)) => vec![SyntheticInput::Tilt(p.x)],
        // The parser pairs key kinds with keys and pointer kinds with points.
        _ => Vec::new(),
    }
}
