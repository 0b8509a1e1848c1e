//! Imitator: binds record/playback start and stop combinations to system
//! triggers.

use crate::player::NOTIFY_TITLE;
use crate::trigger::{join_segments, Callback, Namespace};
use crate::{
    Dispatcher, EventKind, Injector, Key, Notifier, PlayerConfig, RegistrationError, SessionError,
    SessionPlayer,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const RECORD: &str = "record";
const PLAY: &str = "play";

pub struct Imitator {
    dispatcher: Dispatcher,
    player: SessionPlayer,
    notifier: Arc<dyn Notifier>,
}

impl Imitator {
    /// The player shares the dispatcher's recorder, so a path being recorded
    /// cannot be replayed.
    pub fn new(
        dispatcher: Dispatcher,
        config: PlayerConfig,
        injector: Arc<dyn Injector>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let player = SessionPlayer::new(
            config,
            injector,
            notifier.clone(),
            dispatcher.recorder().clone(),
        );
        Self {
            dispatcher,
            player,
            notifier,
        }
    }

    pub fn player(&self) -> &SessionPlayer {
        &self.player
    }

    /// Record to `path` between presses of `start` and `stop`.
    ///
    /// Neither combination is written to the log.
    pub fn record(
        &self,
        path: impl AsRef<Path>,
        start: &[Key],
        stop: &[Key],
    ) -> Result<(), RegistrationError> {
        let path = path.as_ref().to_path_buf();
        let excluded: Vec<Key> = start.iter().chain(stop).copied().collect();

        let recorder = self.dispatcher.recorder().clone();
        let notifier = self.notifier.clone();
        let start_path = path.clone();
        let on_start: Callback = Arc::new(move |_| {
            let shown = start_path.display();
            match recorder.start(&start_path, excluded.iter().copied()) {
                Ok(()) => notifier.notify(NOTIFY_TITLE, &format!("Started recording to {shown}")),
                Err(SessionError::Conflict(conflict)) => {
                    notifier.notify(NOTIFY_TITLE, &conflict.to_string())
                }
                Err(e) => {
                    notifier.notify(NOTIFY_TITLE, &e.to_string());
                    return Err(e.to_string());
                }
            }
            Ok(())
        });

        let recorder = self.dispatcher.recorder().clone();
        let notifier = self.notifier.clone();
        let stop_path = path.clone();
        let on_stop: Callback = Arc::new(move |_| {
            if recorder.stop(&stop_path) {
                notifier.notify(
                    NOTIFY_TITLE,
                    &format!("Stopped recording to {}", stop_path.display()),
                );
            }
            Ok(())
        });

        self.bind(RECORD, &path, start, stop, on_start, on_stop)
    }

    /// Replay `path` on a press of `start`; `stop` interrupts it.
    pub fn play(
        &self,
        path: impl AsRef<Path>,
        start: &[Key],
        stop: &[Key],
    ) -> Result<(), RegistrationError> {
        let path = path.as_ref().to_path_buf();

        let player = self.player.clone();
        let notifier = self.notifier.clone();
        let start_path = path.clone();
        let on_start: Callback = Arc::new(move |_| {
            match player.start(&start_path) {
                // The session reports its own start and end.
                Ok(_detached) => {}
                Err(SessionError::Conflict(conflict)) => {
                    notifier.notify(NOTIFY_TITLE, &conflict.to_string())
                }
                Err(e) => {
                    notifier.notify(NOTIFY_TITLE, &e.to_string());
                    return Err(e.to_string());
                }
            }
            Ok(())
        });

        let player = self.player.clone();
        let stop_path = path.clone();
        let on_stop: Callback = Arc::new(move |_| {
            player.stop(&stop_path);
            Ok(())
        });

        self.bind(PLAY, &path, start, stop, on_start, on_stop)
    }

    /// Remove the record and playback bindings of `path`. Sessions already
    /// running are left alone.
    pub fn forget(&self, path: impl AsRef<Path>) -> usize {
        let path = path_segment(path.as_ref());
        let removed: usize = [RECORD, PLAY]
            .into_iter()
            .map(|mode| {
                let root = join_segments(&["imitator", mode, path.as_str()]);
                self.dispatcher.unregister(&root, Namespace::System)
            })
            .sum();
        info!(path = %path, removed, "imitator bindings removed");
        removed
    }

    /// Register the `.start` / `.stop` pair, both or neither.
    fn bind(
        &self,
        mode: &str,
        path: &Path,
        start: &[Key],
        stop: &[Key],
        on_start: Callback,
        on_stop: Callback,
    ) -> Result<(), RegistrationError> {
        let segment = path_segment(path);
        let start_name = join_segments(&["imitator", mode, segment.as_str(), "start"]);
        let stop_name = join_segments(&["imitator", mode, segment.as_str(), "stop"]);

        self.dispatcher
            .register_key(&start_name, start, EventKind::KeyPress, on_start, Namespace::System)?;
        if let Err(e) =
            self.dispatcher
                .register_key(&stop_name, stop, EventKind::KeyPress, on_stop, Namespace::System)
        {
            warn!(path = %path.display(), error = %e, "stop binding failed, rolling back");
            self.dispatcher.unregister(&start_name, Namespace::System);
            return Err(e);
        }

        info!(
            mode,
            path = %path.display(),
            start = ?start,
            stop = ?stop,
            "imitator binding registered"
        );
        Ok(())
    }
}

fn path_segment(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
