//! Status notifications for record/playback sessions.

use tracing::info;

/// Fire-and-forget status sink (tray balloon, toast, log).
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, text: &str);
}

/// Notifier that writes every message to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, title: &str, text: &str) {
        info!(target: "replica::notify", title, "{text}");
    }
}
