//! Tunables for the dispatcher and the player.

use serde::{Deserialize, Serialize};

/// Configuration for the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Number of callback worker threads.
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Configuration for the session player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Longest single sleep between stop checks (ms).
    pub poll_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
        }
    }
}
