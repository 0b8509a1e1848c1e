//! Daemon configuration file.

use anyhow::{Context, Result};
use replica_core::{DispatcherConfig, Key, PlayerConfig};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const APP_DIR: &str = "replica";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub dispatcher: DispatcherConfig,
    pub player: PlayerConfig,
    pub logging: LoggingConfig,
    pub recordings: Vec<Binding>,
    pub playbacks: Vec<Binding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily log files. Console only when unset.
    pub directory: Option<PathBuf>,
    /// Default level for replica targets; `RUST_LOG` overrides it.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            level: "info".into(),
        }
    }
}

/// A log file with its start and stop key combinations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Binding {
    pub path: PathBuf,
    #[serde(deserialize_with = "key_names", serialize_with = "to_key_names")]
    pub start: Vec<Key>,
    #[serde(deserialize_with = "key_names", serialize_with = "to_key_names")]
    pub stop: Vec<Key>,
}

/// Key combinations are written with the same names the recording logs
/// use, plus the usual aliases (`ctrl`, `alt`, ...).
fn key_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Key>, D::Error> {
    Vec::<String>::deserialize(deserializer)?
        .iter()
        .map(|name| name.parse::<Key>().map_err(de::Error::custom))
        .collect()
}

fn to_key_names<S: Serializer>(keys: &[Key], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(keys.iter().map(|k| k.name()))
}

/// `<data dir>/replica/config.yaml`.
pub fn default_path() -> Result<PathBuf> {
    let base = dirs_next::data_dir().context("could not determine the data directory")?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

/// Load a YAML file from disk.
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    /// The file does not exist; built-in defaults are in effect.
    Defaults,
}

/// A loaded configuration and its origin.
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub source: ConfigSource,
    pub config: AppConfig,
}

impl LoadedConfig {
    /// Log how the configuration was obtained. Called once the subscriber
    /// is installed, since loading happens before logging can be set up.
    pub fn report(&self) {
        match self.source {
            ConfigSource::Defaults => {
                warn!(path = %self.path.display(), "config file not found, using defaults")
            }
            ConfigSource::File => info!(
                path = %self.path.display(),
                recordings = self.config.recordings.len(),
                playbacks = self.config.playbacks.len(),
                "config loaded"
            ),
        }
        for binding in self.config.recordings.iter().chain(&self.config.playbacks) {
            debug!(path = %binding.path.display(), "binding path");
        }
    }
}

impl AppConfig {
    /// Load `path`, falling back to defaults when it does not exist.
    /// Relative paths inside the file resolve against its directory.
    pub fn load(path: &Path) -> Result<LoadedConfig> {
        if !path.exists() {
            return Ok(LoadedConfig {
                path: path.to_path_buf(),
                source: ConfigSource::Defaults,
                config: Self::default(),
            });
        }

        let mut config: AppConfig =
            load_yaml(path).with_context(|| format!("failed to load {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_paths(base);
        Ok(LoadedConfig {
            path: path.to_path_buf(),
            source: ConfigSource::File,
            config,
        })
    }

    fn resolve_paths(&mut self, base: &Path) {
        for binding in self.recordings.iter_mut().chain(self.playbacks.iter_mut()) {
            if binding.path.is_relative() {
                binding.path = base.join(&binding.path);
            }
        }
        if let Some(dir) = self.logging.directory.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}
