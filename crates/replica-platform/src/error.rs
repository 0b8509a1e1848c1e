//! Common error types for replica-platform.

use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to install input hook: {0}")]
    HookInstall(String),
    #[error("injection failed: {0}")]
    InjectionFailed(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
