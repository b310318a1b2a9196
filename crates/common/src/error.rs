//! Error types shared across Shotlist crates.
//!
//! The taxonomy mirrors how failures are surfaced to the operator:
//! validation problems block actions locally, transport failures are
//! retryable, contract failures mean the backend answered with something
//! we refuse to apply, and cancellation is informational.

/// Top-level error type for Shotlist operations.
#[derive(Debug, thiserror::Error)]
pub enum ShotlistError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Contract error: {message}")]
    Contract { message: String },

    #[error("Cancelled: {message}")]
    Cancelled { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ShotlistError.
pub type ShotlistResult<T> = Result<T, ShotlistError>;

impl ShotlistError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract {
            message: msg.into(),
        }
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Io(_))
    }

    /// Cancellation is reported to the operator as information, not failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
