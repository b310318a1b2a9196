use serde_json::Value;

use shotlist_common::error::ShotlistError;
use shotlist_sequence_model::{
    ConfigData, ModelError, RenderData, RewriteData, RewriteMode, Segment, SuggestData,
    TaskDetail, ThumbsData,
};

/// Failure talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Connection, timeout, or body read failure.
    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected response from {endpoint}: {source}")]
    Contract {
        endpoint: String,
        #[source]
        source: ModelError,
    },
}

impl BackendError {
    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// Transport failures and server-side errors may succeed on a later
    /// attempt. Contract violations and client errors will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Contract { .. } => false,
        }
    }
}

impl From<BackendError> for ShotlistError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Contract { .. } => ShotlistError::contract(err.to_string()),
            _ => ShotlistError::transport(err.to_string()),
        }
    }
}

/// Operations the editor needs from the persistence/render backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Saved segment plan of a task, in order.
    async fn fetch_plan(&self, task_id: &str) -> Result<Vec<Segment>, BackendError>;

    /// Task snapshot: narration length and the original task parameters.
    async fn fetch_task(&self, task_id: &str) -> Result<TaskDetail, BackendError>;

    /// Replace the stored segment list.
    async fn save_segments(&self, task_id: &str, segments: &[Segment])
        -> Result<(), BackendError>;

    /// Render a segment snapshot. `preview` asks for the visual-only
    /// concatenation.
    async fn render_segments(
        &self,
        task_id: &str,
        segments: &[Segment],
        params: Option<&Value>,
        preview: bool,
    ) -> Result<RenderData, BackendError>;

    /// Ask the backend to generate thumbnails ahead of time.
    async fn prewarm_thumbnails(&self, task_id: &str) -> Result<ThumbsData, BackendError>;

    async fn suggest_subtitle(
        &self,
        task_id: &str,
        segment: &Segment,
        mode: RewriteMode,
    ) -> Result<SuggestData, BackendError>;

    /// Store `suggestion` as a subtitle override version, optionally making
    /// it the live one.
    async fn rewrite_subtitle(
        &self,
        task_id: &str,
        segment: &Segment,
        mode: RewriteMode,
        suggestion: &str,
        apply: bool,
    ) -> Result<RewriteData, BackendError>;

    /// Drop the live subtitle override of a segment.
    async fn revert_subtitle(&self, task_id: &str, segment_id: &str) -> Result<(), BackendError>;

    /// Font files available to the renderer.
    async fn list_fonts(&self) -> Result<Vec<String>, BackendError>;

    /// UI defaults (currently the default font).
    async fn ui_config(&self) -> Result<ConfigData, BackendError>;
}

pub mod http;

pub use http::HttpBackend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(BackendError::transport("/v1/x", "timed out").is_retryable());
        let server = BackendError::Status {
            endpoint: "/v1/x".into(),
            status: 502,
            message: String::new(),
        };
        assert!(server.is_retryable());
        let client = BackendError::Status {
            endpoint: "/v1/x".into(),
            status: 400,
            message: "segments is empty".into(),
        };
        assert!(!client.is_retryable());
    }

    #[test]
    fn contract_errors_map_to_contract() {
        let err = BackendError::Contract {
            endpoint: "/v1/tasks/t".into(),
            source: ModelError::MissingData,
        };
        assert!(matches!(
            ShotlistError::from(err),
            ShotlistError::Contract { .. }
        ));
        let err = BackendError::transport("/v1/fonts", "connection refused");
        assert!(ShotlistError::from(err).is_retryable());
    }
}
