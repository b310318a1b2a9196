//! Wire contract with the rendering/persistence backend.
//!
//! Every response arrives wrapped as `{status, message, data}`. The
//! envelope and the payload are checked structurally before anything is
//! handed to the editor; a shape mismatch is a [`ModelError`], never a
//! partially applied value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::TaskParams;
use crate::segment::{Segment, SegmentId};

/// Errors raised while decoding backend payloads.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Malformed response body: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Backend reported status {status}: {message}")]
    Rejected { status: i64, message: String },

    #[error("Response envelope has no `data` payload")]
    MissingData,
}

/// Generic `{status, message, data}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_status")]
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

fn default_status() -> i64 {
    200
}

impl<T> Envelope<T> {
    /// Unwrap the payload, rejecting non-2xx envelope status codes.
    pub fn into_data(self) -> Result<T, ModelError> {
        if !(200..300).contains(&self.status) {
            return Err(ModelError::Rejected {
                status: self.status,
                message: self.message.unwrap_or_default(),
            });
        }
        self.data.ok_or(ModelError::MissingData)
    }
}

/// Decode an enveloped JSON body into its payload.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ModelError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|source| ModelError::Malformed { source })?;
    envelope.into_data()
}

/// Like [`parse_envelope`] for responses whose payload is irrelevant.
pub fn check_envelope(body: &str) -> Result<(), ModelError> {
    let envelope: Envelope<Value> =
        serde_json::from_str(body).map_err(|source| ModelError::Malformed { source })?;
    if !(200..300).contains(&envelope.status) {
        return Err(ModelError::Rejected {
            status: envelope.status,
            message: envelope.message.unwrap_or_default(),
        });
    }
    Ok(())
}

/// Saved segment plan for a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanData {
    #[serde(default)]
    pub task_id: Option<String>,
    pub segments: Vec<Segment>,
}

/// Task snapshot. Only the fields the editor consumes are typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(default)]
    pub task_id: Option<String>,
    /// Backend task state code.
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(default)]
    pub progress: Option<f64>,
    /// Narration length in seconds. Zero or missing disables the aggregate check.
    #[serde(default)]
    pub audio_duration: Option<f64>,
    #[serde(default)]
    pub params: Option<TaskParams>,
}

/// Task state code of a failed task.
pub const TASK_STATE_FAILED: i64 = -1;
/// Task state code while generation is running.
pub const TASK_STATE_PROCESSING: i64 = 4;

impl TaskDetail {
    /// The backend is still producing this task; the sequence must not be
    /// rendered or autosaved meanwhile.
    pub fn is_processing(&self) -> bool {
        self.state == Some(TASK_STATE_PROCESSING) && self.progress.unwrap_or(0.0) < 100.0
    }

    pub fn is_failed(&self) -> bool {
        self.state == Some(TASK_STATE_FAILED)
    }
}

/// Full-replace save of the segment list.
#[derive(Debug, Clone, Serialize)]
pub struct SaveRequest<'a> {
    pub task_id: &'a str,
    pub segments: &'a [Segment],
}

/// Render request for a segment snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest<'a> {
    pub task_id: &'a str,
    pub segments: &'a [Segment],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a Value>,
    pub preview: bool,
}

/// Render result. Preview renders only produce `combined_video`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderData {
    pub task_id: Option<String>,
    /// Visual-only concatenation.
    pub combined_video: Option<String>,
    /// Muxed output with narration, music and subtitles.
    pub final_video: Option<String>,
}

impl RenderData {
    pub fn combined(&self) -> Option<&str> {
        non_empty(self.combined_video.as_deref())
    }

    pub fn final_output(&self) -> Option<&str> {
        non_empty(self.final_video.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Thumbnail URLs produced by the prewarm call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbsData {
    pub task_id: Option<String>,
    pub thumbs: Vec<ThumbEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbEntry {
    pub segment_id: SegmentId,
    #[serde(default)]
    pub thumb: String,
}

/// Font files available to the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsData {
    pub files: Vec<String>,
}

/// Subset of the UI configuration the editor reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigData {
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub font_name: Option<String>,
}

/// Subtitle rewriting modes offered by the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteMode {
    #[default]
    Polish,
    Simplify,
    TranslateZh,
    TranslateEn,
}

impl RewriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polish => "polish",
            Self::Simplify => "simplify",
            Self::TranslateZh => "translate-zh",
            Self::TranslateEn => "translate-en",
        }
    }
}

impl std::str::FromStr for RewriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polish" => Ok(Self::Polish),
            "simplify" => Ok(Self::Simplify),
            "translate-zh" => Ok(Self::TranslateZh),
            "translate-en" => Ok(Self::TranslateEn),
            other => Err(format!("unknown rewrite mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestRequest<'a> {
    pub task_id: &'a str,
    pub segment_id: &'a str,
    pub order: u32,
    pub mode: RewriteMode,
}

/// Assistant suggestion for one segment's subtitle window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestData {
    pub segment_id: Option<SegmentId>,
    pub original_text: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteRequest<'a> {
    pub task_id: &'a str,
    pub segment_id: &'a str,
    pub order: u32,
    pub mode: RewriteMode,
    pub suggestion: &'a str,
    pub apply: bool,
}

/// Outcome of a rewrite: the stored override version and whether it is live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteData {
    pub segment_id: Option<SegmentId>,
    pub version: Option<String>,
    pub applied: bool,
}
