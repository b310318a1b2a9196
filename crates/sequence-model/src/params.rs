//! Task-level parameters and the resolved render parameter set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::style::{BackgroundMode, SubtitlePosition};

/// Font used when neither the task nor the UI config names one.
pub const DEFAULT_FONT_NAME: &str = "STHeitiMedium.ttc";

/// Fully resolved subtitle and audio-mix parameters attached to a render.
///
/// Every field has a concrete value; inheritance has already been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub subtitle_enabled: bool,
    pub subtitle_position: SubtitlePosition,
    pub custom_position: f64,
    pub subtitle_offset: f64,
    pub font_name: String,
    pub font_size: u32,
    pub text_fore_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub text_background_color: BackgroundMode,
    pub bgm_volume: f64,
    pub bgm_fade_in_sec: f64,
    pub bgm_fade_out_sec: f64,
    pub bgm_ducking: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            subtitle_enabled: true,
            subtitle_position: SubtitlePosition::Bottom,
            custom_position: 70.0,
            subtitle_offset: 0.0,
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: 60,
            text_fore_color: "#FFFFFF".to_string(),
            stroke_color: "#000000".to_string(),
            stroke_width: 1.5,
            text_background_color: BackgroundMode::Box,
            bgm_volume: 0.2,
            bgm_fade_in_sec: 0.0,
            bgm_fade_out_sec: 3.0,
            bgm_ducking: false,
        }
    }
}

/// Parameters the generation task was created with.
///
/// Only the fields the editor reads are typed. Everything else is kept in
/// `extra` so it can be passed back to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_position: Option<SubtitlePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_fore_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_background_color: Option<BackgroundMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_fade_in_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_fade_out_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm_ducking: Option<bool>,

    /// Fields the editor does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskParams {
    /// True when the task carries a non-empty subject, which the renderer
    /// requires before it accepts a params object.
    pub fn has_subject(&self) -> bool {
        self.video_subject
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Apply task-level values over `base`, keeping `base` wherever the task
    /// is silent.
    pub fn apply_to(&self, base: RenderParams) -> RenderParams {
        RenderParams {
            subtitle_enabled: self.subtitle_enabled.unwrap_or(base.subtitle_enabled),
            subtitle_position: self.subtitle_position.unwrap_or(base.subtitle_position),
            custom_position: self.custom_position.unwrap_or(base.custom_position),
            subtitle_offset: self.subtitle_offset.unwrap_or(base.subtitle_offset),
            font_name: self
                .font_name
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or(base.font_name),
            font_size: self.font_size.unwrap_or(base.font_size),
            text_fore_color: self.text_fore_color.clone().unwrap_or(base.text_fore_color),
            stroke_color: self.stroke_color.clone().unwrap_or(base.stroke_color),
            stroke_width: self.stroke_width.unwrap_or(base.stroke_width),
            text_background_color: self
                .text_background_color
                .clone()
                .unwrap_or(base.text_background_color),
            bgm_volume: self.bgm_volume.unwrap_or(base.bgm_volume),
            bgm_fade_in_sec: self.bgm_fade_in_sec.unwrap_or(base.bgm_fade_in_sec),
            bgm_fade_out_sec: self.bgm_fade_out_sec.unwrap_or(base.bgm_fade_out_sec),
            bgm_ducking: self.bgm_ducking.unwrap_or(base.bgm_ducking),
        }
    }

    /// Build the params object sent with a render request: these task params
    /// with `render` laid over them. Returns `None` when the task has no
    /// subject, in which case the request carries no params at all.
    pub fn overlay(&self, render: &RenderParams) -> serde_json::Result<Option<Value>> {
        if !self.has_subject() {
            return Ok(None);
        }
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(resolved) = serde_json::to_value(render)? {
            merged.extend(resolved);
        }
        Ok(Some(Value::Object(merged)))
    }
}
