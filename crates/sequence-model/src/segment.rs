//! Segment records: one ordered cut in a shot list.

use serde::{Deserialize, Serialize};

use crate::style::StyleOverrides;

/// Stable, opaque segment identity.
pub type SegmentId = String;

/// A single cut in the edited sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Opaque identifier assigned by the backend.
    #[serde(rename = "segment_id")]
    pub id: SegmentId,

    /// 1-based position. Always equals index + 1 inside a sequence.
    #[serde(default)]
    pub order: u32,

    /// Scene heading shown to the operator. Never affects rendering.
    #[serde(default)]
    pub scene_title: Option<String>,

    /// Shot label ("1A") or number.
    #[serde(default)]
    pub shot_no: Option<ShotNumber>,

    /// Shot description used as a material search hint.
    #[serde(default)]
    pub shot_desc: Option<String>,

    /// Free-form style tag from the shot plan.
    #[serde(default)]
    pub style: Option<String>,

    /// Playback length in seconds.
    #[serde(default)]
    pub duration: f64,

    /// Trim in-point into the source material (seconds).
    #[serde(default)]
    pub start: Option<f64>,

    /// Trim out-point into the source material (seconds).
    #[serde(default)]
    pub end: Option<f64>,

    /// Playback speed multiplier.
    #[serde(default)]
    pub speed: Option<f64>,

    /// Transition into this segment. `None` defers to the task setting.
    #[serde(default)]
    pub transition: Option<Transition>,

    /// Transition length in seconds.
    #[serde(default)]
    pub transition_duration: Option<f64>,

    #[serde(default)]
    pub transition_direction: Option<TransitionDirection>,

    /// Mask asset for `Mask` transitions.
    #[serde(default)]
    pub transition_mask: Option<String>,

    /// How the material is fitted into the output frame.
    #[serde(default)]
    pub fit: Option<FitMode>,

    /// Source asset reference (path or URL).
    #[serde(default)]
    pub material: Option<String>,

    /// Source dimension hints.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,

    /// Subtitle timing anchor computed by the backend. Opaque here, kept so
    /// a full save writes it back unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_anchor: Option<serde_json::Value>,

    /// Per-segment subtitle style overrides.
    #[serde(flatten)]
    pub overrides: StyleOverrides,
}

/// Shot numbering as produced by the planner: either a label or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShotNumber {
    Number(i64),
    Label(String),
}

/// Transition kinds understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    Shuffle,
    FadeIn,
    FadeOut,
    SlideIn,
    SlideOut,
    Mask,
}

/// Direction for slide/push style transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionDirection {
    Left,
    Right,
    Top,
    Bottom,
}

/// Material fit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Letterbox to keep the whole frame visible.
    #[default]
    Contain,
    /// Crop to fill the frame.
    Cover,
    /// Center at native size.
    Center,
}

impl Segment {
    /// Create a bare segment with the given id and duration.
    pub fn new(id: impl Into<SegmentId>, duration: f64) -> Self {
        Self {
            id: id.into(),
            order: 0,
            scene_title: None,
            shot_no: None,
            shot_desc: None,
            style: None,
            duration,
            start: None,
            end: None,
            speed: None,
            transition: None,
            transition_duration: None,
            transition_direction: None,
            transition_mask: None,
            fit: None,
            material: None,
            width: None,
            height: None,
            subtitle_anchor: None,
            overrides: StyleOverrides::default(),
        }
    }

    /// Builder-style trim points.
    pub fn with_trim(mut self, start: f64, end: f64) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Builder-style material reference.
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// In-point, treating a missing value as the start of the material.
    pub fn effective_start(&self) -> f64 {
        self.start.unwrap_or(0.0)
    }

    /// Out-point, treating a missing value as `start + duration`.
    pub fn effective_end(&self) -> f64 {
        self.end
            .unwrap_or_else(|| self.effective_start() + self.duration)
    }
}

/// Renumber `order` so that it equals index + 1 for every element.
pub fn normalize_orders(segments: &mut [Segment]) {
    for (idx, segment) in segments.iter_mut().enumerate() {
        segment.order = idx as u32 + 1;
    }
}

/// Sum of segment durations, ignoring non-finite values.
pub fn total_duration(segments: &[Segment]) -> f64 {
    segments
        .iter()
        .map(|s| s.duration)
        .filter(|d| d.is_finite())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Override;

    #[test]
    fn test_segment_wire_names() {
        let json = r#"{
            "segment_id": "s1",
            "order": 1,
            "scene_title": "Opening",
            "shot_no": 1,
            "duration": 1.5,
            "transition": "FadeIn",
            "transition_direction": "left",
            "speed": 1.0,
            "fit": "contain",
            "material": "/path/material1.mp4",
            "start": 0,
            "end": 1.5,
            "width": 1920,
            "height": 1080,
            "font_size": 48,
            "text_background_color": false
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        assert_eq!(seg.id, "s1");
        assert_eq!(seg.transition, Some(Transition::FadeIn));
        assert_eq!(seg.transition_direction, Some(TransitionDirection::Left));
        assert_eq!(seg.fit, Some(FitMode::Contain));
        assert_eq!(seg.shot_no, Some(ShotNumber::Number(1)));
        assert_eq!(seg.end, Some(1.5));
        assert_eq!(seg.overrides.font_size, Override::Explicit(48));
        assert!(seg.overrides.stroke_color.is_inherited());
    }

    #[test]
    fn test_shot_label_accepted() {
        let seg: Segment =
            serde_json::from_str(r#"{ "segment_id": "a", "duration": 2, "shot_no": "1A" }"#)
                .unwrap();
        assert_eq!(seg.shot_no, Some(ShotNumber::Label("1A".to_string())));
        assert_eq!(seg.order, 0);
    }

    #[test]
    fn test_serialization_keeps_segment_id_and_overrides_inline() {
        let mut seg = Segment::new("x", 3.0).with_trim(1.0, 4.0);
        seg.overrides.subtitle_offset = Override::Explicit(-0.5);
        let value = serde_json::to_value(&seg).unwrap();
        assert_eq!(value["segment_id"], "x");
        assert_eq!(value["subtitle_offset"], -0.5);
        assert!(value["font_name"].is_null());
        assert!(value.get("overrides").is_none());
    }

    #[test]
    fn test_subtitle_anchor_survives_resave() {
        let json = r#"{
            "segment_id": "s4",
            "duration": 2,
            "subtitle_anchor": { "start": 12.4, "end": 14.4, "line": 3 }
        }"#;
        let seg: Segment = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&seg).unwrap();
        assert_eq!(value["subtitle_anchor"]["line"], 3);
        assert_eq!(value["subtitle_anchor"]["start"], 12.4);

        let plain = serde_json::to_value(Segment::new("s5", 1.0)).unwrap();
        assert!(plain.get("subtitle_anchor").is_none());
    }

    #[test]
    fn test_effective_bounds() {
        let seg = Segment::new("a", 4.0);
        assert_eq!(seg.effective_start(), 0.0);
        assert_eq!(seg.effective_end(), 4.0);

        let mut seg = Segment::new("b", 2.0);
        seg.start = Some(3.0);
        assert_eq!(seg.effective_end(), 5.0);
    }

    #[test]
    fn test_normalize_orders() {
        let mut list = vec![
            Segment::new("a", 1.0),
            Segment::new("b", 1.0),
            Segment::new("c", 1.0),
        ];
        list[0].order = 7;
        normalize_orders(&mut list);
        let orders: Vec<u32> = list.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_total_duration_skips_non_finite() {
        let list = vec![
            Segment::new("a", 5.0),
            Segment::new("b", f64::NAN),
            Segment::new("c", 2.5),
        ];
        assert!((total_duration(&list) - 7.5).abs() < 1e-9);
    }
}
