//! Partial updates applied to segments by the store.
//!
//! Outer `Option` means "leave untouched"; for nullable fields the inner
//! `Option` is the new value, so `Some(None)` clears the field.

use shotlist_sequence_model::{
    BackgroundMode, FitMode, Override, Segment, StyleOverrides, SubtitlePosition, Transition,
    TransitionDirection,
};

/// Field-level update for one or more segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentPatch {
    pub duration: Option<f64>,
    pub start: Option<Option<f64>>,
    pub end: Option<Option<f64>>,
    pub speed: Option<Option<f64>>,
    pub transition: Option<Option<Transition>>,
    pub transition_duration: Option<Option<f64>>,
    pub transition_direction: Option<Option<TransitionDirection>>,
    pub transition_mask: Option<Option<String>>,
    pub fit: Option<Option<FitMode>>,
    pub material: Option<Option<String>>,
    pub scene_title: Option<Option<String>>,
    pub shot_desc: Option<Option<String>>,
    pub style: StylePatch,
}

/// Update for style overrides. `None` leaves the override as it is;
/// `Some(Override::Inherited)` resets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylePatch {
    pub subtitle_enabled: Option<Override<bool>>,
    pub subtitle_position: Option<Override<SubtitlePosition>>,
    pub custom_position: Option<Override<f64>>,
    pub subtitle_offset: Option<Override<f64>>,
    pub font_name: Option<Override<String>>,
    pub font_size: Option<Override<u32>>,
    pub text_fore_color: Option<Override<String>>,
    pub stroke_color: Option<Override<String>>,
    pub stroke_width: Option<Override<f64>>,
    pub text_background_color: Option<Override<BackgroundMode>>,
}

impl SegmentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_start(mut self, start: Option<f64>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: Option<f64>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_speed(mut self, speed: Option<f64>) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_transition(mut self, transition: Option<Transition>) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn with_transition_duration(mut self, duration: Option<f64>) -> Self {
        self.transition_duration = Some(duration);
        self
    }

    pub fn with_fit(mut self, fit: Option<FitMode>) -> Self {
        self.fit = Some(fit);
        self
    }

    pub fn with_material(mut self, material: Option<String>) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_style(mut self, style: StylePatch) -> Self {
        self.style = style;
        self
    }

    /// True when applying the patch cannot change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every populated field to `segment`.
    pub fn apply(&self, segment: &mut Segment) {
        if let Some(v) = self.duration {
            segment.duration = v;
        }
        set(&mut segment.start, &self.start);
        set(&mut segment.end, &self.end);
        set(&mut segment.speed, &self.speed);
        set(&mut segment.transition, &self.transition);
        set(&mut segment.transition_duration, &self.transition_duration);
        set(&mut segment.transition_direction, &self.transition_direction);
        set(&mut segment.transition_mask, &self.transition_mask);
        set(&mut segment.fit, &self.fit);
        set(&mut segment.material, &self.material);
        set(&mut segment.scene_title, &self.scene_title);
        set(&mut segment.shot_desc, &self.shot_desc);
        self.style.apply(&mut segment.overrides);
    }
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, style: &mut StyleOverrides) {
        set(&mut style.subtitle_enabled, &self.subtitle_enabled);
        set(&mut style.subtitle_position, &self.subtitle_position);
        set(&mut style.custom_position, &self.custom_position);
        set(&mut style.subtitle_offset, &self.subtitle_offset);
        set(&mut style.font_name, &self.font_name);
        set(&mut style.font_size, &self.font_size);
        set(&mut style.text_fore_color, &self.text_fore_color);
        set(&mut style.stroke_color, &self.stroke_color);
        set(&mut style.stroke_width, &self.stroke_width);
        set(&mut style.text_background_color, &self.text_background_color);
    }
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}
