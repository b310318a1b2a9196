//! Parameter merge resolution.
//!
//! Precedence for every stylable field is: explicit segment override, then
//! the task's base parameter, then the built-in default. `Inherited` falls
//! through; explicit values such as `false` or "no background" never do.
//!
//! The resolver also owns the session-wide render parameters (the global
//! subtitle/audio panel), which start from the task base and are attached
//! to every render request.

use serde_json::Value;

use shotlist_sequence_model::{
    BackgroundMode, Override, RenderParams, Segment, SubtitlePosition, TaskParams,
};

use crate::patch::StylePatch;

pub const FONT_SIZE_RANGE: (u32, u32) = (12, 120);
pub const STROKE_WIDTH_RANGE: (f64, f64) = (0.0, 8.0);
pub const SUBTITLE_OFFSET_RANGE: (f64, f64) = (-5.0, 5.0);
pub const CUSTOM_POSITION_RANGE: (f64, f64) = (0.0, 100.0);

/// Effective subtitle style of one segment after inheritance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
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
}

/// Three-tier parameter resolver.
#[derive(Debug, Clone)]
pub struct ParameterResolver {
    builtin: RenderParams,
    task: TaskParams,
    session: RenderParams,
}

impl Default for ParameterResolver {
    fn default() -> Self {
        Self::new(TaskParams::default(), None)
    }
}

impl ParameterResolver {
    /// `ui_font` is the backend's configured default font; it replaces the
    /// built-in font when present.
    pub fn new(task: TaskParams, ui_font: Option<String>) -> Self {
        let mut builtin = RenderParams::default();
        if let Some(font) = ui_font.filter(|f| !f.trim().is_empty()) {
            builtin.font_name = font;
        }
        let session = task.apply_to(builtin.clone());
        Self {
            builtin,
            task,
            session,
        }
    }

    pub fn builtin(&self) -> &RenderParams {
        &self.builtin
    }

    pub fn task(&self) -> &TaskParams {
        &self.task
    }

    /// Task base parameters over built-in defaults.
    pub fn base(&self) -> RenderParams {
        self.task.apply_to(self.builtin.clone())
    }

    /// Session render parameters attached to render requests.
    pub fn render_params(&self) -> &RenderParams {
        &self.session
    }

    /// Replace the session parameters, clamping numeric inputs to the ranges
    /// the renderer accepts.
    pub fn set_render_params(&mut self, mut params: RenderParams) {
        params.font_size = params.font_size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1);
        params.stroke_width = clamp_finite(params.stroke_width, STROKE_WIDTH_RANGE, self.session.stroke_width);
        params.subtitle_offset =
            clamp_finite(params.subtitle_offset, SUBTITLE_OFFSET_RANGE, self.session.subtitle_offset);
        params.custom_position =
            clamp_finite(params.custom_position, CUSTOM_POSITION_RANGE, self.session.custom_position);
        params.bgm_volume = finite_or(params.bgm_volume, 0.0).max(0.0);
        params.bgm_fade_in_sec = finite_or(params.bgm_fade_in_sec, 0.0).max(0.0);
        params.bgm_fade_out_sec = finite_or(params.bgm_fade_out_sec, 0.0).max(0.0);
        self.session = params;
    }

    /// Reset the session parameters to the task base.
    pub fn reset_render_params(&mut self) {
        self.session = self.base();
    }

    /// Params object for the render wire request, or `None` when the task
    /// cannot accept one.
    pub fn wire_params(&self) -> serde_json::Result<Option<Value>> {
        self.task.overlay(&self.session)
    }

    /// Resolve a segment's effective style.
    pub fn resolve_segment(&self, segment: &Segment) -> ResolvedStyle {
        let base = self.base();
        let o = &segment.overrides;
        ResolvedStyle {
            subtitle_enabled: o.subtitle_enabled.clone().unwrap_or(base.subtitle_enabled),
            subtitle_position: o.subtitle_position.clone().unwrap_or(base.subtitle_position),
            custom_position: o.custom_position.clone().unwrap_or(base.custom_position),
            subtitle_offset: o.subtitle_offset.clone().unwrap_or(base.subtitle_offset),
            font_name: o.font_name.clone().unwrap_or(base.font_name),
            font_size: o.font_size.clone().unwrap_or(base.font_size),
            text_fore_color: o.text_fore_color.clone().unwrap_or(base.text_fore_color),
            stroke_color: o.stroke_color.clone().unwrap_or(base.stroke_color),
            stroke_width: o.stroke_width.clone().unwrap_or(base.stroke_width),
            text_background_color: o
                .text_background_color
                .clone()
                .unwrap_or(base.text_background_color),
        }
    }

    /// Patch that turns the core style fields of `segment` into explicit
    /// values when it is opened for focused editing.
    ///
    /// Core fields are position, custom position (only when the effective
    /// position is custom), font size, fore color and subtitle offset.
    /// Fields that are already explicit are left alone.
    pub fn materialize_core(&self, segment: &Segment) -> StylePatch {
        let base = self.base();
        let o = &segment.overrides;
        let mut patch = StylePatch::default();

        let position = match o.subtitle_position.explicit() {
            Some(p) => *p,
            None => {
                patch.subtitle_position = Some(Override::Explicit(base.subtitle_position));
                base.subtitle_position
            }
        };
        if position == SubtitlePosition::Custom && o.custom_position.is_inherited() {
            patch.custom_position = Some(Override::Explicit(base.custom_position));
        }
        if o.font_size.is_inherited() {
            patch.font_size = Some(Override::Explicit(base.font_size));
        }
        if o.text_fore_color.explicit().map_or(true, |c| c.is_empty()) {
            patch.text_fore_color = Some(Override::Explicit(base.text_fore_color));
        }
        if o.subtitle_offset.is_inherited() {
            patch.subtitle_offset = Some(Override::Explicit(base.subtitle_offset));
        }
        patch
    }

    /// Editing draft for the focused-segment panel.
    pub fn draft_for(&self, segment: &Segment) -> StyleDraft {
        let base = self.base();
        let o = &segment.overrides;
        let position = o.subtitle_position.clone().unwrap_or(base.subtitle_position);
        let custom_position = o.custom_position.explicit().copied().or(
            (position == SubtitlePosition::Custom).then_some(base.custom_position),
        );
        StyleDraft {
            disable_subtitle: o.subtitle_enabled == Override::Explicit(false),
            position: Override::Explicit(position),
            custom_position,
            font_size: Some(o.font_size.clone().unwrap_or(base.font_size)),
            text_fore_color: Some(
                o.text_fore_color
                    .explicit()
                    .filter(|c| !c.is_empty())
                    .cloned()
                    .unwrap_or(base.text_fore_color),
            ),
            subtitle_offset: Some(o.subtitle_offset.clone().unwrap_or(base.subtitle_offset)),
            font_name: o.font_name.clone(),
            stroke_color: o.stroke_color.explicit().cloned(),
            stroke_width: o.stroke_width.explicit().copied(),
            background: o.text_background_color.clone(),
        }
    }
}

/// Draft of the focused-editing panel.
///
/// Core fields are always written back. Advanced fields (font, stroke,
/// background) are only written when the advanced panel is open.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDraft {
    /// Writes `subtitle_enabled = false`; unchecked leaves it inherited.
    pub disable_subtitle: bool,
    pub position: Override<SubtitlePosition>,
    pub custom_position: Option<f64>,
    pub font_size: Option<u32>,
    pub text_fore_color: Option<String>,
    pub subtitle_offset: Option<f64>,
    pub font_name: Override<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub background: Override<BackgroundMode>,
}

impl StyleDraft {
    pub fn to_patch(&self, advanced_open: bool) -> StylePatch {
        let mut patch = StylePatch {
            subtitle_enabled: Some(if self.disable_subtitle {
                Override::Explicit(false)
            } else {
                Override::Inherited
            }),
            subtitle_position: Some(self.position.clone()),
            custom_position: Some(self.custom_position.into()),
            font_size: Some(self.font_size.into()),
            text_fore_color: Some(
                self.text_fore_color
                    .clone()
                    .filter(|c| !c.is_empty())
                    .into(),
            ),
            subtitle_offset: Some(self.subtitle_offset.into()),
            ..StylePatch::default()
        };
        if advanced_open {
            patch.font_name = Some(self.font_name.clone());
            patch.stroke_color = Some(self.stroke_color.clone().filter(|c| !c.is_empty()).into());
            patch.stroke_width = Some(self.stroke_width.into());
            patch.text_background_color = Some(self.background.clone());
        }
        patch
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn clamp_finite(value: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    finite_or(value, fallback).clamp(lo, hi)
}
