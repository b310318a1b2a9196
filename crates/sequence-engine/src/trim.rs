//! Trim/drag handling on the timeline.
//!
//! Pixel deltas become time deltas through the current [`TimelineScale`].
//! A gesture captures its base start/end at pointer-down and computes every
//! update from those bases, so jitter in the pointer stream never compounds.

use shotlist_sequence_model::{Segment, SegmentId};

use crate::patch::SegmentPatch;

/// Shortest segment a trim may produce (seconds).
pub const MIN_DURATION: f64 = 0.1;

/// Default timeline zoom.
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 60.0;
pub const MIN_PIXELS_PER_SECOND: f64 = 10.0;
pub const MAX_PIXELS_PER_SECOND: f64 = 240.0;

/// Which edge of the clip is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimSide {
    Left,
    Right,
}

/// Result of a trim computation. All three values are written back together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimResult {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

impl TrimResult {
    pub fn to_patch(self) -> SegmentPatch {
        SegmentPatch::new()
            .with_start(Some(self.start))
            .with_end(Some(self.end))
            .with_duration(self.duration)
    }
}

/// Base values captured from a segment at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimBase {
    pub start: f64,
    pub end: f64,
}

impl TrimBase {
    pub fn of(segment: &Segment) -> Self {
        Self {
            start: segment.effective_start(),
            end: segment.effective_end(),
        }
    }
}

/// Apply a time delta to one edge, keeping at least [`MIN_DURATION`].
pub fn compute_trim(side: TrimSide, base: TrimBase, delta_seconds: f64) -> TrimResult {
    match side {
        TrimSide::Left => {
            let upper = (base.end - MIN_DURATION).max(0.0);
            let start = (base.start + delta_seconds).clamp(0.0, upper);
            TrimResult {
                start,
                end: base.end,
                duration: base.end - start,
            }
        }
        TrimSide::Right => {
            let end = (base.end + delta_seconds).max(base.start + MIN_DURATION);
            TrimResult {
                start: base.start,
                end,
                duration: end - base.start,
            }
        }
    }
}

/// Timeline zoom in pixels per second, kept within
/// [`MIN_PIXELS_PER_SECOND`, `MAX_PIXELS_PER_SECOND`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineScale(f64);

impl Default for TimelineScale {
    fn default() -> Self {
        Self(DEFAULT_PIXELS_PER_SECOND)
    }
}

impl TimelineScale {
    pub fn new(pixels_per_second: f64) -> Self {
        if !pixels_per_second.is_finite() {
            return Self::default();
        }
        Self(pixels_per_second.clamp(MIN_PIXELS_PER_SECOND, MAX_PIXELS_PER_SECOND))
    }

    pub fn pixels_per_second(self) -> f64 {
        self.0
    }

    pub fn to_seconds(self, pixels: f64) -> f64 {
        pixels / self.0
    }

    pub fn to_pixels(self, seconds: f64) -> f64 {
        seconds * self.0
    }

    /// Multiply the zoom, clamping to range.
    pub fn zoom(self, factor: f64) -> Self {
        Self::new(self.0 * factor)
    }
}

#[derive(Debug, Clone)]
struct Gesture {
    segment_id: SegmentId,
    side: TrimSide,
    origin_x: f64,
    base: TrimBase,
}

/// Pointer-driven trim gesture state machine.
///
/// `pointer_down` captures the gesture, `pointer_move` yields the trim to
/// apply, and `pointer_up`/`cancel` always release it.
#[derive(Debug, Default)]
pub struct TrimHandler {
    scale: TimelineScale,
    gesture: Option<Gesture>,
}

impl TrimHandler {
    pub fn new(scale: TimelineScale) -> Self {
        Self {
            scale,
            gesture: None,
        }
    }

    pub fn scale(&self) -> TimelineScale {
        self.scale
    }

    /// Changing zoom mid-gesture affects only later moves.
    pub fn set_scale(&mut self, scale: TimelineScale) {
        self.scale = scale;
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn active_segment(&self) -> Option<&str> {
        self.gesture.as_ref().map(|g| g.segment_id.as_str())
    }

    /// Begin a gesture. A gesture still in progress is replaced.
    pub fn pointer_down(&mut self, segment: &Segment, side: TrimSide, x: f64) {
        let base = TrimBase::of(segment);
        tracing::trace!(segment = %segment.id, ?side, ?base, "Trim gesture started");
        self.gesture = Some(Gesture {
            segment_id: segment.id.clone(),
            side,
            origin_x: x,
            base,
        });
    }

    /// Pointer moved to `x`. Returns the segment and trim to apply, or `None`
    /// outside a gesture.
    pub fn pointer_move(&self, x: f64) -> Option<(SegmentId, TrimResult)> {
        let gesture = self.gesture.as_ref()?;
        let delta = self.scale.to_seconds(x - gesture.origin_x);
        let result = compute_trim(gesture.side, gesture.base, delta);
        Some((gesture.segment_id.clone(), result))
    }

    /// End the gesture. Returns the final trim if a gesture was active.
    pub fn pointer_up(&mut self, x: f64) -> Option<(SegmentId, TrimResult)> {
        let result = self.pointer_move(x);
        self.gesture = None;
        result
    }

    /// Abandon the gesture without a final update.
    pub fn cancel(&mut self) {
        self.gesture = None;
    }
}

/// Numeric in-point edit. Keeps `end` and rederives `duration`.
pub fn set_start(segment: &Segment, start: f64) -> TrimResult {
    let base = TrimBase::of(segment);
    compute_trim(TrimSide::Left, base, start - base.start)
}

/// Numeric out-point edit. Keeps `start` and rederives `duration`.
pub fn set_end(segment: &Segment, end: f64) -> TrimResult {
    let base = TrimBase::of(segment);
    compute_trim(TrimSide::Right, base, end - base.end)
}

/// Numeric duration edit. Keeps `start` and moves `end`.
pub fn set_duration(segment: &Segment, duration: f64) -> TrimResult {
    let base = TrimBase::of(segment);
    set_end(segment, base.start + duration)
}

/// Patch for swapping in a new source. The clip is reset to the head of the
/// new material and shortened if the material is shorter than the segment.
pub fn replace_material(segment: &Segment, material: impl Into<String>, source_duration: Option<f64>) -> SegmentPatch {
    let length = match source_duration.filter(|d| d.is_finite() && *d > 0.0) {
        Some(src) => segment.duration.min(src),
        None => segment.duration,
    };
    SegmentPatch::new()
        .with_material(Some(material.into()))
        .with_start(Some(0.0))
        .with_end(Some(length))
        .with_duration(length)
}
