//! Segment and sequence validation.
//!
//! Checks are pure and deterministic. Every issue names the segment and the
//! field it concerns so a UI can highlight exactly that input.

use std::fmt;
use std::ops::RangeInclusive;

use shotlist_sequence_model::{Segment, SegmentId};

/// Allowed mismatch between `duration` and `end - start`, and between the
/// sequence length and the narration length.
pub const DURATION_TOLERANCE: f64 = 0.05;

pub const SPEED_RANGE: RangeInclusive<f64> = 0.75..=1.25;

pub const TRANSITION_DURATION_RANGE: RangeInclusive<f64> = 0.2..=2.0;

/// Segment field an issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentField {
    Duration,
    Start,
    End,
    Speed,
    TransitionDuration,
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Duration => "duration",
            Self::Start => "start",
            Self::End => "end",
            Self::Speed => "speed",
            Self::TransitionDuration => "transition_duration",
        };
        f.write_str(name)
    }
}

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// Zero, negative, NaN or infinite.
    NotPositive,
    NotFinite,
    /// Negative in-point.
    Negative,
    /// `end <= start`.
    EndBeforeStart,
    /// `|duration - (end - start)|` exceeds the tolerance.
    DurationMismatch { expected: f64 },
    OutOfRange { min: f64, max: f64 },
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub segment_id: SegmentId,
    /// Position in the sequence at validation time.
    pub index: usize,
    pub field: SegmentField,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment #{} ({}) {}: ", self.index + 1, self.segment_id, self.field)?;
        match &self.kind {
            IssueKind::NotPositive => write!(f, "must be greater than 0"),
            IssueKind::NotFinite => write!(f, "must be a finite number"),
            IssueKind::Negative => write!(f, "must not be negative"),
            IssueKind::EndBeforeStart => write!(f, "end must be after start"),
            IssueKind::DurationMismatch { expected } => write!(
                f,
                "does not match end - start ({expected:.3}s) within {DURATION_TOLERANCE}s"
            ),
            IssueKind::OutOfRange { min, max } => write!(f, "must be within [{min}, {max}]"),
        }
    }
}

/// Outcome of validating a whole sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<FieldIssue>,
    /// Seconds by which the sequence exceeds the narration, when it does so
    /// by more than the tolerance.
    pub audio_excess: Option<f64>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty() && self.audio_excess.is_none()
    }

    pub fn has_errors(&self) -> bool {
        !self.is_valid()
    }

    pub fn issues_for(&self, segment_id: &str) -> impl Iterator<Item = &FieldIssue> {
        let id = segment_id.to_string();
        self.issues.iter().filter(move |i| i.segment_id == id)
    }

    /// One line per problem, suitable for logs or CLI output.
    pub fn messages(&self) -> Vec<String> {
        let mut out: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        if let Some(excess) = self.audio_excess {
            out.push(format!(
                "sequence is {excess:.2}s longer than the narration (tolerance {DURATION_TOLERANCE}s)"
            ));
        }
        out
    }
}

/// Validate a single segment at `index`.
pub fn validate_segment(segment: &Segment, index: usize) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    let mut push = |field, kind| {
        issues.push(FieldIssue {
            segment_id: segment.id.clone(),
            index,
            field,
            kind,
        })
    };

    let duration = segment.duration;
    if !duration.is_finite() {
        push(SegmentField::Duration, IssueKind::NotFinite);
    } else if duration <= 0.0 {
        push(SegmentField::Duration, IssueKind::NotPositive);
    }

    if let Some(start) = segment.start {
        if !start.is_finite() {
            push(SegmentField::Start, IssueKind::NotFinite);
        } else if start < 0.0 {
            push(SegmentField::Start, IssueKind::Negative);
        }
    }
    if let Some(end) = segment.end {
        if !end.is_finite() {
            push(SegmentField::End, IssueKind::NotFinite);
        }
    }

    if let (Some(start), Some(end)) = (segment.start, segment.end) {
        if start.is_finite() && end.is_finite() {
            if end <= start {
                push(SegmentField::End, IssueKind::EndBeforeStart);
            } else if duration.is_finite() {
                let expected = end - start;
                if (duration - expected).abs() > DURATION_TOLERANCE {
                    push(SegmentField::Duration, IssueKind::DurationMismatch { expected });
                }
            }
        }
    }

    if let Some(speed) = segment.speed {
        if !SPEED_RANGE.contains(&speed) {
            push(
                SegmentField::Speed,
                IssueKind::OutOfRange {
                    min: *SPEED_RANGE.start(),
                    max: *SPEED_RANGE.end(),
                },
            );
        }
    }

    if let Some(td) = segment.transition_duration {
        if !TRANSITION_DURATION_RANGE.contains(&td) {
            push(
                SegmentField::TransitionDuration,
                IssueKind::OutOfRange {
                    min: *TRANSITION_DURATION_RANGE.start(),
                    max: *TRANSITION_DURATION_RANGE.end(),
                },
            );
        }
    }

    issues
}

/// Validate every segment plus the aggregate length against the narration.
///
/// The aggregate check only applies when `audio_duration` is positive.
pub fn validate_sequence(segments: &[Segment], audio_duration: Option<f64>) -> ValidationReport {
    let issues = segments
        .iter()
        .enumerate()
        .flat_map(|(index, segment)| validate_segment(segment, index))
        .collect();

    let audio_excess = audio_duration
        .filter(|audio| audio.is_finite() && *audio > 0.0)
        .and_then(|audio| {
            let total: f64 = segments.iter().map(|s| s.duration).filter(|d| d.is_finite()).sum();
            let excess = total - audio;
            (excess > DURATION_TOLERANCE).then_some(excess)
        });

    ValidationReport {
        issues,
        audio_excess,
    }
}
