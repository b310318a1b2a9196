//! Content signatures for render caching and dirty tracking.
//!
//! A signature is the SHA-256 of a canonical JSON encoding. Field order is
//! fixed by the projection structs below, so equal inputs always hash the
//! same and descriptive fields (titles, shot notes) never participate.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use shotlist_sequence_model::{
    FitMode, RenderParams, Segment, StyleOverrides, Transition, TransitionDirection,
};

/// Hex-encoded SHA-256 content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields that change the rendered pixels.
#[derive(Serialize)]
struct RenderFields<'a> {
    id: &'a str,
    order: u32,
    duration: f64,
    start: Option<f64>,
    end: Option<f64>,
    speed: Option<f64>,
    transition: Option<Transition>,
    transition_duration: Option<f64>,
    transition_direction: Option<TransitionDirection>,
    transition_mask: Option<&'a str>,
    fit: Option<FitMode>,
    material: Option<&'a str>,
}

impl<'a> RenderFields<'a> {
    fn of(segment: &'a Segment) -> Self {
        Self {
            id: &segment.id,
            order: segment.order,
            duration: segment.duration,
            start: segment.start,
            end: segment.end,
            speed: segment.speed,
            transition: segment.transition,
            transition_duration: segment.transition_duration,
            transition_direction: segment.transition_direction,
            transition_mask: segment.transition_mask.as_deref(),
            fit: segment.fit,
            material: segment.material.as_deref(),
        }
    }
}

/// Render fields plus style overrides: everything autosave must persist.
#[derive(Serialize)]
struct DirtyFields<'a> {
    #[serde(flatten)]
    render: RenderFields<'a>,
    #[serde(flatten)]
    style: &'a StyleOverrides,
}

fn sha256_hex(parts: &[&[u8]]) -> Signature {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    Signature(format!("{:x}", hasher.finalize()))
}

/// Signature of a render request: segment render fields followed by the
/// resolved parameters.
pub fn render_signature(
    segments: &[Segment],
    params: &RenderParams,
) -> serde_json::Result<Signature> {
    let fields: Vec<RenderFields<'_>> = segments.iter().map(RenderFields::of).collect();
    let segments_json = serde_json::to_vec(&fields)?;
    let params_json = serde_json::to_vec(params)?;
    Ok(sha256_hex(&[
        segments_json.as_slice(),
        b"::".as_slice(),
        params_json.as_slice(),
    ]))
}

/// Signature used to decide whether the sequence has unsaved changes.
pub fn dirty_signature(segments: &[Segment]) -> serde_json::Result<Signature> {
    let fields: Vec<DirtyFields<'_>> = segments
        .iter()
        .map(|s| DirtyFields {
            render: RenderFields::of(s),
            style: &s.overrides,
        })
        .collect();
    let json = serde_json::to_vec(&fields)?;
    Ok(sha256_hex(&[json.as_slice()]))
}

/// Session-lifetime map from render signature to artifact URL.
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    entries: HashMap<Signature, String>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signature: &Signature) -> Option<&str> {
        self.entries.get(signature).map(String::as_str)
    }

    pub fn insert(&mut self, signature: Signature, url: impl Into<String>) {
        self.entries.insert(signature, url.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
