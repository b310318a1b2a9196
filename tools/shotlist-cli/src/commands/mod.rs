pub mod info;
pub mod pull;
pub mod push;
pub mod render;
pub mod signature;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use shotlist_common::config::AppConfig;
use shotlist_sequence_engine::backend::{Backend, HttpBackend};
use shotlist_sequence_model::{parse_envelope, PlanData, Segment};

/// Read a plan file. Accepts the backend's response envelope, a bare plan
/// object, or a plain segment array.
pub fn load_plan(path: &Path) -> anyhow::Result<Vec<Segment>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan {}", path.display()))?;

    if let Ok(plan) = parse_envelope::<PlanData>(&content) {
        return Ok(plan.segments);
    }
    if let Ok(plan) = serde_json::from_str::<PlanData>(&content) {
        return Ok(plan.segments);
    }
    serde_json::from_str::<Vec<Segment>>(&content)
        .with_context(|| format!("{} is not a segment plan", path.display()))
}

pub fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn Backend>> {
    let backend = HttpBackend::from_config(&config.backend)
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;
    tracing::debug!(api_base = backend.api_base(), "Backend configured");
    Ok(Arc::new(backend))
}
