//! Download a task's segment plan.

use std::path::PathBuf;

use anyhow::Context;

use shotlist_common::config::AppConfig;
use shotlist_sequence_model::PlanData;

use super::connect;

pub async fn run(config: &AppConfig, task_id: String, output: Option<PathBuf>) -> anyhow::Result<()> {
    let backend = connect(config)?;
    let segments = backend.fetch_plan(&task_id).await?;
    tracing::info!(task_id = %task_id, segments = segments.len(), "Plan fetched");

    let plan = PlanData {
        task_id: Some(task_id),
        segments,
    };
    let json = serde_json::to_string_pretty(&plan)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} segment(s) to {}", plan.segments.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
