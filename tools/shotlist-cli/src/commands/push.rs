//! Replace a task's segment plan.

use std::path::PathBuf;

use shotlist_common::config::AppConfig;
use shotlist_sequence_engine::store::SegmentStore;
use shotlist_sequence_engine::validation::validate_sequence;

use super::{connect, load_plan};

pub async fn run(
    config: &AppConfig,
    task_id: String,
    path: PathBuf,
    force: bool,
) -> anyhow::Result<()> {
    let mut store = SegmentStore::new(Vec::new());
    store.replace_all(load_plan(&path)?)?;

    let backend = connect(config)?;
    let task = backend.fetch_task(&task_id).await?;
    if task.is_processing() {
        anyhow::bail!("Task {task_id} is still being generated; try again later");
    }

    let report = validate_sequence(store.segments(), task.audio_duration);
    if !report.is_valid() {
        for message in report.messages() {
            println!("  - {message}");
        }
        if !force {
            anyhow::bail!("Plan is invalid; pass --force to save anyway");
        }
        tracing::warn!(task_id = %task_id, "Saving an invalid plan");
    }

    backend.save_segments(&task_id, store.segments()).await?;
    println!("Saved {} segment(s) to task {task_id}", store.len());
    Ok(())
}
