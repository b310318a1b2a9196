//! Render the task's saved plan.

use shotlist_common::config::AppConfig;
use shotlist_sequence_engine::editor::{EditorOptions, SequenceEditor};
use shotlist_sequence_engine::queue::{JobOutcome, SubmitOutcome};

use super::connect;

pub enum Target {
    Preview { count: Option<usize> },
    Single { segment: String },
    Full,
}

pub async fn run(config: &AppConfig, task_id: String, target: Target) -> anyhow::Result<()> {
    let backend = connect(config)?;
    let (editor, _events) =
        SequenceEditor::load(backend, task_id, EditorOptions::from(&config.editor)).await?;

    if let Some(block) = editor.render_blocker() {
        for message in editor.validation().messages() {
            println!("  - {message}");
        }
        anyhow::bail!("Cannot render: {block}");
    }

    let submitted = match target {
        Target::Preview { count } => editor.preview(count).await?,
        Target::Single { segment } => editor.preview_segment(&segment).await?,
        Target::Full => editor.render_full().await?,
    };

    let ticket = match submitted {
        SubmitOutcome::Cached { url } => {
            println!("{url}");
            return Ok(());
        }
        SubmitOutcome::Queued(ticket) => ticket,
    };

    println!("Rendering (job {})...", ticket.job_id);
    let outcome = tokio::select! {
        outcome = ticket.wait() => outcome,
        _ = tokio::signal::ctrl_c() => {
            editor.cancel_render().await?;
            JobOutcome::Cancelled
        }
    };

    match outcome {
        JobOutcome::Succeeded { url: Some(url) } => {
            println!("{url}");
            Ok(())
        }
        JobOutcome::Succeeded { url: None } => {
            println!("Render finished but the backend returned no video URL.");
            Ok(())
        }
        JobOutcome::Failed { error, retryable } => {
            if retryable {
                anyhow::bail!("Render failed (retryable): {error}")
            }
            anyhow::bail!("Render failed: {error}")
        }
        JobOutcome::Cancelled => anyhow::bail!("Render cancelled"),
    }
}
