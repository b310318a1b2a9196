//! Validate a segment plan offline.

use std::path::PathBuf;

use shotlist_sequence_engine::validation::validate_sequence;
use shotlist_sequence_model::total_duration;

use super::load_plan;

pub fn run(path: PathBuf, audio_duration: Option<f64>) -> anyhow::Result<()> {
    println!("Validating plan at: {}", path.display());

    let segments = load_plan(&path)?;
    println!("  Segments: {}", segments.len());
    println!("  Total duration: {:.2}s", total_duration(&segments));
    if let Some(audio) = audio_duration {
        println!("  Narration: {audio:.2}s");
    }

    let report = validate_sequence(&segments, audio_duration);
    if report.is_valid() {
        println!("\nPlan is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    let messages = report.messages();
    for message in &messages {
        println!("  - {message}");
    }
    anyhow::bail!("{} issue(s) found", messages.len())
}
