//! Show task and plan information.

use shotlist_common::config::AppConfig;
use shotlist_sequence_engine::editor::{EditorOptions, SequenceEditor};

use super::connect;

pub async fn run(config: &AppConfig, task_id: String) -> anyhow::Result<()> {
    let backend = connect(config)?;
    let (editor, _events) =
        SequenceEditor::load(backend, task_id, EditorOptions::from(&config.editor)).await?;

    println!("Task: {}", editor.task_id());
    match editor.audio_duration() {
        Some(audio) => println!("  Narration: {audio:.2}s"),
        None => println!("  Narration: unknown"),
    }
    println!("  Generating: {}", editor.is_disabled_externally());
    println!();

    let params = editor.render_params();
    println!("Render params:");
    println!(
        "  Subtitles: {} ({:?}, {}px, {})",
        params.subtitle_enabled, params.subtitle_position, params.font_size, params.font_name
    );
    println!(
        "  Music: volume {} fade {}s/{}s",
        params.bgm_volume, params.bgm_fade_in_sec, params.bgm_fade_out_sec
    );
    println!("  Fonts available: {}", editor.fonts().len());
    println!();

    let segments = editor.segments();
    println!("Segments: {}", segments.len());
    for segment in segments {
        println!(
            "  {:>3}. {:<12} {:>6.2}s  {}",
            segment.order,
            segment.id,
            segment.duration,
            segment.scene_title.as_deref().unwrap_or("-")
        );
    }
    println!();

    let report = editor.validation();
    if report.is_valid() {
        println!("Validation: ok");
    } else {
        println!("Validation:");
        for message in report.messages() {
            println!("  - {message}");
        }
    }
    Ok(())
}
