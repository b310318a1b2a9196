//! Print the render and autosave signatures of a plan.

use std::path::PathBuf;

use anyhow::Context;

use shotlist_sequence_engine::signature::{dirty_signature, render_signature};
use shotlist_sequence_model::{normalize_orders, RenderParams};

use super::load_plan;

pub fn run(path: PathBuf, params: Option<PathBuf>) -> anyhow::Result<()> {
    let mut segments = load_plan(&path)?;
    normalize_orders(&mut segments);

    let params = match params {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read params {}", path.display()))?;
            serde_json::from_str::<RenderParams>(&content)
                .with_context(|| format!("{} is not a render parameter object", path.display()))?
        }
        None => RenderParams::default(),
    };

    let render = render_signature(&segments, &params)?;
    let dirty = dirty_signature(&segments)?;

    println!("Segments: {}", segments.len());
    println!("Render signature:   {render}");
    println!("Autosave signature: {dirty}");
    Ok(())
}
