//! Shotlist CLI: command-line access to segment plans and renders.
//!
//! Usage:
//!   shotlist validate <PLAN>            Check a plan file offline
//!   shotlist signature <PLAN>           Print render and autosave signatures
//!   shotlist pull <TASK_ID>             Download a task's segment plan
//!   shotlist push <TASK_ID> <PLAN>      Replace a task's segment plan
//!   shotlist render <TASK_ID>           Render a preview, one segment, or the full video
//!   shotlist info <TASK_ID>             Show task and plan information

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use shotlist_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "shotlist",
    about = "Edit, validate and render shot-list sequences",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/shotlist/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend API base, including the /api prefix
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Preview,
    Single,
    Full,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a plan file
    Validate {
        /// Plan JSON (response envelope, plan object, or segment array)
        plan: PathBuf,

        /// Narration length to check the total duration against (seconds)
        #[arg(long)]
        audio_duration: Option<f64>,
    },

    /// Print the render and autosave signatures of a plan
    Signature {
        /// Plan JSON
        plan: PathBuf,

        /// Render parameters JSON (defaults to built-in parameters)
        #[arg(long)]
        params: Option<PathBuf>,
    },

    /// Download a task's segment plan
    Pull {
        task_id: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a plan file and save it as the task's segment plan
    Push {
        task_id: String,

        /// Plan JSON
        plan: PathBuf,

        /// Save even when validation fails
        #[arg(long)]
        force: bool,
    },

    /// Render the task's saved plan
    Render {
        task_id: String,

        /// Render fidelity
        #[arg(long, value_enum, default_value = "preview")]
        mode: ModeArg,

        /// Leading segments to include in a preview
        #[arg(long)]
        count: Option<usize>,

        /// Segment id for single-segment previews
        #[arg(long)]
        segment: Option<String>,
    },

    /// Show task and plan information
    Info { task_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if let Some(base) = cli.api_base {
        config.backend.api_base = base;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    shotlist_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Validate {
            plan,
            audio_duration,
        } => commands::validate::run(plan, audio_duration),
        Commands::Signature { plan, params } => commands::signature::run(plan, params),
        Commands::Pull { task_id, output } => commands::pull::run(&config, task_id, output).await,
        Commands::Push {
            task_id,
            plan,
            force,
        } => commands::push::run(&config, task_id, plan, force).await,
        Commands::Render {
            task_id,
            mode,
            count,
            segment,
        } => {
            let mode = match mode {
                ModeArg::Preview => commands::render::Target::Preview { count },
                ModeArg::Single => commands::render::Target::Single {
                    segment: segment
                        .ok_or_else(|| anyhow::anyhow!("--segment is required for single renders"))?,
                },
                ModeArg::Full => commands::render::Target::Full,
            };
            commands::render::run(&config, task_id, mode).await
        }
        Commands::Info { task_id } => commands::info::run(&config, task_id).await,
    }
}
