use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use shader_timeline_core::{
    EditScript, EditorConfig, EditorSession, RulerGenerator, ScriptRunner, TimelineError,
};
use tracing_subscriber::EnvFilter;

fn main() -> shader_timeline_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ruler {
            duration,
            zoom,
            config,
        } => run_ruler(duration, zoom, config.as_deref()),
        Commands::Replay {
            script,
            output,
            config,
        } => run_replay(&script, output.as_deref(), config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> shader_timeline_core::Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::from_path(path),
        None => Ok(EditorConfig::default()),
    }
}

fn run_ruler(duration: f64, zoom: f64, config: Option<&Path>) -> shader_timeline_core::Result<()> {
    if !(duration >= 0.0) {
        return Err(TimelineError::InvalidInput("duration must be non-negative"));
    }
    let config = load_config(config)?;
    let zoom = zoom.clamp(config.zoom.min, config.zoom.max);
    tracing::info!(duration, zoom, "generating ruler");

    let generator = RulerGenerator::new(config.ruler, config.zoom.pixels_per_second);
    let ruler = generator.generate(duration, zoom, None);
    println!("{}", serde_json::to_string_pretty(&ruler)?);
    Ok(())
}

fn run_replay(
    script: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> shader_timeline_core::Result<()> {
    tracing::info!(?script, ?output, "replaying edit script");
    let config = load_config(config)?;
    let script = EditScript::from_path(script)?;

    let mut runner = ScriptRunner::new(EditorSession::new(config)?);
    runner.run(&script)?;
    let manifest = runner.session_mut().render_manifest()?;
    let json = manifest.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(?path, "render manifest written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Timeline engine for the shader video editor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the ruler tick tiers for a duration and zoom level.
    Ruler {
        /// Timeline duration in seconds.
        #[arg(short, long)]
        duration: f64,
        /// Zoom factor, clamped to the configured bounds.
        #[arg(short, long, default_value_t = 1.0)]
        zoom: f64,
        /// Optional JSON editor config.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Replay an edit script and emit the resulting render manifest.
    Replay {
        /// Path to the JSON edit script.
        script: PathBuf,
        /// Where to write the manifest; printed to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Optional JSON editor config.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
