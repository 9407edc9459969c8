//! Peekframe CLI: probe sources, inspect fingerprints, run preview cycles.
//!
//! Usage:
//!   peekframe probe <PATH>           Print source video metadata
//!   peekframe normalize [OPTIONS]    Normalize a configuration payload
//!   peekframe fingerprint [OPTIONS]  Print the fingerprint for a request
//!   peekframe preview [OPTIONS]      Run one preview cycle end to end
//!   peekframe check                  Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "peekframe",
    about = "Live encode previews without flooding the render backend",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print source video metadata
    Probe {
        /// Path to the source video
        path: PathBuf,
    },

    /// Normalize a configuration payload into the canonical shape
    Normalize {
        /// Path to a configuration JSON file (either shape)
        #[arg(short, long)]
        config: PathBuf,

        /// Prefer GPU encoding
        #[arg(long)]
        gpu: bool,
    },

    /// Print the fingerprint for a preview request
    Fingerprint {
        /// Path to the source video
        path: PathBuf,

        /// Path to a configuration JSON file (either shape)
        #[arg(short, long)]
        config: PathBuf,

        /// Preview mode: frame|video
        #[arg(short, long, default_value = "frame")]
        mode: String,

        /// Playback time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f64,

        /// Prefer GPU encoding
        #[arg(long)]
        gpu: bool,
    },

    /// Run one preview cycle through the coordinator and ffmpeg backend
    Preview {
        /// Path to the source video
        path: PathBuf,

        /// Path to a configuration JSON file (either shape)
        #[arg(short, long)]
        config: PathBuf,

        /// Preview mode: frame|video
        #[arg(short, long, default_value = "frame")]
        mode: String,

        /// Playback time in seconds
        #[arg(short, long, default_value = "0.0")]
        time: f64,

        /// Prefer GPU encoding
        #[arg(long)]
        gpu: bool,

        /// Directory for frame-pair output files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    peekframe_common::logging::init_logging(&peekframe_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Probe { path } => commands::probe::run(path).await,
        Commands::Normalize { config, gpu } => commands::normalize::run(config, gpu),
        Commands::Fingerprint {
            path,
            config,
            mode,
            time,
            gpu,
        } => commands::fingerprint::run(path, config, mode, time, gpu),
        Commands::Preview {
            path,
            config,
            mode,
            time,
            gpu,
            output,
        } => commands::preview::run(path, config, mode, time, gpu, output).await,
        Commands::Check => commands::check::run(),
    }
}
