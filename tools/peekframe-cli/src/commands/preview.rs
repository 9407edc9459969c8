//! Run one preview cycle through the coordinator and ffmpeg backend.

use std::path::PathBuf;

use peekframe_backend::{FfmpegRenderBackend, RenderBackend};
use peekframe_common::config::AppConfig;
use peekframe_coordinator::{CoordinatorOptions, GenerationState, PreviewCoordinator};
use peekframe_model::PreviewArtifact;

pub async fn run(
    path: PathBuf,
    config_path: PathBuf,
    mode: String,
    time: f64,
    gpu: bool,
    output: PathBuf,
) -> anyhow::Result<()> {
    let backend = FfmpegRenderBackend::new();
    if !backend.is_available() {
        anyhow::bail!("ffmpeg/ffprobe not found in PATH");
    }

    let config = super::load_config(&config_path, gpu)?;
    let mode = super::parse_mode(&mode)?;

    if config.low_bitrate_warning() {
        eprintln!("[WARN] Bitrate may be too low for this frame rate and resolution");
    }

    let defaults = AppConfig::load().preview;
    let coordinator = PreviewCoordinator::new(backend, CoordinatorOptions::from(&defaults));
    coordinator.set_visible(true);
    coordinator.set_mode(mode);
    coordinator.set_source(path).await;
    coordinator.update_config(config);

    // A one-shot run has no edit burst to coalesce; force the cycle
    // instead of waiting out the debounce delay.
    if time > 0.0 {
        coordinator.seek(time).await;
    } else {
        coordinator.refresh().await;
    }

    let snapshot = coordinator.snapshot();
    match snapshot.state {
        GenerationState::Idle => {}
        GenerationState::Error(message) => anyhow::bail!("Preview failed: {message}"),
        other => anyhow::bail!("Preview did not complete (state: {other:?})"),
    }

    match snapshot.artifact {
        Some(PreviewArtifact::FramePair {
            original,
            processed,
        }) => {
            std::fs::create_dir_all(&output)?;
            let original_path = output.join("preview-original.png");
            let processed_path = output.join("preview-processed.png");
            std::fs::write(&original_path, original)?;
            std::fs::write(&processed_path, processed)?;
            println!("Original:  {}", original_path.display());
            println!("Processed: {}", processed_path.display());
        }
        Some(PreviewArtifact::VideoSegment { locator }) => {
            println!("Segment: {locator}");
        }
        None => anyhow::bail!("Preview completed without an artifact"),
    }

    if let Some(metadata) = snapshot.metadata {
        println!(
            "Source: {:.3}s {}x{}",
            metadata.duration_secs, metadata.width, metadata.height
        );
    }
    Ok(())
}
