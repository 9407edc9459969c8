//! Print source video metadata.

use std::path::PathBuf;

use peekframe_backend::{FfmpegRenderBackend, RenderBackend};

pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    let backend = FfmpegRenderBackend::new();
    if !backend.is_available() {
        anyhow::bail!("ffmpeg/ffprobe not found in PATH");
    }

    let metadata = backend
        .get_video_metadata(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Probe failed: {e}"))?;

    println!("Source: {}", path.display());
    println!("  Duration: {:.3}s", metadata.duration_secs);
    println!("  Resolution: {}x{}", metadata.width, metadata.height);
    Ok(())
}
