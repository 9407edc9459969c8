//! Check system capabilities.

use peekframe_backend::{FfmpegRenderBackend, RenderBackend};

pub fn run() -> anyhow::Result<()> {
    println!("Peekframe System Check");
    println!("{}", "=".repeat(50));

    let backend = FfmpegRenderBackend::new();
    if backend.is_available() {
        println!("[OK] Render backend: {}", backend.name());
        println!();
        println!("All required capabilities are available. Peekframe is ready.");
    } else {
        println!("[MISSING] ffmpeg/ffprobe not found in PATH");
        println!();
        println!("Install ffmpeg (which bundles ffprobe) and re-run this check.");
    }

    Ok(())
}
