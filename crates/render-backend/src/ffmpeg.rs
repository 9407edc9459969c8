//! ffmpeg/ffprobe render backend.
//!
//! Each call builds an argument vector, runs the binary on a blocking
//! worker, and maps failures into the caller-facing error taxonomy with
//! the stderr tail attached. Output files get unique names so a player
//! holding a previous segment open never sees a half-written replacement.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use peekframe_common::error::{PeekframeError, PeekframeResult};
use peekframe_model::{EncodingConfiguration, VideoMetadata};

use crate::RenderBackend;

/// Render backend shelling out to system ffmpeg/ffprobe.
pub struct FfmpegRenderBackend {
    work_dir: PathBuf,
    sequence: AtomicU64,
}

impl FfmpegRenderBackend {
    /// Backend writing outputs under the system temp directory.
    pub fn new() -> Self {
        Self::with_work_dir(std::env::temp_dir().join("peekframe"))
    }

    /// Backend writing outputs under the given directory.
    pub fn with_work_dir(work_dir: PathBuf) -> Self {
        Self {
            work_dir,
            sequence: AtomicU64::new(0),
        }
    }

    fn next_output_path(&self, stem: &str, ext: &str) -> PeekframeResult<PathBuf> {
        std::fs::create_dir_all(&self.work_dir)?;
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .work_dir
            .join(format!("{}-{}-{}.{}", stem, std::process::id(), seq, ext)))
    }
}

impl Default for FfmpegRenderBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RenderBackend for FfmpegRenderBackend {
    async fn get_video_metadata(&self, source: &Path) -> PeekframeResult<VideoMetadata> {
        if !source.exists() {
            return Err(PeekframeError::FileNotFound {
                path: source.to_path_buf(),
            });
        }

        let path = source.to_path_buf();
        tokio::task::spawn_blocking(move || probe_metadata(&path))
            .await
            .map_err(|e| PeekframeError::metadata_fetch(format!("probe task failed: {e}")))?
    }

    async fn get_preview_frame(
        &self,
        source: &Path,
        time_secs: f64,
        config: &EncodingConfiguration,
    ) -> PeekframeResult<Vec<u8>> {
        let output = self.next_output_path("preview-frame", "png")?;
        let args = build_frame_args(source, time_secs, config, &output);

        tracing::debug!(time_secs, output = %output.display(), "Extracting preview frame");
        run_ffmpeg(args)
            .await
            .map_err(|e| PeekframeError::frame_fetch(e.to_string()))?;

        let bytes = std::fs::read(&output)
            .map_err(|e| PeekframeError::frame_fetch(format!("failed to read frame: {e}")))?;
        let _ = std::fs::remove_file(&output);
        Ok(bytes)
    }

    async fn get_preview_video_segment(
        &self,
        source: &Path,
        time_secs: f64,
        duration_secs: f64,
        config: &EncodingConfiguration,
    ) -> PeekframeResult<String> {
        let output = self.next_output_path("preview-segment", segment_extension(config))?;
        let args = build_segment_args(source, time_secs, duration_secs, config, &output);

        tracing::debug!(
            time_secs,
            duration_secs,
            output = %output.display(),
            "Transcoding preview segment"
        );
        run_ffmpeg(args)
            .await
            .map_err(|e| PeekframeError::video_segment(e.to_string()))?;

        Ok(output.to_string_lossy().into_owned())
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg") && command_exists("ffprobe")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Run ffmpeg to completion on a blocking worker, capturing stderr.
async fn run_ffmpeg(args: Vec<String>) -> PeekframeResult<()> {
    tokio::task::spawn_blocking(move || {
        tracing::debug!(?args, "Running ffmpeg");
        let output = Command::new("ffmpeg")
            .args(&args)
            .output()
            .map_err(|e| PeekframeError::backend(format!("failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PeekframeError::backend(format!(
                "ffmpeg failed (status {}): {}",
                output.status,
                stderr_excerpt(&stderr)
            )));
        }
        Ok(())
    })
    .await
    .map_err(|e| PeekframeError::backend(format!("ffmpeg task failed: {e}")))?
}

fn probe_metadata(source: &Path) -> PeekframeResult<VideoMetadata> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-show_entries",
            "format=duration",
            "-of",
            "json",
        ])
        .arg(source)
        .output()
        .map_err(|e| PeekframeError::metadata_fetch(format!("failed to start ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PeekframeError::metadata_fetch(stderr_excerpt(&stderr)));
    }

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| PeekframeError::metadata_fetch(format!("bad ffprobe output: {e}")))?;

    let stream = parsed["streams"]
        .get(0)
        .ok_or_else(|| PeekframeError::metadata_fetch("no video stream found"))?;
    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;
    let duration_secs = parsed["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    if width == 0 || height == 0 {
        return Err(PeekframeError::metadata_fetch(
            "could not decode stream dimensions",
        ));
    }

    Ok(VideoMetadata {
        duration_secs,
        width,
        height,
    })
}

/// Argument vector for a single-frame extract.
fn build_frame_args(
    source: &Path,
    time_secs: f64,
    config: &EncodingConfiguration,
    output: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{time_secs:.3}"),
        "-i".to_string(),
        source.to_string_lossy().into_owned(),
    ];

    if let Some(chain) = video_filter_chain(config) {
        args.push("-vf".to_string());
        args.push(chain);
    }

    args.push("-frames:v".to_string());
    args.push("1".to_string());
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Argument vector for a short segment transcode.
fn build_segment_args(
    source: &Path,
    time_secs: f64,
    duration_secs: f64,
    config: &EncodingConfiguration,
    output: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-ss".to_string(),
        format!("{time_secs:.3}"),
        "-t".to_string(),
        format!("{duration_secs:.3}"),
        "-i".to_string(),
        source.to_string_lossy().into_owned(),
    ];

    if let Some(chain) = video_filter_chain(config) {
        args.push("-vf".to_string());
        args.push(chain);
    }

    if let Some(encoder) = encoder_for(config) {
        args.push("-c:v".to_string());
        args.push(encoder.to_string());
    }

    if !config.crf.is_empty() {
        args.push("-crf".to_string());
        args.push(config.crf.clone());
    }

    if let Some(bitrate) = config.bitrate.as_deref().filter(|b| !b.is_empty()) {
        args.push("-maxrate".to_string());
        args.push(format!("{bitrate}M"));
        args.push("-bufsize".to_string());
        args.push(format!("{bitrate}M"));
    }

    if let Some(preset) = config.preset.as_deref() {
        args.push("-preset".to_string());
        args.push(preset.to_string());
    }

    // Frame-rate snap only when motion resampling is off; resampling is
    // handled inside the filter chain.
    if !config.resample && !config.fps.is_empty() {
        args.push("-r".to_string());
        args.push(config.fps.clone());
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

/// Build the `-vf` chain from the configuration, or None when no video
/// filtering is requested.
fn video_filter_chain(config: &EncodingConfiguration) -> Option<String> {
    let mut chain: Vec<String> = config
        .filters
        .iter()
        .map(|name| ffmpeg_filter(name).to_string())
        .collect();

    if let Some((w, h)) = parse_resolution(&config.resolution) {
        chain.push(format!("scale={w}:{h}"));
    }

    if config.resample && !config.fps.is_empty() {
        // Low intensity blends frames; high intensity runs full motion
        // compensation.
        let mi_mode = if config.resample_intensity >= 0.5 {
            "mci"
        } else {
            "blend"
        };
        chain.push(format!("minterpolate=fps={}:mi_mode={}", config.fps, mi_mode));
    }

    if chain.is_empty() {
        None
    } else {
        Some(chain.join(","))
    }
}

/// Map a panel filter name to its ffmpeg filter expression. Unknown names
/// pass through untouched so power users can type raw ffmpeg filters.
fn ffmpeg_filter(name: &str) -> &str {
    match name {
        "denoise" => "hqdn3d",
        "sharpen" => "unsharp",
        "deband" => "deband",
        "deinterlace" => "yadif",
        "grayscale" => "hue=s=0",
        other => other,
    }
}

/// Map the configured codec (and GPU preference) to an ffmpeg encoder.
fn encoder_for(config: &EncodingConfiguration) -> Option<&'static str> {
    match (config.codec.as_str(), config.use_gpu) {
        ("", _) => None,
        ("h264", false) => Some("libx264"),
        ("h264", true) => Some("h264_nvenc"),
        ("hevc", false) | ("h265", false) => Some("libx265"),
        ("hevc", true) | ("h265", true) => Some("hevc_nvenc"),
        ("vp9", _) => Some("libvpx-vp9"),
        ("av1", _) => Some("libsvtav1"),
        _ => None,
    }
}

fn segment_extension(config: &EncodingConfiguration) -> &'static str {
    match config.codec.as_str() {
        "vp9" => "webm",
        _ => "mp4",
    }
}

fn parse_resolution(resolution: &str) -> Option<(u32, u32)> {
    let (w, h) = resolution.split_once('x')?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Last few stderr lines; ffmpeg puts the actionable message at the end.
fn stderr_excerpt(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().rev().take(4).collect();
    lines
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join(" | ")
        .trim()
        .to_string()
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> EncodingConfiguration {
        EncodingConfiguration {
            codec: "h264".to_string(),
            crf: "23".to_string(),
            fps: "30".to_string(),
            resolution: "1280x720".to_string(),
            filters: vec!["denoise".to_string(), "sharpen".to_string()],
            resample: false,
            resample_intensity: 0.0,
            bitrate: Some("8".to_string()),
            preset: Some("medium".to_string()),
            use_gpu: false,
        }
    }

    #[test]
    fn frame_args_apply_filters_and_scale() {
        let args = build_frame_args(
            Path::new("/tmp/in.mp4"),
            1.25,
            &full_config(),
            Path::new("/tmp/out.png"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-ss 1.250"));
        assert!(joined.contains("hqdn3d,unsharp,scale=1280:720"));
        assert!(joined.contains("-frames:v 1"));
    }

    #[test]
    fn baseline_config_builds_no_filter_chain() {
        let args = build_frame_args(
            Path::new("/tmp/in.mp4"),
            0.0,
            &EncodingConfiguration::baseline(),
            Path::new("/tmp/out.png"),
        );
        assert!(!args.contains(&"-vf".to_string()));
    }

    #[test]
    fn segment_args_cover_codec_rate_and_preset() {
        let args = build_segment_args(
            Path::new("/tmp/in.mp4"),
            2.0,
            3.0,
            &full_config(),
            Path::new("/tmp/out.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-t 3.000"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-crf 23"));
        assert!(joined.contains("-maxrate 8M"));
        assert!(joined.contains("-preset medium"));
        assert!(joined.contains("-r 30"));
    }

    #[test]
    fn gpu_preference_switches_encoder() {
        let mut config = full_config();
        config.use_gpu = true;
        assert_eq!(encoder_for(&config), Some("h264_nvenc"));
        config.codec = "hevc".to_string();
        assert_eq!(encoder_for(&config), Some("hevc_nvenc"));
        config.codec = String::new();
        assert_eq!(encoder_for(&config), None);
    }

    #[test]
    fn resample_uses_motion_interpolation_instead_of_rate_snap() {
        let mut config = full_config();
        config.resample = true;
        config.resample_intensity = 0.8;
        let args = build_segment_args(
            Path::new("/tmp/in.mp4"),
            0.0,
            3.0,
            &config,
            Path::new("/tmp/out.mp4"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("minterpolate=fps=30:mi_mode=mci"));
        assert!(!joined.contains("-r 30"));
    }

    #[test]
    fn resolution_parsing_rejects_garbage() {
        assert_eq!(parse_resolution("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_resolution(""), None);
        assert_eq!(parse_resolution("1920"), None);
        assert_eq!(parse_resolution("0x1080"), None);
    }

    #[test]
    fn stderr_excerpt_keeps_the_tail() {
        let stderr = "a\nb\nc\nd\ne\nlast line";
        let excerpt = stderr_excerpt(stderr);
        assert!(excerpt.contains("last line"));
        assert!(!excerpt.contains("a | b"));
    }
}
