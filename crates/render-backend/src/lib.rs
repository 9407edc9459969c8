//! Peekframe Render Backend
//!
//! The boundary to the expensive rendering service. The coordinator only
//! ever talks to the [`RenderBackend`] trait; the shipped implementation
//! shells out to ffmpeg/ffprobe.

pub mod ffmpeg;

pub use ffmpeg::FfmpegRenderBackend;

use std::path::Path;

use peekframe_common::error::PeekframeResult;
use peekframe_model::{EncodingConfiguration, VideoMetadata};

/// Abstract interface to the rendering service.
#[async_trait::async_trait]
pub trait RenderBackend: Send + Sync {
    /// Probe source metadata (duration and dimensions).
    async fn get_video_metadata(&self, source: &Path) -> PeekframeResult<VideoMetadata>;

    /// Render a single still at `time_secs` with the given configuration.
    /// Returns encoded image bytes.
    async fn get_preview_frame(
        &self,
        source: &Path,
        time_secs: f64,
        config: &EncodingConfiguration,
    ) -> PeekframeResult<Vec<u8>>;

    /// Transcode a short segment starting at `time_secs` with the given
    /// configuration. Returns a filesystem locator; callers treat an empty
    /// or whitespace-only locator as failure.
    async fn get_preview_video_segment(
        &self,
        source: &Path,
        time_secs: f64,
        duration_secs: f64,
        config: &EncodingConfiguration,
    ) -> PeekframeResult<String>;

    /// Check whether this backend can run on the current system.
    fn is_available(&self) -> bool;

    /// Backend name for logs.
    fn name(&self) -> &str;
}
