//! Error types shared across Peekframe crates.

use std::path::PathBuf;

/// Top-level error type for Peekframe operations.
#[derive(Debug, thiserror::Error)]
pub enum PeekframeError {
    #[error("Metadata fetch error: {message}")]
    MetadataFetch { message: String },

    #[error("Frame fetch error: {message}")]
    FrameFetch { message: String },

    #[error("Video segment error: {message}")]
    VideoSegment { message: String },

    #[error("Playback decode error: {message}")]
    PlaybackDecode { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PeekframeError.
pub type PeekframeResult<T> = Result<T, PeekframeError>;

impl PeekframeError {
    pub fn metadata_fetch(msg: impl Into<String>) -> Self {
        Self::MetadataFetch {
            message: msg.into(),
        }
    }

    pub fn frame_fetch(msg: impl Into<String>) -> Self {
        Self::FrameFetch {
            message: msg.into(),
        }
    }

    pub fn video_segment(msg: impl Into<String>) -> Self {
        Self::VideoSegment {
            message: msg.into(),
        }
    }

    pub fn playback_decode(msg: impl Into<String>) -> Self {
        Self::PlaybackDecode {
            message: msg.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}
