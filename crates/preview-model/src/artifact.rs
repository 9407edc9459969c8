//! Preview artifacts and source metadata.

use serde::{Deserialize, Serialize};

use crate::fingerprint::PreviewMode;

/// Rendered preview output produced by the backend.
///
/// Exactly one mode's artifact is retained at a time; switching modes
/// discards the other mode's artifact to bound memory.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewArtifact {
    /// Two independently rendered stills for the same time: one with the
    /// neutral baseline configuration, one with the full configuration.
    FramePair {
        original: Vec<u8>,
        processed: Vec<u8>,
    },
    /// A playable reference to a short transcoded clip.
    VideoSegment { locator: String },
}

impl PreviewArtifact {
    /// Which preview mode this artifact belongs to.
    pub fn mode(&self) -> PreviewMode {
        match self {
            PreviewArtifact::FramePair { .. } => PreviewMode::Frame,
            PreviewArtifact::VideoSegment { .. } => PreviewMode::Video,
        }
    }
}

/// Source video metadata, fetched once per distinct source path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_reports_its_mode() {
        let pair = PreviewArtifact::FramePair {
            original: vec![1],
            processed: vec![2],
        };
        let segment = PreviewArtifact::VideoSegment {
            locator: "/tmp/seg.mp4".to_string(),
        };
        assert_eq!(pair.mode(), PreviewMode::Frame);
        assert_eq!(segment.mode(), PreviewMode::Video);
    }
}
