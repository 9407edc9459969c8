//! Preview request fingerprinting.
//!
//! A fingerprint is a stable text key over every input that affects the
//! rendered output, used to detect "nothing relevant changed" without
//! re-calling the backend. It deliberately excludes transient UI state
//! (loading/error flags) so that the act of rendering never perturbs its
//! own trigger key. It is not a digest; the field domain is small enough
//! that collisions are not a concern.

use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::encoding::EncodingConfiguration;

/// Which kind of preview the panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Before/after still frame pair.
    Frame,
    /// Short transcoded video segment.
    Video,
}

impl PreviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewMode::Frame => "frame",
            PreviewMode::Video => "video",
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, order-sensitive comparison key for a preview request.
///
/// Two fingerprints are equal iff their source fields are equal
/// field-for-field, including filter ordering. Reordering enabled filters
/// without changing membership changes the key; that is intentional, since
/// filter order may affect backend output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewFingerprint(String);

impl PreviewFingerprint {
    /// Compute the fingerprint for one evaluation cycle.
    ///
    /// Serialization order is fixed: codec, crf, fps, resolution, filters
    /// (comma-joined, in order), resample flag, resample intensity,
    /// bitrate, preset, gpu flag, mode, time (ms precision), source path.
    pub fn compute(
        config: &EncodingConfiguration,
        mode: PreviewMode,
        time_secs: f64,
        source_path: &str,
    ) -> Self {
        let mut key = String::with_capacity(128);
        let _ = write!(
            key,
            "codec={}|crf={}|fps={}|res={}|filters={}|resample={}|intensity={}|bitrate={}|preset={}|gpu={}|mode={}|time={:.3}|src={}",
            config.codec,
            config.crf,
            config.fps,
            config.resolution,
            config.filters.join(","),
            config.resample,
            config.resample_intensity,
            config.bitrate.as_deref().unwrap_or(""),
            config.preset.as_deref().unwrap_or(""),
            config.use_gpu,
            mode,
            time_secs,
            source_path,
        );
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config_with_filters(filters: &[&str]) -> EncodingConfiguration {
        EncodingConfiguration {
            codec: "h264".to_string(),
            crf: "23".to_string(),
            fps: "30".to_string(),
            resolution: "1920x1080".to_string(),
            filters: filters.iter().map(|f| f.to_string()).collect(),
            resample: false,
            resample_intensity: 0.0,
            bitrate: Some("8".to_string()),
            preset: Some("medium".to_string()),
            use_gpu: false,
        }
    }

    #[test]
    fn identical_inputs_give_identical_keys() {
        let config = config_with_filters(&["denoise", "sharpen"]);
        let a = PreviewFingerprint::compute(&config, PreviewMode::Frame, 1.5, "/tmp/in.mp4");
        let b = PreviewFingerprint::compute(&config, PreviewMode::Frame, 1.5, "/tmp/in.mp4");
        assert_eq!(a, b);
    }

    #[test]
    fn filter_order_is_significant() {
        let forward = config_with_filters(&["denoise", "sharpen"]);
        let reversed = config_with_filters(&["sharpen", "denoise"]);
        let a = PreviewFingerprint::compute(&forward, PreviewMode::Frame, 0.0, "/tmp/in.mp4");
        let b = PreviewFingerprint::compute(&reversed, PreviewMode::Frame, 0.0, "/tmp/in.mp4");
        assert_ne!(a, b);
    }

    #[test]
    fn mode_time_and_path_participate() {
        let config = config_with_filters(&[]);
        let base = PreviewFingerprint::compute(&config, PreviewMode::Frame, 0.0, "/tmp/in.mp4");
        let video = PreviewFingerprint::compute(&config, PreviewMode::Video, 0.0, "/tmp/in.mp4");
        let seeked = PreviewFingerprint::compute(&config, PreviewMode::Frame, 2.0, "/tmp/in.mp4");
        let moved = PreviewFingerprint::compute(&config, PreviewMode::Frame, 0.0, "/tmp/other.mp4");
        assert_ne!(base, video);
        assert_ne!(base, seeked);
        assert_ne!(base, moved);
    }

    #[test]
    fn absent_optionals_serialize_as_empty() {
        let mut config = config_with_filters(&[]);
        config.bitrate = None;
        config.preset = None;
        let fp = PreviewFingerprint::compute(&config, PreviewMode::Frame, 0.0, "/tmp/in.mp4");
        assert!(fp.as_str().contains("bitrate=|preset=|"));
    }

    proptest! {
        #[test]
        fn any_single_field_change_changes_the_key(
            crf in "[0-9]{1,2}",
            other_crf in "[0-9]{1,2}",
            time in 0.0f64..3600.0,
        ) {
            let mut config = config_with_filters(&["denoise"]);
            config.crf = crf.clone();
            let a = PreviewFingerprint::compute(&config, PreviewMode::Frame, time, "/tmp/in.mp4");
            config.crf = other_crf.clone();
            let b = PreviewFingerprint::compute(&config, PreviewMode::Frame, time, "/tmp/in.mp4");
            if crf == other_crf {
                prop_assert_eq!(a, b);
            } else {
                prop_assert_ne!(a, b);
            }
        }
    }
}
