//! Encoding configuration model and normalization.
//!
//! The host UI sends configuration in one of two shapes: the canonical
//! snake_case shape, or a legacy camelCase shape carrying filter objects
//! with individual enable flags. Both normalize into one immutable
//! [`EncodingConfiguration`] snapshot per evaluation cycle; a caller edit
//! always replaces the whole snapshot.

use serde::{Deserialize, Serialize};

/// Encoder preset assumed when a payload omits one.
pub const DEFAULT_PRESET: &str = "medium";

/// Canonical encoding configuration.
///
/// Numeric-looking fields (`crf`, `fps`, `bitrate`) stay string-encoded
/// exactly as the host UI sends them; they are parsed only where a numeric
/// comparison is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingConfiguration {
    /// Codec identifier (e.g. "h264", "hevc"). Empty = no codec override.
    pub codec: String,

    /// Constant rate factor.
    pub crf: String,

    /// Target frame rate.
    pub fps: String,

    /// Target resolution (e.g. "1920x1080"). Empty = keep source size.
    pub resolution: String,

    /// Enabled filter names, in application order.
    pub filters: Vec<String>,

    /// Whether resampling is enabled.
    #[serde(default)]
    pub resample: bool,

    /// Resampling intensity.
    #[serde(default)]
    pub resample_intensity: f64,

    /// Target bitrate in Mbps. None = CRF-only encoding.
    #[serde(default)]
    pub bitrate: Option<String>,

    /// Encoder preset.
    #[serde(default)]
    pub preset: Option<String>,

    /// Prefer GPU encoding.
    #[serde(default)]
    pub use_gpu: bool,
}

/// One filter entry in the legacy payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterToggle {
    pub name: String,
    pub enabled: bool,
}

/// Legacy camelCase payload with per-filter enable flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEncodingConfig {
    pub video_codec: String,
    pub crf_value: String,
    pub frame_rate: String,
    pub output_resolution: String,
    #[serde(default)]
    pub filters: Vec<FilterToggle>,
    #[serde(default)]
    pub resampling_enabled: bool,
    #[serde(default)]
    pub resampling_intensity: f64,
    #[serde(default)]
    pub bitrate_mbps: Option<String>,
    #[serde(default)]
    pub encoder_preset: Option<String>,
}

/// Either configuration shape, as received from the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigPayload {
    Canonical(EncodingConfiguration),
    Legacy(LegacyEncodingConfig),
}

impl EncodingConfiguration {
    /// Normalize either payload shape into a canonical snapshot.
    ///
    /// Enabled filter names keep their given order, the preset falls back
    /// to [`DEFAULT_PRESET`] when absent, and the separately-supplied GPU
    /// preference is folded in. Absent optional fields stay `None`; nothing
    /// else is invented.
    pub fn normalize(payload: ConfigPayload, use_gpu: bool) -> Self {
        match payload {
            ConfigPayload::Canonical(mut config) => {
                if config.preset.is_none() {
                    config.preset = Some(DEFAULT_PRESET.to_string());
                }
                config.use_gpu = use_gpu;
                config
            }
            ConfigPayload::Legacy(legacy) => Self {
                codec: legacy.video_codec,
                crf: legacy.crf_value,
                fps: legacy.frame_rate,
                resolution: legacy.output_resolution,
                filters: legacy
                    .filters
                    .into_iter()
                    .filter(|f| f.enabled)
                    .map(|f| f.name)
                    .collect(),
                resample: legacy.resampling_enabled,
                resample_intensity: legacy.resampling_intensity,
                bitrate: legacy.bitrate_mbps,
                preset: legacy
                    .encoder_preset
                    .or_else(|| Some(DEFAULT_PRESET.to_string())),
                use_gpu,
            },
        }
    }

    /// Neutral reference configuration used for the "original" frame of a
    /// before/after pair: fixed CRF, no filters, no codec override.
    pub fn baseline() -> Self {
        Self {
            codec: String::new(),
            crf: "18".to_string(),
            fps: String::new(),
            resolution: String::new(),
            filters: Vec::new(),
            resample: false,
            resample_intensity: 0.0,
            bitrate: None,
            preset: None,
            use_gpu: false,
        }
    }

    /// Whether the configured bitrate is likely too low for the target
    /// frame rate and resolution.
    ///
    /// Fires for high-motion targets only: fps >= 60, a 1080/1440/2160
    /// resolution, and a bitrate strictly between 0 and 6 Mbps.
    pub fn low_bitrate_warning(&self) -> bool {
        let fps = self.fps.parse::<f64>().unwrap_or(0.0);
        if fps < 60.0 {
            return false;
        }
        let high_res = ["1080", "1440", "2160"]
            .iter()
            .any(|tier| self.resolution.contains(tier));
        if !high_res {
            return false;
        }
        let bitrate = self
            .bitrate
            .as_deref()
            .and_then(|b| b.parse::<f64>().ok())
            .unwrap_or(0.0);
        bitrate > 0.0 && bitrate < 6.0
    }
}
