pub mod check;
pub mod fingerprint;
pub mod normalize;
pub mod preview;
pub mod probe;

use std::path::Path;

use peekframe_model::{ConfigPayload, EncodingConfiguration, PreviewMode};

/// Load and normalize a configuration file in either accepted shape.
pub fn load_config(path: &Path, gpu: bool) -> anyhow::Result<EncodingConfiguration> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let payload: ConfigPayload = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("Unrecognized configuration shape: {e}"))?;
    Ok(EncodingConfiguration::normalize(payload, gpu))
}

/// Parse a mode flag value.
pub fn parse_mode(mode: &str) -> anyhow::Result<PreviewMode> {
    match mode {
        "frame" => Ok(PreviewMode::Frame),
        "video" => Ok(PreviewMode::Video),
        other => anyhow::bail!("Unknown mode '{other}' (expected frame|video)"),
    }
}
