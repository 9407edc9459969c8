//! Print the fingerprint for a preview request.

use std::path::PathBuf;

use peekframe_model::PreviewFingerprint;

pub fn run(
    path: PathBuf,
    config_path: PathBuf,
    mode: String,
    time: f64,
    gpu: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(&config_path, gpu)?;
    let mode = super::parse_mode(&mode)?;

    let fingerprint =
        PreviewFingerprint::compute(&config, mode, time, &path.to_string_lossy());
    println!("{fingerprint}");
    Ok(())
}
