//! Normalize a configuration payload into the canonical shape.

use std::path::PathBuf;

pub fn run(config_path: PathBuf, gpu: bool) -> anyhow::Result<()> {
    let config = super::load_config(&config_path, gpu)?;

    if config.low_bitrate_warning() {
        eprintln!("[WARN] Bitrate may be too low for this frame rate and resolution");
    }

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
