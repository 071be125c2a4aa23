//! Config command implementations

use anyhow::{Context, Result};
use recur_core::DetectionConfig;

pub fn cmd_config_show(config: &DetectionConfig) -> Result<()> {
    let rendered = config
        .to_toml_string()
        .context("Failed to render detection config")?;
    print!("{}", rendered);
    Ok(())
}
