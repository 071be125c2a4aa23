//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the detection config for this invocation
//! - `open_store` - Open the pattern store in the data directory
//! - `resolve_pattern` - Find a stored pattern from user input

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use recur_core::config::{default_data_dir, DetectionConfig};
use recur_core::{FileStore, KeyValueStore, PatternStore, RecurringExpensePattern};
use tracing::debug;

/// Minimum length of an id prefix accepted in place of a full id
const MIN_ID_PREFIX: usize = 4;

/// Resolve the data directory (explicit flag, then platform default)
pub fn resolve_data_dir(data_dir: Option<&Path>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_data_dir()
            .ok_or_else(|| anyhow!("No data directory available, pass --data-dir")),
    }
}

/// Load the detection config
///
/// An explicit `--config` wins; otherwise `<data-dir>/config/detection.toml`
/// is used when present, falling back to built-in defaults.
pub fn load_config(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<DetectionConfig> {
    let path = match (config_path, data_dir) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, Some(dir)) => Some(dir.join("config").join("detection.toml")),
        (None, None) => None,
    };

    DetectionConfig::load(path.as_deref()).context("Failed to load detection config")
}

/// Open the pattern store in the data directory
pub fn open_store(
    data_dir: Option<&Path>,
    config: &DetectionConfig,
) -> Result<PatternStore<FileStore>> {
    let dir = resolve_data_dir(data_dir)?;
    debug!("Opening pattern store in {}", dir.display());
    let backend = FileStore::new(dir.clone())
        .with_context(|| format!("Failed to open pattern store in {}", dir.display()))?;
    Ok(PatternStore::with_merge_tolerance(
        backend,
        config.merge_amount_tolerance,
    ))
}

/// Find a stored pattern by id, unique id prefix, or exact description
pub fn resolve_pattern<S: KeyValueStore>(
    store: &PatternStore<S>,
    input: &str,
) -> Result<RecurringExpensePattern> {
    let input = input.trim();
    let patterns = store.load_patterns();

    if let Some(p) = patterns.iter().find(|p| p.id == input) {
        return Ok(p.clone());
    }

    let mut candidates: Vec<&RecurringExpensePattern> = if input.len() >= MIN_ID_PREFIX {
        patterns.iter().filter(|p| p.id.starts_with(input)).collect()
    } else {
        Vec::new()
    };

    if candidates.is_empty() {
        candidates = patterns
            .iter()
            .filter(|p| p.description.eq_ignore_ascii_case(input))
            .collect();
    }

    match candidates.as_slice() {
        [] => bail!("Pattern not found: {}", input),
        [only] => Ok((*only).clone()),
        many => bail!(
            "'{}' matches {} patterns, use a longer id: {}",
            input,
            many.len(),
            many.iter()
                .map(|p| p.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
