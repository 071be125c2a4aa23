//! Detection command implementations

use std::path::Path;

use anyhow::{Context, Result};
use recur_core::{
    load_expenses, DetectionConfig, KeyValueStore, PatternDetector, PatternStore,
    RecurringExpensePattern,
};

use super::{print_patterns, Output};

/// Detect patterns and merge new ones into the store
pub fn cmd_detect<S: KeyValueStore>(
    store: &PatternStore<S>,
    expenses_path: &Path,
    config: &DetectionConfig,
    output: Output,
) -> Result<()> {
    let detected = detect_from_file(expenses_path, config)?;
    let before = store.load_patterns().len();
    let merged = store.sync_detected(detected.clone());
    let added = merged.len().saturating_sub(before);

    if output.json {
        println!("{}", serde_json::to_string_pretty(&detected)?);
        return Ok(());
    }

    println!();
    println!(
        "🔍 Detected {} recurring patterns, {} new",
        detected.len(),
        added
    );
    if !detected.is_empty() {
        print_patterns(&detected);
    }
    if added > 0 {
        println!();
        println!("Review new patterns with:");
        println!("  recur confirm <id>   or   recur dismiss <id>");
    }

    Ok(())
}

/// Detect patterns without touching the store
pub fn cmd_detect_dry_run(
    expenses_path: &Path,
    config: &DetectionConfig,
    output: Output,
) -> Result<()> {
    let detected = detect_from_file(expenses_path, config)?;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&detected)?);
        return Ok(());
    }

    println!();
    println!("🔍 Detected {} recurring patterns (dry run)", detected.len());
    if !detected.is_empty() {
        print_patterns(&detected);
    }

    Ok(())
}

fn detect_from_file(
    expenses_path: &Path,
    config: &DetectionConfig,
) -> Result<Vec<RecurringExpensePattern>> {
    let expenses = load_expenses(expenses_path)
        .with_context(|| format!("Failed to load expenses from {}", expenses_path.display()))?;

    let detector = PatternDetector::with_config(config.clone());
    Ok(detector.detect(&expenses))
}
