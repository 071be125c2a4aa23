//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use recur_core::{DetectionConfig, FileStore, KeyValueStore, PatternStore};
use tempfile::TempDir;

use crate::commands::{self, truncate, Output};

const EXPENSES_CSV: &str = "\
id,description,amount,category,date
n1,Netflix,15.99,entertainment,2024-01-01
n2,Netflix,15.99,entertainment,2024-02-01
n3,Netflix,15.99,entertainment,2024-03-01
g1,Groceries,85.00,food,2024-01-15
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_store(dir: &TempDir) -> PatternStore<FileStore> {
    commands::open_store(Some(dir.path()), &DetectionConfig::default()).unwrap()
}

fn write_expenses(dir: &Path) -> PathBuf {
    let path = dir.join("expenses.csv");
    std::fs::write(&path, EXPENSES_CSV).unwrap();
    path
}

/// Run detection against the sample history, returning the stored Netflix pattern id
fn detect_netflix(dir: &TempDir, store: &PatternStore<FileStore>) -> String {
    let expenses = write_expenses(dir.path());
    commands::cmd_detect(
        store,
        &expenses,
        &DetectionConfig::default(),
        Output::default(),
    )
    .unwrap();

    let patterns = store.load_patterns();
    assert_eq!(patterns.len(), 1);
    patterns[0].id.clone()
}

// ========== Detect Command Tests ==========

#[test]
fn test_cmd_detect_stores_patterns() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    detect_netflix(&dir, &store);

    let patterns = store.load_patterns();
    assert_eq!(patterns[0].description, "Netflix");
    assert!(!patterns[0].is_confirmed);
    assert_eq!(patterns[0].next_expected_date, date(2024, 4, 1));
}

#[test]
fn test_cmd_detect_twice_does_not_duplicate() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    let expenses = write_expenses(dir.path());
    commands::cmd_detect(
        &store,
        &expenses,
        &DetectionConfig::default(),
        Output { json: true },
    )
    .unwrap();

    let patterns = store.load_patterns();
    assert_eq!(patterns.len(), 1);
    assert_eq!(patterns[0].id, id);
}

#[test]
fn test_cmd_detect_dry_run_leaves_store_empty() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let expenses = write_expenses(dir.path());

    commands::cmd_detect_dry_run(&expenses, &DetectionConfig::default(), Output::default())
        .unwrap();

    assert!(store.load_patterns().is_empty());
}

#[test]
fn test_cmd_detect_missing_file() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);

    let result = commands::cmd_detect(
        &store,
        &dir.path().join("missing.csv"),
        &DetectionConfig::default(),
        Output::default(),
    );
    assert!(result.is_err());
}

// ========== Pattern Command Tests ==========

#[test]
fn test_cmd_patterns_list_empty() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    assert!(commands::cmd_patterns_list(&store, Output::default()).is_ok());
    assert!(commands::cmd_patterns_list(&store, Output { json: true }).is_ok());
}

#[test]
fn test_cmd_confirm_by_id() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    commands::cmd_confirm(&store, &id).unwrap();
    assert!(store.get_pattern(&id).unwrap().is_confirmed);

    // Confirming again is a no-op
    assert!(commands::cmd_confirm(&store, &id).is_ok());
}

#[test]
fn test_cmd_confirm_by_prefix_and_description() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    commands::cmd_confirm(&store, &id[..8]).unwrap();
    assert!(store.get_pattern(&id).unwrap().is_confirmed);

    let resolved = commands::resolve_pattern(&store, "netflix").unwrap();
    assert_eq!(resolved.id, id);
}

#[test]
fn test_cmd_confirm_unknown_pattern() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    detect_netflix(&dir, &store);

    let err = commands::cmd_confirm(&store, "Spotify").unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_resolve_pattern_rejects_short_prefix() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    assert!(commands::resolve_pattern(&store, &id[..2]).is_err());
}

#[test]
fn test_cmd_dismiss() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    commands::cmd_dismiss(&store, &id).unwrap();
    assert!(store.load_patterns().is_empty());
    assert!(commands::cmd_dismiss(&store, &id).is_err());
}

/// Backend that reads the real store but rejects every write
struct ReadOnly(FileStore);

impl KeyValueStore for ReadOnly {
    fn name(&self) -> &str {
        "read-only"
    }

    fn get(&self, key: &str) -> recur_core::Result<Option<serde_json::Value>> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &serde_json::Value) -> recur_core::Result<()> {
        Err(recur_core::Error::Storage("read-only".to_string()))
    }
}

#[test]
fn test_lifecycle_commands_fail_when_store_is_not_written() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    let read_only = PatternStore::new(ReadOnly(FileStore::new(dir.path()).unwrap()));
    let err = commands::cmd_confirm(&read_only, &id).unwrap_err();
    assert!(err.to_string().contains("not updated"));
    assert!(commands::cmd_dismiss(&read_only, &id).is_err());
    assert!(commands::cmd_advance(&read_only, &id, Some("2024-04-03")).is_err());

    let pattern = store.get_pattern(&id).unwrap();
    assert!(!pattern.is_confirmed);
    assert_eq!(pattern.last_occurrence, date(2024, 3, 1));
}

#[test]
fn test_cmd_advance_with_date() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    commands::cmd_advance(&store, &id, Some("2024-04-03")).unwrap();

    let pattern = store.get_pattern(&id).unwrap();
    assert_eq!(pattern.last_occurrence, date(2024, 4, 3));
    assert_eq!(pattern.next_expected_date, date(2024, 5, 3));
}

#[test]
fn test_cmd_advance_invalid_date() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    assert!(commands::cmd_advance(&store, &id, Some("next tuesday")).is_err());
    assert_eq!(
        store.get_pattern(&id).unwrap().last_occurrence,
        date(2024, 3, 1)
    );
}

// ========== Upcoming Command Tests ==========

#[test]
fn test_upcoming_only_confirmed() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);

    let today = date(2024, 3, 20);
    assert!(commands::upcoming_within(&store, today, None).is_empty());

    commands::cmd_confirm(&store, &id).unwrap();
    let items = commands::upcoming_within(&store, today, None);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].days_until_due, 12);
    assert!(!items[0].is_overdue);

    assert!(commands::cmd_upcoming(&store, today, None, Output::default()).is_ok());
}

#[test]
fn test_upcoming_days_window_keeps_overdue() {
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let id = detect_netflix(&dir, &store);
    commands::cmd_confirm(&store, &id).unwrap();

    // Next expected is 2024-04-01
    assert!(commands::upcoming_within(&store, date(2024, 3, 1), Some(7)).is_empty());

    let overdue = commands::upcoming_within(&store, date(2024, 4, 10), Some(7));
    assert_eq!(overdue.len(), 1);
    assert!(overdue[0].is_overdue);
    assert_eq!(overdue[0].days_until_due, -9);
}

// ========== Config Tests ==========

#[test]
fn test_load_config_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let config = commands::load_config(None, Some(dir.path())).unwrap();
    assert_eq!(config, DetectionConfig::default());
    assert!(commands::cmd_config_show(&config).is_ok());
}

#[test]
fn test_load_config_from_data_dir() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("detection.toml"),
        "[detection]\nmin_occurrences = 3\n",
    )
    .unwrap();

    let config = commands::load_config(None, Some(dir.path())).unwrap();
    assert_eq!(config.min_occurrences, 3);
    assert_eq!(config.similarity_threshold, 0.8);
}

#[test]
fn test_config_show_output_loads_back() {
    let dir = TempDir::new().unwrap();
    let config = DetectionConfig {
        similarity_threshold: 0.85,
        min_occurrences: 3,
        ..DetectionConfig::default()
    };
    assert!(commands::cmd_config_show(&config).is_ok());

    let path = dir.path().join("shown.toml");
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
    let loaded = commands::load_config(Some(path.as_path()), None).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_config_explicit_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[detection]\nsimilarity_threshold = 2.0\n").unwrap();

    assert!(commands::load_config(Some(path.as_path()), None).is_err());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Netflix", 20), "Netflix");
    assert_eq!(truncate("A very long merchant name", 10), "A very ...");
    assert_eq!(truncate("", 5), "");
}
