//! Recur Core Library
//!
//! Detects recurring obligations hidden in a plain expense history:
//! - Similarity engine for pairing expenses (edit distance, amount band, category)
//! - Cadence analysis (weekly, monthly, quarterly, yearly) with confidence scoring
//! - Seed-based clustering over the full history
//! - Pattern lifecycle (merge, confirm, dismiss, advance) over pluggable key-value storage
//! - Upcoming expense projection for confirmed patterns
//! - CSV/JSON expense import and TOML detection config

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod error;
pub mod import;
pub mod lifecycle;
pub mod models;
pub mod similarity;
pub mod store;

pub use analyzer::{analyze_cluster, next_date_for_frequency};
pub use config::DetectionConfig;
pub use detector::{detect_patterns, PatternDetector};
pub use error::{Error, Result};
pub use import::{load_expenses, parse_expenses_csv, parse_expenses_json};
pub use lifecycle::{merge_detected, upcoming, PatternStore};
pub use models::{
    ExpenseCategory, ExpenseRecord, Frequency, RecurringExpensePattern, UpcomingExpense,
};
pub use similarity::{amount_similarity, is_similar, string_similarity};
pub use store::{FileStore, KeyValueStore, MemoryStore, PATTERNS_KEY};
