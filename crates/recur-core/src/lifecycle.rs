//! Pattern lifecycle management
//!
//! `PatternStore` owns the canonical list of recurring patterns kept in a
//! key-value backend. Freshly detected candidates are merged in without
//! re-surfacing ones already stored, and users move patterns through their
//! lifecycle:
//!
//! ```text
//! detected (unconfirmed) --confirm--> confirmed --advance--> confirmed
//!          \                              |
//!           `--------dismiss--------------'--> removed
//! ```
//!
//! Storage problems never reach the caller: a failed or corrupt read looks
//! like an empty store and a failed write is logged and dropped.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analyzer::next_date_for_frequency;
use crate::error::{Error, Result};
use crate::models::{RecurringExpensePattern, UpcomingExpense};
use crate::store::{KeyValueStore, PATTERNS_KEY};

/// Default absolute tolerance when matching a detected pattern to a stored one
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1.0;

/// Lifecycle manager for persisted patterns
pub struct PatternStore<S: KeyValueStore> {
    backend: S,
    merge_tolerance: f64,
}

impl<S: KeyValueStore> PatternStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }

    /// Use a custom amount tolerance for de-duplicating detected patterns
    pub fn with_merge_tolerance(backend: S, merge_tolerance: f64) -> Self {
        Self {
            backend,
            merge_tolerance,
        }
    }

    /// Load persisted patterns, or an empty list if none are stored or the
    /// stored document is unreadable
    pub fn load_patterns(&self) -> Vec<RecurringExpensePattern> {
        match self.try_load() {
            Ok(patterns) => patterns,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to load patterns, treating store as empty"
                );
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<RecurringExpensePattern>> {
        let Some(value) = self.backend.get(PATTERNS_KEY)? else {
            return Ok(Vec::new());
        };

        let patterns: Vec<RecurringExpensePattern> = serde_json::from_value(value)?;
        for pattern in &patterns {
            validate_pattern(pattern)?;
        }

        debug!("Loaded {} patterns from {}", patterns.len(), self.backend.name());
        Ok(patterns)
    }

    /// Overwrite persisted patterns; failures are logged, not returned
    ///
    /// Returns whether the write succeeded. A list holding any pattern that
    /// would not load back is refused and the stored document is left as is.
    pub fn save_patterns(&self, patterns: &[RecurringExpensePattern]) -> bool {
        match self.try_save(patterns) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "Failed to save patterns"
                );
                false
            }
        }
    }

    fn try_save(&self, patterns: &[RecurringExpensePattern]) -> Result<()> {
        for pattern in patterns {
            validate_pattern(pattern)?;
        }
        let value: Value = serde_json::to_value(patterns)?;
        self.backend.set(PATTERNS_KEY, &value)
    }

    /// Find a stored pattern by id
    pub fn get_pattern(&self, id: &str) -> Option<RecurringExpensePattern> {
        self.load_patterns().into_iter().find(|p| p.id == id)
    }

    /// Merge freshly detected patterns into the store and persist the result
    ///
    /// Returns the merged list (existing patterns first, in stored order).
    pub fn sync_detected(
        &self,
        detected: Vec<RecurringExpensePattern>,
    ) -> Vec<RecurringExpensePattern> {
        let existing = self.load_patterns();
        let before = existing.len();

        let detected: Vec<RecurringExpensePattern> = detected
            .into_iter()
            .filter(|candidate| match validate_pattern(candidate) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Discarding detected pattern");
                    false
                }
            })
            .collect();
        let merged = merge_detected(existing, detected, self.merge_tolerance);

        if merged.len() != before {
            info!("Stored {} new patterns", merged.len() - before);
        }
        self.save_patterns(&merged);
        merged
    }

    /// Mark a pattern as confirmed; returns false if the id is unknown
    pub fn confirm_pattern(&self, id: &str) -> bool {
        self.update_pattern(id, |pattern| pattern.is_confirmed = true)
    }

    /// Remove a pattern entirely; returns false if the id is unknown
    ///
    /// Nothing is remembered about dismissed patterns, so the same cluster
    /// can be detected and stored again later.
    pub fn dismiss_pattern(&self, id: &str) -> bool {
        let mut patterns = self.load_patterns();
        let before = patterns.len();
        patterns.retain(|p| p.id != id);

        if patterns.len() == before {
            debug!("Dismiss ignored, no pattern with id {}", id);
            return false;
        }

        if !self.save_patterns(&patterns) {
            return false;
        }
        info!("Dismissed pattern {}", id);
        true
    }

    /// Record a new occurrence of a pattern and re-derive its next date
    ///
    /// Only `last_occurrence` and `next_expected_date` change; the attributed
    /// expenses and the average amount are left as detected.
    pub fn advance_after_new_expense(&self, id: &str, new_expense_date: NaiveDate) -> bool {
        self.update_pattern(id, |pattern| {
            pattern.last_occurrence = new_expense_date;
            pattern.next_expected_date =
                next_date_for_frequency(new_expense_date, pattern.frequency);
        })
    }

    /// Apply `update` to one pattern; false if the id is unknown or the
    /// change could not be persisted
    fn update_pattern<F>(&self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut RecurringExpensePattern),
    {
        let mut patterns = self.load_patterns();
        let Some(pattern) = patterns.iter_mut().find(|p| p.id == id) else {
            debug!("Update ignored, no pattern with id {}", id);
            return false;
        };

        update(pattern);
        let summary = format!(
            "{} ({}, confirmed: {}, next: {})",
            pattern.id, pattern.description, pattern.is_confirmed, pattern.next_expected_date
        );

        if !self.save_patterns(&patterns) {
            return false;
        }
        info!("Updated pattern {}", summary);
        true
    }
}

/// Reject stored patterns whose values could not have come from detection
fn validate_pattern(pattern: &RecurringExpensePattern) -> Result<()> {
    if pattern.id.trim().is_empty() {
        return Err(Error::InvalidData("pattern with empty id".to_string()));
    }
    if !(0.0..=1.0).contains(&pattern.confidence) {
        return Err(Error::InvalidData(format!(
            "pattern {} has confidence {} outside [0, 1]",
            pattern.id, pattern.confidence
        )));
    }
    if !pattern.average_amount.is_finite() || pattern.average_amount <= 0.0 {
        return Err(Error::InvalidData(format!(
            "pattern {} has invalid amount {}",
            pattern.id, pattern.average_amount
        )));
    }
    Ok(())
}

/// Whether a detected pattern duplicates a stored one
pub fn is_duplicate(
    existing: &RecurringExpensePattern,
    detected: &RecurringExpensePattern,
    tolerance: f64,
) -> bool {
    existing.description == detected.description
        && existing.category == detected.category
        && (existing.average_amount - detected.average_amount).abs() < tolerance
}

/// Append detected patterns that do not duplicate any existing pattern
///
/// Existing patterns keep their position and state; new ones are appended in
/// detection order.
pub fn merge_detected(
    existing: Vec<RecurringExpensePattern>,
    detected: Vec<RecurringExpensePattern>,
    tolerance: f64,
) -> Vec<RecurringExpensePattern> {
    let mut merged = existing;
    let stored = merged.len();

    for candidate in detected {
        if merged[..stored]
            .iter()
            .any(|e| is_duplicate(e, &candidate, tolerance))
        {
            debug!("Skipping already stored pattern: {}", candidate.description);
            continue;
        }
        merged.push(candidate);
    }

    merged
}

/// Confirmed patterns with days until due, most overdue first
pub fn upcoming(patterns: &[RecurringExpensePattern], today: NaiveDate) -> Vec<UpcomingExpense> {
    let mut items: Vec<UpcomingExpense> = patterns
        .iter()
        .filter(|p| p.is_confirmed)
        .map(|p| {
            let days_until_due = (p.next_expected_date - today).num_days();
            UpcomingExpense {
                pattern: p.clone(),
                days_until_due,
                is_overdue: days_until_due < 0,
            }
        })
        .collect();

    items.sort_by_key(|item| item.days_until_due);
    items
}
