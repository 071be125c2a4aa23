//! Similarity between expense records
//!
//! Two expenses are considered instances of the same obligation when a
//! weighted blend of description, amount and category similarity reaches
//! the configured threshold.

use crate::config::DetectionConfig;
use crate::models::ExpenseRecord;

/// Levenshtein edit distance over chars (insert, delete, substitute all cost 1)
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row of the DP matrix
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}

/// Normalized edit similarity in [0, 1], case-insensitive
///
/// Two empty strings are identical; an empty string shares nothing with a
/// non-empty one.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

/// Amount similarity in [0, 1] inside a relative tolerance band
///
/// The band is measured against the smaller amount: with a 15% tolerance,
/// 100 vs 115 sits exactly on the boundary and scores 0, identical amounts
/// score 1, and anything past the band scores 0.
/// A band around the average would be wider: it gives 100 vs 116 about
/// 0.012, where this scores 0.
pub fn amount_similarity(x: f64, y: f64, tolerance: f64) -> f64 {
    let diff = (x - y).abs();
    if diff == 0.0 {
        return 1.0;
    }

    let reference = x.min(y);
    if reference <= 0.0 || tolerance <= 0.0 {
        return 0.0;
    }

    let relative = diff / reference;
    if relative > tolerance {
        return 0.0;
    }

    1.0 - relative / tolerance
}

/// Weighted similarity score between two expenses
pub fn similarity_score(a: &ExpenseRecord, b: &ExpenseRecord, config: &DetectionConfig) -> f64 {
    let description = string_similarity(&a.description, &b.description);
    let amount = amount_similarity(a.amount, b.amount, config.amount_tolerance);
    let category = if a.category == b.category { 1.0 } else { 0.0 };

    config.description_weight * description
        + config.amount_weight * amount
        + config.category_weight * category
}

/// Whether two expenses look like the same recurring obligation
pub fn is_similar(a: &ExpenseRecord, b: &ExpenseRecord, config: &DetectionConfig) -> bool {
    // Float rounding in the weighted sum must not make a record dissimilar to itself
    if a == b {
        return true;
    }
    similarity_score(a, b, config) >= config.similarity_threshold
}
