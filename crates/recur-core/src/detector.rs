//! Recurring expense pattern detection
//!
//! Partitions an expense history into clusters of similar expenses and runs
//! cadence analysis on each one:
//! 1. Sort expenses by date
//! 2. Each expense not yet claimed by a pattern becomes a seed
//! 3. The seed's cluster is every expense similar to the seed itself
//!    (similarity is not chained through other cluster members)
//! 4. Clusters of at least `min_occurrences` are analyzed; accepted patterns
//!    claim all of their members so they are never used as seeds again
//!
//! Detection always re-runs from scratch and never fails: expenses that fit
//! no pattern are simply left out.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::analyzer::analyze_cluster;
use crate::config::DetectionConfig;
use crate::models::{ExpenseRecord, RecurringExpensePattern};
use crate::similarity::is_similar;

/// Detector for recurring expense patterns
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: DetectionConfig,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect recurring patterns, highest confidence first
    pub fn detect(&self, expenses: &[ExpenseRecord]) -> Vec<RecurringExpensePattern> {
        let mut sorted: Vec<&ExpenseRecord> = expenses.iter().collect();
        sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let mut processed: HashSet<&str> = HashSet::new();
        let mut patterns = Vec::new();

        for &seed in &sorted {
            if processed.contains(seed.id.as_str()) {
                continue;
            }

            let cluster: Vec<&ExpenseRecord> = sorted
                .iter()
                .copied()
                .filter(|candidate| is_similar(seed, candidate, &self.config))
                .collect();

            if cluster.len() < self.config.min_occurrences {
                continue;
            }

            let Some(pattern) = analyze_cluster(&cluster, &self.config) else {
                continue;
            };

            debug!(
                "Found pattern: {} @ {:.2}/{} ({} expenses, confidence {:.2})",
                pattern.description,
                pattern.average_amount,
                pattern.frequency,
                cluster.len(),
                pattern.confidence
            );

            for &member in &cluster {
                processed.insert(member.id.as_str());
            }
            patterns.push(pattern);
        }

        patterns.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        info!(
            "Detection complete: {} patterns from {} expenses ({} unmatched)",
            patterns.len(),
            expenses.len(),
            expenses.len().saturating_sub(processed.len())
        );

        patterns
    }
}

/// Detect patterns with the default configuration
pub fn detect_patterns(expenses: &[ExpenseRecord]) -> Vec<RecurringExpensePattern> {
    PatternDetector::new().detect(expenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Frequency};
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(
        id: &str,
        description: &str,
        amount: f64,
        category: ExpenseCategory,
        date: NaiveDate,
    ) -> ExpenseRecord {
        ExpenseRecord {
            id: id.to_string(),
            description: description.to_string(),
            amount,
            category,
            date,
        }
    }

    fn netflix_and_groceries() -> Vec<ExpenseRecord> {
        vec![
            expense("n1", "Netflix", 15.99, ExpenseCategory::Entertainment, date(2024, 1, 1)),
            expense("n2", "Netflix", 15.99, ExpenseCategory::Entertainment, date(2024, 2, 1)),
            expense("n3", "Netflix", 15.99, ExpenseCategory::Entertainment, date(2024, 3, 1)),
            expense("g1", "Groceries", 85.00, ExpenseCategory::Food, date(2024, 1, 15)),
        ]
    }

    #[test]
    fn test_end_to_end_netflix() {
        let patterns = detect_patterns(&netflix_and_groceries());

        assert_eq!(patterns.len(), 1);
        let netflix = &patterns[0];
        assert_eq!(netflix.description, "Netflix");
        assert_eq!(netflix.category, ExpenseCategory::Entertainment);
        assert_eq!(netflix.frequency, Frequency::Monthly);
        assert!(netflix.confidence >= 0.6);
        assert!((netflix.average_amount - 15.99).abs() < 1e-9);
        assert_eq!(netflix.last_occurrence, date(2024, 3, 1));
        assert_eq!(netflix.next_expected_date, date(2024, 4, 1));
        assert_eq!(netflix.expense_ids, vec!["n1", "n2", "n3"]);
        assert!(!netflix.expense_ids.contains(&"g1".to_string()));
    }

    #[test]
    fn test_input_order_is_irrelevant() {
        let mut expenses = netflix_and_groceries();
        expenses.reverse();

        let patterns = detect_patterns(&expenses);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].expense_ids, vec!["n1", "n2", "n3"]);
    }

    #[test]
    fn test_idempotent_up_to_ids() {
        let expenses = netflix_and_groceries();
        let first = detect_patterns(&expenses);
        let second = detect_patterns(&expenses);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.expense_ids, b.expense_ids);
            assert_eq!(a.frequency, b.frequency);
            assert!((a.confidence - b.confidence).abs() < 1e-12);
            assert_eq!(a.next_expected_date, b.next_expected_date);
        }
    }

    #[test]
    fn test_single_occurrence_never_yields_pattern() {
        let expenses = vec![expense(
            "n1",
            "Netflix",
            15.99,
            ExpenseCategory::Entertainment,
            date(2024, 1, 1),
        )];
        assert!(detect_patterns(&expenses).is_empty());
    }

    #[test]
    fn test_empty_history() {
        assert!(detect_patterns(&[]).is_empty());
    }

    #[test]
    fn test_multiple_patterns_sorted_by_confidence() {
        let mut expenses = Vec::new();
        // Perfectly regular weekly gym charge
        for i in 0..6 {
            expenses.push(expense(
                &format!("gym{}", i),
                "Gym Membership",
                12.0,
                ExpenseCategory::Healthcare,
                date(2024, 1, 1) + Duration::days(7 * i),
            ));
        }
        // Monthly rent with calendar-month drift (31, 29, 31 days)
        for (i, d) in [date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)]
            .into_iter()
            .enumerate()
        {
            expenses.push(expense(
                &format!("rent{}", i),
                "Apartment Rent",
                1500.0,
                ExpenseCategory::Housing,
                d,
            ));
        }

        let patterns = detect_patterns(&expenses);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].description, "Gym Membership");
        assert_eq!(patterns[0].frequency, Frequency::Weekly);
        assert_eq!(patterns[1].description, "Apartment Rent");
        assert_eq!(patterns[1].frequency, Frequency::Monthly);
        assert!(patterns[0].confidence >= patterns[1].confidence);
    }

    #[test]
    fn test_slightly_varying_amounts_still_cluster() {
        let expenses = vec![
            expense("e1", "Electric Co", 80.0, ExpenseCategory::Utilities, date(2024, 1, 5)),
            expense("e2", "Electric Co", 84.0, ExpenseCategory::Utilities, date(2024, 2, 5)),
            expense("e3", "Electric Co", 82.0, ExpenseCategory::Utilities, date(2024, 3, 5)),
        ];

        let patterns = detect_patterns(&expenses);
        assert_eq!(patterns.len(), 1);
        assert!((patterns[0].average_amount - 82.0).abs() < 1e-9);
    }

    #[test]
    fn test_irregular_cluster_members_stay_available() {
        // Two coffee purchases 45 days apart fit no cadence, so neither is claimed
        let expenses = vec![
            expense("c1", "Coffee", 4.5, ExpenseCategory::Food, date(2024, 1, 1)),
            expense("c2", "Coffee", 4.5, ExpenseCategory::Food, date(2024, 2, 15)),
        ];
        assert!(detect_patterns(&expenses).is_empty());
    }

    fn gym(id: &str, amount: f64, date: NaiveDate) -> ExpenseRecord {
        expense(id, "Gym", amount, ExpenseCategory::Healthcare, date)
    }

    fn cluster_ids(patterns: &[RecurringExpensePattern]) -> Vec<Vec<String>> {
        let mut ids: Vec<Vec<String>> = patterns.iter().map(|p| p.expense_ids.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_clusters_are_seed_relative() {
        // 100~108 and 108~116, but 100 and 116 are 16% apart
        let expenses = vec![
            gym("a", 100.0, date(2024, 1, 1)),
            gym("b", 108.0, date(2024, 2, 1)),
            gym("c", 116.0, date(2024, 3, 1)),
        ];

        let patterns = detect_patterns(&expenses);

        // Seed "a" never pulls in "c"; "c" later seeds its own cluster and
        // takes "b" along even though "b" is already claimed
        assert_eq!(
            cluster_ids(&patterns),
            vec![vec!["a", "b"], vec!["b", "c"]]
        );
        let mut averages: Vec<f64> = patterns.iter().map(|p| p.average_amount).collect();
        averages.sort_by(f64::total_cmp);
        assert!((averages[0] - 104.0).abs() < 1e-9);
        assert!((averages[1] - 112.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejected_cluster_member_joins_later_pattern() {
        let expenses = vec![
            gym("s", 100.0, date(2024, 1, 1)),
            gym("m1", 108.0, date(2024, 1, 20)),
            gym("m2", 116.0, date(2024, 2, 20)),
        ];

        // "s" seeds {s, m1} (19 days, no cadence) and "m1" seeds {s, m1, m2}
        // (mean 25 days, no cadence); both are rejected. "m2" then seeds
        // {m1, m2}, 31 days apart.
        let patterns = detect_patterns(&expenses);

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].expense_ids, vec!["m1", "m2"]);
        assert_eq!(patterns[0].frequency, Frequency::Monthly);
        assert_eq!(patterns[0].next_expected_date, date(2024, 3, 20));
    }

    #[test]
    fn test_min_occurrences_from_config() {
        let config = DetectionConfig {
            min_occurrences: 4,
            ..DetectionConfig::default()
        };
        let detector = PatternDetector::with_config(config);
        assert!(detector.detect(&netflix_and_groceries()).is_empty());
    }
}
