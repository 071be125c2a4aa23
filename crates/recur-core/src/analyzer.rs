//! Cadence analysis for a cluster of similar expenses
//!
//! Given expenses already judged to be the same obligation, derives:
//! - the cadence (weekly, monthly, quarterly, yearly) from the mean interval
//! - a confidence blending interval regularity with cadence fit
//! - the average amount and the next expected date
//!
//! ## Calendar arithmetic
//!
//! Monthly, quarterly and yearly steps add calendar months with chrono's
//! `checked_add_months`, which clamps to the last day of a shorter month:
//! Jan 31 + 1 month is Feb 29 (2024) or Feb 28, and Feb 29 + 1 year is Feb 28.
//! Weekly steps add exactly 7 days.

use chrono::{Duration, Months, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::config::DetectionConfig;
use crate::models::{ExpenseRecord, Frequency, RecurringExpensePattern};

/// Weight of interval regularity in the final confidence
const CONSISTENCY_WEIGHT: f64 = 0.6;
/// Weight of cadence-band fit in the final confidence
const FREQUENCY_WEIGHT: f64 = 0.4;

/// Mean and population standard deviation of a set of intervals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl IntervalStats {
    /// `1 - std_dev / mean`, floored at 0; `None` when the mean is not positive
    pub fn consistency(&self) -> Option<f64> {
        if self.mean <= 0.0 {
            return None;
        }
        Some((1.0 - self.std_dev / self.mean).max(0.0))
    }
}

/// Advance a date by one step of the given cadence
///
/// Shared by pattern detection and by the store when a pattern is advanced
/// after a new expense.
pub fn next_date_for_frequency(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    let next = match frequency {
        Frequency::Weekly => date.checked_add_signed(Duration::days(7)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
        Frequency::Quarterly => date.checked_add_months(Months::new(3)),
        Frequency::Yearly => date.checked_add_months(Months::new(12)),
    };
    next.unwrap_or(NaiveDate::MAX)
}

/// Day counts between consecutive dates (input must be sorted ascending)
pub fn day_intervals(dates: &[NaiveDate]) -> Vec<i64> {
    dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect()
}

/// Mean and population standard deviation; `None` for an empty slice
pub fn interval_stats(intervals: &[i64]) -> Option<IntervalStats> {
    if intervals.is_empty() {
        return None;
    }

    let n = intervals.len() as f64;
    let mean = intervals.iter().sum::<i64>() as f64 / n;
    let variance = intervals
        .iter()
        .map(|&i| {
            let d = i as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    Some(IntervalStats {
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Cadence whose band contains the mean interval, if any
pub fn classify_frequency(mean_interval: f64) -> Option<Frequency> {
    Frequency::all().iter().copied().find(|freq| {
        let (lo, hi) = freq.band();
        mean_interval >= lo && mean_interval <= hi
    })
}

/// How close the mean interval is to the cadence's nominal interval, in [0, 1]
pub fn frequency_confidence(mean_interval: f64, frequency: Frequency) -> f64 {
    let center = frequency.center_days();
    (1.0 - (mean_interval - center).abs() / center).max(0.0)
}

/// Analyze a cluster of similar expenses
///
/// Returns `None` when the cluster has fewer than two expenses, all expenses
/// fall on the same day, the mean interval matches no cadence band, or the
/// confidence is below `config.min_confidence`. None of these is an error.
pub fn analyze_cluster(
    cluster: &[&ExpenseRecord],
    config: &DetectionConfig,
) -> Option<RecurringExpensePattern> {
    if cluster.len() < 2 {
        return None;
    }

    let mut sorted: Vec<&ExpenseRecord> = cluster.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    let seed = sorted.first()?;
    let last = sorted.last()?;

    let dates: Vec<NaiveDate> = sorted.iter().map(|e| e.date).collect();
    let intervals = day_intervals(&dates);
    let stats = interval_stats(&intervals)?;

    let Some(consistency) = stats.consistency() else {
        debug!(
            "No cadence for '{}': {} expenses share one date",
            seed.description,
            sorted.len()
        );
        return None;
    };

    let Some(frequency) = classify_frequency(stats.mean) else {
        debug!(
            "No cadence for '{}': mean interval {:.1} days fits no band",
            seed.description, stats.mean
        );
        return None;
    };

    let confidence = CONSISTENCY_WEIGHT * consistency
        + FREQUENCY_WEIGHT * frequency_confidence(stats.mean, frequency);

    if confidence < config.min_confidence {
        debug!(
            "Rejected '{}' as {}: confidence {:.2} below {:.2}",
            seed.description, frequency, confidence, config.min_confidence
        );
        return None;
    }

    // Running mean stays finite for any finite amounts
    let average_amount = sorted
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, e)| mean + (e.amount - mean) / (i + 1) as f64);

    Some(RecurringExpensePattern {
        id: Uuid::new_v4().to_string(),
        description: seed.description.clone(),
        category: seed.category,
        average_amount,
        frequency,
        confidence,
        expense_ids: sorted.iter().map(|e| e.id.clone()).collect(),
        last_occurrence: last.date,
        next_expected_date: next_date_for_frequency(last.date, frequency),
        is_confirmed: false,
    })
}
