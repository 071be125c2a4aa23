//! Upcoming expense command implementations

use anyhow::Result;
use chrono::NaiveDate;
use recur_core::{upcoming, KeyValueStore, PatternStore, UpcomingExpense};

use super::{truncate, Output};

/// Confirmed patterns due within `days` of `today` (overdue ones always included)
pub fn upcoming_within<S: KeyValueStore>(
    store: &PatternStore<S>,
    today: NaiveDate,
    days: Option<i64>,
) -> Vec<UpcomingExpense> {
    upcoming(&store.load_patterns(), today)
        .into_iter()
        .filter(|item| days.map_or(true, |d| item.days_until_due <= d))
        .collect()
}

pub fn cmd_upcoming<S: KeyValueStore>(
    store: &PatternStore<S>,
    today: NaiveDate,
    days: Option<i64>,
    output: Output,
) -> Result<()> {
    let items = upcoming_within(store, today, days);

    if output.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No upcoming expenses. Confirm detected patterns with:");
        println!("  recur confirm <id>");
        return Ok(());
    }

    println!();
    println!("📅 Upcoming Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    for item in &items {
        let due = match item.days_until_due {
            d if d < 0 => format!("⚠️  {} days overdue", -d),
            0 => "due today".to_string(),
            1 => "due tomorrow".to_string(),
            d => format!("in {} days", d),
        };
        println!(
            "   {:20} │ {:>9.2} │ {} │ {}",
            truncate(&item.pattern.description, 20),
            item.pattern.average_amount,
            item.pattern.next_expected_date,
            due
        );
    }

    let monthly_total: f64 = items.iter().map(|i| i.pattern.monthly_cost()).sum();
    println!();
    println!("   Estimated monthly total: {:.2}", monthly_total);

    Ok(())
}
