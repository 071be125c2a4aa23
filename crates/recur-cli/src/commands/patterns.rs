//! Pattern command implementations

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use recur_core::import::parse_date;
use recur_core::{KeyValueStore, PatternStore, RecurringExpensePattern};

use super::{resolve_pattern, truncate, Output};

pub fn cmd_patterns_list<S: KeyValueStore>(store: &PatternStore<S>, output: Output) -> Result<()> {
    let patterns = store.load_patterns();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    if patterns.is_empty() {
        println!("No patterns stored yet. Run:");
        println!("  recur detect --expenses expenses.csv");
        return Ok(());
    }

    println!();
    println!("📋 Recurring Patterns");
    print_patterns(&patterns);

    let confirmed = patterns.iter().filter(|p| p.is_confirmed).count();
    println!();
    println!(
        "   {} patterns, {} confirmed, {} awaiting review",
        patterns.len(),
        confirmed,
        patterns.len() - confirmed
    );

    Ok(())
}

/// Print a pattern table
pub fn print_patterns(patterns: &[RecurringExpensePattern]) {
    println!("   ─────────────────────────────────────────────────────────────────────────");
    for p in patterns {
        let status_icon = if p.is_confirmed { "✅" } else { "❔" };
        println!(
            "   {} {:8} │ {:20} │ {:>9.2}/{:<9} │ {:>3.0}% │ next {}",
            status_icon,
            truncate(&p.id, 8),
            truncate(&p.description, 20),
            p.average_amount,
            p.frequency.as_str(),
            p.confidence * 100.0,
            p.next_expected_date
        );
    }
}

pub fn cmd_confirm<S: KeyValueStore>(store: &PatternStore<S>, input: &str) -> Result<()> {
    let pattern = resolve_pattern(store, input)?;

    if pattern.is_confirmed {
        println!("ℹ️  {} is already confirmed", pattern.description);
        return Ok(());
    }
    if !store.confirm_pattern(&pattern.id) {
        bail!("Failed to confirm {}: pattern store was not updated", pattern.description);
    }

    println!(
        "✅ Confirmed {} ({:.2}/{}), next expected {}",
        pattern.description,
        pattern.average_amount,
        pattern.frequency.as_str(),
        pattern.next_expected_date
    );
    Ok(())
}

pub fn cmd_dismiss<S: KeyValueStore>(store: &PatternStore<S>, input: &str) -> Result<()> {
    let pattern = resolve_pattern(store, input)?;

    if !store.dismiss_pattern(&pattern.id) {
        bail!("Failed to dismiss {}: pattern store was not updated", pattern.description);
    }

    println!("🗑️  Dismissed {}", pattern.description);
    Ok(())
}

pub fn cmd_advance<S: KeyValueStore>(
    store: &PatternStore<S>,
    input: &str,
    date: Option<&str>,
) -> Result<()> {
    let pattern = resolve_pattern(store, input)?;

    let expense_date: NaiveDate = match date {
        Some(s) => parse_date(s).context("Invalid --date format (use YYYY-MM-DD)")?,
        None => Local::now().date_naive(),
    };

    if !store.advance_after_new_expense(&pattern.id, expense_date) {
        bail!("Failed to advance {}: pattern store was not updated", pattern.description);
    }

    let updated = store
        .get_pattern(&pattern.id)
        .context("Pattern disappeared after update")?;
    println!(
        "➡️  Recorded {} on {}, next expected {}",
        updated.description, updated.last_occurrence, updated.next_expected_date
    );
    Ok(())
}
