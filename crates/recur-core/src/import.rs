//! Expense history import
//!
//! Reads expense records exported by the expense store, either as CSV with a
//! header row or as a JSON array.
//!
//! CSV columns are matched by header name (case-insensitive, any order):
//! `id`, `description`, `amount`, `category`, `date`. The `id` column is
//! optional; rows without one get `row-<n>`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ExpenseCategory, ExpenseRecord};

/// Column positions resolved from a CSV header row
struct Columns {
    id: Option<usize>,
    description: usize,
    amount: usize,
    category: usize,
    date: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing column: {}", name)))
        };

        Ok(Self {
            id: find("id"),
            description: require("description")?,
            amount: require("amount")?,
            category: require("category")?,
            date: require("date")?,
        })
    }
}

/// Parse expenses from CSV
pub fn parse_expenses_csv<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut expenses = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is row 1
        let row = index + 2;

        let field = |col: usize, name: &str| {
            record
                .get(col)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Error::Import(format!("Row {}: missing {}", row, name)))
        };

        let id = columns
            .id
            .and_then(|col| record.get(col))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("row-{}", row));

        let description = field(columns.description, "description")?.to_string();

        let amount = parse_amount(field(columns.amount, "amount")?)
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;
        if !is_valid_amount(amount) {
            return Err(Error::Import(format!(
                "Row {}: amount must be positive and finite, got {}",
                row, amount
            )));
        }

        let category: ExpenseCategory = field(columns.category, "category")?
            .parse()
            .map_err(|e: String| Error::Import(format!("Row {}: {}", row, e)))?;

        let date = parse_date(field(columns.date, "date")?)
            .map_err(|e| Error::Import(format!("Row {}: {}", row, e)))?;

        expenses.push(ExpenseRecord {
            id,
            description,
            amount,
            category,
            date,
        });
    }

    ensure_unique_ids(&expenses)?;
    debug!("Parsed {} expenses from CSV", expenses.len());
    Ok(expenses)
}

/// Parse expenses from a JSON array
pub fn parse_expenses_json<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>> {
    let expenses: Vec<ExpenseRecord> = serde_json::from_reader(reader)?;

    if let Some(bad) = expenses.iter().find(|e| !is_valid_amount(e.amount)) {
        return Err(Error::Import(format!(
            "Expense {}: amount must be positive and finite, got {}",
            bad.id, bad.amount
        )));
    }

    ensure_unique_ids(&expenses)?;
    debug!("Parsed {} expenses from JSON", expenses.len());
    Ok(expenses)
}

/// Load expenses from a `.csv` or `.json` file
pub fn load_expenses(path: &Path) -> Result<Vec<ExpenseRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let reader = BufReader::new(File::open(path)?);
    match extension.as_deref() {
        Some("csv") => parse_expenses_csv(reader),
        Some("json") => parse_expenses_json(reader),
        _ => Err(Error::Import(format!(
            "Unsupported expense file (expected .csv or .json): {}",
            path.display()
        ))),
    }
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

fn ensure_unique_ids(expenses: &[ExpenseRecord]) -> Result<()> {
    let mut seen = HashSet::new();
    for expense in expenses {
        if !seen.insert(expense.id.as_str()) {
            return Err(Error::Import(format!("Duplicate expense id: {}", expense.id)));
        }
    }
    Ok(())
}

/// Parse a date in ISO or US format
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace(['$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}
