//! Domain models for Recur

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Spending category of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transportation,
    Entertainment,
    Utilities,
    Healthcare,
    Shopping,
    Education,
    Housing,
    Insurance,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Entertainment => "entertainment",
            Self::Utilities => "utilities",
            Self::Healthcare => "healthcare",
            Self::Shopping => "shopping",
            Self::Education => "education",
            Self::Housing => "housing",
            Self::Insurance => "insurance",
            Self::Other => "other",
        }
    }

    /// Get all categories
    pub fn all() -> &'static [ExpenseCategory] {
        &[
            Self::Food,
            Self::Transportation,
            Self::Entertainment,
            Self::Utilities,
            Self::Healthcare,
            Self::Shopping,
            Self::Education,
            Self::Housing,
            Self::Insurance,
            Self::Other,
        ]
    }
}

impl std::str::FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" | "groceries" | "dining" => Ok(Self::Food),
            "transportation" | "transport" => Ok(Self::Transportation),
            "entertainment" => Ok(Self::Entertainment),
            "utilities" => Ok(Self::Utilities),
            "healthcare" | "health" => Ok(Self::Healthcare),
            "shopping" => Ok(Self::Shopping),
            "education" => Ok(Self::Education),
            "housing" | "rent" => Ok(Self::Housing),
            "insurance" => Ok(Self::Insurance),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single recorded expense, as supplied by the expense store
///
/// Read-only from the detector's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
}

/// Cadence of a recurring expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Get all frequencies, shortest cadence first
    pub fn all() -> &'static [Frequency] {
        &[Self::Weekly, Self::Monthly, Self::Quarterly, Self::Yearly]
    }

    /// Inclusive range of mean intervals (in days) that classify as this cadence
    pub fn band(&self) -> (f64, f64) {
        match self {
            Self::Weekly => (6.0, 8.0),
            Self::Monthly => (28.0, 35.0),
            Self::Quarterly => (85.0, 95.0),
            Self::Yearly => (360.0, 370.0),
        }
    }

    /// Nominal interval in days
    pub fn center_days(&self) -> f64 {
        match self {
            Self::Weekly => 7.0,
            Self::Monthly => 30.0,
            Self::Quarterly => 90.0,
            Self::Yearly => 365.0,
        }
    }

    /// Number of occurrences per year
    pub fn annual_multiplier(&self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Yearly => 1,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring obligation inferred from expense history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpensePattern {
    pub id: String,
    /// Copied from the seed expense of the cluster
    pub description: String,
    pub category: ExpenseCategory,
    pub average_amount: f64,
    pub frequency: Frequency,
    /// Blend of interval regularity and cadence fit, in [0, 1]
    pub confidence: f64,
    /// Expenses attributed to this pattern (linkage only)
    pub expense_ids: Vec<String>,
    pub last_occurrence: NaiveDate,
    pub next_expected_date: NaiveDate,
    pub is_confirmed: bool,
}

impl RecurringExpensePattern {
    /// Estimated yearly cost at the average amount
    pub fn annual_cost(&self) -> f64 {
        self.average_amount * self.frequency.annual_multiplier() as f64
    }

    /// Estimated monthly cost at the average amount
    pub fn monthly_cost(&self) -> f64 {
        self.annual_cost() / 12.0
    }
}

/// A confirmed pattern projected against a reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingExpense {
    pub pattern: RecurringExpensePattern,
    /// Negative when the expected date has passed
    pub days_until_due: i64,
    pub is_overdue: bool,
}
