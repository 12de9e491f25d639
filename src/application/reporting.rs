use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Category, CategoryUsage, Cents, MonthlyBalance, PieSlice, Transaction, User,
};

/// A transaction together with the name of the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction: Transaction,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub user: User,
    pub as_of: NaiveDate,
    pub balance: MonthlyBalance,
    /// Most recent transactions, newest first
    pub recent: Vec<LedgerEntry>,
    pub categories: Vec<CategoryUsage>,
    /// Categories whose spend this month is over their limit
    pub exceeded: Vec<CategoryUsage>,
}

impl Dashboard {
    /// Warning shown when a category is over its limit. Names the first offender.
    pub fn limit_banner(&self) -> Option<String> {
        self.exceeded.first().map(|usage| {
            format!(
                "You have exceeded the monthly limit of category '{}'",
                usage.category.name
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    pub as_of: NaiveDate,
    pub current_month: Vec<LedgerEntry>,
    pub previous: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingReport {
    pub as_of: NaiveDate,
    pub slices: Vec<PieSlice>,
    pub total: Cents,
}

impl SpendingReport {
    /// No expense transactions this month; render the empty state instead of a chart.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Result of recording a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub category: Category,
    /// Category's expense total for the transaction's month, including this one
    pub month_total: Cents,
    pub under_limit: bool,
}
