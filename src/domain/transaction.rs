use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryId, Cents};

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense entry in a user's ledger.
/// Transactions are immutable once recorded; they only disappear when their
/// category is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Free-text label, e.g. "Salary" or "Groceries at the market"
    pub name: String,
    pub kind: TransactionKind,
    /// Amount in cents (always positive; the kind carries the sign)
    pub amount_cents: Cents,
    /// Calendar date the transaction happened on
    pub date: NaiveDate,
    pub category: CategoryId,
    /// When we recorded this transaction in the system
    pub recorded_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction. Amount validation happens in the service and
    /// in [`validate_snapshot`](super::validate_snapshot), not here.
    pub fn new(
        name: impl Into<String>,
        kind: TransactionKind,
        amount_cents: Cents,
        date: NaiveDate,
        category: CategoryId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            amount_cents,
            date,
            category,
            recorded_at: Utc::now(),
        }
    }

    pub fn income(
        name: impl Into<String>,
        amount_cents: Cents,
        date: NaiveDate,
        category: CategoryId,
    ) -> Self {
        Self::new(name, TransactionKind::Income, amount_cents, date, category)
    }

    pub fn expense(
        name: impl Into<String>,
        amount_cents: Cents,
        date: NaiveDate,
        category: CategoryId,
    ) -> Self {
        Self::new(name, TransactionKind::Expense, amount_cents, date, category)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}
