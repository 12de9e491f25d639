use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type CategoryId = Uuid;

/// Name of the category every user gets at signup.
pub const DEFAULT_CATEGORY: &str = "Others";

/// A user-defined label for transactions, optionally capped by a monthly
/// spending limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `None` means the category is unconstrained
    pub monthly_limit_cents: Option<Cents>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            monthly_limit_cents: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_monthly_limit(mut self, limit_cents: Cents) -> Self {
        self.monthly_limit_cents = Some(limit_cents);
        self
    }
}

/// How much of a category's budget has been used this month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub total_expense_this_month: Cents,
    pub under_limit: bool,
}

impl CategoryUsage {
    /// Amount left before the limit is reached. Negative once exceeded.
    pub fn remaining(&self) -> Option<Cents> {
        self.category
            .monthly_limit_cents
            .map(|limit| limit - self.total_expense_this_month)
    }
}
