use thiserror::Error;

use super::{Cents, CategoryId};

/// Rejected ledger input. Always surfaced to the caller, never coerced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("Amount must be positive, got {0} cents")]
    NonPositiveAmount(Cents),

    #[error("Invalid amount '{0}': use a decimal with at most two places, e.g. 50.00")]
    InvalidAmount(String),

    #[error("Transaction references unknown category {0}")]
    UnknownCategory(CategoryId),

    #[error("Invalid date '{0}': expected a calendar date as YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Amount total is too large to represent")]
    AmountOverflow,
}
