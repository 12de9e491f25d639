use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Category, CategoryId, CategoryUsage, Cents, InvalidInput, Transaction};

/// Balance summary derived from a user's ledger for one reference month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBalance {
    /// Sum of every income transaction ever recorded
    pub lifetime_income: Cents,
    /// Sum of expense transactions dated in the reference month
    pub current_month_expense: Cents,
    /// `lifetime_income - current_month_expense`
    pub balance: Cents,
}

/// One slice of the monthly spending pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub category: String,
    pub value: Cents,
}

/// True when `date` falls in the same calendar month and year as `now`.
pub fn is_same_month(date: NaiveDate, now: NaiveDate) -> bool {
    date.year() == now.year() && date.month() == now.month()
}

/// Parse an ISO `YYYY-MM-DD` date. Impossible dates such as 2024-02-30 are rejected.
pub fn parse_date(input: &str) -> Result<NaiveDate, InvalidInput> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| InvalidInput::InvalidDate(input.to_string()))
}

/// Add two amounts, failing instead of wrapping when the sum leaves the `Cents` range.
pub fn add_cents(a: Cents, b: Cents) -> Result<Cents, InvalidInput> {
    a.checked_add(b).ok_or(InvalidInput::AmountOverflow)
}

fn ensure_positive(transaction: &Transaction) -> Result<(), InvalidInput> {
    if transaction.amount_cents <= 0 {
        return Err(InvalidInput::NonPositiveAmount(transaction.amount_cents));
    }
    Ok(())
}

/// Check that a snapshot is consistent: positive amounts, and every
/// transaction points at one of the supplied categories.
pub fn validate_snapshot(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<(), InvalidInput> {
    let known: HashSet<CategoryId> = categories.iter().map(|c| c.id).collect();

    for transaction in transactions {
        ensure_positive(transaction)?;
        if !known.contains(&transaction.category) {
            return Err(InvalidInput::UnknownCategory(transaction.category));
        }
    }
    Ok(())
}

/// Compute lifetime income, this month's expenses, and the resulting balance.
pub fn compute_balance(
    transactions: &[Transaction],
    now: NaiveDate,
) -> Result<MonthlyBalance, InvalidInput> {
    let mut lifetime_income = 0;
    let mut current_month_expense = 0;

    for transaction in transactions {
        ensure_positive(transaction)?;
        if transaction.is_income() {
            lifetime_income = add_cents(lifetime_income, transaction.amount_cents)?;
        } else if is_same_month(transaction.date, now) {
            current_month_expense = add_cents(current_month_expense, transaction.amount_cents)?;
        }
    }

    let balance = lifetime_income
        .checked_sub(current_month_expense)
        .ok_or(InvalidInput::AmountOverflow)?;

    Ok(MonthlyBalance {
        lifetime_income,
        current_month_expense,
        balance,
    })
}

/// Split transactions into those dated in `now`'s month and everything else.
/// Relative order is preserved within each bucket.
pub fn partition_by_month(
    transactions: &[Transaction],
    now: NaiveDate,
) -> (Vec<Transaction>, Vec<Transaction>) {
    transactions
        .iter()
        .cloned()
        .partition(|t| is_same_month(t.date, now))
}

/// Sum this month's expenses per category.
/// Categories without any matching expense are absent, which callers treat as zero.
pub fn category_expense_totals(
    transactions: &[Transaction],
    now: NaiveDate,
) -> Result<HashMap<CategoryId, Cents>, InvalidInput> {
    let mut totals: HashMap<CategoryId, Cents> = HashMap::new();

    for transaction in transactions {
        ensure_positive(transaction)?;
        if transaction.is_expense() && is_same_month(transaction.date, now) {
            let total = totals.entry(transaction.category).or_insert(0);
            *total = add_cents(*total, transaction.amount_cents)?;
        }
    }

    Ok(totals)
}

/// A category without a limit is always under it. Spending exactly the limit
/// still counts as within it.
pub fn is_under_limit(category: &Category, totals_this_month: &HashMap<CategoryId, Cents>) -> bool {
    match category.monthly_limit_cents {
        None => true,
        Some(limit) => totals_this_month.get(&category.id).copied().unwrap_or(0) <= limit,
    }
}

/// Pair each category with its spend this month, in the order given.
pub fn category_usage(
    categories: &[Category],
    totals_this_month: &HashMap<CategoryId, Cents>,
) -> Vec<CategoryUsage> {
    categories
        .iter()
        .map(|category| CategoryUsage {
            category: category.clone(),
            total_expense_this_month: totals_this_month.get(&category.id).copied().unwrap_or(0),
            under_limit: is_under_limit(category, totals_this_month),
        })
        .collect()
}

/// The categories whose spend this month is over their limit.
pub fn exceeded_limits(
    categories: &[Category],
    totals_this_month: &HashMap<CategoryId, Cents>,
) -> Vec<CategoryUsage> {
    category_usage(categories, totals_this_month)
        .into_iter()
        .filter(|usage| !usage.under_limit)
        .collect()
}

/// Turn per-category totals into chart slices, sorted by category name
/// (then id) so the output is the same on every call.
pub fn pie_chart_series(
    totals_this_month: &HashMap<CategoryId, Cents>,
    categories: &[Category],
) -> Result<Vec<PieSlice>, InvalidInput> {
    let by_id: HashMap<CategoryId, &Category> = categories.iter().map(|c| (c.id, c)).collect();

    let mut named = totals_this_month
        .iter()
        .map(|(id, total)| {
            by_id
                .get(id)
                .map(|category| (*category, *total))
                .ok_or(InvalidInput::UnknownCategory(*id))
        })
        .collect::<Result<Vec<_>, _>>()?;

    named.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    Ok(named
        .into_iter()
        .map(|(category, value)| PieSlice {
            category: category.name.clone(),
            value,
        })
        .collect())
}

/// The `limit` most recent transactions, newest first. Same-day entries are
/// ordered by when they were recorded.
pub fn recent_transactions(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.recorded_at.cmp(&a.recorded_at)));
    sorted.into_iter().take(limit).cloned().collect()
}
