use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::{
    add_cents, category_expense_totals, category_usage, compute_balance, exceeded_limits,
    is_under_limit, partition_by_month, pie_chart_series, recent_transactions, validate_snapshot,
    Category, CategoryId, Cents, InvalidInput, Transaction, TransactionKind, User,
    DEFAULT_CATEGORY,
};
use crate::storage::Repository;

use super::{
    AlreadyExists, AppError, Dashboard, History, LedgerEntry, LedgerStore, RecordedTransaction,
    SpendingReport,
};

/// Number of transactions shown on the dashboard.
pub const RECENT_TRANSACTIONS: usize = 5;

/// Application service providing the use cases behind every view.
/// This is the primary interface for any client (CLI, web, etc.).
pub struct LedgerService<S = Repository> {
    store: S,
}

/// Input for recording a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub name: String,
    pub kind: TransactionKind,
    pub amount_cents: Cents,
    pub date: NaiveDate,
    /// Category name, resolved against the user's categories
    pub category: String,
}

/// A consistent view of one user's ledger.
struct Snapshot {
    user: User,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

impl LedgerService<Repository> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }
}

impl<S: LedgerStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ========================
    // User operations
    // ========================

    /// Sign a user up. Every new user starts with the default category.
    #[instrument(skip(self))]
    pub async fn register_user(&self, username: &str, display_name: &str) -> Result<User, AppError> {
        let username = non_empty(username, "Username")?;
        let display_name = match display_name.trim() {
            "" => username,
            name => name,
        };

        if self.store.get_user(username).await?.is_some() {
            return Err(AppError::UserAlreadyExists(username.to_string()));
        }

        let user = User::new(username, display_name);
        self.store
            .create_user(&user, &Category::new(DEFAULT_CATEGORY))
            .await
            .map_err(|err| on_conflict(err, || AppError::UserAlreadyExists(username.to_string())))?;

        tracing::info!(username, "registered user");
        Ok(user)
    }

    /// Look up a user. Surrounding whitespace is ignored, as it is at signup.
    pub async fn get_user(&self, username: &str) -> Result<User, AppError> {
        let username = username.trim();
        self.store
            .get_user(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    // ========================
    // Category operations
    // ========================

    /// Create a category. Names are unique per user.
    #[instrument(skip(self))]
    pub async fn add_category(
        &self,
        username: &str,
        name: &str,
        monthly_limit_cents: Option<Cents>,
    ) -> Result<Category, AppError> {
        let username = username.trim();
        self.get_user(username).await?;
        let name = non_empty(name, "Category name")?;
        validate_limit(monthly_limit_cents)?;

        if self
            .store
            .get_category_by_name(username, name)
            .await?
            .is_some()
        {
            return Err(AppError::CategoryAlreadyExists(name.to_string()));
        }

        let category = match monthly_limit_cents {
            Some(limit) => Category::new(name).with_monthly_limit(limit),
            None => Category::new(name),
        };
        self.store
            .save_category(username, &category)
            .await
            .map_err(|err| on_conflict(err, || AppError::CategoryAlreadyExists(name.to_string())))?;

        tracing::info!(category = %category.name, "created category");
        Ok(category)
    }

    /// Get a category by name, ignoring surrounding whitespace.
    pub async fn get_category(&self, username: &str, name: &str) -> Result<Category, AppError> {
        let name = name.trim();
        self.store
            .get_category_by_name(username.trim(), name)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(name.to_string()))
    }

    /// List a user's categories, ordered by name.
    pub async fn list_categories(&self, username: &str) -> Result<Vec<Category>, AppError> {
        let username = username.trim();
        self.get_user(username).await?;
        Ok(self.store.fetch_categories(username).await?)
    }

    /// Set or clear a category's monthly limit.
    #[instrument(skip(self))]
    pub async fn set_category_limit(
        &self,
        username: &str,
        name: &str,
        monthly_limit_cents: Option<Cents>,
    ) -> Result<Category, AppError> {
        validate_limit(monthly_limit_cents)?;
        let mut category = self.get_category(username, name).await?;

        self.store
            .update_category_limit(category.id, monthly_limit_cents)
            .await?;
        category.monthly_limit_cents = monthly_limit_cents;
        Ok(category)
    }

    /// Delete a category and every transaction recorded against it.
    /// Returns the deleted category and the number of transactions removed.
    #[instrument(skip(self))]
    pub async fn delete_category(
        &self,
        username: &str,
        name: &str,
    ) -> Result<(Category, u64), AppError> {
        let category = self.get_category(username, name).await?;
        let removed = self.store.delete_category(category.id).await?;

        tracing::info!(category = %category.name, removed, "deleted category");
        Ok((category, removed))
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record a transaction and report whether its category is still within
    /// its limit for the month the transaction falls in.
    #[instrument(skip(self, new), fields(category = %new.category, kind = %new.kind))]
    pub async fn record_transaction(
        &self,
        username: &str,
        new: NewTransaction,
    ) -> Result<RecordedTransaction, AppError> {
        if new.amount_cents <= 0 {
            return Err(InvalidInput::NonPositiveAmount(new.amount_cents).into());
        }
        let name = non_empty(&new.name, "Transaction name")?.to_string();

        let username = username.trim();
        self.get_user(username).await?;
        let category = self.get_category(username, &new.category).await?;

        let transaction =
            Transaction::new(name, new.kind, new.amount_cents, new.date, category.id);

        // Sums must include the new row before it is saved
        let mut transactions = self.store.fetch_transactions(username).await?;
        transactions.push(transaction.clone());
        compute_balance(&transactions, transaction.date)?;
        let totals = category_expense_totals(&transactions, transaction.date)?;

        self.store.save_transaction(username, &transaction).await?;

        let month_total = totals.get(&category.id).copied().unwrap_or(0);
        let under_limit = is_under_limit(&category, &totals);

        if !under_limit {
            tracing::warn!(category = %category.name, month_total, "monthly limit exceeded");
        }

        Ok(RecordedTransaction {
            transaction,
            category,
            month_total,
            under_limit,
        })
    }

    /// Every transaction of a user, oldest first.
    pub async fn list_transactions(&self, username: &str) -> Result<Vec<LedgerEntry>, AppError> {
        let snapshot = self.snapshot(username).await?;
        Ok(entries(&snapshot.transactions, &snapshot.categories)?)
    }

    // ========================
    // Views
    // ========================

    /// Balance, recent activity, and category usage as of `now`.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, username: &str, now: NaiveDate) -> Result<Dashboard, AppError> {
        let snapshot = self.snapshot(username).await?;

        let balance = compute_balance(&snapshot.transactions, now)?;
        let totals = category_expense_totals(&snapshot.transactions, now)?;
        let recent = recent_transactions(&snapshot.transactions, RECENT_TRANSACTIONS);

        Ok(Dashboard {
            balance,
            recent: entries(&recent, &snapshot.categories)?,
            categories: category_usage(&snapshot.categories, &totals),
            exceeded: exceeded_limits(&snapshot.categories, &totals),
            as_of: now,
            user: snapshot.user,
        })
    }

    /// Transactions split into `now`'s month and everything before or after it.
    #[instrument(skip(self))]
    pub async fn history(&self, username: &str, now: NaiveDate) -> Result<History, AppError> {
        let snapshot = self.snapshot(username).await?;
        let (current_month, previous) = partition_by_month(&snapshot.transactions, now);

        Ok(History {
            as_of: now,
            current_month: entries(&current_month, &snapshot.categories)?,
            previous: entries(&previous, &snapshot.categories)?,
        })
    }

    /// Pie-chart series of this month's spending per category.
    #[instrument(skip(self))]
    pub async fn spending_report(
        &self,
        username: &str,
        now: NaiveDate,
    ) -> Result<SpendingReport, AppError> {
        let snapshot = self.snapshot(username).await?;
        let totals = category_expense_totals(&snapshot.transactions, now)?;
        let slices = pie_chart_series(&totals, &snapshot.categories)?;
        let total = slices
            .iter()
            .try_fold(0, |sum, slice| add_cents(sum, slice.value))?;

        Ok(SpendingReport {
            as_of: now,
            total,
            slices,
        })
    }

    async fn snapshot(&self, username: &str) -> Result<Snapshot, AppError> {
        let user = self.get_user(username).await?;
        let categories = self.store.fetch_categories(&user.username).await?;
        let transactions = self.store.fetch_transactions(&user.username).await?;
        validate_snapshot(&transactions, &categories)?;

        tracing::debug!(
            categories = categories.len(),
            transactions = transactions.len(),
            "loaded ledger snapshot"
        );
        Ok(Snapshot {
            user,
            categories,
            transactions,
        })
    }
}

fn non_empty<'a>(value: &'a str, what: &'static str) -> Result<&'a str, AppError> {
    match value.trim() {
        "" => Err(AppError::EmptyName(what)),
        trimmed => Ok(trimmed),
    }
}

/// A store-level key collision becomes the caller's typed error; anything else
/// is a database failure.
fn on_conflict(err: anyhow::Error, conflict: impl FnOnce() -> AppError) -> AppError {
    if err.is::<AlreadyExists>() {
        conflict()
    } else {
        AppError::Database(err)
    }
}

fn validate_limit(limit_cents: Option<Cents>) -> Result<(), InvalidInput> {
    match limit_cents {
        Some(limit) if limit <= 0 => Err(InvalidInput::NonPositiveAmount(limit)),
        _ => Ok(()),
    }
}

fn entries(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<Vec<LedgerEntry>, InvalidInput> {
    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    transactions
        .iter()
        .map(|transaction| {
            let category = names
                .get(&transaction.category)
                .ok_or(InvalidInput::UnknownCategory(transaction.category))?;
            Ok(LedgerEntry {
                transaction: transaction.clone(),
                category: category.to_string(),
            })
        })
        .collect()
}
