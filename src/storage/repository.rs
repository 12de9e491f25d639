use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::application::{AlreadyExists, LedgerStore};
use crate::domain::{Category, CategoryId, Cents, Transaction, TransactionKind, User};

use super::MIGRATION_001_INITIAL;

/// Dates are stored as ISO text so they sort and compare lexically.
const DATE_FORMAT: &str = "%Y-%m-%d";

const INSERT_CATEGORY: &str = r#"
    INSERT INTO categories (id, username, name, monthly_limit_cents, created_at)
    VALUES (?, ?, ?, ?, ?)
"#;

/// Repository for persisting and querying users, categories and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the schema if it doesn't exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let created_at_str: String = row.get("created_at");

        Ok(User {
            username: row.get("username"),
            display_name: row.get("display_name"),
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
        })
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Category {
            id: Uuid::parse_str(&id_str).context("Invalid category ID")?,
            name: row.get("name"),
            monthly_limit_cents: row.get("monthly_limit_cents"),
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
        })
    }

    fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction> {
        let id_str: String = row.get("id");
        let category_str: String = row.get("category_id");
        let kind_str: String = row.get("kind");
        let date_str: String = row.get("date");
        let recorded_at_str: String = row.get("recorded_at");

        Ok(Transaction {
            id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
            name: row.get("name"),
            kind: TransactionKind::from_str(&kind_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
            amount_cents: row.get("amount_cents"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid transaction date: {}", date_str))?,
            category: Uuid::parse_str(&category_str).context("Invalid category ID")?,
            recorded_at: parse_timestamp(&recorded_at_str).context("Invalid recorded_at")?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// Unique-key collisions surface as [`AlreadyExists`] naming `key`; any other
/// failure keeps its sqlx cause under `context`.
fn insert_error(err: sqlx::Error, key: &str, context: &'static str) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AlreadyExists(key.to_string()).into(),
        _ => anyhow::Error::new(err).context(context),
    }
}

impl LedgerStore for Repository {
    async fn fetch_transactions(&self, username: &str) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r#"
            SELECT id, category_id, name, kind, amount_cents, date, recorded_at
            FROM transactions
            WHERE username = ?
            ORDER BY date, rowid
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    async fn fetch_categories(&self, username: &str) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, monthly_limit_cents, created_at
            FROM categories
            WHERE username = ?
            ORDER BY name
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT username, display_name, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn create_user(&self, user: &User, default_category: &Category) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO users (username, display_name, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(user.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| insert_error(e, &user.username, "Failed to save user"))?;

        sqlx::query(INSERT_CATEGORY)
            .bind(default_category.id.to_string())
            .bind(&user.username)
            .bind(&default_category.name)
            .bind(default_category.monthly_limit_cents)
            .bind(default_category.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, &user.username, "Failed to save default category"))?;

        tx.commit().await.context("Failed to commit user creation")?;
        Ok(())
    }

    async fn get_category_by_name(&self, username: &str, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, monthly_limit_cents, created_at
            FROM categories
            WHERE username = ? AND name = ?
            "#,
        )
        .bind(username)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category by name")?;

        row.as_ref().map(Self::row_to_category).transpose()
    }

    async fn save_category(&self, username: &str, category: &Category) -> Result<()> {
        sqlx::query(INSERT_CATEGORY)
            .bind(category.id.to_string())
            .bind(username)
            .bind(&category.name)
            .bind(category.monthly_limit_cents)
            .bind(category.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, &category.name, "Failed to save category"))?;
        Ok(())
    }

    async fn update_category_limit(&self, id: CategoryId, limit_cents: Option<Cents>) -> Result<()> {
        sqlx::query("UPDATE categories SET monthly_limit_cents = ? WHERE id = ?")
            .bind(limit_cents)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update category limit")?;
        Ok(())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<u64> {
        let id_str = id.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let removed = sqlx::query("DELETE FROM transactions WHERE category_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .context("Failed to delete category transactions")?
            .rows_affected();

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .context("Failed to delete category")?;

        tx.commit().await.context("Failed to commit category deletion")?;
        Ok(removed)
    }

    async fn save_transaction(&self, username: &str, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (id, username, category_id, name, kind, amount_cents, date, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.to_string())
        .bind(username)
        .bind(transaction.category.to_string())
        .bind(&transaction.name)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount_cents)
        .bind(transaction.date.format(DATE_FORMAT).to_string())
        .bind(transaction.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;
        Ok(())
    }
}
