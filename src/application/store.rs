use std::future::Future;

use anyhow::Result;
use thiserror::Error;

use crate::domain::{Category, CategoryId, Cents, Transaction, User};

/// An insert collided with an existing username or per-user category name.
///
/// Stores return it inside their `anyhow` error, unwrapped, so the service can
/// tell a taken key apart from any other storage failure.
#[derive(Error, Debug)]
#[error("'{0}' already exists")]
pub struct AlreadyExists(pub String);

/// Persistence port the service reads snapshots from and writes through.
///
/// Every query is scoped to one user. Implementations translate their own
/// failures into `anyhow` errors; the service wraps them as `AppError::Database`.
pub trait LedgerStore: Send + Sync {
    /// All of a user's transactions, oldest first (by date, then recording order).
    fn fetch_transactions(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<Transaction>>> + Send;

    /// All of a user's categories, ordered by name.
    fn fetch_categories(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<Category>>> + Send;

    fn get_user(&self, username: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Store a new user together with their default category, all or nothing.
    fn create_user(
        &self,
        user: &User,
        default_category: &Category,
    ) -> impl Future<Output = Result<()>> + Send;

    fn get_category_by_name(
        &self,
        username: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<Category>>> + Send;

    fn save_category(
        &self,
        username: &str,
        category: &Category,
    ) -> impl Future<Output = Result<()>> + Send;

    fn update_category_limit(
        &self,
        id: CategoryId,
        limit_cents: Option<Cents>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a category together with its transactions.
    /// Returns how many transactions were removed.
    fn delete_category(&self, id: CategoryId) -> impl Future<Output = Result<u64>> + Send;

    fn save_transaction(
        &self,
        username: &str,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<()>> + Send;
}
