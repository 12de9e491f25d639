// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use spendwise::application::{LedgerService, NewTransaction, RecordedTransaction};
use spendwise::domain::{Cents, TransactionKind};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into a NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: a registered user with a few categories
pub struct StandardUser;

impl StandardUser {
    pub const USERNAME: &'static str = "ana";

    /// Register "ana" (gets "Others" automatically)
    pub async fn create_basic(service: &LedgerService) -> Result<()> {
        service.register_user(Self::USERNAME, "Ana").await?;
        Ok(())
    }

    /// Register "ana" plus Food (limit 1000.00), Rent and Fun (limit 100.00)
    pub async fn create_with_categories(service: &LedgerService) -> Result<()> {
        Self::create_basic(service).await?;
        service
            .add_category(Self::USERNAME, "Food", Some(100000))
            .await?;
        service.add_category(Self::USERNAME, "Rent", None).await?;
        service
            .add_category(Self::USERNAME, "Fun", Some(10000))
            .await?;
        Ok(())
    }
}

pub async fn record(
    service: &LedgerService,
    kind: TransactionKind,
    name: &str,
    amount_cents: Cents,
    date: &str,
    category: &str,
) -> Result<RecordedTransaction> {
    Ok(service
        .record_transaction(
            StandardUser::USERNAME,
            NewTransaction {
                name: name.to_string(),
                kind,
                amount_cents,
                date: parse_date(date),
                category: category.to_string(),
            },
        )
        .await?)
}

pub async fn income(
    service: &LedgerService,
    amount_cents: Cents,
    date: &str,
) -> Result<RecordedTransaction> {
    record(service, TransactionKind::Income, "Salary", amount_cents, date, "Others").await
}

pub async fn expense(
    service: &LedgerService,
    name: &str,
    amount_cents: Cents,
    date: &str,
    category: &str,
) -> Result<RecordedTransaction> {
    record(service, TransactionKind::Expense, name, amount_cents, date, category).await
}
