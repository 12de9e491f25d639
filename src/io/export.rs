use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{LedgerService, LedgerStore};
use crate::domain::{Category, Transaction, User, format_cents};

/// Everything one user owns, for a full JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub user: User,
    pub categories: Vec<Category>,
    pub transactions: Vec<Transaction>,
}

/// Exporter for writing a user's ledger in various formats
pub struct Exporter<'a, S: LedgerStore> {
    service: &'a LedgerService<S>,
}

impl<'a, S: LedgerStore> Exporter<'a, S> {
    pub fn new(service: &'a LedgerService<S>) -> Self {
        Self { service }
    }

    /// Export a user's transaction history to CSV, oldest first
    pub async fn export_transactions_csv<W: Write>(&self, username: &str, writer: W) -> Result<usize> {
        let entries = self.service.list_transactions(username).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "name",
            "kind",
            "amount",
            "category",
            "recorded_at",
        ])?;

        for entry in &entries {
            let transaction = &entry.transaction;
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.date.format("%Y-%m-%d").to_string(),
                transaction.name.clone(),
                transaction.kind.as_str().to_string(),
                format_cents(transaction.amount_cents),
                entry.category.clone(),
                transaction.recorded_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(entries.len())
    }

    /// Export categories with their limits to CSV
    pub async fn export_categories_csv<W: Write>(&self, username: &str, writer: W) -> Result<usize> {
        let categories = self.service.list_categories(username).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["name", "monthly_limit"])?;

        for category in &categories {
            csv_writer.write_record([
                category.name.clone(),
                category
                    .monthly_limit_cents
                    .map(format_cents)
                    .unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(categories.len())
    }

    /// Export everything the user owns as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, username: &str, mut writer: W) -> Result<UserSnapshot> {
        let user = self.service.get_user(username).await?;
        let categories = self.service.list_categories(username).await?;
        let transactions = self
            .service
            .list_transactions(username)
            .await?
            .into_iter()
            .map(|entry| entry.transaction)
            .collect();

        let snapshot = UserSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            user,
            categories,
            transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
