use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::application::{Dashboard, History, LedgerEntry, LedgerService, NewTransaction};
use crate::domain::{
    DEFAULT_CATEGORY, TransactionKind, format_cents, parse_date, parse_positive_cents,
};

/// Spendwise - personal finance tracker
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Track income and expenses against categories with monthly limits")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SPENDWISE_DATABASE", default_value = "spendwise.db")]
    pub database: String,

    /// User whose ledger to work on
    #[arg(short, long, env = "SPENDWISE_USER", global = true)]
    pub user: Option<String>,

    /// Reference date treated as "today" (YYYY-MM-DD, defaults to the local date)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Register a new user (creates the default "Others" category)
    Signup {
        /// Unique username
        username: String,

        /// Name shown on the dashboard (defaults to the username)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Record an income or expense transaction
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// What the transaction was for
        #[arg(short, long)]
        name: String,

        /// Transaction kind: income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Category name
        #[arg(short, long, default_value = DEFAULT_CATEGORY)]
        category: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show balance, recent transactions and category usage
    Dashboard {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show this month's transactions and earlier ones
    History {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Spending per category this month (pie-chart series)
    Report {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export the user's data
    Export {
        /// What to export: transactions, categories, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Add {
        /// Category name (must be unique)
        name: String,

        /// Monthly spending limit (e.g., "400" or "400.00")
        #[arg(short, long)]
        limit: Option<String>,
    },

    /// List categories with this month's spending
    List,

    /// Set or clear a category's monthly limit
    Limit {
        /// Category name
        name: String,

        /// New monthly limit
        #[arg(short, long, conflicts_with = "clear", required_unless_present = "clear")]
        amount: Option<String>,

        /// Remove the limit
        #[arg(long)]
        clear: bool,
    },

    /// Delete a category and all of its transactions
    Delete {
        /// Category name
        name: String,
    },
}

impl Cli {
    fn username(&self) -> Result<&str> {
        self.user
            .as_deref()
            .context("No user selected. Pass --user or set SPENDWISE_USER")
    }

    fn reference_date(&self) -> Result<NaiveDate> {
        match &self.today {
            Some(date_str) => Ok(parse_date(date_str)?),
            None => Ok(Local::now().date_naive()),
        }
    }

    pub async fn run(self) -> Result<()> {
        let today = self.reference_date()?;

        match &self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Signup { username, name } => {
                let service = LedgerService::connect(&self.database).await?;
                let user = service
                    .register_user(username, name.as_deref().unwrap_or_default())
                    .await?;
                println!(
                    "Registered user: {} ({}) with category '{}'",
                    user.username, user.display_name, DEFAULT_CATEGORY
                );
            }

            Commands::Category(cmd) => {
                let service = LedgerService::connect(&self.database).await?;
                run_category_command(&service, self.username()?, cmd, today).await?;
            }

            Commands::Add {
                amount,
                name,
                kind,
                category,
                date,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let kind = TransactionKind::from_str(kind).with_context(|| {
                    format!("Invalid kind '{}'. Valid kinds: income, expense", kind)
                })?;
                let date = match date {
                    Some(date_str) => parse_date(date_str)?,
                    None => today,
                };

                let recorded = service
                    .record_transaction(
                        self.username()?,
                        NewTransaction {
                            name: name.clone(),
                            kind,
                            amount_cents: parse_positive_cents(amount)?,
                            date,
                            category: category.clone(),
                        },
                    )
                    .await?;

                println!(
                    "Recorded {}: {} {} [{}] on {} ({})",
                    recorded.transaction.kind,
                    format_cents(recorded.transaction.amount_cents),
                    recorded.transaction.name,
                    recorded.category.name,
                    recorded.transaction.date,
                    recorded.transaction.id
                );
                if !recorded.under_limit {
                    println!(
                        "Warning: '{}' is over its monthly limit ({} of {})",
                        recorded.category.name,
                        format_cents(recorded.month_total),
                        format_cents(recorded.category.monthly_limit_cents.unwrap_or_default())
                    );
                }
            }

            Commands::Dashboard { format } => {
                let service = LedgerService::connect(&self.database).await?;
                let dashboard = service.dashboard(self.username()?, today).await?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&dashboard)?),
                    _ => print_dashboard(&dashboard),
                }
            }

            Commands::History { format } => {
                let service = LedgerService::connect(&self.database).await?;
                let history = service.history(self.username()?, today).await?;
                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&history)?),
                    _ => print_history(&history),
                }
            }

            Commands::Report { format } => {
                let service = LedgerService::connect(&self.database).await?;
                let report = service.spending_report(self.username()?, today).await?;

                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                    "csv" => {
                        println!("category,value");
                        for slice in &report.slices {
                            println!("{},{}", slice.category, format_cents(slice.value));
                        }
                    }
                    _ => {
                        println!("Spending Report for {}", report.as_of.format("%B %Y"));
                        println!();
                        if report.is_empty() {
                            println!("No expense transactions this month.");
                        } else {
                            println!("{:<20} {:>12} {:>8}", "CATEGORY", "SPENT", "PERCENT");
                            println!("{}", "-".repeat(42));
                            for slice in &report.slices {
                                let percentage = slice.value as f64 / report.total as f64 * 100.0;
                                println!(
                                    "{:<20} {:>12} {:>7.1}%",
                                    truncate(&slice.category, 20),
                                    format_cents(slice.value),
                                    percentage
                                );
                            }
                            println!("{}", "-".repeat(42));
                            println!("{:<20} {:>12}", "TOTAL", format_cents(report.total));
                        }
                    }
                }
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                run_export_command(&service, self.username()?, export_type, output.as_deref())
                    .await?;
            }
        }

        Ok(())
    }
}

async fn run_category_command(
    service: &LedgerService,
    username: &str,
    cmd: &CategoryCommands,
    today: NaiveDate,
) -> Result<()> {
    match cmd {
        CategoryCommands::Add { name, limit } => {
            let limit_cents = limit
                .as_deref()
                .map(parse_positive_cents)
                .transpose()?;
            let category = service.add_category(username, name, limit_cents).await?;
            match category.monthly_limit_cents {
                Some(limit) => println!(
                    "Created category: {} (limit {})",
                    category.name,
                    format_cents(limit)
                ),
                None => println!("Created category: {}", category.name),
            }
        }

        CategoryCommands::List => {
            let dashboard = service.dashboard(username, today).await?;
            if dashboard.categories.is_empty() {
                println!("No categories found.");
            } else {
                println!(
                    "{:<20} {:>12} {:>12} {:<8}",
                    "NAME", "SPENT", "LIMIT", "STATUS"
                );
                println!("{}", "-".repeat(56));
                for usage in &dashboard.categories {
                    println!(
                        "{:<20} {:>12} {:>12} {:<8}",
                        truncate(&usage.category.name, 20),
                        format_cents(usage.total_expense_this_month),
                        usage
                            .category
                            .monthly_limit_cents
                            .map(format_cents)
                            .unwrap_or_else(|| "-".to_string()),
                        if usage.under_limit { "ok" } else { "EXCEEDED" }
                    );
                }
            }
        }

        CategoryCommands::Limit {
            name,
            amount,
            clear,
        } => {
            let limit_cents = if *clear {
                None
            } else {
                amount.as_deref().map(parse_positive_cents).transpose()?
            };
            let category = service.set_category_limit(username, name, limit_cents).await?;
            match category.monthly_limit_cents {
                Some(limit) => println!("{}: limit set to {}", category.name, format_cents(limit)),
                None => println!("{}: limit removed", category.name),
            }
        }

        CategoryCommands::Delete { name } => {
            let (category, removed) = service.delete_category(username, name).await?;
            println!(
                "Deleted category: {} ({} transactions removed)",
                category.name, removed
            );
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    username: &str,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "transactions" => {
            let count = exporter.export_transactions_csv(username, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        "categories" => {
            let count = exporter.export_categories_csv(username, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} categories", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(username, writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported {} categories and {} transactions",
                    snapshot.categories.len(),
                    snapshot.transactions.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: transactions, categories, full",
                export_type
            );
        }
    }

    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("Welcome, {}", dashboard.user.display_name);
    println!("As of {}", dashboard.as_of);
    println!();

    if let Some(banner) = dashboard.limit_banner() {
        println!("!! {}", banner);
        println!();
    }

    println!("Balance:        {:>15}", format_cents(dashboard.balance.balance));
    println!(
        "Expense (month):{:>15}",
        format_cents(dashboard.balance.current_month_expense)
    );
    println!();

    println!("Recent transactions:");
    if dashboard.recent.is_empty() {
        println!("  No transactions yet.");
    } else {
        print_entries(&dashboard.recent);
    }
    println!();

    println!("Categories:");
    for usage in &dashboard.categories {
        match (usage.category.monthly_limit_cents, usage.remaining()) {
            (Some(limit), Some(left)) => println!(
                "  {:<20} {:>12} / {:<12} {}",
                truncate(&usage.category.name, 20),
                format_cents(usage.total_expense_this_month),
                format_cents(limit),
                if left >= 0 {
                    format!("{} left", format_cents(left))
                } else {
                    format!("over by {}", format_cents(-left))
                }
            ),
            _ => println!(
                "  {:<20} {:>12}",
                truncate(&usage.category.name, 20),
                format_cents(usage.total_expense_this_month)
            ),
        }
    }
}

fn print_history(history: &History) {
    println!("This month ({}):", history.as_of.format("%B %Y"));
    if history.current_month.is_empty() {
        println!("  No transactions this month.");
    } else {
        print_entries(&history.current_month);
    }
    println!();

    println!("Other months:");
    if history.previous.is_empty() {
        println!("  No transactions.");
    } else {
        print_entries(&history.previous);
    }
}

fn print_entries(entries: &[LedgerEntry]) {
    println!(
        "  {:<12} {:<8} {:>12} {:<15} NAME",
        "DATE", "KIND", "AMOUNT", "CATEGORY"
    );
    println!("  {}", "-".repeat(70));
    for entry in entries {
        let transaction = &entry.transaction;
        println!(
            "  {:<12} {:<8} {:>12} {:<15} {}",
            transaction.date.format("%Y-%m-%d"),
            transaction.kind,
            format_cents(transaction.amount_cents),
            truncate(&entry.category, 15),
            truncate(&transaction.name, 30)
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
