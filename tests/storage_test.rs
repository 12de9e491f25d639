use anyhow::Result;
use spendwise::application::{AlreadyExists, AppError, LedgerService, LedgerStore};
use spendwise::domain::{Category, CategoryId, Cents, Transaction, User};
use spendwise::storage::Repository;
use tempfile::TempDir;

async fn test_repository() -> Result<(Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let repo = Repository::init(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;
    Ok((repo, temp_dir))
}

#[tokio::test]
async fn test_create_user_rolls_back_when_category_insert_fails() -> Result<()> {
    let (repo, _temp) = test_repository().await?;

    let bo_others = Category::new("Others");
    repo.create_user(&User::new("bo", "Bo"), &bo_others).await?;

    // Reusing bo's category id makes the second insert fail after the user row went in
    let failed = repo.create_user(&User::new("ana", "Ana"), &bo_others).await;
    assert!(failed.is_err());
    assert!(repo.get_user("ana").await?.is_none());
    assert!(repo.fetch_categories("ana").await?.is_empty());

    // Nothing was left behind, so signing up again works
    repo.create_user(&User::new("ana", "Ana"), &Category::new("Others"))
        .await?;
    let categories = repo.fetch_categories("ana").await?;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Others");

    Ok(())
}

#[tokio::test]
async fn test_duplicate_inserts_report_already_exists() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    repo.create_user(&User::new("ana", "Ana"), &Category::new("Others"))
        .await?;

    let user = repo
        .create_user(&User::new("ana", "Again"), &Category::new("Others"))
        .await
        .unwrap_err();
    assert!(user.is::<AlreadyExists>());

    repo.save_category("ana", &Category::new("Food")).await?;
    let category = repo
        .save_category("ana", &Category::new("Food"))
        .await
        .unwrap_err();
    assert!(category.is::<AlreadyExists>());
    assert_eq!(category.to_string(), "'Food' already exists");

    Ok(())
}

/// A store whose name lookups always miss, as if a concurrent writer inserted
/// the same name between the service's check and its insert.
struct StaleLookups(Repository);

impl LedgerStore for StaleLookups {
    async fn fetch_transactions(&self, username: &str) -> Result<Vec<Transaction>> {
        self.0.fetch_transactions(username).await
    }

    async fn fetch_categories(&self, username: &str) -> Result<Vec<Category>> {
        self.0.fetch_categories(username).await
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        self.0.get_user(username).await
    }

    async fn create_user(&self, user: &User, default_category: &Category) -> Result<()> {
        self.0.create_user(user, default_category).await
    }

    async fn get_category_by_name(&self, _username: &str, _name: &str) -> Result<Option<Category>> {
        Ok(None)
    }

    async fn save_category(&self, username: &str, category: &Category) -> Result<()> {
        self.0.save_category(username, category).await
    }

    async fn update_category_limit(&self, id: CategoryId, limit_cents: Option<Cents>) -> Result<()> {
        self.0.update_category_limit(id, limit_cents).await
    }

    async fn delete_category(&self, id: CategoryId) -> Result<u64> {
        self.0.delete_category(id).await
    }

    async fn save_transaction(&self, username: &str, transaction: &Transaction) -> Result<()> {
        self.0.save_transaction(username, transaction).await
    }
}

#[tokio::test]
async fn test_racing_duplicate_category_is_typed() -> Result<()> {
    let (repo, _temp) = test_repository().await?;
    let service = LedgerService::new(StaleLookups(repo));
    service.register_user("ana", "Ana").await?;

    service.add_category("ana", "Food", None).await?;
    let duplicate = service.add_category("ana", "Food", Some(1000)).await;

    assert!(matches!(duplicate, Err(AppError::CategoryAlreadyExists(name)) if name == "Food"));
    assert_eq!(service.list_categories("ana").await?.len(), 2);
    Ok(())
}
