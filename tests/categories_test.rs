mod common;

use anyhow::Result;
use common::{StandardUser, expense, parse_date, test_service};
use spendwise::application::{AppError, NewTransaction};
use spendwise::domain::{InvalidInput, TransactionKind};

#[tokio::test]
async fn test_signup_creates_default_category() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service.register_user("ana", "Ana Lima").await?;
    assert_eq!(user.username, "ana");
    assert_eq!(user.display_name, "Ana Lima");

    let categories = service.list_categories("ana").await?;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Others");
    assert!(categories[0].monthly_limit_cents.is_none());

    Ok(())
}

#[tokio::test]
async fn test_signup_rejects_duplicate_username() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.register_user("ana", "Ana").await?;
    let result = service.register_user("ana", "Someone else").await;

    assert!(matches!(result, Err(AppError::UserAlreadyExists(name)) if name == "ana"));
    Ok(())
}

#[tokio::test]
async fn test_signup_defaults_display_name() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service.register_user("  bo ", "").await?;
    assert_eq!(user.username, "bo");
    assert_eq!(user.display_name, "bo");

    assert!(matches!(
        service.register_user("   ", "x").await,
        Err(AppError::EmptyName(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_add_category_rejects_duplicates_per_user() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardUser::create_basic(&service).await?;
    service.register_user("bo", "Bo").await?;

    service.add_category("ana", "Food", Some(100000)).await?;
    let duplicate = service.add_category("ana", "Food", None).await;
    assert!(matches!(duplicate, Err(AppError::CategoryAlreadyExists(_))));

    // Another user may reuse the name
    let other = service.add_category("bo", "Food", None).await?;
    assert_eq!(other.name, "Food");

    let names: Vec<String> = service
        .list_categories("ana")
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Food", "Others"]);

    Ok(())
}

#[tokio::test]
async fn test_add_category_rejects_bad_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardUser::create_basic(&service).await?;

    let result = service.add_category("ana", "Food", Some(0)).await;
    assert!(matches!(
        result,
        Err(AppError::InvalidInput(InvalidInput::NonPositiveAmount(0)))
    ));
    Ok(())
}

#[tokio::test]
async fn test_add_category_requires_existing_user() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.add_category("ghost", "Food", None).await;
    assert!(matches!(result, Err(AppError::UserNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_set_and_clear_limit() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardUser::create_with_categories(&service).await?;

    let updated = service.set_category_limit("ana", "Rent", Some(90000)).await?;
    assert_eq!(updated.monthly_limit_cents, Some(90000));
    assert_eq!(
        service.get_category("ana", "Rent").await?.monthly_limit_cents,
        Some(90000)
    );

    service.set_category_limit("ana", "Rent", None).await?;
    assert_eq!(
        service.get_category("ana", "Rent").await?.monthly_limit_cents,
        None
    );

    let missing = service.set_category_limit("ana", "Travel", Some(1)).await;
    assert!(matches!(missing, Err(AppError::CategoryNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_delete_category_removes_its_transactions() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardUser::create_with_categories(&service).await?;

    expense(&service, "Market", 2000, "2024-03-01", "Food").await?;
    expense(&service, "Bakery", 500, "2024-03-02", "Food").await?;
    expense(&service, "March rent", 90000, "2024-03-01", "Rent").await?;

    let (deleted, removed) = service.delete_category("ana", "Food").await?;
    assert_eq!(deleted.name, "Food");
    assert_eq!(removed, 2);

    let history = service.history("ana", parse_date("2024-03-15")).await?;
    assert_eq!(history.current_month.len(), 1);
    assert_eq!(history.current_month[0].category, "Rent");

    let missing = service.delete_category("ana", "Food").await;
    assert!(matches!(missing, Err(AppError::CategoryNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_lookups_ignore_surrounding_whitespace() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.register_user(" bo ", "Bo").await?;
    service.add_category(" bo ", " Food ", Some(10000)).await?;

    assert_eq!(service.get_user(" bo ").await?.username, "bo");
    assert_eq!(service.get_category(" bo ", " Food ").await?.name, "Food");
    assert_eq!(service.list_categories(" bo ").await?.len(), 2);

    let recorded = service
        .record_transaction(
            " bo ",
            NewTransaction {
                name: "Market".into(),
                kind: TransactionKind::Expense,
                amount_cents: 2500,
                date: parse_date("2024-03-02"),
                category: " Food ".into(),
            },
        )
        .await?;
    assert_eq!(recorded.category.name, "Food");
    assert_eq!(recorded.month_total, 2500);

    service.set_category_limit("bo", " Food ", None).await?;
    let dashboard = service.dashboard(" bo ", parse_date("2024-03-15")).await?;
    assert_eq!(dashboard.balance.current_month_expense, 2500);

    let duplicate = service.add_category("bo", "Food ", None).await;
    assert!(matches!(duplicate, Err(AppError::CategoryAlreadyExists(name)) if name == "Food"));

    let (deleted, removed) = service.delete_category(" bo", "Food").await?;
    assert_eq!(deleted.name, "Food");
    assert_eq!(removed, 1);
    Ok(())
}
