use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use ledger::{
    Account, Category, Ledger, LedgerError, RecordCmd, TRANSFER_CATEGORY, TransactionFilter,
    TransactionKind, TransferCmd,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let ledger = Ledger::builder().database(db).build();
    ledger.seed_defaults().await.unwrap();
    ledger
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
}

async fn account_named(ledger: &Ledger, name: &str) -> Account {
    ledger
        .accounts()
        .await
        .unwrap()
        .into_iter()
        .find(|account| account.name == name)
        .unwrap()
}

async fn category_named(ledger: &Ledger, name: &str) -> Category {
    ledger
        .categories()
        .await
        .unwrap()
        .into_iter()
        .find(|category| category.name == name)
        .unwrap()
}

async fn record(
    ledger: &Ledger,
    d: u32,
    kind: TransactionKind,
    amount_minor: i64,
    account_id: Uuid,
    category_id: Uuid,
) -> Uuid {
    ledger
        .record(RecordCmd::new(
            day(d),
            kind,
            amount_minor,
            account_id,
            category_id,
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn seed_defaults_creates_accounts_and_categories_once() {
    let ledger = ledger_with_db().await;

    // A second call on a populated database must not duplicate anything.
    ledger.seed_defaults().await.unwrap();

    let accounts = ledger.accounts().await.unwrap();
    let names: Vec<&str> = accounts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Bank", "Cash"]);
    assert!(accounts.iter().all(|a| a.balance_minor == 0));

    let categories = ledger.categories().await.unwrap();
    assert_eq!(categories.len(), 7);
    assert!(categories.iter().any(|c| c.name == "Food"));
    assert!(categories.iter().any(|c| c.name == "Salary"));
}

#[tokio::test]
async fn balance_equals_signed_sum_of_records() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let salary = category_named(&ledger, "Salary").await;
    let food = category_named(&ledger, "Food").await;

    record(&ledger, 1, TransactionKind::Income, 500000, cash.id, salary.id).await;
    record(&ledger, 2, TransactionKind::Expense, 120050, cash.id, food.id).await;
    record(&ledger, 3, TransactionKind::Income, 30000, cash.id, salary.id).await;

    let cash = ledger.account(cash.id).await.unwrap();
    assert_eq!(cash.balance_minor, 500000 - 120050 + 30000);
}

#[tokio::test]
async fn record_rejects_non_positive_amounts() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let food = category_named(&ledger, "Food").await;

    let err = ledger
        .record(RecordCmd::new(
            day(1),
            TransactionKind::Expense,
            0,
            cash.id,
            food.id,
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidAmount("amount_minor must be > 0".to_string())
    );

    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn record_on_unknown_account_reports_not_found() {
    let ledger = ledger_with_db().await;
    let food = category_named(&ledger, "Food").await;

    let err = ledger
        .record(RecordCmd::new(
            day(1),
            TransactionKind::Expense,
            100,
            Uuid::new_v4(),
            food.id,
        ))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::KeyNotFound("account not exists".to_string()));
}

#[tokio::test]
async fn create_account_is_idempotent_by_name() {
    let ledger = ledger_with_db().await;

    let first = ledger.create_account("Savings").await.unwrap();
    let second = ledger.create_account("  savings ").await.unwrap();
    assert_eq!(first, second);

    let accounts = ledger.accounts().await.unwrap();
    assert_eq!(accounts.len(), 3);

    // Seeded names behave the same.
    let cash = account_named(&ledger, "Cash").await;
    assert_eq!(ledger.create_account("CASH").await.unwrap(), cash.id);
    assert_eq!(ledger.accounts().await.unwrap().len(), 3);
}

#[tokio::test]
async fn create_category_is_idempotent_and_rejects_blank_names() {
    let ledger = ledger_with_db().await;
    let food = category_named(&ledger, "Food").await;

    assert_eq!(ledger.create_category("food").await.unwrap(), food.id);
    assert_eq!(ledger.categories().await.unwrap().len(), 7);

    let err = ledger.create_category("   ").await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidName("category name must not be empty".to_string())
    );
}

#[tokio::test]
async fn transfer_moves_funds_and_preserves_the_total() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let bank = account_named(&ledger, "Bank").await;
    let salary = category_named(&ledger, "Salary").await;

    record(&ledger, 1, TransactionKind::Income, 500000, cash.id, salary.id).await;

    ledger
        .transfer(TransferCmd::new(cash.id, bank.id, 200000, day(2)))
        .await
        .unwrap();

    let cash = ledger.account(cash.id).await.unwrap();
    let bank = ledger.account(bank.id).await.unwrap();
    assert_eq!(cash.balance_minor, 300000);
    assert_eq!(bank.balance_minor, 200000);

    let total: i64 = ledger
        .accounts()
        .await
        .unwrap()
        .iter()
        .map(|a| a.balance_minor)
        .sum();
    assert_eq!(total, 500000);

    let transfer_category = category_named(&ledger, TRANSFER_CATEGORY).await;
    let legs = ledger
        .transactions(&TransactionFilter {
            category_id: Some(transfer_category.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(legs.len(), 2);
    assert!(legs.iter().all(|leg| leg.date == day(2)));
    assert!(legs.iter().all(|leg| leg.amount_minor == 200000));
    assert!(legs.iter().any(|leg| leg.kind == TransactionKind::Expense
        && leg.account == "Cash"));
    assert!(legs.iter().any(|leg| leg.kind == TransactionKind::Income
        && leg.account == "Bank"));
}

#[tokio::test]
async fn transfer_with_insufficient_funds_changes_nothing() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let bank = account_named(&ledger, "Bank").await;

    let err = ledger
        .transfer(TransferCmd::new(bank.id, cash.id, 100, day(1)))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::InsufficientFunds("Bank".to_string()));

    let accounts = ledger.accounts().await.unwrap();
    assert!(accounts.iter().all(|a| a.balance_minor == 0));
    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
    // The reserved category is not created by a failed transfer.
    assert_eq!(ledger.categories().await.unwrap().len(), 7);
}

#[tokio::test]
async fn transfer_to_same_account_is_rejected() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let salary = category_named(&ledger, "Salary").await;
    record(&ledger, 1, TransactionKind::Income, 1000, cash.id, salary.id).await;

    let err = ledger
        .transfer(TransferCmd::new(cash.id, cash.id, 500, day(2)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidTransfer("from_account_id and to_account_id must differ".to_string())
    );

    let cash = ledger.account(cash.id).await.unwrap();
    assert_eq!(cash.balance_minor, 1000);
    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn transfer_category_is_created_at_most_once() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let bank = account_named(&ledger, "Bank").await;
    let salary = category_named(&ledger, "Salary").await;

    record(&ledger, 1, TransactionKind::Income, 10000, cash.id, salary.id).await;
    ledger
        .transfer(TransferCmd::new(cash.id, bank.id, 2000, day(2)))
        .await
        .unwrap();
    ledger
        .transfer(TransferCmd::new(cash.id, bank.id, 3000, day(3)))
        .await
        .unwrap();

    let categories = ledger.categories().await.unwrap();
    let transfer_rows: Vec<&Category> = categories
        .iter()
        .filter(|c| c.name == TRANSFER_CATEGORY)
        .collect();
    assert_eq!(transfer_rows.len(), 1);
}

#[tokio::test]
async fn delete_reverses_the_balance_effect() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let salary = category_named(&ledger, "Salary").await;
    let food = category_named(&ledger, "Food").await;

    let income_id =
        record(&ledger, 1, TransactionKind::Income, 100000, cash.id, salary.id).await;
    let expense_id = record(&ledger, 2, TransactionKind::Expense, 25000, cash.id, food.id).await;
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 75000);

    ledger.delete_transaction(expense_id).await.unwrap();
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 100000);

    ledger.delete_transaction(income_id).await.unwrap();
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 0);

    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn delete_missing_transaction_reports_not_found() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let salary = category_named(&ledger, "Salary").await;
    record(&ledger, 1, TransactionKind::Income, 5000, cash.id, salary.id).await;

    let err = ledger.delete_transaction(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::KeyNotFound("transaction not exists".to_string())
    );

    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 5000);
    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn deleting_one_transfer_leg_keeps_the_paired_leg() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let bank = account_named(&ledger, "Bank").await;
    let salary = category_named(&ledger, "Salary").await;

    record(&ledger, 1, TransactionKind::Income, 10000, cash.id, salary.id).await;
    let (expense_leg, income_leg) = ledger
        .transfer(TransferCmd::new(cash.id, bank.id, 4000, day(2)))
        .await
        .unwrap();

    ledger.delete_transaction(expense_leg).await.unwrap();

    // Only the deleted leg's balance effect is reversed.
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 10000);
    assert_eq!(ledger.account(bank.id).await.unwrap().balance_minor, 4000);

    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert!(rows.iter().any(|row| row.id == income_leg));
    assert!(rows.iter().all(|row| row.id != expense_leg));
}

#[tokio::test]
async fn worked_example_keeps_balances_and_ordering() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let bank = account_named(&ledger, "Bank").await;
    let salary = category_named(&ledger, "Salary").await;
    let food = category_named(&ledger, "Food").await;

    record(&ledger, 1, TransactionKind::Income, 500000, cash.id, salary.id).await;
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 500000);

    ledger
        .transfer(TransferCmd::new(cash.id, bank.id, 200000, day(2)))
        .await
        .unwrap();
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 300000);
    assert_eq!(ledger.account(bank.id).await.unwrap().balance_minor, 200000);

    let expense_id = record(&ledger, 3, TransactionKind::Expense, 50000, cash.id, food.id).await;
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 250000);

    ledger.delete_transaction(expense_id).await.unwrap();
    assert_eq!(ledger.account(cash.id).await.unwrap().balance_minor, 300000);

    // Remaining rows: the income and the two transfer legs, newest first.
    let rows = ledger
        .transactions(&TransactionFilter::default())
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|pair| pair[0].date >= pair[1].date));
    assert_eq!(rows[2].date, day(1));

    // Filtered to Cash: the income plus the outgoing transfer leg.
    let cash_rows = ledger
        .transactions(&TransactionFilter {
            account_id: Some(cash.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(cash_rows.len(), 2);
    assert!(cash_rows.iter().all(|row| row.account == "Cash"));
}

#[tokio::test]
async fn query_date_bounds_are_inclusive() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let salary = category_named(&ledger, "Salary").await;
    let food = category_named(&ledger, "Food").await;

    record(&ledger, 1, TransactionKind::Income, 1000, cash.id, salary.id).await;
    record(&ledger, 3, TransactionKind::Expense, 200, cash.id, food.id).await;

    let filter = TransactionFilter {
        start_date: Some(day(1)),
        end_date: Some(day(1)),
        ..Default::default()
    };
    let rows = ledger.transactions(&filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].category, "Salary");

    // A range matching nothing is an empty result, not an error.
    let filter = TransactionFilter {
        start_date: Some(day(10)),
        end_date: Some(day(20)),
        ..Default::default()
    };
    assert!(ledger.transactions(&filter).await.unwrap().is_empty());

    let filter = TransactionFilter {
        start_date: Some(day(5)),
        end_date: Some(day(1)),
        ..Default::default()
    };
    let err = ledger.transactions(&filter).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::InvalidRange("start_date must be <= end_date".to_string())
    );
}

#[tokio::test]
async fn query_filters_by_category() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let salary = category_named(&ledger, "Salary").await;
    let food = category_named(&ledger, "Food").await;

    record(&ledger, 1, TransactionKind::Income, 1000, cash.id, salary.id).await;
    record(&ledger, 2, TransactionKind::Expense, 300, cash.id, food.id).await;
    record(&ledger, 3, TransactionKind::Expense, 150, cash.id, food.id).await;

    let rows = ledger
        .transactions(&TransactionFilter {
            category_id: Some(food.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.category == "Food"));
    assert_eq!(rows[0].date, day(3));
    assert_eq!(rows[1].date, day(2));
}

#[tokio::test]
async fn statistics_exclude_transfer_legs() {
    let ledger = ledger_with_db().await;
    let cash = account_named(&ledger, "Cash").await;
    let bank = account_named(&ledger, "Bank").await;
    let salary = category_named(&ledger, "Salary").await;
    let food = category_named(&ledger, "Food").await;
    let rent = category_named(&ledger, "Rent").await;

    record(&ledger, 1, TransactionKind::Income, 500000, cash.id, salary.id).await;
    record(&ledger, 2, TransactionKind::Expense, 50000, cash.id, food.id).await;
    record(&ledger, 3, TransactionKind::Expense, 120000, cash.id, rent.id).await;
    ledger
        .transfer(TransferCmd::new(cash.id, bank.id, 100000, day(4)))
        .await
        .unwrap();

    let stats = ledger.statistics().await.unwrap();
    assert_eq!(stats.balance_minor, 330000);
    assert_eq!(stats.total_income_minor, 500000);
    assert_eq!(stats.total_expenses_minor, 170000);

    // Breakdown is expense-only, largest first, without the transfer legs.
    assert_eq!(stats.expense_by_category.len(), 2);
    assert_eq!(stats.expense_by_category[0].category, "Rent");
    assert_eq!(stats.expense_by_category[0].total_minor, 120000);
    assert_eq!(stats.expense_by_category[1].category, "Food");
    assert_eq!(stats.expense_by_category[1].total_minor, 50000);
}
