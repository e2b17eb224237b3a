//! The ledger operations: seeding, reference data, recording, transfers,
//! deletion with balance reversal, filtered queries and summary statistics.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Statement, TransactionTrait, Value,
};
use uuid::Uuid;

use crate::{
    Account, Category, Ledger, LedgerError, RecordCmd, ResultLedger, Transaction, TransactionKind,
    TransferCmd, accounts, categories, transactions, util,
};

/// Reserved category for inter-account transfers. Created on first use,
/// at most one row ever exists.
pub const TRANSFER_CATEGORY: &str = "Transfer";

const DEFAULT_CATEGORIES: [&str; 7] = [
    "Food",
    "Transport",
    "Rent",
    "Bills",
    "Salary",
    "Shopping",
    "Misc",
];
const DEFAULT_ACCOUNTS: [&str; 2] = ["Cash", "Bank"];

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Filters for the transaction listing. Absent fields do not constrain.
///
/// Both date bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

fn validate_filter(filter: &TransactionFilter) -> ResultLedger<()> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date)
        && start > end
    {
        return Err(LedgerError::InvalidRange(
            "start_date must be <= end_date".to_string(),
        ));
    }
    Ok(())
}

/// One row of the transaction listing, with account/category resolved to
/// their names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub account: String,
    pub category: String,
    pub note: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct TransactionRowRaw {
    id: String,
    date: NaiveDate,
    kind: String,
    amount_minor: i64,
    account: String,
    category: String,
    note: Option<String>,
}

impl TryFrom<TransactionRowRaw> for TransactionRow {
    type Error = LedgerError;

    fn try_from(raw: TransactionRowRaw) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&raw.id, "transaction")?,
            date: raw.date,
            kind: TransactionKind::try_from(raw.kind.as_str())?,
            amount_minor: raw.amount_minor,
            account: raw.account,
            category: raw.category,
            note: raw.note,
        })
    }
}

/// Summary totals for the dashboard.
///
/// Transfer legs move account balances but are excluded from the
/// income/expense totals and the category breakdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub balance_minor: i64,
    pub total_income_minor: i64,
    pub total_expenses_minor: i64,
    pub expense_by_category: Vec<CategoryTotal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total_minor: i64,
}

async fn find_account(
    db_tx: &DatabaseTransaction,
    account_id: Uuid,
) -> ResultLedger<accounts::Model> {
    accounts::Entity::find_by_id(account_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound("account not exists".to_string()))
}

async fn find_category(
    db_tx: &DatabaseTransaction,
    category_id: Uuid,
) -> ResultLedger<categories::Model> {
    categories::Entity::find_by_id(category_id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound("category not exists".to_string()))
}

async fn set_balance(
    db_tx: &DatabaseTransaction,
    account_id: &str,
    balance_minor: i64,
) -> ResultLedger<()> {
    let account_model = accounts::ActiveModel {
        id: ActiveValue::Set(account_id.to_string()),
        balance_minor: ActiveValue::Set(balance_minor),
        ..Default::default()
    };
    account_model.update(db_tx).await?;
    Ok(())
}

/// Resolve the reserved transfer category, creating it on first use.
///
/// Runs inside the caller's database transaction, so the lookup and the
/// insert are atomic with the rest of the transfer.
async fn transfer_category_id(db_tx: &DatabaseTransaction) -> ResultLedger<Uuid> {
    let key = util::name_key(TRANSFER_CATEGORY);
    let existing = categories::Entity::find()
        .filter(categories::Column::NameNorm.eq(key.as_str()))
        .one(db_tx)
        .await?;
    match existing {
        Some(model) => util::parse_uuid(&model.id, "category"),
        None => {
            let category = Category::new(TRANSFER_CATEGORY.to_string());
            categories::ActiveModel::from(&category).insert(db_tx).await?;
            Ok(category.id)
        }
    }
}

impl Ledger {
    /// Seed default reference data on an empty database.
    ///
    /// Idempotent, called on every start: default categories are inserted
    /// only when the category table is empty, default accounts only when the
    /// account table is empty.
    pub async fn seed_defaults(&self) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            if categories::Entity::find().count(&db_tx).await? == 0 {
                for name in DEFAULT_CATEGORIES {
                    let category = Category::new(name.to_string());
                    categories::ActiveModel::from(&category)
                        .insert(&db_tx)
                        .await?;
                }
            }
            if accounts::Entity::find().count(&db_tx).await? == 0 {
                for name in DEFAULT_ACCOUNTS {
                    let account = Account::new(name.to_string());
                    accounts::ActiveModel::from(&account).insert(&db_tx).await?;
                }
            }
            Ok(())
        })
    }

    /// Create an account, idempotent by normalized name.
    ///
    /// Returns the id of the existing row when the name is already taken.
    pub async fn create_account(&self, name: &str) -> ResultLedger<Uuid> {
        let name = util::normalize_name(name, "account")?;
        let key = util::name_key(&name);
        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::NameNorm.eq(key.as_str()))
                .one(&db_tx)
                .await?;
            match existing {
                Some(model) => util::parse_uuid(&model.id, "account"),
                None => {
                    let account = Account::new(name);
                    accounts::ActiveModel::from(&account).insert(&db_tx).await?;
                    Ok(account.id)
                }
            }
        })
    }

    /// Create a category, idempotent by normalized name.
    pub async fn create_category(&self, name: &str) -> ResultLedger<Uuid> {
        let name = util::normalize_name(name, "category")?;
        let key = util::name_key(&name);
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(key.as_str()))
                .one(&db_tx)
                .await?;
            match existing {
                Some(model) => util::parse_uuid(&model.id, "category"),
                None => {
                    let category = Category::new(name);
                    categories::ActiveModel::from(&category)
                        .insert(&db_tx)
                        .await?;
                    Ok(category.id)
                }
            }
        })
    }

    /// List all accounts, ordered by name.
    pub async fn accounts(&self) -> ResultLedger<Vec<Account>> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// List all categories, ordered by name.
    pub async fn categories(&self) -> ResultLedger<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        models.into_iter().map(Category::try_from).collect()
    }

    /// Return a single account.
    pub async fn account(&self, account_id: Uuid) -> ResultLedger<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Record one income or expense transaction.
    ///
    /// The row insert and the account balance update happen in one database
    /// transaction: either both apply or neither does.
    pub async fn record(&self, cmd: RecordCmd) -> ResultLedger<Uuid> {
        let note = util::normalize_optional_text(cmd.note.as_deref());
        let tx = Transaction::new(
            cmd.date,
            cmd.kind,
            cmd.amount_minor,
            cmd.account_id,
            cmd.category_id,
            note,
        )?;

        with_tx!(self, |db_tx| {
            let account = find_account(&db_tx, cmd.account_id).await?;
            find_category(&db_tx, cmd.category_id).await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            set_balance(
                &db_tx,
                &account.id,
                account.balance_minor + tx.signed_amount_minor(),
            )
            .await?;
            Ok(tx.id)
        })
    }

    /// Move funds between two accounts.
    ///
    /// Inserts an expense leg on the source and an income leg on the
    /// destination, both dated `cmd.date`, both in the reserved "Transfer"
    /// category, and updates both balances, all four mutations in one
    /// database transaction. Fails with [`LedgerError::InsufficientFunds`]
    /// and no mutation when the source balance is below the amount.
    ///
    /// Returns the ids of the two legs as `(expense, income)`.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultLedger<(Uuid, Uuid)> {
        if cmd.from_account_id == cmd.to_account_id {
            return Err(LedgerError::InvalidTransfer(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        if cmd.amount_minor <= 0 {
            return Err(LedgerError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let from = find_account(&db_tx, cmd.from_account_id).await?;
            let to = find_account(&db_tx, cmd.to_account_id).await?;

            if from.balance_minor < cmd.amount_minor {
                return Err(LedgerError::InsufficientFunds(from.name));
            }

            let category_id = transfer_category_id(&db_tx).await?;
            let expense = Transaction::new(
                cmd.date,
                TransactionKind::Expense,
                cmd.amount_minor,
                cmd.from_account_id,
                category_id,
                Some(TRANSFER_CATEGORY.to_string()),
            )?;
            let income = Transaction::new(
                cmd.date,
                TransactionKind::Income,
                cmd.amount_minor,
                cmd.to_account_id,
                category_id,
                Some(TRANSFER_CATEGORY.to_string()),
            )?;

            transactions::ActiveModel::from(&expense)
                .insert(&db_tx)
                .await?;
            transactions::ActiveModel::from(&income)
                .insert(&db_tx)
                .await?;
            set_balance(&db_tx, &from.id, from.balance_minor - cmd.amount_minor).await?;
            set_balance(&db_tx, &to.id, to.balance_minor + cmd.amount_minor).await?;

            Ok((expense.id, income.id))
        })
    }

    /// Delete a transaction, reversing its balance effect.
    ///
    /// After deletion the account balance equals what it would have been had
    /// the transaction never been recorded. Deleting one leg of a transfer
    /// leaves the paired leg untouched.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::KeyNotFound("transaction not exists".to_string()))?;
            let kind = TransactionKind::try_from(tx_model.kind.as_str())?;
            let account_id = util::parse_uuid(&tx_model.account_id, "account")?;
            let account = find_account(&db_tx, account_id).await?;

            set_balance(
                &db_tx,
                &account.id,
                account.balance_minor - kind.sign() * tx_model.amount_minor,
            )
            .await?;
            transactions::Entity::delete_by_id(tx_model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// List transactions matching `filter`, newest first.
    ///
    /// Account and category references are resolved to their names. Ordering
    /// is `date DESC, id DESC` so ties are deterministic.
    pub async fn transactions(
        &self,
        filter: &TransactionFilter,
    ) -> ResultLedger<Vec<TransactionRow>> {
        validate_filter(filter)?;

        let mut query = transactions::Entity::find()
            .join(JoinType::InnerJoin, transactions::Relation::Accounts.def())
            .join(
                JoinType::InnerJoin,
                transactions::Relation::Categories.def(),
            )
            .select_only()
            .column(transactions::Column::Id)
            .column(transactions::Column::Date)
            .column(transactions::Column::Kind)
            .column(transactions::Column::AmountMinor)
            .column_as(accounts::Column::Name, "account")
            .column_as(categories::Column::Name, "category")
            .column(transactions::Column::Note)
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id);

        if let Some(start) = filter.start_date {
            query = query.filter(transactions::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(transactions::Column::Date.lte(end));
        }
        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }

        let rows = query
            .into_model::<TransactionRowRaw>()
            .all(&self.database)
            .await?;
        rows.into_iter().map(TransactionRow::try_from).collect()
    }

    /// Summary totals: overall balance, income/expense totals and the
    /// per-category expense breakdown.
    pub async fn statistics(&self) -> ResultLedger<Statistics> {
        let backend = self.database.get_database_backend();
        let transfer_key = util::name_key(TRANSFER_CATEGORY);

        let balance_minor: i64 = {
            let stmt = Statement::from_string(
                backend,
                "SELECT COALESCE(SUM(balance_minor), 0) AS sum FROM accounts",
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        let mut kind_totals = [0i64; 2];
        for (slot, kind) in [TransactionKind::Income, TransactionKind::Expense]
            .into_iter()
            .enumerate()
        {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(t.amount_minor), 0) AS sum \
                 FROM transactions t \
                 INNER JOIN categories c ON c.id = t.category_id \
                 WHERE t.kind = ? AND c.name_norm <> ?",
                vec![kind.as_str().into(), transfer_key.clone().into()],
            );
            let row = self.database.query_one(stmt).await?;
            kind_totals[slot] = row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0);
        }

        let expense_by_category = {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT c.name AS category, SUM(t.amount_minor) AS total_minor \
                 FROM transactions t \
                 INNER JOIN categories c ON c.id = t.category_id \
                 WHERE t.kind = ? AND c.name_norm <> ? \
                 GROUP BY c.id, c.name \
                 ORDER BY total_minor DESC, c.name ASC",
                vec![
                    Value::from(TransactionKind::Expense.as_str()),
                    transfer_key.into(),
                ],
            );
            let rows = self.database.query_all(stmt).await?;
            let mut totals = Vec::with_capacity(rows.len());
            for row in rows {
                let category: String = row.try_get("", "category")?;
                let total_minor: i64 = row.try_get("", "total_minor")?;
                totals.push(CategoryTotal {
                    category,
                    total_minor,
                });
            }
            totals
        };

        Ok(Statistics {
            balance_minor,
            total_income_minor: kind_totals[0],
            total_expenses_minor: kind_totals[1],
            expense_by_category,
        })
    }
}
