//! Transaction primitives.
//!
//! A `Transaction` is a single signed balance change on one account. An
//! inter-account transfer is a pair of them (expense on the source, income on
//! the destination) sharing date, amount and the reserved category.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Sign of the balance effect: income adds, expense subtracts.
    pub fn sign(self) -> i64 {
        match self {
            Self::Income => 1,
            Self::Expense => -1,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub note: Option<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        amount_minor: i64,
        account_id: Uuid,
        category_id: Uuid,
        note: Option<String>,
    ) -> ResultLedger<Self> {
        if amount_minor <= 0 {
            return Err(LedgerError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            kind,
            amount_minor,
            account_id,
            category_id,
            note,
        })
    }

    /// The amount with the sign the balance sees.
    pub fn signed_amount_minor(&self) -> i64 {
        self.kind.sign() * self.amount_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: Date,
    pub kind: String,
    pub amount_minor: i64,
    pub account_id: String,
    pub category_id: String,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            date: ActiveValue::Set(tx.date),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            note: ActiveValue::Set(tx.note.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "transaction")?,
            date: model.date,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            account_id: util::parse_uuid(&model.account_id, "account")?,
            category_id: util::parse_uuid(&model.category_id, "category")?,
            note: model.note,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn new_rejects_non_positive_amounts() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        for amount in [0, -500] {
            let err = Transaction::new(
                date,
                TransactionKind::Expense,
                amount,
                Uuid::new_v4(),
                Uuid::new_v4(),
                None,
            )
            .unwrap_err();
            assert_eq!(
                err,
                LedgerError::InvalidAmount("amount_minor must be > 0".to_string())
            );
        }
    }

    #[test]
    fn signed_amount_follows_kind() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let income = Transaction::new(
            date,
            TransactionKind::Income,
            1040,
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
        )
        .unwrap();
        let expense = Transaction::new(
            date,
            TransactionKind::Expense,
            1040,
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
        )
        .unwrap();

        assert_eq!(income.signed_amount_minor(), 1040);
        assert_eq!(expense.signed_amount_minor(), -1040);
    }

    #[test]
    fn kind_rejects_unknown_strings() {
        assert!(TransactionKind::try_from("transfer").is_err());
    }
}
