//! Command structs for ledger operations.
//!
//! These types group parameters for write operations (record/transfer),
//! keeping call sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::TransactionKind;

/// Record one income or expense transaction.
#[derive(Clone, Debug)]
pub struct RecordCmd {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub note: Option<String>,
}

impl RecordCmd {
    #[must_use]
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        amount_minor: i64,
        account_id: Uuid,
        category_id: Uuid,
    ) -> Self {
        Self {
            date,
            kind,
            amount_minor,
            account_id,
            category_id,
            note: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Move funds between two accounts.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_minor: i64,
    pub date: NaiveDate,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
        date: NaiveDate,
    ) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount_minor,
            date,
        }
    }
}
