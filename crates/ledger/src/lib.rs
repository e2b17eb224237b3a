pub use accounts::Account;
pub use categories::Category;
pub use commands::{RecordCmd, TransferCmd};
pub use error::LedgerError;
pub use ops::{CategoryTotal, Statistics, TRANSFER_CATEGORY, TransactionFilter, TransactionRow};
pub use transactions::{Transaction, TransactionKind};

use sea_orm::DatabaseConnection;

mod accounts;
mod categories;
mod commands;
mod error;
mod ops;
mod transactions;
mod util;

type ResultLedger<T> = Result<T, LedgerError>;

/// Handle over the persistent store.
///
/// Every mutating operation acquires one database transaction and commits or
/// rolls back as a unit, so the account balance invariant (balance equals the
/// signed sum of the account's transactions) holds on every exit path.
#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`
    pub fn build(self) -> Ledger {
        Ledger {
            database: self.database,
        }
    }
}
