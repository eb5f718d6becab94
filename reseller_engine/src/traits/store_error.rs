use thiserror::Error;

use crate::db_types::{Credits, ReviewStatus, UserId};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("The store is unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("No account exists for user {0}")]
    AccountNotFound(UserId),
    #[error("The adjustment would leave account {user} with a negative balance")]
    WouldOverdraw { user: UserId },
    #[error("Recharge request #{0} does not exist")]
    RequestNotFound(i64),
    #[error("Recharge request #{id} has already been decided: {status}")]
    AlreadyDecided { id: i64, status: ReviewStatus },
    #[error("Prices cannot be negative")]
    InvalidPrice,
    #[error("Cannot debit a negative amount: {0}")]
    NegativeDebit(Credits),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::PersistenceUnavailable(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::PersistenceUnavailable(format!("Migration failed. {e}"))
    }
}
