use thiserror::Error;

use crate::{
    db_types::{Credits, ReviewStatus, UserId},
    helpers::ParseFailure,
    traits::StoreError,
};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Product names cannot be empty")]
    EmptyName,
    #[error("Prices cannot be negative")]
    NegativePrice,
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("The store is unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<StoreError> for CatalogApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidPrice => CatalogApiError::NegativePrice,
            e => CatalogApiError::PersistenceUnavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("{0}")]
    Parse(#[from] ParseFailure),
    #[error("Unknown product: {0}")]
    UnknownProduct(String),
    #[error("The order total is too large to be charged")]
    TotalOutOfRange,
    #[error("Insufficient balance. The order costs {required}, but only {available} is available")]
    InsufficientBalance { required: Credits, available: Credits },
    #[error("The fulfillment service is unavailable: {0}")]
    FulfillmentUnavailable(String),
    #[error("The store is unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<StoreError> for OrderFlowError {
    fn from(e: StoreError) -> Self {
        OrderFlowError::PersistenceUnavailable(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("The adjustment would leave user {0} with a negative balance")]
    WouldOverdraw(UserId),
    #[error("The store is unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<StoreError> for AccountApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::WouldOverdraw { user } => AccountApiError::WouldOverdraw(user),
            e => AccountApiError::PersistenceUnavailable(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AccessError {
    #[error("You are not on the whitelist")]
    NotWhitelisted,
    #[error("You are not allowed to do that")]
    NotAuthorized,
    #[error("The store is unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<StoreError> for AccessError {
    fn from(e: StoreError) -> Self {
        AccessError::PersistenceUnavailable(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum RechargeError {
    #[error("There is no recharge in progress")]
    NoSession,
    #[error("The recharge is not waiting for that")]
    WrongStep,
    #[error("'{0}' is not one of the available amounts")]
    InvalidAmount(String),
    #[error("A proof of payment image is required")]
    ProofRequired,
    #[error("The recharge was replaced or cancelled while it was being processed")]
    SessionReplaced,
    #[error("Only the operator or an admin can decide recharge requests")]
    NotAuthorized,
    #[error("Recharge request #{0} does not exist")]
    RequestNotFound(i64),
    #[error("Recharge request #{id} has already been decided: {status}")]
    AlreadyDecided { id: i64, status: ReviewStatus },
    #[error("The store is unavailable: {0}")]
    PersistenceUnavailable(String),
}

impl From<StoreError> for RechargeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyDecided { id, status } => RechargeError::AlreadyDecided { id, status },
            StoreError::RequestNotFound(id) => RechargeError::RequestNotFound(id),
            e => RechargeError::PersistenceUnavailable(e.to_string()),
        }
    }
}
