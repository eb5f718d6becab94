//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

use crate::traits::StoreError;

pub mod accounts;
pub mod catalog;
pub mod orders;
pub mod recharges;
pub mod roles;

const SQLITE_DB_URL: &str = "sqlite://data/reseller_store.db";

pub fn db_url() -> String {
    let result = env::var("RSB_DATABASE_URL").unwrap_or_else(|_| {
        info!("RSB_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Statements with a `RETURNING` clause are always run with `fetch_all`, so that they step to completion and their
/// write is visible to other connections as soon as the call returns. This picks out the one row they produce.
pub(crate) fn single_row<T>(rows: Vec<T>) -> Result<T, StoreError> {
    rows.into_iter().next().ok_or_else(|| StoreError::PersistenceUnavailable("The statement returned no row".into()))
}

/// Like [`single_row`], for conditional statements that may legitimately touch nothing.
pub(crate) fn optional_row<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}
