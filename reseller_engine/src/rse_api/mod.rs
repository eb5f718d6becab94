//! # Reseller engine public API
//!
//! The `rse_api` module exposes the programmatic API of the reseller engine. Each API is a thin, stateless wrapper
//! around a storage backend (and, where needed, an outside collaborator), so callers can pick only the parts they need.
//!
//! * [`catalog_api`] manages products and prices.
//! * [`accounts_api`] reads balances and applies the operator's manual ledger and role edits.
//! * [`order_flow_api`] parses, prices, charges and dispatches orders.
//! * [`access_api`] resolves roles and applies the access policy.
//! * [`recharge_api`] runs the deposit workflow on top of the in-memory [`recharge_sessions`].
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits the API needs:
//!
//! ```rust,ignore
//! use reseller_engine::{CatalogApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/store.db", 5).await?;
//! let catalog = CatalogApi::new(db.clone());
//! let products = catalog.list().await?;
//! ```

pub mod access_api;
pub mod accounts_api;
pub mod catalog_api;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
pub mod recharge_api;
pub mod recharge_sessions;
