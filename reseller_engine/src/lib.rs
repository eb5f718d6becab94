//! Reseller Engine
//!
//! The reseller engine is the core of a storefront bot that resells services from a remote fulfillment panel. The
//! operator defines products and prices, parties top up a local balance, and orders typed as free text are charged
//! against that balance and forwarded to the panel.
//!
//! The library is transport-agnostic and is divided into these sections:
//! 1. Storage contracts ([`traits`]) and the SQLite backend ([`SqliteDatabase`]). You should never need to access the
//!    database directly. Instead, use the public APIs. The exception is the data types used in the database, which
//!    are defined in the [`db_types`] module.
//! 2. The public API ([`rse_api`]). Catalog management, the ordering pipeline, access control and the recharge
//!    workflow all live here.
//! 3. The free-text order parser ([`helpers::parse_order`]).
//!
//! The engine also publishes events when line items are placed or fail. A simple actor framework ([`events`]) lets
//! you hook into these and perform custom actions, such as alerting the operator.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod rse_api;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use rse_api::{
    access_api::{AccessApi, Permission},
    accounts_api::AccountApi,
    catalog_api::{product_key, CatalogApi},
    errors::{AccessError, AccountApiError, CatalogApiError, OrderFlowError, RechargeError},
    order_flow_api::OrderFlowApi,
    order_objects,
    recharge_api::{RechargeApi, RechargeConfig, RechargeDecision},
    recharge_sessions::{RechargeSession, RechargeSessions, RechargeStep},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
