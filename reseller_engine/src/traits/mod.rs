//! #  Storage and collaborator contracts.
//!
//! This module defines the behaviour that storage *backends* and outside collaborators need to expose in order to
//! back the reseller engine. The engine APIs in [`crate::rse_api`] are generic over these traits, so the SQLite
//! backend can be swapped for another store, and the fulfillment panel or chat transport for in-memory fakes.
//!
//! ## Storage traits
//! * [`CatalogManagement`] keeps product definitions: the fulfillment service id and the price per 1000 units.
//! * [`AccountManagement`] keeps party balances and the whitelist flag, and owns the check-and-deduct primitive.
//! * [`OrderManagement`] appends and queries order records.
//! * [`RoleManagement`] keeps the persisted admin set.
//! * [`RechargeManagement`] keeps recharge requests that are waiting for, or have received, a review decision.
//! * [`StorefrontDatabase`] ties all of the above together for backends that support the full bot.
//!
//! ## Collaborators
//! * [`FulfillmentProvider`] places and tracks orders on the remote reseller panel.
//! * [`ChatAuthority`] answers who administers a group chat.
mod account_management;
mod catalog_management;
mod chat_authority;
mod fulfillment;
mod order_management;
mod recharge_management;
mod role_management;
mod store_error;
mod storefront_database;

pub use account_management::{AccountManagement, DebitResult};
pub use catalog_management::CatalogManagement;
pub use chat_authority::{ChatAuthority, ChatAuthorityError};
pub use fulfillment::{FulfillmentError, FulfillmentProvider, RemoteBalance, RemoteOrderStatus};
pub use order_management::OrderManagement;
pub use recharge_management::RechargeManagement;
pub use role_management::RoleManagement;
pub use store_error::StoreError;
pub use storefront_database::StorefrontDatabase;
