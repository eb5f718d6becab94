//! # Panel tools
//!
//! A thin client for the de-facto standard reseller panel API: a single endpoint that accepts form-encoded `POST`
//! requests carrying an API `key`, an `action` and action-specific parameters, and that answers with a small JSON
//! object (or `{"error": "..."}`).
//!
//! Only the three actions the storefront needs are wrapped: `add` ([`PanelApi::place_order`]), `status`
//! ([`PanelApi::order_status`]) and `balance` ([`PanelApi::balance`]).
mod api;
mod config;
mod error;

mod data_objects;

pub use api::PanelApi;
pub use config::PanelConfig;
pub use data_objects::{PanelBalance, PanelOrderId, PanelOrderStatus};
pub use error::PanelApiError;
