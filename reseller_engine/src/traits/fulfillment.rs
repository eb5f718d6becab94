use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    /// The provider could not be reached, or returned something we could not understand
    #[error("The fulfillment service is unavailable: {0}")]
    Unavailable(String),
    /// The provider understood the request and refused it
    #[error("The fulfillment service refused the request: {0}")]
    Rejected(String),
}

/// Progress of an order on the remote panel, as reported by the panel. The values are passed through as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrderStatus {
    pub status: String,
    pub charge: Option<String>,
    pub start_count: Option<String>,
    pub remains: Option<String>,
    pub currency: Option<String>,
}

/// The reseller's own balance on the remote panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBalance {
    pub balance: String,
    pub currency: String,
}

/// A remote service that carries out orders.
#[allow(async_fn_in_trait)]
pub trait FulfillmentProvider {
    /// Places an order for `quantity` units of `service_id` delivered to `link` and returns the remote order id.
    async fn place_order(&self, service_id: &str, link: &str, quantity: u64) -> Result<String, FulfillmentError>;

    async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus, FulfillmentError>;

    async fn account_balance(&self) -> Result<RemoteBalance, FulfillmentError>;
}
