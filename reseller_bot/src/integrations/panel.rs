use log::*;
use panel_tools::{PanelApi, PanelApiError, PanelBalance, PanelConfig, PanelOrderStatus};
use reseller_engine::traits::{FulfillmentError, FulfillmentProvider, RemoteBalance, RemoteOrderStatus};

/// The reseller panel as the engine's fulfillment provider.
#[derive(Clone)]
pub struct PanelFulfillment {
    api: PanelApi,
}

impl PanelFulfillment {
    pub fn new(config: PanelConfig) -> Result<Self, PanelApiError> {
        let api = PanelApi::new(config)?;
        Ok(Self { api })
    }
}

fn to_fulfillment_error(e: PanelApiError) -> FulfillmentError {
    match e {
        PanelApiError::Rejected(reason) => FulfillmentError::Rejected(reason),
        e => {
            warn!("🛒️ Panel call failed. {e}");
            FulfillmentError::Unavailable(e.to_string())
        },
    }
}

fn to_remote_status(s: PanelOrderStatus) -> RemoteOrderStatus {
    RemoteOrderStatus {
        status: s.status,
        charge: s.charge,
        start_count: s.start_count,
        remains: s.remains,
        currency: s.currency,
    }
}

fn to_remote_balance(b: PanelBalance) -> RemoteBalance {
    RemoteBalance { balance: b.balance, currency: b.currency }
}

impl FulfillmentProvider for PanelFulfillment {
    async fn place_order(&self, service_id: &str, link: &str, quantity: u64) -> Result<String, FulfillmentError> {
        self.api.place_order(service_id, link, quantity).await.map(|id| id.0).map_err(to_fulfillment_error)
    }

    async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus, FulfillmentError> {
        self.api.order_status(remote_order_id).await.map(to_remote_status).map_err(to_fulfillment_error)
    }

    async fn account_balance(&self) -> Result<RemoteBalance, FulfillmentError> {
        self.api.balance().await.map(to_remote_balance).map_err(to_fulfillment_error)
    }
}
