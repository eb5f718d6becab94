use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::PanelConfig,
    data_objects::{PanelBalance, PanelOrderId, PanelOrderStatus},
    PanelApiError,
};

#[derive(Clone)]
pub struct PanelApi {
    config: PanelConfig,
    client: Arc<Client>,
}

impl PanelApi {
    pub fn new(config: PanelConfig) -> Result<Self, PanelApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PanelApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends `action` with the given parameters and returns the raw JSON reply.
    ///
    /// The API key is added here; callers never handle it.
    pub async fn request(&self, action: &str, params: &[(&str, &str)]) -> Result<Value, PanelApiError> {
        if self.config.api_url.is_empty() {
            return Err(PanelApiError::Initialization("No panel URL has been configured".into()));
        }
        let mut form = Vec::with_capacity(params.len() + 2);
        form.push(("key", self.config.api_key.reveal().as_str()));
        form.push(("action", action));
        form.extend_from_slice(params);
        trace!("🛒️ Sending panel request: {action}");
        let response = self
            .client
            .post(&self.config.api_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| PanelApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            trace!("🛒️ Panel request successful. {}", response.status());
            response.json::<Value>().await.map_err(|e| PanelApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PanelApiError::RequestError(e.to_string()))?;
            Err(PanelApiError::QueryError { status, message })
        }
    }

    pub async fn place_order(&self, service: &str, link: &str, quantity: u64) -> Result<PanelOrderId, PanelApiError> {
        let quantity = quantity.to_string();
        debug!("🛒️ Placing panel order: service {service}, quantity {quantity}");
        let value = self.request("add", &[("service", service), ("link", link), ("quantity", &quantity)]).await?;
        let id = PanelOrderId::from_add_response(&value)?;
        info!("🛒️ Panel accepted order #{id} (service {service} x{quantity})");
        Ok(id)
    }

    pub async fn order_status(&self, order_id: &str) -> Result<PanelOrderStatus, PanelApiError> {
        debug!("🛒️ Fetching status for panel order #{order_id}");
        let value = self.request("status", &[("order", order_id)]).await?;
        PanelOrderStatus::from_status_response(&value)
    }

    pub async fn balance(&self) -> Result<PanelBalance, PanelApiError> {
        let value = self.request("balance", &[]).await?;
        PanelBalance::from_balance_response(&value)
    }
}
