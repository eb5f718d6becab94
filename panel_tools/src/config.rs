use std::time::Duration;

use log::*;
use rsb_common::Secret;

const DEFAULT_PANEL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// The full API endpoint, e.g. `https://panel.example/api/v2`
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Applied to every request. A hung panel stalls only the command that called it, and only this long.
    pub timeout: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { api_url: String::default(), api_key: Secret::default(), timeout: DEFAULT_PANEL_TIMEOUT }
    }
}

impl PanelConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("RSB_PANEL_URL").unwrap_or_else(|_| {
            warn!("RSB_PANEL_URL not set. Every fulfillment call will fail until it is configured.");
            String::default()
        });
        let api_key = Secret::new(std::env::var("RSB_PANEL_API_KEY").unwrap_or_else(|_| {
            warn!("RSB_PANEL_API_KEY not set. Every fulfillment call will fail until it is configured.");
            String::default()
        }));
        let timeout = std::env::var("RSB_PANEL_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for RSB_PANEL_TIMEOUT ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PANEL_TIMEOUT);
        Self { api_url, api_key, timeout }
    }
}
