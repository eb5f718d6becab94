use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PanelApiError;

/// The order id assigned by the panel. Panels return either a number or a string, so it is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelOrderId(pub String);

impl Display for PanelOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PanelOrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelOrderStatus {
    pub status: String,
    pub charge: Option<String>,
    pub start_count: Option<String>,
    pub remains: Option<String>,
    pub currency: Option<String>,
}

/// The balance of the reseller's own account on the panel. This is a separate account from the local ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelBalance {
    pub balance: String,
    pub currency: String,
}

/// Panels are loose about JSON types: numbers often arrive as strings and vice versa.
fn text_field(value: &Value, key: &str) -> Option<String> {
    match &value[key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn check_for_error(value: &Value) -> Result<(), PanelApiError> {
    match &value["error"] {
        Value::Null => Ok(()),
        Value::String(s) => Err(PanelApiError::Rejected(s.clone())),
        other => Err(PanelApiError::Rejected(other.to_string())),
    }
}

impl PanelOrderId {
    pub fn from_add_response(value: &Value) -> Result<Self, PanelApiError> {
        check_for_error(value)?;
        text_field(value, "order").map(Self).ok_or(PanelApiError::MissingField("order"))
    }
}

impl PanelOrderStatus {
    pub fn from_status_response(value: &Value) -> Result<Self, PanelApiError> {
        check_for_error(value)?;
        let status = text_field(value, "status").ok_or(PanelApiError::MissingField("status"))?;
        Ok(Self {
            status,
            charge: text_field(value, "charge"),
            start_count: text_field(value, "start_count"),
            remains: text_field(value, "remains"),
            currency: text_field(value, "currency"),
        })
    }
}

impl PanelBalance {
    pub fn from_balance_response(value: &Value) -> Result<Self, PanelApiError> {
        check_for_error(value)?;
        let balance = text_field(value, "balance").ok_or(PanelApiError::MissingField("balance"))?;
        let currency = text_field(value, "currency").unwrap_or_default();
        Ok(Self { balance, currency })
    }
}
