//! In-memory stand-ins for the outside collaborators.
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use crate::{
    db_types::{ChatId, ChatMember},
    traits::{
        ChatAuthority,
        ChatAuthorityError,
        FulfillmentError,
        FulfillmentProvider,
        RemoteBalance,
        RemoteOrderStatus,
    },
};

/// One call made to [`FakeFulfillment::place_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedCall {
    pub service_id: String,
    pub link: String,
    pub quantity: u64,
}

/// A fulfillment panel that accepts everything except the services it has been told to refuse. Remote order ids are
/// handed out sequentially, starting at 1001.
#[derive(Debug, Clone, Default)]
pub struct FakeFulfillment {
    calls: Arc<Mutex<Vec<PlacedCall>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl FakeFulfillment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_service(&self, service_id: &str) {
        self.failing.lock().unwrap().insert(service_id.to_string());
    }

    pub fn calls(&self) -> Vec<PlacedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl FulfillmentProvider for FakeFulfillment {
    async fn place_order(&self, service_id: &str, link: &str, quantity: u64) -> Result<String, FulfillmentError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(PlacedCall { service_id: service_id.to_string(), link: link.to_string(), quantity });
        if self.failing.lock().unwrap().contains(service_id) {
            return Err(FulfillmentError::Unavailable(format!("service {service_id} is down")));
        }
        Ok((1000 + calls.len()).to_string())
    }

    async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus, FulfillmentError> {
        let known = self.calls.lock().unwrap().len();
        match remote_order_id.parse::<usize>() {
            Ok(id) if id > 1000 && id <= 1000 + known => Ok(RemoteOrderStatus {
                status: "In progress".into(),
                charge: Some("0.5".into()),
                start_count: Some("0".into()),
                remains: Some("10".into()),
                currency: Some("USD".into()),
            }),
            _ => Err(FulfillmentError::Rejected("Incorrect order ID".into())),
        }
    }

    async fn account_balance(&self) -> Result<RemoteBalance, FulfillmentError> {
        Ok(RemoteBalance { balance: "100.84".into(), currency: "USD".into() })
    }
}

/// Group administrator lists, keyed by chat.
#[derive(Debug, Clone, Default)]
pub struct FakeChatAuthority {
    admins: Arc<Mutex<HashMap<ChatId, Vec<ChatMember>>>>,
    unreachable: Arc<Mutex<bool>>,
}

impl FakeChatAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_admins(&self, chat: ChatId, admins: Vec<ChatMember>) {
        self.admins.lock().unwrap().insert(chat, admins);
    }

    /// Makes every lookup fail, as if the transport were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }
}

impl ChatAuthority for FakeChatAuthority {
    async fn list_chat_admins(&self, chat: ChatId) -> Result<Vec<ChatMember>, ChatAuthorityError> {
        if *self.unreachable.lock().unwrap() {
            return Err(ChatAuthorityError { chat, reason: "transport unreachable".into() });
        }
        Ok(self.admins.lock().unwrap().get(&chat).cloned().unwrap_or_default())
    }
}
