use serde::{Deserialize, Serialize};

use crate::db_types::OrderRecord;

/// A line item was accepted by the fulfillment panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: OrderRecord,
}

impl OrderPlacedEvent {
    pub fn new(order: OrderRecord) -> Self {
        Self { order }
    }
}

/// A line item could not be placed. Unless it was refunded, the party has paid for something they did not get.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailedEvent {
    pub order: OrderRecord,
    pub reason: String,
}

impl OrderFailedEvent {
    pub fn new(order: OrderRecord, reason: impl Into<String>) -> Self {
        Self { order, reason: reason.into() }
    }

    pub fn refunded(&self) -> bool {
        self.order.refunded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPlaced(OrderPlacedEvent),
    OrderFailed(OrderFailedEvent),
}
