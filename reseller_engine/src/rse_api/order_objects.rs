use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::db_types::{ConversionError, Credits, OrderRecord, UserId};

/// What happens to the money for a line item the fulfillment panel did not accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundPolicy {
    /// The debit stands. The operator is alerted and corrects it by hand if needed.
    #[default]
    Never,
    /// The cost of each failed item is credited back straight away.
    FailedItems,
}

impl Display for RefundPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefundPolicy::Never => write!(f, "never"),
            RefundPolicy::FailedItems => write!(f, "failed_items"),
        }
    }
}

impl FromStr for RefundPolicy {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "failed_items" => Ok(Self::FailedItems),
            other => Err(ConversionError::new(format!("Invalid refund policy: {other}"))),
        }
    }
}

/// A parsed line item with its catalog data and cost attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedItem {
    pub product_key: String,
    pub display_name: String,
    pub quantity: u64,
    pub service_id: Option<String>,
    pub cost: Credits,
}

/// The money side of one order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub user: UserId,
    pub items: Vec<PricedItem>,
    pub total: Credits,
    /// False when nothing was deducted, i.e. for the operator or for free orders.
    pub debited: bool,
}

/// The result of dispatching one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub item: PricedItem,
    /// The fulfillment panel's order id. `None` means the placement failed.
    pub remote_order_id: Option<String>,
    /// True if the cost was credited back after a failed placement.
    pub refunded: bool,
    /// The stored order record. `None` if it could not be written.
    pub record: Option<OrderRecord>,
    /// Why the item was not placed. `None` for placed items.
    pub failure: Option<String>,
}

impl OrderOutcome {
    pub fn is_placed(&self) -> bool {
        self.remote_order_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub link: String,
    pub outcomes: Vec<OrderOutcome>,
    pub total: Credits,
    /// Sum of the costs credited back under [`RefundPolicy::FailedItems`]
    pub refunded: Credits,
    /// The party's balance after the order. `None` when the party was not charged.
    pub balance_after: Option<Credits>,
}

impl OrderReceipt {
    pub fn placed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_placed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.placed_count()
    }

    /// Items whose order record could not be saved.
    pub fn unrecorded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.record.is_none()).count()
    }
}
