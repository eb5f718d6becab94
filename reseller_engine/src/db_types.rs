use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
pub use rsb_common::Credits;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

//--------------------------------------        UserId         ---------------------------------------------------------
/// A chat participant, as identified by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self).map_err(|e| ConversionError(format!("Invalid user id '{s}'. {e}")))
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

//--------------------------------------        ChatId         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for ChatId {
    /// A user's private chat shares the user's id.
    fn from(user: UserId) -> Self {
        Self(user.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    /// A one-to-one conversation with the bot
    Private,
    /// Groups, supergroups and channels
    Group,
}

/// Where a command was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    pub id: ChatId,
    pub kind: ChatKind,
}

impl ChatContext {
    pub fn private(user: UserId) -> Self {
        Self { id: user.into(), kind: ChatKind::Private }
    }

    pub fn group(id: i64) -> Self {
        Self { id: ChatId(id), kind: ChatKind::Group }
    }

    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }

    pub fn is_group(&self) -> bool {
        self.kind == ChatKind::Group
    }
}

/// One entry of a group's administrator list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user_id: UserId,
    /// The transport's role label, e.g. `creator` or `administrator`
    pub status: String,
}

impl ChatMember {
    pub fn is_creator(&self) -> bool {
        self.status.eq_ignore_ascii_case("creator")
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    /// Lower-cased product name
    pub key: String,
    /// The service id on the fulfillment panel. Without one the product can be ordered, but every order fails.
    pub service_id: Option<String>,
    pub price_per_1000: Credits,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_fulfillable(&self) -> bool {
        self.service_id.as_ref().is_some_and(|s| !s.trim().is_empty())
    }

    /// The cost of `quantity` units of this product.
    pub fn quote(&self, quantity: u64) -> Credits {
        self.price_per_1000.per_thousand(quantity)
    }
}

//--------------------------------------     PartyAccount      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PartyAccount {
    pub user_id: UserId,
    pub balance: Credits,
    pub whitelisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate view of the local ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub accounts: i64,
    pub total_balance: Credits,
}

//--------------------------------------      OrderRecord      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: UserId,
    pub product_key: String,
    pub quantity: i64,
    pub cost: Credits,
    pub link: String,
    /// The fulfillment panel's order id. `None` means the placement failed.
    pub remote_order_id: Option<String>,
    /// True if the cost was credited back after a failed placement.
    pub refunded: bool,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn is_placed(&self) -> bool {
        self.remote_order_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRecord {
    pub user_id: UserId,
    pub product_key: String,
    pub quantity: u64,
    pub cost: Credits,
    pub link: String,
    pub remote_order_id: Option<String>,
    pub refunded: bool,
}

//--------------------------------------         Role          ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The single configured owner of the bot
    Operator,
    /// Trusted helpers who may adjudicate recharges
    Admin,
    /// The creator of the group chat the command came from
    GroupAuthority,
    /// Parties allowed to order from a private chat
    Whitelisted,
    /// Everyone else
    Unprivileged,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Operator => write!(f, "Operator"),
            Role::Admin => write!(f, "Admin"),
            Role::GroupAuthority => write!(f, "GroupAuthority"),
            Role::Whitelisted => write!(f, "Whitelisted"),
            Role::Unprivileged => write!(f, "Unprivileged"),
        }
    }
}

//--------------------------------------     ReviewStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ReviewStatus {
    /// Waiting for an operator or admin decision
    Pending,
    /// The deposit was confirmed and credited
    Approved,
    /// The deposit was refused
    Rejected,
}

impl Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "Pending"),
            ReviewStatus::Approved => write!(f, "Approved"),
            ReviewStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid review status: {s}"))),
        }
    }
}

impl From<String> for ReviewStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid review status: {value}. But this conversion cannot fail. Defaulting to Pending");
            ReviewStatus::Pending
        })
    }
}

//--------------------------------------    RechargeRequest    ---------------------------------------------------------
/// A deposit that has been escalated to human review.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RechargeRequest {
    pub id: i64,
    pub user_id: UserId,
    pub amount: Credits,
    /// Transport reference to the proof-of-payment image
    pub proof_file_id: String,
    pub status: ReviewStatus,
    pub decided_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRechargeRequest {
    pub user_id: UserId,
    pub amount: Credits,
    pub proof_file_id: String,
}
