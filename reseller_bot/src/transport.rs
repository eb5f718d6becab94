//! The chat side of the bot, independent of Telegram.
//!
//! Inbound traffic is reduced to [`InboundEvent`]s, and outbound traffic goes through the [`ChatTransport`] trait, so
//! the command logic in [`crate::bot`] can be exercised without a network.
use reseller_engine::{
    db_types::{ChatContext, ChatId, UserId},
    traits::ChatAuthority,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Could not reach the chat service: {0}")]
    RequestError(String),
    #[error("The chat service refused the call: {0}")]
    ApiError(String),
    #[error("Could not deserialize the chat service's reply: {0}")]
    JsonError(String),
}

/// An inline button. `action` comes back verbatim in an [`InboundAction`] when the button is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self { label: label.into(), action: action.into() }
    }
}

/// A message the bot has sent, so that its buttons can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Message(InboundMessage),
    Action(InboundAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender: UserId,
    pub chat: ChatContext,
    pub text: Option<String>,
    /// Transport reference of an attached image, if any
    pub image: Option<String>,
}

/// A button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundAction {
    pub id: String,
    pub sender: UserId,
    pub data: String,
    /// The message carrying the button, when the transport still knows it
    pub message: Option<MessageRef>,
    pub chat: Option<ChatContext>,
}

/// Outbound messaging. Implementations also answer group authority questions.
#[allow(async_fn_in_trait)]
pub trait ChatTransport: ChatAuthority {
    async fn send_text(&self, chat: ChatId, text: &str, buttons: &[Button]) -> Result<MessageRef, TransportError>;

    async fn send_photo(
        &self,
        chat: ChatId,
        file_id: &str,
        caption: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, TransportError>;

    async fn clear_buttons(&self, message: &MessageRef) -> Result<(), TransportError>;

    /// Acknowledges a button press, optionally showing `text` to the presser.
    async fn answer_action(&self, action_id: &str, text: &str) -> Result<(), TransportError>;
}
