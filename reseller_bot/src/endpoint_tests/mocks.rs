use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
        Mutex,
    },
};

use mockall::mock;
use reseller_engine::{
    db_types::{ChatId, ChatMember},
    test_utils::fakes::FakeChatAuthority,
    traits::{
        ChatAuthority,
        ChatAuthorityError,
        FulfillmentError,
        FulfillmentProvider,
        RemoteBalance,
        RemoteOrderStatus,
    },
};

use crate::transport::{Button, ChatTransport, MessageRef, TransportError};

mock! {
    pub Panel {}
    impl FulfillmentProvider for Panel {
        async fn place_order(&self, service_id: &str, link: &str, quantity: u64) -> Result<String, FulfillmentError>;
        async fn order_status(&self, remote_order_id: &str) -> Result<RemoteOrderStatus, FulfillmentError>;
        async fn account_balance(&self) -> Result<RemoteBalance, FulfillmentError>;
    }
}

/// Everything the bot sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text { message: MessageRef, text: String, buttons: Vec<Button> },
    Photo { message: MessageRef, file_id: String, caption: String, buttons: Vec<Button> },
    Cleared(MessageRef),
    Answer { action_id: String, text: String },
}

/// A chat transport that records outbound traffic instead of sending it. Chats marked as failing refuse every
/// delivery.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<Outbound>>>,
    failing: Arc<Mutex<HashSet<ChatId>>>,
    next_message_id: Arc<AtomicI64>,
    authority: FakeChatAuthority,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent
            .lock().unwrap()
            .iter()
            .filter_map(|o| match o {
                Outbound::Text { message, text, .. } if message.chat == chat => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_text_to(&self, chat: ChatId) -> Option<String> {
        self.texts_to(chat).pop()
    }

    /// The last message with buttons sent to `chat`.
    pub fn last_buttons_to(&self, chat: ChatId) -> Option<(MessageRef, Vec<Button>)> {
        self.sent.lock().unwrap().iter().rev().find_map(|o| match o {
            Outbound::Text { message, buttons, .. } | Outbound::Photo { message, buttons, .. }
                if message.chat == chat && !buttons.is_empty() =>
            {
                Some((*message, buttons.clone()))
            },
            _ => None,
        })
    }

    /// `(chat, file_id, caption)` of every photo sent.
    pub fn photos(&self) -> Vec<(ChatId, String, String)> {
        self.sent
            .lock().unwrap()
            .iter()
            .filter_map(|o| match o {
                Outbound::Photo { message, file_id, caption, .. } => {
                    Some((message.chat, file_id.clone(), caption.clone()))
                },
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<String> {
        self.sent
            .lock().unwrap()
            .iter()
            .filter_map(|o| match o {
                Outbound::Answer { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn cleared(&self) -> Vec<MessageRef> {
        self.sent
            .lock().unwrap()
            .iter()
            .filter_map(|o| match o {
                Outbound::Cleared(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn fail_chat(&self, chat: ChatId) {
        self.failing.lock().unwrap().insert(chat);
    }

    pub fn set_admins(&self, chat: ChatId, admins: Vec<ChatMember>) {
        self.authority.set_admins(chat, admins);
    }

    fn deliver(&self, chat: ChatId, build: impl FnOnce(MessageRef) -> Outbound) -> Result<MessageRef, TransportError> {
        if self.failing.lock().unwrap().contains(&chat) {
            return Err(TransportError::ApiError(format!("Bad Request: chat {chat} not found")));
        }
        let message = MessageRef { chat, message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1 };
        self.sent.lock().unwrap().push(build(message));
        Ok(message)
    }
}

impl ChatAuthority for RecordingTransport {
    async fn list_chat_admins(&self, chat: ChatId) -> Result<Vec<ChatMember>, ChatAuthorityError> {
        self.authority.list_chat_admins(chat).await
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat: ChatId, text: &str, buttons: &[Button]) -> Result<MessageRef, TransportError> {
        self.deliver(chat, |message| Outbound::Text { message, text: text.to_string(), buttons: buttons.to_vec() })
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        file_id: &str,
        caption: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, TransportError> {
        self.deliver(chat, |message| Outbound::Photo {
            message,
            file_id: file_id.to_string(),
            caption: caption.to_string(),
            buttons: buttons.to_vec(),
        })
    }

    async fn clear_buttons(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Outbound::Cleared(*message));
        Ok(())
    }

    async fn answer_action(&self, action_id: &str, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Outbound::Answer { action_id: action_id.to_string(), text: text.to_string() });
        Ok(())
    }
}
