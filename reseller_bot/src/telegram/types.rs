//! The subset of the Telegram Bot API object model the bot reads and writes.
use reseller_engine::db_types::{ChatContext, ChatId, ChatKind, ChatMember, UserId};
use serde::{Deserialize, Serialize};

use crate::transport::{Button, InboundAction, InboundEvent, InboundMessage, MessageRef};

/// The envelope every Bot API method answers with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    /// `private`, `group`, `supergroup` or `channel`
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

/// An entry of `getChatAdministrators`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAdministrator {
    pub status: String,
    pub user: User,
}

impl From<ChatAdministrator> for ChatMember {
    fn from(admin: ChatAdministrator) -> Self {
        Self { user_id: UserId(admin.user.id), status: admin.status }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

const BUTTONS_PER_ROW: usize = 3;

impl InlineKeyboardMarkup {
    pub fn from_buttons(buttons: &[Button]) -> Option<Self> {
        if buttons.is_empty() {
            return None;
        }
        let inline_keyboard = buttons
            .chunks(BUTTONS_PER_ROW)
            .map(|row| {
                row.iter()
                    .map(|b| InlineKeyboardButton { text: b.label.clone(), callback_data: b.action.clone() })
                    .collect()
            })
            .collect();
        Some(Self { inline_keyboard })
    }
}

impl Chat {
    pub fn context(&self) -> ChatContext {
        let kind = if self.kind == "private" { ChatKind::Private } else { ChatKind::Group };
        ChatContext { id: ChatId(self.id), kind }
    }
}

impl Message {
    pub fn reference(&self) -> MessageRef {
        MessageRef { chat: ChatId(self.chat.id), message_id: self.message_id }
    }

    /// The largest photo size, or an image sent as a file.
    pub fn image_file_id(&self) -> Option<String> {
        let photo = self.photo.as_ref().and_then(|sizes| sizes.iter().max_by_key(|p| p.width * p.height));
        match (photo, &self.document) {
            (Some(p), _) => Some(p.file_id.clone()),
            (None, Some(doc)) if doc.mime_type.as_deref().is_some_and(|m| m.starts_with("image/")) => {
                Some(doc.file_id.clone())
            },
            _ => None,
        }
    }
}

impl Update {
    /// Reduces the update to what the bot acts on. Updates from bots, and updates of kinds the bot does not handle,
    /// are dropped.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            if query.from.is_bot {
                return None;
            }
            return Some(InboundEvent::Action(InboundAction {
                id: query.id,
                sender: UserId(query.from.id),
                data: query.data.unwrap_or_default(),
                message: query.message.as_ref().map(Message::reference),
                chat: query.message.as_ref().map(|m| m.chat.context()),
            }));
        }
        let message = self.message?;
        let from = message.from.as_ref().filter(|u| !u.is_bot)?;
        let image = message.image_file_id();
        Some(InboundEvent::Message(InboundMessage {
            sender: UserId(from.id),
            chat: message.chat.context(),
            text: message.text,
            image,
        }))
    }
}
