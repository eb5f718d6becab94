use std::sync::Arc;

use log::*;
use reqwest::Client;
use reseller_engine::{
    db_types::{ChatId, ChatMember},
    traits::{ChatAuthority, ChatAuthorityError},
};
use rsb_common::Secret;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    telegram::types::{ApiResponse, ChatAdministrator, InlineKeyboardMarkup, Message},
    transport::{Button, ChatTransport, MessageRef, TransportError},
};

/// A client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramApi {
    api_url: String,
    token: Secret<String>,
    client: Arc<Client>,
}

impl std::fmt::Debug for TelegramApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TelegramApi ({})", self.api_url)
    }
}

impl TelegramApi {
    pub fn new(api_url: &str, token: Secret<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::RequestError(e.to_string()))?;
        let api_url = api_url.trim_end_matches('/').to_string();
        Ok(Self { api_url, token, client: Arc::new(client) })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_url, self.token.reveal())
    }

    /// Calls a Bot API method and unwraps the `{ok, result}` envelope.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, TransportError> {
        trace!("📬️ Calling Telegram method {method}");
        let response = self
            .client
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await
            // reqwest includes the URL, and so the token, in its error messages
            .map_err(|e| TransportError::RequestError(e.without_url().to_string()))?;
        let status = response.status();
        let reply = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| TransportError::JsonError(e.without_url().to_string()))?;
        match (reply.ok, reply.result) {
            (true, Some(result)) => Ok(result),
            _ => {
                let description = reply.description.unwrap_or_else(|| format!("HTTP {status}"));
                debug!("📬️ Telegram method {method} failed. {description}");
                Err(TransportError::ApiError(description))
            },
        }
    }

    pub async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        let mut params = json!({ "chat_id": chat.0, "text": text });
        if let Some(markup) = markup {
            params["reply_markup"] = json!(markup);
        }
        self.call("sendMessage", params).await
    }

    pub async fn send_photo_by_id(
        &self,
        chat: ChatId,
        file_id: &str,
        caption: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<Message, TransportError> {
        let mut params = json!({ "chat_id": chat.0, "photo": file_id, "caption": caption });
        if let Some(markup) = markup {
            params["reply_markup"] = json!(markup);
        }
        self.call("sendPhoto", params).await
    }

    pub async fn remove_reply_markup(&self, message: &MessageRef) -> Result<(), TransportError> {
        let params = json!({
            "chat_id": message.chat.0,
            "message_id": message.message_id,
            "reply_markup": InlineKeyboardMarkup::default(),
        });
        // Answers with the edited message, or `true` for inline messages
        self.call::<Value>("editMessageReplyMarkup", params).await.map(|_| ())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str, text: &str) -> Result<(), TransportError> {
        let mut params = json!({ "callback_query_id": callback_query_id });
        if !text.is_empty() {
            params["text"] = json!(text);
        }
        self.call::<bool>("answerCallbackQuery", params).await.map(|_| ())
    }

    pub async fn get_chat_administrators(&self, chat: ChatId) -> Result<Vec<ChatAdministrator>, TransportError> {
        self.call("getChatAdministrators", json!({ "chat_id": chat.0 })).await
    }
}

impl ChatAuthority for TelegramApi {
    async fn list_chat_admins(&self, chat: ChatId) -> Result<Vec<ChatMember>, ChatAuthorityError> {
        self.get_chat_administrators(chat)
            .await
            .map(|admins| admins.into_iter().map(ChatMember::from).collect())
            .map_err(|e| ChatAuthorityError { chat, reason: e.to_string() })
    }
}

impl ChatTransport for TelegramApi {
    async fn send_text(&self, chat: ChatId, text: &str, buttons: &[Button]) -> Result<MessageRef, TransportError> {
        let message = self.send_message(chat, text, InlineKeyboardMarkup::from_buttons(buttons)).await?;
        Ok(message.reference())
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        file_id: &str,
        caption: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, TransportError> {
        let message = self.send_photo_by_id(chat, file_id, caption, InlineKeyboardMarkup::from_buttons(buttons)).await?;
        Ok(message.reference())
    }

    async fn clear_buttons(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.remove_reply_markup(message).await
    }

    async fn answer_action(&self, action_id: &str, text: &str) -> Result<(), TransportError> {
        self.answer_callback_query(action_id, text).await
    }
}
