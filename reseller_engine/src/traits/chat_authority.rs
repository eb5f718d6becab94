use std::sync::Arc;

use thiserror::Error;

use crate::db_types::{ChatId, ChatMember};

#[derive(Debug, Clone, Error)]
#[error("Could not fetch the administrators of chat {chat}: {reason}")]
pub struct ChatAuthorityError {
    pub chat: ChatId,
    pub reason: String,
}

/// Answers questions about group chat membership. Group authority is never stored; it is asked for on every call.
#[allow(async_fn_in_trait)]
pub trait ChatAuthority {
    async fn list_chat_admins(&self, chat: ChatId) -> Result<Vec<ChatMember>, ChatAuthorityError>;
}

impl<A: ChatAuthority> ChatAuthority for Arc<A> {
    async fn list_chat_admins(&self, chat: ChatId) -> Result<Vec<ChatMember>, ChatAuthorityError> {
        self.as_ref().list_chat_admins(chat).await
    }
}
