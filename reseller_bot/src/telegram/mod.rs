//! Telegram Bot API bindings: the webhook payload types and an outbound client.
mod api;
pub mod types;

pub use api::TelegramApi;
pub use types::Update;
