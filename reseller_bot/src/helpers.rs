use actix_web::HttpRequest;
use log::{debug, trace};
use rsb_common::Secret;

pub const WEBHOOK_SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// The secret Telegram must present on every webhook call. An unset secret accepts every call.
#[derive(Debug, Clone, Default)]
pub struct WebhookSecret(pub Secret<String>);

impl WebhookSecret {
    pub fn new(secret: Secret<String>) -> Self {
        Self(secret)
    }

    /// True if the request carries the configured secret, or if there is none to check.
    pub fn accepts(&self, req: &HttpRequest) -> bool {
        if !self.0.is_set() {
            trace!("💻️ No webhook secret configured. Accepting the update.");
            return true;
        }
        let presented = req.headers().get(WEBHOOK_SECRET_HEADER).and_then(|v| v.to_str().ok());
        let accepted = presented.is_some_and(|p| constant_time_eq(p.as_bytes(), self.0.reveal().as_bytes()));
        if !accepted {
            debug!("💻️ Webhook call with a missing or wrong secret token");
        }
        accepted
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
