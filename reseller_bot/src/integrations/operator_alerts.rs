use futures::future::BoxFuture;
use log::*;
use reseller_engine::{
    db_types::ChatId,
    events::{EventHandlers, EventHooks},
};

use crate::{replies::Presentation, telegram::TelegramApi};

pub const ALERT_EVENT_BUFFER_SIZE: usize = 25;

/// Tells the operator about every line item the panel did not accept, so that unrefunded debits can be corrected by
/// hand.
pub fn create_operator_alert_handlers(
    api: TelegramApi,
    operator_chat: ChatId,
    presentation: Presentation,
) -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_failed(move |ev| {
        let text = presentation.order_failed_alert(&ev);
        alert_operator(api.clone(), operator_chat, text, ev.order.id)
    });
    EventHandlers::new(ALERT_EVENT_BUFFER_SIZE, hooks)
}

fn alert_operator(api: TelegramApi, chat: ChatId, text: String, order_id: i64) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        match api.send_message(chat, &text, None).await {
            Ok(_) => debug!("📬️ Operator alerted about failed order line #{order_id}"),
            Err(e) => error!("📬️ Could not alert the operator about failed order line #{order_id}. {e}"),
        }
    })
}
