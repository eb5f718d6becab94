//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database, panel and Telegram call the webhook makes is
//! therefore async, and a slow panel holds up only the update that called it.
//!
//! The webhook always answers `200 OK` once an update has been accepted, even if a reply could not be delivered.
//! Telegram re-sends updates that fail, and re-running an order is far worse than a lost reply.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use reseller_engine::traits::{FulfillmentProvider, StorefrontDatabase};

use crate::{
    bot::StorefrontBot,
    errors::ServerError,
    helpers::WebhookSecret,
    telegram::Update,
    transport::ChatTransport,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------  Webhook  ----------------------------------------------------
route!(telegram_webhook => Post "/telegram/webhook" impl StorefrontDatabase, ChatTransport, FulfillmentProvider);
/// Route handler for Telegram updates
///
/// The request must carry the configured secret in the `X-Telegram-Bot-Api-Secret-Token` header. The secret is
/// checked before the body is looked at.
pub async fn telegram_webhook<B, T, F>(
    req: HttpRequest,
    body: web::Bytes,
    secret: web::Data<WebhookSecret>,
    bot: web::Data<StorefrontBot<B, T, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: StorefrontDatabase,
    T: ChatTransport,
    F: FulfillmentProvider,
{
    if !secret.accepts(&req) {
        return Err(ServerError::InvalidWebhookSecret);
    }
    let update = serde_json::from_slice::<Update>(&body).map_err(|e| {
        warn!("💻️ Could not deserialize a webhook update. {e}");
        ServerError::CouldNotDeserializePayload(e.to_string())
    })?;
    let update_id = update.update_id;
    trace!("💻️ Received update {update_id}");
    match update.into_event() {
        Some(event) => {
            if let Err(e) = bot.handle(event).await {
                warn!("💻️ Update {update_id} was processed, but a reply could not be delivered. {e}");
            }
        },
        None => trace!("💻️ Update {update_id} has nothing for the bot to do"),
    }
    Ok(HttpResponse::Ok().finish())
}
