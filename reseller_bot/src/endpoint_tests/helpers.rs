use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use reseller_engine::{
    db_types::{ChatId, Credits, UserId},
    events::EventProducers,
    test_utils::{
        fakes::FakeFulfillment,
        prepare_env::{prepare_test_env, random_db_path},
    },
    traits::FulfillmentProvider,
    AccountApi,
    CatalogApi,
    RechargeSessions,
    SqliteDatabase,
};
use rsb_common::Secret;
use serde_json::{json, Value};

use super::mocks::RecordingTransport;
use crate::{
    bot::{BotSettings, StorefrontBot},
    helpers::{WebhookSecret, WEBHOOK_SECRET_HEADER},
    routes::{health, TelegramWebhookRoute},
};

pub const OPERATOR: UserId = UserId(1);
pub const SHOP_GROUP: ChatId = ChatId(-1001);

pub type TestBot<F> = StorefrontBot<SqliteDatabase, RecordingTransport, F>;

/// A bot over a fresh database, talking to a [`RecordingTransport`].
pub struct TestShop<F = FakeFulfillment> {
    pub db: SqliteDatabase,
    pub transport: RecordingTransport,
    pub bot: web::Data<TestBot<F>>,
    pub secret: WebhookSecret,
}

impl TestShop<FakeFulfillment> {
    pub async fn new() -> (Self, FakeFulfillment) {
        let fulfillment = FakeFulfillment::new();
        let shop = Self::with_fulfillment(fulfillment.clone(), BotSettings::new(OPERATOR)).await;
        (shop, fulfillment)
    }
}

impl<F: FulfillmentProvider + 'static> TestShop<F> {
    pub async fn with_fulfillment(fulfillment: F, settings: BotSettings) -> Self {
        let db = prepare_test_env(&random_db_path()).await;
        let transport = RecordingTransport::default();
        let bot = StorefrontBot::new(
            db.clone(),
            transport.clone(),
            fulfillment,
            RechargeSessions::new(),
            EventProducers::default(),
            settings,
        );
        Self { db, transport, bot: web::Data::new(bot), secret: WebhookSecret::default() }
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = WebhookSecret::new(Secret::new(secret.to_string()));
        self
    }

    /// Adds a product with a panel service id and a price per 1000 in whole credits.
    pub async fn stock(&self, name: &str, service_id: &str, price: i64) {
        let catalog = CatalogApi::new(self.db.clone());
        catalog.set_service_id(name, service_id).await.expect("Could not set service id");
        catalog.set_price(name, Credits::from_whole(price)).await.expect("Could not set price");
    }

    pub async fn whitelist(&self, user: UserId, balance: i64) {
        let accounts = AccountApi::new(self.db.clone());
        accounts.set_whitelisted(user, true).await.expect("Could not whitelist user");
        if balance != 0 {
            accounts.adjust_balance(user, Credits::from_whole(balance)).await.expect("Could not fund user");
        }
    }

    pub async fn balance(&self, user: UserId) -> Credits {
        AccountApi::new(self.db.clone()).balance(user).await.expect("Could not fetch balance")
    }

    /// Posts `update` to the webhook, presenting `secret` if given.
    pub async fn post(&self, update: &Value, secret: Option<&str>) -> (StatusCode, String) {
        let mut req = TestRequest::post().uri("/telegram/webhook").set_json(update);
        if let Some(secret) = secret {
            req = req.insert_header((WEBHOOK_SECRET_HEADER, secret));
        }
        self.call(req).await
    }

    pub async fn call(&self, req: TestRequest) -> (StatusCode, String) {
        let app = App::new()
            .app_data(self.bot.clone())
            .app_data(web::Data::new(self.secret.clone()))
            .service(health)
            .service(TelegramWebhookRoute::<SqliteDatabase, RecordingTransport, F>::new());
        let service = test::init_service(app).await;
        debug!("Making request");
        let res = test::call_service(&service, req.to_request()).await;
        let status = res.status();
        let body = res.into_body().try_into_bytes().map(|b| String::from_utf8_lossy(&b).into_owned());
        (status, body.unwrap_or_default())
    }

    /// Posts `update` and checks that the webhook accepted it.
    pub async fn send(&self, update: Value) {
        let (status, body) = self.post(&update, None).await;
        assert_eq!(status, StatusCode::OK, "Webhook refused the update: {body}");
    }
}

//-------------------------------------------   Update builders   -----------------------------------------------------
fn next_update_id() -> i64 {
    use std::sync::atomic::{AtomicI64, Ordering};
    static UPDATE_ID: AtomicI64 = AtomicI64::new(1);
    UPDATE_ID.fetch_add(1, Ordering::SeqCst)
}

fn user(id: UserId) -> Value {
    json!({ "id": id.0, "is_bot": false, "first_name": format!("user{}", id.0) })
}

pub fn private_text(from: UserId, text: &str) -> Value {
    json!({
        "update_id": next_update_id(),
        "message": {
            "message_id": 1,
            "from": user(from),
            "chat": { "id": from.0, "type": "private" },
            "date": 1_700_000_000,
            "text": text
        }
    })
}

pub fn group_text(chat: ChatId, from: UserId, text: &str) -> Value {
    json!({
        "update_id": next_update_id(),
        "message": {
            "message_id": 1,
            "from": user(from),
            "chat": { "id": chat.0, "type": "supergroup", "title": "Shop" },
            "date": 1_700_000_000,
            "text": text
        }
    })
}

pub fn private_photo(from: UserId, file_id: &str) -> Value {
    json!({
        "update_id": next_update_id(),
        "message": {
            "message_id": 1,
            "from": user(from),
            "chat": { "id": from.0, "type": "private" },
            "date": 1_700_000_000,
            "photo": [
                { "file_id": format!("{file_id}-small"), "width": 90, "height": 90 },
                { "file_id": file_id, "width": 1280, "height": 960 }
            ]
        }
    })
}

/// A button press on `message` in chat `chat`.
pub fn button_press(from: UserId, chat: ChatId, message_id: i64, data: &str) -> Value {
    let kind = if chat.0 < 0 { "supergroup" } else { "private" };
    json!({
        "update_id": next_update_id(),
        "callback_query": {
            "id": format!("cb{}", next_update_id()),
            "from": user(from),
            "message": {
                "message_id": message_id,
                "chat": { "id": chat.0, "type": kind },
                "date": 1_700_000_000
            },
            "data": data
        }
    })
}
