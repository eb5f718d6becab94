use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use reseller_engine::{events::EventProducers, traits::StorefrontDatabase, RechargeSessions, SqliteDatabase};

use crate::{
    bot::{BotSettings, StorefrontBot},
    config::BotConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    helpers::WebhookSecret,
    integrations::{create_operator_alert_handlers, PanelFulfillment},
    routes::{health, TelegramWebhookRoute},
    telegram::TelegramApi,
};

const SESSION_PURGE_PERIOD: Duration = Duration::from_secs(60);

pub async fn run_server(config: BotConfig) -> Result<(), ServerError> {
    let operator = config.validate()?;
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🗃️ Database ready at {}", db.url());
    let telegram = TelegramApi::new(&config.telegram_api_url, config.bot_token.clone())?;
    let panel = PanelFulfillment::new(config.panel.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let settings = BotSettings::from_config(&config, operator);
    let handlers = create_operator_alert_handlers(telegram.clone(), operator.into(), settings.presentation.clone());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let sessions = RechargeSessions::new();
    // Runs for the life of the process
    let _worker = start_expiry_worker(sessions.clone(), SESSION_PURGE_PERIOD);
    let srv = create_server_instance(config, db, telegram, panel, sessions, producers, settings)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: BotConfig,
    db: SqliteDatabase,
    telegram: TelegramApi,
    panel: PanelFulfillment,
    sessions: RechargeSessions,
    producers: EventProducers,
    settings: BotSettings,
) -> Result<Server, ServerError> {
    let secret = WebhookSecret::new(config.webhook_secret.clone());
    let srv = HttpServer::new(move || {
        let bot = StorefrontBot::new(
            db.clone(),
            telegram.clone(),
            panel.clone(),
            sessions.clone(),
            producers.clone(),
            settings.clone(),
        );
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rsb::access_log"))
            .app_data(web::Data::new(bot))
            .app_data(web::Data::new(secret.clone()))
            .service(health)
            .service(TelegramWebhookRoute::<SqliteDatabase, TelegramApi, PanelFulfillment>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
