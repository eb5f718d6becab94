use std::env;

use chrono::Duration;
use log::*;
use panel_tools::PanelConfig;
use reseller_engine::{
    db_types::{ChatId, UserId},
    order_objects::RefundPolicy,
    RechargeConfig,
};
use rsb_common::{parse_list, Secret};

use crate::errors::ServerError;

const DEFAULT_RSB_HOST: &str = "127.0.0.1";
const DEFAULT_RSB_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/reseller_store.db";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_CURRENCY_SYMBOL: &str = "CR";
const DEFAULT_PAYMENT_INSTRUCTIONS: &str =
    "Transfer the amount to the account your operator gave you, then send a screenshot of the receipt here.";

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The token issued by BotFather. Required.
    pub bot_token: Secret<String>,
    /// Base URL of the Bot API. Only changed for a local Bot API server or for tests.
    pub telegram_api_url: String,
    /// If set, webhook calls must carry it in the `X-Telegram-Bot-Api-Secret-Token` header.
    pub webhook_secret: Secret<String>,
    /// The owner of the bot. Required.
    pub operator_id: Option<UserId>,
    /// Where recharge requests are sent for review. Defaults to the operator's private chat.
    pub review_chat_id: Option<ChatId>,
    pub recharge: RechargeConfig,
    /// Shown to a party once they have picked a recharge amount.
    pub payment_instructions: String,
    pub refund_policy: RefundPolicy,
    /// Appended to every credit amount shown in chat.
    pub currency_symbol: String,
    /// An optional second currency that balances are also quoted in.
    pub display_currency: Option<DisplayCurrency>,
    pub panel: PanelConfig,
}

/// A currency that balances are quoted in alongside credits, e.g. `USD` at 0.01 per credit.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayCurrency {
    pub code: String,
    /// Units of `code` per credit
    pub rate: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RSB_HOST.to_string(),
            port: DEFAULT_RSB_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bot_token: Secret::default(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
            webhook_secret: Secret::default(),
            operator_id: None,
            review_chat_id: None,
            recharge: RechargeConfig::default(),
            payment_instructions: DEFAULT_PAYMENT_INSTRUCTIONS.to_string(),
            refund_policy: RefundPolicy::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            display_currency: None,
            panel: PanelConfig::default(),
        }
    }
}

impl BotConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RSB_HOST").ok().unwrap_or_else(|| DEFAULT_RSB_HOST.into());
        let port = env::var("RSB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RSB_PORT. {e} Using the default, {DEFAULT_RSB_PORT}, instead."
                    );
                    DEFAULT_RSB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RSB_PORT);
        let database_url = env::var("RSB_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ RSB_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let bot_token = Secret::new(env::var("RSB_BOT_TOKEN").ok().unwrap_or_else(|| {
            error!("🪛️ RSB_BOT_TOKEN is not set. The bot cannot talk to Telegram without it.");
            String::default()
        }));
        let telegram_api_url = env::var("RSB_TELEGRAM_API_URL").ok().unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.into());
        let webhook_secret = Secret::new(env::var("RSB_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            warn!("🪛️ RSB_WEBHOOK_SECRET is not set. Anyone who knows the webhook URL can send updates to the bot.");
            String::default()
        }));
        let operator_id = env::var("RSB_OPERATOR_ID").ok().and_then(|s| {
            s.parse::<UserId>().map_err(|e| error!("🪛️ RSB_OPERATOR_ID is invalid. {e}")).ok()
        });
        let review_chat_id = env::var("RSB_REVIEW_CHAT_ID").ok().and_then(|s| {
            s.trim()
                .parse::<i64>()
                .map(ChatId)
                .map_err(|e| warn!("🪛️ {s} is not a valid chat id for RSB_REVIEW_CHAT_ID. {e}"))
                .ok()
        });
        if review_chat_id.is_none() {
            info!("🪛️ RSB_REVIEW_CHAT_ID is not set. Recharge requests will be sent to the operator.");
        }
        let recharge = recharge_config_from_env();
        let payment_instructions = env::var("RSB_PAYMENT_INSTRUCTIONS").ok().unwrap_or_else(|| {
            warn!("🪛️ RSB_PAYMENT_INSTRUCTIONS is not set. Using a generic message.");
            DEFAULT_PAYMENT_INSTRUCTIONS.into()
        });
        let refund_policy = env::var("RSB_REFUND_POLICY")
            .ok()
            .map(|s| {
                s.parse::<RefundPolicy>().unwrap_or_else(|e| {
                    error!("🪛️ {e}. Using the default, {}, instead.", RefundPolicy::default());
                    RefundPolicy::default()
                })
            })
            .unwrap_or_default();
        info!("🪛️ Refund policy for failed line items: {refund_policy}");
        let currency_symbol =
            env::var("RSB_CURRENCY_SYMBOL").ok().unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.into());
        let display_currency = display_currency_from_env();
        let panel = PanelConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            bot_token,
            telegram_api_url,
            webhook_secret,
            operator_id,
            review_chat_id,
            recharge,
            payment_instructions,
            refund_policy,
            currency_symbol,
            display_currency,
            panel,
        }
    }

    /// Checks that the values the bot cannot run without are present, and returns the operator id.
    pub fn validate(&self) -> Result<UserId, ServerError> {
        if !self.bot_token.is_set() {
            return Err(ServerError::ConfigurationError("RSB_BOT_TOKEN must be set".into()));
        }
        self.operator_id.ok_or_else(|| ServerError::ConfigurationError("RSB_OPERATOR_ID must be set".into()))
    }
}

fn recharge_config_from_env() -> RechargeConfig {
    let mut config = RechargeConfig::default();
    if let Ok(s) = env::var("RSB_RECHARGE_AMOUNTS") {
        let (amounts, bad) = parse_list::<u64>(&s);
        bad.iter().for_each(|b| warn!("🪛️ Ignoring invalid recharge amount in RSB_RECHARGE_AMOUNTS: {b}"));
        let amounts = amounts.into_iter().filter(|a| *a > 0).collect::<Vec<_>>();
        if amounts.is_empty() {
            error!("🪛️ RSB_RECHARGE_AMOUNTS contains no usable amounts. Using the defaults.");
        } else {
            config.denominations = amounts;
        }
    }
    info!("🪛️ Recharge amounts: {:?}", config.denominations);
    match env::var("RSB_RECHARGE_SESSION_TTL").map(|s| s.trim().parse::<i64>()) {
        Ok(Ok(minutes)) if minutes > 0 => config.session_ttl = Duration::minutes(minutes),
        Ok(_) => error!("🪛️ RSB_RECHARGE_SESSION_TTL must be a positive number of minutes. Using the default."),
        Err(_) => {},
    }
    info!("🪛️ Recharge sessions expire after {} minutes", config.session_ttl.num_minutes());
    config
}

fn display_currency_from_env() -> Option<DisplayCurrency> {
    let code = env::var("RSB_DISPLAY_CURRENCY").ok().filter(|s| !s.trim().is_empty())?;
    let rate = env::var("RSB_DISPLAY_RATE").ok().and_then(|s| {
        s.trim().parse::<f64>().map_err(|e| error!("🪛️ {s} is not a valid value for RSB_DISPLAY_RATE. {e}")).ok()
    });
    match rate {
        Some(rate) if rate.is_finite() && rate > 0.0 => {
            info!("🪛️ Balances will also be shown in {code} at {rate} per credit");
            Some(DisplayCurrency { code: code.trim().to_string(), rate })
        },
        _ => {
            warn!("🪛️ RSB_DISPLAY_CURRENCY is set, but RSB_DISPLAY_RATE is missing or invalid. Ignoring it.");
            None
        },
    }
}
