//! Command dispatch.
//!
//! [`StorefrontBot`] turns inbound chat events into calls on the engine APIs and sends the replies. Every error the
//! engine reports becomes a reply in the chat the command came from; only transport failures are returned to the
//! caller.
//!
//! Unauthorized commands in group chats are ignored without a reply, so that a shop's group is not spammed by members
//! trying commands they may not use.
use std::sync::Arc;

use log::*;
use reseller_engine::{
    db_types::{ChatContext, ChatId, Credits, RechargeRequest, ReviewStatus, UserId},
    events::EventProducers,
    order_objects::RefundPolicy,
    traits::{FulfillmentProvider, StorefrontDatabase},
    AccessApi,
    AccessError,
    AccountApi,
    AccountApiError,
    CatalogApi,
    CatalogApiError,
    OrderFlowApi,
    OrderFlowError,
    Permission,
    RechargeApi,
    RechargeConfig,
    RechargeDecision,
    RechargeError,
    RechargeSessions,
    RechargeStep,
};

use crate::{
    commands::{split_first, split_name_and_value, ButtonAction, Command},
    config::BotConfig,
    replies::*,
    transport::{Button, ChatTransport, InboundAction, InboundEvent, InboundMessage, TransportError},
};

/// The runtime settings of the bot, taken from [`BotConfig`] once it has been validated.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub operator: UserId,
    /// Defaults to the operator's private chat
    pub review_chat: Option<ChatId>,
    pub recharge: RechargeConfig,
    pub refund_policy: RefundPolicy,
    pub payment_instructions: String,
    pub presentation: Presentation,
}

impl BotSettings {
    pub fn new(operator: UserId) -> Self {
        Self {
            operator,
            review_chat: None,
            recharge: RechargeConfig::default(),
            refund_policy: RefundPolicy::default(),
            payment_instructions: String::default(),
            presentation: Presentation::new("CR", None),
        }
    }

    pub fn from_config(config: &BotConfig, operator: UserId) -> Self {
        Self {
            operator,
            review_chat: config.review_chat_id,
            recharge: config.recharge.clone(),
            refund_policy: config.refund_policy,
            payment_instructions: config.payment_instructions.clone(),
            presentation: Presentation::new(&config.currency_symbol, config.display_currency.clone()),
        }
    }

    pub fn review_chat(&self) -> ChatId {
        self.review_chat.unwrap_or_else(|| self.operator.into())
    }
}

pub struct StorefrontBot<B, T, F> {
    catalog: CatalogApi<B>,
    accounts: AccountApi<B>,
    orders: OrderFlowApi<B, F>,
    access: AccessApi<B, Arc<T>>,
    recharges: RechargeApi<B>,
    transport: Arc<T>,
    settings: BotSettings,
}

impl<B, T, F> StorefrontBot<B, T, F>
where
    B: StorefrontDatabase,
    T: ChatTransport,
    F: FulfillmentProvider,
{
    pub fn new(
        db: B,
        transport: T,
        fulfillment: F,
        sessions: RechargeSessions,
        producers: EventProducers,
        settings: BotSettings,
    ) -> Self {
        let transport = Arc::new(transport);
        let operator = settings.operator;
        let orders = OrderFlowApi::new(db.clone(), fulfillment, producers, operator)
            .with_refund_policy(settings.refund_policy);
        Self {
            catalog: CatalogApi::new(db.clone()),
            accounts: AccountApi::new(db.clone()),
            orders,
            access: AccessApi::new(db.clone(), Arc::clone(&transport), operator),
            recharges: RechargeApi::new(db, sessions, settings.recharge.clone()),
            transport,
            settings,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn recharges(&self) -> &RechargeApi<B> {
        &self.recharges
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    fn present(&self) -> &Presentation {
        &self.settings.presentation
    }

    pub async fn handle(&self, event: InboundEvent) -> Result<(), TransportError> {
        match event {
            InboundEvent::Message(msg) => self.handle_message(&msg).await,
            InboundEvent::Action(action) => self.handle_action(&action).await,
        }
    }

    async fn handle_message(&self, msg: &InboundMessage) -> Result<(), TransportError> {
        match msg.text.as_deref().and_then(Command::parse) {
            Some(command) => self.handle_command(msg, command).await,
            None if msg.chat.is_private() => self.continue_recharge(msg).await,
            None => Ok(()),
        }
    }

    async fn reply(&self, msg: &InboundMessage, text: &str) -> Result<(), TransportError> {
        self.transport.send_text(msg.chat.id, text, &[]).await.map(|_| ())
    }

    async fn handle_command(&self, msg: &InboundMessage, command: Command) -> Result<(), TransportError> {
        debug!("💬️ {command:?} from {} in chat {}", msg.sender, msg.chat.id);
        let private = msg.chat.is_private();
        match command {
            Command::Start | Command::Help if private => self.start(msg).await,
            Command::Products => self.list_products(msg).await,
            Command::Price(name) => self.show_price(msg, &name).await,
            Command::Balance if private => self.show_balance(msg).await,
            Command::Recharge if private => self.start_recharge(msg.sender).await,
            Command::Cancel if private => self.cancel_recharge(msg).await,
            Command::Order(body) => self.place_order(msg, &body).await,
            Command::Status(id) => self.order_status(msg, &id).await,
            Command::SetService(args) => self.set_service(msg, &args).await,
            Command::SetPrice(args) => self.set_price(msg, &args).await,
            Command::AddBalance(args) => self.add_balance(msg, &args).await,
            Command::AddAdmin(args) => self.update_role(msg, RoleChange::AddAdmin, &args).await,
            Command::DelAdmin(args) => self.update_role(msg, RoleChange::RemoveAdmin, &args).await,
            Command::Whitelist(args) => self.update_role(msg, RoleChange::Whitelist, &args).await,
            Command::Unwhitelist(args) => self.update_role(msg, RoleChange::Unwhitelist, &args).await,
            Command::Unknown(_) if private => self.reply(msg, UNKNOWN_COMMAND).await,
            _ => Ok(()),
        }
    }

    /// Returns `false` if the caller may not go on. Denials are answered in private chats and ignored in groups.
    async fn authorize_or_reply(&self, msg: &InboundMessage, permission: Permission) -> Result<bool, TransportError> {
        match self.access.authorize(msg.sender, &msg.chat, permission).await {
            Ok(_) => Ok(true),
            Err(e) if msg.chat.is_group() => {
                trace!("💬️ Ignoring {permission:?} from {} in group {}. {e}", msg.sender, msg.chat.id);
                Ok(false)
            },
            Err(AccessError::PersistenceUnavailable(e)) => {
                error!("💬️ Could not check the role of {}. {e}", msg.sender);
                self.reply(msg, TRY_AGAIN_LATER).await?;
                Ok(false)
            },
            Err(AccessError::NotAuthorized) => {
                self.reply(msg, NOT_AUTHORIZED).await?;
                Ok(false)
            },
            Err(e) => {
                self.reply(msg, &e.to_string()).await?;
                Ok(false)
            },
        }
    }

    //--------------------------------------   Catalog and accounts   ------------------------------------------------
    async fn start(&self, msg: &InboundMessage) -> Result<(), TransportError> {
        if let Err(e) = self.accounts.touch(msg.sender).await {
            error!("💬️ Could not create an account for {}. {e}", msg.sender);
        }
        let is_operator = self.access.is_operator(msg.sender);
        self.reply(msg, &self.present().help(is_operator)).await
    }

    async fn list_products(&self, msg: &InboundMessage) -> Result<(), TransportError> {
        let text = match self.catalog.list().await {
            Ok(products) => self.present().products(&products),
            Err(e) => self.catalog_error(e),
        };
        self.reply(msg, &text).await
    }

    async fn show_price(&self, msg: &InboundMessage, name: &str) -> Result<(), TransportError> {
        if name.trim().is_empty() {
            return self.reply(msg, PRICE_USAGE).await;
        }
        let text = match self.catalog.product(name).await {
            Ok(product) => self.present().product(&product),
            Err(e) => self.catalog_error(e),
        };
        self.reply(msg, &text).await
    }

    async fn show_balance(&self, msg: &InboundMessage) -> Result<(), TransportError> {
        let balance = match self.accounts.touch(msg.sender).await {
            Ok(account) => account.balance,
            Err(e) => return self.reply(msg, &self.account_error(e)).await,
        };
        let mut text = self.present().balance(balance);
        if self.access.authorize(msg.sender, &msg.chat, Permission::PrivilegedView).await.is_ok() {
            match self.accounts.ledger_summary().await {
                Ok(summary) => {
                    let remote = self.orders.remote_balance().await.map_err(|e| e.to_string());
                    text.push_str("\n\n");
                    text.push_str(&self.present().privileged_balance(&summary, remote));
                },
                Err(e) => error!("💬️ Could not fetch the ledger summary. {e}"),
            }
        }
        self.reply(msg, &text).await
    }

    async fn set_service(&self, msg: &InboundMessage, args: &str) -> Result<(), TransportError> {
        if !self.authorize_or_reply(msg, Permission::ManageStore).await? {
            return Ok(());
        }
        let Some((name, service_id)) = split_name_and_value(args) else {
            return self.reply(msg, SET_SERVICE_USAGE).await;
        };
        let text = match self.catalog.set_service_id(name, service_id).await {
            Ok(product) => format!("Updated. {}", self.present().product(&product)),
            Err(e) => self.catalog_error(e),
        };
        self.reply(msg, &text).await
    }

    async fn set_price(&self, msg: &InboundMessage, args: &str) -> Result<(), TransportError> {
        if !self.authorize_or_reply(msg, Permission::ManageStore).await? {
            return Ok(());
        }
        let parsed = split_name_and_value(args).and_then(|(n, p)| Some((n, p.parse::<Credits>().ok()?)));
        let Some((name, price)) = parsed else {
            return self.reply(msg, SET_PRICE_USAGE).await;
        };
        let text = match self.catalog.set_price(name, price).await {
            Ok(product) => format!("Updated. {}", self.present().product(&product)),
            Err(e) => self.catalog_error(e),
        };
        self.reply(msg, &text).await
    }

    async fn add_balance(&self, msg: &InboundMessage, args: &str) -> Result<(), TransportError> {
        if !self.authorize_or_reply(msg, Permission::ManageStore).await? {
            return Ok(());
        }
        let parsed = split_first(args)
            .and_then(|(user, amount)| Some((user.parse::<UserId>().ok()?, amount.parse::<Credits>().ok()?)));
        let Some((user, delta)) = parsed else {
            return self.reply(msg, ADD_BALANCE_USAGE).await;
        };
        let text = match self.accounts.adjust_balance(user, delta).await {
            Ok(account) => {
                info!("💬️ Operator adjusted the balance of {user} by {delta}");
                format!("The balance of {user} is now {}.", self.present().money(account.balance))
            },
            Err(e) => self.account_error(e),
        };
        self.reply(msg, &text).await
    }

    async fn update_role(&self, msg: &InboundMessage, change: RoleChange, args: &str) -> Result<(), TransportError> {
        if !self.authorize_or_reply(msg, Permission::ManageStore).await? {
            return Ok(());
        }
        let Ok(user) = args.parse::<UserId>() else {
            return self.reply(msg, &USER_USAGE.replace("<command>", change.command())).await;
        };
        let result = match change {
            RoleChange::AddAdmin => self.accounts.add_admin(user).await.map(|added| {
                if added {
                    format!("{user} is now an admin.")
                } else {
                    format!("{user} was already an admin.")
                }
            }),
            RoleChange::RemoveAdmin => self.accounts.remove_admin(user).await.map(|removed| {
                if removed {
                    format!("{user} is no longer an admin.")
                } else {
                    format!("{user} was not an admin.")
                }
            }),
            RoleChange::Whitelist => {
                self.accounts.set_whitelisted(user, true).await.map(|_| format!("{user} is now whitelisted."))
            },
            RoleChange::Unwhitelist => {
                self.accounts.set_whitelisted(user, false).await.map(|_| format!("{user} is no longer whitelisted."))
            },
        };
        let text = result.unwrap_or_else(|e| self.account_error(e));
        self.reply(msg, &text).await
    }

    fn catalog_error(&self, e: CatalogApiError) -> String {
        match e {
            CatalogApiError::PersistenceUnavailable(e) => {
                error!("💬️ Catalog unavailable. {e}");
                TRY_AGAIN_LATER.to_string()
            },
            e => e.to_string(),
        }
    }

    fn account_error(&self, e: AccountApiError) -> String {
        match e {
            AccountApiError::PersistenceUnavailable(e) => {
                error!("💬️ Ledger unavailable. {e}");
                TRY_AGAIN_LATER.to_string()
            },
            e => e.to_string(),
        }
    }

    //--------------------------------------          Orders          ------------------------------------------------
    async fn place_order(&self, msg: &InboundMessage, body: &str) -> Result<(), TransportError> {
        if !self.authorize_or_reply(msg, Permission::PlaceOrder).await? {
            return Ok(());
        }
        let text = match self.orders.place_order(msg.sender, body).await {
            Ok(receipt) => self.present().receipt(&receipt),
            Err(OrderFlowError::Parse(e)) => format!("{e}\n{ORDER_USAGE}"),
            Err(OrderFlowError::InsufficientBalance { required, available }) => {
                self.present().insufficient_balance(required, available)
            },
            Err(OrderFlowError::PersistenceUnavailable(e)) => {
                error!("💬️ Order from {} aborted. {e}", msg.sender);
                TRY_AGAIN_LATER.to_string()
            },
            Err(e) => e.to_string(),
        };
        self.reply(msg, &text).await
    }

    async fn order_status(&self, msg: &InboundMessage, remote_order_id: &str) -> Result<(), TransportError> {
        if !self.authorize_or_reply(msg, Permission::CheckStatus).await? {
            return Ok(());
        }
        let remote_order_id = remote_order_id.trim();
        if remote_order_id.is_empty() || remote_order_id.contains(char::is_whitespace) {
            return self.reply(msg, STATUS_USAGE).await;
        }
        let text = match self.orders.order_status(remote_order_id).await {
            Ok(status) => self.present().order_status(remote_order_id, &status),
            Err(e) => e.to_string(),
        };
        self.reply(msg, &text).await
    }

    //--------------------------------------         Recharges        ------------------------------------------------
    async fn start_recharge(&self, user: UserId) -> Result<(), TransportError> {
        if let Err(e) = self.accounts.touch(user).await {
            error!("💬️ Could not create an account for {user}. {e}");
        }
        self.recharges.start(user);
        let mut buttons = self
            .recharges
            .denominations()
            .iter()
            .map(|d| {
                let amount = Credits::from_whole(i64::try_from(*d).unwrap_or(i64::MAX));
                Button::new(self.present().money(amount), ButtonAction::Amount(*d).to_string())
            })
            .collect::<Vec<_>>();
        buttons.push(Button::new("Cancel", ButtonAction::Cancel.to_string()));
        let text = self.present().amount_prompt(self.recharges.denominations());
        self.transport.send_text(user.into(), &text, &buttons).await.map(|_| ())
    }

    async fn cancel_recharge(&self, msg: &InboundMessage) -> Result<(), TransportError> {
        let text = if self.recharges.cancel(msg.sender) { RECHARGE_CANCELLED } else { NO_RECHARGE };
        self.reply(msg, text).await
    }

    /// Plain (non-command) messages in a private chat belong to the recharge conversation, if there is one.
    async fn continue_recharge(&self, msg: &InboundMessage) -> Result<(), TransportError> {
        match self.recharges.current_step(msg.sender) {
            Some(RechargeStep::AwaitingAmount) => {
                self.submit_amount(msg.sender, msg.text.as_deref().unwrap_or_default()).await
            },
            Some(RechargeStep::AwaitingProof { .. }) => self.submit_proof(msg.sender, msg.image.as_deref()).await,
            None if msg.image.is_some() => self.reply(msg, NO_RECHARGE).await,
            None => self.reply(msg, UNKNOWN_COMMAND).await,
        }
    }

    async fn submit_amount(&self, user: UserId, text: &str) -> Result<(), TransportError> {
        let chat = ChatId::from(user);
        match self.recharges.submit_amount(user, text) {
            Ok(amount) => {
                let text = self.present().proof_prompt(amount, &self.settings.payment_instructions);
                let cancel = [Button::new("Cancel", ButtonAction::Cancel.to_string())];
                self.transport.send_text(chat, &text, &cancel).await.map(|_| ())
            },
            Err(e @ RechargeError::InvalidAmount(_)) => {
                let text = format!("{e}\n{}", self.present().amount_prompt(self.recharges.denominations()));
                self.transport.send_text(chat, &text, &[]).await.map(|_| ())
            },
            Err(RechargeError::WrongStep) => self.transport.send_text(chat, PROOF_REQUIRED, &[]).await.map(|_| ()),
            Err(RechargeError::NoSession) => self.transport.send_text(chat, NO_RECHARGE, &[]).await.map(|_| ()),
            Err(e) => self.transport.send_text(chat, &e.to_string(), &[]).await.map(|_| ()),
        }
    }

    async fn submit_proof(&self, user: UserId, image: Option<&str>) -> Result<(), TransportError> {
        let chat = ChatId::from(user);
        let text = match self.recharges.submit_proof(user, image).await {
            Ok(request) => {
                self.transport.send_text(chat, &self.present().request_submitted(&request), &[]).await?;
                self.escalate(&request).await;
                return Ok(());
            },
            Err(RechargeError::ProofRequired) => PROOF_REQUIRED.to_string(),
            Err(RechargeError::NoSession) => NO_RECHARGE.to_string(),
            Err(RechargeError::PersistenceUnavailable(e)) => {
                error!("💬️ Could not store the recharge request of {user}. {e}");
                TRY_AGAIN_LATER.to_string()
            },
            Err(e) => e.to_string(),
        };
        self.transport.send_text(chat, &text, &[]).await.map(|_| ())
    }

    /// Sends the request to the review chat, falling back to the operator. The request is stored either way, so a
    /// delivery failure is logged rather than reported to the party.
    async fn escalate(&self, request: &RechargeRequest) {
        let caption = self.present().review_caption(request);
        let buttons = [
            Button::new(
                "✅ Approve",
                ButtonAction::Decide { request_id: request.id, decision: RechargeDecision::Approve }.to_string(),
            ),
            Button::new(
                "❌ Reject",
                ButtonAction::Decide { request_id: request.id, decision: RechargeDecision::Reject }.to_string(),
            ),
        ];
        let review_chat = self.settings.review_chat();
        let mut result = self.transport.send_photo(review_chat, &request.proof_file_id, &caption, &buttons).await;
        let operator_chat = ChatId::from(self.settings.operator);
        if let Err(e) = &result {
            if review_chat != operator_chat {
                warn!("💬️ Could not post recharge request #{} to chat {review_chat}. {e}", request.id);
                result = self.transport.send_photo(operator_chat, &request.proof_file_id, &caption, &buttons).await;
            }
        }
        match result {
            Ok(_) => debug!("💬️ Recharge request #{} sent for review", request.id),
            Err(e) => error!("💬️ Could not deliver recharge request #{} for review. It stays pending. {e}", request.id),
        }
    }

    //--------------------------------------          Buttons         ------------------------------------------------
    async fn handle_action(&self, action: &InboundAction) -> Result<(), TransportError> {
        match ButtonAction::parse(&action.data) {
            Some(ButtonAction::Amount(amount)) => {
                self.transport.answer_action(&action.id, "").await?;
                self.clear_action_buttons(action).await;
                self.submit_amount(action.sender, &amount.to_string()).await
            },
            Some(ButtonAction::Cancel) => {
                let text = if self.recharges.cancel(action.sender) { RECHARGE_CANCELLED } else { NO_RECHARGE };
                self.transport.answer_action(&action.id, text).await?;
                self.clear_action_buttons(action).await;
                Ok(())
            },
            Some(ButtonAction::Decide { request_id, decision }) => self.decide(action, request_id, decision).await,
            None => {
                debug!("💬️ Ignoring unknown button action '{}' from {}", action.data, action.sender);
                self.transport.answer_action(&action.id, "").await
            },
        }
    }

    async fn clear_action_buttons(&self, action: &InboundAction) {
        if let Some(message) = &action.message {
            if let Err(e) = self.transport.clear_buttons(message).await {
                debug!("💬️ Could not remove the buttons from message {}. {e}", message.message_id);
            }
        }
    }

    async fn decide(
        &self,
        action: &InboundAction,
        request_id: i64,
        decision: RechargeDecision,
    ) -> Result<(), TransportError> {
        let chat = action.chat.unwrap_or_else(|| ChatContext::private(action.sender));
        let role = match self.access.authorize(action.sender, &chat, Permission::DecideRecharge).await {
            Ok(role) => role,
            Err(AccessError::PersistenceUnavailable(e)) => {
                error!("💬️ Could not check the role of {}. {e}", action.sender);
                return self.transport.answer_action(&action.id, TRY_AGAIN_LATER).await;
            },
            Err(_) => return self.transport.answer_action(&action.id, NOT_AUTHORIZED).await,
        };
        match self.recharges.decide(request_id, decision, action.sender, role).await {
            Ok(request) => {
                let summary = self.present().decision_summary(&request);
                self.transport.answer_action(&action.id, &summary).await?;
                self.clear_action_buttons(action).await;
                if let Some(message) = &action.message {
                    self.transport.send_text(message.chat, &summary, &[]).await?;
                }
                self.notify_party(&request).await;
                Ok(())
            },
            Err(e @ RechargeError::AlreadyDecided { .. }) => {
                self.transport.answer_action(&action.id, &e.to_string()).await?;
                self.clear_action_buttons(action).await;
                Ok(())
            },
            Err(RechargeError::PersistenceUnavailable(e)) => {
                error!("💬️ Could not decide recharge request #{request_id}. {e}");
                self.transport.answer_action(&action.id, TRY_AGAIN_LATER).await
            },
            Err(e) => self.transport.answer_action(&action.id, &e.to_string()).await,
        }
    }

    async fn notify_party(&self, request: &RechargeRequest) {
        let balance = match request.status {
            ReviewStatus::Approved => self.accounts.balance(request.user_id).await.ok(),
            _ => None,
        };
        let text = self.present().decision_notice(request, balance);
        if let Err(e) = self.transport.send_text(request.user_id.into(), &text, &[]).await {
            warn!("💬️ Could not tell {} about recharge request #{}. {e}", request.user_id, request.id);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RoleChange {
    AddAdmin,
    RemoveAdmin,
    Whitelist,
    Unwhitelist,
}

impl RoleChange {
    fn command(&self) -> &'static str {
        match self {
            RoleChange::AddAdmin => "addadmin",
            RoleChange::RemoveAdmin => "deladmin",
            RoleChange::Whitelist => "whitelist",
            RoleChange::Unwhitelist => "unwhitelist",
        }
    }
}
