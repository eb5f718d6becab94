use chrono::Duration;
use cucumber::World;
use log::*;
use reseller_engine::{
    db_types::{ChatContext, RechargeRequest, UserId},
    order_objects::{OrderReceipt, RefundPolicy},
    test_utils::{
        fakes::{FakeChatAuthority, FakeFulfillment},
        prepare_env::{create_database, random_db_path, run_migrations},
    },
    AccessApi,
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    OrderFlowError,
    RechargeApi,
    RechargeConfig,
    RechargeError,
    RechargeSessions,
    SqliteDatabase,
};
use reseller_engine::events::EventProducers;

pub const OPERATOR: UserId = UserId(1);

/// Maps the names used in the feature files to user ids.
pub fn user_id(name: &str) -> UserId {
    match name {
        "operator" => OPERATOR,
        "alice" => UserId(100),
        "bob" => UserId(200),
        "carol" => UserId(300),
        other => panic!("Unknown user in feature file: {other}"),
    }
}

#[derive(Default, Debug, World)]
pub struct StoreWorld {
    pub system: Option<StoreSystem>,
    pub last_order: Option<Result<OrderReceipt, OrderFlowError>>,
    pub last_recharge_error: Option<RechargeError>,
    pub last_request_id: Option<i64>,
    pub last_decision: Option<Result<RechargeRequest, RechargeError>>,
}

#[derive(Debug)]
pub struct StoreSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub fulfillment: FakeFulfillment,
    pub authority: FakeChatAuthority,
    pub sessions: RechargeSessions,
    pub refund_policy: RefundPolicy,
}

impl StoreWorld {
    pub fn system(&self) -> &StoreSystem {
        self.system.as_ref().expect("The store has not been initialised")
    }

    pub fn system_mut(&mut self) -> &mut StoreSystem {
        self.system.as_mut().expect("The store has not been initialised")
    }
}

impl StoreSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        create_database(&db_path).await;
        let db = run_migrations(&db_path).await;
        debug!("Created database: {db_path}");
        Self {
            db_path,
            db,
            fulfillment: FakeFulfillment::new(),
            authority: FakeChatAuthority::new(),
            sessions: RechargeSessions::new(),
            refund_policy: RefundPolicy::Never,
        }
    }

    pub fn catalog(&self) -> CatalogApi<SqliteDatabase> {
        CatalogApi::new(self.db.clone())
    }

    pub fn accounts(&self) -> AccountApi<SqliteDatabase> {
        AccountApi::new(self.db.clone())
    }

    pub fn order_flow(&self) -> OrderFlowApi<SqliteDatabase, FakeFulfillment> {
        OrderFlowApi::new(self.db.clone(), self.fulfillment.clone(), EventProducers::default(), OPERATOR)
            .with_refund_policy(self.refund_policy)
    }

    pub fn access(&self) -> AccessApi<SqliteDatabase, FakeChatAuthority> {
        AccessApi::new(self.db.clone(), self.authority.clone(), OPERATOR)
    }

    pub fn recharges(&self) -> RechargeApi<SqliteDatabase> {
        let config = RechargeConfig { denominations: vec![500, 1000, 2000, 5000], session_ttl: Duration::minutes(30) };
        RechargeApi::new(self.db.clone(), self.sessions.clone(), config)
    }

    pub fn private_chat(user: UserId) -> ChatContext {
        ChatContext::private(user)
    }
}
