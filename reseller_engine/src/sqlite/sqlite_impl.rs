//! `SqliteDatabase` is a concrete implementation of a reseller engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{accounts, catalog, db_url, new_pool, orders, recharges, roles};
use crate::{
    db_types::{
        Credits,
        LedgerSummary,
        NewOrderRecord,
        NewRechargeRequest,
        OrderRecord,
        PartyAccount,
        Product,
        RechargeRequest,
        ReviewStatus,
        UserId,
    },
    traits::{
        AccountManagement,
        CatalogManagement,
        DebitResult,
        OrderManagement,
        RechargeManagement,
        RoleManagement,
        StoreError,
        StorefrontDatabase,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `RSB_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Connects to the database at `url`, creating the database file if it does not exist.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date using the migrations embedded in the binary.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn upsert_service_id(&self, key: &str, service_id: &str) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        let product = catalog::upsert_service_id(key, service_id, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn upsert_price(&self, key: &str, price_per_1000: Credits) -> Result<Product, StoreError> {
        let mut tx = self.pool.begin().await?;
        let product = catalog::upsert_price(key, price_per_1000, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn fetch_product(&self, key: &str) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_product(key, &mut conn).await
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_products(&mut conn).await
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_or_create_account(&self, user: UserId) -> Result<PartyAccount, StoreError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::fetch_or_create_account(user, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn fetch_account(&self, user: UserId) -> Result<Option<PartyAccount>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        accounts::fetch_account(user, &mut conn).await
    }

    async fn try_debit(&self, user: UserId, amount: Credits) -> Result<DebitResult, StoreError> {
        let mut conn = self.pool.acquire().await?;
        accounts::try_debit(user, amount, &mut conn).await
    }

    async fn credit(&self, user: UserId, amount: Credits) -> Result<PartyAccount, StoreError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::adjust_balance(user, amount, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn adjust_balance(&self, user: UserId, delta: Credits) -> Result<PartyAccount, StoreError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::adjust_balance(user, delta, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn set_whitelisted(&self, user: UserId, whitelisted: bool) -> Result<PartyAccount, StoreError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::set_whitelisted(user, whitelisted, &mut tx).await?;
        tx.commit().await?;
        Ok(account)
    }

    async fn ledger_summary(&self) -> Result<LedgerSummary, StoreError> {
        let mut conn = self.pool.acquire().await?;
        accounts::ledger_summary(&mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord, StoreError> {
        let mut tx = self.pool.begin().await?;
        let record = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(record)
    }

    async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<OrderRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user, &mut conn).await
    }

    async fn fetch_order_by_remote_id(&self, remote_order_id: &str) -> Result<Option<OrderRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_remote_id(remote_order_id, &mut conn).await
    }
}

impl RoleManagement for SqliteDatabase {
    async fn add_admin(&self, user: UserId) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        roles::add_admin(user, &mut conn).await
    }

    async fn remove_admin(&self, user: UserId) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        roles::remove_admin(user, &mut conn).await
    }

    async fn is_admin(&self, user: UserId) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        roles::is_admin(user, &mut conn).await
    }

    async fn fetch_admins(&self) -> Result<Vec<UserId>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        roles::fetch_admins(&mut conn).await
    }
}

impl RechargeManagement for SqliteDatabase {
    async fn insert_recharge_request(&self, request: NewRechargeRequest) -> Result<RechargeRequest, StoreError> {
        let mut tx = self.pool.begin().await?;
        let request = recharges::insert_recharge_request(request, &mut tx).await?;
        tx.commit().await?;
        Ok(request)
    }

    async fn fetch_recharge_request(&self, id: i64) -> Result<Option<RechargeRequest>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        recharges::fetch_recharge_request(id, &mut conn).await
    }

    /// Closes the request and, for approvals, credits the party, in a single atomic transaction.
    async fn decide_recharge_request(
        &self,
        id: i64,
        status: ReviewStatus,
        decided_by: UserId,
    ) -> Result<RechargeRequest, StoreError> {
        let mut tx = self.pool.begin().await?;
        let request = match recharges::close_recharge_request(id, status, decided_by, &mut tx).await? {
            Some(request) => request,
            None => {
                let existing = recharges::fetch_recharge_request(id, &mut tx).await?;
                return match existing {
                    Some(r) => Err(StoreError::AlreadyDecided { id, status: r.status }),
                    None => Err(StoreError::RequestNotFound(id)),
                };
            },
        };
        if status == ReviewStatus::Approved {
            let account = accounts::adjust_balance(request.user_id, request.amount, &mut tx).await?;
            debug!("🗃️ Recharge #{id} approved. User {} credited with {}", account.user_id, request.amount);
        }
        tx.commit().await?;
        Ok(request)
    }
}
