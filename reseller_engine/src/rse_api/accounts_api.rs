use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Credits, LedgerSummary, OrderRecord, PartyAccount, UserId},
    rse_api::errors::AccountApiError,
    traits::{AccountManagement, OrderManagement, RoleManagement},
};

/// `AccountApi` covers the party-facing side of the ledger, plus the operator's manual adjustments and role edits.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B>
where B: AccountManagement + RoleManagement + OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Makes sure the party has an account, and returns it.
    pub async fn touch(&self, user: UserId) -> Result<PartyAccount, AccountApiError> {
        Ok(self.db.fetch_or_create_account(user).await?)
    }

    /// The party's balance. Parties without an account have a zero balance.
    pub async fn balance(&self, user: UserId) -> Result<Credits, AccountApiError> {
        let account = self.db.fetch_account(user).await?;
        Ok(account.map(|a| a.balance).unwrap_or_default())
    }

    /// Manual ledger adjustment. Negative adjustments may not take the balance below zero.
    pub async fn adjust_balance(&self, user: UserId, delta: Credits) -> Result<PartyAccount, AccountApiError> {
        let account = self.db.adjust_balance(user, delta).await?;
        info!("💰️ Balance of user {user} adjusted by {delta}. New balance: {}", account.balance);
        Ok(account)
    }

    pub async fn set_whitelisted(&self, user: UserId, whitelisted: bool) -> Result<PartyAccount, AccountApiError> {
        let account = self.db.set_whitelisted(user, whitelisted).await?;
        info!("💰️ User {user} whitelisted: {whitelisted}");
        Ok(account)
    }

    pub async fn add_admin(&self, user: UserId) -> Result<bool, AccountApiError> {
        let added = self.db.add_admin(user).await?;
        if added {
            info!("💰️ User {user} is now an admin");
        }
        Ok(added)
    }

    pub async fn remove_admin(&self, user: UserId) -> Result<bool, AccountApiError> {
        let removed = self.db.remove_admin(user).await?;
        if removed {
            info!("💰️ User {user} is no longer an admin");
        }
        Ok(removed)
    }

    pub async fn admins(&self) -> Result<Vec<UserId>, AccountApiError> {
        Ok(self.db.fetch_admins().await?)
    }

    pub async fn ledger_summary(&self) -> Result<LedgerSummary, AccountApiError> {
        Ok(self.db.ledger_summary().await?)
    }

    pub async fn orders_for_user(&self, user: UserId) -> Result<Vec<OrderRecord>, AccountApiError> {
        Ok(self.db.fetch_orders_for_user(user).await?)
    }
}
