use crate::{
    db_types::{Credits, LedgerSummary, PartyAccount, UserId},
    traits::StoreError,
};

/// The outcome of a conditional debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitResult {
    /// The amount was deducted. Contains the account after the deduction.
    Debited(PartyAccount),
    /// The balance did not cover the amount. Nothing was changed.
    Insufficient { available: Credits },
}

/// Party balances.
///
/// Accounts are created lazily with a zero balance the first time a party interacts with the bot, and are never
/// deleted.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the account for `user`, creating an empty one if it does not exist yet.
    async fn fetch_or_create_account(&self, user: UserId) -> Result<PartyAccount, StoreError>;

    async fn fetch_account(&self, user: UserId) -> Result<Option<PartyAccount>, StoreError>;

    /// Deducts `amount` from the account if, and only if, the balance covers it.
    ///
    /// The check and the deduction are a single statement, so two concurrent debits for the same party can never both
    /// be granted against the same balance. An account that does not exist yet is treated as having a zero balance.
    async fn try_debit(&self, user: UserId, amount: Credits) -> Result<DebitResult, StoreError>;

    /// Adds `amount` to the account, creating it if necessary. Used for approved recharges and refunds.
    async fn credit(&self, user: UserId, amount: Credits) -> Result<PartyAccount, StoreError>;

    /// A manual adjustment by the operator. `delta` may be negative, but may not take the balance below zero, in which
    /// case [`StoreError::WouldOverdraw`] is returned and nothing changes.
    async fn adjust_balance(&self, user: UserId, delta: Credits) -> Result<PartyAccount, StoreError>;

    /// Sets or clears the whitelist flag, creating the account if necessary.
    async fn set_whitelisted(&self, user: UserId, whitelisted: bool) -> Result<PartyAccount, StoreError>;

    /// The number of accounts and the sum of all local balances.
    async fn ledger_summary(&self) -> Result<LedgerSummary, StoreError>;
}
