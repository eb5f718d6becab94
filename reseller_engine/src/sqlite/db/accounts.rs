use log::{debug, trace};
use sqlx::SqliteConnection;

use super::{optional_row, single_row};
use crate::{
    db_types::{Credits, LedgerSummary, PartyAccount, UserId},
    traits::{DebitResult, StoreError},
};

pub async fn fetch_account(user: UserId, conn: &mut SqliteConnection) -> Result<Option<PartyAccount>, StoreError> {
    let account =
        sqlx::query_as("SELECT * FROM accounts WHERE user_id = $1").bind(user).fetch_optional(conn).await?;
    Ok(account)
}

pub async fn fetch_or_create_account(user: UserId, conn: &mut SqliteConnection) -> Result<PartyAccount, StoreError> {
    let inserted = sqlx::query("INSERT INTO accounts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user)
        .execute(&mut *conn)
        .await?;
    if inserted.rows_affected() > 0 {
        debug!("🗃️ Created a new account for user {user}");
    }
    fetch_account(user, conn).await?.ok_or(StoreError::AccountNotFound(user))
}

/// The conditional debit. The `WHERE balance >= $1` clause makes the check and the deduction one atomic step.
pub async fn try_debit(user: UserId, amount: Credits, conn: &mut SqliteConnection) -> Result<DebitResult, StoreError> {
    if amount.is_negative() {
        return Err(StoreError::NegativeDebit(amount));
    }
    let rows: Vec<PartyAccount> = sqlx::query_as(
        r#"
        UPDATE accounts SET balance = balance - $1, updated_at = CURRENT_TIMESTAMP
        WHERE user_id = $2 AND balance >= $1
        RETURNING *"#,
    )
    .bind(amount)
    .bind(user)
    .fetch_all(&mut *conn)
    .await?;
    match optional_row(rows) {
        Some(account) => {
            trace!("🗃️ Debited {amount} from user {user}. New balance: {}", account.balance);
            Ok(DebitResult::Debited(account))
        },
        None => {
            let available = fetch_account(user, conn).await?.map(|a| a.balance).unwrap_or_default();
            trace!("🗃️ Refused to debit {amount} from user {user}. Available: {available}");
            Ok(DebitResult::Insufficient { available })
        },
    }
}

/// Adds `delta` to the balance, creating the account if needed. Refuses to take the balance below zero.
pub async fn adjust_balance(
    user: UserId,
    delta: Credits,
    conn: &mut SqliteConnection,
) -> Result<PartyAccount, StoreError> {
    fetch_or_create_account(user, &mut *conn).await?;
    let rows: Vec<PartyAccount> = sqlx::query_as(
        r#"
        UPDATE accounts SET balance = balance + $1, updated_at = CURRENT_TIMESTAMP
        WHERE user_id = $2 AND balance + $1 >= 0
        RETURNING *"#,
    )
    .bind(delta)
    .bind(user)
    .fetch_all(conn)
    .await?;
    let account = optional_row(rows).ok_or(StoreError::WouldOverdraw { user })?;
    trace!("🗃️ Adjusted balance of user {user} by {delta}. New balance: {}", account.balance);
    Ok(account)
}

pub async fn set_whitelisted(
    user: UserId,
    whitelisted: bool,
    conn: &mut SqliteConnection,
) -> Result<PartyAccount, StoreError> {
    let rows: Vec<PartyAccount> = sqlx::query_as(
        r#"
        INSERT INTO accounts (user_id, whitelisted) VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET whitelisted = excluded.whitelisted, updated_at = CURRENT_TIMESTAMP
        RETURNING *"#,
    )
    .bind(user)
    .bind(whitelisted)
    .fetch_all(conn)
    .await?;
    debug!("🗃️ Whitelist flag for user {user} set to {whitelisted}");
    single_row(rows)
}

pub async fn ledger_summary(conn: &mut SqliteConnection) -> Result<LedgerSummary, StoreError> {
    let (accounts, total): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(balance), 0) FROM accounts").fetch_one(conn).await?;
    Ok(LedgerSummary { accounts, total_balance: Credits::from(total) })
}
