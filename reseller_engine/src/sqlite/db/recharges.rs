use log::debug;
use sqlx::SqliteConnection;

use super::{optional_row, single_row};
use crate::{
    db_types::{NewRechargeRequest, RechargeRequest, ReviewStatus, UserId},
    traits::StoreError,
};

pub async fn insert_recharge_request(
    request: NewRechargeRequest,
    conn: &mut SqliteConnection,
) -> Result<RechargeRequest, StoreError> {
    let rows: Vec<RechargeRequest> = sqlx::query_as(
        r#"
        INSERT INTO recharge_requests (user_id, amount, proof_file_id) VALUES ($1, $2, $3)
        RETURNING *"#,
    )
    .bind(request.user_id)
    .bind(request.amount)
    .bind(request.proof_file_id)
    .fetch_all(conn)
    .await?;
    let request = single_row(rows)?;
    debug!("🗃️ Recharge request #{} for {} saved for user {}", request.id, request.amount, request.user_id);
    Ok(request)
}

pub async fn fetch_recharge_request(id: i64, conn: &mut SqliteConnection) -> Result<Option<RechargeRequest>, StoreError> {
    let request =
        sqlx::query_as("SELECT * FROM recharge_requests WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(request)
}

/// Moves the request out of `Pending`. Returns `None` if the request is not pending (or does not exist).
pub async fn close_recharge_request(
    id: i64,
    status: ReviewStatus,
    decided_by: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<RechargeRequest>, StoreError> {
    let rows: Vec<RechargeRequest> = sqlx::query_as(
        r#"
        UPDATE recharge_requests SET status = $1, decided_by = $2, updated_at = CURRENT_TIMESTAMP
        WHERE id = $3 AND status = 'Pending'
        RETURNING *"#,
    )
    .bind(status)
    .bind(decided_by)
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(optional_row(rows))
}
