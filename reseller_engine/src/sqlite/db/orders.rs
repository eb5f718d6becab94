use log::trace;
use sqlx::SqliteConnection;

use super::single_row;
use crate::{
    db_types::{NewOrderRecord, OrderRecord, UserId},
    traits::StoreError,
};

pub async fn insert_order(order: NewOrderRecord, conn: &mut SqliteConnection) -> Result<OrderRecord, StoreError> {
    let quantity = i64::try_from(order.quantity).unwrap_or(i64::MAX);
    let rows: Vec<OrderRecord> = sqlx::query_as(
        r#"
        INSERT INTO orders (user_id, product_key, quantity, cost, link, remote_order_id, refunded)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *"#,
    )
    .bind(order.user_id)
    .bind(order.product_key)
    .bind(quantity)
    .bind(order.cost)
    .bind(order.link)
    .bind(order.remote_order_id)
    .bind(order.refunded)
    .fetch_all(conn)
    .await?;
    let record = single_row(rows)?;
    trace!("🗃️ Order record #{} saved for user {}", record.id, record.user_id);
    Ok(record)
}

pub async fn fetch_orders_for_user(user: UserId, conn: &mut SqliteConnection) -> Result<Vec<OrderRecord>, StoreError> {
    let orders =
        sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY id ASC").bind(user).fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_order_by_remote_id(
    remote_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderRecord>, StoreError> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE remote_order_id = $1 ORDER BY id DESC LIMIT 1")
        .bind(remote_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}
