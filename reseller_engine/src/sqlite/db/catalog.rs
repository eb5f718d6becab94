use log::trace;
use sqlx::SqliteConnection;

use super::single_row;
use crate::{
    db_types::{Credits, Product},
    traits::StoreError,
};

pub async fn upsert_service_id(key: &str, service_id: &str, conn: &mut SqliteConnection) -> Result<Product, StoreError> {
    trace!("🗃️ Setting service id for product '{key}'");
    let rows: Vec<Product> = sqlx::query_as(
        r#"
        INSERT INTO products (key, service_id) VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET service_id = excluded.service_id, updated_at = CURRENT_TIMESTAMP
        RETURNING *"#,
    )
    .bind(key)
    .bind(service_id)
    .fetch_all(conn)
    .await?;
    single_row(rows)
}

pub async fn upsert_price(key: &str, price: Credits, conn: &mut SqliteConnection) -> Result<Product, StoreError> {
    if price.is_negative() {
        return Err(StoreError::InvalidPrice);
    }
    trace!("🗃️ Setting price for product '{key}' to {price}");
    let rows: Vec<Product> = sqlx::query_as(
        r#"
        INSERT INTO products (key, price_per_1000) VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET price_per_1000 = excluded.price_per_1000, updated_at = CURRENT_TIMESTAMP
        RETURNING *"#,
    )
    .bind(key)
    .bind(price)
    .fetch_all(conn)
    .await?;
    single_row(rows)
}

pub async fn fetch_product(key: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, StoreError> {
    let product = sqlx::query_as("SELECT * FROM products WHERE key = $1").bind(key).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, StoreError> {
    let products = sqlx::query_as("SELECT * FROM products ORDER BY key ASC").fetch_all(conn).await?;
    Ok(products)
}
