use sqlx::SqliteConnection;

use crate::{db_types::UserId, traits::StoreError};

pub async fn add_admin(user: UserId, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let result = sqlx::query("INSERT INTO admins (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn remove_admin(user: UserId, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM admins WHERE user_id = $1").bind(user).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_admin(user: UserId, conn: &mut SqliteConnection) -> Result<bool, StoreError> {
    let found: Option<(i64,)> =
        sqlx::query_as("SELECT user_id FROM admins WHERE user_id = $1").bind(user).fetch_optional(conn).await?;
    Ok(found.is_some())
}

pub async fn fetch_admins(conn: &mut SqliteConnection) -> Result<Vec<UserId>, StoreError> {
    let admins: Vec<(UserId,)> = sqlx::query_as("SELECT user_id FROM admins ORDER BY user_id").fetch_all(conn).await?;
    Ok(admins.into_iter().map(|(id,)| id).collect())
}
