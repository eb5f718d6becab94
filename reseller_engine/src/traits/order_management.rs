use crate::{
    db_types::{NewOrderRecord, OrderRecord, UserId},
    traits::StoreError,
};

/// The append-only order log. Every parsed line item produces exactly one record, whether or not the fulfillment
/// panel accepted it.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord, StoreError>;

    /// All orders for the user, oldest first.
    async fn fetch_orders_for_user(&self, user: UserId) -> Result<Vec<OrderRecord>, StoreError>;

    async fn fetch_order_by_remote_id(&self, remote_order_id: &str) -> Result<Option<OrderRecord>, StoreError>;
}
