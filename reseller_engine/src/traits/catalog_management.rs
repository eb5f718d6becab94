use crate::{
    db_types::{Credits, Product},
    traits::StoreError,
};

/// Product definitions. Products are never deleted; every write is an idempotent overwrite of one attribute.
///
/// Keys passed to these methods are expected to be canonical already (trimmed and lower-cased). Callers should go
/// through [`crate::CatalogApi`], which takes care of that.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Sets the fulfillment service id for the product, creating it with a zero price if it does not exist.
    async fn upsert_service_id(&self, key: &str, service_id: &str) -> Result<Product, StoreError>;

    /// Sets the price per 1000 units for the product, creating it without a service id if it does not exist.
    /// Negative prices are refused with [`StoreError::InvalidPrice`].
    async fn upsert_price(&self, key: &str, price_per_1000: Credits) -> Result<Product, StoreError>;

    async fn fetch_product(&self, key: &str) -> Result<Option<Product>, StoreError>;

    /// All products, sorted by key.
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError>;
}
