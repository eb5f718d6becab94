use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Credits, Product},
    rse_api::errors::CatalogApiError,
    traits::CatalogManagement,
};

/// `CatalogApi` manages the operator-defined product list.
///
/// Product names are matched case-insensitively. Every name passed in is reduced to its canonical key (trimmed and
/// lower-cased) before it reaches the store.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

/// The canonical catalog key for a product name.
pub fn product_key(name: &str) -> Result<String, CatalogApiError> {
    let key = name.trim().to_lowercase();
    if key.is_empty() {
        Err(CatalogApiError::EmptyName)
    } else {
        Ok(key)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Sets the fulfillment service id for `name`. Ids are opaque and are not checked with the fulfillment panel.
    pub async fn set_service_id(&self, name: &str, service_id: &str) -> Result<Product, CatalogApiError> {
        let key = product_key(name)?;
        let product = self.db.upsert_service_id(&key, service_id.trim()).await?;
        info!("🛍️ Product '{key}' now uses service id '{}'", service_id.trim());
        Ok(product)
    }

    pub async fn set_price(&self, name: &str, price_per_1000: Credits) -> Result<Product, CatalogApiError> {
        let key = product_key(name)?;
        if price_per_1000.is_negative() {
            return Err(CatalogApiError::NegativePrice);
        }
        let product = self.db.upsert_price(&key, price_per_1000).await?;
        info!("🛍️ Product '{key}' now costs {price_per_1000} per 1000");
        Ok(product)
    }

    pub async fn lookup(&self, name: &str) -> Result<Option<Product>, CatalogApiError> {
        let key = product_key(name)?;
        Ok(self.db.fetch_product(&key).await?)
    }

    /// Like [`Self::lookup`], but a missing product is an error.
    pub async fn product(&self, name: &str) -> Result<Product, CatalogApiError> {
        self.lookup(name).await?.ok_or_else(|| CatalogApiError::UnknownProduct(name.trim().to_string()))
    }

    /// All products, sorted by key.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogApiError> {
        Ok(self.db.fetch_products().await?)
    }
}
