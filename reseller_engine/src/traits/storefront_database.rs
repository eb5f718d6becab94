use crate::traits::{AccountManagement, CatalogManagement, OrderManagement, RechargeManagement, RoleManagement};

/// The highest level of behaviour for storage backends. A `StorefrontDatabase` can back every API in the engine.
pub trait StorefrontDatabase:
    Clone + CatalogManagement + AccountManagement + OrderManagement + RoleManagement + RechargeManagement
{
    /// The URL of the database
    fn url(&self) -> &str;
}
