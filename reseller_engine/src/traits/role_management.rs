use crate::{db_types::UserId, traits::StoreError};

/// The persisted admin set. The operator is configured, and group authority is looked up per call, so neither is
/// stored here.
#[allow(async_fn_in_trait)]
pub trait RoleManagement {
    /// Returns `false` if the user was already an admin.
    async fn add_admin(&self, user: UserId) -> Result<bool, StoreError>;

    /// Returns `false` if the user was not an admin.
    async fn remove_admin(&self, user: UserId) -> Result<bool, StoreError>;

    async fn is_admin(&self, user: UserId) -> Result<bool, StoreError>;

    async fn fetch_admins(&self) -> Result<Vec<UserId>, StoreError>;
}
