use crate::{
    db_types::{NewRechargeRequest, RechargeRequest, ReviewStatus, UserId},
    traits::StoreError,
};

/// Recharge requests that have been escalated to human review.
#[allow(async_fn_in_trait)]
pub trait RechargeManagement {
    /// Stores a new request in the `Pending` state.
    async fn insert_recharge_request(&self, request: NewRechargeRequest) -> Result<RechargeRequest, StoreError>;

    async fn fetch_recharge_request(&self, id: i64) -> Result<Option<RechargeRequest>, StoreError>;

    /// Moves a pending request to `status` and records who decided it. If the request is approved, the party's account
    /// is credited with the request amount.
    ///
    /// The status change and the credit happen in one transaction. A request that is no longer pending is refused with
    /// [`StoreError::AlreadyDecided`] and nothing is credited.
    async fn decide_recharge_request(
        &self,
        id: i64,
        status: ReviewStatus,
        decided_by: UserId,
    ) -> Result<RechargeRequest, StoreError>;
}
