use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{Credits, NewRechargeRequest, RechargeRequest, ReviewStatus, Role, UserId},
    rse_api::{
        errors::RechargeError,
        recharge_sessions::{RechargeSession, RechargeSessions, RechargeStep},
    },
    traits::RechargeManagement,
};

/// Allowed deposit amounts (in whole credits) and how long a recharge conversation may stay idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RechargeConfig {
    pub denominations: Vec<u64>,
    pub session_ttl: Duration,
}

impl Default for RechargeConfig {
    fn default() -> Self {
        Self { denominations: vec![500, 1000, 2000, 5000, 10000], session_ttl: Duration::minutes(30) }
    }
}

/// The decision a reviewer makes on a recharge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechargeDecision {
    Approve,
    Reject,
}

impl From<RechargeDecision> for ReviewStatus {
    fn from(decision: RechargeDecision) -> Self {
        match decision {
            RechargeDecision::Approve => ReviewStatus::Approved,
            RechargeDecision::Reject => ReviewStatus::Rejected,
        }
    }
}

/// `RechargeApi` runs the deposit workflow: pick an amount, send proof of payment, wait for a human decision.
///
/// The conversation state is held in [`RechargeSessions`]; only escalated requests are persisted.
pub struct RechargeApi<B> {
    db: B,
    sessions: RechargeSessions,
    config: RechargeConfig,
}

impl<B> Debug for RechargeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RechargeApi ({} sessions)", self.sessions.len())
    }
}

impl<B> RechargeApi<B>
where B: RechargeManagement
{
    pub fn new(db: B, sessions: RechargeSessions, config: RechargeConfig) -> Self {
        Self { db, sessions, config }
    }

    pub fn sessions(&self) -> &RechargeSessions {
        &self.sessions
    }

    pub fn denominations(&self) -> &[u64] {
        &self.config.denominations
    }

    /// Opens (or restarts) the user's recharge conversation.
    pub fn start(&self, user: UserId) -> RechargeSession {
        let session = self.sessions.start(user, self.config.session_ttl);
        debug!("💳️ Recharge session #{} started for user {user}", session.generation);
        session
    }

    /// Returns `false` if the user had no recharge in progress.
    pub fn cancel(&self, user: UserId) -> bool {
        let cancelled = self.sessions.cancel(user);
        if cancelled {
            debug!("💳️ Recharge session for user {user} cancelled");
        }
        cancelled
    }

    pub fn current_step(&self, user: UserId) -> Option<RechargeStep> {
        self.sessions.view(user).map(|s| s.step)
    }

    /// Handles the user's reply while the session waits for an amount.
    ///
    /// An invalid amount leaves the session exactly as it was, so the user can simply try again.
    pub fn submit_amount(&self, user: UserId, text: &str) -> Result<Credits, RechargeError> {
        let session = self.sessions.view(user).ok_or(RechargeError::NoSession)?;
        if session.step != RechargeStep::AwaitingAmount {
            return Err(RechargeError::WrongStep);
        }
        let text = text.trim();
        let amount = text
            .parse::<u64>()
            .ok()
            .filter(|a| *a > 0 && self.config.denominations.contains(a))
            .and_then(|a| i64::try_from(a).ok())
            .map(Credits::from_whole)
            .ok_or_else(|| RechargeError::InvalidAmount(text.to_string()))?;
        if !self.sessions.advance(user, session.generation, RechargeStep::AwaitingProof { amount }) {
            return Err(RechargeError::SessionReplaced);
        }
        debug!("💳️ User {user} chose to recharge {amount}. Waiting for proof of payment");
        Ok(amount)
    }

    /// Handles the user's reply while the session waits for proof of payment. `proof_file_id` is the transport
    /// reference of the attached image, if there is one.
    ///
    /// On success the session is over and the request is stored as pending review. If the store fails, the session is
    /// put back so the user can send the proof again.
    pub async fn submit_proof(
        &self,
        user: UserId,
        proof_file_id: Option<&str>,
    ) -> Result<RechargeRequest, RechargeError> {
        let session = self.sessions.view(user).ok_or(RechargeError::NoSession)?;
        let amount = match session.step {
            RechargeStep::AwaitingProof { amount } => amount,
            RechargeStep::AwaitingAmount => return Err(RechargeError::WrongStep),
        };
        let proof_file_id = proof_file_id.filter(|f| !f.is_empty()).ok_or(RechargeError::ProofRequired)?;
        let session = self.sessions.take_if_current(user, session.generation).ok_or(RechargeError::SessionReplaced)?;
        let request = NewRechargeRequest { user_id: user, amount, proof_file_id: proof_file_id.to_string() };
        match self.db.insert_recharge_request(request).await {
            Ok(request) => {
                info!("💳️ Recharge request #{} for {amount} from user {user} is waiting for review", request.id);
                Ok(request)
            },
            Err(e) => {
                error!("💳️ Could not save the recharge request from user {user}. {e}");
                self.sessions.restore(user, session);
                Err(e.into())
            },
        }
    }

    /// Applies a reviewer's decision. Only the operator and admins may decide, and each request only once.
    pub async fn decide(
        &self,
        request_id: i64,
        decision: RechargeDecision,
        decided_by: UserId,
        role: Role,
    ) -> Result<RechargeRequest, RechargeError> {
        if !matches!(role, Role::Operator | Role::Admin) {
            warn!("💳️ {role} {decided_by} tried to decide recharge request #{request_id}");
            return Err(RechargeError::NotAuthorized);
        }
        let request = self.db.decide_recharge_request(request_id, decision.into(), decided_by).await?;
        info!(
            "💳️ Recharge request #{request_id} for {} from user {} {} by {decided_by}",
            request.amount, request.user_id, request.status
        );
        Ok(request)
    }

    pub async fn fetch_request(&self, request_id: i64) -> Result<RechargeRequest, RechargeError> {
        self.db.fetch_recharge_request(request_id).await?.ok_or(RechargeError::RequestNotFound(request_id))
    }

    pub fn purge_expired(&self) -> usize {
        self.sessions.purge_expired()
    }
}
