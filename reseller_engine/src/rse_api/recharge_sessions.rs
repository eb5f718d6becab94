//! Per-party recharge conversations.
//!
//! A session lives in memory only, from `/recharge` until it is cancelled, escalated or expires. Every session gets a
//! fresh generation number, so a continuation that was started against one session can tell when it has been replaced
//! by another.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
        RwLock,
        RwLockWriteGuard,
    },
};

use chrono::{DateTime, Duration, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::db_types::{Credits, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RechargeStep {
    AwaitingAmount,
    AwaitingProof { amount: Credits },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeSession {
    pub generation: u64,
    pub step: RechargeStep,
    pub expires_at: DateTime<Utc>,
}

impl RechargeSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Default)]
pub struct RechargeSessions {
    sessions: Arc<RwLock<HashMap<UserId, RechargeSession>>>,
    generations: Arc<AtomicU64>,
}

impl RechargeSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write access to the session map, recovering it if a writer panicked.
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, RechargeSession>> {
        self.sessions.write().unwrap_or_else(|e| {
            error!("💳️ Recharge session lock was poisoned. Recovering the session map. {e}");
            e.into_inner()
        })
    }

    /// Starts a new session for `user` in [`RechargeStep::AwaitingAmount`], replacing any existing one.
    pub fn start(&self, user: UserId, ttl: Duration) -> RechargeSession {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let session = RechargeSession { generation, step: RechargeStep::AwaitingAmount, expires_at: Utc::now() + ttl };
        self.write().insert(user, session);
        session
    }

    /// Removes the user's session. Returns `false` if there was no live session to cancel.
    pub fn cancel(&self, user: UserId) -> bool {
        let removed = self.write().remove(&user);
        removed.is_some_and(|s| !s.is_expired_at(Utc::now()))
    }

    /// The user's live session. Expired sessions are removed and reported as absent.
    pub fn view(&self, user: UserId) -> Option<RechargeSession> {
        let mut sessions = self.write();
        match sessions.get(&user) {
            Some(s) if s.is_expired_at(Utc::now()) => {
                sessions.remove(&user);
                None
            },
            other => other.copied(),
        }
    }

    /// Moves the session to `step`, but only if it is still the session with the given generation.
    pub fn advance(&self, user: UserId, generation: u64, step: RechargeStep) -> bool {
        let mut sessions = self.write();
        match sessions.get_mut(&user) {
            Some(s) if s.generation == generation && !s.is_expired_at(Utc::now()) => {
                s.step = step;
                true
            },
            _ => false,
        }
    }

    /// Removes and returns the session, but only if it is still the one with the given generation.
    pub fn take_if_current(&self, user: UserId, generation: u64) -> Option<RechargeSession> {
        let mut sessions = self.write();
        match sessions.get(&user) {
            Some(s) if s.generation == generation && !s.is_expired_at(Utc::now()) => sessions.remove(&user),
            _ => None,
        }
    }

    /// Puts a taken session back, unless the user has started a new one in the meantime.
    pub fn restore(&self, user: UserId, session: RechargeSession) -> bool {
        let mut sessions = self.write();
        if sessions.contains_key(&user) {
            return false;
        }
        sessions.insert(user, session);
        true
    }

    /// Drops every session that expired before `now`. Returns the number removed.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        before - sessions.len()
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    /// Number of stored sessions, including expired ones that have not been purged yet.
    pub fn len(&self) -> usize {
        match self.sessions.read() {
            Ok(sessions) => sessions.len(),
            Err(e) => e.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
