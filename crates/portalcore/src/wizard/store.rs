//! Registry of live wizard sessions.
//!
//! Each session sits behind its own async mutex so messages from one user are
//! handled one at a time while different users proceed in parallel. Handles
//! are cloned out of the map before locking; no map guard is ever held
//! across an `.await`. The session lock itself is held across the
//! verification call, which is why it is a tokio mutex.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::session::{WizardSession, WizardStep};
use super::types::OwnerId;

/// Shared, lockable session.
pub type SessionHandle = Arc<Mutex<WizardSession>>;

/// A session removed by the expiry sweep; delivered to the user out of band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryNotice {
    pub owner_id: OwnerId,
    /// Step the session was on when it expired
    pub step: WizardStep,
    pub last_activity_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<OwnerId, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner_id: OwnerId) -> Option<SessionHandle> {
        self.sessions.get(&owner_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, owner_id: OwnerId) -> bool {
        self.sessions.contains_key(&owner_id)
    }

    /// Stores `session` under its owner, replacing any previous one.
    /// Returns the new handle and the replaced one.
    pub fn put(&self, session: WizardSession) -> (SessionHandle, Option<SessionHandle>) {
        let owner_id = session.owner_id();
        let handle = Arc::new(Mutex::new(session));
        let previous = self.sessions.insert(owner_id, Arc::clone(&handle));
        (handle, previous)
    }

    pub fn remove(&self, owner_id: OwnerId) -> Option<SessionHandle> {
        self.sessions.remove(&owner_id).map(|(_, handle)| handle)
    }

    /// Removes the owner's entry only if it is still `handle`.
    pub fn remove_if_current(&self, owner_id: OwnerId, handle: &SessionHandle) -> bool {
        self.sessions
            .remove_if(&owner_id, |_, current| Arc::ptr_eq(current, handle))
            .is_some()
    }

    /// Whether `handle` is still the session registered for `owner_id`.
    pub fn is_current(&self, owner_id: OwnerId, handle: &SessionHandle) -> bool {
        self.sessions
            .get(&owner_id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), handle))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Aborts and removes every session idle for longer than `timeout`.
    ///
    /// Sessions whose lock is currently held are being worked on and are
    /// skipped for this pass.
    pub fn sweep(&self, now: DateTime<Utc>, timeout: std::time::Duration) -> Vec<ExpiryNotice> {
        let timeout = chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX);

        let candidates: Vec<(OwnerId, SessionHandle)> = self
            .sessions
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut notices = Vec::new();
        for (owner_id, handle) in candidates {
            let Ok(mut session) = handle.try_lock() else {
                continue;
            };
            if !session.is_expired(now, timeout) {
                continue;
            }

            let step = session.step();
            let last_activity_at = session.last_activity_at();
            session.abort();
            drop(session);

            if self.remove_if_current(owner_id, &handle) {
                log::info!(
                    "Wizard session of user {} expired at step {} (idle since {})",
                    owner_id,
                    step,
                    last_activity_at
                );
                if !step.is_terminal() {
                    notices.push(ExpiryNotice {
                        owner_id,
                        step,
                        last_activity_at,
                    });
                }
            }
        }

        notices
    }
}
