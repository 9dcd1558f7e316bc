//! In-process [`PortalStore`] used by tests and dry runs.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::portals::{NewPortal, PersistenceError, Portal, PortalId, PortalStore};
use crate::wizard::types::OwnerId;

/// Keeps portals in a vector; can be switched into a failing mode to
/// exercise persistence errors.
#[derive(Default)]
pub struct InMemoryPortalStore {
    portals: Mutex<Vec<Portal>>,
    failing: AtomicBool,
}

impl InMemoryPortalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with `Unavailable`.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of everything stored so far.
    pub fn all(&self) -> Vec<Portal> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Portal>> {
        match self.portals.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("store is in failing mode".to_string()));
        }
        Ok(())
    }

    fn update<F>(&self, id: PortalId, apply: F) -> Result<bool, PersistenceError>
    where
        F: FnOnce(&mut Portal),
    {
        self.check()?;
        let mut portals = self.lock();
        match portals.iter_mut().find(|p| p.id == id) {
            Some(portal) => {
                apply(portal);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl PortalStore for InMemoryPortalStore {
    async fn create_portal(&self, portal: NewPortal) -> Result<PortalId, PersistenceError> {
        self.check()?;
        let mut portals = self.lock();
        let id = PortalId(portals.len() as i64 + 1);
        portals.push(Portal {
            id,
            channel: portal.channel,
            group: portal.group,
            welcome_text: portal.welcome_text,
            created_by: portal.created_by,
            created_at: Utc::now(),
            active: true,
        });
        Ok(id)
    }

    async fn get_portal(&self, id: PortalId) -> Result<Option<Portal>, PersistenceError> {
        self.check()?;
        Ok(self.lock().iter().find(|p| p.id == id).cloned())
    }

    async fn portals_for_owner(&self, owner: OwnerId) -> Result<Vec<Portal>, PersistenceError> {
        self.check()?;
        Ok(self.lock().iter().filter(|p| p.created_by == owner).cloned().collect())
    }

    async fn update_welcome_text(&self, id: PortalId, welcome_text: Option<String>) -> Result<bool, PersistenceError> {
        self.update(id, |portal| portal.welcome_text = welcome_text)
    }

    async fn set_active(&self, id: PortalId, active: bool) -> Result<bool, PersistenceError> {
        self.update(id, |portal| portal.active = active)
    }
}
