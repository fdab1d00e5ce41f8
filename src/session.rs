//! Per-customer session storage
//!
//! Each user id maps to its own lock slot. Holding a [`SessionGuard`] gives
//! exclusive access to one user's session for a whole read-modify-write turn,
//! while other users proceed in parallel.
//!
//! `Initial` is stored as an empty slot: putting an `Initial` session and
//! deleting the session are the same operation, and reading an empty slot
//! yields a fresh `Initial` session. A slot left empty by a turn is dropped
//! from the map once no other turn is waiting on it, so ids that never get
//! past `Initial` cost nothing after their turn ends.

use crate::state_machine::Session;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

type Slot = Arc<Mutex<Option<Session>>>;

/// Map from user id to that user's session
#[derive(Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<String, Slot>>,
}

/// Exclusive access to one user's session until dropped
pub struct SessionGuard {
    user_id: String,
    guard: OwnedMutexGuard<Option<Session>>,
}

impl SessionGuard {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Current session, or a fresh `Initial` one if none is stored
    pub fn session(&self) -> Session {
        (*self.guard)
            .clone()
            .unwrap_or_else(|| Session::new(self.user_id.as_str()))
    }

    pub fn put(&mut self, session: Session) {
        *self.guard = if session.is_initial() {
            None
        } else {
            Some(session)
        };
    }

    pub fn delete(&mut self) {
        *self.guard = None;
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock slot for a user, created on first use
    async fn slot(&self, user_id: &str) -> Slot {
        // Fast path: slot already exists
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(user_id) {
                return Arc::clone(slot);
            }
        }

        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(user_id.to_string()).or_default())
    }

    /// Wait for exclusive access to a user's session.
    ///
    /// Hand the guard back through [`SessionStore::release`] so an empty slot
    /// can be reclaimed.
    pub async fn lock(&self, user_id: &str) -> SessionGuard {
        let slot = self.slot(user_id).await;
        SessionGuard {
            user_id: user_id.to_string(),
            guard: slot.lock_owned().await,
        }
    }

    /// Like [`SessionStore::lock`], but never allocates a slot for an unknown
    /// user
    pub async fn lock_existing(&self, user_id: &str) -> Option<SessionGuard> {
        let slot = self.slots.read().await.get(user_id).map(Arc::clone)?;
        Some(SessionGuard {
            user_id: user_id.to_string(),
            guard: slot.lock_owned().await,
        })
    }

    /// End a turn. An empty slot nobody else holds or waits on is removed.
    pub async fn release(&self, guard: SessionGuard) {
        let SessionGuard { user_id, guard } = guard;
        let empty = guard.is_none();
        drop(guard);
        if !empty {
            return;
        }

        let mut slots = self.slots.write().await;
        // Under the write lock no new clone of the slot can be taken, so a
        // count of one means the map holds the only reference.
        let idle = slots.get(&user_id).is_some_and(|slot| {
            Arc::strong_count(slot) == 1 && slot.try_lock().is_ok_and(|s| s.is_none())
        });
        if idle {
            slots.remove(&user_id);
        }
    }

    /// Snapshot of a user's session, `Initial` if absent
    #[allow(dead_code)] // API completeness
    pub async fn get_or_create(&self, user_id: &str) -> Session {
        let guard = self.lock(user_id).await;
        let session = guard.session();
        self.release(guard).await;
        session
    }

    #[allow(dead_code)] // API completeness
    pub async fn put(&self, user_id: &str, session: Session) {
        let mut guard = self.lock(user_id).await;
        guard.put(session);
        self.release(guard).await;
    }

    #[allow(dead_code)] // API completeness
    pub async fn delete(&self, user_id: &str) {
        let mut guard = self.lock(user_id).await;
        guard.delete();
        self.release(guard).await;
    }

    /// Number of users with a lock slot, idle or not
    #[cfg(test)]
    pub async fn slot_count(&self) -> usize {
        self.slots.read().await.len()
    }

    /// Number of users with a flow in progress. A slot locked by a running
    /// turn counts as active.
    pub async fn active_sessions(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| !matches!(slot.try_lock(), Ok(session) if session.is_none()))
            .count()
    }
}
