//! In-memory session store with absolute expiry
//!
//! Sessions are keyed per cookie-carried [`SessionId`]. Concurrent requests
//! on the same session race read-then-write; last-writer-wins is accepted
//! since a session belongs to a single user.

use crate::session::{Session, SessionId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

struct SessionEntry {
    session: Session,
    /// Expiry is absolute from creation, independent of activity
    deadline: DateTime<Utc>,
}

/// Server-side session map with a fixed absolute lifetime per entry.
pub struct SessionStore {
    entries: RwLock<HashMap<SessionId, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store with the standard 24-hour session lifetime.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(24))
    }

    /// Create a store with a custom lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create an empty session and return its identifier.
    pub async fn create(&self) -> SessionId {
        let id = SessionId::new();
        let entry = SessionEntry {
            session: Session::default(),
            deadline: Utc::now() + self.ttl,
        };
        self.entries.write().await.insert(id, entry);
        debug!(session_id = %id, "Created session");
        id
    }

    /// Resolve a live session. Entries past their deadline are removed and
    /// read as absent, so an expired cookie behaves exactly like no cookie.
    pub async fn get(&self, id: SessionId) -> Option<Session> {
        let mut entries = self.entries.write().await;
        match entries.get(&id) {
            Some(entry) if entry.deadline > Utc::now() => Some(entry.session.clone()),
            Some(_) => {
                entries.remove(&id);
                debug!(session_id = %id, "Session reached absolute expiry");
                None
            }
            None => None,
        }
    }

    /// Write a session's state. A live entry keeps its original deadline;
    /// expiry is absolute, not sliding. An unknown or expired id gets a
    /// fresh entry with a new deadline: re-authenticating on an old cookie
    /// starts a new session window under the same identifier.
    pub async fn put(&self, id: SessionId, session: Session) {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&id) {
            Some(entry) if entry.deadline > Utc::now() => entry.session = session,
            _ => {
                entries.insert(
                    id,
                    SessionEntry {
                        session,
                        deadline: Utc::now() + self.ttl,
                    },
                );
            }
        }
    }

    /// Invalidate a session immediately.
    pub async fn destroy(&self, id: SessionId) {
        if self.entries.write().await.remove(&id).is_some() {
            info!(session_id = %id, "Destroyed session");
        }
    }

    /// Drop every expired entry. Housekeeping for long-lived processes; the
    /// read path already treats expired entries as absent.
    pub async fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.deadline > now);
        before - entries.len()
    }

    /// Number of live entries (including not-yet-pruned expired ones).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();
        let id = store.create().await;

        let session = store.get(id).await.expect("session should exist");
        assert!(!session.authenticated);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let store = SessionStore::new();
        assert!(store.get(SessionId::new()).await.is_none());
    }

    #[tokio::test]
    async fn test_put_updates_state() {
        let store = SessionStore::new();
        let id = store.create().await;

        let mut session = store.get(id).await.unwrap();
        session.authenticated = true;
        store.put(id, session).await;

        assert!(store.get(id).await.unwrap().authenticated);
    }

    #[tokio::test]
    async fn test_put_to_unknown_id_creates_entry() {
        let store = SessionStore::new();
        let id = SessionId::new();

        store.put(id, Session::default()).await;
        assert!(store.get(id).await.is_some());
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = SessionStore::new();
        let id = store.create().await;

        store.destroy(id).await;
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_absolute_expiry() {
        let store = SessionStore::with_ttl(Duration::zero());
        let id = store.create().await;

        // Already past its deadline; must read as absent
        assert!(store.get(id).await.is_none());
        // And the entry is gone
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let store = SessionStore::with_ttl(Duration::zero());
        store.create().await;
        store.create().await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.prune_expired().await, 2);
        assert!(store.is_empty().await);
    }
}
