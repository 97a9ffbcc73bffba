//! In-process session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::foundation::LineUserId;
use crate::domain::session::Session;
use crate::ports::SessionStore;

/// Session store backed by a process-local map.
///
/// Entries idle longer than `ttl` read as absent, which is the flow
/// abandonment policy: a learner who walked away mid-wizard starts fresh.
/// Expired entries are also dropped eagerly on every write so the map does
/// not grow with one-contact users.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<LineUserId, Session>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    /// Creates a store with the given idle TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of live (unexpired) sessions, for tests and diagnostics.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        let ttl_secs = self.ttl.as_secs();
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| !session.is_expired(now, ttl_secs))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: &LineUserId) -> Session {
        let now = Utc::now();
        let sessions = self.sessions.read().await;
        match sessions.get(user) {
            Some(session) if !session.is_expired(now, self.ttl.as_secs()) => session.clone(),
            _ => Session::idle(now),
        }
    }

    async fn put(&self, user: &LineUserId, session: Session) {
        let now = Utc::now();
        let ttl_secs = self.ttl.as_secs();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| !existing.is_expired(now, ttl_secs));
        sessions.insert(user.clone(), session);
    }

    async fn clear(&self, user: &LineUserId) {
        self.sessions.write().await.remove(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Flow;
    use chrono::Duration as ChronoDuration;

    fn user(raw: &str) -> LineUserId {
        LineUserId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_never_fails_for_unseen_users() {
        let store = InMemorySessionStore::new(Duration::from_secs(1800));
        let session = store.get(&user("U-never-seen")).await;
        assert!(session.is_idle());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemorySessionStore::new(Duration::from_secs(1800));
        let id = user("U1");
        let session = Session::with_flow(
            Flow::Registering { step: 2, edit_only: false },
            Utc::now(),
        );

        store.put(&id, session.clone()).await;
        assert_eq!(store.get(&id).await.flow, session.flow);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = InMemorySessionStore::new(Duration::from_secs(1800));
        let id = user("U1");

        store.clear(&id).await;
        store
            .put(&id, Session::with_flow(Flow::AwaitingFeedbackDraft, Utc::now()))
            .await;
        store.clear(&id).await;
        store.clear(&id).await;

        assert!(store.get(&id).await.is_idle());
    }

    #[tokio::test]
    async fn expired_sessions_read_as_absent() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let id = user("U1");
        let stale = Session::with_flow(
            Flow::AwaitingFeedbackDraft,
            Utc::now() - ChronoDuration::seconds(120),
        );

        store.put(&id, stale).await;

        assert!(store.get(&id).await.is_idle());
    }

    #[tokio::test]
    async fn writes_drop_other_users_expired_entries() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        let stale = Session::with_flow(
            Flow::AwaitingFeedbackDraft,
            Utc::now() - ChronoDuration::seconds(120),
        );
        store.put(&user("U-stale"), stale).await;

        store
            .put(&user("U-live"), Session::idle(Utc::now()))
            .await;

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = InMemorySessionStore::new(Duration::from_secs(1800));
        store
            .put(
                &user("U1"),
                Session::with_flow(Flow::AwaitingFeedbackDraft, Utc::now()),
            )
            .await;

        assert!(store.get(&user("U2")).await.is_idle());
        assert!(!store.get(&user("U1")).await.is_idle());
    }
}
