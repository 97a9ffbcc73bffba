//! Redis-backed session store for multi-instance deployments.
//!
//! Sessions serialize to JSON under `session:<user>` keys with the idle
//! TTL applied by Redis itself (`SET ... EX`), so abandoned flows expire
//! without a sweeper.
//!
//! Backend failures never surface to the conversation: `get` degrades to
//! a fresh idle session and `put`/`clear` log and drop the write, which
//! at worst restarts the learner's current flow.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::domain::foundation::LineUserId;
use crate::domain::session::Session;
use crate::ports::SessionStore;

/// Session store backed by a shared Redis instance.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisSessionStore {
    /// Connects to Redis at `url` with the given idle TTL.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn, ttl })
    }

    /// Wraps an existing connection (tests, shared pools).
    pub fn new(conn: MultiplexedConnection, ttl: Duration) -> Self {
        Self { conn, ttl }
    }

    fn key(user: &LineUserId) -> String {
        format!("session:{}", user.as_str())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, user: &LineUserId) -> Session {
        let mut conn = self.conn.clone();
        let value: Result<Option<String>, redis::RedisError> = redis::cmd("GET")
            .arg(Self::key(user))
            .query_async(&mut conn)
            .await;

        match value {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(session) => session,
                Err(err) => {
                    tracing::warn!(user = %user, error = %err, "corrupt session record, resetting");
                    Session::idle(chrono::Utc::now())
                }
            },
            Ok(None) => Session::idle(chrono::Utc::now()),
            Err(err) => {
                tracing::error!(user = %user, error = %err, "session read failed, degrading to idle");
                Session::idle(chrono::Utc::now())
            }
        }
    }

    async fn put(&self, user: &LineUserId, session: Session) {
        let json = match serde_json::to_string(&session) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(user = %user, error = %err, "session serialize failed");
                return;
            }
        };

        let mut conn = self.conn.clone();
        let result: Result<(), redis::RedisError> = redis::cmd("SET")
            .arg(Self::key(user))
            .arg(json)
            .arg("EX")
            .arg(self.ttl.as_secs())
            .query_async(&mut conn)
            .await;

        if let Err(err) = result {
            tracing::error!(user = %user, error = %err, "session write failed");
        }
    }

    async fn clear(&self, user: &LineUserId) {
        let mut conn = self.conn.clone();
        let result: Result<(), redis::RedisError> = redis::cmd("DEL")
            .arg(Self::key(user))
            .query_async(&mut conn)
            .await;

        if let Err(err) = result {
            tracing::error!(user = %user, error = %err, "session delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_by_user() {
        let user = LineUserId::new("U42").unwrap();
        assert_eq!(RedisSessionStore::key(&user), "session:U42");
    }
}
