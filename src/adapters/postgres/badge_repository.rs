//! PostgreSQL adapter for the badge repository.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::gamification::BadgeKind;
use crate::ports::BadgeRepository;

/// Badge repository backed by the `user_badges` join table.
pub struct PgBadgeRepository {
    pool: PgPool,
}

impl PgBadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BadgeRepository for PgBadgeRepository {
    async fn earned(&self, user_id: UserId) -> Result<HashSet<BadgeKind>, DomainError> {
        let tags: Vec<String> =
            sqlx::query_scalar("SELECT badge_type FROM user_badges WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::database(e.to_string()))?;

        let mut earned = HashSet::new();
        for tag in tags {
            match BadgeKind::parse(&tag) {
                Some(kind) => {
                    earned.insert(kind);
                }
                None => {
                    // A retired badge type; ignore rather than fail the check.
                    tracing::warn!(badge = %tag, "unknown badge type in user_badges");
                }
            }
        }
        Ok(earned)
    }

    async fn award(&self, user_id: UserId, badge: BadgeKind) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_type, earned_at)
            VALUES ($1, $2, now())
            ON CONFLICT (user_id, badge_type) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(badge.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(())
    }
}
