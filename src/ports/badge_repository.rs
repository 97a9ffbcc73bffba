//! Badge Repository Port.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::gamification::BadgeKind;

/// Port for the user-badge join rows.
#[async_trait]
pub trait BadgeRepository: Send + Sync {
    /// The set of badges a user already holds.
    async fn earned(&self, user_id: UserId) -> Result<HashSet<BadgeKind>, DomainError>;

    /// Awards a badge. Awarding an already-held badge is a no-op.
    async fn award(&self, user_id: UserId, badge: BadgeKind) -> Result<(), DomainError>;
}
