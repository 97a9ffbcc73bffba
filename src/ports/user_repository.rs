//! User Repository Port.
//!
//! All core state is mutated through point updates (single fields,
//! counter increments), never full-record overwrite, so concurrently
//! written fields are not lost.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LineUserId, UserId};
use crate::domain::gamification::UserStats;
use crate::domain::registration::{ProfileField, StepValue};
use crate::domain::user::User;

/// Port for reading and mutating learner records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Looks up a user by chat identity.
    async fn find(&self, line_user_id: &LineUserId) -> Result<Option<User>, DomainError>;

    /// Returns the user for a chat identity, creating an unregistered
    /// record on first contact.
    async fn get_or_create(&self, line_user_id: &LineUserId) -> Result<User, DomainError>;

    /// Writes one profile field collected by a registration step.
    async fn set_profile_field(
        &self,
        line_user_id: &LineUserId,
        field: ProfileField,
        value: &StepValue,
    ) -> Result<(), DomainError>;

    /// Flips the registered flag after the final wizard step.
    async fn mark_registered(&self, line_user_id: &LineUserId) -> Result<(), DomainError>;

    /// Adds `delta` to the user's cumulative points and returns the new
    /// total. The increment happens in the store (`points = points + n`).
    async fn add_points(&self, line_user_id: &LineUserId, delta: i64) -> Result<i64, DomainError>;

    /// Stores the derived level for a user.
    async fn set_level(&self, line_user_id: &LineUserId, level: i32) -> Result<(), DomainError>;

    /// Increments the practice-session counter (feeds the practice badge
    /// stat) and returns the new count.
    async fn record_practice(&self, line_user_id: &LineUserId) -> Result<i64, DomainError>;

    /// Loads the accumulated statistics badge checks run against.
    async fn load_stats(&self, user_id: UserId) -> Result<UserStats, DomainError>;
}
