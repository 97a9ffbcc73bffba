//! Badge awarding after point-earning actions.
//!
//! Runs the badge threshold check against fresh statistics, persists any
//! newly earned badges, and notifies the learner. Notifications go over
//! the push channel: the triggering event's reply token is already spent
//! on the main report message.

use std::sync::Arc;

use crate::application::templates;
use crate::domain::foundation::{DomainError, LineUserId, UserId};
use crate::domain::gamification::{badges::badge_spec, check_earned_badges, BadgeKind};
use crate::ports::{BadgeRepository, MessagingGateway, UserRepository};

/// Checks and awards badges for a user.
pub struct BadgeAwarder {
    users: Arc<dyn UserRepository>,
    badges: Arc<dyn BadgeRepository>,
    gateway: Arc<dyn MessagingGateway>,
}

impl BadgeAwarder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        badges: Arc<dyn BadgeRepository>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            users,
            badges,
            gateway,
        }
    }

    /// Awards every badge the user's current statistics qualify for and
    /// does not already hold. Returns the newly awarded kinds.
    ///
    /// Each badge is persisted before its notification is pushed, so a
    /// failed push never re-awards on the next check. Push failures are
    /// logged and swallowed.
    pub async fn check_and_award(
        &self,
        user_id: UserId,
        line_user_id: &LineUserId,
    ) -> Result<Vec<BadgeKind>, DomainError> {
        let stats = self.users.load_stats(user_id).await?;
        let earned = self.badges.earned(user_id).await?;
        let new_badges = check_earned_badges(&stats, &earned);

        for kind in &new_badges {
            self.badges.award(user_id, *kind).await?;
            let spec = badge_spec(*kind);
            tracing::info!(user = %line_user_id, badge = spec.kind.as_str(), "badge earned");

            if let Err(err) = self
                .gateway
                .push(line_user_id, vec![templates::badge_earned(spec)])
                .await
            {
                tracing::warn!(
                    user = %line_user_id,
                    badge = spec.kind.as_str(),
                    error = %err,
                    "failed to push badge notification"
                );
            }
        }

        Ok(new_badges)
    }
}
