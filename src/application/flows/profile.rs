//! Dashboard and profile replies.
//!
//! Read-only views over the learner record, rendered as flex bubbles in
//! the chat. No session state.

use std::sync::Arc;

use crate::application::templates::{self, DashboardView};
use crate::domain::foundation::{DomainError, LineUserId};
use crate::domain::gamification::{points_for_next_level, progress_to_next_level};
use crate::ports::{
    OutboundMessage, SubmissionRepository, TaskRepository, UserRepository,
};

/// Handler for the dashboard and profile views.
pub struct ProfileFlow {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl ProfileFlow {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            users,
            tasks,
            submissions,
        }
    }

    /// Level, points, progress, and completion counts as a flex bubble.
    pub async fn show_dashboard(
        &self,
        user_id: &LineUserId,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let Some(user) = self.users.find(user_id).await? else {
            return Ok(vec![templates::please_register()]);
        };
        if !user.is_registered {
            return Ok(vec![templates::please_register()]);
        }

        let total_tasks = self.tasks.count().await?;
        let submission_count = self.submissions.count_for_user(user.id).await?;

        let view = DashboardView {
            thai_name: user.display_name().to_string(),
            level: user.current_level,
            points: user.total_points,
            progress_percent: progress_to_next_level(user.total_points, user.current_level),
            next_level_points: points_for_next_level(user.current_level),
            submission_count,
            total_tasks,
        };

        Ok(vec![templates::dashboard_flex(&view)])
    }

    /// The collected profile fields as a flex bubble.
    pub async fn show_profile(
        &self,
        user_id: &LineUserId,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let Some(user) = self.users.find(user_id).await? else {
            return Ok(vec![templates::please_register()]);
        };
        if !user.is_registered {
            return Ok(vec![templates::please_register()]);
        }

        Ok(vec![templates::profile_flex(&user)])
    }
}
