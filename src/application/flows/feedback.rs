//! Draft feedback flow.
//!
//! A registered learner asks for feedback, sends a draft, and gets the
//! rubric report back in the same conversation turn. The grading call is
//! synchronous; the evaluator port guarantees a usable result even when
//! the external model fails.
//!
//! The persist -> award -> clear sequence is not transactional; see the
//! controller docs for the accepted failure window.

use std::sync::Arc;

use chrono::Utc;

use crate::application::badges::BadgeAwarder;
use crate::application::templates;
use crate::domain::coursework::NewFeedbackRequest;
use crate::domain::evaluation::RubricContext;
use crate::domain::foundation::{DomainError, LineUserId};
use crate::domain::gamification::{calculate_level, points};
use crate::domain::session::{Flow, Session};
use crate::ports::{
    FeedbackRepository, OutboundMessage, SessionStore, TaskRepository, UserRepository,
    WritingEvaluator,
};

/// Handler for the feedback-request flow.
pub struct FeedbackFlow {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    feedback: Arc<dyn FeedbackRepository>,
    evaluator: Arc<dyn WritingEvaluator>,
    sessions: Arc<dyn SessionStore>,
    awarder: Arc<BadgeAwarder>,
}

impl FeedbackFlow {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        feedback: Arc<dyn FeedbackRepository>,
        evaluator: Arc<dyn WritingEvaluator>,
        sessions: Arc<dyn SessionStore>,
        awarder: Arc<BadgeAwarder>,
    ) -> Self {
        Self {
            users,
            tasks,
            feedback,
            evaluator,
            sessions,
            awarder,
        }
    }

    /// Enters the awaiting-draft state for a registered learner.
    pub async fn start(&self, user_id: &LineUserId) -> Result<Vec<OutboundMessage>, DomainError> {
        let Some(user) = self.users.find(user_id).await? else {
            return Ok(vec![templates::please_register()]);
        };
        if !user.is_registered {
            return Ok(vec![templates::please_register()]);
        }

        self.sessions
            .put(
                user_id,
                Session::with_flow(Flow::AwaitingFeedbackDraft, Utc::now()),
            )
            .await;

        Ok(vec![templates::feedback_prompt(user.display_name())])
    }

    /// Grades the draft, records the request, awards points, and reports.
    pub async fn submit_draft(
        &self,
        user_id: &LineUserId,
        draft: &str,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let Some(user) = self.users.find(user_id).await? else {
            self.sessions.clear(user_id).await;
            return Ok(vec![templates::generic_error()]);
        };

        let active_task = self.tasks.active().await?;
        let context = RubricContext::draft(active_task.as_ref().map(|t| t.description.clone()));
        let feedback = self.evaluator.evaluate(draft, &context).await;

        let request = NewFeedbackRequest {
            user_id: user.id,
            task_id: active_task.map(|t| t.id),
            draft_content: draft.to_string(),
            feedback: feedback.clone(),
            points_earned: points::REQUEST_FEEDBACK,
            created_at: Utc::now(),
        };
        self.feedback.create(&request).await?;

        let total = self
            .users
            .add_points(user_id, points::REQUEST_FEEDBACK)
            .await?;
        self.users
            .set_level(user_id, calculate_level(total))
            .await?;

        self.sessions.clear(user_id).await;

        if let Err(err) = self.awarder.check_and_award(user.id, user_id).await {
            tracing::warn!(user = %user_id, error = %err, "badge check failed after feedback");
        }

        Ok(vec![templates::feedback_report(&feedback)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::flows::test_support::{
        test_task, MemoryBadges, MemoryFeedback, MemorySessions, MemoryUsers, RecordingGateway,
        StubEvaluator, StubTasks,
    };

    struct Fixture {
        users: Arc<MemoryUsers>,
        sessions: Arc<MemorySessions>,
        feedback: Arc<MemoryFeedback>,
        flow: FeedbackFlow,
    }

    fn fixture(active_task: bool) -> Fixture {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let feedback = Arc::new(MemoryFeedback::default());
        let gateway = Arc::new(RecordingGateway::default());
        let tasks = Arc::new(StubTasks {
            active: active_task.then(|| test_task(50, 48)),
        });
        let awarder = Arc::new(BadgeAwarder::new(
            users.clone(),
            Arc::new(MemoryBadges::default()),
            gateway,
        ));
        let flow = FeedbackFlow::new(
            users.clone(),
            tasks,
            feedback.clone(),
            Arc::new(StubEvaluator::default()),
            sessions.clone(),
            awarder,
        );
        Fixture {
            users,
            sessions,
            feedback,
            flow,
        }
    }

    fn user_id() -> LineUserId {
        LineUserId::new("U-fb").unwrap()
    }

    #[tokio::test]
    async fn start_requires_registration() {
        let fx = fixture(true);
        let messages = fx.flow.start(&user_id()).await.unwrap();
        assert_eq!(messages, vec![templates::please_register()]);
        assert!(fx.sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn start_enters_awaiting_draft() {
        let fx = fixture(true);
        fx.users.seed_registered(&user_id()).await;

        fx.flow.start(&user_id()).await.unwrap();

        assert_eq!(
            fx.sessions.current(&user_id()).await.flow,
            Flow::AwaitingFeedbackDraft
        );
    }

    #[tokio::test]
    async fn draft_is_recorded_and_points_awarded() {
        let fx = fixture(true);
        fx.users.seed_registered(&user_id()).await;
        fx.flow.start(&user_id()).await.unwrap();

        let messages = fx
            .flow
            .submit_draft(&user_id(), "ฉันชอบเรียนภาษาไทยมาก")
            .await
            .unwrap();

        let rows = fx.feedback.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].draft_content, "ฉันชอบเรียนภาษาไทยมาก");
        assert_eq!(rows[0].points_earned, 5);
        assert!(rows[0].task_id.is_some());

        let user = fx.users.get(&user_id()).await.unwrap();
        assert_eq!(user.total_points, 5);
        assert_eq!(user.current_level, 1);

        assert!(fx.sessions.current(&user_id()).await.is_idle());
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn draft_without_active_task_uses_generic_context() {
        let fx = fixture(false);
        fx.users.seed_registered(&user_id()).await;
        fx.flow.start(&user_id()).await.unwrap();

        fx.flow.submit_draft(&user_id(), "ร่างของฉัน").await.unwrap();

        let rows = fx.feedback.rows().await;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].task_id.is_none());
    }
}
