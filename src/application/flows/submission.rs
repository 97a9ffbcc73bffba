//! Weekly submission flow.
//!
//! Binds the active task into the session, enforces the minimum word
//! count (rejection keeps the learner in the flow so a retry does not
//! restart it), grades the text, and records the submission with a
//! timeliness-tiered point award.

use std::sync::Arc;

use chrono::Utc;

use crate::application::badges::BadgeAwarder;
use crate::application::templates;
use crate::domain::coursework::{word_count, NewSubmission, Timeliness};
use crate::domain::evaluation::RubricContext;
use crate::domain::foundation::{DomainError, LineUserId, TaskId};
use crate::domain::gamification::calculate_level;
use crate::domain::session::{Flow, Session};
use crate::ports::{
    OutboundMessage, SessionStore, SubmissionRepository, TaskRepository, UserRepository,
    WritingEvaluator,
};

/// Handler for the work-submission flow.
pub struct SubmissionFlow {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    evaluator: Arc<dyn WritingEvaluator>,
    sessions: Arc<dyn SessionStore>,
    awarder: Arc<BadgeAwarder>,
}

impl SubmissionFlow {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        evaluator: Arc<dyn WritingEvaluator>,
        sessions: Arc<dyn SessionStore>,
        awarder: Arc<BadgeAwarder>,
    ) -> Self {
        Self {
            users,
            tasks,
            submissions,
            evaluator,
            sessions,
            awarder,
        }
    }

    /// Shows the active task brief and enters the awaiting-submission
    /// state. Requires a registered learner and an open task.
    pub async fn start(&self, user_id: &LineUserId) -> Result<Vec<OutboundMessage>, DomainError> {
        let registered = self
            .users
            .find(user_id)
            .await?
            .map(|user| user.is_registered)
            .unwrap_or(false);
        if !registered {
            return Ok(vec![templates::please_register()]);
        }

        let Some(task) = self.tasks.active().await? else {
            return Ok(vec![templates::no_active_task()]);
        };

        self.sessions
            .put(
                user_id,
                Session::with_flow(Flow::AwaitingSubmission { task_id: task.id }, Utc::now()),
            )
            .await;

        Ok(vec![templates::task_brief(&task)])
    }

    /// Grades and records the submitted text for the bound task.
    ///
    /// Text below the task minimum is rejected with the required count and
    /// the session is left untouched, so the learner retries in place.
    pub async fn submit(
        &self,
        user_id: &LineUserId,
        content: &str,
        task_id: TaskId,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let Some(user) = self.users.find(user_id).await? else {
            self.sessions.clear(user_id).await;
            return Ok(vec![templates::generic_error()]);
        };

        let Some(task) = self.tasks.find(&task_id).await? else {
            // The bound task vanished (deactivated mid-flow); reset.
            self.sessions.clear(user_id).await;
            return Ok(vec![templates::generic_error()]);
        };

        let words = word_count(content);
        if (words as i64) < task.min_words as i64 {
            return Ok(vec![templates::word_count_rejection(words, task.min_words)]);
        }

        let now = Utc::now();
        let timeliness = Timeliness::classify(now, task.deadline);
        let feedback = self
            .evaluator
            .evaluate(content, &RubricContext::submission(task.description.clone()))
            .await;
        let points_earned = timeliness.points();

        let submission = NewSubmission {
            user_id: user.id,
            task_id: task.id,
            content: content.to_string(),
            word_count: words as i32,
            feedback: feedback.clone(),
            points_earned,
            on_time: timeliness != Timeliness::Late,
            early_bonus: timeliness == Timeliness::Early,
            submitted_at: now,
        };
        self.submissions.create(&submission).await?;

        let total = self.users.add_points(user_id, points_earned).await?;
        self.users
            .set_level(user_id, calculate_level(total))
            .await?;

        self.sessions.clear(user_id).await;

        if let Err(err) = self.awarder.check_and_award(user.id, user_id).await {
            tracing::warn!(user = %user_id, error = %err, "badge check failed after submission");
        }

        Ok(vec![templates::submission_report(
            &feedback,
            timeliness,
            words,
            points_earned,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::flows::test_support::{
        test_task, MemoryBadges, MemorySessions, MemorySubmissions, MemoryUsers, RecordingGateway,
        StubEvaluator, StubTasks,
    };
    use crate::domain::coursework::Task;

    struct Fixture {
        users: Arc<MemoryUsers>,
        sessions: Arc<MemorySessions>,
        submissions: Arc<MemorySubmissions>,
        flow: SubmissionFlow,
    }

    fn fixture(task: Option<Task>) -> Fixture {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let submissions = Arc::new(MemorySubmissions::default());
        let awarder = Arc::new(BadgeAwarder::new(
            users.clone(),
            Arc::new(MemoryBadges::default()),
            Arc::new(RecordingGateway::default()),
        ));
        let flow = SubmissionFlow::new(
            users.clone(),
            Arc::new(StubTasks { active: task }),
            submissions.clone(),
            Arc::new(StubEvaluator::default()),
            sessions.clone(),
            awarder,
        );
        Fixture {
            users,
            sessions,
            submissions,
            flow,
        }
    }

    fn user_id() -> LineUserId {
        LineUserId::new("U-sub").unwrap()
    }

    fn long_text(words: usize) -> String {
        vec!["คำ"; words].join(" ")
    }

    #[tokio::test]
    async fn start_requires_registration() {
        let fx = fixture(Some(test_task(5, 48)));
        let messages = fx.flow.start(&user_id()).await.unwrap();
        assert_eq!(messages, vec![templates::please_register()]);
    }

    #[tokio::test]
    async fn start_without_active_task_stays_idle() {
        let fx = fixture(None);
        fx.users.seed_registered(&user_id()).await;

        let messages = fx.flow.start(&user_id()).await.unwrap();
        assert_eq!(messages, vec![templates::no_active_task()]);
        assert!(fx.sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn start_binds_the_active_task() {
        let task = test_task(5, 48);
        let fx = fixture(Some(task.clone()));
        fx.users.seed_registered(&user_id()).await;

        fx.flow.start(&user_id()).await.unwrap();

        assert_eq!(
            fx.sessions.current(&user_id()).await.flow,
            Flow::AwaitingSubmission { task_id: task.id }
        );
    }

    #[tokio::test]
    async fn short_text_is_rejected_repeatedly_without_leaving_the_flow() {
        let task = test_task(5, 48);
        let fx = fixture(Some(task.clone()));
        fx.users.seed_registered(&user_id()).await;
        fx.flow.start(&user_id()).await.unwrap();

        for _ in 0..3 {
            let messages = fx
                .flow
                .submit(&user_id(), &long_text(3), task.id)
                .await
                .unwrap();
            assert_eq!(messages, vec![templates::word_count_rejection(3, 5)]);
            assert_eq!(
                fx.sessions.current(&user_id()).await.flow,
                Flow::AwaitingSubmission { task_id: task.id }
            );
        }
        assert!(fx.submissions.rows().await.is_empty());
    }

    #[tokio::test]
    async fn early_submission_earns_fifteen_points() {
        let task = test_task(5, 48);
        let fx = fixture(Some(task.clone()));
        fx.users.seed_registered(&user_id()).await;
        fx.flow.start(&user_id()).await.unwrap();

        fx.flow
            .submit(&user_id(), &long_text(6), task.id)
            .await
            .unwrap();

        let rows = fx.submissions.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].points_earned, 15);
        assert!(rows[0].early_bonus);
        assert!(rows[0].on_time);
        assert_eq!(rows[0].word_count, 6);

        let user = fx.users.get(&user_id()).await.unwrap();
        assert_eq!(user.total_points, 15);
        assert!(fx.sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn late_submission_earns_five_points() {
        let task = test_task(5, -2);
        let fx = fixture(Some(task.clone()));
        fx.users.seed_registered(&user_id()).await;
        fx.flow.start(&user_id()).await.unwrap();

        fx.flow
            .submit(&user_id(), &long_text(6), task.id)
            .await
            .unwrap();

        let rows = fx.submissions.rows().await;
        assert_eq!(rows[0].points_earned, 5);
        assert!(!rows[0].on_time);
        assert!(!rows[0].early_bonus);
    }

    #[tokio::test]
    async fn vanished_task_resets_the_session() {
        let fx = fixture(None);
        fx.users.seed_registered(&user_id()).await;

        let messages = fx
            .flow
            .submit(&user_id(), &long_text(6), TaskId::new())
            .await
            .unwrap();
        assert_eq!(messages, vec![templates::generic_error()]);
        assert!(fx.sessions.current(&user_id()).await.is_idle());
    }
}
