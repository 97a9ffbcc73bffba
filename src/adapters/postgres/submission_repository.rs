//! PostgreSQL adapter for the submission repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::coursework::NewSubmission;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::SubmissionRepository;

/// Submission repository backed by the `submissions` table.
pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    async fn create(&self, submission: &NewSubmission) -> Result<(), DomainError> {
        let feedback_json = serde_json::to_value(&submission.feedback)
            .map_err(|e| DomainError::database(format!("failed to encode feedback: {}", e)))?;
        let scores = &submission.feedback.scores;

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, user_id, task_id, content, word_count,
                content_score, organization_score, grammar_score,
                vocabulary_score, mechanics_score, total_score,
                ai_feedback, points_earned, on_time, early_bonus, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(submission.user_id.as_uuid())
        .bind(submission.task_id.as_uuid())
        .bind(&submission.content)
        .bind(submission.word_count)
        .bind(scores.content as i16)
        .bind(scores.organization as i16)
        .bind(scores.grammar as i16)
        .bind(scores.vocabulary as i16)
        .bind(scores.mechanics as i16)
        .bind(scores.total() as i16)
        .bind(feedback_json)
        .bind(submission.points_earned)
        .bind(submission.on_time)
        .bind(submission.early_bonus)
        .bind(submission.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(())
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}
