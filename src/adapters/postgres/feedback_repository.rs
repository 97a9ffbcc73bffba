//! PostgreSQL adapter for the feedback-request repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::coursework::NewFeedbackRequest;
use crate::domain::foundation::DomainError;
use crate::ports::FeedbackRepository;

/// Feedback repository backed by the `feedback_requests` table.
pub struct PgFeedbackRepository {
    pool: PgPool,
}

impl PgFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PgFeedbackRepository {
    async fn create(&self, request: &NewFeedbackRequest) -> Result<(), DomainError> {
        let feedback_json = serde_json::to_value(&request.feedback)
            .map_err(|e| DomainError::database(format!("failed to encode feedback: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO feedback_requests (
                id, user_id, task_id, draft_content, ai_feedback, points_earned, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id.as_uuid())
        .bind(request.task_id.as_ref().map(|id| *id.as_uuid()))
        .bind(&request.draft_content)
        .bind(feedback_json)
        .bind(request.points_earned)
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(())
    }
}
