//! PostgreSQL adapter for the task repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::coursework::Task;
use crate::domain::foundation::{DomainError, TaskId};
use crate::ports::TaskRepository;

/// Task repository backed by the `tasks` table.
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Task {
        Task {
            id: TaskId::from_uuid(row.get::<Uuid, _>("id")),
            week_number: row.get("week_number"),
            title: row.get("title"),
            description: row.get("description"),
            content_url: row.get("content_url"),
            min_words: row.get("min_words"),
            max_words: row.get("max_words"),
            deadline: row.get("deadline"),
            is_active: row.get("is_active"),
        }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn active(&self) -> Result<Option<Task>, DomainError> {
        let row = sqlx::query(
            "SELECT * FROM tasks WHERE is_active ORDER BY week_number DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.as_ref().map(Self::from_row))
    }

    async fn find(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.as_ref().map(Self::from_row))
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}
