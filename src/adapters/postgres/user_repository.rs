//! PostgreSQL adapter for the user repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, LineUserId, UserId};
use crate::domain::gamification::UserStats;
use crate::domain::registration::{ProfileField, StepValue};
use crate::domain::user::{ThaiLevel, User};
use crate::ports::UserRepository;

/// User repository backed by the `users` table.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<User, DomainError> {
        let line_user_id: String = row.get("line_user_id");
        let thai_level: String = row.get("thai_level");

        Ok(User {
            id: UserId::from_uuid(row.get::<Uuid, _>("id")),
            line_user_id: LineUserId::new(line_user_id)?,
            chinese_name: row.get("chinese_name"),
            thai_name: row.get("thai_name"),
            student_id: row.get("student_id"),
            university: row.get("university"),
            email: row.get("email"),
            nationality: row.get("nationality"),
            thai_level: ThaiLevel::parse(&thai_level).ok_or_else(|| {
                DomainError::validation(format!("unknown thai_level value: {}", thai_level))
            })?,
            consent: row.get("consent"),
            is_registered: row.get("is_registered"),
            total_points: row.get("total_points"),
            current_level: row.get("current_level"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find(&self, line_user_id: &LineUserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query("SELECT * FROM users WHERE line_user_id = $1")
            .bind(line_user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn get_or_create(&self, line_user_id: &LineUserId) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, line_user_id)
            VALUES ($1, $2)
            ON CONFLICT (line_user_id) DO UPDATE SET updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(line_user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Self::from_row(&row)
    }

    async fn set_profile_field(
        &self,
        line_user_id: &LineUserId,
        field: ProfileField,
        value: &StepValue,
    ) -> Result<(), DomainError> {
        // Column names come from a closed enum, never from input.
        let column = match field {
            ProfileField::ChineseName => "chinese_name",
            ProfileField::ThaiName => "thai_name",
            ProfileField::StudentId => "student_id",
            ProfileField::University => "university",
            ProfileField::Email => "email",
            ProfileField::Nationality => "nationality",
            ProfileField::ThaiLevel => "thai_level",
            ProfileField::Consent => "consent",
        };
        let sql = format!(
            "UPDATE users SET {} = $2, updated_at = now() WHERE line_user_id = $1",
            column
        );

        let query = sqlx::query(&sql).bind(line_user_id.as_str());
        let query = match value {
            StepValue::Text(text) => query.bind(text.clone()),
            StepValue::Level(level) => query.bind(level.as_str()),
            StepValue::Consent(consent) => query.bind(*consent),
        };

        query
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(())
    }

    async fn mark_registered(&self, line_user_id: &LineUserId) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE users SET is_registered = TRUE, updated_at = now() WHERE line_user_id = $1",
        )
        .bind(line_user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(())
    }

    async fn add_points(&self, line_user_id: &LineUserId, delta: i64) -> Result<i64, DomainError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            UPDATE users
            SET total_points = total_points + $2, updated_at = now()
            WHERE line_user_id = $1
            RETURNING total_points
            "#,
        )
        .bind(line_user_id.as_str())
        .bind(delta)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(total)
    }

    async fn set_level(&self, line_user_id: &LineUserId, level: i32) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE users SET current_level = $2, updated_at = now() WHERE line_user_id = $1",
        )
        .bind(line_user_id.as_str())
        .bind(level)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;
        Ok(())
    }

    async fn record_practice(&self, line_user_id: &LineUserId) -> Result<i64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            UPDATE users
            SET practice_count = practice_count + 1, updated_at = now()
            WHERE line_user_id = $1
            RETURNING practice_count
            "#,
        )
        .bind(line_user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(count)
    }

    async fn load_stats(&self, user_id: UserId) -> Result<UserStats, DomainError> {
        let uid = *user_id.as_uuid();
        let db = |e: sqlx::Error| DomainError::database(e.to_string());

        let feedback_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM feedback_requests WHERE user_id = $1")
                .bind(uid)
                .fetch_one(&self.pool)
                .await
                .map_err(db)?;

        let early_submissions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM submissions WHERE user_id = $1 AND early_bonus",
        )
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;

        let perfect_submission: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE user_id = $1 AND total_score >= 20)",
        )
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;

        let vocabulary_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_vocabulary_progress WHERE user_id = $1",
        )
        .bind(uid)
        .fetch_one(&self.pool)
        .await
        .map_err(db)?;

        let practice_count: i64 =
            sqlx::query_scalar("SELECT COALESCE(practice_count, 0) FROM users WHERE id = $1")
                .bind(uid)
                .fetch_optional(&self.pool)
                .await
                .map_err(db)?
                .unwrap_or(0);

        let weeks: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT t.week_number
            FROM submissions s
            JOIN tasks t ON t.id = s.task_id
            WHERE s.user_id = $1
            ORDER BY t.week_number
            "#,
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let scores: Vec<i16> = sqlx::query_scalar(
            "SELECT total_score FROM submissions WHERE user_id = $1 ORDER BY submitted_at",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        Ok(UserStats {
            feedback_count,
            consecutive_weeks: consecutive_week_streak(&weeks),
            early_submissions,
            vocabulary_count,
            improvement_streak: improvement_streak(&scores),
            practice_count,
            perfect_submission,
        })
    }
}

/// Longest run of consecutive week numbers in a sorted, de-duplicated
/// list.
fn consecutive_week_streak(weeks: &[i32]) -> i64 {
    let mut best: i64 = 0;
    let mut run: i64 = 0;
    let mut prev: Option<i32> = None;

    for &week in weeks {
        run = match prev {
            Some(p) if week == p + 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(week);
    }
    best
}

/// Length of the trailing strictly-improving run of submission scores.
fn improvement_streak(scores: &[i16]) -> i64 {
    let mut streak: i64 = 0;
    for window in scores.windows(2) {
        if window[1] > window[0] {
            streak += 1;
        } else {
            streak = 0;
        }
    }
    streak
}
