//! Submission Repository Port.

use async_trait::async_trait;

use crate::domain::coursework::NewSubmission;
use crate::domain::foundation::{DomainError, UserId};

/// Port for recording graded submissions. A submission is created exactly
/// once per submit action and never mutated afterward.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Persists a graded submission.
    async fn create(&self, submission: &NewSubmission) -> Result<(), DomainError>;

    /// Number of submissions a user has made (dashboard display).
    async fn count_for_user(&self, user_id: UserId) -> Result<i64, DomainError>;
}
