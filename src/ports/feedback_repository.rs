//! Feedback Request Repository Port.

use async_trait::async_trait;

use crate::domain::coursework::NewFeedbackRequest;
use crate::domain::foundation::DomainError;

/// Port for recording draft feedback requests. Created once per feedback
/// action, read-only afterward.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Persists a feedback request.
    async fn create(&self, request: &NewFeedbackRequest) -> Result<(), DomainError>;
}
