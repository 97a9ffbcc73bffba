//! Task Repository Port.

use async_trait::async_trait;

use crate::domain::coursework::Task;
use crate::domain::foundation::{DomainError, TaskId};

/// Port for reading weekly writing tasks. Tasks are created by an external
/// admin surface and read-only here.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// The current active task: the most recent week with the active flag
    /// set, or `None` when nothing is open.
    async fn active(&self) -> Result<Option<Task>, DomainError>;

    /// Looks up a task by id.
    async fn find(&self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    /// Total number of tasks published so far (dashboard display).
    async fn count(&self) -> Result<i64, DomainError>;
}
