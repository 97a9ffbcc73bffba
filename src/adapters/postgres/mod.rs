//! PostgreSQL adapters for the persistence ports.
//!
//! Runtime queries with explicit binds; counters are mutated in SQL
//! (`total_points = total_points + $n`) rather than read-modify-write, so
//! concurrent webhook events cannot lose each other's increments.

mod badge_repository;
mod feedback_repository;
mod question_bank;
mod submission_repository;
mod task_repository;
mod user_repository;

pub use badge_repository::PgBadgeRepository;
pub use feedback_repository::PgFeedbackRepository;
pub use question_bank::PgQuestionBank;
pub use submission_repository::PgSubmissionRepository;
pub use task_repository::PgTaskRepository;
pub use user_repository::PgUserRepository;
