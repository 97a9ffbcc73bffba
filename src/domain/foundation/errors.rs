//! Error types for the domain layer.

use std::collections::HashMap;
use std::fmt;

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidFormat,

    // Missing preconditions
    NotRegistered,
    NoActiveTask,
    EmptyQuestionPool,

    // Not found errors
    UserNotFound,
    TaskNotFound,

    // State errors
    InvalidStateTransition,

    // Infrastructure errors
    DatabaseError,
    MessagingError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::NotRegistered => "NOT_REGISTERED",
            ErrorCode::NoActiveTask => "NO_ACTIVE_TASK",
            ErrorCode::EmptyQuestionPool => "EMPTY_QUESTION_POOL",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::TaskNotFound => "TASK_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::MessagingError => "MESSAGING_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Attaches a named detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let err = DomainError::new(ErrorCode::NoActiveTask, "no task open this week");
        assert_eq!(err.to_string(), "[NO_ACTIVE_TASK] no task open this week");
    }

    #[test]
    fn details_accumulate() {
        let err = DomainError::database("insert failed")
            .with_detail("table", "submissions")
            .with_detail("user", "U123");
        assert_eq!(err.details.len(), 2);
        assert_eq!(err.details.get("table").map(String::as_str), Some("submissions"));
    }
}
