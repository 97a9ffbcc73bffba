//! Configuration error types

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying config crate failure (missing variable, type mismatch)
    #[error("configuration load failed: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors produced by semantic validation of loaded configuration
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid {section} configuration: {reason}")]
    Invalid { section: &'static str, reason: String },
}

impl ValidationError {
    /// Creates a validation error for a named config section.
    pub fn invalid(section: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            section,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_section() {
        let err = ValidationError::invalid("line", "channel_secret is empty");
        assert!(err.to_string().contains("line"));
        assert!(err.to_string().contains("channel_secret"));
    }
}
