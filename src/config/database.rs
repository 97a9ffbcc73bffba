//! Database configuration (PostgreSQL)

use serde::Deserialize;

use super::error::ValidationError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (postgresql://...)
    pub url: String,

    /// Maximum connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::invalid(
                "database",
                "url must start with postgres:// or postgresql://",
            ));
        }
        if self.max_connections == 0 {
            return Err(ValidationError::invalid(
                "database",
                "max_connections must be non-zero",
            ));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}
