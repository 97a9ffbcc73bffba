//! Redis configuration (shared session store)

use serde::Deserialize;

use super::error::ValidationError;

/// Redis connection configuration.
///
/// The session store falls back to the in-process map when no URL is
/// configured, which is fine for single-instance deployments. Multi-instance
/// deployments must set a URL so rapid webhook events from the same user
/// land on the same session record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedisConfig {
    /// Connection URL (redis://...); optional
    #[serde(default)]
    pub url: Option<String>,
}

impl RedisConfig {
    /// Validate redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::invalid(
                    "redis",
                    "url must start with redis:// or rediss://",
                ));
            }
        }
        Ok(())
    }
}
