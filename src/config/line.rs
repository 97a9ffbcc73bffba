//! LINE Messaging API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// LINE channel credentials.
///
/// The channel secret signs every inbound webhook body; the access token
/// authenticates outbound reply/push calls.
#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    /// Channel secret used for webhook signature verification
    pub channel_secret: Secret<String>,

    /// Long-lived channel access token for the Messaging API
    pub channel_access_token: Secret<String>,

    /// Messaging API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl LineConfig {
    /// Validate LINE configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.channel_secret.expose_secret().is_empty() {
            return Err(ValidationError::invalid("line", "channel_secret is empty"));
        }
        if self.channel_access_token.expose_secret().is_empty() {
            return Err(ValidationError::invalid(
                "line",
                "channel_access_token is empty",
            ));
        }
        Ok(())
    }
}

fn default_api_base() -> String {
    "https://api.line.me".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, token: &str) -> LineConfig {
        LineConfig {
            channel_secret: Secret::new(secret.to_string()),
            channel_access_token: Secret::new(token.to_string()),
            api_base: default_api_base(),
        }
    }

    #[test]
    fn populated_credentials_are_valid() {
        assert!(config("secret", "token").validate().is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(config("", "token").validate().is_err());
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(config("secret", "").validate().is_err());
    }
}
