//! Learner records and profile values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LineUserId, UserId};

/// Self-reported Thai proficiency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThaiLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ThaiLevel {
    /// Parses a registration answer.
    ///
    /// Matching is case-insensitive. Anything outside the three known
    /// levels yields `None`; the registration wizard substitutes
    /// [`ThaiLevel::default_level`] in that case rather than advancing
    /// with bad data.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_uppercase().as_str() {
            "BEGINNER" => Some(ThaiLevel::Beginner),
            "INTERMEDIATE" => Some(ThaiLevel::Intermediate),
            "ADVANCED" => Some(ThaiLevel::Advanced),
            _ => None,
        }
    }

    /// The level stored when a registration answer is out of set.
    pub fn default_level() -> Self {
        ThaiLevel::Intermediate
    }

    /// Database/display tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThaiLevel::Beginner => "BEGINNER",
            ThaiLevel::Intermediate => "INTERMEDIATE",
            ThaiLevel::Advanced => "ADVANCED",
        }
    }
}

/// A learner, keyed by their chat-platform identity.
///
/// Created on first contact (follow event or registration start) and
/// mutated at every registration step and point-earning action. Never
/// hard-deleted by the conversation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub line_user_id: LineUserId,
    pub chinese_name: Option<String>,
    pub thai_name: Option<String>,
    pub student_id: Option<String>,
    pub university: Option<String>,
    pub email: Option<String>,
    pub nationality: Option<String>,
    pub thai_level: ThaiLevel,
    pub consent: bool,
    pub is_registered: bool,
    pub total_points: i64,
    pub current_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A fresh, unregistered user for the given chat identity.
    pub fn new(line_user_id: LineUserId, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            line_user_id,
            chinese_name: None,
            thai_name: None,
            student_id: None,
            university: None,
            email: None,
            nationality: None,
            thai_level: ThaiLevel::Beginner,
            consent: false,
            is_registered: false,
            total_points: 0,
            current_level: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name used in replies; falls back to a neutral form before
    /// the Thai name is collected.
    pub fn display_name(&self) -> &str {
        self.thai_name.as_deref().unwrap_or("ผู้เรียน")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_level_parses_case_insensitively() {
        assert_eq!(ThaiLevel::parse("beginner"), Some(ThaiLevel::Beginner));
        assert_eq!(ThaiLevel::parse(" ADVANCED "), Some(ThaiLevel::Advanced));
        assert_eq!(ThaiLevel::parse("Intermediate"), Some(ThaiLevel::Intermediate));
    }

    #[test]
    fn thai_level_rejects_out_of_set_answers() {
        assert_eq!(ThaiLevel::parse("fluent"), None);
        assert_eq!(ThaiLevel::parse(""), None);
        assert_eq!(ThaiLevel::default_level(), ThaiLevel::Intermediate);
    }

    #[test]
    fn new_user_starts_unregistered_at_level_one() {
        let user = User::new(LineUserId::new("U1").unwrap(), Utc::now());
        assert!(!user.is_registered);
        assert_eq!(user.total_points, 0);
        assert_eq!(user.current_level, 1);
        assert_eq!(user.display_name(), "ผู้เรียน");
    }
}
