//! Weekly writing tasks, submissions, and feedback requests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::evaluation::WritingFeedback;
use crate::domain::foundation::{TaskId, UserId};
use crate::domain::gamification::points;

/// A weekly writing assignment, created by teaching staff and read-only to
/// the conversation core. The "active" task is the most recent week with
/// the active flag set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub week_number: i32,
    pub title: String,
    pub description: String,
    pub content_url: String,
    pub min_words: i32,
    pub max_words: i32,
    pub deadline: DateTime<Utc>,
    pub is_active: bool,
}

/// How a submission landed relative to the task deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeliness {
    /// At least 24 hours before the deadline.
    Early,
    /// Before the deadline, but within the last 24 hours.
    OnTime,
    /// After the deadline.
    Late,
}

impl Timeliness {
    /// Classifies a submission instant against a deadline. Early means at
    /// least 24 hours of margin.
    pub fn classify(submitted_at: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        if submitted_at <= deadline - Duration::hours(24) {
            Timeliness::Early
        } else if submitted_at <= deadline {
            Timeliness::OnTime
        } else {
            Timeliness::Late
        }
    }

    /// Points awarded for this timeliness tier.
    pub fn points(&self) -> i64 {
        match self {
            Timeliness::Early => points::SUBMIT_EARLY,
            Timeliness::OnTime => points::SUBMIT_ON_TIME,
            Timeliness::Late => points::SUBMIT_LATE,
        }
    }

    /// Thai status label used in the score report.
    pub fn label_thai(&self) -> &'static str {
        match self {
            Timeliness::Early => "ส่งก่อนกำหนด",
            Timeliness::OnTime => "ส่งตรงเวลา",
            Timeliness::Late => "ส่งหลังกำหนด",
        }
    }
}

/// Counts words by splitting on whitespace, matching how submission length
/// is checked against the task minimum. Learners are instructed to space
/// their Thai words for this course.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// A graded submission, written exactly once per submit action.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub user_id: UserId,
    pub task_id: TaskId,
    pub content: String,
    pub word_count: i32,
    pub feedback: WritingFeedback,
    pub points_earned: i64,
    pub on_time: bool,
    pub early_bonus: bool,
    pub submitted_at: DateTime<Utc>,
}

/// A draft feedback request, written exactly once per feedback action.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedbackRequest {
    pub user_id: UserId,
    pub task_id: Option<TaskId>,
    pub draft_content: String,
    pub feedback: WritingFeedback,
    pub points_earned: i64,
    pub created_at: DateTime<Utc>,
}
