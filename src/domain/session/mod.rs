//! Ephemeral per-user conversation state.
//!
//! A session tracks which flow a learner is in and where their cursor
//! stands. It is owned and mutated exclusively by the conversation
//! controller; no other component reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::TaskId;
use crate::domain::games::GamePlay;

/// The flow a learner is currently in.
///
/// Edit-mode registration used to be encoded as a `"|EDIT"` suffix on a
/// state string; here it is an explicit field on the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum Flow {
    /// No flow active; free text is classified as a menu intent or chat.
    Idle,
    /// Mid-registration. `step` indexes the registration step table;
    /// `edit_only` finalizes after a single field is re-collected.
    Registering { step: usize, edit_only: bool },
    /// The next text message is a draft to grade.
    AwaitingFeedbackDraft,
    /// The next text message is a submission for the bound task.
    AwaitingSubmission { task_id: TaskId },
    /// Mid-game; the play state carries questions, cursor, and score.
    PlayingGame(GamePlay),
}

/// One mutable session record per chat identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub flow: Flow,
    /// Last mutation instant; stores use this to expire abandoned flows.
    pub touched_at: DateTime<Utc>,
}

impl Session {
    /// A fresh idle session.
    pub fn idle(now: DateTime<Utc>) -> Self {
        Self {
            flow: Flow::Idle,
            touched_at: now,
        }
    }

    /// A session carrying the given flow, stamped now.
    pub fn with_flow(flow: Flow, now: DateTime<Utc>) -> Self {
        Self {
            flow,
            touched_at: now,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.flow, Flow::Idle)
    }

    /// Whether the session has sat untouched longer than `ttl_secs`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_secs: u64) -> bool {
        (now - self.touched_at).num_seconds() >= ttl_secs as i64
    }
}
