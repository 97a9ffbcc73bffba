//! Writing Evaluator Port - the external grading model.
//!
//! Wraps the text-evaluation service that scores Thai writing against the
//! five-criteria rubric and holds free-form conversation.
//!
//! # Contract
//!
//! Both methods are infallible: the conversation must always complete with
//! some reply, so implementations catch transport and parse failures and
//! return [`WritingFeedback::fallback`] (resp. a fixed apology line)
//! instead of propagating an error to the user.

use async_trait::async_trait;

use crate::domain::evaluation::{RubricContext, WritingFeedback};

/// Port for rubric grading and free-form conversation.
#[async_trait]
pub trait WritingEvaluator: Send + Sync {
    /// Grades a block of Thai writing against the rubric.
    async fn evaluate(&self, text: &str, context: &RubricContext) -> WritingFeedback;

    /// Generates a conversational reply to free-form chat.
    ///
    /// `user_context` is a short description of who is talking
    /// (registered/level), not conversation history.
    async fn converse(&self, message: &str, user_context: &str) -> String;
}
