//! Free-form conversation.
//!
//! Text that matches no menu intent goes to the conversational model with
//! minimal user context. Registered learners earn a small daily-chat
//! point per turn. No state change.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, LineUserId};
use crate::domain::gamification::points;
use crate::ports::{OutboundMessage, UserRepository, WritingEvaluator};

/// Handler for unclassified text.
pub struct ChatFlow {
    users: Arc<dyn UserRepository>,
    evaluator: Arc<dyn WritingEvaluator>,
}

impl ChatFlow {
    pub fn new(users: Arc<dyn UserRepository>, evaluator: Arc<dyn WritingEvaluator>) -> Self {
        Self { users, evaluator }
    }

    /// Generates a conversational reply and awards the chat point.
    pub async fn respond(
        &self,
        user_id: &LineUserId,
        text: &str,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let user = self.users.find(user_id).await?;

        let context = match &user {
            Some(user) if user.is_registered => format!(
                "User is registered as {}, Level {}",
                user.display_name(),
                user.current_level
            ),
            _ => "User is not registered yet".to_string(),
        };

        let reply = self.evaluator.converse(text, &context).await;

        if user.map(|u| u.is_registered).unwrap_or(false) {
            if let Err(err) = self.users.add_points(user_id, points::DAILY_CHAT).await {
                tracing::warn!(user = %user_id, error = %err, "failed to award chat point");
            }
        }

        Ok(vec![OutboundMessage::text(reply)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::flows::test_support::{MemoryUsers, StubEvaluator};

    fn user_id() -> LineUserId {
        LineUserId::new("U-chat").unwrap()
    }

    #[tokio::test]
    async fn registered_user_earns_the_chat_point() {
        let users = Arc::new(MemoryUsers::default());
        users.seed_registered(&user_id()).await;
        let flow = ChatFlow::new(users.clone(), Arc::new(StubEvaluator::default()));

        let messages = flow.respond(&user_id(), "วันนี้อากาศดีนะ").await.unwrap();

        assert_eq!(messages, vec![OutboundMessage::text("สวัสดีครับ!")]);
        assert_eq!(users.get(&user_id()).await.unwrap().total_points, 1);
    }

    #[tokio::test]
    async fn unregistered_user_gets_a_reply_but_no_point() {
        let users = Arc::new(MemoryUsers::default());
        let flow = ChatFlow::new(users.clone(), Arc::new(StubEvaluator::default()));

        let messages = flow.respond(&user_id(), "hello").await.unwrap();

        assert_eq!(messages.len(), 1);
        assert!(users.get(&user_id()).await.is_none());
    }
}
