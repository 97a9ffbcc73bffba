//! Stateless vocabulary practice.
//!
//! One random card per request with quick replies to reveal the answer or
//! pull the next card. No session state: every card is independent.

use std::sync::Arc;

use crate::application::templates;
use crate::domain::foundation::{DomainError, LineUserId};
use crate::ports::{OutboundMessage, QuestionBank, UserRepository};

/// Handler for the practice card.
pub struct PracticeFlow {
    users: Arc<dyn UserRepository>,
    questions: Arc<dyn QuestionBank>,
}

impl PracticeFlow {
    pub fn new(users: Arc<dyn UserRepository>, questions: Arc<dyn QuestionBank>) -> Self {
        Self { users, questions }
    }

    /// Sends one random vocabulary card to a registered learner.
    pub async fn start(&self, user_id: &LineUserId) -> Result<Vec<OutboundMessage>, DomainError> {
        let registered = self
            .users
            .find(user_id)
            .await?
            .map(|user| user.is_registered)
            .unwrap_or(false);
        if !registered {
            return Ok(vec![templates::please_register()]);
        }

        match self.questions.random_vocabulary().await? {
            Some(card) => {
                if let Err(err) = self.users.record_practice(user_id).await {
                    tracing::warn!(user = %user_id, error = %err, "failed to record practice session");
                }
                Ok(vec![templates::practice_card(&card)])
            }
            None => Ok(vec![templates::no_practice_content()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::flows::test_support::{MemoryUsers, StubQuestionBank};
    use crate::ports::VocabularyCard;

    fn user_id() -> LineUserId {
        LineUserId::new("U-practice").unwrap()
    }

    #[tokio::test]
    async fn requires_registration() {
        let flow = PracticeFlow::new(
            Arc::new(MemoryUsers::default()),
            Arc::new(StubQuestionBank::default()),
        );
        let messages = flow.start(&user_id()).await.unwrap();
        assert_eq!(messages, vec![templates::please_register()]);
    }

    #[tokio::test]
    async fn empty_bank_replies_no_content() {
        let users = Arc::new(MemoryUsers::default());
        users.seed_registered(&user_id()).await;
        let flow = PracticeFlow::new(users, Arc::new(StubQuestionBank::default()));

        let messages = flow.start(&user_id()).await.unwrap();
        assert_eq!(messages, vec![templates::no_practice_content()]);
    }

    #[tokio::test]
    async fn serves_a_card_with_quick_replies() {
        let users = Arc::new(MemoryUsers::default());
        users.seed_registered(&user_id()).await;
        let bank = StubQuestionBank {
            practice: Some(VocabularyCard {
                word: "谢谢".to_string(),
                meaning: "ขอบคุณ".to_string(),
                example_sentence: None,
            }),
            ..StubQuestionBank::default()
        };
        let flow = PracticeFlow::new(users, Arc::new(bank));

        let messages = flow.start(&user_id()).await.unwrap();
        assert!(matches!(
            messages.as_slice(),
            [crate::ports::OutboundMessage::TextWithQuickReply { .. }]
        ));
    }
}
