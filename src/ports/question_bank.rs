//! Question Bank Port - reference data for the mini-games and practice.
//!
//! Banks return a bounded candidate pool; the game flow shuffles and
//! takes the final selection (uniform shuffle over the oversample).
//! Gameplay never mutates these rows.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::games::GameQuestion;

/// One vocabulary entry for the stateless practice card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyCard {
    pub word: String,
    pub meaning: String,
    pub example_sentence: Option<String>,
}

/// Port for fetching game questions and practice vocabulary.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Up to `limit` vocabulary questions.
    async fn vocabulary_questions(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError>;

    /// Up to `limit` fill-in-the-blank questions.
    async fn fill_blank_questions(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError>;

    /// Up to `limit` word-order puzzles.
    async fn word_order_questions(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError>;

    /// Up to `limit` sentence-construction word pairs.
    async fn sentence_pairs(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError>;

    /// One uniformly random vocabulary card, or `None` when the bank is
    /// empty.
    async fn random_vocabulary(&self) -> Result<Option<VocabularyCard>, DomainError>;
}
