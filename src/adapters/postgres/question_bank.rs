//! PostgreSQL adapter for the question banks.
//!
//! The bank methods return a bounded candidate pool in storage order; the
//! game flow shuffles and takes the final selection. With a bank smaller
//! than the requested limit the same candidates come back every round, so
//! repeats across sessions are expected.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, QuestionId};
use crate::domain::games::{GameQuestion, NumberedWord};
use crate::ports::{QuestionBank, VocabularyCard};

/// Question bank backed by the four reference tables.
pub struct PgQuestionBank {
    pool: PgPool,
}

impl PgQuestionBank {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn question_id(row: &PgRow) -> QuestionId {
    QuestionId::from_uuid(row.get::<Uuid, _>("id"))
}

#[async_trait]
impl QuestionBank for PgQuestionBank {
    async fn vocabulary_questions(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, chinese_word, thai_meaning FROM chinese_vocabulary LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| GameQuestion::Vocabulary {
                id: question_id(row),
                chinese_word: row.get("chinese_word"),
                thai_meaning: row.get("thai_meaning"),
            })
            .collect())
    }

    async fn fill_blank_questions(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError> {
        let rows = sqlx::query("SELECT id, sentence, answer FROM fill_blank_questions LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| GameQuestion::FillBlank {
                id: question_id(row),
                sentence: row.get("sentence"),
                answer: row.get("answer"),
            })
            .collect())
    }

    async fn word_order_questions(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, shuffled_words, correct_answer FROM word_order_questions LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let shuffled_words: Vec<NumberedWord> =
                    serde_json::from_value(row.get("shuffled_words")).map_err(|e| {
                        DomainError::database(format!("corrupt shuffled_words payload: {}", e))
                    })?;
                Ok(GameQuestion::WordOrder {
                    id: question_id(row),
                    shuffled_words,
                    correct_answer: row.get("correct_answer"),
                })
            })
            .collect()
    }

    async fn sentence_pairs(&self, limit: usize) -> Result<Vec<GameQuestion>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, word1, word2 FROM sentence_construction_pairs LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| GameQuestion::SentenceConstruction {
                id: question_id(row),
                first_word: row.get("word1"),
                second_word: row.get("word2"),
            })
            .collect())
    }

    async fn random_vocabulary(&self) -> Result<Option<VocabularyCard>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT chinese_word, thai_meaning, example_sentence
            FROM chinese_vocabulary
            ORDER BY random()
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(row.map(|row| VocabularyCard {
            word: row.get("chinese_word"),
            meaning: row.get("thai_meaning"),
            example_sentence: row.get("example_sentence"),
        }))
    }
}
