//! Mini-game flow.
//!
//! Loads a bounded random sample of questions for the chosen game, walks
//! the learner through them one answer per message, and awards points per
//! correct answer at the end.

use std::sync::Arc;

use chrono::Utc;

use crate::application::templates;
use crate::domain::foundation::{DomainError, LineUserId};
use crate::domain::games::{
    select_questions, GameKind, GamePlay, GameProgress, QUESTIONS_PER_GAME, SAMPLE_FACTOR,
};
use crate::domain::session::{Flow, Session};
use crate::ports::{OutboundMessage, QuestionBank, SessionStore, UserRepository};

/// Handler for the four question games.
pub struct GameFlow {
    users: Arc<dyn UserRepository>,
    questions: Arc<dyn QuestionBank>,
    sessions: Arc<dyn SessionStore>,
}

impl GameFlow {
    pub fn new(
        users: Arc<dyn UserRepository>,
        questions: Arc<dyn QuestionBank>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            users,
            questions,
            sessions,
        }
    }

    /// Starts a round: oversample the bank, shuffle, take the round size.
    /// An empty bank gets a "no content" reply with no state change.
    pub async fn start(
        &self,
        user_id: &LineUserId,
        kind: GameKind,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let fetch_limit = QUESTIONS_PER_GAME * SAMPLE_FACTOR;
        let pool = match kind {
            GameKind::Vocabulary => self.questions.vocabulary_questions(fetch_limit).await?,
            GameKind::FillBlank => self.questions.fill_blank_questions(fetch_limit).await?,
            GameKind::WordOrder => self.questions.word_order_questions(fetch_limit).await?,
            GameKind::SentenceConstruction => self.questions.sentence_pairs(fetch_limit).await?,
        };

        let selected = {
            let mut rng = rand::thread_rng();
            select_questions(pool, QUESTIONS_PER_GAME, &mut rng)
        };

        let Some(play) = GamePlay::new(kind, selected) else {
            return Ok(vec![templates::no_questions()]);
        };

        let first = templates::first_game_question(&play);
        self.sessions
            .put(
                user_id,
                Session::with_flow(Flow::PlayingGame(play), Utc::now()),
            )
            .await;

        Ok(vec![first])
    }

    /// Grades one answer and either advances to the next question or
    /// finalizes the round with its point award.
    pub async fn answer(
        &self,
        user_id: &LineUserId,
        text: &str,
        mut play: GamePlay,
    ) -> Result<Vec<OutboundMessage>, DomainError> {
        let kind = play.kind;
        let (graded, progress) = play.answer(text);

        match progress {
            GameProgress::Next => {
                let message = templates::next_game_question(&graded, &play);
                self.sessions
                    .put(
                        user_id,
                        Session::with_flow(Flow::PlayingGame(play), Utc::now()),
                    )
                    .await;
                Ok(vec![message])
            }
            GameProgress::Finished(summary) => {
                if summary.points_earned > 0 && self.users.find(user_id).await?.is_some() {
                    self.users.add_points(user_id, summary.points_earned).await?;
                }
                self.sessions.clear(user_id).await;
                Ok(vec![templates::game_finished(&graded, kind, &summary)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::flows::test_support::{
        MemorySessions, MemoryUsers, StubQuestionBank,
    };

    fn user_id() -> LineUserId {
        LineUserId::new("U-game").unwrap()
    }

    fn fixture(bank: StubQuestionBank) -> (Arc<MemoryUsers>, Arc<MemorySessions>, GameFlow) {
        let users = Arc::new(MemoryUsers::default());
        let sessions = Arc::new(MemorySessions::default());
        let flow = GameFlow::new(users.clone(), Arc::new(bank), sessions.clone());
        (users, sessions, flow)
    }

    async fn playing(sessions: &MemorySessions, user: &LineUserId) -> GamePlay {
        match sessions.current(user).await.flow {
            Flow::PlayingGame(play) => play,
            other => panic!("expected a game in progress, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_bank_replies_no_content_and_stays_idle() {
        let (_, sessions, flow) = fixture(StubQuestionBank::default());

        let messages = flow.start(&user_id(), GameKind::Vocabulary).await.unwrap();
        assert_eq!(messages, vec![templates::no_questions()]);
        assert!(sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn start_loads_a_bounded_sample() {
        let (_, sessions, flow) = fixture(StubQuestionBank::with_vocabulary(20));

        flow.start(&user_id(), GameKind::Vocabulary).await.unwrap();

        let play = playing(&sessions, &user_id()).await;
        assert_eq!(play.total(), QUESTIONS_PER_GAME);
        assert_eq!(play.index, 0);
        assert_eq!(play.correct, 0);
    }

    #[tokio::test]
    async fn answers_advance_and_finalize_with_points() {
        let (users, sessions, flow) = fixture(StubQuestionBank::with_vocabulary(5));
        users.seed_registered(&user_id()).await;
        flow.start(&user_id(), GameKind::Vocabulary).await.unwrap();

        // Answer all five: three correct, two wrong. Questions come back in
        // bank order shuffled, so grade against the session's own list.
        for turn in 0..5 {
            let play = playing(&sessions, &user_id()).await;
            let answer = if turn < 3 {
                play.current().correct_answer_display()
            } else {
                "ผิดแน่นอน".to_string()
            };
            flow.answer(&user_id(), &answer, play).await.unwrap();
        }

        // 3 correct x 10 points.
        let user = users.get(&user_id()).await.unwrap();
        assert_eq!(user.total_points, 30);
        assert!(sessions.current(&user_id()).await.is_idle());
    }

    #[tokio::test]
    async fn unknown_user_can_finish_without_an_award() {
        let (users, sessions, flow) = fixture(StubQuestionBank::with_vocabulary(1));
        flow.start(&user_id(), GameKind::Vocabulary).await.unwrap();

        let play = playing(&sessions, &user_id()).await;
        let answer = play.current().correct_answer_display();
        let messages = flow.answer(&user_id(), &answer, play).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert!(users.get(&user_id()).await.is_none());
        assert!(sessions.current(&user_id()).await.is_idle());
    }
}
