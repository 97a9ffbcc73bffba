//! Vocabulary and grammar mini-games.
//!
//! Four question banks, one grading rule per bank, and the in-session play
//! state. Question rows are reference data: gameplay never mutates them.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::QuestionId;
use crate::domain::gamification::points;

/// How many questions one game round asks.
pub const QUESTIONS_PER_GAME: usize = 5;

/// Oversampling factor when fetching candidate questions from the bank.
pub const SAMPLE_FACTOR: usize = 3;

/// The four game types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameKind {
    Vocabulary,
    FillBlank,
    WordOrder,
    SentenceConstruction,
}

impl GameKind {
    /// Thai display name.
    pub fn name_thai(&self) -> &'static str {
        match self {
            GameKind::Vocabulary => "เกมคำศัพท์จีน-ไทย",
            GameKind::FillBlank => "เกมเติมคำในช่องว่าง",
            GameKind::WordOrder => "เกมเรียงคำ",
            GameKind::SentenceConstruction => "เกมแต่งประโยค",
        }
    }

    /// Emoji used in question headers.
    pub fn emoji(&self) -> &'static str {
        match self {
            GameKind::Vocabulary => "🇨🇳",
            GameKind::FillBlank => "📝",
            GameKind::WordOrder => "🔤",
            GameKind::SentenceConstruction => "✍️",
        }
    }

    /// The keyword a learner types to replay this game.
    pub fn replay_keyword(&self) -> &'static str {
        match self {
            GameKind::Vocabulary => "คำศัพท์",
            GameKind::FillBlank => "เติมคำ",
            GameKind::WordOrder => "เรียงคำ",
            GameKind::SentenceConstruction => "แต่งประโยค",
        }
    }
}

/// One numbered token of a word-order puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedWord {
    pub number: u32,
    pub word: String,
}

/// A question loaded from one of the four banks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameQuestion {
    Vocabulary {
        id: QuestionId,
        chinese_word: String,
        thai_meaning: String,
    },
    FillBlank {
        id: QuestionId,
        sentence: String,
        answer: String,
    },
    WordOrder {
        id: QuestionId,
        shuffled_words: Vec<NumberedWord>,
        correct_answer: String,
    },
    SentenceConstruction {
        id: QuestionId,
        first_word: String,
        second_word: String,
    },
}

impl GameQuestion {
    /// The game this question belongs to.
    pub fn kind(&self) -> GameKind {
        match self {
            GameQuestion::Vocabulary { .. } => GameKind::Vocabulary,
            GameQuestion::FillBlank { .. } => GameKind::FillBlank,
            GameQuestion::WordOrder { .. } => GameKind::WordOrder,
            GameQuestion::SentenceConstruction { .. } => GameKind::SentenceConstruction,
        }
    }

    /// Grades a learner's answer.
    ///
    /// - Vocabulary and fill-blank: trimmed exact match.
    /// - Word order: exact match after stripping all whitespace from both
    ///   sides, so spacing differences are ignored.
    /// - Sentence construction: correct iff both required words appear as
    ///   substrings and the answer is at least 10 characters.
    pub fn grade(&self, answer: &str) -> bool {
        match self {
            GameQuestion::Vocabulary { thai_meaning, .. } => {
                answer.trim() == thai_meaning.trim()
            }
            GameQuestion::FillBlank { answer: expected, .. } => {
                answer.trim() == expected.trim()
            }
            GameQuestion::WordOrder { correct_answer, .. } => {
                strip_whitespace(answer) == strip_whitespace(correct_answer)
            }
            GameQuestion::SentenceConstruction {
                first_word,
                second_word,
                ..
            } => {
                answer.contains(first_word.as_str())
                    && answer.contains(second_word.as_str())
                    && answer.chars().count() >= 10
            }
        }
    }

    /// The answer shown after a wrong attempt.
    pub fn correct_answer_display(&self) -> String {
        match self {
            GameQuestion::Vocabulary { thai_meaning, .. } => thai_meaning.clone(),
            GameQuestion::FillBlank { answer, .. } => answer.clone(),
            GameQuestion::WordOrder { correct_answer, .. } => correct_answer.clone(),
            GameQuestion::SentenceConstruction {
                first_word,
                second_word,
                ..
            } => format!("{} + {}", first_word, second_word),
        }
    }

    /// The question body (no header line).
    pub fn prompt_body(&self) -> String {
        match self {
            GameQuestion::Vocabulary { chinese_word, .. } => {
                format!("'{}' ภาษาไทยว่าอะไร?", chinese_word)
            }
            GameQuestion::FillBlank { sentence, .. } => sentence.clone(),
            GameQuestion::WordOrder { shuffled_words, .. } => shuffled_words
                .iter()
                .map(|w| format!("{}.{}", w.number, w.word))
                .collect::<Vec<_>>()
                .join(" "),
            GameQuestion::SentenceConstruction {
                first_word,
                second_word,
                ..
            } => format!("แต่งประโยคโดยใช้คำว่า:\n• \"{}\"\n• \"{}\"", first_word, second_word),
        }
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Picks `count` questions from an oversampled pool.
///
/// Uniform Fisher-Yates shuffle, then the first `count` entries. Not
/// cryptographically random, and with a small backing pool the same
/// questions can repeat across game sessions.
pub fn select_questions<R: Rng>(
    mut pool: Vec<GameQuestion>,
    count: usize,
    rng: &mut R,
) -> Vec<GameQuestion> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Feedback tiers for the end-of-game summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultTier {
    /// Below 50% correct.
    NeedsPractice,
    /// 50-79% correct.
    Good,
    /// 80% and above.
    Excellent,
}

impl ResultTier {
    /// Bands an integer percentage into a tier.
    pub fn band(percentage: i32) -> Self {
        if percentage >= 80 {
            ResultTier::Excellent
        } else if percentage >= 50 {
            ResultTier::Good
        } else {
            ResultTier::NeedsPractice
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ResultTier::Excellent => "🎉",
            ResultTier::Good => "👍",
            ResultTier::NeedsPractice => "💪",
        }
    }

    pub fn phrase_thai(&self) -> &'static str {
        match self {
            ResultTier::Excellent => "ยอดเยี่ยม!",
            ResultTier::Good => "ดีมาก!",
            ResultTier::NeedsPractice => "พยายามอีกนิด!",
        }
    }
}

/// End-of-game totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub correct_count: u32,
    pub total: u32,
    pub points_earned: i64,
    pub percentage: i32,
    pub tier: ResultTier,
}

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswer {
    pub correct: bool,
    pub correct_answer: String,
}

/// Where the game stands after an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameProgress {
    /// More questions remain; the cursor has advanced.
    Next,
    /// That was the last question.
    Finished(GameSummary),
}

/// A game in progress: the loaded question list, cursor, and running
/// correct-count. Serializable so sessions survive a shared store.
///
/// Invariant: `index < questions.len()` and `questions` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePlay {
    pub kind: GameKind,
    pub questions: Vec<GameQuestion>,
    pub index: usize,
    pub correct: u32,
}

impl GamePlay {
    /// Starts a game over a non-empty question list; `None` when the bank
    /// produced nothing.
    pub fn new(kind: GameKind, questions: Vec<GameQuestion>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            questions,
            index: 0,
            correct: 0,
        })
    }

    /// The question the learner is currently answering.
    pub fn current(&self) -> &GameQuestion {
        &self.questions[self.index]
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Grades the answer to the current question, advances the cursor, and
    /// reports whether the game finished.
    pub fn answer(&mut self, text: &str) -> (GradedAnswer, GameProgress) {
        let question = &self.questions[self.index];
        let correct = question.grade(text);
        let graded = GradedAnswer {
            correct,
            correct_answer: question.correct_answer_display(),
        };

        if correct {
            self.correct += 1;
        }

        if self.index + 1 >= self.questions.len() {
            let total = self.questions.len() as u32;
            let percentage = ((self.correct as f64 / total as f64) * 100.0).round() as i32;
            let summary = GameSummary {
                correct_count: self.correct,
                total,
                points_earned: self.correct as i64 * points::GAME_CORRECT_ANSWER,
                percentage,
                tier: ResultTier::band(percentage),
            };
            (graded, GameProgress::Finished(summary))
        } else {
            self.index += 1;
            (graded, GameProgress::Next)
        }
    }
}
