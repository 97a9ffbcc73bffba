//! Achievement badges and the statistics they watch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Badge identifiers. Each learner can hold each badge at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeKind {
    CuriousLearner,
    DiligentWriter,
    EarlyBird,
    VocabMaster100,
    Improver,
    PracticeChampion,
    PerfectScore,
}

impl BadgeKind {
    /// Database/storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeKind::CuriousLearner => "CURIOUS_LEARNER",
            BadgeKind::DiligentWriter => "DILIGENT_WRITER",
            BadgeKind::EarlyBird => "EARLY_BIRD",
            BadgeKind::VocabMaster100 => "VOCAB_MASTER_100",
            BadgeKind::Improver => "IMPROVER",
            BadgeKind::PracticeChampion => "PRACTICE_CHAMPION",
            BadgeKind::PerfectScore => "PERFECT_SCORE",
        }
    }

    /// Parses a storage tag back into a badge kind.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "CURIOUS_LEARNER" => Some(BadgeKind::CuriousLearner),
            "DILIGENT_WRITER" => Some(BadgeKind::DiligentWriter),
            "EARLY_BIRD" => Some(BadgeKind::EarlyBird),
            "VOCAB_MASTER_100" => Some(BadgeKind::VocabMaster100),
            "IMPROVER" => Some(BadgeKind::Improver),
            "PRACTICE_CHAMPION" => Some(BadgeKind::PracticeChampion),
            "PERFECT_SCORE" => Some(BadgeKind::PerfectScore),
            _ => None,
        }
    }
}

/// The user statistic a badge requirement is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    FeedbackCount,
    ConsecutiveWeeks,
    EarlySubmissions,
    VocabularyCount,
    ImprovementStreak,
    PracticeCount,
    PerfectSubmission,
}

/// A badge definition: display names, the stat it watches, and the
/// threshold that earns it.
#[derive(Debug, Clone, Copy)]
pub struct BadgeSpec {
    pub kind: BadgeKind,
    pub name: &'static str,
    pub name_thai: &'static str,
    pub description: &'static str,
    pub requirement: i64,
    pub check_field: StatField,
}

/// All badge definitions, in award-display order.
pub const BADGES: [BadgeSpec; 7] = [
    BadgeSpec {
        kind: BadgeKind::CuriousLearner,
        name: "Curious Learner",
        name_thai: "ผู้ใฝ่รู้",
        description: "Request feedback 10 times",
        requirement: 10,
        check_field: StatField::FeedbackCount,
    },
    BadgeSpec {
        kind: BadgeKind::DiligentWriter,
        name: "Diligent Writer",
        name_thai: "นักเขียนขยัน",
        description: "Submit 4 consecutive weeks",
        requirement: 4,
        check_field: StatField::ConsecutiveWeeks,
    },
    BadgeSpec {
        kind: BadgeKind::EarlyBird,
        name: "Early Bird",
        name_thai: "ส่งไว",
        description: "Submit early 3 times",
        requirement: 3,
        check_field: StatField::EarlySubmissions,
    },
    BadgeSpec {
        kind: BadgeKind::VocabMaster100,
        name: "Vocabulary Master",
        name_thai: "คำศัพท์ 100",
        description: "Learn 100 vocabulary words",
        requirement: 100,
        check_field: StatField::VocabularyCount,
    },
    BadgeSpec {
        kind: BadgeKind::Improver,
        name: "Fast Improver",
        name_thai: "นักพัฒนา",
        description: "Improve scores 3 times in a row",
        requirement: 3,
        check_field: StatField::ImprovementStreak,
    },
    BadgeSpec {
        kind: BadgeKind::PracticeChampion,
        name: "Practice Champion",
        name_thai: "แชมป์ฝึกฝน",
        description: "Complete 50 practice sessions",
        requirement: 50,
        check_field: StatField::PracticeCount,
    },
    BadgeSpec {
        kind: BadgeKind::PerfectScore,
        name: "Perfect Score",
        name_thai: "คะแนนเต็ม",
        description: "Get a perfect submission score",
        requirement: 1,
        check_field: StatField::PerfectSubmission,
    },
];

/// Looks up the definition for a badge kind.
pub fn badge_spec(kind: BadgeKind) -> &'static BadgeSpec {
    BADGES
        .iter()
        .find(|spec| spec.kind == kind)
        .expect("every BadgeKind has a spec")
}

/// Accumulated statistics a badge check runs against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserStats {
    pub feedback_count: i64,
    pub consecutive_weeks: i64,
    pub early_submissions: i64,
    pub vocabulary_count: i64,
    pub improvement_streak: i64,
    pub practice_count: i64,
    pub perfect_submission: bool,
}

impl UserStats {
    fn value_of(&self, field: StatField) -> i64 {
        match field {
            StatField::FeedbackCount => self.feedback_count,
            StatField::ConsecutiveWeeks => self.consecutive_weeks,
            StatField::EarlySubmissions => self.early_submissions,
            StatField::VocabularyCount => self.vocabulary_count,
            StatField::ImprovementStreak => self.improvement_streak,
            StatField::PracticeCount => self.practice_count,
            StatField::PerfectSubmission => i64::from(self.perfect_submission),
        }
    }
}

/// Returns the badges newly qualified for by `stats`, skipping any already
/// in `earned`.
///
/// Idempotent given the same inputs: the caller must persist the returned
/// kinds into `earned` before re-invoking, after which a second call with
/// unchanged stats returns nothing.
pub fn check_earned_badges(stats: &UserStats, earned: &HashSet<BadgeKind>) -> Vec<BadgeKind> {
    BADGES
        .iter()
        .filter(|spec| !earned.contains(&spec.kind))
        .filter(|spec| stats.value_of(spec.check_field) >= spec.requirement)
        .map(|spec| spec.kind)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stats_earns_nothing() {
        let earned = HashSet::new();
        assert!(check_earned_badges(&UserStats::default(), &earned).is_empty());
    }

    #[test]
    fn threshold_crossing_earns_badge() {
        let stats = UserStats {
            feedback_count: 10,
            ..UserStats::default()
        };
        let earned = HashSet::new();
        assert_eq!(
            check_earned_badges(&stats, &earned),
            vec![BadgeKind::CuriousLearner]
        );
    }

    #[test]
    fn below_threshold_earns_nothing() {
        let stats = UserStats {
            feedback_count: 9,
            early_submissions: 2,
            ..UserStats::default()
        };
        let earned = HashSet::new();
        assert!(check_earned_badges(&stats, &earned).is_empty());
    }

    #[test]
    fn perfect_submission_is_checked_for_truthiness() {
        let stats = UserStats {
            perfect_submission: true,
            ..UserStats::default()
        };
        let earned = HashSet::new();
        assert_eq!(
            check_earned_badges(&stats, &earned),
            vec![BadgeKind::PerfectScore]
        );
    }

    #[test]
    fn check_is_idempotent_once_earned_set_is_updated() {
        let stats = UserStats {
            feedback_count: 12,
            early_submissions: 3,
            ..UserStats::default()
        };
        let mut earned = HashSet::new();

        let first = check_earned_badges(&stats, &earned);
        assert_eq!(first.len(), 2);
        earned.extend(first);

        let second = check_earned_badges(&stats, &earned);
        assert!(second.is_empty());
    }

    #[test]
    fn tags_round_trip() {
        for spec in &BADGES {
            assert_eq!(BadgeKind::parse(spec.kind.as_str()), Some(spec.kind));
        }
        assert_eq!(BadgeKind::parse("UNKNOWN"), None);
    }
}
