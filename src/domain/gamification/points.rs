//! Point awards and the level curve.

/// Points for a submission at least 24 hours before the deadline.
pub const SUBMIT_EARLY: i64 = 15;
/// Points for a submission before the deadline.
pub const SUBMIT_ON_TIME: i64 = 10;
/// Points for a submission after the deadline.
pub const SUBMIT_LATE: i64 = 5;

/// Points for requesting feedback on a draft.
pub const REQUEST_FEEDBACK: i64 = 5;
/// Points for requesting feedback on a revised draft.
pub const REQUEST_FEEDBACK_REVISION: i64 = 7;

/// Points for finishing a practice card.
pub const PRACTICE_COMPLETE: i64 = 3;
/// Points for a perfect practice card.
pub const PRACTICE_PERFECT: i64 = 5;

/// Points per correct game answer.
pub const GAME_CORRECT_ANSWER: i64 = 10;

/// Points for a free-form chat turn (registered users only).
pub const DAILY_CHAT: i64 = 1;

/// Bonus for submitting several weeks in a row.
pub const CONSECUTIVE_WEEK_BONUS: i64 = 20;

/// Cumulative points needed to reach each level; index 0 is level 1.
pub const LEVEL_THRESHOLDS: [i64; 10] = [0, 100, 300, 600, 1000, 1500, 2100, 2800, 3600, 4500];

/// Points per level once the threshold table is exhausted.
const POINTS_PER_EXTRA_LEVEL: i64 = 500;

/// The level reached with `total_points` cumulative points.
///
/// Scans the threshold table from the top; the first entry is 0, so the
/// result is always at least 1.
pub fn calculate_level(total_points: i64) -> i32 {
    for (i, threshold) in LEVEL_THRESHOLDS.iter().enumerate().rev() {
        if total_points >= *threshold {
            return (i + 1) as i32;
        }
    }
    1
}

/// Cumulative points required to leave `current_level`.
///
/// Beyond the table, every further level costs [`POINTS_PER_EXTRA_LEVEL`].
pub fn points_for_next_level(current_level: i32) -> i64 {
    let level = current_level.max(1) as usize;
    let len = LEVEL_THRESHOLDS.len();
    if level >= len {
        LEVEL_THRESHOLDS[len - 1] + (level as i64 - len as i64 + 1) * POINTS_PER_EXTRA_LEVEL
    } else {
        LEVEL_THRESHOLDS[level]
    }
}

/// Integer percentage (0-100, rounded) of the current level band that
/// `total_points` has covered.
pub fn progress_to_next_level(total_points: i64, current_level: i32) -> i32 {
    let level = current_level.max(1) as usize;
    let len = LEVEL_THRESHOLDS.len();

    let current_threshold = if level <= len {
        LEVEL_THRESHOLDS[level - 1]
    } else {
        LEVEL_THRESHOLDS[len - 1] + (level as i64 - len as i64) * POINTS_PER_EXTRA_LEVEL
    };

    let next_threshold = points_for_next_level(current_level);
    let in_level = (total_points - current_threshold) as f64;
    let needed = (next_threshold - current_threshold) as f64;

    (in_level / needed * 100.0).round() as i32
}

/// Short Thai suffix appended to replies that awarded points.
pub fn format_points_message(points: i64, action: &str) -> String {
    if points > 0 {
        format!("+{} แต้ม ({})", points, action)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_points_is_level_one() {
        assert_eq!(calculate_level(0), 1);
    }

    #[test]
    fn thresholds_map_to_expected_levels() {
        assert_eq!(calculate_level(99), 1);
        assert_eq!(calculate_level(100), 2);
        assert_eq!(calculate_level(4500), 10);
        assert_eq!(calculate_level(10_000), 10);
    }

    #[test]
    fn next_level_follows_table_then_extrapolates() {
        assert_eq!(points_for_next_level(1), 100);
        assert_eq!(points_for_next_level(9), 4500);
        // Past the table: +500 per level.
        assert_eq!(points_for_next_level(10), 5000);
        assert_eq!(points_for_next_level(11), 5500);
    }

    #[test]
    fn progress_within_a_band() {
        // Level 2 spans 100..300; 200 points is halfway.
        assert_eq!(progress_to_next_level(200, 2), 50);
        assert_eq!(progress_to_next_level(100, 2), 0);
        assert_eq!(progress_to_next_level(300, 2), 100);
    }

    #[test]
    fn progress_rounds_to_integer() {
        // Level 1 spans 0..100; 33 points -> 33%.
        assert_eq!(progress_to_next_level(33, 1), 33);
        // Level 3 spans 300..600; 400 points -> 33% (rounded).
        assert_eq!(progress_to_next_level(400, 3), 33);
    }

    #[test]
    fn points_message_is_empty_for_zero() {
        assert_eq!(format_points_message(0, "ส่งงาน"), "");
        assert_eq!(format_points_message(10, "ส่งงาน"), "+10 แต้ม (ส่งงาน)");
    }

    proptest! {
        #[test]
        fn level_is_monotonic_in_points(a in 0i64..50_000, b in 0i64..50_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(calculate_level(lo) <= calculate_level(hi));
        }

        #[test]
        fn level_is_at_least_one(points in 0i64..1_000_000) {
            prop_assert!(calculate_level(points) >= 1);
        }
    }
}
