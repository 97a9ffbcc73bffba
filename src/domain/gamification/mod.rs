//! Points, levels, and badges.
//!
//! Pure functions only: everything here maps accumulated statistics to
//! levels, progress percentages, and newly earned badges. Persistence of
//! the results is the caller's job.

pub mod badges;
pub mod points;

pub use badges::{check_earned_badges, BadgeKind, BadgeSpec, UserStats, BADGES};
pub use points::{
    calculate_level, format_points_message, points_for_next_level, progress_to_next_level,
    LEVEL_THRESHOLDS,
};
