//! Rolling scoring: recent puzzles weigh more, old puzzles drop out.
//!
//! ```text
//! age            = days_since_epoch(now) - puzzle_index
//! included       = age < window_days
//! recency_weight = (window_days - age) / window_days
//! base_value     = success ? (7 - guess_count)^2 + 2 : 2
//! weighted       = recency_weight * base_value
//! ```

use super::{ScoringPolicy, ScoringStrategy};
use crate::types::Attempt;
use chrono::{DateTime, NaiveDate, Utc};

/// Date of puzzle index 0.
pub fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 19).unwrap_or(NaiveDate::MIN)
}

/// Trailing span of puzzle indices that count towards the aggregate.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Points for playing at all, win or lose.
const PARTICIPATION_POINTS: f64 = 2.0;

/// `(SOLVE_PIVOT - guesses)^2` rewards early solves quadratically.
const SOLVE_PIVOT: f64 = 7.0;

/// Recency-weighted scoring over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingScoring {
    epoch: NaiveDate,
    window_days: u32,
}

impl RollingScoring {
    pub fn new(epoch: NaiveDate, window_days: u32) -> Self {
        Self {
            epoch,
            window_days: window_days.max(1),
        }
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Whole days elapsed between midnight UTC of the epoch and `t`, floored.
    pub fn days_since_epoch(&self, t: DateTime<Utc>) -> i64 {
        t.date_naive().signed_duration_since(self.epoch).num_days()
    }

    /// Weight of a puzzle at `now`, or `None` if it falls outside the window.
    pub fn recency_weight(&self, puzzle_index: u32, now: DateTime<Utc>) -> Option<f64> {
        let window = i64::from(self.window_days);
        let age = self.days_since_epoch(now) - i64::from(puzzle_index);
        if age >= window {
            return None;
        }
        Some((window - age) as f64 / window as f64)
    }
}

impl Default for RollingScoring {
    fn default() -> Self {
        Self::new(default_epoch(), DEFAULT_WINDOW_DAYS)
    }
}

impl ScoringStrategy for RollingScoring {
    fn policy(&self) -> ScoringPolicy {
        ScoringPolicy::Rolling
    }

    fn base_score(&self, attempt: &Attempt) -> f64 {
        if attempt.success {
            let margin = SOLVE_PIVOT - f64::from(attempt.guess_count);
            margin * margin + PARTICIPATION_POINTS
        } else {
            PARTICIPATION_POINTS
        }
    }

    fn weighted_score(&self, attempt: &Attempt, now: DateTime<Utc>) -> Option<f64> {
        self.recency_weight(attempt.puzzle_index, now)
            .map(|weight| weight * self.base_score(attempt))
    }
}
