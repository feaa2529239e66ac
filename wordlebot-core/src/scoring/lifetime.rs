//! Lifetime scoring: fewer guesses is worth more, every attempt counts.

use super::{ScoringPolicy, ScoringStrategy};
use crate::types::Attempt;
use chrono::{DateTime, Utc};

/// Default score of a lost attempt. Below the lowest winning score (1) so a
/// win always beats a loss, but above zero so playing still counts.
pub const DEFAULT_LOSS_FLOOR: f64 = 0.5;

/// `max_guesses - guess_count + 1` for a win, a fixed floor for a loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifetimeScoring {
    loss_floor: f64,
}

impl LifetimeScoring {
    pub fn new(loss_floor: f64) -> Self {
        Self { loss_floor }
    }

    pub fn loss_floor(&self) -> f64 {
        self.loss_floor
    }
}

impl Default for LifetimeScoring {
    fn default() -> Self {
        Self::new(DEFAULT_LOSS_FLOOR)
    }
}

impl ScoringStrategy for LifetimeScoring {
    fn policy(&self) -> ScoringPolicy {
        ScoringPolicy::Lifetime
    }

    fn base_score(&self, attempt: &Attempt) -> f64 {
        if attempt.success {
            f64::from(attempt.max_guesses) - f64::from(attempt.guess_count) + 1.0
        } else {
            self.loss_floor
        }
    }

    fn weighted_score(&self, attempt: &Attempt, _now: DateTime<Utc>) -> Option<f64> {
        Some(self.base_score(attempt))
    }
}
