//! Scoring strategies
//!
//! Two policies have been used to score attempts and both remain selectable:
//!
//! - [`LifetimeScoring`]: flat per-attempt score, every attempt counts forever
//! - [`RollingScoring`]: recency-weighted score over a trailing window of
//!   puzzle indices, with older attempts dropped entirely
//!
//! Strategies are pure. Anything time-dependent takes `now` as an argument so
//! callers (and tests) control the clock.

pub mod lifetime;
pub mod rolling;

pub use lifetime::LifetimeScoring;
pub use rolling::RollingScoring;

use crate::config::ScoringConfig;
use crate::types::Attempt;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Named scoring policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    Lifetime,
    Rolling,
}

impl ScoringPolicy {
    /// Returns the identifier used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringPolicy::Lifetime => "lifetime",
            ScoringPolicy::Rolling => "rolling",
        }
    }
}

impl std::fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lifetime" => Ok(ScoringPolicy::Lifetime),
            "rolling" => Ok(ScoringPolicy::Rolling),
            _ => Err(format!("unknown scoring policy: {}", s)),
        }
    }
}

/// Trait implemented by every scoring policy.
///
/// Implementations must be deterministic: identical attempts and an
/// identical `now` always yield bit-identical scores.
pub trait ScoringStrategy: Send + Sync {
    /// Which policy this strategy implements.
    fn policy(&self) -> ScoringPolicy;

    /// Policy name, as used in config files.
    fn name(&self) -> &'static str {
        self.policy().as_str()
    }

    /// Time-independent score of a single attempt.
    ///
    /// Used for single-day standings and for the score stored at write time.
    fn base_score(&self, attempt: &Attempt) -> f64;

    /// Contribution of an attempt to an aggregate computed at `now`.
    ///
    /// `None` means the attempt is excluded from the aggregate altogether,
    /// including from averages and game counts.
    fn weighted_score(&self, attempt: &Attempt, now: DateTime<Utc>) -> Option<f64>;
}

/// Build the strategy for a policy using the configured knobs.
pub fn strategy_for(policy: ScoringPolicy, config: &ScoringConfig) -> Box<dyn ScoringStrategy> {
    match policy {
        ScoringPolicy::Lifetime => Box::new(LifetimeScoring::new(config.loss_floor)),
        ScoringPolicy::Rolling => Box::new(RollingScoring::new(config.epoch, config.window_days)),
    }
}

/// Strategy whose base score is stored on new writes, if any.
pub fn write_strategy(config: &ScoringConfig) -> Option<Box<dyn ScoringStrategy>> {
    config
        .write_policy
        .scoring_policy()
        .map(|policy| strategy_for(policy, config))
}
