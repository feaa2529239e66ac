//! Leaderboard ranking
//!
//! Groups attempts by author, reduces them with a [`ScoringStrategy`] and
//! orders the result. Ranking is a pure function of the attempts and `now`:
//! scores are summed in input order, so repeated calls on the same input are
//! bit-identical.

use crate::config::ScoringConfig;
use crate::scoring::{strategy_for, ScoringPolicy, ScoringStrategy};
use crate::types::{Attempt, DayStanding, LeaderboardRow};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// How rows with equal scores are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which authors first appear in the input
    InputOrder,
    /// Ascending display name, then author id
    #[default]
    DisplayName,
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::InputOrder => "input_order",
            TieBreak::DisplayName => "display_name",
        }
    }

    fn compare(&self, a: (&str, &str), b: (&str, &str)) -> Ordering {
        match self {
            TieBreak::InputOrder => Ordering::Equal,
            TieBreak::DisplayName => a.0.cmp(b.0).then_with(|| a.1.cmp(b.1)),
        }
    }
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input_order" => Ok(TieBreak::InputOrder),
            "display_name" => Ok(TieBreak::DisplayName),
            _ => Err(format!("unknown tie break: {}", s)),
        }
    }
}

/// Running totals for one author.
struct Tally<'a> {
    author_id: &'a str,
    display_name: &'a str,
    latest_post: DateTime<Utc>,
    total_score: f64,
    total_guesses: u64,
    games: usize,
}

/// Rank authors by aggregate score, highest first.
///
/// Attempts the strategy excludes (e.g. outside the rolling window) count
/// toward nothing; an author with only excluded attempts is omitted. Each
/// row's display name is the one on the author's most recent post.
pub fn rank(
    attempts: &[Attempt],
    strategy: &dyn ScoringStrategy,
    now: DateTime<Utc>,
    tie_break: TieBreak,
) -> Vec<LeaderboardRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<Tally<'_>> = Vec::new();

    for attempt in attempts {
        let Some(score) = strategy.weighted_score(attempt, now) else {
            continue;
        };

        let slot = *index.entry(attempt.author_id.as_str()).or_insert_with(|| {
            tallies.push(Tally {
                author_id: &attempt.author_id,
                display_name: &attempt.author_display_name,
                latest_post: attempt.posted_at,
                total_score: 0.0,
                total_guesses: 0,
                games: 0,
            });
            tallies.len() - 1
        });

        let tally = &mut tallies[slot];
        if attempt.posted_at >= tally.latest_post {
            tally.latest_post = attempt.posted_at;
            tally.display_name = &attempt.author_display_name;
        }
        tally.total_score += score;
        tally.total_guesses += u64::from(attempt.guess_count);
        tally.games += 1;
    }

    let mut rows: Vec<LeaderboardRow> = tallies
        .into_iter()
        .map(|t| LeaderboardRow {
            author_id: t.author_id.to_string(),
            display_name: t.display_name.to_string(),
            aggregate_score: t.total_score,
            avg_guess_count: t.total_guesses as f64 / t.games as f64,
            games_played: t.games,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.aggregate_score.total_cmp(&a.aggregate_score).then_with(|| {
            tie_break.compare(
                (a.display_name.as_str(), a.author_id.as_str()),
                (b.display_name.as_str(), b.author_id.as_str()),
            )
        })
    });

    rows
}

/// Standings for a single puzzle, highest score first, no aggregation.
pub fn day_standings(
    attempts: &[Attempt],
    puzzle_index: u32,
    strategy: &dyn ScoringStrategy,
    tie_break: TieBreak,
) -> Vec<DayStanding> {
    let mut standings: Vec<DayStanding> = attempts
        .iter()
        .filter(|a| a.puzzle_index == puzzle_index)
        .map(|a| DayStanding {
            author_id: a.author_id.clone(),
            display_name: a.author_display_name.clone(),
            score: strategy.base_score(a),
        })
        .collect();

    standings.sort_by(|a, b| {
        b.score.total_cmp(&a.score).then_with(|| {
            tie_break.compare(
                (a.display_name.as_str(), a.author_id.as_str()),
                (b.display_name.as_str(), b.author_id.as_str()),
            )
        })
    });

    standings
}

/// A scoring strategy paired with a tie-break rule.
pub struct Ranker {
    strategy: Box<dyn ScoringStrategy>,
    tie_break: TieBreak,
}

impl Ranker {
    pub fn new(strategy: Box<dyn ScoringStrategy>, tie_break: TieBreak) -> Self {
        Self {
            strategy,
            tie_break,
        }
    }

    /// Ranker for `policy` using the configured knobs.
    pub fn for_policy(policy: ScoringPolicy, config: &ScoringConfig) -> Self {
        Self::new(strategy_for(policy, config), config.tie_break)
    }

    /// Ranker for the configured leaderboard policy.
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::for_policy(config.leaderboard_policy, config)
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.strategy.policy()
    }

    pub fn rank(&self, attempts: &[Attempt], now: DateTime<Utc>) -> Vec<LeaderboardRow> {
        rank(attempts, self.strategy.as_ref(), now, self.tie_break)
    }

    pub fn day_standings(&self, attempts: &[Attempt], puzzle_index: u32) -> Vec<DayStanding> {
        day_standings(attempts, puzzle_index, self.strategy.as_ref(), self.tie_break)
    }
}
