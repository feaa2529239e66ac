//! # wordlebot-core
//!
//! Core library for wordlebot, a group leaderboard for pasted Wordle results.
//!
//! This library provides:
//! - A grid parser that recognizes result pastes in free-form chat text
//! - Normalization of parsed pastes into canonical attempts
//! - Pluggable scoring policies and a deterministic leaderboard ranker
//! - SQLite storage for attempts and tracked groups
//! - Configuration management and logging infrastructure
//!
//! ## Data flow
//!
//! ```text
//! message text ─► GridParser ─► normalize ─► AttemptStore
//!                                                 │
//!                 LeaderboardRow ◄─ rank ◄─ ScoringStrategy
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use wordlebot_core::{AttemptStore, Config, Database, GridParser, Ranker};
//!
//! let config = Config::load().expect("failed to load config");
//! let parser = GridParser::with_keyword(&config.parser.keyword).expect("bad keyword");
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let attempts = db.attempts_for_group("channel-1", None).expect("query failed");
//! let board = Ranker::from_config(&config.scoring).rank(&attempts, chrono::Utc::now());
//! # let _ = (parser, board);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::{AttemptStore, Database};
pub use error::{Error, Result};
pub use ingest::{BackfillResult, IngestCoordinator, IngestOutcome, JsonlMessageSource, MessageSource};
pub use leaderboard::{day_standings, rank, Ranker, TieBreak};
pub use normalize::normalize;
pub use parser::{GridParser, Rejection};
pub use scoring::{strategy_for, ScoringPolicy, ScoringStrategy};
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod ingest;
pub mod leaderboard;
pub mod logging;
pub mod normalize;
pub mod parser;
pub mod scoring;
pub mod types;
