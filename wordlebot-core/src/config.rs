//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/wordlebot/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/wordlebot/` (~/.config/wordlebot/)
//! - Data: `$XDG_DATA_HOME/wordlebot/` (~/.local/share/wordlebot/)
//! - State/Logs: `$XDG_STATE_HOME/wordlebot/` (~/.local/state/wordlebot/)

use crate::error::{Error, Result};
use crate::leaderboard::TieBreak;
use crate::parser::DEFAULT_KEYWORD;
use crate::scoring::lifetime::DEFAULT_LOSS_FLOOR;
use crate::scoring::rolling::{default_epoch, DEFAULT_WINDOW_DAYS};
use crate::scoring::ScoringPolicy;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Paste recognition
    #[serde(default)]
    pub parser: ParserConfig,

    /// Scoring and leaderboard knobs
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Paste recognition configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ParserConfig {
    /// Header keyword, matched case-insensitively
    #[serde(default = "default_keyword")]
    pub keyword: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
        }
    }
}

fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}

/// Which score, if any, is stored on new attempts
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Leave the stored score empty
    #[default]
    None,
    Lifetime,
    Rolling,
}

impl WritePolicy {
    /// The scoring policy whose base score gets stored.
    pub fn scoring_policy(&self) -> Option<ScoringPolicy> {
        match self {
            WritePolicy::None => None,
            WritePolicy::Lifetime => Some(ScoringPolicy::Lifetime),
            WritePolicy::Rolling => Some(ScoringPolicy::Rolling),
        }
    }
}

/// Scoring and ranking configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    /// Policy used when ranking a group
    #[serde(default = "default_leaderboard_policy")]
    pub leaderboard_policy: ScoringPolicy,

    /// Policy whose score is stored on new writes
    #[serde(default)]
    pub write_policy: WritePolicy,

    /// Lifetime policy: score of a lost attempt
    #[serde(default = "default_loss_floor")]
    pub loss_floor: f64,

    /// Rolling policy: date of puzzle index 0 (`YYYY-MM-DD`)
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,

    /// Rolling policy: width of the recency window in puzzle indices
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Order of rows with equal scores
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            leaderboard_policy: default_leaderboard_policy(),
            write_policy: WritePolicy::default(),
            loss_floor: default_loss_floor(),
            epoch: default_epoch(),
            window_days: default_window_days(),
            tie_break: TieBreak::default(),
        }
    }
}

impl ScoringConfig {
    /// Validate scoring knobs, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.loss_floor) {
            return Err(Error::Config(
                "scoring.loss_floor must be at least 0 and below 1".to_string(),
            ));
        }
        if self.window_days == 0 {
            return Err(Error::Config(
                "scoring.window_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_leaderboard_policy() -> ScoringPolicy {
    ScoringPolicy::Rolling
}

fn default_loss_floor() -> f64 {
    DEFAULT_LOSS_FLOOR
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if self.parser.keyword.trim().is_empty() {
            return Err(Error::Config("parser.keyword must not be empty".to_string()));
        }
        self.scoring.validate()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/wordlebot/config.toml` (~/.config/wordlebot/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("wordlebot").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/wordlebot/` (~/.local/share/wordlebot/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("wordlebot")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/wordlebot/` (~/.local/state/wordlebot/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("wordlebot")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/wordlebot/data.db` (~/.local/share/wordlebot/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/wordlebot/wordlebot.log` (~/.local/state/wordlebot/wordlebot.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("wordlebot.log")
    }

    /// Fill in unset XDG variables so every path helper agrees on the layout.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
