//! wordlebot - CLI for the group Wordle leaderboard
//!
//! Tracks groups, imports chat history, and prints leaderboards from the
//! wordlebot database.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/wordlebot/data.db (~/.local/share/wordlebot/data.db)
//! - Logs: $XDG_STATE_HOME/wordlebot/wordlebot.log (~/.local/state/wordlebot/wordlebot.log)
//! - Config: $XDG_CONFIG_HOME/wordlebot/config.toml (~/.config/wordlebot/config.toml)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use wordlebot_core::format::{day_table, leaderboard_table};
use wordlebot_core::scoring::write_strategy;
use wordlebot_core::{
    AttemptStore, Config, Database, GridParser, IngestCoordinator, JsonlMessageSource, Ranker,
    ScoringPolicy,
};

#[derive(Parser)]
#[command(name = "wordlebot")]
#[command(about = "Group leaderboard for pasted Wordle results")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start recording results posted in a group
    Track {
        /// Group (channel) id
        #[arg(short, long)]
        group: String,
    },

    /// Import a group's history from a JSON-lines message export
    Import {
        /// Group (channel) id
        #[arg(short, long)]
        group: String,

        /// Path to the export
        #[arg(short, long)]
        file: PathBuf,

        /// Messages fetched per page
        #[arg(long, default_value = "100")]
        page_size: usize,
    },

    /// Check whether text is a result paste (reads stdin by default)
    Parse {
        /// Read the text from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print a group's leaderboard
    Leaderboard {
        /// Group (channel) id
        #[arg(short, long)]
        group: String,

        /// Scoring policy (defaults to scoring.leaderboard_policy)
        #[arg(short, long)]
        policy: Option<ScoringPolicy>,

        /// Rank as of this RFC 3339 timestamp instead of now
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the standings for a single puzzle
    Day {
        /// Group (channel) id
        #[arg(short, long)]
        group: String,

        /// Puzzle index
        #[arg(long)]
        puzzle: u32,

        /// Scoring policy (defaults to scoring.leaderboard_policy)
        #[arg(short, long)]
        policy: Option<ScoringPolicy>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        wordlebot_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let parser = GridParser::with_keyword(&config.parser.keyword)
        .context("failed to build result parser")?;

    match args.command {
        Command::Parse { file } => run_parse(&parser, file.as_ref()),
        command => run_with_database(command, &config, &parser),
    }
}

fn run_with_database(command: Command, config: &Config, parser: &GridParser) -> Result<()> {
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    match command {
        Command::Track { group } => {
            if db.track_group(&group)? {
                println!("Now tracking group {}", group);
            } else {
                println!("Group {} is already tracked", group);
            }
        }
        Command::Import {
            group,
            file,
            page_size,
        } => {
            let source = JsonlMessageSource::open(&file)
                .with_context(|| format!("failed to read export {}", file.display()))?;
            db.track_group(&group)?;

            let coordinator = IngestCoordinator::new(parser, &db)
                .with_write_strategy(write_strategy(&config.scoring));
            let result = coordinator
                .backfill(&source, &group, page_size)
                .context("import failed")?;

            println!("Import complete:");
            println!("  Messages read:     {}", result.total_messages);
            println!("  Results saved:     {}", result.attempt_messages);
            if source.skipped_lines() > 0 {
                println!("  Lines skipped:     {}", source.skipped_lines());
            }
        }
        Command::Leaderboard {
            group,
            policy,
            now,
            format,
        } => {
            let ranker = ranker_for(policy, config);
            let attempts = db.attempts_for_group(&group, None)?;
            let rows = ranker.rank(&attempts, now.unwrap_or_else(Utc::now));

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
                OutputFormat::Text if rows.is_empty() => {
                    println!("No results for group {}", group)
                }
                OutputFormat::Text => {
                    println!("Leaderboard ({})", ranker.policy());
                    print!("{}", leaderboard_table(&rows));
                }
            }
        }
        Command::Day {
            group,
            puzzle,
            policy,
            format,
        } => {
            let ranker = ranker_for(policy, config);
            let attempts = db.attempts_for_group(&group, Some(puzzle))?;
            let standings = ranker.day_standings(&attempts, puzzle);

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&standings)?),
                OutputFormat::Text if standings.is_empty() => {
                    println!("No results for puzzle {}", puzzle)
                }
                OutputFormat::Text => print!("{}", day_table(puzzle, &standings)),
            }
        }
        Command::Parse { file } => run_parse(parser, file.as_ref())?,
    }

    Ok(())
}

fn ranker_for(policy: Option<ScoringPolicy>, config: &Config) -> Ranker {
    match policy {
        Some(policy) => Ranker::for_policy(policy, &config.scoring),
        None => Ranker::from_config(&config.scoring),
    }
}

fn run_parse(parser: &GridParser, file: Option<&PathBuf>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    match parser.parse_detailed(&text) {
        Ok(parsed) => println!("{}", serde_json::to_string_pretty(&parsed)?),
        Err(rejection) => println!("not a result: {}", rejection),
    }
    Ok(())
}
