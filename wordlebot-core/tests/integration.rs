//! Integration tests for the wordlebot parse → store → rank pipeline
//!
//! These tests replay `tests/fixtures/wordle-club.jsonl`, a small chat export,
//! through ingestion into a real SQLite database and rank the result.

use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;
use wordlebot_core::config::Config;
use wordlebot_core::scoring::write_strategy;
use wordlebot_core::{
    AttemptStore, Database, GridParser, IngestCoordinator, IngestOutcome, JsonlMessageSource,
    Ranker, ScoringPolicy, SourceMessage,
};

const GROUP: &str = "wordle-club";

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Midday of puzzle 217
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 22, 12, 0, 0).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Database with the fixture export backfilled into it
fn seeded_db(dir: &TempDir) -> Database {
    let db = Database::open(&dir.path().join("data.db")).unwrap();
    db.migrate().unwrap();
    db.track_group(GROUP).unwrap();

    let parser = GridParser::new().unwrap();
    let source = JsonlMessageSource::open(&fixture_path("wordle-club.jsonl")).unwrap();
    let coordinator = IngestCoordinator::new(&parser, &db);
    coordinator.backfill(&source, GROUP, 3).unwrap();
    db
}

// ============================================
// Backfill
// ============================================

#[test]
fn test_backfill_counts_messages_and_attempts() {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&dir.path().join("data.db")).unwrap();
    db.migrate().unwrap();

    let parser = GridParser::new().unwrap();
    let source = JsonlMessageSource::open(&fixture_path("wordle-club.jsonl")).unwrap();
    assert_eq!(source.skipped_lines(), 1);

    let result = IngestCoordinator::new(&parser, &db)
        .backfill(&source, GROUP, 3)
        .unwrap();

    // 1007 has a grid too short for its header
    assert_eq!(result.total_messages, 8);
    assert_eq!(result.attempt_messages, 6);
    assert_eq!(result.pages, 3);

    let stored = db.attempts_for_group(GROUP, None).unwrap();
    assert_eq!(stored.len(), 6);
    assert_eq!(stored[0].puzzle_index, 217);
    assert!(db.attempts_for_group("other-club", None).unwrap().is_empty());
}

#[test]
fn test_backfilled_attempt_fields() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir);

    let ana = db.find_attempt_by_message(GROUP, "1005").unwrap().unwrap();
    assert_eq!(ana.author_id, "u1");
    assert_eq!(ana.puzzle_index, 216);
    assert_eq!(ana.guess_count, 3);
    assert!(ana.hard_mode);
    assert_eq!(ana.rows.len(), 3);

    // Light-theme squares are stored canonically
    let bo = db.find_attempt_by_message(GROUP, "1002").unwrap().unwrap();
    assert!(!bo.success);
    assert_eq!(bo.guess_count, 6);
    assert_eq!(bo.rows.rows()[0], "⬛⬛⬛⬛⬛");
}

// ============================================
// Ranking
// ============================================

#[test]
fn test_rolling_leaderboard() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir);
    let attempts = db.attempts_for_group(GROUP, None).unwrap();

    let board = Ranker::for_policy(ScoringPolicy::Rolling, &Default::default())
        .rank(&attempts, now());

    // cy only played puzzle 150, far outside the window
    assert_eq!(board.len(), 2);

    assert_eq!(board[0].author_id, "u1");
    assert_eq!(board[0].display_name, "ana b");
    assert_eq!(board[0].games_played, 3);
    assert_close(board[0].avg_guess_count, 4.0);
    assert_close(board[0].aggregate_score, 11.0 * 28.0 / 30.0 + 18.0 * 29.0 / 30.0 + 6.0);

    assert_eq!(board[1].author_id, "u2");
    assert_eq!(board[1].games_played, 2);
    assert_close(board[1].avg_guess_count, 4.0);
    assert_close(board[1].aggregate_score, 2.0 * 28.0 / 30.0 + 27.0 * 29.0 / 30.0);
}

#[test]
fn test_lifetime_leaderboard() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir);
    let attempts = db.attempts_for_group(GROUP, None).unwrap();

    let board = Ranker::for_policy(ScoringPolicy::Lifetime, &Default::default())
        .rank(&attempts, now());

    let summary: Vec<(&str, f64)> = board
        .iter()
        .map(|r| (r.author_id.as_str(), r.aggregate_score))
        .collect();
    assert_eq!(summary, [("u1", 9.0), ("u3", 6.0), ("u2", 5.5)]);
}

#[test]
fn test_ranking_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir);
    let attempts = db.attempts_for_group(GROUP, None).unwrap();
    let ranker = Ranker::from_config(&Default::default());

    let first = ranker.rank(&attempts, now());
    let second = ranker.rank(&db.attempts_for_group(GROUP, None).unwrap(), now());
    assert_eq!(first, second);
}

#[test]
fn test_day_standings() {
    let dir = TempDir::new().unwrap();
    let db = seeded_db(&dir);
    let day = db.attempts_for_group(GROUP, Some(216)).unwrap();

    let standings = Ranker::for_policy(ScoringPolicy::Lifetime, &Default::default())
        .day_standings(&day, 216);
    let summary: Vec<(&str, f64)> = standings
        .iter()
        .map(|s| (s.display_name.as_str(), s.score))
        .collect();
    assert_eq!(summary, [("bo", 5.0), ("ana", 4.0)]);
}

// ============================================
// Live events
// ============================================

fn live_message(id: &str, content: &str) -> SourceMessage {
    SourceMessage {
        id: id.to_string(),
        group_id: GROUP.to_string(),
        author_id: "u3".to_string(),
        author_name: "cy".to_string(),
        content: content.to_string(),
        posted_at: Utc.with_ymd_and_hms(2022, 1, 22, 9, 0, 0).unwrap(),
    }
}

#[test]
fn test_live_events_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.db");
    let parser = GridParser::new().unwrap();

    {
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        db.track_group(GROUP).unwrap();
        let coordinator = IngestCoordinator::new(&parser, &db);

        let outcome = coordinator
            .on_message_created(&live_message("3001", "Wordle 217 4/6\n\n⬛⬛⬛⬛🟩\n⬛⬛🟨⬛🟩\n⬛🟩🟩⬛🟩\n🟩🟩🟩🟩🟩"))
            .unwrap();
        assert_eq!(outcome.reaction(), Some("✅"));

        // Edited into a one-guess solve
        let outcome = coordinator
            .on_message_edited(&live_message("3001", "Wordle 217 1/6\n\n🟩🟩🟩🟩🟩"))
            .unwrap();
        assert!(matches!(outcome, IngestOutcome::Saved(ref a) if a.guess_count == 1));
    }

    let db = Database::open(&path).unwrap();
    db.migrate().unwrap();
    assert!(db.is_tracked_group(GROUP).unwrap());
    let stored = db.attempts_for_group(GROUP, Some(217)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].guess_count, 1);

    let coordinator = IngestCoordinator::new(&parser, &db);
    assert_eq!(
        coordinator.on_message_deleted(GROUP, "3001").unwrap(),
        IngestOutcome::Removed
    );
    assert!(db.attempts_for_group(GROUP, None).unwrap().is_empty());
}

#[test]
fn test_configured_write_policy_stores_scores() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[scoring]\nwrite_policy = \"rolling\"\nleaderboard_policy = \"lifetime\"\n",
    )
    .unwrap();
    let config = Config::load_from(&config_path).unwrap();

    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    db.track_group(GROUP).unwrap();
    let parser = GridParser::with_keyword(&config.parser.keyword).unwrap();
    let coordinator =
        IngestCoordinator::new(&parser, &db).with_write_strategy(write_strategy(&config.scoring));

    coordinator
        .on_message_created(&live_message("3002", "Wordle 217 2/6\n\n⬛🟩🟩🟨⬛\n🟩🟩🟩🟩🟩"))
        .unwrap();

    let stored = db.find_attempt_by_message(GROUP, "3002").unwrap().unwrap();
    assert_eq!(stored.score, Some(27.0));
    assert_eq!(
        Ranker::from_config(&config.scoring).policy(),
        ScoringPolicy::Lifetime
    );
}
