//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: attempts
    r#"
    -- One row per (group, author, puzzle); a repost replaces the row
    CREATE TABLE IF NOT EXISTS attempts (
        group_id            TEXT NOT NULL,
        author_id           TEXT NOT NULL,
        puzzle_index        INTEGER NOT NULL,
        message_id          TEXT NOT NULL,
        author_display_name TEXT NOT NULL,
        guess_count         INTEGER NOT NULL,
        max_guesses         INTEGER NOT NULL,
        success             INTEGER NOT NULL,
        hard_mode           INTEGER NOT NULL,
        rows_json           JSON NOT NULL,
        posted_at           DATETIME NOT NULL,
        score               REAL,

        PRIMARY KEY (group_id, author_id, puzzle_index)
    );

    -- Edit/delete lookups arrive by message id
    CREATE INDEX IF NOT EXISTS idx_attempts_message ON attempts(group_id, message_id);
    CREATE INDEX IF NOT EXISTS idx_attempts_day ON attempts(group_id, puzzle_index);
    "#,
    // Version 2: tracked groups
    r#"
    CREATE TABLE IF NOT EXISTS tracked_groups (
        group_id    TEXT PRIMARY KEY,
        tracked_at  DATETIME NOT NULL
    );
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
