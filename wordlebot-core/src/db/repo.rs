//! Database repository layer
//!
//! Provides query and insert operations for attempts and tracked groups.

use crate::error::{Error, Result};
use crate::normalize::encode_detail;
use crate::types::{Attempt, AttemptDetail};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Persistence seam used by ingestion and ranking.
///
/// Attempts are keyed by `(group_id, author_id, puzzle_index)`; a second
/// write for the same key replaces the first.
pub trait AttemptStore {
    /// Insert an attempt, overwriting any existing row with the same identity.
    fn upsert_attempt(&self, attempt: &Attempt) -> Result<()>;

    /// Look up the attempt stored under an identity.
    fn find_attempt(
        &self,
        group_id: &str,
        author_id: &str,
        puzzle_index: u32,
    ) -> Result<Option<Attempt>>;

    /// Store an attempt as the only record of its message.
    ///
    /// Any row from the same `(group_id, message_id)` under a different
    /// identity is deleted in the same transaction as the upsert.
    fn replace_message_attempt(&self, attempt: &Attempt) -> Result<()>;

    /// Look up the attempt recorded from a specific message.
    fn find_attempt_by_message(&self, group_id: &str, message_id: &str)
        -> Result<Option<Attempt>>;

    /// Delete the attempt recorded from a specific message.
    ///
    /// Returns whether a row was removed.
    fn delete_attempt_by_message(&self, group_id: &str, message_id: &str) -> Result<bool>;

    /// All attempts of a group, optionally restricted to one puzzle.
    ///
    /// Ordered by puzzle index (newest first), then post time, then author id.
    fn attempts_for_group(&self, group_id: &str, puzzle_index: Option<u32>)
        -> Result<Vec<Attempt>>;

    /// Start tracking a group. Returns `true` if it was not tracked before.
    fn track_group(&self, group_id: &str) -> Result<bool>;

    /// Whether messages from this group are recorded.
    fn is_tracked_group(&self, group_id: &str) -> Result<bool>;
}

const ATTEMPT_COLUMNS: &str = "group_id, author_id, puzzle_index, message_id, \
     author_display_name, guess_count, max_guesses, success, hard_mode, rows_json, \
     posted_at, score";

fn write_attempt(conn: &Connection, attempt: &Attempt, rows_json: &str) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO attempts (group_id, author_id, puzzle_index, message_id,
                              author_display_name, guess_count, max_guesses, success,
                              hard_mode, rows_json, posted_at, score)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(group_id, author_id, puzzle_index) DO UPDATE SET
            message_id = excluded.message_id,
            author_display_name = excluded.author_display_name,
            guess_count = excluded.guess_count,
            max_guesses = excluded.max_guesses,
            success = excluded.success,
            hard_mode = excluded.hard_mode,
            rows_json = excluded.rows_json,
            posted_at = excluded.posted_at,
            score = excluded.score
        "#,
        params![
            attempt.group_id,
            attempt.author_id,
            attempt.puzzle_index,
            attempt.message_id,
            attempt.author_display_name,
            attempt.guess_count,
            attempt.max_guesses,
            attempt.success,
            attempt.hard_mode,
            rows_json,
            encode_timestamp(&attempt.posted_at),
            attempt.score,
        ],
    )?;
    Ok(())
}

/// Timestamps are stored with a fixed precision so text order matches time order.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn()?;
        super::schema::run_migrations(&conn)
    }

    /// Lock the connection, surfacing a poisoned lock as a store error.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("database connection lock poisoned".to_string()))
    }

    fn row_to_attempt(row: &Row) -> rusqlite::Result<Attempt> {
        let rows_json: String = row.get("rows_json")?;
        let posted_at_str: String = row.get("posted_at")?;

        let rows: AttemptDetail = serde_json::from_str(&rows_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;
        let posted_at = DateTime::parse_from_rfc3339(&posted_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;

        Ok(Attempt {
            group_id: row.get("group_id")?,
            author_id: row.get("author_id")?,
            puzzle_index: row.get("puzzle_index")?,
            message_id: row.get("message_id")?,
            author_display_name: row.get("author_display_name")?,
            guess_count: row.get("guess_count")?,
            max_guesses: row.get("max_guesses")?,
            success: row.get("success")?,
            hard_mode: row.get("hard_mode")?,
            rows,
            posted_at,
            score: row.get("score")?,
        })
    }

    /// Groups currently tracked, in tracking order.
    pub fn tracked_groups(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT group_id FROM tracked_groups ORDER BY tracked_at, group_id")?;
        let groups = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(groups)
    }
}

impl AttemptStore for Database {
    fn upsert_attempt(&self, attempt: &Attempt) -> Result<()> {
        // Serialize before touching the database so a failure writes nothing.
        let rows_json = encode_detail(&attempt.rows)?;

        let conn = self.conn()?;
        write_attempt(&conn, attempt, &rows_json)
    }

    fn find_attempt(
        &self,
        group_id: &str,
        author_id: &str,
        puzzle_index: u32,
    ) -> Result<Option<Attempt>> {
        let conn = self.conn()?;
        let attempt = conn
            .query_row(
                &format!(
                    "SELECT {} FROM attempts \
                     WHERE group_id = ?1 AND author_id = ?2 AND puzzle_index = ?3",
                    ATTEMPT_COLUMNS
                ),
                params![group_id, author_id, puzzle_index],
                Self::row_to_attempt,
            )
            .optional()?;
        Ok(attempt)
    }

    fn replace_message_attempt(&self, attempt: &Attempt) -> Result<()> {
        let rows_json = encode_detail(&attempt.rows)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            DELETE FROM attempts
            WHERE group_id = ?1 AND message_id = ?2
              AND NOT (author_id = ?3 AND puzzle_index = ?4)
            "#,
            params![
                attempt.group_id,
                attempt.message_id,
                attempt.author_id,
                attempt.puzzle_index,
            ],
        )?;
        write_attempt(&tx, attempt, &rows_json)?;
        tx.commit()?;
        Ok(())
    }

    fn find_attempt_by_message(
        &self,
        group_id: &str,
        message_id: &str,
    ) -> Result<Option<Attempt>> {
        let conn = self.conn()?;
        let attempt = conn
            .query_row(
                &format!(
                    "SELECT {} FROM attempts WHERE group_id = ?1 AND message_id = ?2",
                    ATTEMPT_COLUMNS
                ),
                params![group_id, message_id],
                Self::row_to_attempt,
            )
            .optional()?;
        Ok(attempt)
    }

    fn delete_attempt_by_message(&self, group_id: &str, message_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM attempts WHERE group_id = ?1 AND message_id = ?2",
            params![group_id, message_id],
        )?;
        Ok(deleted > 0)
    }

    fn attempts_for_group(
        &self,
        group_id: &str,
        puzzle_index: Option<u32>,
    ) -> Result<Vec<Attempt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM attempts
            WHERE group_id = ?1 AND (?2 IS NULL OR puzzle_index = ?2)
            ORDER BY puzzle_index DESC, posted_at ASC, author_id ASC
            "#,
            ATTEMPT_COLUMNS
        ))?;
        let attempts = stmt
            .query_map(params![group_id, puzzle_index], Self::row_to_attempt)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attempts)
    }

    fn track_group(&self, group_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO tracked_groups (group_id, tracked_at) VALUES (?1, ?2)",
            params![group_id, encode_timestamp(&Utc::now())],
        )?;
        Ok(inserted > 0)
    }

    fn is_tracked_group(&self, group_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let tracked: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tracked_groups WHERE group_id = ?1",
            [group_id],
            |r| r.get(0),
        )?;
        Ok(tracked > 0)
    }
}
