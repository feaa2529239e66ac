//! Core domain types for wordlebot
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Group** | Scoping unit (e.g. a chat channel); attempts and leaderboards never cross groups |
//! | **Puzzle index** | Which day's puzzle an attempt pertains to |
//! | **Attempt** | One user's result for one puzzle in one group |
//! | **Hard mode** | Stricter play variant, flagged with `*` in the header |
//! | **Recency window** | Trailing span of puzzle indices used by rolling scoring |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Grid glyphs
// ============================================

/// One cell of a result grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    /// Right letter, right spot (🟩)
    Correct,
    /// Right letter, wrong spot (🟨)
    Present,
    /// Letter not in the word (⬛ or ⬜ depending on the sharer's theme)
    Absent,
}

impl Glyph {
    /// Canonical emoji for this glyph. Absent always renders as ⬛.
    pub fn as_char(&self) -> char {
        match self {
            Glyph::Correct => '🟩',
            Glyph::Present => '🟨',
            Glyph::Absent => '⬛',
        }
    }

    /// Recognize a wire glyph. Both the dark and light absent squares map to
    /// [`Glyph::Absent`].
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '🟩' => Some(Glyph::Correct),
            '🟨' => Some(Glyph::Present),
            '⬛' | '⬜' => Some(Glyph::Absent),
            _ => None,
        }
    }
}

/// Number of glyphs in every grid row.
pub const ROW_WIDTH: usize = 5;

// ============================================
// Parser output
// ============================================

/// Guess count as printed in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "guesses", rename_all = "snake_case")]
pub enum Guesses {
    /// Solved in this many guesses
    Solved(u32),
    /// Failure marker (`X`)
    Failed,
}

/// Fields extracted from the header line, e.g. `Wordle 217 3/6*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedHeader {
    pub puzzle_index: u32,
    pub guesses: Guesses,
    pub max_guesses: u32,
    pub hard_mode: bool,
}

impl ParsedHeader {
    /// Whether the puzzle was solved.
    pub fn success(&self) -> bool {
        matches!(self.guesses, Guesses::Solved(_))
    }

    /// Resolved guess count: the parsed digit, or `max_guesses` for a loss.
    pub fn guess_count(&self) -> u32 {
        match self.guesses {
            Guesses::Solved(n) => n,
            Guesses::Failed => self.max_guesses,
        }
    }

    /// Number of grid rows the body must contain.
    pub fn expected_rows(&self) -> usize {
        self.guess_count() as usize
    }
}

/// Ordered grid rows of an attempt, each holding exactly [`ROW_WIDTH`]
/// canonical glyphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptDetail {
    rows: Vec<String>,
}

impl AttemptDetail {
    /// Build from rows of glyphs, rendering each row canonically.
    pub fn from_glyph_rows(rows: &[Vec<Glyph>]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(Glyph::as_char).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode the rows back into glyphs. Unknown characters are skipped.
    pub fn glyph_rows(&self) -> Vec<Vec<Glyph>> {
        self.rows
            .iter()
            .map(|row| row.chars().filter_map(Glyph::from_char).collect())
            .collect()
    }
}

/// A paste that passed every check of the grid parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPaste {
    pub header: ParsedHeader,
    pub detail: AttemptDetail,
}

impl ParsedPaste {
    pub fn puzzle_index(&self) -> u32 {
        self.header.puzzle_index
    }

    pub fn guess_count(&self) -> u32 {
        self.header.guess_count()
    }

    pub fn max_guesses(&self) -> u32 {
        self.header.max_guesses
    }

    pub fn success(&self) -> bool {
        self.header.success()
    }

    pub fn hard_mode(&self) -> bool {
        self.header.hard_mode
    }
}

// ============================================
// Canonical attempt
// ============================================

/// Who posted a paste, and where. Supplied by the message source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorship {
    pub group_id: String,
    pub author_id: String,
    pub author_display_name: String,
    pub message_id: String,
}

/// Canonical, persisted record of one user's result for one puzzle.
///
/// Identity is `(group_id, author_id, puzzle_index)`. `(group_id, message_id)`
/// locates the record when its source message is edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub group_id: String,
    pub author_id: String,
    pub puzzle_index: u32,
    pub message_id: String,
    pub author_display_name: String,
    pub guess_count: u32,
    pub max_guesses: u32,
    pub success: bool,
    pub hard_mode: bool,
    pub rows: AttemptDetail,
    pub posted_at: DateTime<Utc>,
    /// Score stored at write time, if a write policy is configured
    pub score: Option<f64>,
}

// ============================================
// Leaderboard projections
// ============================================

/// One ranked line of a group leaderboard. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub author_id: String,
    pub display_name: String,
    pub aggregate_score: f64,
    pub avg_guess_count: f64,
    pub games_played: usize,
}

/// One user's score for a single puzzle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStanding {
    pub author_id: String,
    pub display_name: String,
    pub score: f64,
}

// ============================================
// Message source records
// ============================================

/// A chat message as supplied by a [`MessageSource`](crate::ingest::MessageSource).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: String,
    pub group_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub posted_at: DateTime<Utc>,
}

impl SourceMessage {
    /// Authorship fields for the normalizer.
    pub fn authorship(&self) -> Authorship {
        Authorship {
            group_id: self.group_id.clone(),
            author_id: self.author_id.clone(),
            author_display_name: self.author_name.clone(),
            message_id: self.id.clone(),
        }
    }
}
