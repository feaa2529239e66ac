//! Attempt normalization
//!
//! Turns parser output plus message metadata into the canonical [`Attempt`]
//! record, and encodes row detail for storage.

use crate::error::Result;
use crate::types::{Attempt, AttemptDetail, Authorship, ParsedPaste};
use chrono::{DateTime, Utc};

/// Build the canonical record for a parsed paste.
///
/// The score is left empty; a write policy may fill it in afterwards.
pub fn normalize(parsed: ParsedPaste, authorship: Authorship, posted_at: DateTime<Utc>) -> Attempt {
    let header = parsed.header;
    Attempt {
        group_id: authorship.group_id,
        author_id: authorship.author_id,
        puzzle_index: header.puzzle_index,
        message_id: authorship.message_id,
        author_display_name: authorship.author_display_name,
        guess_count: header.guess_count(),
        max_guesses: header.max_guesses,
        success: header.success(),
        hard_mode: header.hard_mode,
        rows: parsed.detail,
        posted_at,
        score: None,
    }
}

/// Encode row detail as a JSON array of row strings.
pub fn encode_detail(detail: &AttemptDetail) -> Result<String> {
    Ok(serde_json::to_string(detail)?)
}

/// Decode row detail produced by [`encode_detail`].
pub fn decode_detail(encoded: &str) -> Result<AttemptDetail> {
    Ok(serde_json::from_str(encoded)?)
}
