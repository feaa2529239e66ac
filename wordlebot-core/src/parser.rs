//! Grid parser for pasted puzzle results
//!
//! Recognizes blocks like:
//!
//! ```text
//! Wordle 217 3/6*
//!
//! ⬛⬛⬛🟩🟩
//! ⬛⬛🟨🟩🟩
//! 🟩🟩🟩🟩🟩
//! ```
//!
//! anywhere inside a larger message. Most chat messages are not results, so a
//! non-match is reported as a [`Rejection`] value rather than an error.
//!
//! The header pattern is compiled once per [`GridParser`]. A parser holds no
//! mutable state and can be shared across threads by reference.

use crate::error::Result;
use crate::types::{AttemptDetail, Glyph, Guesses, ParsedHeader, ParsedPaste, ROW_WIDTH};
use regex::{Captures, Regex};
use std::fmt;

/// Keyword the upstream game prints at the start of the header.
pub const DEFAULT_KEYWORD: &str = "Wordle";

/// Largest guess digit accepted in a header.
const MAX_GUESS_DIGIT: u32 = 6;

/// Emoji presentation selector some clients append after a square.
const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Why a piece of text was not accepted as a result block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No `keyword index guesses/max` header followed by a blank line
    NoHeader,
    /// Header matched the shape but its numbers are out of range
    InvalidHeader(&'static str),
    /// A grid row does not hold exactly five glyphs
    RowWidth { row: usize, glyphs: usize },
    /// Grid height disagrees with the header
    RowCount { expected: usize, found: usize },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoHeader => write!(f, "no result header"),
            Rejection::InvalidHeader(reason) => write!(f, "invalid header: {}", reason),
            Rejection::RowWidth { row, glyphs } => {
                write!(f, "row {} has {} glyphs, expected {}", row + 1, glyphs, ROW_WIDTH)
            }
            Rejection::RowCount { expected, found } => {
                write!(f, "grid has {} rows, header implies {}", found, expected)
            }
        }
    }
}

/// Stateless recognizer for pasted result blocks.
#[derive(Debug, Clone)]
pub struct GridParser {
    header: Regex,
}

impl GridParser {
    /// Create a parser for the default `Wordle` keyword.
    pub fn new() -> Result<Self> {
        Self::with_keyword(DEFAULT_KEYWORD)
    }

    /// Create a parser for a custom header keyword (matched case-insensitively).
    pub fn with_keyword(keyword: &str) -> Result<Self> {
        let pattern = format!(
            r"(?i)\b{}[ \t]+(\d{{1,3}}(?:[,.]\d{{3}})+|\d+)[ \t]+(\d+|x)/(\d+)(\*)?[ \t]*\r?\n[ \t]*\r?\n",
            regex::escape(keyword)
        );
        Ok(Self {
            header: Regex::new(&pattern)?,
        })
    }

    /// Parse a paste, returning `None` for anything that is not a complete,
    /// valid result block.
    pub fn parse(&self, text: &str) -> Option<ParsedPaste> {
        self.parse_detailed(text).ok()
    }

    /// Parse a paste, explaining why it was rejected.
    ///
    /// Every header in the text is tried in order and the first complete
    /// block wins. When none validates, the rejection of the first header
    /// is reported.
    pub fn parse_detailed(&self, text: &str) -> std::result::Result<ParsedPaste, Rejection> {
        let mut first_rejection = None;

        for caps in self.header.captures_iter(text) {
            match block_from_captures(text, &caps) {
                Ok(parsed) => return Ok(parsed),
                Err(rejection) => {
                    first_rejection.get_or_insert(rejection);
                }
            }
        }

        Err(first_rejection.unwrap_or(Rejection::NoHeader))
    }
}

/// Validate the header in `caps` and the grid that follows it.
fn block_from_captures(
    text: &str,
    caps: &Captures<'_>,
) -> std::result::Result<ParsedPaste, Rejection> {
    let header = header_from_captures(caps)?;

    let body_start = caps.get(0).map(|m| m.end()).unwrap_or(text.len());
    let rows = grid_rows(&text[body_start..]);

    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ROW_WIDTH) {
        return Err(Rejection::RowWidth {
            row: i,
            glyphs: row.len(),
        });
    }

    let expected = header.expected_rows();
    if rows.len() != expected {
        return Err(Rejection::RowCount {
            expected,
            found: rows.len(),
        });
    }

    Ok(ParsedPaste {
        header,
        detail: AttemptDetail::from_glyph_rows(&rows),
    })
}

fn header_from_captures(caps: &Captures<'_>) -> std::result::Result<ParsedHeader, Rejection> {
    let index_str: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    let puzzle_index = index_str
        .parse::<u32>()
        .map_err(|_| Rejection::InvalidHeader("puzzle index out of range"))?;

    let max_guesses = caps[3]
        .parse::<u32>()
        .map_err(|_| Rejection::InvalidHeader("max guesses out of range"))?;
    if max_guesses == 0 {
        return Err(Rejection::InvalidHeader("max guesses must be positive"));
    }

    let guesses = if caps[2].eq_ignore_ascii_case("x") {
        Guesses::Failed
    } else {
        let n = caps[2]
            .parse::<u32>()
            .map_err(|_| Rejection::InvalidHeader("guess count out of range"))?;
        if !(1..=MAX_GUESS_DIGIT).contains(&n) {
            return Err(Rejection::InvalidHeader("guess count out of range"));
        }
        if n > max_guesses {
            return Err(Rejection::InvalidHeader("guess count exceeds max guesses"));
        }
        Guesses::Solved(n)
    };

    Ok(ParsedHeader {
        puzzle_index,
        guesses,
        max_guesses,
        hard_mode: caps.get(4).is_some(),
    })
}

/// Collect the consecutive glyph-only lines at the start of `body`.
///
/// Rows keep whatever width they have; width is checked by the caller so a
/// short or long row rejects the whole block instead of ending it early.
fn grid_rows(body: &str) -> Vec<Vec<Glyph>> {
    let mut rows = Vec::new();
    for line in body.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let cells: Option<Vec<Glyph>> = line
            .chars()
            .filter(|c| *c != VARIATION_SELECTOR)
            .map(Glyph::from_char)
            .collect();
        match cells {
            Some(cells) if !cells.is_empty() => rows.push(cells),
            _ => break,
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> GridParser {
        GridParser::new().expect("default pattern compiles")
    }

    #[test]
    fn test_parse_won_game() {
        let paste = "Wordle 217 3/6\n\n⬛⬛⬛🟩🟩\n⬛⬛🟨🟩🟩\n🟩🟩🟩🟩🟩";
        let parsed = parser().parse(paste).expect("valid paste");

        assert_eq!(parsed.puzzle_index(), 217);
        assert_eq!(parsed.max_guesses(), 6);
        assert_eq!(parsed.guess_count(), 3);
        assert!(parsed.success());
        assert!(!parsed.hard_mode());
        assert_eq!(
            parsed.detail.rows(),
            ["⬛⬛⬛🟩🟩", "⬛⬛🟨🟩🟩", "🟩🟩🟩🟩🟩"]
        );
    }

    #[test]
    fn test_parse_failed_game_needs_six_rows() {
        let rows = "⬛⬛⬛⬛⬛\n⬛🟨⬛🟨⬛\n🟩🟩🟩⬛⬛\n🟩🟩🟩⬛⬛\n🟩🟩🟩⬛⬛\n🟩🟩🟩⬛⬛";
        let paste = format!("Wordle 219 X/6\n\n{}", rows);
        let parsed = parser().parse(&paste).expect("valid failed paste");
        assert!(!parsed.success());
        assert_eq!(parsed.guess_count(), 6);
        assert_eq!(parsed.detail.len(), 6);

        let short = "Wordle 219 X/6\n\n⬛⬛⬛⬛⬛\n🟩🟩🟩⬛⬛";
        assert_eq!(
            parser().parse_detailed(short),
            Err(Rejection::RowCount {
                expected: 6,
                found: 2
            })
        );
    }

    #[test]
    fn test_parse_with_surrounding_text() {
        let paste = "Bot, be good\nWordle 219 4/6\n\n⬛⬛⬛⬛⬛\n⬛🟨⬛🟨⬛\n🟩🟩🟩⬛⬛\n🟩🟩🟩🟩🟩\nBot, be good";
        let parsed = parser().parse(paste).expect("valid paste");
        assert_eq!(parsed.puzzle_index(), 219);
        assert_eq!(parsed.guess_count(), 4);
        assert_eq!(parsed.detail.len(), 4);
    }

    #[test]
    fn test_trailing_newline_and_crlf() {
        let paste = "Wordle 300 2/6\r\n\r\n🟨⬛⬛🟩⬛\r\n🟩🟩🟩🟩🟩\r\n";
        let parsed = parser().parse(paste).expect("valid paste");
        assert_eq!(parsed.detail.len(), 2);
        assert_eq!(parsed.detail.rows()[1], "🟩🟩🟩🟩🟩");
    }

    #[test]
    fn test_short_row_rejects_whole_block() {
        let paste = "Wordle 219 X/6\n\n⬛⬛⬛⬛⬛\n⬛🟨⬛🟨⬛\n🟩🟩🟩⬛\n🟩🟩🟩⬛⬛\n🟩🟩🟩⬛⬛\n🟩🟩🟩⬛⬛";
        assert_eq!(
            parser().parse_detailed(paste),
            Err(Rejection::RowWidth { row: 2, glyphs: 4 })
        );
        assert!(parser().parse(paste).is_none());
    }

    #[test]
    fn test_long_row_rejects_even_when_count_matches() {
        let paste = "Wordle 219 2/6\n\n⬛⬛⬛⬛⬛🟩\n🟩🟩🟩🟩🟩";
        assert_eq!(
            parser().parse_detailed(paste),
            Err(Rejection::RowWidth { row: 0, glyphs: 6 })
        );
    }

    #[test]
    fn test_missing_rows_rejected() {
        let paste = "Wordle 219 4/6\n\n⬛⬛⬛⬛⬛\n⬛🟨⬛🟨⬛\n🟩🟩🟩🟩🟩";
        assert!(parser().parse(paste).is_none());
    }

    #[test]
    fn test_absent_renderings_normalize_identically() {
        let dark = parser()
            .parse("Wordle 5 2/6\n\n⬛🟨⬛⬛⬛\n🟩🟩🟩🟩🟩")
            .unwrap();
        let light = parser()
            .parse("Wordle 5 2/6\n\n⬜🟨⬜⬜⬜\n🟩🟩🟩🟩🟩")
            .unwrap();
        assert_eq!(dark, light);
        assert_eq!(light.detail.rows()[0], "⬛🟨⬛⬛⬛");
    }

    #[test]
    fn test_hard_mode_and_case_insensitive_keyword() {
        let parsed = parser()
            .parse("wordle 42 1/6*\n\n🟩🟩🟩🟩🟩")
            .expect("valid paste");
        assert!(parsed.hard_mode());
        assert_eq!(parsed.guess_count(), 1);

        let lower_x = parser()
            .parse("WORDLE 42 x/6\n\n⬛⬛⬛⬛⬛\n⬛⬛⬛⬛⬛\n⬛⬛⬛⬛⬛\n⬛⬛⬛⬛⬛\n⬛⬛⬛⬛⬛\n⬛⬛⬛⬛⬛");
        assert!(lower_x.is_some_and(|p| !p.success()));
    }

    #[test]
    fn test_thousands_separator_in_index() {
        let parsed = parser()
            .parse("Wordle 1,234 2/6\n\n⬛🟨⬛⬛⬛\n🟩🟩🟩🟩🟩")
            .expect("valid paste");
        assert_eq!(parsed.puzzle_index(), 1234);
    }

    #[test]
    fn test_variation_selectors_ignored() {
        let parsed = parser()
            .parse("Wordle 10 1/6\n\n🟩\u{FE0F}🟩🟩🟩🟩")
            .expect("valid paste");
        assert_eq!(parsed.detail.rows()[0], "🟩🟩🟩🟩🟩");
    }

    #[test]
    fn test_invalid_headers() {
        assert_eq!(
            parser().parse_detailed("just chatting"),
            Err(Rejection::NoHeader)
        );
        assert_eq!(
            parser().parse_detailed("Wordle 217 3/6\n⬛⬛⬛🟩🟩"),
            Err(Rejection::NoHeader)
        );
        assert!(matches!(
            parser().parse_detailed("Wordle 217 7/6\n\n🟩🟩🟩🟩🟩"),
            Err(Rejection::InvalidHeader(_))
        ));
        assert!(matches!(
            parser().parse_detailed("Wordle 217 4/3\n\n🟩🟩🟩🟩🟩"),
            Err(Rejection::InvalidHeader(_))
        ));
        assert!(matches!(
            parser().parse_detailed("Wordle 217 0/6\n\n🟩🟩🟩🟩🟩"),
            Err(Rejection::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_quoted_header_does_not_hide_later_block() {
        let paste = "yesterday I posted Wordle 216 3/6\n\nlol\n\nWordle 217 1/6\n\n🟩🟩🟩🟩🟩";
        let parsed = parser().parse_detailed(paste).expect("second block is valid");
        assert_eq!(parsed.puzzle_index(), 217);
        assert_eq!(parsed.guess_count(), 1);

        let invalid_first = "Wordle 217 9/6\n\nWordle 218 1/6\n\n🟩🟩🟩🟩🟩";
        assert_eq!(parser().parse(invalid_first).map(|p| p.puzzle_index()), Some(218));
    }

    #[test]
    fn test_first_valid_block_wins() {
        let paste = "Wordle 10 1/6\n\n🟩🟩🟩🟩🟩\n\nWordle 11 1/6\n\n🟩🟩🟩🟩🟩";
        assert_eq!(parser().parse(paste).map(|p| p.puzzle_index()), Some(10));
    }

    #[test]
    fn test_reports_first_rejection_when_no_block_validates() {
        let paste = "Wordle 216 3/6\n\nlol\n\nWordle 217 2/6\n\n🟩🟩🟩🟩";
        assert_eq!(
            parser().parse_detailed(paste),
            Err(Rejection::RowCount {
                expected: 3,
                found: 0
            })
        );
    }

    #[test]
    fn test_custom_keyword() {
        let parser = GridParser::with_keyword("Woordle").unwrap();
        assert!(parser.parse("Woordle 3 1/6\n\n🟩🟩🟩🟩🟩").is_some());
        assert!(parser.parse("Wordle 3 1/6\n\n🟩🟩🟩🟩🟩").is_none());
    }

    #[test]
    fn test_parser_is_shareable_across_threads() {
        let parser = std::sync::Arc::new(parser());
        let handles: Vec<_> = (1..=4u32)
            .map(|n| {
                let parser = parser.clone();
                std::thread::spawn(move || {
                    let rows = vec!["🟩🟩🟩🟩🟩"; n as usize].join("\n");
                    parser
                        .parse(&format!("Wordle {} {}/6\n\n{}", n, n, rows))
                        .map(|p| p.guess_count())
                })
            })
            .collect();
        let counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counts, vec![Some(1), Some(2), Some(3), Some(4)]);
    }
}
