//! Formatting helpers shared by the ingest path and the CLI.

use crate::types::{DayStanding, LeaderboardRow};

/// Longest message excerpt written to the logs, in characters.
pub const MAX_LOGGED_MESSAGE_CHARS: usize = 1024;

/// Make user-supplied message text safe for a single log line.
///
/// Line breaks are removed and anything past [`MAX_LOGGED_MESSAGE_CHARS`]
/// is cut off and marked with `...`.
pub fn sanitize_message(text: &str) -> String {
    let flat: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    if flat.chars().count() <= MAX_LOGGED_MESSAGE_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(MAX_LOGGED_MESSAGE_CHARS).collect();
    cut.push_str("...");
    cut
}

/// Format a score with two decimals, dropping a trailing `.00`.
pub fn format_score(score: f64) -> String {
    let rendered = format!("{:.2}", score);
    match rendered.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => rendered,
    }
}

/// Render leaderboard rows as an aligned plain-text table.
pub fn leaderboard_table(rows: &[LeaderboardRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());

    let mut out = format!(
        "{:>4}  {:<name_width$}  {:>8}  {:>9}  {:>5}\n",
        "#", "Player", "Score", "Avg", "Games"
    );
    for (i, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>8}  {:>9.2}  {:>5}\n",
            i + 1,
            row.display_name,
            format_score(row.aggregate_score),
            row.avg_guess_count,
            row.games_played
        ));
    }
    out
}

/// Render one puzzle's standings as plain text.
pub fn day_table(puzzle_index: u32, standings: &[DayStanding]) -> String {
    let mut out = format!("Puzzle {}\n", puzzle_index);
    for (i, standing) in standings.iter().enumerate() {
        out.push_str(&format!(
            "{:>4}  {}  {}\n",
            i + 1,
            standing.display_name,
            format_score(standing.score)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_newlines() {
        assert_eq!(
            sanitize_message("Wordle 217 3/6\r\n\n🟩🟩🟩🟩🟩"),
            "Wordle 217 3/6🟩🟩🟩🟩🟩"
        );
    }

    #[test]
    fn test_sanitize_truncates_long_text() {
        let long = "a".repeat(MAX_LOGGED_MESSAGE_CHARS + 10);
        let clean = sanitize_message(&long);
        assert_eq!(clean.len(), MAX_LOGGED_MESSAGE_CHARS + 3);
        assert!(clean.ends_with("..."));

        let exact = "b".repeat(MAX_LOGGED_MESSAGE_CHARS);
        assert_eq!(sanitize_message(&exact), exact);
    }

    #[test]
    fn test_sanitize_counts_chars_not_bytes() {
        let emoji = "🟩".repeat(MAX_LOGGED_MESSAGE_CHARS);
        assert_eq!(sanitize_message(&emoji), emoji);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(4.0), "4");
        assert_eq!(format_score(0.5), "0.50");
        assert_eq!(format_score(17.3333), "17.33");
    }

    #[test]
    fn test_leaderboard_table() {
        let rows = vec![LeaderboardRow {
            author_id: "u1".to_string(),
            display_name: "ana".to_string(),
            aggregate_score: 6.0,
            avg_guess_count: 3.5,
            games_played: 2,
        }];
        let table = leaderboard_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Player"));
        assert!(lines[1].contains("ana"));
        assert!(lines[1].contains("3.50"));
    }
}
