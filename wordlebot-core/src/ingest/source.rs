//! Message sources for history backfill.

use crate::error::{Error, Result};
use crate::format::sanitize_message;
use crate::types::SourceMessage;
use std::io::BufRead;
use std::path::Path;

/// A paged, read-only view of a group's message history.
pub trait MessageSource {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Fetch up to `limit` messages of `group_id`, newest first.
    ///
    /// With `before` set, only messages older than that message id are
    /// returned. An empty page means history is exhausted.
    fn fetch_page(
        &self,
        group_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SourceMessage>>;
}

/// Message history exported as JSON lines, one [`SourceMessage`] per line.
///
/// ```text
/// {"id":"m1","group_id":"c1","author_id":"u1","author_name":"ana","content":"...","posted_at":"2022-01-22T08:00:00Z"}
/// ```
#[derive(Debug, Default)]
pub struct JsonlMessageSource {
    name: String,
    /// Sorted newest first
    messages: Vec<SourceMessage>,
    skipped_lines: usize,
}

impl JsonlMessageSource {
    /// Load an export from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(
            path.display().to_string(),
            std::io::BufReader::new(file),
        )
    }

    /// Load an export from any buffered reader.
    ///
    /// Blank lines are ignored; lines that are not valid messages are
    /// skipped with a warning.
    pub fn from_reader<R: BufRead>(name: impl Into<String>, reader: R) -> Result<Self> {
        let name = name.into();
        let mut messages = Vec::new();
        let mut skipped_lines = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SourceMessage>(&line) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    skipped_lines += 1;
                    tracing::warn!(
                        source = %name,
                        line = line_no + 1,
                        error = %e,
                        text = %sanitize_message(&line),
                        "Skipping malformed message line"
                    );
                }
            }
        }

        // Newest first; ties keep a stable order by id
        messages.sort_by(|a, b| {
            b.posted_at
                .cmp(&a.posted_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        tracing::debug!(
            source = %name,
            messages = messages.len(),
            skipped_lines,
            "Loaded message export"
        );

        Ok(Self {
            name,
            messages,
            skipped_lines,
        })
    }

    /// Number of lines that could not be read as messages.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Number of messages loaded across all groups.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageSource for JsonlMessageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_page(
        &self,
        group_id: &str,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SourceMessage>> {
        let mut history = self.messages.iter().filter(|m| m.group_id == group_id);

        if let Some(cursor) = before {
            if !history.any(|m| m.id == cursor) {
                return Err(Error::MessageSource {
                    source_name: self.name.clone(),
                    message: format!("unknown message id {} in group {}", cursor, group_id),
                });
            }
        }

        Ok(history.take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r#"{"id":"m1","group_id":"c1","author_id":"u1","author_name":"ana","content":"hello","posted_at":"2022-01-20T08:00:00Z"}
{"id":"m2","group_id":"c1","author_id":"u2","author_name":"bo","content":"hi","posted_at":"2022-01-21T08:00:00Z"}
this is not json

{"id":"m3","group_id":"c2","author_id":"u1","author_name":"ana","content":"elsewhere","posted_at":"2022-01-21T09:00:00Z"}
{"id":"m4","group_id":"c1","author_id":"u1","author_name":"ana","content":"again","posted_at":"2022-01-22T08:00:00Z"}
"#;

    fn source() -> JsonlMessageSource {
        JsonlMessageSource::from_reader("export", EXPORT.as_bytes()).unwrap()
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let source = source();
        assert_eq!(source.len(), 4);
        assert_eq!(source.skipped_lines(), 1);
    }

    #[test]
    fn test_pages_newest_first_within_group() {
        let source = source();

        let first = source.fetch_page("c1", None, 2).unwrap();
        let ids: Vec<&str> = first.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m4", "m2"]);

        let second = source.fetch_page("c1", Some("m2"), 2).unwrap();
        let ids: Vec<&str> = second.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1"]);

        assert!(source.fetch_page("c1", Some("m1"), 2).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_cursor_is_an_error() {
        let source = source();
        let err = source.fetch_page("c1", Some("m3"), 10).unwrap_err();
        assert!(matches!(err, Error::MessageSource { .. }));
    }
}
