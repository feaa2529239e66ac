//! Ingestion layer: chat messages in, stored attempts out
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │  Chat messages  │ ──► │ IngestCoordinator│ ──► │  AttemptStore   │
//! │ (live / backfill)│    │                  │     │   (Database)    │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────────┐
//!                    │ GridParser           │
//!                    │ normalize            │
//!                    │ ScoringStrategy (opt)│
//!                    └──────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wordlebot_core::{Database, GridParser, IngestCoordinator};
//!
//! let db = Database::open(&Config::database_path())?;
//! let parser = GridParser::new()?;
//! let coordinator = IngestCoordinator::new(&parser, &db);
//!
//! let outcome = coordinator.on_message_created(&message)?;
//! if let Some(emoji) = outcome.reaction() {
//!     // hand the emoji to the chat client
//! }
//! ```

mod source;

pub use source::{JsonlMessageSource, MessageSource};

use crate::db::AttemptStore;
use crate::error::Result;
use crate::format::sanitize_message;
use crate::normalize::normalize;
use crate::parser::GridParser;
use crate::scoring::ScoringStrategy;
use crate::types::{Attempt, SourceMessage};

/// Reaction for a recorded result, win or loss.
pub const WIN_REACTION: &str = "✅";

/// What a single message event did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Untracked group, or nothing to record
    Ignored,
    /// Attempt inserted or replaced
    Saved(Attempt),
    /// Previously recorded attempt deleted
    Removed,
}

impl IngestOutcome {
    /// Emoji the bot should react with, if any.
    pub fn reaction(&self) -> Option<&'static str> {
        match self {
            IngestOutcome::Saved(_) => Some(WIN_REACTION),
            _ => None,
        }
    }
}

/// Counters for a history backfill.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BackfillResult {
    /// Messages read from the source
    pub total_messages: usize,
    /// Messages that parsed as results and were saved
    pub attempt_messages: usize,
    /// Pages fetched
    pub pages: usize,
}

/// Routes message events through parse, normalize, score and store.
pub struct IngestCoordinator<'a, S: AttemptStore> {
    parser: &'a GridParser,
    store: &'a S,
    write_strategy: Option<Box<dyn ScoringStrategy>>,
}

impl<'a, S: AttemptStore> IngestCoordinator<'a, S> {
    /// Create a coordinator that stores attempts without a score.
    pub fn new(parser: &'a GridParser, store: &'a S) -> Self {
        Self {
            parser,
            store,
            write_strategy: None,
        }
    }

    /// Store each new attempt's base score under `strategy`.
    pub fn with_write_strategy(mut self, strategy: Option<Box<dyn ScoringStrategy>>) -> Self {
        self.write_strategy = strategy;
        self
    }

    /// Parse and normalize a message, scoring it if a write strategy is set.
    fn attempt_from(&self, message: &SourceMessage) -> Option<Attempt> {
        let parsed = match self.parser.parse_detailed(&message.content) {
            Ok(parsed) => parsed,
            Err(rejection) => {
                tracing::debug!(
                    group_id = %message.group_id,
                    message_id = %message.id,
                    reason = %rejection,
                    text = %sanitize_message(&message.content),
                    "Message is not a result paste"
                );
                return None;
            }
        };

        let mut attempt = normalize(parsed, message.authorship(), message.posted_at);
        if let Some(strategy) = &self.write_strategy {
            attempt.score = Some(strategy.base_score(&attempt));
        }
        Some(attempt)
    }

    fn save(&self, attempt: Attempt) -> Result<IngestOutcome> {
        self.store.upsert_attempt(&attempt)?;
        Ok(Self::saved(attempt))
    }

    fn saved(attempt: Attempt) -> IngestOutcome {
        tracing::info!(
            group_id = %attempt.group_id,
            author_id = %attempt.author_id,
            puzzle_index = attempt.puzzle_index,
            guess_count = attempt.guess_count,
            success = attempt.success,
            "Saved attempt"
        );
        IngestOutcome::Saved(attempt)
    }

    /// Handle a newly posted message.
    pub fn on_message_created(&self, message: &SourceMessage) -> Result<IngestOutcome> {
        if !self.store.is_tracked_group(&message.group_id)? {
            return Ok(IngestOutcome::Ignored);
        }

        match self.attempt_from(message) {
            Some(attempt) => self.save(attempt),
            None => Ok(IngestOutcome::Ignored),
        }
    }

    /// Handle an edited message.
    ///
    /// A result that still parses replaces the message's record, even when
    /// the edit changed the puzzle index. A later repost of the same puzzle
    /// by the same author keeps precedence, and the edited message loses its
    /// record. A result edited into something unparseable is removed.
    pub fn on_message_edited(&self, message: &SourceMessage) -> Result<IngestOutcome> {
        if !self.store.is_tracked_group(&message.group_id)? {
            return Ok(IngestOutcome::Ignored);
        }

        let Some(attempt) = self.attempt_from(message) else {
            return self.remove(&message.group_id, &message.id);
        };

        let current =
            self.store
                .find_attempt(&attempt.group_id, &attempt.author_id, attempt.puzzle_index)?;
        if let Some(current) = current {
            if current.message_id != attempt.message_id && current.posted_at > attempt.posted_at {
                tracing::debug!(
                    group_id = %attempt.group_id,
                    message_id = %attempt.message_id,
                    newer_message_id = %current.message_id,
                    puzzle_index = attempt.puzzle_index,
                    "Edited result is superseded by a later repost"
                );
                return self.remove(&message.group_id, &message.id);
            }
        }

        self.store.replace_message_attempt(&attempt)?;
        Ok(Self::saved(attempt))
    }

    /// Handle a deleted message.
    pub fn on_message_deleted(&self, group_id: &str, message_id: &str) -> Result<IngestOutcome> {
        if !self.store.is_tracked_group(group_id)? {
            return Ok(IngestOutcome::Ignored);
        }

        self.remove(group_id, message_id)
    }

    fn remove(&self, group_id: &str, message_id: &str) -> Result<IngestOutcome> {
        if self.store.delete_attempt_by_message(group_id, message_id)? {
            tracing::info!(group_id, message_id, "Removed attempt");
            Ok(IngestOutcome::Removed)
        } else {
            Ok(IngestOutcome::Ignored)
        }
    }

    /// Walk a group's history and record every result paste in it.
    ///
    /// Pages arrive newest first; saves are applied oldest first so a
    /// repost still replaces the earlier result.
    pub fn backfill(
        &self,
        source: &dyn MessageSource,
        group_id: &str,
        page_size: usize,
    ) -> Result<BackfillResult> {
        let page_size = page_size.max(1);
        let mut result = BackfillResult::default();
        let mut found = Vec::new();
        let mut before: Option<String> = None;

        loop {
            let page = source.fetch_page(group_id, before.as_deref(), page_size)?;
            let Some(last) = page.last() else {
                break;
            };
            before = Some(last.id.clone());
            result.pages += 1;
            result.total_messages += page.len();

            tracing::debug!(
                source = source.name(),
                group_id,
                page = result.pages,
                messages = page.len(),
                "Fetched history page"
            );

            found.extend(page.iter().filter_map(|m| self.attempt_from(m)));
        }

        found.reverse();
        for attempt in found {
            self.store.upsert_attempt(&attempt)?;
            result.attempt_messages += 1;
        }

        tracing::info!(
            source = source.name(),
            group_id,
            total_messages = result.total_messages,
            attempt_messages = result.attempt_messages,
            "Backfill complete"
        );

        Ok(result)
    }
}
