//! Database layer for wordlebot
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - The [`AttemptStore`] seam and its SQLite implementation
//! - Group tracking

pub mod repo;
pub mod schema;

pub use repo::{AttemptStore, Database};
