//! Batch loading from post dumps.
//!
//! Accepts either a JSON array of posts or JSON Lines (one post per line).
//! Posts with unparseable timestamps are dropped with a warning rather than
//! failing the whole batch.

use crate::ingest::types::{Event, IngestError, RawPost};
use chrono_tz::Tz;
use std::path::Path;

/// A validated batch of events ready for analysis.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Events in upstream order
    pub events: Vec<Event>,
    /// Number of posts dropped during conversion
    pub skipped: usize,
}

impl Batch {
    /// Convert raw posts into a batch, preserving order.
    pub fn from_posts(posts: &[RawPost], fallback_tz: Option<Tz>) -> Self {
        let mut events = Vec::with_capacity(posts.len());
        let mut skipped = 0;

        for post in posts {
            match post.to_event(fallback_tz) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!("Dropping post: {}", e);
                    skipped += 1;
                }
            }
        }

        Self { events, skipped }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Parse posts from a JSON array or JSON Lines document.
pub fn parse_posts(content: &str) -> Result<Vec<RawPost>, IngestError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| IngestError::ParseError(e.to_string()));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| IngestError::ParseError(format!("line {}: {e}", i + 1)))
        })
        .collect()
}

/// Read and parse posts from a file.
pub fn load_posts(path: &Path) -> Result<Vec<RawPost>, IngestError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| IngestError::IoError(e.to_string()))?;
    parse_posts(&content)
}

/// Read a file and convert it straight into a batch.
pub fn load_batch(path: &Path, fallback_tz: Option<Tz>) -> Result<Batch, IngestError> {
    let posts = load_posts(path)?;
    Ok(Batch::from_posts(&posts, fallback_tz))
}
