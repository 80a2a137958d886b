//! Post ingestion for the Synheart Rhythm Agent.
//!
//! This module turns upstream post dumps into validated `Event` batches.

pub mod loader;
pub mod types;

// Re-export commonly used types
pub use loader::{load_batch, load_posts, parse_posts, Batch};
pub use types::{
    parse_created_at, parse_timezone, tz_offset_hours, Event, IngestError, RawPost,
    CREATED_AT_FORMAT,
};
