//! Synheart Rhythm Agent - sleep schedule and mood inference from post timing.
//!
//! This library estimates when a user sleeps and how their recent tone
//! compares with their own history, using only the timestamps and text of a
//! batch of social-media posts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Synheart Rhythm Agent                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Ingest    │──▶│  Histogram  │──▶│  Smoothing  │        │
//! │  │  (posts)    │   │ (min of day)│   │ (288 steps) │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                                    │               │
//! │         ▼                                    ▼               │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Sentiment  │   │  Baseline   │◀─▶│ Square-wave │        │
//! │  │ (classify)  │◀─▶│   Store     │   │    fit      │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                                    │               │
//! │         └──────────────▶ Report ◀────────────┘               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use synheart_rhythm_agent::{baseline, classifier, core, ingest};
//!
//! let batch = ingest::load_batch(std::path::Path::new("posts.json"), None)?;
//! let mut store = baseline::FileBaselineStore::open("baseline.json")?;
//!
//! let analyzer = core::Analyzer::new(Box::new(classifier::LexiconClassifier::new()), 20);
//! let report = analyzer.analyze(&batch.events, &mut store)?;
//!
//! println!("Woke up at {}", report.wake_up_time_str);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod baseline;
pub mod classifier;
pub mod config;
pub mod core;
pub mod ingest;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use baseline::{BaselineError, BaselineStore, FileBaselineStore, MemoryBaselineStore};
pub use classifier::LexiconClassifier;
pub use config::{Config, ConfigError};
pub use crate::core::{AnalysisError, Analyzer, Report, ReportBuilder, SentimentClassifier};
pub use ingest::{Batch, Event, IngestError, RawPost};

// Remote classifier re-exports (when enabled)
#[cfg(feature = "gateway")]
pub use classifier::{BlockingRemoteClassifier, RemoteClassifierConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
