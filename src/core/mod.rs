//! Core analysis for the Synheart Rhythm Agent.
//!
//! This module contains:
//! - Minute-of-day histograms and the smoothed activity curve
//! - The square-wave sleep fitter
//! - Sleep and sentiment comparison against the baseline
//! - Report building and the end-to-end analyzer

pub mod clock;
pub mod fitting;
pub mod histogram;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod sleep;
pub mod smoothing;

// Re-export commonly used types
pub use clock::{format_2dp, FormatHM};
pub use fitting::{SleepModel, SquareWaveFitter};
pub use histogram::{ActivityHistogram, MINUTES_PER_DAY};
pub use pipeline::{AnalysisError, Analyzer};
pub use report::{Report, ReportBuilder, ReportMeta, ReportSentiment, PRODUCER_NAME};
pub use sentiment::{
    Classification, ClassifierError, Sentiment, SentimentAggregator, SentimentClassifier,
    SentimentCounts, SentimentStats, DEFAULT_MAX_TWEETS,
};
pub use sleep::{assemble_sleep_stats, night_to_record, SleepStats};
pub use smoothing::{ActivityCurve, TIMESTEPS_PER_DAY, TIMESTEP_MINUTES};
