//! Historical baseline storage.
//!
//! The analysis core only reads a baseline and issues additive updates; it
//! never owns one. Stores take `&mut self` for updates, so a caller holding a
//! store exclusively serializes the read-then-update sequence for that user.
//! A batch's sleep and sentiment increments go through [`BaselineStore::record`]
//! together, so a failed batch leaves the baseline as it found it.

use crate::core::sentiment::SentimentCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Access to a user's persisted baseline.
pub trait BaselineStore {
    /// Average minutes slept per recorded night, or 0 with no history.
    fn sleep_baseline(&self) -> Result<f64, BaselineError>;

    /// Add one night of sleep to the aggregate.
    fn update_sleep(&mut self, minutes: u32) -> Result<(), BaselineError>;

    fn positive(&self) -> Result<u64, BaselineError>;
    fn negative(&self) -> Result<u64, BaselineError>;
    fn neutral(&self) -> Result<u64, BaselineError>;

    /// Add a batch tally to the sentiment counters.
    fn update_sentiment(&mut self, counts: SentimentCounts) -> Result<(), BaselineError>;

    /// Apply one batch's increments: an optional night of sleep and a
    /// sentiment tally.
    ///
    /// The default applies the sentiment tally first and the night only after
    /// it succeeded. Stores that can commit both in one write override this.
    fn record(
        &mut self,
        minutes_asleep: Option<u32>,
        counts: SentimentCounts,
    ) -> Result<(), BaselineError> {
        self.update_sentiment(counts)?;
        if let Some(minutes) = minutes_asleep {
            self.update_sleep(minutes)?;
        }
        Ok(())
    }

    /// All three sentiment counters at once.
    fn sentiment_totals(&self) -> Result<SentimentCounts, BaselineError> {
        Ok(SentimentCounts {
            positive: self.positive()?,
            negative: self.negative()?,
            neutral: self.neutral()?,
        })
    }
}

/// Persisted baseline values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    /// Sum of minutes slept over all recorded nights
    pub sleep_minutes_total: u64,
    /// Number of nights in the aggregate
    pub nights_recorded: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    /// When the baseline last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl BaselineSnapshot {
    /// Average minutes slept per night, 0 when nothing is recorded.
    pub fn average_sleep_minutes(&self) -> f64 {
        if self.nights_recorded == 0 {
            0.0
        } else {
            self.sleep_minutes_total as f64 / self.nights_recorded as f64
        }
    }

    fn add_sleep(&mut self, minutes: u32) {
        self.sleep_minutes_total += minutes as u64;
        self.nights_recorded += 1;
        self.last_updated = Some(Utc::now());
    }

    fn add_sentiment(&mut self, counts: SentimentCounts) {
        self.positive += counts.positive;
        self.negative += counts.negative;
        self.neutral += counts.neutral;
        self.last_updated = Some(Utc::now());
    }

    fn add_batch(&mut self, minutes_asleep: Option<u32>, counts: SentimentCounts) {
        if let Some(minutes) = minutes_asleep {
            self.add_sleep(minutes);
        }
        self.add_sentiment(counts);
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        format!(
            "Baseline:\n\
             - Nights recorded: {}\n\
             - Average sleep: {:.0} minutes\n\
             - Positive posts: {}\n\
             - Negative posts: {}\n\
             - Neutral posts: {}",
            self.nights_recorded,
            self.average_sleep_minutes(),
            self.positive,
            self.negative,
            self.neutral
        )
    }
}

/// Baseline held in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryBaselineStore {
    snapshot: BaselineSnapshot,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: BaselineSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &BaselineSnapshot {
        &self.snapshot
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn sleep_baseline(&self) -> Result<f64, BaselineError> {
        Ok(self.snapshot.average_sleep_minutes())
    }

    fn update_sleep(&mut self, minutes: u32) -> Result<(), BaselineError> {
        self.snapshot.add_sleep(minutes);
        Ok(())
    }

    fn positive(&self) -> Result<u64, BaselineError> {
        Ok(self.snapshot.positive)
    }

    fn negative(&self) -> Result<u64, BaselineError> {
        Ok(self.snapshot.negative)
    }

    fn neutral(&self) -> Result<u64, BaselineError> {
        Ok(self.snapshot.neutral)
    }

    fn update_sentiment(&mut self, counts: SentimentCounts) -> Result<(), BaselineError> {
        self.snapshot.add_sentiment(counts);
        Ok(())
    }

    fn record(
        &mut self,
        minutes_asleep: Option<u32>,
        counts: SentimentCounts,
    ) -> Result<(), BaselineError> {
        self.snapshot.add_batch(minutes_asleep, counts);
        Ok(())
    }
}

/// Baseline persisted as a JSON file, one file per user.
///
/// Every update is written through before it is applied in memory, so a
/// failed write leaves both the file and the cached values unchanged.
#[derive(Debug)]
pub struct FileBaselineStore {
    path: PathBuf,
    snapshot: BaselineSnapshot,
}

impl FileBaselineStore {
    /// Open a store, starting from zero if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BaselineError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| BaselineError::Unavailable(format!("{}: {e}", path.display())))?;
            serde_json::from_str(&content)
                .map_err(|e| BaselineError::Corrupt(format!("{}: {e}", path.display())))?
        } else {
            BaselineSnapshot::default()
        };

        Ok(Self { path, snapshot })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> &BaselineSnapshot {
        &self.snapshot
    }

    /// Zero every counter and persist.
    pub fn reset(&mut self) -> Result<(), BaselineError> {
        self.commit(BaselineSnapshot {
            last_updated: Some(Utc::now()),
            ..BaselineSnapshot::default()
        })
    }

    fn commit(&mut self, next: BaselineSnapshot) -> Result<(), BaselineError> {
        write_snapshot(&self.path, &next)?;
        self.snapshot = next;
        Ok(())
    }
}

impl BaselineStore for FileBaselineStore {
    fn sleep_baseline(&self) -> Result<f64, BaselineError> {
        Ok(self.snapshot.average_sleep_minutes())
    }

    fn update_sleep(&mut self, minutes: u32) -> Result<(), BaselineError> {
        let mut next = self.snapshot.clone();
        next.add_sleep(minutes);
        self.commit(next)
    }

    fn positive(&self) -> Result<u64, BaselineError> {
        Ok(self.snapshot.positive)
    }

    fn negative(&self) -> Result<u64, BaselineError> {
        Ok(self.snapshot.negative)
    }

    fn neutral(&self) -> Result<u64, BaselineError> {
        Ok(self.snapshot.neutral)
    }

    fn update_sentiment(&mut self, counts: SentimentCounts) -> Result<(), BaselineError> {
        let mut next = self.snapshot.clone();
        next.add_sentiment(counts);
        self.commit(next)
    }

    fn record(
        &mut self,
        minutes_asleep: Option<u32>,
        counts: SentimentCounts,
    ) -> Result<(), BaselineError> {
        let mut next = self.snapshot.clone();
        next.add_batch(minutes_asleep, counts);
        self.commit(next)
    }
}

fn write_snapshot(path: &Path, snapshot: &BaselineSnapshot) -> Result<(), BaselineError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| BaselineError::Unavailable(format!("{}: {e}", parent.display())))?;
    }

    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| BaselineError::Corrupt(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .and_then(|_| std::fs::rename(&tmp, path))
        .map_err(|e| BaselineError::Unavailable(format!("{}: {e}", path.display())))
}

/// Baseline store errors.
#[derive(Debug)]
pub enum BaselineError {
    /// The store could not be read or written
    Unavailable(String),
    /// The persisted baseline could not be decoded
    Corrupt(String),
}

impl std::fmt::Display for BaselineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineError::Unavailable(e) => write!(f, "Baseline unavailable: {e}"),
            BaselineError::Corrupt(e) => write!(f, "Baseline corrupt: {e}"),
        }
    }
}

impl std::error::Error for BaselineError {}
