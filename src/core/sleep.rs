//! Sleep statistics relative to the user's baseline.

use crate::baseline::{BaselineError, BaselineStore};
use crate::core::clock::{format_2dp, FormatHM};
use crate::core::fitting::SleepModel;
use serde::{Deserialize, Serialize};

/// Sleep fields derived from a fitted model and the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepStats {
    pub wake_minute: u32,
    pub bed_minute: u32,
    pub minutes_awake: u32,
    pub minutes_asleep: u32,
    /// Baseline average the batch was compared against
    pub baseline_minutes: f64,
    /// minutes_asleep / baseline_minutes, 0 when either side is missing
    pub restedness: f64,
    pub well_rested: bool,
    /// |100 * restedness - 100|; the sign lives in `well_rested`
    pub rest_percentage: f64,
    pub confidence: f64,
}

impl SleepStats {
    pub fn wake_str(&self) -> String {
        self.wake_minute.format_hm()
    }

    pub fn bed_str(&self) -> String {
        self.bed_minute.format_hm()
    }

    pub fn hours_slept_str(&self) -> String {
        self.minutes_asleep.format_hm()
    }

    pub fn rest_percentage_str(&self) -> String {
        format_2dp(self.rest_percentage)
    }

    /// Fit confidence as a percentage string.
    pub fn coefficient_str(&self) -> String {
        format_2dp(self.confidence * 100.0)
    }
}

/// Compare a fitted model against the baseline.
///
/// A degenerate model (no activity in the batch) is reported with zero
/// restedness. The baseline is only read here; see [`night_to_record`].
pub fn assemble_sleep_stats(
    model: &SleepModel,
    store: &dyn BaselineStore,
) -> Result<SleepStats, BaselineError> {
    let minutes_awake = model.minutes_awake();
    let minutes_asleep = model.minutes_asleep();
    let baseline_minutes = store.sleep_baseline()?;

    let restedness = if model.is_degenerate() || baseline_minutes <= 0.0 {
        0.0
    } else {
        minutes_asleep as f64 / baseline_minutes
    };

    Ok(SleepStats {
        wake_minute: model.wake_minute,
        bed_minute: model.bed_minute,
        minutes_awake,
        minutes_asleep,
        baseline_minutes,
        restedness,
        well_rested: restedness > 1.0,
        rest_percentage: (100.0 * restedness - 100.0).abs(),
        confidence: model.confidence,
    })
}

/// Minutes asleep to add to the sleep baseline for this batch.
///
/// None for a degenerate model, which leaves the baseline unchanged.
pub fn night_to_record(model: &SleepModel) -> Option<u32> {
    if model.is_degenerate() {
        tracing::debug!("No activity in batch; sleep baseline left unchanged");
        None
    } else {
        Some(model.minutes_asleep())
    }
}
