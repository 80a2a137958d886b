//! Square-wave sleep model fitting.
//!
//! The day is modelled as two arcs: an awake arc from `wake` forward to `bed`
//! where activity sits at the day's mean density, and an asleep arc where it
//! is zero. Every candidate pair on a 10-minute grid is scored by its squared
//! error against the activity curve and the smallest error wins.
//!
//! The search is a fixed 144 x 144 grid over 288 samples, cheap enough to run
//! synchronously per request.

use crate::core::histogram::MINUTES_PER_DAY;
use crate::core::smoothing::{timestep_minute, ActivityCurve, TIMESTEP_MINUTES};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Grid spacing for wake/bed candidates in minutes.
pub const CANDIDATE_STEP_MINUTES: u32 = 10;

/// Smallest allowed |wake - bed| in minutes.
pub const MIN_BOUNDARY_GAP_MINUTES: u32 = 60;

/// A fitted sleep schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepModel {
    /// Minute of day the awake arc starts
    pub wake_minute: u32,
    /// Minute of day the awake arc ends
    pub bed_minute: u32,
    /// 1 - min_variance / max_variance, or 0 when the curve is flat
    pub confidence: f64,
    /// Error of the selected pair
    pub min_variance: f64,
    /// Error of the all-asleep model
    pub max_variance: f64,
}

impl SleepModel {
    /// Length of the awake arc in minutes.
    pub fn minutes_awake(&self) -> u32 {
        awake_span(self.wake_minute, self.bed_minute)
    }

    /// Length of the asleep arc in minutes.
    pub fn minutes_asleep(&self) -> u32 {
        MINUTES_PER_DAY - self.minutes_awake()
    }

    /// Whether a minute of day falls in the awake arc.
    pub fn is_awake(&self, minute: u32) -> bool {
        in_awake_arc(minute, self.wake_minute, self.bed_minute)
    }

    /// True when the curve carried no activity at all.
    pub fn is_degenerate(&self) -> bool {
        self.max_variance == 0.0
    }
}

/// Exhaustive grid search over (wake, bed) pairs.
#[derive(Debug, Clone)]
pub struct SquareWaveFitter {
    step_minutes: u32,
    min_gap_minutes: u32,
}

impl Default for SquareWaveFitter {
    fn default() -> Self {
        Self {
            step_minutes: CANDIDATE_STEP_MINUTES,
            min_gap_minutes: MIN_BOUNDARY_GAP_MINUTES,
        }
    }
}

impl SquareWaveFitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the model to a curve.
    ///
    /// Candidates are enumerated wake-ascending then bed-ascending and only a
    /// strictly smaller error replaces the current best, so ties resolve to
    /// the first pair in that order.
    pub fn fit(&self, curve: &ActivityCurve) -> SleepModel {
        let densities = curve.densities();
        let height = densities.iter().mean();

        let step = self.step_minutes.max(1) as usize;
        let min_gap = self.min_gap_minutes;
        let candidates = (0..MINUTES_PER_DAY).step_by(step).flat_map(|wake| {
            (0..MINUTES_PER_DAY)
                .step_by(step)
                .filter(move |bed| wake.abs_diff(*bed) >= min_gap)
                .map(move |bed| (wake, bed))
        });
        let scored = candidates
            .map(|(wake, bed)| (wake, bed, variance_with_height(densities, wake, bed, height)));

        // The grid always holds valid pairs for the default parameters.
        let (wake_minute, bed_minute, min_variance) = select_first_minimum(scored)
            .unwrap_or((0, self.min_gap_minutes % MINUTES_PER_DAY, 0.0));
        let max_variance = all_asleep_variance(densities);

        let confidence = if max_variance == 0.0 {
            0.0
        } else {
            1.0 - min_variance / max_variance
        };

        tracing::debug!(
            wake_minute,
            bed_minute,
            min_variance,
            max_variance,
            confidence,
            "Fitted square-wave sleep model"
        );

        SleepModel {
            wake_minute,
            bed_minute,
            confidence,
            min_variance,
            max_variance,
        }
    }
}

/// Keep the first candidate with the lowest variance.
fn select_first_minimum(
    candidates: impl Iterator<Item = (u32, u32, f64)>,
) -> Option<(u32, u32, f64)> {
    candidates.fold(None, |best, candidate| match best {
        Some(current) if candidate.2 >= current.2 => Some(current),
        _ => Some(candidate),
    })
}

/// Squared error of a (wake, bed) pair against the curve.
pub fn variance(curve: &ActivityCurve, wake: u32, bed: u32) -> f64 {
    let densities = curve.densities();
    variance_with_height(densities, wake, bed, densities.iter().mean())
}

fn variance_with_height(densities: &[f64], wake: u32, bed: u32, height: f64) -> f64 {
    let weight = TIMESTEP_MINUTES as f64;
    densities
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if in_awake_arc(timestep_minute(i), wake, bed) {
                weight * (d - height).powi(2)
            } else {
                weight * d.powi(2)
            }
        })
        .sum()
}

/// Error of treating the whole day as asleep.
fn all_asleep_variance(densities: &[f64]) -> f64 {
    let weight = TIMESTEP_MINUTES as f64;
    densities.iter().map(|&d| weight * d.powi(2)).sum()
}

/// Half-open forward interval `[wake, bed)`, wrapping past midnight.
fn in_awake_arc(minute: u32, wake: u32, bed: u32) -> bool {
    if wake <= bed {
        wake <= minute && minute < bed
    } else {
        minute >= wake || minute < bed
    }
}

fn awake_span(wake: u32, bed: u32) -> u32 {
    if bed > wake {
        bed - wake
    } else {
        bed + MINUTES_PER_DAY - wake
    }
}
