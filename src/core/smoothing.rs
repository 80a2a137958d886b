//! Activity density curve.
//!
//! Sparse minute counts are smoothed with a rectangular window of +/-60
//! minutes on the circular day and sampled every 5 minutes. Each count
//! contributes `count / 60` to every timestep within range.

use crate::core::histogram::{ActivityHistogram, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};

/// Spacing between curve samples in minutes.
pub const TIMESTEP_MINUTES: u32 = 5;

/// Number of samples across one day.
pub const TIMESTEPS_PER_DAY: usize = (MINUTES_PER_DAY / TIMESTEP_MINUTES) as usize;

/// Half-width of the smoothing window in minutes (exclusive).
pub const SMOOTHING_HALF_WIDTH: i64 = 60;

/// Smoothed activity density sampled at every 5-minute timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCurve {
    /// Density per timestep; index `i` is minute `i * 5`
    densities: Vec<f64>,
}

impl ActivityCurve {
    /// A curve with no activity anywhere.
    pub fn zeros() -> Self {
        Self {
            densities: vec![0.0; TIMESTEPS_PER_DAY],
        }
    }

    /// Build a curve directly from densities (must be one per timestep).
    pub fn from_densities(densities: Vec<f64>) -> Option<Self> {
        if densities.len() != TIMESTEPS_PER_DAY {
            return None;
        }
        Some(Self { densities })
    }

    /// Smooth a histogram into a dense curve.
    pub fn from_histogram(histogram: &ActivityHistogram) -> Self {
        let mut curve = Self::zeros();
        if histogram.is_empty() {
            return curve;
        }

        for (index, density) in curve.densities.iter_mut().enumerate() {
            let timestep = timestep_minute(index) as i64;
            *density = histogram
                .iter()
                .filter(|&(minute, _)| within_window(timestep, minute as i64))
                .map(|(_, count)| count as f64 / SMOOTHING_HALF_WIDTH as f64)
                .sum();
        }

        curve
    }

    /// Density at a timestep given in minutes (rounded down to the sample).
    pub fn density_at(&self, minute: u32) -> f64 {
        let index = ((minute % MINUTES_PER_DAY) / TIMESTEP_MINUTES) as usize;
        self.densities[index]
    }

    /// Raw densities in timestep order.
    pub fn densities(&self) -> &[f64] {
        &self.densities
    }

    /// Ordered `(timestep_minutes, density)` pairs.
    pub fn points(&self) -> Vec<(u32, f64)> {
        self.densities
            .iter()
            .enumerate()
            .map(|(i, &d)| (timestep_minute(i), d))
            .collect()
    }

    /// Whether every timestep has zero density.
    pub fn is_flat(&self) -> bool {
        self.densities.iter().all(|&d| d == 0.0)
    }

    pub fn len(&self) -> usize {
        self.densities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.densities.is_empty()
    }
}

/// Minute of day for a sample index.
pub fn timestep_minute(index: usize) -> u32 {
    index as u32 * TIMESTEP_MINUTES
}

/// Whether `minute` lies strictly within the window around `timestep`,
/// testing the minute and its images one day earlier and later.
fn within_window(timestep: i64, minute: i64) -> bool {
    let day = MINUTES_PER_DAY as i64;
    [minute, minute - day, minute + day]
        .iter()
        .any(|&m| (m - timestep).abs() < SMOOTHING_HALF_WIDTH)
}
