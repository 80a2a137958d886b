//! Rhythm report builder.
//!
//! Merges the activity curve, the fitted sleep schedule and the sentiment
//! comparison into the JSON report consumed by the presentation layer. Field
//! names follow the existing consumer contract (`wakeUpTime`, `hoursSlept`,
//! ...), so several are renamed explicitly.

use crate::core::sentiment::SentimentStats;
use crate::core::sleep::SleepStats;
use crate::core::smoothing::ActivityCurve;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name of this producer.
pub const PRODUCER_NAME: &str = "synheart-rhythm-agent";

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Unique report identifier
    pub report_id: String,
    /// Name of the producing software
    pub producer: String,
    /// Version of the producing software
    pub version: String,
    /// When this report was computed (RFC3339)
    pub computed_at_utc: String,
    /// Number of events in the batch
    pub event_count: usize,
    /// Offset used to localize the batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_hours: Option<i32>,
}

/// Sentiment block of the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSentiment {
    pub num_tweets: u64,
    pub positive: f64,
    pub negative: f64,
    pub positive_relative: f64,
    pub negative_relative: f64,
    pub pos_relative_str: String,
    pub neg_relative_str: String,
}

impl From<&SentimentStats> for ReportSentiment {
    fn from(stats: &SentimentStats) -> Self {
        Self {
            num_tweets: stats.num_tweets,
            positive: stats.positive,
            negative: stats.negative,
            positive_relative: stats.positive_relative,
            negative_relative: stats.negative_relative,
            pos_relative_str: stats.pos_relative_str.clone(),
            neg_relative_str: stats.neg_relative_str.clone(),
        }
    }
}

/// Complete per-batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub well_rested: bool,
    /// Deviation from baseline sleep in percent, unsigned, two decimals
    pub rest_percentage: String,
    /// `(timestep_minutes, density)` for all 288 timesteps
    pub probs: Vec<(u32, f64)>,
    #[serde(rename = "hoursSlept")]
    pub hours_slept: String,
    #[serde(rename = "wakeUpTime")]
    pub wake_up_time: u32,
    #[serde(rename = "bedTime")]
    pub bed_time: u32,
    #[serde(rename = "wakeUpTime_str")]
    pub wake_up_time_str: String,
    #[serde(rename = "bedTime_str")]
    pub bed_time_str: String,
    /// Fit confidence in percent, two decimals
    #[serde(rename = "sleepCoefficient")]
    pub sleep_coefficient: String,
    pub sentiment: ReportSentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ReportMeta>,
}

/// Builder for reports.
pub struct ReportBuilder {
    instance_id: Uuid,
    include_meta: bool,
}

impl ReportBuilder {
    /// Create a new builder with a unique instance ID.
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            include_meta: true,
        }
    }

    /// Omit the `meta` block from built reports.
    pub fn without_meta(mut self) -> Self {
        self.include_meta = false;
        self
    }

    /// Get the instance ID.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Build a report from the per-batch results.
    pub fn build(
        &self,
        curve: &ActivityCurve,
        sleep: &SleepStats,
        sentiment: &SentimentStats,
        event_count: usize,
        utc_offset_hours: Option<i32>,
    ) -> Report {
        let meta = self.include_meta.then(|| ReportMeta {
            report_id: format!("r_{}_{}", self.instance_id.simple(), Uuid::new_v4().simple()),
            producer: PRODUCER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            computed_at_utc: Utc::now().to_rfc3339(),
            event_count,
            utc_offset_hours,
        });

        Report {
            well_rested: sleep.well_rested,
            rest_percentage: sleep.rest_percentage_str(),
            probs: curve.points(),
            hours_slept: sleep.hours_slept_str(),
            wake_up_time: sleep.wake_minute,
            bed_time: sleep.bed_minute,
            wake_up_time_str: sleep.wake_str(),
            bed_time_str: sleep.bed_str(),
            sleep_coefficient: sleep.coefficient_str(),
            sentiment: ReportSentiment::from(sentiment),
            meta,
        }
    }

    /// Build and serialize a report to JSON.
    pub fn build_json(
        &self,
        curve: &ActivityCurve,
        sleep: &SleepStats,
        sentiment: &SentimentStats,
        event_count: usize,
        utc_offset_hours: Option<i32>,
    ) -> String {
        let report = self.build(curve, sleep, sentiment, event_count, utc_offset_hours);
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
