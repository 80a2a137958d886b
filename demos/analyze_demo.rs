//! Demonstration of the Synheart Rhythm Agent analysis pipeline.
//!
//! This example shows how to:
//! 1. Build a batch of posts in the upstream format
//! 2. Convert them into events
//! 3. Analyze several days against an in-memory baseline
//! 4. Print the resulting reports
//!
//! Run with: cargo run --example analyze_demo

use chrono::{Duration, TimeZone, Utc};
use synheart_rhythm_agent::{
    baseline::MemoryBaselineStore,
    classifier::LexiconClassifier,
    core::{Analyzer, ReportBuilder},
    ingest::{Batch, RawPost, CREATED_AT_FORMAT},
};

/// One simulated day: (first post hour, last post hour, mood text).
const DAYS: &[(u32, u32, &str)] = &[
    (7, 23, "great coffee, lovely morning"),
    (8, 23, "busy but good"),
    (10, 2, "so tired, awful night"),
    (7, 22, "rested and happy"),
];

fn main() {
    println!("Synheart Rhythm Agent - Analyze Demo");
    println!("====================================");
    println!();

    let analyzer = Analyzer::new(Box::new(LexiconClassifier::new()), 20)
        .with_builder(ReportBuilder::new().without_meta());
    let mut store = MemoryBaselineStore::new();
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();

    for (day, &(first, last, text)) in DAYS.iter().enumerate() {
        let posts = day_posts(start + Duration::days(day as i64), first, last, text);
        let batch = Batch::from_posts(&posts, None);

        let report = match analyzer.analyze(&batch.events, &mut store) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Day {}: analysis failed: {e}", day + 1);
                continue;
            }
        };

        println!(
            "Day {}: {} posts, awake {} to {}, slept {} ({}% {} baseline), fit {}%, positive {}",
            day + 1,
            batch.len(),
            report.wake_up_time_str,
            report.bed_time_str,
            report.hours_slept,
            report.rest_percentage,
            if report.well_rested { "above" } else { "below" },
            report.sleep_coefficient,
            report.sentiment.pos_relative_str,
        );
    }

    println!();
    println!("{}", store.snapshot().summary());
}

/// Hourly posts from `first` to `last` (wrapping past midnight), UTC+1.
fn day_posts(
    day: chrono::DateTime<Utc>,
    first: u32,
    last: u32,
    text: &str,
) -> Vec<RawPost> {
    let hours = if last >= first {
        last - first
    } else {
        last + 24 - first
    };

    (0..=hours)
        .map(|h| {
            let local = day + Duration::hours((first + h) as i64);
            let utc = local - Duration::hours(1);
            RawPost::new(utc.format(CREATED_AT_FORMAT).to_string(), 1, text)
        })
        .collect()
}
