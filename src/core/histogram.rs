//! Minute-of-day activity histogram.
//!
//! Events are bucketed into local minutes of the circular day using the UTC
//! offset of the first event in the batch. Batches that span an offset change
//! are bucketed with that single offset.

use crate::ingest::Event;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minutes in the circular day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Per-minute event counts for a single batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityHistogram {
    /// Local minute of day -> number of events
    counts: BTreeMap<u32, u32>,
    /// Offset used to localize the batch, if any events were seen
    offset_hours: Option<i32>,
}

impl ActivityHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket a batch of events.
    pub fn from_events(events: &[Event]) -> Self {
        let mut histogram = Self::new();

        let Some(first) = events.first() else {
            return histogram;
        };
        let offset = first.utc_offset_hours;
        histogram.offset_hours = Some(offset);

        let mut mismatched = 0usize;
        for event in events {
            if event.utc_offset_hours != offset {
                mismatched += 1;
            }
            histogram.record(event.local_minute_of_day(offset));
        }

        if mismatched > 0 {
            tracing::warn!(
                "{} of {} events carry a UTC offset other than {}; bucketed with {} anyway",
                mismatched,
                events.len(),
                offset,
                offset
            );
        }

        histogram
    }

    /// Add one event at the given local minute of day.
    pub fn record(&mut self, minute: u32) {
        *self.counts.entry(minute % MINUTES_PER_DAY).or_insert(0) += 1;
    }

    /// Count at a specific minute.
    pub fn count_at(&self, minute: u32) -> u32 {
        self.counts.get(&minute).copied().unwrap_or(0)
    }

    /// Iterate over occupied minutes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.counts.iter().map(|(&m, &c)| (m, c))
    }

    /// Total number of bucketed events.
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Number of distinct occupied minutes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Offset applied to the batch.
    pub fn offset_hours(&self) -> Option<i32> {
        self.offset_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event_at(hour: u32, minute: u32, offset: i32) -> Event {
        let ts = Utc.with_ymd_and_hms(2024, 1, 22, hour, minute, 0).unwrap();
        Event::new(ts, offset, "")
    }

    #[test]
    fn test_empty_batch() {
        let histogram = ActivityHistogram::from_events(&[]);
        assert!(histogram.is_empty());
        assert_eq!(histogram.offset_hours(), None);
        assert_eq!(histogram.total(), 0);
    }

    #[test]
    fn test_all_at_midnight() {
        let events: Vec<Event> = (0..7).map(|_| event_at(0, 0, 0)).collect();
        let histogram = ActivityHistogram::from_events(&events);

        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram.count_at(0), 7);
    }

    #[test]
    fn test_offset_from_first_event_applies_to_all() {
        let events = vec![event_at(10, 15, 2), event_at(10, 15, -3)];
        let histogram = ActivityHistogram::from_events(&events);

        assert_eq!(histogram.offset_hours(), Some(2));
        assert_eq!(histogram.count_at(12 * 60 + 15), 2);
        assert_eq!(histogram.count_at(7 * 60 + 15), 0);
    }

    #[test]
    fn test_offset_wraps_past_midnight() {
        let events = vec![event_at(23, 40, 3)];
        let histogram = ActivityHistogram::from_events(&events);
        assert_eq!(histogram.count_at(2 * 60 + 40), 1);
    }

    #[test]
    fn test_iter_is_sorted() {
        let mut histogram = ActivityHistogram::new();
        histogram.record(900);
        histogram.record(30);
        histogram.record(900);

        let entries: Vec<(u32, u32)> = histogram.iter().collect();
        assert_eq!(entries, vec![(30, 1), (900, 2)]);
        assert_eq!(histogram.total(), 3);
    }
}
