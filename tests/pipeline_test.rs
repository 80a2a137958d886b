//! End-to-end analysis scenarios.

use chrono::{Duration, TimeZone, Utc};
use statrs::statistics::Statistics;
use synheart_rhythm_agent::baseline::{
    BaselineError, BaselineSnapshot, BaselineStore, FileBaselineStore, MemoryBaselineStore,
};
use synheart_rhythm_agent::core::fitting::variance;
use synheart_rhythm_agent::core::{
    ActivityCurve, ActivityHistogram, AnalysisError, Analyzer, Classification, ClassifierError,
    SentimentClassifier, SentimentCounts, SquareWaveFitter, MINUTES_PER_DAY, TIMESTEPS_PER_DAY,
    TIMESTEP_MINUTES,
};
use synheart_rhythm_agent::ingest::Event;
use synheart_rhythm_agent::LexiconClassifier;

/// Uses the text itself as the label.
struct EchoClassifier;

impl SentimentClassifier for EchoClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        Ok(Classification::from_label(text))
    }
}

/// Store whose backend is gone.
struct OfflineStore;

impl BaselineStore for OfflineStore {
    fn sleep_baseline(&self) -> Result<f64, BaselineError> {
        Err(BaselineError::Unavailable("offline".to_string()))
    }
    fn update_sleep(&mut self, _: u32) -> Result<(), BaselineError> {
        Err(BaselineError::Unavailable("offline".to_string()))
    }
    fn positive(&self) -> Result<u64, BaselineError> {
        Err(BaselineError::Unavailable("offline".to_string()))
    }
    fn negative(&self) -> Result<u64, BaselineError> {
        Err(BaselineError::Unavailable("offline".to_string()))
    }
    fn neutral(&self) -> Result<u64, BaselineError> {
        Err(BaselineError::Unavailable("offline".to_string()))
    }
    fn update_sentiment(&mut self, _: SentimentCounts) -> Result<(), BaselineError> {
        Err(BaselineError::Unavailable("offline".to_string()))
    }
}

/// One event per given local minute, on consecutive days, UTC offset 0.
fn events_at(minutes: &[u32], text: &str) -> Vec<Event> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    minutes
        .iter()
        .enumerate()
        .map(|(day, &minute)| {
            let ts = start + Duration::days(day as i64) + Duration::minutes(minute as i64);
            Event::new(ts, 0, text)
        })
        .collect()
}

fn circular_distance(a: u32, b: u32) -> u32 {
    let d = a.abs_diff(b);
    d.min(MINUTES_PER_DAY - d)
}

#[test]
fn midnight_activity_brackets_minute_zero() {
    let events = events_at(&[0; 12], "hello");

    let histogram = ActivityHistogram::from_events(&events);
    assert_eq!(histogram.len(), 1);
    assert_eq!(histogram.count_at(0), 12);

    let curve = ActivityCurve::from_histogram(&histogram);
    for (minute, density) in curve.points() {
        let near_midnight = minute > 1380 || minute < 60;
        assert_eq!(density > 0.0, near_midnight, "minute {minute}");
    }

    let model = SquareWaveFitter::new().fit(&curve);
    assert_eq!((model.wake_minute, model.bed_minute), (1380, 60));
    assert!(model.is_awake(0));
    assert!(model.confidence > 0.0 && model.confidence < 1.0);
}

#[test]
fn empty_batch_produces_neutral_report() {
    let analyzer = Analyzer::new(Box::new(LexiconClassifier::new()), 20);
    let mut store = MemoryBaselineStore::from_snapshot(BaselineSnapshot {
        sleep_minutes_total: 960,
        nights_recorded: 2,
        ..BaselineSnapshot::default()
    });

    let report = analyzer.analyze(&[], &mut store).unwrap();

    assert_eq!(report.probs.len(), 288);
    assert!(report.probs.iter().all(|&(_, density)| density == 0.0));
    assert_eq!(report.sentiment.num_tweets, 1);
    assert_eq!(report.sentiment.positive, 0.0);
    assert_eq!(report.sentiment.negative, 0.0);
    assert_eq!(report.rest_percentage, "100.00");
    assert_eq!(report.sleep_coefficient, "0.00");

    // Nothing observed, nothing recorded
    assert_eq!(store.snapshot().nights_recorded, 2);
}

#[test]
fn sentiment_relative_to_history() {
    let mut events = events_at(&[600; 8], "positive");
    events.extend(events_at(&[700; 2], "negative"));

    let analyzer = Analyzer::new(Box::new(EchoClassifier), 20);
    let mut store = MemoryBaselineStore::from_snapshot(BaselineSnapshot {
        positive: 50,
        negative: 30,
        neutral: 20,
        ..BaselineSnapshot::default()
    });

    let report = analyzer.analyze(&events, &mut store).unwrap();

    assert_eq!(report.sentiment.num_tweets, 10);
    assert_eq!(report.sentiment.pos_relative_str, "30.00");
    assert_eq!(report.sentiment.neg_relative_str, "-10.00");
    assert_eq!(store.snapshot().positive, 58);
    assert_eq!(store.snapshot().negative, 32);
    assert_eq!(store.snapshot().neutral, 20);
}

/// Block of density 2 from 08:00 to 19:20 with a band of density `band` on
/// each side, 06:40-08:00 and 19:20-20:40.
fn banded_curve(band: f64) -> ActivityCurve {
    let densities = (0..TIMESTEPS_PER_DAY)
        .map(|i| match i as u32 * TIMESTEP_MINUTES {
            400..=479 | 1160..=1239 => band,
            480..=1159 => 2.0,
            _ => 0.0,
        })
        .collect();
    ActivityCurve::from_densities(densities).unwrap()
}

#[test]
fn active_ties_resolve_to_lowest_wake_then_bed() {
    // At half the square-wave height a band point costs the same awake or
    // asleep, so every boundary inside a band ties
    let height = banded_curve(0.5).densities().iter().mean();
    let curve = banded_curve(height / 2.0);
    assert_eq!(curve.densities().iter().mean(), height);

    let best = variance(&curve, 400, 1160);
    for (wake, bed) in [(400, 1240), (440, 1200), (480, 1160), (480, 1240)] {
        assert_eq!(variance(&curve, wake, bed), best, "({wake}, {bed})");
    }
    assert!(variance(&curve, 390, 1160) > best);
    assert!(variance(&curve, 400, 1250) > best);

    let model = SquareWaveFitter::new().fit(&curve);
    assert!(!model.is_degenerate());
    assert!(model.confidence > 0.0);
    assert_eq!(model.min_variance, best);
    assert_eq!((model.wake_minute, model.bed_minute), (400, 1160));
}

#[test]
fn flat_curve_ties_resolve_to_first_pair() {
    let curve = ActivityCurve::zeros();
    assert_eq!(variance(&curve, 0, 60), variance(&curve, 0, 70));

    let model = SquareWaveFitter::new().fit(&curve);
    assert_eq!((model.wake_minute, model.bed_minute), (0, 60));
    assert_eq!(model.confidence, 0.0);
}

#[test]
fn curve_support_matches_event_neighbourhood() {
    let minutes = [300, 610, 615, 1200];
    let events = events_at(&minutes, "x");
    let curve = ActivityCurve::from_histogram(&ActivityHistogram::from_events(&events));

    assert_eq!(curve.len(), 288);
    for (minute, density) in curve.points() {
        assert!(density >= 0.0);
        let near_event = minutes.iter().any(|&m| circular_distance(minute, m) < 60);
        assert_eq!(density > 0.0, near_event, "minute {minute}");
    }
}

#[test]
fn fitted_models_respect_invariants() {
    let batches: Vec<Vec<u32>> = vec![
        vec![420, 480, 600, 720, 900, 1020, 1200, 1320],
        vec![0, 10, 1430],
        vec![720],
        (0..MINUTES_PER_DAY).step_by(TIMESTEP_MINUTES as usize * 7).collect(),
    ];

    let fitter = SquareWaveFitter::new();
    for minutes in batches {
        let events = events_at(&minutes, "x");
        let curve = ActivityCurve::from_histogram(&ActivityHistogram::from_events(&events));
        let model = fitter.fit(&curve);

        assert!(model.wake_minute.abs_diff(model.bed_minute) >= 60);
        assert!(model.wake_minute < MINUTES_PER_DAY && model.bed_minute < MINUTES_PER_DAY);
        assert!(model.confidence <= 1.0);
        assert_eq!(model.minutes_awake() + model.minutes_asleep(), MINUTES_PER_DAY);
        assert_eq!(fitter.fit(&curve), model);
    }
}

#[test]
fn classified_counts_match_recorded_totals() {
    let mut events = events_at(&[540; 5], "great fun");
    events.extend(events_at(&[600; 3], "awful day"));
    events.extend(events_at(&[660; 2], "going out"));
    events.extend(events_at(&[720; 4], "!!!"));

    let analyzer = Analyzer::new(Box::new(LexiconClassifier::new()), 20);
    let mut store = MemoryBaselineStore::new();
    let report = analyzer.analyze(&events, &mut store).unwrap();

    let snapshot = store.snapshot();
    assert_eq!((snapshot.positive, snapshot.negative, snapshot.neutral), (5, 3, 2));
    assert_eq!(report.sentiment.num_tweets, 10);
    assert_eq!(report.sentiment.positive, 50.0);
}

#[test]
fn only_prefix_is_classified() {
    let events = events_at(&[600; 30], "positive");
    let analyzer = Analyzer::new(Box::new(EchoClassifier), 5);
    let mut store = MemoryBaselineStore::new();

    let report = analyzer.analyze(&events, &mut store).unwrap();

    assert_eq!(report.sentiment.num_tweets, 5);
    assert_eq!(store.snapshot().positive, 5);
}

#[test]
fn unavailable_baseline_produces_no_report() {
    let analyzer = Analyzer::new(Box::new(LexiconClassifier::new()), 20);
    let result = analyzer.analyze(&events_at(&[600, 660], "hi"), &mut OfflineStore);
    assert!(matches!(
        result,
        Err(AnalysisError::Baseline(BaselineError::Unavailable(_)))
    ));
}

#[test]
fn file_baseline_carries_across_runs() {
    let path = std::env::temp_dir().join(format!("rhythm-pipeline-{}.json", uuid::Uuid::new_v4()));
    let analyzer = Analyzer::new(Box::new(LexiconClassifier::new()), 20);
    let minutes: Vec<u32> = (8..23).map(|h| h * 60).collect();
    let events = events_at(&minutes, "lovely");

    let first = {
        let mut store = FileBaselineStore::open(&path).unwrap();
        analyzer.analyze(&events, &mut store).unwrap()
    };
    let second = {
        let mut store = FileBaselineStore::open(&path).unwrap();
        analyzer.analyze(&events, &mut store).unwrap()
    };

    assert_eq!(first.rest_percentage, "100.00");
    assert_eq!(second.rest_percentage, "0.00");
    assert!(!second.well_rested);

    let store = FileBaselineStore::open(&path).unwrap();
    assert_eq!(store.snapshot().nights_recorded, 2);
    assert_eq!(store.snapshot().positive, 30);

    let _ = std::fs::remove_file(&path);
}
