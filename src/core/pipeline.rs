//! End-to-end batch analysis.
//!
//! Classification happens first so a classifier failure never touches the
//! baseline. Both baseline comparisons are computed from the values as they
//! stand before the batch, and the batch's increments are then written with a
//! single `record` call, so a failing store never keeps half a batch.

use crate::baseline::{BaselineError, BaselineStore};
use crate::core::fitting::{SleepModel, SquareWaveFitter};
use crate::core::histogram::ActivityHistogram;
use crate::core::report::{Report, ReportBuilder};
use crate::core::sentiment::{ClassifierError, SentimentAggregator, SentimentClassifier};
use crate::core::sleep::{assemble_sleep_stats, night_to_record};
use crate::core::smoothing::ActivityCurve;
use crate::ingest::Event;

/// Analyzer for one user's batches.
pub struct Analyzer<C: SentimentClassifier + ?Sized> {
    fitter: SquareWaveFitter,
    aggregator: SentimentAggregator,
    builder: ReportBuilder,
    classifier: Box<C>,
}

impl<C: SentimentClassifier + ?Sized> Analyzer<C> {
    /// Create an analyzer classifying at most `max_tweets` posts per batch.
    pub fn new(classifier: Box<C>, max_tweets: usize) -> Self {
        Self {
            fitter: SquareWaveFitter::new(),
            aggregator: SentimentAggregator::new(max_tweets),
            builder: ReportBuilder::new(),
            classifier,
        }
    }

    /// Replace the report builder (e.g. to drop metadata).
    pub fn with_builder(mut self, builder: ReportBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Fit the sleep model for a batch without touching any baseline.
    pub fn fit(&self, events: &[Event]) -> (ActivityCurve, SleepModel) {
        let histogram = ActivityHistogram::from_events(events);
        let curve = ActivityCurve::from_histogram(&histogram);
        let model = self.fitter.fit(&curve);
        (curve, model)
    }

    /// Analyze a batch and update the user's baseline.
    pub fn analyze(
        &self,
        events: &[Event],
        store: &mut dyn BaselineStore,
    ) -> Result<Report, AnalysisError> {
        let counts = self
            .aggregator
            .tally(events.iter().map(|e| e.text.as_str()), &*self.classifier)?;

        let histogram = ActivityHistogram::from_events(events);
        let curve = ActivityCurve::from_histogram(&histogram);
        let model = self.fitter.fit(&curve);

        let sleep = assemble_sleep_stats(&model, store)?;
        let sentiment = self.aggregator.compare(counts, store)?;
        store.record(night_to_record(&model), counts)?;

        tracing::info!(
            events = events.len(),
            wake = sleep.wake_minute,
            bed = sleep.bed_minute,
            classified = counts.total(),
            "Batch analyzed"
        );

        Ok(self.builder.build(
            &curve,
            &sleep,
            &sentiment,
            events.len(),
            histogram.offset_hours(),
        ))
    }
}

/// Analysis errors.
#[derive(Debug)]
pub enum AnalysisError {
    Baseline(BaselineError),
    Classifier(ClassifierError),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::Baseline(e) => write!(f, "{e}"),
            AnalysisError::Classifier(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Baseline(e) => Some(e),
            AnalysisError::Classifier(e) => Some(e),
        }
    }
}

impl From<BaselineError> for AnalysisError {
    fn from(e: BaselineError) -> Self {
        AnalysisError::Baseline(e)
    }
}

impl From<ClassifierError> for AnalysisError {
    fn from(e: ClassifierError) -> Self {
        AnalysisError::Classifier(e)
    }
}
