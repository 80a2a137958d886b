//! Sentiment aggregation against the historical baseline.
//!
//! Only a bounded prefix of the batch is classified. Texts the classifier
//! cannot place are skipped rather than counted as neutral.

use crate::baseline::{BaselineError, BaselineStore};
use crate::core::clock::format_2dp;
use serde::{Deserialize, Serialize};

/// Default number of posts classified per batch.
pub const DEFAULT_MAX_TWEETS: usize = 20;

/// The three sentiment labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Outcome of classifying one text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Label(Sentiment),
    Unrecognized,
}

impl Classification {
    /// Interpret a label string from an external classifier.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" => Classification::Label(Sentiment::Positive),
            "negative" | "neg" => Classification::Label(Sentiment::Negative),
            "neutral" | "neu" => Classification::Label(Sentiment::Neutral),
            _ => Classification::Unrecognized,
        }
    }
}

/// Text sentiment classifier.
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

/// Per-label counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }

    /// Positive and negative shares in percent; (0, 0) when empty.
    pub fn percentages(&self) -> (f64, f64) {
        self.percentages_over(self.total())
    }

    fn percentages_over(&self, total: u64) -> (f64, f64) {
        if total == 0 {
            return (0.0, 0.0);
        }
        let total = total as f64;
        (
            100.0 * self.positive as f64 / total,
            100.0 * self.negative as f64 / total,
        )
    }
}

/// Sentiment fields of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    /// Classified posts, floored to 1
    pub num_tweets: u64,
    /// Batch positive share in percent
    pub positive: f64,
    /// Batch negative share in percent
    pub negative: f64,
    /// Batch positive share minus baseline positive share
    pub positive_relative: f64,
    /// Batch negative share minus baseline negative share
    pub negative_relative: f64,
    pub pos_relative_str: String,
    pub neg_relative_str: String,
}

/// Classifies a batch prefix and compares it with the baseline.
#[derive(Debug, Clone)]
pub struct SentimentAggregator {
    max_tweets: usize,
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TWEETS)
    }
}

impl SentimentAggregator {
    pub fn new(max_tweets: usize) -> Self {
        Self { max_tweets }
    }

    /// Classify up to `max_tweets` texts and count the recognized labels.
    pub fn tally<'a, I, C>(&self, texts: I, classifier: &C) -> Result<SentimentCounts, ClassifierError>
    where
        I: IntoIterator<Item = &'a str>,
        C: SentimentClassifier + ?Sized,
    {
        let mut counts = SentimentCounts::default();
        for text in texts.into_iter().take(self.max_tweets) {
            match classifier.classify(text)? {
                Classification::Label(sentiment) => counts.record(sentiment),
                Classification::Unrecognized => {
                    tracing::trace!("Skipping unclassifiable text");
                }
            }
        }
        Ok(counts)
    }

    /// Compare a tally against the baseline as it stands before this batch.
    pub fn compare(
        &self,
        counts: SentimentCounts,
        store: &dyn BaselineStore,
    ) -> Result<SentimentStats, BaselineError> {
        let num_tweets = counts.total().max(1);
        let (positive, negative) = counts.percentages_over(num_tweets);

        let baseline = store.sentiment_totals()?;
        let (baseline_positive, baseline_negative) = baseline.percentages();

        let positive_relative = positive - baseline_positive;
        let negative_relative = negative - baseline_negative;

        Ok(SentimentStats {
            num_tweets,
            positive,
            negative,
            positive_relative,
            negative_relative,
            pos_relative_str: format_2dp(positive_relative),
            neg_relative_str: format_2dp(negative_relative),
        })
    }
}

/// Classifier errors.
#[derive(Debug)]
pub enum ClassifierError {
    /// The classifier service could not be reached
    Unavailable(String),
    /// The classifier answered with something unreadable
    InvalidResponse(String),
}

impl std::fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierError::Unavailable(e) => write!(f, "Classifier unavailable: {e}"),
            ClassifierError::InvalidResponse(e) => write!(f, "Classifier response invalid: {e}"),
        }
    }
}

impl std::error::Error for ClassifierError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{BaselineSnapshot, MemoryBaselineStore};

    /// Treats the text itself as the label.
    struct EchoClassifier;

    impl SentimentClassifier for EchoClassifier {
        fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
            Ok(Classification::from_label(text))
        }
    }

    #[test]
    fn test_from_label() {
        assert_eq!(
            Classification::from_label(" Positive "),
            Classification::Label(Sentiment::Positive)
        );
        assert_eq!(
            Classification::from_label("neg"),
            Classification::Label(Sentiment::Negative)
        );
        assert_eq!(Classification::from_label("mixed"), Classification::Unrecognized);
    }

    #[test]
    fn test_tally_respects_prefix_limit() {
        let texts = vec!["positive"; 30];
        let counts = SentimentAggregator::default()
            .tally(texts.iter().copied(), &EchoClassifier)
            .unwrap();
        assert_eq!(counts.positive, 20);
    }

    #[test]
    fn test_tally_skips_unrecognized() {
        let texts = ["positive", "???", "neutral", "negative", "sarcastic"];
        let counts = SentimentAggregator::new(10)
            .tally(texts.iter().copied(), &EchoClassifier)
            .unwrap();
        assert_eq!(counts.total(), 3);
        assert_eq!((counts.positive, counts.negative, counts.neutral), (1, 1, 1));
    }

    #[test]
    fn test_relative_to_current_baseline() {
        let store = MemoryBaselineStore::from_snapshot(BaselineSnapshot {
            positive: 50,
            negative: 30,
            neutral: 20,
            ..BaselineSnapshot::default()
        });
        let counts = SentimentCounts {
            positive: 8,
            negative: 2,
            neutral: 0,
        };

        let stats = SentimentAggregator::default()
            .compare(counts, &store)
            .unwrap();

        assert_eq!(stats.num_tweets, 10);
        assert!((stats.positive_relative - 30.0).abs() < 1e-9);
        assert!((stats.negative_relative + 10.0).abs() < 1e-9);
        assert_eq!(stats.pos_relative_str, "30.00");
        assert_eq!(stats.neg_relative_str, "-10.00");
        // Comparing does not move the baseline
        assert_eq!(store.snapshot().positive, 50);
        assert_eq!(store.snapshot().negative, 30);
    }

    #[test]
    fn test_zero_classified_floors_count() {
        let store = MemoryBaselineStore::new();
        let stats = SentimentAggregator::default()
            .compare(SentimentCounts::default(), &store)
            .unwrap();

        assert_eq!(stats.num_tweets, 1);
        assert_eq!(stats.positive, 0.0);
        assert_eq!(stats.negative, 0.0);
        assert_eq!(stats.positive_relative, 0.0);
        assert_eq!(stats.negative_relative, 0.0);
    }

    #[test]
    fn test_classifier_error_propagates() {
        struct Down;
        impl SentimentClassifier for Down {
            fn classify(&self, _: &str) -> Result<Classification, ClassifierError> {
                Err(ClassifierError::Unavailable("offline".to_string()))
            }
        }

        let result = SentimentAggregator::default().tally(["hello"], &Down);
        assert!(matches!(result, Err(ClassifierError::Unavailable(_))));
    }
}
