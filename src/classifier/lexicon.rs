//! Word-list sentiment classifier.
//!
//! Scores a text by counting positive and negative words. Negators flip the
//! polarity of the next scored word ("not happy" counts as negative).

use crate::core::sentiment::{Classification, ClassifierError, Sentiment, SentimentClassifier};
use std::collections::HashSet;

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "better", "brilliant", "calm", "cool",
    "enjoy", "enjoyed", "excellent", "excited", "fantastic", "fun", "glad", "good",
    "great", "happy", "hope", "love", "loved", "lovely", "lucky", "nice", "perfect",
    "proud", "relaxed", "rested", "smile", "thanks", "thank", "wonderful", "win", "yay",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoyed", "anxious", "awful", "bad", "bored", "broken", "cry", "depressed",
    "exhausted", "fail", "failed", "hate", "hated", "horrible", "hurt", "lonely", "lost",
    "mad", "miserable", "sad", "sick", "sorry", "stressed", "terrible", "tired", "ugh",
    "upset", "worried", "worse", "worst",
];

const NEGATORS: &[&str] = &["not", "no", "never", "dont", "don't", "isnt", "isn't", "cant", "can't"];

/// Built-in classifier backed by fixed word lists.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negators: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
            negators: NEGATORS.iter().copied().collect(),
        }
    }

    /// Net score of a text; `None` when it contains no words at all.
    pub fn score(&self, text: &str) -> Option<i32> {
        let mut score = 0;
        let mut words = 0;
        let mut negate = false;

        for word in tokenize(text) {
            words += 1;
            if self.negators.contains(word.as_str()) {
                negate = true;
                continue;
            }

            let polarity = if self.positive.contains(word.as_str()) {
                1
            } else if self.negative.contains(word.as_str()) {
                -1
            } else {
                continue;
            };

            score += if negate { -polarity } else { polarity };
            negate = false;
        }

        (words > 0).then_some(score)
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let classification = match self.score(text) {
            None => Classification::Unrecognized,
            Some(s) if s > 0 => Classification::Label(Sentiment::Positive),
            Some(s) if s < 0 => Classification::Label(Sentiment::Negative),
            Some(_) => Classification::Label(Sentiment::Neutral),
        };
        Ok(classification)
    }
}

/// Lowercased words with mentions and links removed; only letters and apostrophes are kept.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .filter(|raw| !raw.starts_with('@') && !raw.starts_with("http"))
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_alphabetic() || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| word.chars().any(char::is_alphabetic))
}
