//! Sentiment classifiers.
//!
//! `LexiconClassifier` works offline and is the default. With the `gateway`
//! feature, `BlockingRemoteClassifier` delegates to an HTTP service.

pub mod lexicon;

#[cfg(feature = "gateway")]
pub mod remote;

pub use lexicon::LexiconClassifier;

#[cfg(feature = "gateway")]
pub use remote::{BlockingRemoteClassifier, RemoteClassifier, RemoteClassifierConfig};
