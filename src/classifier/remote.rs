//! HTTP client for an external sentiment classification service.
//!
//! The service exposes `POST /v1/classify` taking `{"text": ...}` and
//! answering `{"label": "positive" | "negative" | "neutral" | ...}`. Labels
//! outside the three known ones are treated as unrecognized.

use crate::core::sentiment::{Classification, ClassifierError, SentimentClassifier};
use serde::{Deserialize, Serialize};

/// Classifier service configuration.
#[derive(Debug, Clone)]
pub struct RemoteClassifierConfig {
    /// Service host (default: 127.0.0.1)
    pub host: String,
    /// Service port
    pub port: u16,
    /// Bearer authentication token
    pub token: String,
}

impl RemoteClassifierConfig {
    /// Create a new classifier configuration.
    pub fn new(host: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            token: token.into(),
        }
    }

    /// Configuration for a service on the loopback interface.
    pub fn local(port: u16, token: impl Into<String>) -> Self {
        Self::new("127.0.0.1", port, token)
    }

    /// Get the full service URL.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Get the classify endpoint URL.
    pub fn classify_url(&self) -> String {
        format!("{}/v1/classify", self.url())
    }

    /// Get the health check endpoint URL.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.url())
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

/// Response from the classify endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyResponse {
    pub label: String,
}

/// Async client for the classifier service.
pub struct RemoteClassifier {
    config: RemoteClassifierConfig,
    client: reqwest::Client,
}

impl RemoteClassifier {
    /// Create a new client.
    pub fn new(config: RemoteClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ClassifierError::Unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Test connection to the service.
    pub async fn test_connection(&self) -> Result<bool, ClassifierError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        Ok(response.status().is_success())
    }

    /// Classify one text.
    pub async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let response = self
            .client
            .post(self.config.classify_url())
            .header("Authorization", format!("Bearer {}", self.config.token))
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClassifierError::Unavailable(format!("{status}: {message}")));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        Ok(Classification::from_label(&body.label))
    }
}

/// Blocking client for use in synchronous contexts.
pub struct BlockingRemoteClassifier {
    inner: RemoteClassifier,
    runtime: tokio::runtime::Runtime,
}

impl BlockingRemoteClassifier {
    /// Create a new blocking client.
    pub fn new(config: RemoteClassifierConfig) -> Result<Self, ClassifierError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClassifierError::Unavailable(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: RemoteClassifier::new(config)?,
            runtime,
        })
    }

    /// Test connection to the service.
    pub fn test_connection(&self) -> Result<bool, ClassifierError> {
        self.runtime.block_on(self.inner.test_connection())
    }
}

impl SentimentClassifier for BlockingRemoteClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        self.runtime.block_on(self.inner.classify(text))
    }
}
