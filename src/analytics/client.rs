//! Detection feed client.
//!
//! Fetches a batch of detection records from the external processor.
//! Every failure is terminal for the request: no retry, no backoff,
//! no fallback computation.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{DetectionFeedResponse, DetectionRecord};

/// Failure modes of an analytics computation.
///
/// An empty batch is not an error; see
/// [`AnalyticsReport::Empty`](crate::models::AnalyticsReport).
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The detection feed answered with a non-success status.
    #[error("detection feed returned status {0}")]
    UpstreamUnavailable(StatusCode),

    /// The body could not be interpreted as a detection batch.
    #[error("detection feed response did not match the expected shape: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Any other failure during fetch or reduction.
    #[error("{0}")]
    Aggregation(String),
}

/// Client for the external detection processor.
pub struct DetectionFeed {
    http_client: reqwest::Client,
    url: String,
    timeout_seconds: u64,
}

impl DetectionFeed {
    /// Create a client with the configured request timeout.
    pub fn new(url: String, timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            url,
            timeout_seconds,
        })
    }

    /// Fetch one batch of detection records.
    ///
    /// No authentication header is attached; the feed is reached over
    /// the internal network.
    pub async fn fetch(&self) -> Result<Vec<DetectionRecord>, AnalyticsError> {
        debug!("Fetching detection batch from {}", self.url);

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyticsError::Aggregation(format!(
                        "detection feed request timed out after {}s",
                        self.timeout_seconds
                    ))
                } else if e.is_connect() {
                    AnalyticsError::Aggregation(format!(
                        "cannot connect to detection feed at {}",
                        self.url
                    ))
                } else {
                    AnalyticsError::Aggregation(format!("failed to fetch detection feed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(AnalyticsError::UpstreamUnavailable(response.status()));
        }

        let body = response.text().await.map_err(|e| {
            AnalyticsError::Aggregation(format!("failed to read detection feed body: {}", e))
        })?;

        parse_feed(&body)
    }
}

/// Parse a feed body into detection records.
///
/// An absent `detections` array is an empty batch; anything else that
/// does not match the expected shape is malformed.
pub fn parse_feed(body: &str) -> Result<Vec<DetectionRecord>, AnalyticsError> {
    let feed: DetectionFeedResponse = serde_json::from_str(body)?;
    Ok(feed.detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_full_batch() {
        let body = r#"{
            "detections": [
                {"label": "Worker", "confidence": 0.9, "alert": false},
                {"label": "Hard Hat", "confidence": 1.0}
            ]
        }"#;

        let records = parse_feed(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "Worker");
        assert!(!records[1].alert);
    }

    #[test]
    fn test_parse_feed_missing_detections_is_empty() {
        let records = parse_feed("{}").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_feed_rejects_missing_confidence() {
        let body = r#"{"detections": [{"label": "Worker"}]}"#;
        let err = parse_feed(body).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_feed_rejects_non_json() {
        let err = parse_feed("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_feed_rejects_wrong_shape() {
        let err = parse_feed(r#"{"detections": "none"}"#).unwrap_err();
        assert!(matches!(err, AnalyticsError::MalformedResponse(_)));
    }

    #[test]
    fn test_client_builds_with_timeout() {
        let feed = DetectionFeed::new("http://localhost:9000/detections".to_string(), 10);
        assert!(feed.is_ok());
    }
}
