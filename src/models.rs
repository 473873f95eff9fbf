//! Data models for the SafeSite backend.
//!
//! This module contains the core data structures shared across
//! components: detection feed input, analytics output, users, and
//! the request/response bodies of the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One safety observation produced by the external vision pipeline.
///
/// `label` and `confidence` are required; a feed record missing either
/// fails parsing. `alert` is optional upstream and defaults to `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Detected object or category (e.g. "Worker", "Hard Hat").
    pub label: String,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
    /// Whether this detection triggered a safety alert.
    #[serde(default)]
    pub alert: bool,
}

/// Body returned by the detection processor.
///
/// The `detections` array may be absent entirely, which is treated as
/// an empty batch rather than a malformed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionFeedResponse {
    #[serde(default)]
    pub detections: Vec<DetectionRecord>,
}

/// Per-label detection count, in first-seen order of the label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u32,
}

/// One point of the synthetic accuracy trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub time: String,
    pub acc: f64,
}

/// Summary statistics derived from one detection batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// `1 - safety_alerts / total_detections`, rounded to 2 decimals.
    pub detection_accuracy: f64,
    /// Number of records in the batch.
    pub total_detections: u32,
    /// Number of records with `alert == true`.
    pub safety_alerts: u32,
    /// Mean confidence, rounded to 2 decimals.
    pub avg_confidence: f64,
    /// One entry per distinct label, insertion order = first seen.
    pub detections_by_category: Vec<CategoryCount>,
    /// Exactly four synthetic points ending at `detection_accuracy`.
    pub accuracy_trend: Vec<TrendPoint>,
}

/// Result of an aggregation pass.
///
/// An empty batch is a valid terminal state distinct from both a
/// computed summary and an error; no ratios are derived for it.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsReport {
    /// The feed returned zero records.
    Empty,
    /// Summary computed from a non-empty batch.
    Summary(AnalyticsSummary),
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// PBKDF2 hash in `salt:derived-key` base64url form. Only crosses
    /// the config boundary; never serialized into responses.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body returned by `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

/// Body returned by `POST /raw-videos` on success.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
    pub file_url: String,
}
