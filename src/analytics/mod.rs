//! Analytics aggregation component.
//!
//! Fetches raw detection records from the external processor and
//! derives the summary statistics served at `/analytics`.

pub mod aggregator;
pub mod client;

pub use aggregator::summarize;
pub use client::{AnalyticsError, DetectionFeed};
