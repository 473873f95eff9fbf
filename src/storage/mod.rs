//! Object storage client.
//!
//! Uploads go to a single S3 bucket; the public URL of an object is
//! deterministic from bucket, region, and key.

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

use crate::config::StorageConfig;

/// S3-backed object store.
pub struct ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl ObjectStore {
    /// Build a client from ambient AWS credentials and the configured
    /// region. Missing credentials surface on the first upload, not
    /// here.
    pub async fn new(config: &StorageConfig) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&shared),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
        }
    }

    /// Upload one object and return its public URL.
    pub async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        debug!(
            "Uploading {} bytes to s3://{}/{}",
            bytes.len(),
            self.bucket,
            key
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("Failed to upload s3://{}/{}", self.bucket, key))?;

        Ok(self.public_url(key))
    }

    /// Deterministic public URL for a key in the bucket.
    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, key)
    }
}

/// `https://{bucket}.s3.{region}.amazonaws.com/{key}`
pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}
