//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `safesite.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Analytics (detection feed) settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind the listener to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Origins allowed by CORS, with credentials.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost",
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:3000",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token signing secret (base64url or plain text).
    ///
    /// If empty, a random per-process secret is generated at startup and
    /// issued tokens do not survive a restart.
    #[serde(default)]
    pub secret: String,

    /// Minutes until an issued token expires.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,

    /// Users seeded into the store at startup.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
            users: Vec::new(),
        }
    }
}

fn default_token_ttl() -> u64 {
    60
}

/// A user entry in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    /// PBKDF2 hash in `salt:derived-key` base64url form.
    pub password_hash: String,
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Target S3 bucket.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// AWS region, also part of the public object URL.
    #[serde(default = "default_region")]
    pub region: String,

    /// Key prefix for uploaded videos.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            region: default_region(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_bucket() -> String {
    "safesite-videos".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_key_prefix() -> String {
    "raw-videos".to_string()
}

/// Analytics settings for the outbound detection feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// URL of the detection processor endpoint.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Request timeout in seconds for the feed fetch.
    #[serde(default = "default_feed_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            upstream_url: default_upstream_url(),
            timeout_seconds: default_feed_timeout(),
        }
    }
}

fn default_upstream_url() -> String {
    "http://localhost:9000/detections".to_string()
}

fn default_feed_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new("safesite.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }

        if let Some(ref upstream) = args.upstream_url {
            self.analytics.upstream_url = upstream.clone();
        }

        if let Some(timeout) = args.feed_timeout {
            self.analytics.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.storage.key_prefix, "raw-videos");
        assert_eq!(config.analytics.timeout_seconds, 10);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
bind = "127.0.0.1:9090"
cors_origins = ["http://localhost:4000"]

[auth]
secret = "dev-secret"
token_ttl_minutes = 15

[storage]
bucket = "my-videos"
region = "eu-west-1"

[analytics]
upstream_url = "http://feed.internal/detections"
timeout_seconds = 5
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9090");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:4000"]);
        assert_eq!(config.auth.secret, "dev-secret");
        assert_eq!(config.auth.token_ttl_minutes, 15);
        assert_eq!(config.storage.bucket, "my-videos");
        assert_eq!(config.storage.region, "eu-west-1");
        assert_eq!(config.analytics.upstream_url, "http://feed.internal/detections");
        assert_eq!(config.analytics.timeout_seconds, 5);
    }

    #[test]
    fn test_merge_with_args_overrides() {
        let mut config = Config::default();
        let args = crate::cli::Args {
            bind: Some("0.0.0.0:8080".to_string()),
            upstream_url: Some("http://other:9000/detections".to_string()),
            feed_timeout: Some(3),
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        };

        config.merge_with_args(&args);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.analytics.upstream_url, "http://other:9000/detections");
        assert_eq!(config.analytics.timeout_seconds, 3);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[auth]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[analytics]"));
    }
}
