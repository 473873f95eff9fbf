//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// SafeSite Backend - safety monitoring HTTP service
///
/// Serves authentication, video upload to object storage, and the
/// safety analytics summary endpoint.
///
/// Examples:
///   safesite-backend
///   safesite-backend --bind 127.0.0.1:8080
///   safesite-backend --upstream-url http://feed.internal/detections
///   safesite-backend --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Socket address to bind the HTTP listener to
    ///
    /// Overrides the config file. Defaults to 0.0.0.0:8000.
    #[arg(short, long, value_name = "ADDR", env = "SAFESITE_BIND")]
    pub bind: Option<String>,

    /// Detection feed URL to fetch analytics from
    ///
    /// Overrides the config file setting.
    #[arg(long, value_name = "URL", env = "SAFESITE_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Detection feed request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub feed_timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for safesite.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default safesite.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate bind address format
        if let Some(ref bind) = self.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        // Validate upstream URL format
        if let Some(ref url) = self.upstream_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Upstream URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.feed_timeout {
            if timeout == 0 {
                return Err("Feed timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
