//! SafeSite Backend - safety monitoring HTTP service
//!
//! Serves authentication, video upload to object storage, and the
//! safety analytics summary endpoint backed by an external detection
//! processor.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Runtime error (bind failure, bad config, etc.)

mod analytics;
mod auth;
mod cli;
mod config;
mod models;
mod server;
mod storage;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SafeSite Backend v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the server
    match run_server(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Server failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default safesite.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new("safesite.toml");

    if path.exists() {
        eprintln!("⚠️  safesite.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write safesite.toml")?;

    println!("✅ Created safesite.toml with default settings.");
    println!("   Edit it to customize server, auth, storage, and analytics.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration, build the application state, and serve.
async fn run_server(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    info!("Detection feed: {}", config.analytics.upstream_url);
    info!(
        "Storage: s3://{} ({})",
        config.storage.bucket, config.storage.region
    );

    let state = server::AppState::from_config(config).await?;
    server::run(state).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from safesite.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
