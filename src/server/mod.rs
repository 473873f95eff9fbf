//! HTTP surface.
//!
//! The application state and router are constructed explicitly at
//! startup and injected into handlers; there are no ambient
//! singletons.

pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::analytics::DetectionFeed;
use crate::auth::{TokenService, UserStore};
use crate::config::Config;
use crate::storage::ObjectStore;

/// Maximum accepted upload body size.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<UserStore>,
    pub storage: Arc<ObjectStore>,
    pub feed: Arc<DetectionFeed>,
}

impl AppState {
    /// Construct all services from the loaded configuration.
    pub async fn from_config(config: Config) -> Result<Self> {
        let secret = token_secret(&config)?;
        let tokens = TokenService::new(&secret, config.auth.token_ttl_minutes);

        let users = UserStore::new();
        users.seed(&config.auth.users);

        let storage = ObjectStore::new(&config.storage).await;

        let feed = DetectionFeed::new(
            config.analytics.upstream_url.clone(),
            config.analytics.timeout_seconds,
        )?;

        Ok(Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            users: Arc::new(users),
            storage: Arc::new(storage),
            feed: Arc::new(feed),
        })
    }
}

/// Resolve the token signing secret from config.
fn token_secret(config: &Config) -> Result<Vec<u8>> {
    if config.auth.secret.is_empty() {
        warn!("No auth secret configured; tokens will not survive a restart");
        let mut secret = [0u8; 32];
        aws_lc_rs::rand::fill(&mut secret).map_err(|_| anyhow!("Failed to generate auth secret"))?;
        Ok(secret.to_vec())
    } else {
        Ok(config.auth.secret.as_bytes().to_vec())
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.server.cors_origins)?;

    let router = Router::new()
        .route("/", get(routes::root))
        .route("/auth/register", post(routes::register))
        .route("/auth/login", post(routes::login))
        .route("/protected", get(routes::protected))
        .route("/raw-videos", post(routes::upload_video))
        .route("/analytics", get(routes::get_analytics))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    Ok(router)
}

/// CORS for the configured dev origins, with credentials.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let mut values = Vec::with_capacity(origins.len());
    for origin in origins {
        let value: HeaderValue = origin
            .parse()
            .with_context(|| format!("Invalid CORS origin: {}", origin))?;
        values.push(value);
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Bind and serve until the process is stopped.
pub async fn run(state: AppState) -> Result<()> {
    let bind = state.config.server.bind.clone();
    let router = build_router(state)?;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on {}", bind);

    axum::serve(listener, router)
        .await
        .context("HTTP server terminated")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_valid_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:5173".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(cors_layer(&origins).is_err());
    }

    #[test]
    fn test_token_secret_falls_back_to_random() {
        let config = Config::default();
        let secret = token_secret(&config).unwrap();
        assert_eq!(secret.len(), 32);

        let mut config = Config::default();
        config.auth.secret = "dev-secret".to_string();
        assert_eq!(token_secret(&config).unwrap(), b"dev-secret".to_vec());
    }

    #[tokio::test]
    async fn test_router_builds_from_default_config() {
        let state = AppState::from_config(Config::default()).await.unwrap();
        assert!(build_router(state).is_ok());
    }
}
