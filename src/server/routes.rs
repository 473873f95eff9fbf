//! Route handlers for the HTTP surface.
//!
//! Handlers translate component results into responses; every failure
//! becomes an `{"error": ...}` envelope via [`ApiError`].

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{password, Claims};
use crate::models::{AnalyticsReport, Credentials, TokenResponse, UploadResponse, User};
use crate::server::error::ApiError;
use crate::server::AppState;

/// `GET /` welcome message.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to SafeSite AI!" }))
}

/// `POST /auth/register` creates a user.
pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let password_hash = password::hash_password(&credentials.password)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let user = User {
        username: credentials.username.clone(),
        password_hash,
        created_at: Utc::now(),
    };

    state
        .users
        .insert(user)
        .map_err(|_| ApiError::conflict("Username already exists"))?;

    info!("Registered user {}", credentials.username);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "username": credentials.username })),
    ))
}

/// `POST /auth/login` exchanges credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .users
        .get(&credentials.username)
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    if !password::verify_password(&credentials.password, &user.password_hash) {
        warn!("Failed login attempt for {}", credentials.username);
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let access_token = state
        .tokens
        .issue(&user.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.ttl_seconds(),
    }))
}

/// `GET /protected` greets the authenticated user.
pub async fn protected(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let claims = authorize(&state, &headers)?;
    Ok(Json(json!({
        "message": format!("Hello, {}. This is protected.", claims.sub)
    })))
}

/// Extract and verify the bearer token from the Authorization header.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must be a bearer token"))?;

    state
        .tokens
        .verify(token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
}

/// `POST /raw-videos` stores a multipart video upload in the bucket.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_video(&content_type) {
            return Err(ApiError::bad_request("Uploaded file must be a video"));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;

        let file_name = timestamped_name(&original_name, Utc::now());
        let key = format!("{}/{}", state.config.storage.key_prefix, file_name);

        let file_url = state
            .storage
            .put(&key, data.to_vec(), &content_type)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;

        info!("Uploaded {} to {}", original_name, file_url);

        return Ok(Json(UploadResponse {
            message: "Upload successful".to_string(),
            file_name,
            file_url,
        }));
    }

    Err(ApiError::bad_request("Missing file field"))
}

/// Whether a MIME type denotes a video.
fn is_video(content_type: &str) -> bool {
    content_type.split('/').next() == Some("video")
}

/// Unique object name: upload timestamp prefixed onto the original.
fn timestamped_name(original: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), original)
}

/// `GET /analytics` fetches one detection batch and reduces it.
pub async fn get_analytics(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let records = state.feed.fetch().await?;

    match crate::analytics::summarize(&records) {
        AnalyticsReport::Empty => Ok(Json(json!({
            "message": "no detections available",
            "total_detections": 0,
        }))),
        AnalyticsReport::Summary(summary) => {
            let value = serde_json::to_value(&summary)
                .map_err(|e| ApiError::internal(format!("Failed to encode summary: {}", e)))?;
            Ok(Json(value))
        }
    }
}
