//! Bearer token issuance and verification.
//!
//! Access tokens are HS256 JWTs carrying the username plus issued-at
//! and expiry claims, signed with a shared secret.

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated username.
    pub sub: String,
    /// Issued-at as a unix timestamp.
    pub iat: i64,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Issues and verifies access tokens with a shared secret.
pub struct TokenService {
    encode: EncodingKey,
    decode: DecodingKey,
    ttl_minutes: u64,
}

impl TokenService {
    /// Create a service from the signing secret.
    pub fn new(secret: &[u8], ttl_minutes: u64) -> Self {
        Self {
            encode: EncodingKey::from_secret(secret),
            decode: DecodingKey::from_secret(secret),
            ttl_minutes,
        }
    }

    /// Seconds until a freshly issued token expires.
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_minutes * 60
    }

    /// Issue a token for the given username.
    pub fn issue(&self, username: &str) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_seconds() as i64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encode)
            .context("Failed to sign access token")
    }

    /// Verify a token and return its claims.
    ///
    /// Rejects expired tokens and signatures made with a different
    /// secret.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decode, &validation)
            .context("invalid or expired token")?;
        Ok(data.claims)
    }
}
