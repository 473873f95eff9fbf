//! Password hashing.
//!
//! PBKDF2-HMAC-SHA256 with a fresh random salt per password. Stored
//! hashes use the form `base64url(salt):base64url(derived-key)`.

use anyhow::{anyhow, Result};
use aws_lc_rs::{pbkdf2, rand};
use base64::Engine;
use std::num::NonZeroU32;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const ITERATIONS: u32 = 100_000;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::fill(&mut salt).map_err(|_| anyhow!("Failed to generate password salt"))?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(ITERATIONS).expect("iteration count is nonzero"),
        &salt,
        password.as_bytes(),
        &mut key,
    );

    Ok(format!(
        "{}:{}",
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(salt),
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(key)
    ))
}

/// Verify a password against a stored hash.
///
/// The derived-key comparison is constant time. Any malformed stored
/// hash simply fails verification.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, key_b64)) = stored.split_once(':') else {
        return false;
    };

    let Ok(salt) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(salt_b64) else {
        return false;
    };
    let Ok(key) = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(key_b64) else {
        return false;
    };
    if key.len() != KEY_LEN {
        return false;
    }

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        NonZeroU32::new(ITERATIONS).expect("iteration count is nonzero"),
        &salt,
        password.as_bytes(),
        &key,
    )
    .is_ok()
}
