//! Signed tokens for local-backend upload URLs.
//!
//! Payload: expiry_ts (u64 BE) || content_type_len (u16 BE) || content_type || storage_key.
//! Token = base64url(payload || HMAC-SHA256(secret, payload)).

use crate::{StorageError, StorageResult};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const EXPIRY_LEN: usize = 8;
const CONTENT_TYPE_LEN_LEN: usize = 2;
const HEADER_LEN: usize = EXPIRY_LEN + CONTENT_TYPE_LEN_LEN;
const MAC_LEN: usize = 32; // SHA256

/// What a verified upload token allows the bearer to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadGrant {
    pub storage_key: String,
    pub content_type: String,
    pub expires_at: u64,
}

fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn mac_for(secret: &[u8], payload: &[u8]) -> StorageResult<Hmac<Sha256>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| StorageError::ConfigError(format!("Invalid signing key: {}", e)))?;
    mac.update(payload);
    Ok(mac)
}

/// Build a token granting one upload of `content_type` to `storage_key`.
pub fn create(
    storage_key: &str,
    content_type: &str,
    expires_in: Duration,
    secret: &[u8],
) -> StorageResult<String> {
    create_with_expiry(storage_key, content_type, now_ts() + expires_in.as_secs(), secret)
}

fn create_with_expiry(
    storage_key: &str,
    content_type: &str,
    expiry_ts: u64,
    secret: &[u8],
) -> StorageResult<String> {
    let content_type_len = u16::try_from(content_type.len())
        .map_err(|_| StorageError::InvalidToken("content type too long".to_string()))?;

    let mut payload =
        Vec::with_capacity(HEADER_LEN + content_type.len() + storage_key.len() + MAC_LEN);
    payload.extend_from_slice(&expiry_ts.to_be_bytes());
    payload.extend_from_slice(&content_type_len.to_be_bytes());
    payload.extend_from_slice(content_type.as_bytes());
    payload.extend_from_slice(storage_key.as_bytes());

    let tag = mac_for(secret, &payload)?.finalize().into_bytes();
    payload.extend_from_slice(&tag);

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload))
}

/// Verify a token and return the upload it grants.
pub fn verify(token: &str, secret: &[u8]) -> StorageResult<UploadGrant> {
    let invalid = || StorageError::InvalidToken("malformed token".to_string());

    let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| invalid())?;
    if decoded.len() < HEADER_LEN + MAC_LEN {
        return Err(invalid());
    }

    let (payload, tag) = decoded.split_at(decoded.len() - MAC_LEN);
    mac_for(secret, payload)?
        .verify_slice(tag)
        .map_err(|_| StorageError::InvalidToken("signature mismatch".to_string()))?;

    let mut expiry = [0u8; EXPIRY_LEN];
    expiry.copy_from_slice(&payload[..EXPIRY_LEN]);
    let expires_at = u64::from_be_bytes(expiry);
    if now_ts() > expires_at {
        return Err(StorageError::TokenExpired);
    }

    let mut len = [0u8; CONTENT_TYPE_LEN_LEN];
    len.copy_from_slice(&payload[EXPIRY_LEN..HEADER_LEN]);
    let content_type_end = HEADER_LEN + u16::from_be_bytes(len) as usize;
    if content_type_end > payload.len() {
        return Err(invalid());
    }

    let content_type = std::str::from_utf8(&payload[HEADER_LEN..content_type_end])
        .map_err(|_| invalid())?
        .to_string();
    let storage_key = std::str::from_utf8(&payload[content_type_end..])
        .map_err(|_| invalid())?
        .to_string();

    Ok(UploadGrant {
        storage_key,
        content_type,
        expires_at,
    })
}
