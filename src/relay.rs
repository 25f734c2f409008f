//! The gates every relayed message passes through, in order: client
//! identification, authorization, validation and sanitization.
//!
//! Rate limiting sits between identification and authorization and lives in
//! [`crate::rate_limit`].

use axum::extract::Query;
use axum::http::{HeaderMap, Uri};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;

use crate::error::RelayError;
use crate::models::RelayRequest;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const SECRET_HEADER: &str = "x-api-secret";
pub const UNKNOWN_CLIENT: &str = "unknown";
pub const ANONYMOUS: &str = "Anonymous";
pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Default, Deserialize)]
struct SecretQuery {
    secret: Option<String>,
}

/// First hop of `x-forwarded-for`, else the socket peer, else `"unknown"`.
pub fn resolve_client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => UNKNOWN_CLIENT.to_string(),
    }
}

/// Secret supplied by the caller: the header wins, the `secret` query
/// parameter is consulted only when the header is missing or empty.
pub fn provided_secret(headers: &HeaderMap, uri: &Uri) -> String {
    let from_header = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    if let Some(secret) = from_header {
        return secret.to_string();
    }

    Query::<SecretQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.secret)
        .unwrap_or_default()
}

pub fn authorize(expected: Option<&str>, provided: &str) -> Result<(), RelayError> {
    match expected {
        None => Ok(()),
        Some(expected) if secrets_match(expected, provided) => Ok(()),
        Some(_) => Err(RelayError::Unauthorized),
    }
}

// compares fixed-size digests without early exit
fn secrets_match(expected: &str, provided: &str) -> bool {
    let a = Sha256::digest(expected.as_bytes());
    let b = Sha256::digest(provided.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Parse and sanitize the JSON body. Anything that does not yield a
/// non-blank string `message` counts as a missing message.
pub fn parse_request(body: &[u8], client_id: String) -> Result<RelayRequest, RelayError> {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(RelayError::MessageRequired)?;

    let name = value.get("name").and_then(Value::as_str);

    Ok(RelayRequest {
        name: sanitize_name(name),
        message: truncate_chars(message, MAX_MESSAGE_CHARS).to_string(),
        client_id,
    })
}

pub fn sanitize_name(name: Option<&str>) -> String {
    let trimmed = truncate_chars(name.unwrap_or_default().trim(), MAX_NAME_CHARS);
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.to_string()
    }
}

// truncates on a char boundary, counting chars rather than bytes
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub fn compose_text(req: &RelayRequest) -> String {
    format!(
        "📩 New Message\nFrom: {}\nIP: {}\n\n{}",
        req.name, req.client_id, req.message
    )
}
