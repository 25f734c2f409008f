use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{ConnectInfo, Request, State},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::RelayError;
use crate::metrics::{REQUEST_TOTAL, SENT_TOTAL};
use crate::models::SendResponse;
use crate::rate_limit::RateLimitResult;
use crate::relay::{authorize, compose_text, parse_request, provided_secret, resolve_client_id};
use crate::state::AppState;

pub const MAX_BODY_BYTES: usize = 100 * 1024;

// POST /api/send - each gate short-circuits the request
pub async fn send_handler(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Result<Json<SendResponse>, RelayError> {
    REQUEST_TOTAL.inc();

    let (parts, body) = request.into_parts();
    // absent when the router is driven without a socket, e.g. in tests
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_id = resolve_client_id(&parts.headers, peer);

    if let RateLimitResult::Limited { retry_after } = state.rate_limiter.check(&client_id) {
        debug!(client = %client_id, ?retry_after, "Rate limit exceeded");
        return Err(RelayError::TooManyRequests { retry_after });
    }

    let secret = provided_secret(&parts.headers, &parts.uri);
    authorize(state.shared_secret.as_deref(), &secret)?;

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| RelayError::PayloadTooLarge { limit: MAX_BODY_BYTES })?;

    let relay_request = parse_request(&bytes, client_id)?;
    let text = compose_text(&relay_request);

    state.telegram.send_message(text).await?;

    SENT_TOTAL.inc();
    info!(
        client = %relay_request.client_id,
        name_chars = relay_request.name.chars().count(),
        chars = relay_request.message.chars().count(),
        "Message relayed"
    );

    Ok(Json(SendResponse { success: true }))
}
