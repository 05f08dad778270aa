//! HTTP endpoint receiving Slack Events API deliveries.
//!
//! Requests are verified, decoded, and acknowledged immediately. The actual
//! dispatch runs on a spawned task after the response is sent.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::event::EventEnvelope;
use crate::slack::events::EventDispatcher;
use crate::slack::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::{AppError, Result};

/// State shared by the HTTP handlers.
pub struct ServerState {
    /// Event router.
    pub dispatcher: EventDispatcher,
    /// Request signature checker.
    pub verifier: SignatureVerifier,
}

/// Handler for `GET /health`. Always answers 200 with a plain-text body.
async fn health() -> &'static str {
    "ok"
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn receive_event(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(err) = state.verifier.verify(
        header_str(&headers, TIMESTAMP_HEADER),
        header_str(&headers, SIGNATURE_HEADER),
        &body,
        Utc::now().timestamp(),
    ) {
        warn!(%err, "rejected event delivery");
        return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
    }

    let envelope = match EventEnvelope::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(%err, "undecodable event delivery");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    if envelope.is_url_verification() {
        info!("answering url verification challenge");
        return match envelope.challenge {
            Some(challenge) => (StatusCode::OK, challenge).into_response(),
            None => (StatusCode::BAD_REQUEST, "missing challenge").into_response(),
        };
    }

    debug!(event_id = envelope.event_id.as_deref().unwrap_or(""), "event accepted");
    let dispatcher = state.dispatcher.clone();
    tokio::spawn(async move {
        dispatcher.dispatch(envelope).await;
    });

    StatusCode::OK.into_response()
}

/// Build the relay router with the events route mounted at `events_path`.
#[must_use]
pub fn router(events_path: &str, state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(events_path, post(receive_event))
        .with_state(state)
}

/// Serve `router` on `listener` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails while running.
pub async fn serve(listener: TcpListener, router: Router, ct: CancellationToken) -> Result<()> {
    let bind = listener
        .local_addr()
        .map_err(|err| AppError::Io(format!("listener has no local address: {err}")))?;
    info!(%bind, "starting slack events endpoint");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("http server error: {err}")))?;

    info!("slack events endpoint shut down");
    Ok(())
}

/// Wait for a spawned server task to finish.
///
/// # Errors
///
/// Returns `AppError::Io` if the task panicked or was aborted.
pub async fn join_server(handle: JoinHandle<()>) -> Result<()> {
    handle
        .await
        .map_err(|err| AppError::Io(format!("http server task failed: {err}")))
}
