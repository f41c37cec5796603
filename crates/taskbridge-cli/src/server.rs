//! Webhook HTTP server.
//!
//! - `POST /webhook`: one source-control delivery, answered with the
//!   `EventOutcome` as JSON
//! - `GET /healthz`: liveness probe

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use taskbridge_core::{event_span, Reconciler, METRICS};
use tokio::net::TcpListener;
use tracing::{info, warn, Instrument};

use crate::signature;

const EVENT_HEADER: &str = "x-github-event";
const DELIVERY_HEADER: &str = "x-github-delivery";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";

#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            webhook_secret: None,
        }
    }

    /// Require a valid `X-Hub-Signature-256` on every delivery.
    pub fn with_webhook_secret(mut self, secret: &str) -> Self {
        self.webhook_secret = Some(Arc::from(secret));
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve until Ctrl-C, then flush metrics.
pub async fn serve(state: AppState, listen: &str) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    info!(addr = %listener.local_addr()?, "webhook server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server failed")?;

    METRICS.flush();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn healthz() -> &'static str {
    "ok"
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery = header(&headers, DELIVERY_HEADER)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let Some(event_type) = header(&headers, EVENT_HEADER) else {
        return error_response(StatusCode::BAD_REQUEST, "missing X-GitHub-Event header");
    };

    if let Some(secret) = state.webhook_secret.as_deref() {
        if let Err(e) = signature::verify(secret, &body, header(&headers, SIGNATURE_HEADER)) {
            warn!(delivery_id = %delivery, error = %e, "rejected webhook delivery");
            return error_response(StatusCode::UNAUTHORIZED, e);
        }
    }

    let span = event_span(event_type, &delivery);
    match state
        .reconciler
        .handle_event(event_type, &body)
        .instrument(span)
        .await
    {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            warn!(delivery_id = %delivery, error = %e, "rejected webhook payload");
            error_response(StatusCode::BAD_REQUEST, e)
        }
    }
}
