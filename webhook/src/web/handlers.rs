//! Webhook endpoint handlers.
//!
//! Strava retries any delivery that is not answered with a 200, so events
//! we choose to ignore are still acknowledged with "OK". Only forged
//! events and failures surface as errors.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Method,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::WebhookError;
use crate::queue::EventPublisher;
use crate::strava::{ActivityAction, EventFilter, Verdict};
use crate::web::verify::{verify_subscription, ChallengeResponse, HubParams};
use crate::Config;

/// Body written for every acknowledged event.
pub const ACK: &str = "OK";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub filter: Arc<EventFilter>,
    pub publisher: Arc<dyn EventPublisher>,
}

impl AppState {
    pub fn new(config: Config, publisher: Arc<dyn EventPublisher>) -> Self {
        let filter = EventFilter::from_config(&config);
        Self {
            config: Arc::new(config),
            filter: Arc::new(filter),
            publisher,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // `get` would otherwise answer HEAD with the handshake
    let webhook = get(verify_webhook)
        .head(method_not_allowed)
        .post(enqueue_event)
        .fallback(method_not_allowed);

    Router::new()
        .route("/", webhook.clone())
        .route("/webhook", webhook)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Subscription handshake (GET)
// =============================================================================

pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<HubParams>,
) -> Result<Json<ChallengeResponse>, WebhookError> {
    info!(mode = %params.mode, "subscription_request_received");

    verify_subscription(params, &state.config.credentials.verify_token).map(Json)
}

// =============================================================================
// Event ingestion (POST)
// =============================================================================

/// Parse, filter and forward one event.
///
/// The body is taken raw so that decode errors map to our own 400 rather
/// than the extractor's rejection.
pub async fn enqueue_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, WebhookError> {
    let action = ActivityAction::from_slice(&body).map_err(|e| {
        warn!(error = %e, body_length = body.len(), "event_payload_malformed");
        WebhookError::MalformedPayload(e)
    })?;

    info!(
        owner_id = action.owner_id,
        object_id = action.object_id,
        aspect_type = %action.aspect_type,
        object_type = %action.object_type,
        "event_received"
    );

    match state.filter.evaluate(&action) {
        Verdict::Forward => {}
        Verdict::IgnoredAthlete => {
            info!(owner_id = action.owner_id, "event_athlete_ignored");
            return Ok(ACK);
        }
        Verdict::SubscriptionMismatch => {
            warn!(
                subscription_id = action.subscription_id,
                "event_subscription_invalid"
            );
            return Err(WebhookError::SubscriptionMismatch);
        }
        Verdict::UnsupportedAction => {
            warn!(
                aspect_type = %action.aspect_type,
                object_type = %action.object_type,
                update_type = %action.updates.kind,
                "event_action_ignored"
            );
            return Ok(ACK);
        }
    }

    let payload = action.to_payload().map_err(|e| {
        error!(error = %e, "event_serialization_failed");
        WebhookError::Serialization(e)
    })?;

    let message_id = state
        .publisher
        .publish(&state.config.topic, payload)
        .await
        .map_err(|e| {
            error!(
                severity = "ALERT",
                error = %e,
                topic = %state.config.topic,
                "event_publish_failed"
            );
            WebhookError::Publish(e)
        })?;

    info!(message_id = %message_id, "event_message_sent");
    info!(
        "athlete {} {}s {}",
        action.owner_id, action.aspect_type, action.object_id
    );

    Ok(ACK)
}

// =============================================================================
// Everything else
// =============================================================================

pub async fn method_not_allowed(method: Method) -> WebhookError {
    error!(method = %method, "method_not_allowed");
    WebhookError::MethodNotAllowed(method)
}
