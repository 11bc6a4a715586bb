//! Web server module for the Strava webhook endpoint.
//!
//! GET requests run the subscription handshake, POST requests carry
//! events that are filtered and relayed to the queue.

pub mod handlers;
pub mod verify;

pub use handlers::{
    enqueue_event, health, method_not_allowed, router, verify_webhook, AppState, HealthResponse,
};
pub use verify::{verify_subscription, ChallengeResponse, HubParams};
