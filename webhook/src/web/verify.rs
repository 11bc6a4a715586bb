//! Strava subscription handshake.
//!
//! When a subscription is created Strava sends a GET with `hub.mode`,
//! `hub.verify_token` and `hub.challenge`. The receiver proves it owns the
//! endpoint by echoing the challenge back, but only if the token matches.
//! Reference: https://developers.strava.com/docs/webhooks/#subscriptions

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::WebhookError;

/// The only `hub.mode` Strava sends.
pub const MODE_SUBSCRIBE: &str = "subscribe";

/// Handshake query parameters. Absent parameters read as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HubParams {
    #[serde(rename = "hub.mode")]
    pub mode: String,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: String,
    #[serde(rename = "hub.challenge")]
    pub challenge: String,
}

/// Body returned on a successful handshake.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeResponse {
    #[serde(rename = "hub.challenge")]
    pub challenge: String,
}

/// Check the handshake and return the challenge to echo.
pub fn verify_subscription(
    params: HubParams,
    expected_token: &str,
) -> Result<ChallengeResponse, WebhookError> {
    if params.mode != MODE_SUBSCRIBE {
        warn!(mode = %params.mode, "subscription_mode_not_supported");
        return Err(WebhookError::UnsupportedMode(params.mode));
    }

    if params.verify_token.is_empty()
        || expected_token.is_empty()
        || !constant_time_compare(&params.verify_token, expected_token)
    {
        warn!(
            token_length = params.verify_token.len(),
            "subscription_token_invalid"
        );
        return Err(WebhookError::InvalidToken);
    }

    info!(challenge_length = params.challenge.len(), "subscription_verified");

    Ok(ChallengeResponse {
        challenge: params.challenge,
    })
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
