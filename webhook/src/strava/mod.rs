//! Strava webhook event model and the filter pipeline applied to it.
//!
//! Reference: https://developers.strava.com/docs/webhooks/

pub mod filter;
pub mod types;

pub use filter::{is_supported_action, EventFilter, Verdict};
pub use types::{ActivityAction, ActivityUpdates};
