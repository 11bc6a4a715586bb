//! Decides what happens to a parsed event.
//!
//! Checks run in a fixed order and the first one that matches wins:
//! ignored athlete, foreign subscription, unsupported action.

use super::types::{ActivityAction, ASPECT_CREATE, ASPECT_UPDATE, OBJECT_ACTIVITY, OBJECT_ATHLETE};
use crate::Config;

/// Outcome of running an event through the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Publish the event
    Forward,
    /// Acknowledge without publishing
    IgnoredAthlete,
    /// Reject, the event belongs to another subscription
    SubscriptionMismatch,
    /// Acknowledge without publishing
    UnsupportedAction,
}

#[derive(Debug, Clone)]
pub struct EventFilter {
    subscription_id: i64,
    ignored_athletes: Vec<i64>,
}

impl EventFilter {
    pub fn new(subscription_id: i64, ignored_athletes: Vec<i64>) -> Self {
        Self {
            subscription_id,
            ignored_athletes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.credentials.subscription_id,
            config.ignored_athletes.clone(),
        )
    }

    pub fn evaluate(&self, action: &ActivityAction) -> Verdict {
        if self.ignored_athletes.contains(&action.owner_id) {
            return Verdict::IgnoredAthlete;
        }

        if action.subscription_id != self.subscription_id {
            return Verdict::SubscriptionMismatch;
        }

        if !is_supported_action(action) {
            return Verdict::UnsupportedAction;
        }

        Verdict::Forward
    }
}

/// Creations, ride updates and athlete deauthorizations are forwarded.
pub fn is_supported_action(action: &ActivityAction) -> bool {
    match (action.aspect_type.as_str(), action.object_type.as_str()) {
        (ASPECT_CREATE, _) => true,
        (ASPECT_UPDATE, OBJECT_ACTIVITY) => action.updates.kind == "Ride",
        (ASPECT_UPDATE, OBJECT_ATHLETE) => action.updates.authorized == "false",
        _ => false,
    }
}
