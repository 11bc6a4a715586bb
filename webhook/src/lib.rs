//! Strava webhook receiver.
//!
//! Answers the subscription handshake, filters incoming activity events
//! and relays the ones worth processing to a RabbitMQ queue.
//!
//! ## Architecture
//!
//! ```text
//! Strava → Web Server → filter → topic queue → downstream consumers
//! ```

pub mod config;
pub mod error;
pub mod queue;
pub mod strava;
pub mod web;

// Re-export commonly used types
pub use config::{Config, Credentials};
pub use error::{ConfigError, WebhookError};
pub use queue::{EventPublisher, Publisher};
pub use strava::{ActivityAction, ActivityUpdates, EventFilter, Verdict};
pub use web::{router, AppState};
