//! Queue module for RabbitMQ operations.
//!
//! Handlers depend on the `EventPublisher` trait; `Publisher` is the
//! RabbitMQ implementation used in production.

pub mod publisher;

pub use publisher::{EventPublisher, Publisher};
