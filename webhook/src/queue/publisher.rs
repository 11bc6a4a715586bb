//! Async RabbitMQ publisher for enqueueing events.
//!
//! The publisher holds one long-lived connection shared by every request
//! and reconnects on demand when the broker drops it.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// Sink for serialized events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` to `topic` and wait for the broker to accept it.
    ///
    /// Returns the message id on success.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String>;
}

/// Async RabbitMQ publisher with connection management.
///
/// Topics map to durable queues on the default exchange. Publisher
/// confirms are enabled, so `publish` only succeeds once the broker acks.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    url: String,
    connection: RwLock<Option<Connection>>,
    channel: RwLock<Option<Channel>>,
    /// Queues declared on the current channel
    declared: Mutex<HashSet<String>>,
}

impl Publisher {
    /// Create a new publisher with the given RabbitMQ URL.
    ///
    /// No connection is made until `connect` or the first `publish`.
    pub fn new(url: String) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                url,
                connection: RwLock::new(None),
                channel: RwLock::new(None),
                declared: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Connect eagerly so an unreachable broker fails at startup.
    pub async fn connect(&self) -> Result<()> {
        self.ensure_connected().await.map(|_| ())
    }

    /// Ensure we have a valid connection and channel.
    async fn ensure_connected(&self) -> Result<Channel> {
        {
            let channel = self.inner.channel.read().await;
            if let Some(ch) = channel.as_ref() {
                if ch.status().connected() {
                    return Ok(ch.clone());
                }
            }
        }

        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        // Double-check after acquiring write lock
        if let Some(ch) = channel.as_ref() {
            if ch.status().connected() {
                return Ok(ch.clone());
            }
        }

        info!("rabbitmq_publisher_connecting");

        let conn = Connection::connect(&self.inner.url, ConnectionProperties::default())
            .await
            .context("Failed to connect to RabbitMQ")?;

        let ch = conn
            .create_channel()
            .await
            .context("Failed to create channel")?;

        ch.confirm_select(ConfirmSelectOptions::default())
            .await
            .context("Failed to enable publisher confirms")?;

        info!("rabbitmq_publisher_connected");

        // The broker may have restarted and lost its queues
        self.inner.declared.lock().await.clear();

        *connection = Some(conn);
        *channel = Some(ch.clone());

        Ok(ch)
    }

    /// Declare the topic queue once per channel (idempotent on the broker).
    async fn ensure_queue(&self, channel: &Channel, topic: &str) -> Result<()> {
        let mut declared = self.inner.declared.lock().await;
        if declared.contains(topic) {
            return Ok(());
        }

        channel
            .queue_declare(
                topic,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .with_context(|| format!("Failed to declare queue {topic}"))?;

        info!(queue = topic, "rabbitmq_queue_declared");
        declared.insert(topic.to_string());

        Ok(())
    }

    /// Close the connection gracefully.
    pub async fn close(&self) {
        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        if let Some(ch) = channel.take() {
            if let Err(e) = ch.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_channel_close_error");
            }
        }

        if let Some(conn) = connection.take() {
            if let Err(e) = conn.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_connection_close_error");
            }
        }

        info!("rabbitmq_publisher_closed");
    }
}

#[async_trait]
impl EventPublisher for Publisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<String> {
        let channel = self.ensure_connected().await?;
        self.ensure_queue(&channel, topic).await?;

        let message_id = Uuid::new_v4().to_string();

        let confirmation = channel
            .basic_publish(
                "",
                topic,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default()
                    .with_delivery_mode(2) // Persistent
                    .with_content_type("application/json".into())
                    .with_message_id(message_id.clone().into()),
            )
            .await
            .context("Failed to publish message")?
            .await
            .context("Failed to confirm publish")?;

        if confirmation.is_nack() {
            bail!("broker rejected message {message_id}");
        }

        info!(
            queue = topic,
            message_id = %message_id,
            body_length = payload.len(),
            "rabbitmq_event_published"
        );

        Ok(message_id)
    }
}
