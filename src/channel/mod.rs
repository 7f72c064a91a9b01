//! Remote configuration channel
//!
//! The appliance subscribes to a single topic on a message broker. The
//! [`MessageChannel`] trait is the seam between the supervisor and the
//! broker client so both can be tested apart.

pub mod listener;
pub mod mqtt;

pub use listener::{parse_duration, ConfigListener, PayloadError};
pub use mqtt::{MqttChannel, MqttSettings};

use thiserror::Error;

/// A message delivered on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub topic: String,
    pub payload: String,
}

impl ChannelMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Channel runtime failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connection failure: {0}")]
    Connection(String),
    #[error("client request rejected: {0}")]
    Request(String),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

/// Broker connection used by the supervisor
#[allow(async_fn_in_trait)]
pub trait MessageChannel {
    /// Topic the channel listens on
    fn topic(&self) -> &str;

    /// Establish (or re-establish) the connection and subscription
    async fn connect(&mut self) -> Result<(), ChannelError>;

    /// Receive pending messages and keep the connection alive
    async fn service(&mut self) -> Result<Vec<ChannelMessage>, ChannelError>;
}
