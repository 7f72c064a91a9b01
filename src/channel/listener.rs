//! Configured-duration updates from the remote channel

use std::num::ParseIntError;

use thiserror::Error;
use tracing::{debug, info};

use super::ChannelMessage;

/// Marker character that may precede the value
pub const PAYLOAD_MARKER: char = '#';

/// A payload that does not hold a whole number of minutes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload {payload:?} is not a whole number of minutes")]
pub struct PayloadError {
    pub payload: String,
    #[source]
    pub source: ParseIntError,
}

/// Parse `#<minutes>` (marker optional) into minutes
pub fn parse_duration(payload: &str) -> Result<u32, PayloadError> {
    payload
        .trim()
        .trim_start_matches(PAYLOAD_MARKER)
        .trim()
        .parse::<u32>()
        .map_err(|source| PayloadError {
            payload: payload.to_string(),
            source,
        })
}

/// Holds the duration the next reset will start from
#[derive(Debug, Clone)]
pub struct ConfigListener {
    topic: String,
    configured_minutes: u32,
}

impl ConfigListener {
    pub fn new(topic: impl Into<String>, configured_minutes: u32) -> Self {
        Self {
            topic: topic.into(),
            configured_minutes,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn configured_minutes(&self) -> u32 {
        self.configured_minutes
    }

    /// Apply a delivered message.
    ///
    /// Returns the new duration when the message was for our topic. A
    /// malformed payload is returned as an error and leaves the configured
    /// duration unchanged.
    pub fn apply(&mut self, message: &ChannelMessage) -> Result<Option<u32>, PayloadError> {
        if message.topic != self.topic {
            debug!("Ignoring message on unrelated topic {}", message.topic);
            return Ok(None);
        }

        info!("Feed {} received new value: {}", message.topic, message.payload);
        let minutes = parse_duration(&message.payload)?;
        self.configured_minutes = minutes;
        Ok(Some(minutes))
    }
}
