//! Reconnect supervisor for the remote channel

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::{
    channel::{ChannelError, ChannelMessage, MessageChannel},
    state::ChannelStats,
};

/// Result of one service pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReport {
    /// The channel answered; possibly with no messages
    Delivered(Vec<ChannelMessage>),
    /// The channel failed and one reconnect was attempted
    Failed {
        error: ChannelError,
        reconnected: bool,
    },
}

/// Services a channel and blindly reconnects it on failure
pub struct ReconnectSupervisor<C> {
    channel: C,
    stats: ChannelStats,
}

impl<C: MessageChannel> ReconnectSupervisor<C> {
    pub fn new(channel: C) -> Self {
        let stats = ChannelStats {
            topic: channel.topic().to_string(),
            ..ChannelStats::default()
        };
        Self { channel, stats }
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Initial connection; failures are returned to the caller
    pub async fn connect(&mut self) -> Result<(), ChannelError> {
        let result = self.channel.connect().await;
        self.stats.connected = result.is_ok();
        result
    }

    /// Service the channel once.
    ///
    /// A failure is logged and answered with exactly one reconnect attempt.
    /// Whether that attempt worked only shows on the next pass.
    pub async fn service(&mut self) -> ServiceReport {
        self.stats.services += 1;
        self.stats.last_service = Some(Utc::now());

        match self.channel.service().await {
            Ok(messages) => {
                debug!("Channel serviced, {} messages", messages.len());
                self.stats.connected = true;
                self.stats.messages += messages.len() as u64;
                ServiceReport::Delivered(messages)
            }
            Err(error) => {
                warn!("Connection failure: {}", error);
                self.stats.failures += 1;
                self.stats.reconnects += 1;
                self.stats.last_failure = Some(error.to_string());

                let reconnected = match self.channel.connect().await {
                    Ok(()) => {
                        info!("Reconnected to remote channel");
                        true
                    }
                    Err(e) => {
                        error!("Reconnect attempt failed: {}", e);
                        false
                    }
                };
                self.stats.connected = reconnected;
                ServiceReport::Failed { error, reconnected }
            }
        }
    }
}
