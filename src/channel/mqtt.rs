//! MQTT implementation of the remote channel

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use super::{ChannelError, ChannelMessage, MessageChannel};

/// Broker connection parameters
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic: String,
    pub keep_alive: Duration,
    /// How long one service pass waits for traffic
    pub poll_window: Duration,
    /// Upper bound for the broker to acknowledge a connection
    pub connect_timeout: Duration,
}

impl MqttSettings {
    pub fn new(host: impl Into<String>, port: u16, topic: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: "countdown-kiosk".to_string(),
            username: None,
            password: None,
            topic: topic.into(),
            keep_alive: Duration::from_secs(60),
            poll_window: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
        }
    }

    fn options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            options.set_credentials(username, password);
        } else if self.username.is_some() || self.password.is_some() {
            warn!("Only one of username/password given, connecting anonymously");
        }
        options
    }
}

/// rumqttc-backed channel subscribed to one topic
pub struct MqttChannel {
    client: AsyncClient,
    eventloop: EventLoop,
    settings: MqttSettings,
    /// Publishes that arrived while waiting for a connection
    pending: Vec<ChannelMessage>,
}

impl MqttChannel {
    pub fn new(settings: MqttSettings) -> Self {
        let (client, eventloop) = AsyncClient::new(settings.options(), 10);
        Self {
            client,
            eventloop,
            settings,
            pending: Vec::new(),
        }
    }

    /// React to a broker event, collecting publishes into `messages`
    fn handle_event(&mut self, event: Event, messages: &mut Vec<ChannelMessage>) -> Result<(), ChannelError> {
        let Event::Incoming(packet) = event else {
            return Ok(());
        };

        match packet {
            Packet::ConnAck(ack) => {
                debug!("Connection acknowledged: {:?}", ack.code);
                self.subscribe()?;
            }
            Packet::SubAck(ack) => {
                info!("Subscribed to {} with return codes {:?}", self.settings.topic, ack.return_codes);
            }
            Packet::UnsubAck(ack) => {
                info!("Unsubscribed from {} with PID {}", self.settings.topic, ack.pkid);
            }
            Packet::Publish(publish) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                messages.push(ChannelMessage::new(publish.topic, payload));
            }
            Packet::Disconnect => {
                warn!("Disconnected by broker {}", self.settings.host);
            }
            other => debug!("Broker packet: {:?}", other),
        }
        Ok(())
    }

    fn subscribe(&self) -> Result<(), ChannelError> {
        self.client
            .try_subscribe(self.settings.topic.clone(), QoS::AtMostOnce)
            .map_err(|e| ChannelError::Request(e.to_string()))?;
        info!("Listening for {} changes...", self.settings.topic);
        Ok(())
    }
}

impl MessageChannel for MqttChannel {
    fn topic(&self) -> &str {
        &self.settings.topic
    }

    async fn connect(&mut self) -> Result<(), ChannelError> {
        info!("Connecting to {}:{}", self.settings.host, self.settings.port);
        let deadline = Instant::now() + self.settings.connect_timeout;

        // The event loop dials on its first poll after a failure
        loop {
            let event = timeout_at(deadline, self.eventloop.poll())
                .await
                .map_err(|_| ChannelError::Timeout("connection acknowledgement"))?
                .map_err(|e| ChannelError::Connection(e.to_string()))?;

            let acknowledged = matches!(event, Event::Incoming(Packet::ConnAck(_)));
            let mut pending = std::mem::take(&mut self.pending);
            let handled = self.handle_event(event, &mut pending);
            self.pending = pending;
            handled?;
            if acknowledged {
                info!("Connected to {}", self.settings.host);
                return Ok(());
            }
        }
    }

    async fn service(&mut self) -> Result<Vec<ChannelMessage>, ChannelError> {
        let mut messages = std::mem::take(&mut self.pending);
        let deadline = Instant::now() + self.settings.poll_window;

        while let Ok(polled) = timeout_at(deadline, self.eventloop.poll()).await {
            let handled = polled
                .map_err(|e| ChannelError::Connection(e.to_string()))
                .and_then(|event| self.handle_event(event, &mut messages));

            // Keep what was already delivered for the next pass
            if let Err(e) = handled {
                self.pending = messages;
                return Err(e);
            }
        }

        debug!("Service pass delivered {} messages", messages.len());
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Outgoing, Publish};

    fn channel_to(host: &str, port: u16) -> MqttChannel {
        MqttChannel::new(MqttSettings::new(host, port, "counter"))
    }

    fn publish(payload: impl Into<Vec<u8>>) -> Event {
        Event::Incoming(Packet::Publish(Publish::new("counter", QoS::AtMostOnce, payload)))
    }

    fn conn_ack() -> Event {
        Event::Incoming(Packet::ConnAck(ConnAck::new(ConnectReturnCode::Success, false)))
    }

    #[test]
    fn test_options_from_settings() {
        let mut settings = MqttSettings::new("broker.local", 1883, "counter");
        settings.keep_alive = Duration::from_secs(30);
        let options = settings.options();

        assert_eq!(options.broker_address(), ("broker.local".to_string(), 1883));
        assert_eq!(options.client_id(), "countdown-kiosk");
        assert_eq!(options.keep_alive(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_topic_comes_from_settings() {
        let channel = channel_to("broker.local", 1883);
        assert_eq!(channel.topic(), "counter");
    }

    #[tokio::test]
    async fn test_publish_becomes_channel_message() {
        let mut channel = channel_to("broker.local", 1883);
        let mut messages = Vec::new();

        channel.handle_event(publish("#3"), &mut messages).unwrap();
        channel.handle_event(publish(vec![b'#', 0xFF, b'7']), &mut messages).unwrap();

        assert_eq!(
            messages,
            vec![
                ChannelMessage::new("counter", "#3"),
                ChannelMessage::new("counter", "#\u{FFFD}7"),
            ]
        );
    }

    #[tokio::test]
    async fn test_other_events_deliver_nothing() {
        let mut channel = channel_to("broker.local", 1883);
        let mut messages = Vec::new();

        channel.handle_event(Event::Outgoing(Outgoing::PingReq), &mut messages).unwrap();
        channel.handle_event(Event::Incoming(Packet::PingResp), &mut messages).unwrap();
        channel.handle_event(Event::Incoming(Packet::Disconnect), &mut messages).unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_every_conn_ack_subscribes_again() {
        let mut channel = channel_to("broker.local", 1883);
        let mut messages = Vec::new();

        // One subscribe request per acknowledgement until the request queue is full
        for _ in 0..10 {
            channel.handle_event(conn_ack(), &mut messages).unwrap();
        }
        let err = channel.handle_event(conn_ack(), &mut messages).unwrap_err();

        assert!(matches!(err, ChannelError::Request(_)));
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_failed_service_keeps_collected_messages() {
        // Nothing listens on port 1, so the first poll fails
        let mut channel = channel_to("127.0.0.1", 1);
        channel.pending.push(ChannelMessage::new("counter", "#8"));

        let err = channel.service().await.unwrap_err();

        assert!(matches!(err, ChannelError::Connection(_)));
        assert_eq!(channel.pending, vec![ChannelMessage::new("counter", "#8")]);
    }
}
