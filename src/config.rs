//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use smart_leds::RGB8;

use crate::{
    channel::MqttSettings,
    hardware::{color::parse_hex, Palette, DEFAULT_BRIGHTNESS},
    tasks::{ApplianceSettings, TICK_PERIOD},
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown-kiosk")]
#[command(about = "Touch-reset countdown appliance with MQTT-synchronised duration")]
#[command(version)]
pub struct Config {
    /// MQTT broker host
    #[arg(long, env = "COUNTDOWN_BROKER", default_value = "io.adafruit.com")]
    pub broker: String,

    /// MQTT broker port
    #[arg(long, default_value = "1883")]
    pub broker_port: u16,

    /// MQTT username
    #[arg(long, env = "COUNTDOWN_USERNAME")]
    pub username: Option<String>,

    /// MQTT password or key
    #[arg(long, env = "COUNTDOWN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// MQTT client identifier
    #[arg(long, default_value = "countdown-kiosk")]
    pub client_id: String,

    /// Topic carrying the countdown duration
    #[arg(long, default_value = "counter")]
    pub topic: String,

    /// Initial countdown duration in minutes
    #[arg(short, long, default_value = "5")]
    pub duration: u32,

    /// Seconds between remote channel services
    #[arg(long, default_value = "10")]
    pub service_interval: u64,

    /// Status light brightness (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_BRIGHTNESS)]
    pub brightness: f32,

    /// Status light color right after a reset
    #[arg(long, default_value = "00FF06", value_parser = parse_hex)]
    pub idle_color: RGB8,

    /// Status light color while a tick is processed
    #[arg(long, default_value = "0D00FF", value_parser = parse_hex)]
    pub tick_color: RGB8,

    /// Status light color between ticks
    #[arg(long, default_value = "E7FF00", value_parser = parse_hex)]
    pub settled_color: RGB8,

    /// Status light color once the countdown expired
    #[arg(long, default_value = "EF0808", value_parser = parse_hex)]
    pub expired_color: RGB8,

    /// BDF font to check the counter glyphs against
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Port for the local status API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address for the local status API
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Broker connection settings
    pub fn mqtt_settings(&self) -> MqttSettings {
        let mut settings = MqttSettings::new(&self.broker, self.broker_port, &self.topic);
        settings.client_id = self.client_id.clone();
        settings.username = self.username.clone();
        settings.password = self.password.clone();
        settings
    }

    pub fn palette(&self) -> Palette {
        Palette {
            idle: self.idle_color,
            ticking: self.tick_color,
            settled: self.settled_color,
            expired: self.expired_color,
            ..Palette::default()
        }
    }

    pub fn appliance_settings(&self) -> ApplianceSettings {
        ApplianceSettings {
            configured_minutes: self.duration,
            palette: self.palette(),
            tick_period: TICK_PERIOD,
            service_period: Duration::from_secs(self.service_interval.max(1)),
            ..ApplianceSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["countdown-kiosk"]).unwrap();
        assert_eq!(config.topic, "counter");
        assert_eq!(config.duration, 5);
        assert_eq!(config.palette(), Palette::default());
        assert_eq!(config.appliance_settings().service_period, Duration::from_secs(10));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "countdown-kiosk",
            "--duration", "3",
            "--expired-color", "#FF0000",
            "--username", "kiosk",
            "--password", "secret",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.appliance_settings().configured_minutes, 3);
        assert_eq!(config.palette().expired, RGB8 { r: 0xFF, g: 0, b: 0 });
        let mqtt = config.mqtt_settings();
        assert_eq!(mqtt.username.as_deref(), Some("kiosk"));
        assert_eq!(mqtt.password.as_deref(), Some("secret"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_bad_color_is_rejected() {
        assert!(Config::try_parse_from(["countdown-kiosk", "--idle-color", "green"]).is_err());
    }
}
