//! Countdown Kiosk - touch-reset countdown appliance
//!
//! This is the main entry point for the countdown-kiosk application.

use std::sync::Arc;
use tokio::{net::TcpListener, time::Instant};
use tracing::{error, info};

use countdown_kiosk::{
    api::create_router,
    channel::MqttChannel,
    config::Config,
    hardware::{
        touch_queue, FrameRenderer, GlyphSet, Layout, SharedStatusLight, TouchBounds,
        COUNTER_GLYPHS,
    },
    state::AppState,
    tasks::{Appliance, Hardware},
    utils::shutdown_signal,
};

/// Touches buffered between the API and the appliance loop
const TOUCH_QUEUE_DEPTH: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_kiosk={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-kiosk v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: broker={}:{}, topic={}, duration={}min",
          config.broker, config.broker_port, config.topic, config.duration);

    let glyphs = match &config.font {
        Some(path) => GlyphSet::load_bdf(path, COUNTER_GLYPHS)?,
        None => GlyphSet::counter(),
    };

    let layout = Layout::default();
    let bounds = TouchBounds::new(layout.width, layout.height);
    let (touch_tx, touch) = touch_queue(bounds, TOUCH_QUEUE_DEPTH);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        touch_tx,
        bounds,
        config.duration,
    ));

    let hardware = Hardware {
        renderer: FrameRenderer::new(Arc::clone(&state), layout, glyphs),
        light: SharedStatusLight::new(Arc::clone(&state), config.brightness),
        touch,
    };
    let channel = MqttChannel::new(config.mqtt_settings());
    let mut appliance = Appliance::new(
        hardware,
        channel,
        config.appliance_settings(),
        Arc::clone(&state),
        Instant::now(),
    );

    // A broker that cannot be reached at startup halts the device
    appliance.start().await?;
    let mut appliance_task = tokio::spawn(appliance.run());

    // Create HTTP router with all endpoints
    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Status API running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /touch  - Press the virtual touchscreen");
    info!("  GET  /status - Countdown, display and channel status");
    info!("  GET  /health - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        joined = &mut appliance_task => {
            match joined {
                Ok(Err(e)) => {
                    error!("Appliance halted: {}", e);
                    return Err(e.into());
                }
                Ok(Ok(())) => info!("Appliance loop finished"),
                Err(e) => {
                    error!("Appliance task failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for signals: {}", e),
            }
        }
    }

    appliance_task.abort();
    info!("Shutdown complete");
    Ok(())
}
