//! Countdown Kiosk - a touch-reset countdown appliance
//!
//! A countdown that ticks once per second, resets on touch, turns the
//! screen red when it runs out, and takes its next duration from an MQTT
//! topic. Hardware sits behind small capability traits so the loop can run
//! against real devices, the host simulation, or test doubles.

pub mod api;
pub mod channel;
pub mod config;
pub mod hardware;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use tasks::{Appliance, ApplianceError};
pub use utils::signals::shutdown_signal;
