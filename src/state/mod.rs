//! State management module
//!
//! The pure countdown machine plus the shared snapshot served to clients.

pub mod app_state;
pub mod countdown;
pub mod device_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{Background, Countdown, Effect, Indicator, Phase, Remaining};
pub use device_state::{ChannelStats, DeviceState};

#[cfg(test)]
pub(crate) use app_state::test_state;
