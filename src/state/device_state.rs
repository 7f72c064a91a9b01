//! Snapshot of everything the appliance currently shows and knows

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Countdown, Phase, Remaining};
use crate::hardware::{Frame, LightState};

/// Errors kept for client visibility
pub const MAX_ERRORS: usize = 20;

/// Remote channel health as seen by the supervisor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub topic: String,
    pub connected: bool,
    pub services: u64,
    pub failures: u64,
    pub reconnects: u64,
    pub messages: u64,
    pub last_service: Option<DateTime<Utc>>,
    pub last_failure: Option<String>,
}

/// Device state structure - mirrors the counter, screen and status light
#[derive(Debug, Clone, Serialize)]
pub struct DeviceState {
    pub remaining: Remaining,
    pub phase: Phase,
    /// Minutes the next reset starts from
    pub configured_minutes: u32,
    /// Ticks applied since start
    pub ticks: u64,
    pub frame: Frame,
    pub light: LightState,
    pub channel: ChannelStats,
    pub errors: Vec<String>,
}

impl DeviceState {
    pub fn new(configured_minutes: u32) -> Self {
        let countdown = Countdown::new(configured_minutes);
        Self {
            remaining: countdown.remaining(),
            phase: countdown.phase(),
            configured_minutes,
            ticks: 0,
            frame: Frame::default(),
            light: LightState::default(),
            channel: ChannelStats::default(),
            errors: Vec::new(),
        }
    }

    pub fn set_countdown(&mut self, countdown: &Countdown) {
        self.remaining = countdown.remaining();
        self.phase = countdown.phase();
    }

    /// Add an error, dropping the oldest beyond [`MAX_ERRORS`]
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        if self.errors.len() > MAX_ERRORS {
            let excess = self.errors.len() - MAX_ERRORS;
            self.errors.drain(..excess);
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_running_at_configured_minutes() {
        let state = DeviceState::new(5);
        assert_eq!(state.remaining, Remaining::from_minutes(5));
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.ticks, 0);
    }

    #[test]
    fn test_errors_are_bounded() {
        let mut state = DeviceState::new(1);
        for i in 0..(MAX_ERRORS + 5) {
            state.add_error(format!("error {}", i));
        }
        assert_eq!(state.errors.len(), MAX_ERRORS);
        assert_eq!(state.errors[0], "error 5");
    }
}
