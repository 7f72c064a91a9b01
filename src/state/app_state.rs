//! Shared application state
//!
//! The appliance loop owns the countdown; everything else (the HTTP API,
//! log readers) sees it through the snapshot kept here.

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use super::DeviceState;
use crate::hardware::{SubmitError, TouchBounds, TouchPoint};

/// State shared between the appliance loop and the API
#[derive(Debug)]
pub struct AppState {
    /// Latest device snapshot
    pub device_state: Arc<Mutex<DeviceState>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Virtual touchscreen feeding the appliance loop
    pub touch_bounds: TouchBounds,
    pub touch_tx: mpsc::Sender<TouchPoint>,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        touch_tx: mpsc::Sender<TouchPoint>,
        touch_bounds: TouchBounds,
        configured_minutes: u32,
    ) -> Self {
        Self {
            device_state: Arc::new(Mutex::new(DeviceState::new(configured_minutes))),
            start_time: Instant::now(),
            port,
            host,
            touch_bounds,
            touch_tx,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Apply `updater` to the device snapshot and return the result
    pub fn update_device<F>(&self, updater: F) -> Result<DeviceState, String>
    where
        F: FnOnce(&mut DeviceState),
    {
        let mut state = self.device_state.lock()
            .map_err(|e| format!("Failed to lock device state: {}", e))?;

        updater(&mut *state);
        Ok(state.clone())
    }

    /// Remember the latest user-visible action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Add an error to the device state
    pub fn add_error(&self, error: String) -> Result<(), String> {
        warn!("Adding error to state: {}", error);
        self.update_device(|state| state.add_error(error)).map(|_| ())
    }

    /// Get current device state
    pub fn get_device_state(&self) -> Result<DeviceState, String> {
        self.device_state.lock()
            .map(|state| state.clone())
            .map_err(|e| format!("Failed to lock device state: {}", e))
    }

    /// Queue a touch for the appliance loop
    pub fn submit_touch(&self, point: TouchPoint) -> Result<(), SubmitError> {
        if !self.touch_bounds.contains(point) {
            return Err(SubmitError::OffPanel {
                x: point.x,
                y: point.y,
                width: self.touch_bounds.width,
                height: self.touch_bounds.height,
            });
        }

        self.touch_tx.try_send(point).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::QueueFull,
            TrySendError::Closed(_) => SubmitError::LoopStopped,
        })?;

        info!("Touch queued at ({}, {})", point.x, point.y);
        self.record_action("touch");
        Ok(())
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

/// Fresh state on the default panel with a live touch queue receiver
#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    let (touch_tx, touch_rx) = mpsc::channel(8);
    std::mem::forget(touch_rx);
    Arc::new(AppState::new(
        20554,
        "127.0.0.1".to_string(),
        touch_tx,
        TouchBounds::new(320, 240),
        5,
    ))
}
