//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    hardware::TouchPoint,
    state::DeviceState,
};

/// API response structure for action endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub device: DeviceState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, device: DeviceState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            device,
        }
    }

    /// Create an accepted response
    pub fn accepted(message: String, device: DeviceState) -> Self {
        Self::new("accepted".to_string(), message, device)
    }
}

/// Body of POST /touch; the panel centre is used when absent
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TouchRequest {
    pub x: u16,
    pub y: u16,
}

impl From<TouchRequest> for TouchPoint {
    fn from(request: TouchRequest) -> Self {
        TouchPoint { x: request.x, y: request.y }
    }
}

/// Status response with countdown and channel information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Counter labels as drawn on screen, `MM:SS`, empty before the first tick
    pub display: String,
    pub device: DeviceState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
