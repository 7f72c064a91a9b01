//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    hardware::{SubmitError, TouchPoint},
    state::AppState,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse, TouchRequest};

/// Handle POST /touch - Press the virtual touchscreen
///
/// An empty body presses the panel centre; any other body must be a JSON point.
pub async fn touch_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    let point = if body.iter().all(u8::is_ascii_whitespace) {
        state.touch_bounds.center()
    } else {
        match Json::<TouchRequest>::from_bytes(&body) {
            Ok(Json(request)) => TouchPoint::from(request),
            Err(rejection) => {
                warn!("Rejecting touch body: {}", rejection.body_text());
                return Err(StatusCode::BAD_REQUEST);
            }
        }
    };

    if let Err(e) = state.submit_touch(point) {
        return Err(match e {
            SubmitError::OffPanel { .. } => {
                warn!("Rejecting touch: {}", e);
                StatusCode::BAD_REQUEST
            }
            SubmitError::QueueFull => {
                warn!("Rejecting touch: {}", e);
                StatusCode::TOO_MANY_REQUESTS
            }
            SubmitError::LoopStopped => {
                error!("Failed to submit touch: {}", e);
                StatusCode::SERVICE_UNAVAILABLE
            }
        });
    }

    info!("Touch endpoint called at ({}, {})", point.x, point.y);
    match state.get_device_state() {
        Ok(device) => Ok(Json(ApiResponse::accepted(
            "Touch queued, countdown will restart".to_string(),
            device,
        ))),
        Err(e) => {
            error!("Failed to get device state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current device status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let device = match state.get_device_state() {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to get device state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display: device.frame.text(),
        device,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
