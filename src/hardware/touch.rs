//! Touchscreen input

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::debug;

use super::TouchSource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TouchError {
    #[error("touch input source disconnected")]
    Disconnected,
}

/// Why a touch could not be queued for the appliance loop
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("touch at ({x}, {y}) is outside the {width}x{height} panel")]
    OffPanel { x: u16, y: u16, width: u16, height: u16 },
    #[error("touch queue is full")]
    QueueFull,
    #[error("appliance loop is not running")]
    LoopStopped,
}

/// A touched point in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

/// Digitizer calibration rectangle, matching the panel size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TouchBounds {
    pub width: u16,
    pub height: u16,
}

impl TouchBounds {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: TouchPoint) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn center(&self) -> TouchPoint {
        TouchPoint {
            x: self.width / 2,
            y: self.height / 2,
        }
    }
}

/// Create a touch queue: the sender side feeds points, the source is polled
/// by the appliance loop.
pub fn touch_queue(bounds: TouchBounds, capacity: usize) -> (mpsc::Sender<TouchPoint>, QueuedTouchSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, QueuedTouchSource { rx, bounds })
}

/// Touch source backed by a channel of points
pub struct QueuedTouchSource {
    rx: mpsc::Receiver<TouchPoint>,
    bounds: TouchBounds,
}

impl TouchSource for QueuedTouchSource {
    fn poll(&mut self) -> Result<Option<TouchPoint>, TouchError> {
        loop {
            match self.rx.try_recv() {
                Ok(point) if self.bounds.contains(point) => return Ok(Some(point)),
                Ok(point) => debug!("Ignoring touch outside the panel at {:?}", point),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Disconnected) => return Err(TouchError::Disconnected),
            }
        }
    }
}
