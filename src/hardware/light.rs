//! Single-pixel status light

use std::sync::Arc;

use serde::Serialize;
use smart_leds::RGB8;
use tracing::{debug, warn};

use super::{
    color::{self, serialize_rgb8, BLACK},
    StatusLight,
};
use crate::state::{AppState, Indicator};

/// Default status light brightness
pub const DEFAULT_BRIGHTNESS: f32 = 0.2;

/// Mapping from indicator phases to colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub off: RGB8,
    pub idle: RGB8,
    pub ticking: RGB8,
    pub settled: RGB8,
    pub expired: RGB8,
}

impl Palette {
    pub fn color(&self, indicator: Indicator) -> RGB8 {
        match indicator {
            Indicator::Off => self.off,
            Indicator::Idle => self.idle,
            Indicator::Ticking => self.ticking,
            Indicator::Settled => self.settled,
            Indicator::Expired => self.expired,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            off: BLACK,
            idle: RGB8 { r: 0x00, g: 0xFF, b: 0x06 },
            ticking: RGB8 { r: 0x0D, g: 0x00, b: 0xFF },
            settled: RGB8 { r: 0xE7, g: 0xFF, b: 0x00 },
            expired: RGB8 { r: 0xEF, g: 0x08, b: 0x08 },
        }
    }
}

/// Status light state as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightState {
    /// Color requested by the appliance
    #[serde(serialize_with = "serialize_rgb8")]
    pub color: RGB8,
    /// Color after brightness scaling
    #[serde(serialize_with = "serialize_rgb8")]
    pub output: RGB8,
    pub brightness: f32,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            color: BLACK,
            output: BLACK,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

/// Status light mirrored into the shared device state
pub struct SharedStatusLight {
    state: Arc<AppState>,
    brightness: f32,
}

impl SharedStatusLight {
    pub fn new(state: Arc<AppState>, brightness: f32) -> Self {
        Self {
            state,
            brightness: brightness.clamp(0.0, 1.0),
        }
    }
}

impl StatusLight for SharedStatusLight {
    fn fill(&mut self, color: RGB8) {
        let light = LightState {
            color,
            output: color::dimmed(color, self.brightness),
            brightness: self.brightness,
        };
        debug!(
            "Status light -> {} (output {})",
            color::to_hex(light.color),
            color::to_hex(light.output)
        );

        // Mirror failures only affect reporting
        if let Err(e) = self.state.update_device(|device| device.light = light) {
            warn!("Failed to record status light: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hardware::StatusLight, state::test_state};

    #[test]
    fn test_palette_defaults() {
        let palette = Palette::default();
        assert_eq!(color::to_hex(palette.color(Indicator::Idle)), "#00FF06");
        assert_eq!(color::to_hex(palette.color(Indicator::Ticking)), "#0D00FF");
        assert_eq!(color::to_hex(palette.color(Indicator::Settled)), "#E7FF00");
        assert_eq!(color::to_hex(palette.color(Indicator::Expired)), "#EF0808");
        assert_eq!(palette.color(Indicator::Off), BLACK);
    }

    #[test]
    fn test_fill_hex_scales_output() {
        let state = test_state();
        let mut light = SharedStatusLight::new(state.clone(), 0.5);
        light.fill_hex("#FF0000").unwrap();

        let device = state.get_device_state().unwrap();
        assert_eq!(device.light.color, RGB8 { r: 0xFF, g: 0, b: 0 });
        assert_eq!(device.light.output, RGB8 { r: 0x80, g: 0, b: 0 });
    }
}
