//! Hardware capability seams
//!
//! The appliance reaches its display, status light and touchscreen only
//! through the traits below. Host builds use in-memory implementations that
//! mirror into the shared device state.

pub mod color;
pub mod display;
pub mod font;
pub mod light;
pub mod touch;

pub use color::ColorError;
pub use display::{DisplayError, Frame, FrameRenderer, Framebuffer, Label, Layout};
pub use font::{FontError, GlyphSet, COUNTER_GLYPHS};
pub use light::{LightState, Palette, SharedStatusLight, DEFAULT_BRIGHTNESS};
pub use touch::{
    touch_queue, QueuedTouchSource, SubmitError, TouchBounds, TouchError, TouchPoint,
};

use smart_leds::RGB8;

use crate::state::Background;

/// Draws the counter screen
pub trait Renderer {
    /// Replace the whole background
    fn fill_background(&mut self, background: Background) -> Result<(), DisplayError>;

    /// Set the three counter labels
    fn set_labels(&mut self, minutes: &str, seconds: &str, colon: &str) -> Result<(), DisplayError>;
}

/// RGB status indicator
pub trait StatusLight {
    fn fill(&mut self, color: RGB8);

    /// Fill from a `RRGGBB` string, optionally prefixed with `#`
    fn fill_hex(&mut self, hex: &str) -> Result<(), ColorError> {
        let color = color::parse_hex(hex)?;
        self.fill(color);
        Ok(())
    }
}

/// Touch digitizer
pub trait TouchSource {
    /// Return the current touch point, if any
    fn poll(&mut self) -> Result<Option<TouchPoint>, TouchError>;
}
