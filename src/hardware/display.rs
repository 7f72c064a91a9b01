//! Counter display: a background fill and three text labels
//!
//! [`FrameRenderer`] draws into an in-memory [`Framebuffer`] with
//! `embedded_graphics` and mirrors a summary of the screen into the shared
//! device state, which is what the status API serves.

use std::{convert::Infallible, sync::Arc};

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::{Rgb888, RgbColor},
    prelude::*,
    primitives::{PointsIter, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::{color::serialize_rgb888, GlyphSet, Renderer};
use crate::state::{AppState, Background};

/// Display output failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("no glyph for {glyph:?} in {label} label")]
    MissingGlyph { glyph: char, label: &'static str },
    #[error("display state unavailable: {0}")]
    State(String),
}

impl From<Infallible> for DisplayError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Panel geometry and label placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub minutes: Point,
    pub seconds: Point,
    pub colon: Point,
    pub text_color: Rgb888,
}

impl Layout {
    pub fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            minutes: Point::new(70, 120),
            seconds: Point::new(165, 120),
            colon: Point::new(150, 118),
            text_color: Rgb888::WHITE,
        }
    }
}

impl Background {
    pub fn color(&self) -> Rgb888 {
        match self {
            Background::Black => Rgb888::BLACK,
            Background::Red => Rgb888::new(0xEF, 0x08, 0x08),
        }
    }
}

/// Positioned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

impl Label {
    fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            text: String::new(),
        }
    }

    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What is currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub background: Background,
    #[serde(serialize_with = "serialize_rgb888")]
    pub background_color: Rgb888,
    #[serde(serialize_with = "serialize_rgb888")]
    pub text_color: Rgb888,
    pub minutes: Label,
    pub seconds: Label,
    pub colon: Label,
}

impl Frame {
    /// Black screen with empty labels
    pub fn blank(layout: &Layout) -> Self {
        Self {
            background: Background::Black,
            background_color: Background::Black.color(),
            text_color: layout.text_color,
            minutes: Label::at(layout.minutes),
            seconds: Label::at(layout.seconds),
            colon: Label::at(layout.colon),
        }
    }

    /// Labels joined as they read on screen
    pub fn text(&self) -> String {
        format!("{}{}{}", self.minutes.text, self.colon.text, self.seconds.text)
    }

    fn labels(&self) -> [&Label; 3] {
        [&self.minutes, &self.colon, &self.seconds]
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank(&Layout::default())
    }
}

/// RGB888 pixel buffer the size of the panel
pub struct Framebuffer {
    pixels: Vec<Rgb888>,
    width: u32,
    height: u32,
}

impl Framebuffer {
    pub fn new(size: Size) -> Self {
        Self {
            pixels: vec![Rgb888::BLACK; (size.width * size.height) as usize],
            width: size.width,
            height: size.height,
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (u32::try_from(point.x).ok()?, u32::try_from(point.y).ok()?);
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    pub fn pixel(&self, point: Point) -> Option<Rgb888> {
        self.index(point).map(|i| self.pixels[i])
    }

    /// Pixels inside `area` showing `color`
    pub fn count_in(&self, area: &Rectangle, color: Rgb888) -> usize {
        area.points()
            .filter(|&p| self.pixel(p) == Some(color))
            .count()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let width = self.width as usize;
        for y in area.rows() {
            let row = y as usize * width;
            for x in area.columns() {
                self.pixels[row + x as usize] = color;
            }
        }
        Ok(())
    }
}

/// Renderer drawing into a [`Framebuffer`] and mirroring the frame into the
/// shared device state
pub struct FrameRenderer {
    state: Arc<AppState>,
    glyphs: GlyphSet,
    frame: Frame,
    framebuffer: Framebuffer,
}

impl FrameRenderer {
    pub fn new(state: Arc<AppState>, layout: Layout, glyphs: GlyphSet) -> Self {
        Self {
            state,
            glyphs,
            frame: Frame::blank(&layout),
            framebuffer: Framebuffer::new(layout.size()),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Text object for `label` as it is drawn
    pub fn text<'a>(&self, label: &'a Label) -> Text<'a, MonoTextStyle<'static, Rgb888>> {
        let style = MonoTextStyle::new(&FONT_10X20, self.frame.text_color);
        Text::with_baseline(&label.text, label.position(), style, Baseline::Middle)
    }

    fn check(&self, label: &'static str, text: &str) -> Result<(), DisplayError> {
        match self.glyphs.first_missing(text) {
            Some(glyph) => Err(DisplayError::MissingGlyph { glyph, label }),
            None => Ok(()),
        }
    }

    fn redraw(&mut self) -> Result<(), DisplayError> {
        let screen = self.framebuffer.bounding_box();
        screen
            .into_styled(PrimitiveStyle::with_fill(self.frame.background_color))
            .draw(&mut self.framebuffer)?;

        let style = MonoTextStyle::new(&FONT_10X20, self.frame.text_color);
        for label in self.frame.labels() {
            Text::with_baseline(&label.text, label.position(), style, Baseline::Middle)
                .draw(&mut self.framebuffer)?;
        }

        let frame = self.frame.clone();
        self.state
            .update_device(|device| device.frame = frame)
            .map(|_| ())
            .map_err(DisplayError::State)
    }
}

impl Renderer for FrameRenderer {
    fn fill_background(&mut self, background: Background) -> Result<(), DisplayError> {
        debug!("Background -> {:?}", background);
        self.frame.background = background;
        self.frame.background_color = background.color();
        self.redraw()
    }

    fn set_labels(&mut self, minutes: &str, seconds: &str, colon: &str) -> Result<(), DisplayError> {
        self.check("minutes", minutes)?;
        self.check("seconds", seconds)?;
        self.check("colon", colon)?;

        debug!("Display -> {}{}{}", minutes, colon, seconds);
        self.frame.minutes.text = minutes.to_string();
        self.frame.seconds.text = seconds.to_string();
        self.frame.colon.text = colon.to_string();
        self.redraw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::ContainsPoint;

    use crate::state::test_state;

    fn lit_pixels(renderer: &FrameRenderer, label: &Label) -> usize {
        let area = renderer.text(label).bounding_box();
        renderer.framebuffer().count_in(&area, Rgb888::WHITE)
    }

    #[test]
    fn test_labels_land_in_shared_state() {
        let state = test_state();
        let mut renderer = FrameRenderer::new(state.clone(), Layout::default(), GlyphSet::counter());

        renderer.set_labels("04", "59", ":").unwrap();
        renderer.fill_background(Background::Red).unwrap();

        let device = state.get_device_state().unwrap();
        assert_eq!(device.frame.text(), "04:59");
        assert_eq!(device.frame.background, Background::Red);
        assert_eq!(device.frame.background_color, Rgb888::new(0xEF, 0x08, 0x08));
        assert_eq!((device.frame.minutes.x, device.frame.minutes.y), (70, 120));
    }

    #[test]
    fn test_labels_are_drawn_at_layout_points() {
        let mut renderer = FrameRenderer::new(test_state(), Layout::default(), GlyphSet::counter());
        let frame = renderer.frame().clone();
        assert_eq!(lit_pixels(&renderer, &frame.minutes), 0);

        renderer.set_labels("04", "59", ":").unwrap();
        let frame = renderer.frame().clone();
        assert!(lit_pixels(&renderer, &frame.minutes) > 0);
        assert!(lit_pixels(&renderer, &frame.seconds) > 0);
        assert!(lit_pixels(&renderer, &frame.colon) > 0);

        let minutes = renderer.text(&frame.minutes).bounding_box();
        assert!(minutes.contains(Point::new(75, 120)));
    }

    #[test]
    fn test_background_fill_keeps_labels() {
        let mut renderer = FrameRenderer::new(test_state(), Layout::default(), GlyphSet::counter());
        renderer.set_labels("00", "00", ":").unwrap();
        renderer.fill_background(Background::Red).unwrap();

        let red = Background::Red.color();
        assert_eq!(renderer.framebuffer().pixel(Point::zero()), Some(red));
        assert_eq!(renderer.framebuffer().pixel(Point::new(319, 239)), Some(red));
        assert_eq!(renderer.framebuffer().pixel(Point::new(320, 0)), None);

        let frame = renderer.frame().clone();
        assert!(lit_pixels(&renderer, &frame.seconds) > 0);

        renderer.fill_background(Background::Black).unwrap();
        assert_eq!(renderer.framebuffer().pixel(Point::zero()), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_unknown_glyph_is_rejected() {
        let mut renderer = FrameRenderer::new(test_state(), Layout::default(), GlyphSet::counter());
        let err = renderer.set_labels("-1", "00", ":").unwrap_err();
        assert_eq!(err, DisplayError::MissingGlyph { glyph: '-', label: "minutes" });
        assert_eq!(renderer.frame().text(), "");
    }
}
