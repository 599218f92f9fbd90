//! Source frames read by the sweep.
//!
//! The sweep only needs indexed pixel lookup, expressed by [`PixelSource`].
//! Frames are addressed by a single linear index,
//! `strip * LEDS_PER_STRIP + led`.
//!
//! [`StripFrameBuffer`] is a ready-made frame in that layout. It implements
//! the `embedded-graphics` [`DrawTarget`] trait with `x` as the LED index and
//! `y` as the strip, so frame producers can draw into it directly.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::RgbColor;
use embedded_graphics::prelude::{OriginDimensions, Point, Size};

use crate::Color;

/// Read-only pixel lookup by linear LED position.
pub trait PixelSource {
    /// Pixel at `index` (`strip * LEDS_PER_STRIP + led`).
    fn pixel(&self, index: usize) -> Color;
}

impl PixelSource for [Color] {
    #[inline(always)]
    fn pixel(&self, index: usize) -> Color {
        self[index]
    }
}

impl<const N: usize> PixelSource for [Color; N] {
    #[inline(always)]
    fn pixel(&self, index: usize) -> Color {
        self[index]
    }
}

/// One frame for `STRIPS` strips of `LEDS_PER_STRIP` LEDs.
///
/// # Type Parameters
/// - `LEDS_PER_STRIP`: Number of LEDs on each strip
/// - `STRIPS`: Number of strips
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct StripFrameBuffer<const LEDS_PER_STRIP: usize, const STRIPS: usize> {
    pixels: [[Color; LEDS_PER_STRIP]; STRIPS],
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> StripFrameBuffer<LEDS_PER_STRIP, STRIPS> {
    /// A black frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pixels: [[Color::BLACK; LEDS_PER_STRIP]; STRIPS],
        }
    }

    /// Set the LED at `led` on `strip`. Out of range positions are ignored.
    pub fn set_pixel(&mut self, strip: usize, led: usize, color: Color) {
        if let Some(pixel) = self.pixels.get_mut(strip).and_then(|s| s.get_mut(led)) {
            *pixel = color;
        }
    }

    /// Color of the LED at `led` on `strip`.
    #[must_use]
    pub fn get_pixel(&self, strip: usize, led: usize) -> Color {
        self.pixels[strip][led]
    }

    /// Set every LED to `color`.
    pub fn fill(&mut self, color: Color) {
        for strip in &mut self.pixels {
            strip.fill(color);
        }
    }

    /// All pixels in linear order.
    #[must_use]
    pub fn as_slice(&self) -> &[Color] {
        self.pixels.as_flattened()
    }

    /// All pixels in linear order, mutable, for frame receivers that copy
    /// packed data straight in.
    pub fn as_mut_slice(&mut self) -> &mut [Color] {
        self.pixels.as_flattened_mut()
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> Default
    for StripFrameBuffer<LEDS_PER_STRIP, STRIPS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> PixelSource
    for StripFrameBuffer<LEDS_PER_STRIP, STRIPS>
{
    #[inline(always)]
    fn pixel(&self, index: usize) -> Color {
        self.pixels[index / LEDS_PER_STRIP][index % LEDS_PER_STRIP]
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> OriginDimensions
    for StripFrameBuffer<LEDS_PER_STRIP, STRIPS>
{
    fn size(&self) -> Size {
        Size::new(LEDS_PER_STRIP as u32, STRIPS as u32)
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> DrawTarget
    for StripFrameBuffer<LEDS_PER_STRIP, STRIPS>
{
    type Color = Color;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for embedded_graphics::Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 {
                continue;
            }
            self.set_pixel(y as usize, x as usize, color);
        }
        Ok(())
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> core::fmt::Debug
    for StripFrameBuffer<LEDS_PER_STRIP, STRIPS>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StripFrameBuffer")
            .field("leds_per_strip", &LEDS_PER_STRIP)
            .field("strips", &STRIPS)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};

    type TestFrame = StripFrameBuffer<10, 3>;

    #[test]
    fn test_new_is_black() {
        let frame = TestFrame::new();
        assert_eq!(frame.as_slice().len(), 30);
        assert!(frame.as_slice().iter().all(|&c| c == Color::BLACK));
    }

    #[test]
    fn test_linear_index() {
        let mut frame = TestFrame::new();
        frame.set_pixel(2, 7, Color::RED);
        assert_eq!(frame.pixel(2 * 10 + 7), Color::RED);
        assert_eq!(frame.as_slice()[27], Color::RED);
        assert_eq!(frame.as_slice().pixel(27), Color::RED);
        assert_eq!(frame.pixel(7), Color::BLACK);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut frame = TestFrame::new();
        frame.set_pixel(3, 0, Color::RED);
        frame.set_pixel(0, 10, Color::RED);
        assert_eq!(frame, TestFrame::new());
    }

    #[test]
    fn test_fill() {
        let mut frame = TestFrame::new();
        frame.fill(Color::CYAN);
        assert!(frame.as_slice().iter().all(|&c| c == Color::CYAN));
    }

    #[test]
    fn test_as_mut_slice() {
        let mut frame = TestFrame::new();
        frame.as_mut_slice()[10] = Color::GREEN;
        assert_eq!(frame.get_pixel(1, 0), Color::GREEN);
    }

    #[test]
    fn test_array_source() {
        let pixels = [Color::RED, Color::GREEN, Color::BLUE];
        assert_eq!(pixels.pixel(1), Color::GREEN);
        assert_eq!(pixels[..].pixel(2), Color::BLUE);
    }

    #[test]
    fn test_size() {
        let frame = TestFrame::new();
        assert_eq!(frame.size(), Size::new(10, 3));
    }

    #[test]
    fn test_draw_line_along_strip() {
        let mut frame = TestFrame::new();
        Line::new(Point::new(2, 1), Point::new(5, 1))
            .into_styled(PrimitiveStyle::with_stroke(Color::YELLOW, 1))
            .draw(&mut frame)
            .unwrap();
        for led in 0..10 {
            let expected = if (2..=5).contains(&led) {
                Color::YELLOW
            } else {
                Color::BLACK
            };
            assert_eq!(frame.get_pixel(1, led), expected);
            assert_eq!(frame.get_pixel(0, led), Color::BLACK);
        }
    }

    #[test]
    fn test_draw_clips_negative_and_large_points() {
        let mut frame = TestFrame::new();
        frame
            .draw_iter([
                Pixel(Point::new(-1, 0), Color::RED),
                Pixel(Point::new(0, -1), Color::RED),
                Pixel(Point::new(100, 0), Color::RED),
                Pixel(Point::new(0, 0), Color::WHITE),
            ])
            .unwrap();
        assert_eq!(frame.get_pixel(0, 0), Color::WHITE);
        assert_eq!(frame.as_slice().iter().filter(|&&c| c != Color::BLACK).count(), 1);
    }
}
