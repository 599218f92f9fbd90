//! Per-pixel update: temporal interpolation, gamma correction and
//! error-diffusion dithering.
//!
//! For each channel the encoder blends the previous and next frame in the
//! 16-bit linear domain, looks the result up in the [`GammaTable`], adds the
//! residual left over from the last refresh, and keeps the high byte for
//! output. The low byte goes back into the residual, so over many refreshes
//! the average output converges on the full 16-bit target.
//!
//! # Example
//! ```rust
//! use embedded_graphics::pixelcolor::Rgb888;
//! use ws2811_drawbuffer::encoder::{ColorOrder, PixelEncoder};
//! use ws2811_drawbuffer::fixed::InterpolationWeights;
//! use ws2811_drawbuffer::gamma::GammaTable;
//!
//! let gamma = GammaTable::linear();
//! let encoder = PixelEncoder::new(&gamma, ColorOrder::Grb);
//! let mut residual = [0u8; 3];
//!
//! let word = encoder.encode(
//!     InterpolationWeights::FULL_NEXT,
//!     Rgb888::new(0, 0, 0),
//!     Rgb888::new(0x10, 0x20, 0x30),
//!     &mut residual,
//! );
//! assert_eq!(word, 0x20_10_30);
//! assert_eq!(residual, [0x10, 0x20, 0x30]);
//! ```

use embedded_graphics::pixelcolor::RgbColor;

use crate::fixed::InterpolationWeights;
use crate::gamma::{GammaTable, BLUE, CHANNELS, GREEN, RED};
use crate::residual::{Residual, ResidualSlot};
use crate::Color;

/// Channel order of the packed color word.
///
/// The first named channel lands in bits 23..16 and is transmitted first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    /// Red, green, blue
    Rgb,
    /// Red, blue, green
    Rbg,
    /// Green, red, blue (WS2811 / WS2812)
    #[default]
    Grb,
    /// Green, blue, red
    Gbr,
    /// Blue, red, green
    Brg,
    /// Blue, green, red
    Bgr,
}

impl ColorOrder {
    /// Bit shift of the red, green and blue channels inside the packed word.
    #[must_use]
    pub const fn shifts(self) -> [u32; CHANNELS] {
        match self {
            Self::Rgb => [16, 8, 0],
            Self::Rbg => [16, 0, 8],
            Self::Grb => [8, 16, 0],
            Self::Gbr => [0, 16, 8],
            Self::Brg => [8, 0, 16],
            Self::Bgr => [0, 8, 16],
        }
    }

    /// Pack three 8-bit channels into a 24-bit color word.
    #[inline]
    #[must_use]
    pub const fn pack(self, r: u8, g: u8, b: u8) -> u32 {
        let [rs, gs, bs] = self.shifts();
        (r as u32) << rs | (g as u32) << gs | (b as u32) << bs
    }

    /// Split a packed color word back into red, green and blue.
    #[must_use]
    pub const fn unpack(self, word: u32) -> (u8, u8, u8) {
        let [rs, gs, bs] = self.shifts();
        (
            (word >> rs) as u8,
            (word >> gs) as u8,
            (word >> bs) as u8,
        )
    }
}

/// Add `residual` to `value`, keep the high byte, store the low byte back.
///
/// The sum saturates at `0xFFFF`, so the residual never exceeds `0xFF`.
#[inline(always)]
pub fn dither_channel(value: u16, residual: &mut Residual) -> u8 {
    let total = (u32::from(value) + u32::from(*residual)).min(0xFFFF);
    *residual = (total & 0xFF) as u8;
    (total >> 8) as u8
}

/// Turns a pair of source pixels into one packed, dithered color word.
#[derive(Clone, Copy)]
pub struct PixelEncoder<'a> {
    gamma: &'a GammaTable,
    shifts: [u32; CHANNELS],
    dithering: bool,
}

impl<'a> PixelEncoder<'a> {
    /// Create an encoder that dithers, using `gamma` and packing in `order`.
    #[must_use]
    pub fn new(gamma: &'a GammaTable, order: ColorOrder) -> Self {
        Self {
            gamma,
            shifts: order.shifts(),
            dithering: true,
        }
    }

    /// Enable or disable dithering.
    ///
    /// Without dithering the output is the truncated high byte and each
    /// residual is cleared, so turning it back on starts from a clean state.
    #[must_use]
    pub fn with_dithering(mut self, dithering: bool) -> Self {
        self.dithering = dithering;
        self
    }

    /// Encode one pixel and advance its residuals.
    #[inline(always)]
    pub fn encode(
        &self,
        weights: InterpolationWeights,
        prev: Color,
        next: Color,
        residual: &mut ResidualSlot,
    ) -> u32 {
        let prev = [prev.r(), prev.g(), prev.b()];
        let next = [next.r(), next.g(), next.b()];
        let mut word = 0;
        for channel in [RED, GREEN, BLUE] {
            let linear = weights.blend(prev[channel], next[channel]);
            let corrected = self.gamma.lookup(channel, linear);
            let quantized = self.quantize(corrected, &mut residual[channel]);
            word |= u32::from(quantized) << self.shifts[channel];
        }
        word
    }

    #[inline(always)]
    fn quantize(&self, corrected: u16, residual: &mut Residual) -> u8 {
        if self.dithering {
            dither_channel(corrected, residual)
        } else {
            *residual = 0;
            (corrected >> 8) as u8
        }
    }
}

impl core::fmt::Debug for PixelEncoder<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelEncoder")
            .field("shifts", &self.shifts)
            .field("dithering", &self.dithering)
            .finish_non_exhaustive()
    }
}
