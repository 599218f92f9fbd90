//! The refresh sweep.
//!
//! [`ColorPipeline`] owns the residual state and the per-device output
//! settings. One call to [`ColorPipeline::update_draw_buffer`] walks every LED
//! index and, inside it, every strip; encodes each pixel; transposes the
//! strips' color words; and writes the group into the draw buffer. It does
//! not allocate, block, or fail.
//!
//! # Example
//! ```rust
//! use embedded_graphics::pixelcolor::RgbColor;
//! use ws2811_drawbuffer::draw_buffer::DrawBuffer;
//! use ws2811_drawbuffer::framebuffer::StripFrameBuffer;
//! use ws2811_drawbuffer::gamma::GammaTable;
//! use ws2811_drawbuffer::pipeline::ColorPipeline;
//! use ws2811_drawbuffer::{Color, UNIT};
//!
//! const LEDS_PER_STRIP: usize = 64;
//! const STRIPS: usize = 8;
//!
//! let gamma = GammaTable::linear();
//! let prev = StripFrameBuffer::<LEDS_PER_STRIP, STRIPS>::new();
//! let mut next = StripFrameBuffer::<LEDS_PER_STRIP, STRIPS>::new();
//! next.fill(Color::WHITE);
//!
//! let mut pipeline = ColorPipeline::<LEDS_PER_STRIP, STRIPS>::new();
//! let mut buffer = DrawBuffer::<LEDS_PER_STRIP>::new();
//!
//! // A quarter of the way from `prev` to `next`.
//! pipeline.update_draw_buffer(&gamma, &prev, &next, UNIT / 4, &mut buffer.writer());
//! ```

use bitfield::bitfield;

use crate::draw_buffer::DrawBufferWriter;
use crate::encoder::{ColorOrder, PixelEncoder};
use crate::fixed::{InterpolationWeights, UNIT};
use crate::framebuffer::PixelSource;
use crate::gamma::GammaTable;
use crate::residual::ResidualStore;
use crate::transpose::{BitPlaneTransposer, StripMap};

bitfield! {
    /// Runtime switches, in the layout of the controller's configuration
    /// flags byte.
    ///
    /// - Bit 0: disable dithering
    /// - Bit 1: disable interpolation
    ///
    /// Higher bits drive the status LED and are not kept.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PipelineFlags(u8);
    impl Debug;
    pub no_dithering, set_no_dithering: 0;
    pub no_interpolation, set_no_interpolation: 1;
}

impl PipelineFlags {
    const MASK: u8 = 0b11;

    /// Dithering and interpolation both on.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Take the pipeline bits of a configuration flags byte.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PipelineFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PipelineFlags({=u8:#x})", self.0)
    }
}

/// Interpolating, dithering draw-buffer renderer for `STRIPS` parallel strips.
///
/// # Type Parameters
/// - `LEDS_PER_STRIP`: Number of LEDs on each strip
/// - `STRIPS`: Number of strips driven, 1 to [`crate::MAX_STRIPS`]
pub struct ColorPipeline<const LEDS_PER_STRIP: usize, const STRIPS: usize> {
    residuals: ResidualStore<LEDS_PER_STRIP, STRIPS>,
    transposer: BitPlaneTransposer<STRIPS>,
    order: ColorOrder,
    flags: PipelineFlags,
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> ColorPipeline<LEDS_PER_STRIP, STRIPS> {
    const VALID: () = assert!(LEDS_PER_STRIP >= 1, "LEDS_PER_STRIP must be at least 1");

    /// Cold-start pipeline: zero residuals, GRB order, identity strip map,
    /// dithering and interpolation on.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::VALID;
        Self {
            residuals: ResidualStore::new(),
            transposer: BitPlaneTransposer::new(StripMap::IDENTITY),
            order: ColorOrder::Grb,
            flags: PipelineFlags::new(),
        }
    }

    /// Use `order` to pack color words.
    #[must_use]
    pub const fn with_color_order(mut self, order: ColorOrder) -> Self {
        self.order = order;
        self
    }

    /// Use `map` to place strips on output lanes.
    #[must_use]
    pub const fn with_strip_map(mut self, map: StripMap) -> Self {
        self.transposer = BitPlaneTransposer::new(map);
        self
    }

    /// Start with `flags`.
    #[must_use]
    pub const fn with_flags(mut self, flags: PipelineFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the runtime flags. Takes effect on the next sweep.
    pub fn set_flags(&mut self, flags: PipelineFlags) {
        if flags != self.flags {
            debug!("pipeline flags changed to {}", flags.bits());
        }
        self.flags = flags;
    }

    /// Current runtime flags.
    #[must_use]
    pub const fn flags(&self) -> PipelineFlags {
        self.flags
    }

    /// Color order of the packed words.
    #[must_use]
    pub const fn color_order(&self) -> ColorOrder {
        self.order
    }

    /// Strip-to-lane map of the output.
    #[must_use]
    pub const fn strip_map(&self) -> StripMap {
        self.transposer.strip_map()
    }

    /// Residual state carried between sweeps.
    #[must_use]
    pub const fn residuals(&self) -> &ResidualStore<LEDS_PER_STRIP, STRIPS> {
        &self.residuals
    }

    /// Drop all carried quantization error.
    pub fn reset_residuals(&mut self) {
        self.residuals.reset();
    }

    /// Weights the next sweep uses for `coefficient`.
    ///
    /// With interpolation disabled the next frame is shown as-is.
    #[must_use]
    pub fn weights(&self, coefficient: u32) -> InterpolationWeights {
        if self.flags.no_interpolation() {
            InterpolationWeights::from_coefficient(UNIT)
        } else {
            InterpolationWeights::from_coefficient(coefficient)
        }
    }

    /// Render one refresh into `out`.
    ///
    /// `coefficient` is in `[0, UNIT]`, where 0 shows `prev` and [`UNIT`]
    /// shows `next`. Both frames must hold `LEDS_PER_STRIP * STRIPS` pixels.
    pub fn update_draw_buffer<F>(
        &mut self,
        gamma: &GammaTable,
        prev: &F,
        next: &F,
        coefficient: u32,
        out: &mut DrawBufferWriter<'_, LEDS_PER_STRIP>,
    ) where
        F: PixelSource + ?Sized,
    {
        let weights = self.weights(coefficient);
        let encoder =
            PixelEncoder::new(gamma, self.order).with_dithering(!self.flags.no_dithering());

        for (led, group) in out.groups_mut().enumerate() {
            let mut colors = [0u32; STRIPS];
            for (strip, color) in colors.iter_mut().enumerate() {
                let index = strip * LEDS_PER_STRIP + led;
                *color = encoder.encode(
                    weights,
                    prev.pixel(index),
                    next.pixel(index),
                    self.residuals.slot_mut(strip, led),
                );
            }
            group.copy_from_slice(&self.transposer.transpose(&colors));
        }
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> Default
    for ColorPipeline<LEDS_PER_STRIP, STRIPS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> core::fmt::Debug
    for ColorPipeline<LEDS_PER_STRIP, STRIPS>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ColorPipeline")
            .field("leds_per_strip", &LEDS_PER_STRIP)
            .field("strips", &STRIPS)
            .field("order", &self.order)
            .field("strip_map", &self.transposer.strip_map())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> defmt::Format
    for ColorPipeline<LEDS_PER_STRIP, STRIPS>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ColorPipeline<{}, {}> order: {} flags: {}",
            LEDS_PER_STRIP,
            STRIPS,
            self.order,
            self.flags
        );
    }
}
