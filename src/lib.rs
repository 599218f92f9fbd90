//! Interpolating, dithering draw-buffer renderer for parallel WS2811 strips.
//!
//! ## How Parallel WS2811 Output Works
//!
//! WS2811 and WS2812 pixels take a single self-clocked data line. Every bit
//! is a fixed-length pulse whose high time encodes a 0 or a 1, and each pixel
//! latches the first 24 bits it sees before passing the rest down the chain.
//! A frame is 24 bits per pixel, most significant bit first, in the order
//! the chip expects (usually green, red, blue).
//!
//! Driving up to eight strips at once is done with one parallel output
//! peripheral (I2S, LCD_CAM, PIO, or a GPIO port fed by DMA). Each cycle of
//! the peripheral emits one byte and every bit of that byte drives one strip.
//! The same bit position of all strips therefore has to sit in one byte, a
//! *bit plane*. Producing those bytes from ordinary pixel data is a transpose.
//!
//! ## The Refresh Sweep
//!
//! Frames arrive at the frame rate of the sender; strips refresh much faster.
//! Every refresh runs one sweep over all LEDs:
//!
//! 1. Blend the previous and next frames with a 16-bit interpolation
//!    coefficient ([`fixed`]).
//! 2. Map the result through a per-channel gamma curve with 16-bit output
//!    ([`gamma`]).
//! 3. Quantize to 8 bits, carrying the lost low byte to the next refresh of
//!    the same pixel ([`encoder`], [`residual`]). Over time the strip shows
//!    the 16-bit value.
//! 4. Pack the channels into a 24-bit word in the strip's color order.
//! 5. Transpose the words of all strips into [`WORDS_PER_LED`] bit-plane
//!    words ([`transpose`]) and store them in the DMA draw buffer
//!    ([`draw_buffer`]).
//!
//! [`pipeline::ColorPipeline`] runs the sweep. Source frames are read through
//! [`framebuffer::PixelSource`], which plain slices and
//! [`framebuffer::StripFrameBuffer`] implement.
//!
//! The crate only fills memory. Pulse generation, the DMA engine, frame
//! reception, and timing of the sweep belong to the platform.
//!
//! ## Available Feature Flags
//!
//! ### `esp-dma` Feature (required when using `esp-hal`)
//! Switches the `ReadBuffer` implementation of [`draw_buffer::DrawBuffer`]
//! from `embedded-dma` to `esp-hal::dma`.
//!
//! ```toml
//! [dependencies]
//! ws2811-drawbuffer = { version = "0.1.0", features = ["esp-dma"] }
//! ```
//!
//! ### `esp32-ordering` Feature (required for original ESP32 only)
//! The I2S peripheral of the original ESP32 sends the bytes of each 32-bit
//! word in the order 2, 3, 0, 1. With this feature every bit-plane word is
//! stored pre-swapped so the strips still see planes in MSB-first order.
//! ESP32-S2, S3, C3, and C6 do **not** need it.
//!
//! ### `esp32`, `esp32s3`, `esp32c6` Features
//! Select the `esp-hal` chip and enable the matching features above.
//!
//! ### `log` / `defmt` Features
//! Route the few configuration-time messages to `log` or `defmt`, and
//! implement `defmt::Format` for the public types. The two are mutually
//! exclusive. The refresh sweep never logs.
#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
mod fmt;

pub mod draw_buffer;
pub mod encoder;
pub mod fixed;
pub mod framebuffer;
pub mod gamma;
pub mod pipeline;
pub mod residual;
pub mod transpose;

use embedded_graphics::pixelcolor::Rgb888;

pub use draw_buffer::{DrawBuffer, DrawBufferWriter};
pub use encoder::ColorOrder;
pub use fixed::UNIT;
pub use framebuffer::{PixelSource, StripFrameBuffer};
pub use gamma::GammaTable;
pub use pipeline::{ColorPipeline, PipelineFlags};
pub use transpose::StripMap;

/// Color type of source frames
pub type Color = Rgb888;

/// Bits sent to each LED per refresh
pub const COLOR_BITS: u32 = 24;

/// Bit planes packed into one output word, one byte each
pub const PLANES_PER_WORD: usize = 4;

/// Output words per LED index
pub const WORDS_PER_LED: usize = compute_words_per_led(COLOR_BITS);

/// Strips one output byte can drive
pub const MAX_STRIPS: usize = 8;

/// Computes the number of output words needed per LED index
///
/// # Arguments
///
/// * `bits` - Number of bits sent to each LED
///
/// # Returns
///
/// Number of 32-bit words holding `bits` bit planes of one byte each
#[must_use]
pub const fn compute_words_per_led(bits: u32) -> usize {
    (bits as usize).div_ceil(PLANES_PER_WORD)
}

/// Computes the size of the draw buffer in words
///
/// # Arguments
///
/// * `leds_per_strip` - Number of LEDs on each strip
///
/// # Returns
///
/// Number of 32-bit words one sweep writes
#[must_use]
pub const fn compute_draw_buffer_words(leds_per_strip: usize) -> usize {
    leds_per_strip * WORDS_PER_LED
}

/// Errors raised while setting up the output.
///
/// None of these can happen during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The draw buffer region is smaller than one sweep writes.
    DrawBufferTooShort {
        /// Words needed
        required: usize,
        /// Words supplied
        actual: usize,
    },
    /// A raw draw buffer region does not start on a 4-byte boundary.
    MisalignedDrawBuffer,
    /// A strip map names a lane that does not exist.
    StripLaneOutOfRange {
        /// Offending lane
        lane: u8,
    },
    /// A strip map uses the same lane twice.
    DuplicateStripLane {
        /// Lane used more than once
        lane: u8,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DrawBufferTooShort { required, actual } => write!(
                f,
                "draw buffer holds {actual} words but a sweep writes {required}"
            ),
            Self::MisalignedDrawBuffer => f.write_str("draw buffer is not 4-byte aligned"),
            Self::StripLaneOutOfRange { lane } => {
                write!(f, "strip lane {lane} is out of range (max {})", MAX_STRIPS - 1)
            }
            Self::DuplicateStripLane { lane } => write!(f, "strip lane {lane} is used twice"),
        }
    }
}

impl core::error::Error for ConfigError {}


#[cfg(test)]
mod tests {
    extern crate std;

    use std::format;
    use std::string::ToString;

    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_compute_words_per_led() {
        assert_eq!(compute_words_per_led(24), 6);
        assert_eq!(compute_words_per_led(32), 8);
        // Partial words still need a whole word.
        assert_eq!(compute_words_per_led(25), 7);
        assert_eq!(compute_words_per_led(4), 1);
        assert_eq!(compute_words_per_led(0), 0);
    }

    #[test]
    fn test_words_per_led_matches_color_bits() {
        assert_eq!(WORDS_PER_LED, 6);
        assert_eq!(WORDS_PER_LED * PLANES_PER_WORD, COLOR_BITS as usize);
    }

    #[test]
    fn test_compute_draw_buffer_words() {
        assert_eq!(compute_draw_buffer_words(1), 6);
        assert_eq!(compute_draw_buffer_words(64), 384);
        assert_eq!(compute_draw_buffer_words(512), 3072);
        assert_eq!(compute_draw_buffer_words(0), 0);
    }

    #[test]
    fn test_helper_functions_const() {
        const LEDS: usize = 100;
        const WORDS: usize = compute_draw_buffer_words(LEDS);
        const BYTES: usize = WORDS * 4;
        assert_eq!(WORDS, 600);
        assert_eq!(BYTES, 2400);
    }

    #[test]
    fn test_color_type_alias() {
        let color: Color = Color::new(1, 2, 3);
        assert_eq!(color.r(), 1);
        assert_eq!(color.g(), 2);
        assert_eq!(color.b(), 3);
        assert_eq!(Color::WHITE, Rgb888::new(255, 255, 255));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::DrawBufferTooShort {
            required: 384,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "draw buffer holds 10 words but a sweep writes 384"
        );
        assert_eq!(
            ConfigError::MisalignedDrawBuffer.to_string(),
            "draw buffer is not 4-byte aligned"
        );
        assert_eq!(
            ConfigError::StripLaneOutOfRange { lane: 9 }.to_string(),
            "strip lane 9 is out of range (max 7)"
        );
        assert_eq!(
            ConfigError::DuplicateStripLane { lane: 3 }.to_string(),
            "strip lane 3 is used twice"
        );
    }

    #[test]
    fn test_config_error_debug_and_eq() {
        let err = ConfigError::DuplicateStripLane { lane: 2 };
        assert_eq!(format!("{err:?}"), "DuplicateStripLane { lane: 2 }");
        assert_ne!(err, ConfigError::DuplicateStripLane { lane: 3 });
        let copy = err;
        assert_eq!(copy, err);
    }

    #[test]
    fn test_config_error_is_error() {
        fn takes_error(_: &dyn core::error::Error) {}
        takes_error(&ConfigError::MisalignedDrawBuffer);
    }

    #[test]
    fn test_reexports() {
        let _pipeline: ColorPipeline<4, 2> = ColorPipeline::new();
        let _buffer: DrawBuffer<4> = DrawBuffer::new();
        let _frame: StripFrameBuffer<4, 2> = StripFrameBuffer::new();
        assert_eq!(ColorOrder::default(), ColorOrder::Grb);
        assert_eq!(StripMap::default(), StripMap::IDENTITY);
        assert_eq!(UNIT, 0x1_0000);
        assert_eq!(GammaTable::default(), GammaTable::linear());
        assert_eq!(PipelineFlags::default().bits(), 0);
    }

    #[test]
    fn test_xorshift_deterministic() {
        let mut a = testing::XorShift::new(7);
        let mut b = testing::XorShift::new(7);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        let mut c = testing::XorShift::new(0);
        assert_ne!(c.next_u32(), 0);
        let color = c.color_below(16);
        assert!(color.r() < 16 && color.g() < 16 && color.b() < 16);
    }
}
