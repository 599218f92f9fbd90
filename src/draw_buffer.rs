//! Destination memory for the transposed bitstream.
//!
//! [`DrawBufferWriter`] is a typed view over memory owned by the DMA side.
//! Its length, and for raw byte regions its alignment, are checked once when
//! the view is created, so the sweep writes without further checks. The view
//! is borrowed for one sweep and never kept.
//!
//! [`DrawBuffer`] is an owned, DMA-readable buffer for callers that do not
//! bring their own memory. Double buffering is the caller's business: keep
//! two and hand the idle one to the sweep.
//!
//! # Memory Layout
//! `LEDS_PER_STRIP` groups of [`WORDS_PER_LED`] `u32` words, in LED order.
//! See [`crate::transpose`] for the layout inside a group.

use core::slice::ChunksExactMut;

#[cfg(not(feature = "esp-dma"))]
use embedded_dma::ReadBuffer;
#[cfg(feature = "esp-dma")]
use esp_hal::dma::ReadBuffer;

use crate::{compute_draw_buffer_words, ConfigError, WORDS_PER_LED};

/// Write access to a draw buffer region for one sweep.
///
/// # Type Parameters
/// - `LEDS_PER_STRIP`: Number of LEDs on each strip
pub struct DrawBufferWriter<'a, const LEDS_PER_STRIP: usize> {
    words: &'a mut [u32],
}

impl<'a, const LEDS_PER_STRIP: usize> DrawBufferWriter<'a, LEDS_PER_STRIP> {
    /// Number of words the sweep writes.
    pub const WORDS: usize = compute_draw_buffer_words(LEDS_PER_STRIP);

    /// View over `words`, which must hold at least [`Self::WORDS`] words.
    ///
    /// Extra words past the end are left untouched.
    pub fn new(words: &'a mut [u32]) -> Result<Self, ConfigError> {
        let actual = words.len();
        match words.get_mut(..Self::WORDS) {
            Some(words) => Ok(Self { words }),
            None => {
                warn!(
                    "draw buffer too short: {} words, need {}",
                    actual,
                    Self::WORDS
                );
                Err(ConfigError::DrawBufferTooShort {
                    required: Self::WORDS,
                    actual,
                })
            }
        }
    }

    /// View over a raw byte region handed over by the DMA driver.
    ///
    /// The region must be 4-byte aligned and hold at least
    /// [`Self::WORDS`] words.
    pub fn from_bytes(bytes: &'a mut [u8]) -> Result<Self, ConfigError> {
        // SAFETY: every bit pattern is a valid `u32`, and `align_to_mut`
        // only returns correctly aligned words inside `bytes`.
        let (head, words, _) = unsafe { bytes.align_to_mut::<u32>() };
        if !head.is_empty() {
            warn!("draw buffer is not 4-byte aligned");
            return Err(ConfigError::MisalignedDrawBuffer);
        }
        Self::new(words)
    }

    /// Write the group of LED index `led`.
    #[inline]
    pub fn write_group(&mut self, led: usize, group: &[u32; WORDS_PER_LED]) {
        let start = led * WORDS_PER_LED;
        self.words[start..start + WORDS_PER_LED].copy_from_slice(group);
    }

    /// One mutable chunk of [`WORDS_PER_LED`] words per LED index, in order.
    #[inline]
    pub(crate) fn groups_mut(&mut self) -> ChunksExactMut<'_, u32> {
        self.words.chunks_exact_mut(WORDS_PER_LED)
    }
}

impl<const LEDS_PER_STRIP: usize> core::fmt::Debug for DrawBufferWriter<'_, LEDS_PER_STRIP> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawBufferWriter")
            .field("leds_per_strip", &LEDS_PER_STRIP)
            .field("words", &self.words.len())
            .finish()
    }
}

/// DMA-compatible draw buffer for `LEDS_PER_STRIP` LEDs on up to eight strips.
///
/// # Example
/// ```rust
/// use ws2811_drawbuffer::draw_buffer::DrawBuffer;
///
/// const LEDS_PER_STRIP: usize = 64;
///
/// let mut buffer = DrawBuffer::<LEDS_PER_STRIP>::new();
/// assert_eq!(buffer.as_words().len(), LEDS_PER_STRIP * 6);
/// let writer = buffer.writer();
/// # drop(writer);
/// ```
#[derive(Copy, Clone)]
#[repr(C)]
#[repr(align(4))]
pub struct DrawBuffer<const LEDS_PER_STRIP: usize> {
    groups: [[u32; WORDS_PER_LED]; LEDS_PER_STRIP],
}

impl<const LEDS_PER_STRIP: usize> DrawBuffer<LEDS_PER_STRIP> {
    /// A zeroed buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: [[0; WORDS_PER_LED]; LEDS_PER_STRIP],
        }
    }

    /// Size of the DMA buffer in bytes, for sizing DMA descriptor chains.
    #[must_use]
    pub const fn dma_buffer_size_bytes() -> usize {
        core::mem::size_of::<[[u32; WORDS_PER_LED]; LEDS_PER_STRIP]>()
    }

    /// Writer covering the whole buffer.
    pub fn writer(&mut self) -> DrawBufferWriter<'_, LEDS_PER_STRIP> {
        DrawBufferWriter {
            words: self.groups.as_flattened_mut(),
        }
    }

    /// Contents as words, in transmission order.
    #[must_use]
    pub fn as_words(&self) -> &[u32] {
        self.groups.as_flattened()
    }

    /// Words of LED index `led`.
    #[must_use]
    pub fn group(&self, led: usize) -> &[u32; WORDS_PER_LED] {
        &self.groups[led]
    }
}

impl<const LEDS_PER_STRIP: usize> Default for DrawBuffer<LEDS_PER_STRIP> {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl<const LEDS_PER_STRIP: usize> ReadBuffer for DrawBuffer<LEDS_PER_STRIP> {
    #[cfg(not(feature = "esp-dma"))]
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        let ptr = &self.groups as *const _ as *const u8;
        let len = core::mem::size_of_val(&self.groups);
        (ptr, len)
    }
}

unsafe impl<const LEDS_PER_STRIP: usize> ReadBuffer for &mut DrawBuffer<LEDS_PER_STRIP> {
    #[cfg(not(feature = "esp-dma"))]
    type Word = u8;

    unsafe fn read_buffer(&self) -> (*const u8, usize) {
        let ptr = &self.groups as *const _ as *const u8;
        let len = core::mem::size_of_val(&self.groups);
        (ptr, len)
    }
}

impl<const LEDS_PER_STRIP: usize> core::fmt::Debug for DrawBuffer<LEDS_PER_STRIP> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DrawBuffer")
            .field("leds_per_strip", &LEDS_PER_STRIP)
            .field("size", &core::mem::size_of_val(&self.groups))
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const LEDS_PER_STRIP: usize> defmt::Format for DrawBuffer<LEDS_PER_STRIP> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DrawBuffer<{}>", LEDS_PER_STRIP);
        defmt::write!(f, " size: {}", core::mem::size_of_val(&self.groups));
    }
}
