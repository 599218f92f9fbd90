//! Bit-plane transpose of per-strip color words into DMA words.
//!
//! The output peripheral drives one GPIO bit per strip and clocks out one
//! byte per WS2811 bit slot. So the draw buffer is a sequence of bit planes:
//! each byte holds the same bit position of every strip's color word.
//!
//! # Layout
//! For one LED index, the 24-bit color words of up to eight strips become
//! [`WORDS_PER_LED`] 32-bit words:
//!
//! - word `k` covers bit positions `23 - 4k` down to `20 - 4k`, so the most
//!   significant bits are emitted first;
//! - byte `j` of word `k` (little-endian byte order) is the plane for bit
//!   position `23 - 4k - j`;
//! - inside a plane, strip `s` sits at bit [`StripMap::lane`]`(s)`.
//!
//! Read as bytes, an LED's block is 24 planes where byte `n` carries bit
//! `23 - n` of every strip. Lanes without an active strip are always zero.
//!
//! With the `esp32-ordering` feature each word has its 16-bit halves swapped,
//! because the original ESP32's I²S peripheral emits the bytes of a word in
//! the order 2, 3, 0, 1 in 8-bit mode.

use bitfield::bitfield;

use crate::{ConfigError, COLOR_BITS, MAX_STRIPS, PLANES_PER_WORD, WORDS_PER_LED};

bitfield! {
    /// One 32-bit DMA word holding four consecutive bit planes.
    ///
    /// Plane `j` occupies bits `8j + 7` down to `8j`.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct PlaneWord(u32);
    impl Debug;
    pub u8, plane, set_plane: 7, 0, 4;
}

impl PlaneWord {
    /// An empty word.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// The word as it must be stored for the peripheral.
    #[inline(always)]
    #[must_use]
    pub const fn to_wire(self) -> u32 {
        if cfg!(feature = "esp32-ordering") {
            self.0.rotate_left(16)
        } else {
            self.0
        }
    }

    /// Inverse of [`PlaneWord::to_wire`].
    #[inline(always)]
    #[must_use]
    pub const fn from_wire(word: u32) -> Self {
        if cfg!(feature = "esp32-ordering") {
            Self(word.rotate_right(16))
        } else {
            Self(word)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PlaneWord {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "PlaneWord({=u32:#x})", self.0)
    }
}

/// Bit offset inside a [`PlaneWord`] of `lane` in plane `plane`.
#[inline(always)]
#[must_use]
pub const fn bit_offset(plane: usize, lane: u8) -> u32 {
    (plane * 8) as u32 + lane as u32
}

/// Color bit carried by plane `plane` of output word `word`.
#[inline(always)]
#[must_use]
pub const fn bit_position(word: usize, plane: usize) -> u32 {
    COLOR_BITS - 1 - (word * PLANES_PER_WORD + plane) as u32
}

/// Assignment of strips to bit lanes of the output port.
///
/// Boards wire strips to port pins in whatever order the layout allows; the
/// map says which bit of each plane byte a strip occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripMap {
    lanes: [u8; MAX_STRIPS],
}

impl StripMap {
    /// Strip `s` on lane `s`.
    pub const IDENTITY: Self = Self {
        lanes: [0, 1, 2, 3, 4, 5, 6, 7],
    };

    /// Validate a strip-to-lane assignment.
    ///
    /// Every lane must be below [`MAX_STRIPS`] and used once.
    pub fn new(lanes: [u8; MAX_STRIPS]) -> Result<Self, ConfigError> {
        let mut seen = 0u8;
        for &lane in &lanes {
            if usize::from(lane) >= MAX_STRIPS {
                warn!("strip map lane {} out of range", lane);
                return Err(ConfigError::StripLaneOutOfRange { lane });
            }
            if seen & (1 << lane) != 0 {
                warn!("strip map lane {} assigned twice", lane);
                return Err(ConfigError::DuplicateStripLane { lane });
            }
            seen |= 1 << lane;
        }
        Ok(Self { lanes })
    }

    /// Lane of `strip`.
    #[inline(always)]
    #[must_use]
    pub const fn lane(&self, strip: usize) -> u8 {
        self.lanes[strip]
    }

    /// Lanes of all strips.
    #[must_use]
    pub const fn lanes(&self) -> [u8; MAX_STRIPS] {
        self.lanes
    }
}

impl Default for StripMap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Packs the color words of `STRIPS` strips into bit-plane DMA words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitPlaneTransposer<const STRIPS: usize> {
    map: StripMap,
}

impl<const STRIPS: usize> BitPlaneTransposer<STRIPS> {
    const VALID: () = assert!(
        STRIPS >= 1 && STRIPS <= MAX_STRIPS,
        "STRIPS must be between 1 and MAX_STRIPS"
    );

    /// Transposer using `map` to place strips on lanes.
    #[must_use]
    pub const fn new(map: StripMap) -> Self {
        let () = Self::VALID;
        Self { map }
    }

    /// The strip map in use.
    #[must_use]
    pub const fn strip_map(&self) -> StripMap {
        self.map
    }

    /// Transpose one LED index worth of color words.
    #[inline(always)]
    #[must_use]
    pub fn transpose(&self, colors: &[u32; STRIPS]) -> [u32; WORDS_PER_LED] {
        let mut words = [0u32; WORDS_PER_LED];
        for (index, word) in words.iter_mut().enumerate() {
            let mut planes = PlaneWord::new();
            for plane in 0..PLANES_PER_WORD {
                let bit = bit_position(index, plane);
                let mut byte = 0u8;
                for (strip, color) in colors.iter().enumerate() {
                    byte |= (((color >> bit) & 1) as u8) << self.map.lane(strip);
                }
                planes.set_plane(plane, byte);
            }
            *word = planes.to_wire();
        }
        words
    }

    /// Recover the color words from transposed output.
    #[must_use]
    pub fn untranspose(&self, words: &[u32; WORDS_PER_LED]) -> [u32; STRIPS] {
        let mut colors = [0u32; STRIPS];
        for (index, &word) in words.iter().enumerate() {
            let planes = PlaneWord::from_wire(word);
            for plane in 0..PLANES_PER_WORD {
                let bit = bit_position(index, plane);
                let byte = planes.plane(plane);
                for (strip, color) in colors.iter_mut().enumerate() {
                    *color |= u32::from((byte >> self.map.lane(strip)) & 1) << bit;
                }
            }
        }
        colors
    }
}

impl<const STRIPS: usize> Default for BitPlaneTransposer<STRIPS> {
    fn default() -> Self {
        Self::new(StripMap::IDENTITY)
    }
}
