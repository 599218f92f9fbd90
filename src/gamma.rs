//! Gamma-correction lookup table.
//!
//! The table is populated by the calibration side of the firmware (curve
//! shape, white point, per-channel scaling); this module only stores it and
//! answers lookups. Each channel has [`GAMMA_ENTRIES`] 16-bit entries that
//! sample the 16-bit linear domain every 256 steps, and a lookup linearly
//! interpolates between the two neighbouring entries.

/// Number of entries per channel: one every 256 input steps, plus the end point.
pub const GAMMA_ENTRIES: usize = 257;

/// Number of color channels in a pixel.
pub const CHANNELS: usize = 3;

/// Index of the red channel.
pub const RED: usize = 0;
/// Index of the green channel.
pub const GREEN: usize = 1;
/// Index of the blue channel.
pub const BLUE: usize = 2;

/// Per-channel gamma lookup table over the 16-bit domain.
#[derive(Clone, PartialEq, Eq)]
pub struct GammaTable {
    entries: [[u16; GAMMA_ENTRIES]; CHANNELS],
}

impl GammaTable {
    /// Wrap entries produced by the calibration subsystem.
    ///
    /// Entries are expected to be monotonically non-decreasing per channel.
    #[must_use]
    pub const fn new(entries: [[u16; GAMMA_ENTRIES]; CHANNELS]) -> Self {
        Self { entries }
    }

    /// A table that passes values straight through.
    ///
    /// Entry `i` is `i * 256`, with the last entry pinned to `0xFFFF`, so
    /// `lookup(x) == x` for every `x < 0xFF00`.
    #[must_use]
    pub const fn linear() -> Self {
        let mut channel = [0u16; GAMMA_ENTRIES];
        let mut i = 0;
        while i < GAMMA_ENTRIES - 1 {
            channel[i] = (i as u16) << 8;
            i += 1;
        }
        channel[GAMMA_ENTRIES - 1] = 0xFFFF;
        Self {
            entries: [channel; CHANNELS],
        }
    }

    /// Build a table by evaluating `f(channel, index)` for every entry.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> u16,
    {
        let mut entries = [[0u16; GAMMA_ENTRIES]; CHANNELS];
        for (channel, table) in entries.iter_mut().enumerate() {
            for (index, entry) in table.iter_mut().enumerate() {
                *entry = f(channel, index);
            }
        }
        Self { entries }
    }

    /// Raw entries of one channel.
    #[must_use]
    pub fn channel(&self, channel: usize) -> &[u16; GAMMA_ENTRIES] {
        &self.entries[channel]
    }

    /// Map a 16-bit linear value to a 16-bit corrected value.
    #[inline(always)]
    #[must_use]
    pub fn lookup(&self, channel: usize, value: u16) -> u16 {
        let table = &self.entries[channel];
        let index = usize::from(value >> 8);
        let alpha = u32::from(value & 0xFF);
        let low = u32::from(table[index]);
        let high = u32::from(table[index + 1]);
        ((low * (0x100 - alpha) + high * alpha) >> 8) as u16
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::linear()
    }
}

impl core::fmt::Debug for GammaTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GammaTable")
            .field("red_max", &self.entries[RED][GAMMA_ENTRIES - 1])
            .field("green_max", &self.entries[GREEN][GAMMA_ENTRIES - 1])
            .field("blue_max", &self.entries[BLUE][GAMMA_ENTRIES - 1])
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for GammaTable {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "GammaTable max: ({}, {}, {})",
            self.entries[RED][GAMMA_ENTRIES - 1],
            self.entries[GREEN][GAMMA_ENTRIES - 1],
            self.entries[BLUE][GAMMA_ENTRIES - 1]
        );
    }
}
