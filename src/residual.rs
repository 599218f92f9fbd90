//! Per-LED error-diffusion state.
//!
//! Each channel of each LED keeps the low byte that the last quantization
//! threw away. The encoder adds it back before quantizing the next refresh,
//! so the fractional part of a 16-bit target is spread over time instead of
//! being lost.

use crate::gamma::CHANNELS;

/// Quantization error carried between refreshes for one channel.
///
/// Always below one 8-bit output step (`0..=0xFF` in the 16-bit domain).
pub type Residual = u8;

/// Residuals of one LED, in red, green, blue order.
pub type ResidualSlot = [Residual; CHANNELS];

/// Residual state for every LED on every strip.
///
/// Sized once from the const parameters and never reallocated. The
/// pipeline owns it and hands out one LED's [`ResidualSlot`] at a time.
///
/// # Type Parameters
/// - `LEDS_PER_STRIP`: Number of LEDs on each strip
/// - `STRIPS`: Number of strips driven in parallel
#[derive(Clone, PartialEq, Eq)]
#[repr(C)]
pub struct ResidualStore<const LEDS_PER_STRIP: usize, const STRIPS: usize> {
    slots: [[ResidualSlot; LEDS_PER_STRIP]; STRIPS],
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> ResidualStore<LEDS_PER_STRIP, STRIPS> {
    /// Cold-start state: every residual is zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [[[0; CHANNELS]; LEDS_PER_STRIP]; STRIPS],
        }
    }

    /// Residuals of the LED at `led` on `strip`.
    #[inline]
    #[must_use]
    pub fn slot(&self, strip: usize, led: usize) -> &ResidualSlot {
        &self.slots[strip][led]
    }

    /// Mutable residuals of the LED at `led` on `strip`.
    #[inline]
    pub fn slot_mut(&mut self, strip: usize, led: usize) -> &mut ResidualSlot {
        &mut self.slots[strip][led]
    }

    /// Zero every residual.
    pub fn reset(&mut self) {
        for strip in &mut self.slots {
            strip.fill([0; CHANNELS]);
        }
    }

    /// Number of residual entries held.
    #[must_use]
    pub const fn len(&self) -> usize {
        LEDS_PER_STRIP * STRIPS * CHANNELS
    }

    /// True if the store holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every slot, strip-major.
    pub fn iter(&self) -> impl Iterator<Item = &ResidualSlot> {
        self.slots.iter().flat_map(|strip| strip.iter())
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> Default
    for ResidualStore<LEDS_PER_STRIP, STRIPS>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> core::fmt::Debug
    for ResidualStore<LEDS_PER_STRIP, STRIPS>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResidualStore")
            .field("leds_per_strip", &LEDS_PER_STRIP)
            .field("strips", &STRIPS)
            .field("size", &core::mem::size_of_val(&self.slots))
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const LEDS_PER_STRIP: usize, const STRIPS: usize> defmt::Format
    for ResidualStore<LEDS_PER_STRIP, STRIPS>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ResidualStore<{}, {}>", LEDS_PER_STRIP, STRIPS);
        defmt::write!(f, " size: {}", core::mem::size_of_val(&self.slots));
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let store = ResidualStore::<16, 4>::new();
        assert_eq!(store.iter().count(), 64);
        assert!(store.iter().all(|slot| *slot == [0, 0, 0]));
    }

    #[test]
    fn test_len_counts_channels() {
        let store = ResidualStore::<512, 8>::new();
        assert_eq!(store.len(), 512 * 8 * 3);
        assert!(!store.is_empty());
        assert_eq!(core::mem::size_of_val(&store), 512 * 8 * 3);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut store = ResidualStore::<8, 2>::new();
        *store.slot_mut(1, 7) = [1, 2, 3];
        store.slot_mut(0, 0)[2] = 9;

        assert_eq!(*store.slot(1, 7), [1, 2, 3]);
        assert_eq!(*store.slot(0, 0), [0, 0, 9]);
        assert_eq!(*store.slot(0, 7), [0, 0, 0]);
        assert_eq!(*store.slot(1, 0), [0, 0, 0]);
    }

    #[test]
    fn test_reset() {
        let mut store = ResidualStore::<4, 2>::new();
        *store.slot_mut(0, 1) = [255, 255, 255];
        *store.slot_mut(1, 3) = [1, 0, 1];
        store.reset();
        assert_eq!(store, ResidualStore::new());
    }

    #[test]
    fn test_debug() {
        let store = ResidualStore::<10, 2>::new();
        let debug = std::format!("{:?}", store);
        assert!(debug.contains("leds_per_strip: 10"));
        assert!(debug.contains("strips: 2"));
        assert!(debug.contains("size: 60"));
    }
}
