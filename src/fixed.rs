//! Fixed-point helpers shared by the encoder and the sweep.
//!
//! Colors arrive as 8-bit channels and are processed in a 16-bit linear
//! domain. Widening multiplies by 257 so that `0xFF` maps to `0xFFFF`
//! exactly. The interpolation weights carry that factor, which lets a single
//! multiply-add and shift do both the widening and the blend.

/// Interpolation coefficient meaning "100% next frame".
pub const UNIT: u32 = 0x1_0000;

/// Factor taking an 8-bit channel value to the 16-bit linear domain.
pub const WIDEN: u32 = 257;

/// Sum of the previous and next weights, for every coefficient.
pub const WEIGHT_SUM: u32 = WIDEN * UNIT;

/// Widens an 8-bit channel value to 16 bits (`0xFF` becomes `0xFFFF`).
#[inline]
#[must_use]
pub const fn widen(value: u8) -> u16 {
    value as u16 * WIDEN as u16
}

/// Prev/next blend weights derived from an interpolation coefficient.
///
/// `prev` is in `[0, WEIGHT_SUM]`, `next` is in `[0, WEIGHT_SUM]` and
/// `prev + next == WEIGHT_SUM` exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterpolationWeights {
    prev: u32,
    next: u32,
}

impl InterpolationWeights {
    /// Weights that reproduce the previous frame.
    pub const FULL_PREV: Self = Self::from_coefficient(0);

    /// Weights that reproduce the next frame.
    pub const FULL_NEXT: Self = Self::from_coefficient(UNIT);

    /// Derive weights from a coefficient in `[0, UNIT]`.
    ///
    /// Coefficients above [`UNIT`] are treated as [`UNIT`].
    #[inline]
    #[must_use]
    pub const fn from_coefficient(coefficient: u32) -> Self {
        let coefficient = if coefficient > UNIT { UNIT } else { coefficient };
        Self {
            prev: WIDEN * (UNIT - coefficient),
            next: WIDEN * coefficient,
        }
    }

    /// Weight applied to the previous frame.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> u32 {
        self.prev
    }

    /// Weight applied to the next frame.
    #[inline]
    #[must_use]
    pub const fn next(self) -> u32 {
        self.next
    }

    /// Blend two 8-bit channel values into the 16-bit linear domain.
    ///
    /// Equal to `(widen(prev) * (UNIT - c) + widen(next) * c) / UNIT`. The
    /// largest intermediate is `255 * WEIGHT_SUM = 0xFFFF_0000`.
    #[inline(always)]
    #[must_use]
    pub const fn blend(self, prev: u8, next: u8) -> u16 {
        ((prev as u32 * self.prev + next as u32 * self.next) >> 16) as u16
    }
}

impl Default for InterpolationWeights {
    fn default() -> Self {
        Self::FULL_NEXT
    }
}
