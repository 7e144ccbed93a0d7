//! The generation counter stored in every slot, see [`Generation`] for details

/// A 14-bit generation counter
///
/// Every slot of a [`HandleMap`](crate::HandleMap) carries a generation, and
/// every [`Handle`](crate::Handle) carries the generation of the slot at the
/// time it was minted. A handle is only valid while the two agree. Freeing a
/// slot advances its generation, so every handle that was issued for the old
/// value goes stale.
///
/// # Wraparound
///
/// There are only 14 bits to work with, so a slot that gets freed 16383 times
/// will cycle back to a generation that it has used before. Generation `0` is
/// skipped when wrapping, so a zeroed handle ([`Handle::NULL`](crate::Handle::NULL))
/// can never validate.
///
/// Free slots are reused in the order they were freed (FIFO), so the
/// wraparound of one slot needs 16383 reuses *of that slot*, which in turn
/// needs the whole free list to cycle that many times.
///
/// # ABA problem
///
/// [Wikipedia](https://en.wikipedia.org/wiki/ABA_problem)
///
/// Once a slot's generation wraps around, a handle that was stale can become
/// valid again, and will then refer to whatever value lives in the slot now.
/// This is the price of fitting a handle into 32 bits. If you need to hold on
/// to handles for that long, check them against something stored inside the
/// value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u16", into = "u16"))]
pub struct Generation(u16);

impl Generation {
    /// The number of bits a generation occupies inside a handle
    pub const BITS: u32 = 14;

    /// The largest representable generation
    pub const MAX: Self = Self((1 << Self::BITS) - 1);

    /// The generation of a freshly grown slot
    pub const FIRST: Self = Self(1);

    /// Create a generation, truncating `value` to 14 bits
    #[inline]
    pub const fn new(value: u16) -> Self { Self(value & Self::MAX.0) }

    /// The numeric value of this generation
    #[inline]
    pub const fn get(self) -> u16 { self.0 }

    /// The generation that follows this one
    ///
    /// Wraps from [`Generation::MAX`] to [`Generation::FIRST`], never to zero
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        if self.0 >= Self::MAX.0 {
            Self::FIRST
        } else {
            Self(self.0 + 1)
        }
    }
}

impl Default for Generation {
    fn default() -> Self { Self::FIRST }
}

impl From<u16> for Generation {
    fn from(value: u16) -> Self { Self::new(value) }
}

impl From<Generation> for u16 {
    fn from(generation: Generation) -> Self { generation.get() }
}

impl core::fmt::Display for Generation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result { core::fmt::Display::fmt(&self.0, f) }
}
