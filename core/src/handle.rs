use core::fmt;

use crate::generation::Generation;

const INDEX_BITS: u32 = 16;
const GENERATION_SHIFT: u32 = INDEX_BITS;
const TYPE_ID_SHIFT: u32 = GENERATION_SHIFT + Generation::BITS;
const FREE_SHIFT: u32 = TYPE_ID_SHIFT + 1;

const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
const GENERATION_MASK: u32 = ((1 << Generation::BITS) - 1) << GENERATION_SHIFT;
const TYPE_ID_MASK: u32 = 1 << TYPE_ID_SHIFT;
const FREE_MASK: u32 = 1 << FREE_SHIFT;

/// A packed 32-bit handle
///
/// From the most significant bit down, a handle stores:
///
/// | bits   | field        |
/// |--------|--------------|
/// | 31     | `free`       |
/// | 30     | `type_id`    |
/// | 16..30 | `generation` |
/// | 0..16  | `index`      |
///
/// Handles compare and order by their raw value, so sorting handles sorts by
/// `free`, then `type_id`, then `generation`, then `index`.
///
/// The same type is used for two things:
///
/// * an *outer* handle, given out by [`HandleMap::insert`](crate::HandleMap::insert),
///   whose `index` is the position of its slot in the sparse array
/// * an *inner* id, stored in the sparse array, whose `index` is either the
///   position of the value in the dense array, or, if `free` is set, the
///   next slot of the free list
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Handle(u32);

impl Handle {
    /// The all-zero handle, which no [`HandleMap`](crate::HandleMap) ever considers valid
    pub const NULL: Self = Self(0);

    /// The largest value the `type_id` field can hold
    pub const MAX_TYPE_ID: u16 = 1;

    /// The largest value the `index` field can hold
    pub const MAX_INDEX: u16 = INDEX_MASK as u16;

    /// Create a new handle from its fields
    ///
    /// `type_id` is truncated to a single bit
    #[inline]
    pub const fn new(index: u16, generation: Generation, type_id: u16, free: bool) -> Self {
        Self(
            index as u32
                | (generation.get() as u32) << GENERATION_SHIFT
                | ((type_id as u32) & 1) << TYPE_ID_SHIFT
                | (free as u32) << FREE_SHIFT,
        )
    }

    /// Reinterpret a raw value as a handle
    #[inline]
    pub const fn from_raw(raw: u32) -> Self { Self(raw) }

    /// The raw value of this handle
    #[inline]
    pub const fn to_raw(self) -> u32 { self.0 }

    /// The `index` field
    #[inline]
    pub const fn index(self) -> u16 { (self.0 & INDEX_MASK) as u16 }

    /// The `generation` field
    #[inline]
    pub const fn generation(self) -> Generation { Generation::new(((self.0 & GENERATION_MASK) >> GENERATION_SHIFT) as u16) }

    /// The `type_id` field
    #[inline]
    pub const fn type_id(self) -> u16 { ((self.0 & TYPE_ID_MASK) >> TYPE_ID_SHIFT) as u16 }

    /// The `free` flag
    #[inline]
    pub const fn is_free(self) -> bool { self.0 & FREE_MASK != 0 }

    /// This handle with the `index` field replaced
    #[inline]
    #[must_use]
    pub const fn with_index(self, index: u16) -> Self { Self(self.0 & !INDEX_MASK | index as u32) }

    /// This handle with the `generation` field replaced
    #[inline]
    #[must_use]
    pub const fn with_generation(self, generation: Generation) -> Self {
        Self(self.0 & !GENERATION_MASK | (generation.get() as u32) << GENERATION_SHIFT)
    }

    /// This handle with the `free` flag replaced
    #[inline]
    #[must_use]
    pub const fn with_free(self, free: bool) -> Self { Self(self.0 & !FREE_MASK | (free as u32) << FREE_SHIFT) }
}

impl From<u32> for Handle {
    fn from(raw: u32) -> Self { Self::from_raw(raw) }
}

impl From<Handle> for u32 {
    fn from(handle: Handle) -> Self { handle.to_raw() }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.index())
            .field("generation", &self.generation().get())
            .field("type_id", &self.type_id())
            .field("free", &self.is_free())
            .finish()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())?;
        if self.type_id() != 0 {
            write!(f, "t{}", self.type_id())?;
        }
        if self.is_free() {
            f.write_str("(free)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fields() {
        let handle = Handle::new(0xBEEF, Generation::new(0x1234), 1, false);
        assert_eq!(handle.index(), 0xBEEF);
        assert_eq!(handle.generation().get(), 0x1234);
        assert_eq!(handle.type_id(), 1);
        assert!(!handle.is_free());
        assert_eq!(handle.to_raw(), 0x4000_0000 | 0x1234 << 16 | 0xBEEF);

        let free = handle.with_free(true);
        assert!(free.is_free());
        assert_eq!(free.with_free(false), handle);
    }

    #[test]
    fn setters_leave_other_fields_alone() {
        let handle = Handle::new(7, Generation::MAX, 1, true);
        let moved = handle.with_index(Handle::MAX_INDEX);
        assert_eq!(moved.index(), Handle::MAX_INDEX);
        assert_eq!(moved.generation(), Generation::MAX);
        assert_eq!(moved.type_id(), 1);
        assert!(moved.is_free());

        let bumped = handle.with_generation(Generation::FIRST);
        assert_eq!(bumped.index(), 7);
        assert_eq!(bumped.generation(), Generation::FIRST);
        assert_eq!(bumped.type_id(), 1);
        assert!(bumped.is_free());
    }

    #[test]
    fn ordering_priority() {
        let low = Handle::new(Handle::MAX_INDEX, Generation::MAX, 0, false);
        let typed = Handle::new(0, Generation::FIRST, 1, false);
        let free = Handle::new(0, Generation::FIRST, 0, true);
        assert!(low < typed);
        assert!(typed < free);

        let older = Handle::new(9, Generation::FIRST, 0, false);
        let newer = Handle::new(0, Generation::FIRST.next(), 0, false);
        assert!(older < newer);
    }

    #[test]
    fn type_id_is_one_bit() {
        assert_eq!(Handle::new(0, Generation::FIRST, 3, false).type_id(), 1);
    }

    #[test]
    fn raw_round_trip() {
        let handle = Handle::new(3, Generation::new(5), 1, false);
        assert_eq!(Handle::from(u32::from(handle)), handle);
        assert_eq!(Handle::NULL.to_raw(), 0);
    }
}
