use core::fmt;

use crate::generation::Generation;

/// The reason a [`Handle`](crate::Handle) was rejected by a [`HandleMap`](crate::HandleMap)
///
/// The variants are listed in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidHandle {
    /// The handle points past the end of the sparse slot array
    IndexOutOfRange {
        /// the `index` field of the handle
        index: u16,
        /// the number of slots in the map
        slots: usize,
    },
    /// The handle was minted by a map with a different `type_id`
    TypeMismatch {
        /// the map's `type_id`
        expected: u16,
        /// the handle's `type_id`
        found: u16,
    },
    /// The slot has been freed since the handle was minted
    StaleGeneration {
        /// the slot's current generation
        expected: Generation,
        /// the handle's generation
        found: Generation,
    },
    /// The slot does not point at a live value
    DenseIndexOutOfRange {
        /// the dense index stored in the slot
        index: u16,
        /// the number of live values
        len: usize,
    },
}

impl fmt::Display for InvalidHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::IndexOutOfRange { index, slots } => {
                write!(f, "outer index out of range: the index is {} but there are {} slots", index, slots)
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "type_id mismatch: expected {} but found {}", expected, found)
            }
            Self::StaleGeneration { expected, found } => write!(
                f,
                "stale handle: the slot is at generation {} but the handle has generation {}",
                expected, found
            ),
            Self::DenseIndexOutOfRange { index, len } => {
                write!(f, "inner index out of range: the index is {} but the len is {}", index, len)
            }
        }
    }
}

impl core::error::Error for InvalidHandle {}
