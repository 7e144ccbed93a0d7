use std::{error::Error, fmt};

use handle_map_core::{Handle, InvalidHandle};

use crate::Descriptor;

/// The reason a descriptor was rejected by a [`DescriptorTable`](crate::DescriptorTable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorError {
    /// The raw value `0`, which is never handed out
    Null,
    /// The descriptor belongs to a table with a different `type_id`
    Foreign {
        /// the rejected descriptor
        descriptor: Descriptor,
        /// why it was rejected
        source: InvalidHandle,
    },
    /// The descriptor was closed, or was never opened in this table
    Closed {
        /// the rejected descriptor
        descriptor: Descriptor,
        /// why it was rejected
        source: InvalidHandle,
    },
}

impl DescriptorError {
    pub(crate) fn new(descriptor: Descriptor, source: InvalidHandle) -> Self {
        match source {
            InvalidHandle::TypeMismatch { .. } => Self::Foreign { descriptor, source },
            _ => Self::Closed { descriptor, source },
        }
    }

    /// The rejected descriptor, if it was not null
    pub fn descriptor(&self) -> Option<Descriptor> {
        match *self {
            Self::Null => None,
            Self::Foreign { descriptor, .. } | Self::Closed { descriptor, .. } => Some(descriptor),
        }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("the null descriptor is never open"),
            Self::Foreign { descriptor, .. } => write!(f, "descriptor {} belongs to a different table", descriptor),
            Self::Closed { descriptor, .. } => write!(f, "descriptor {} is not open", descriptor),
        }
    }
}

impl Error for DescriptorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Null => None,
            Self::Foreign { source, .. } | Self::Closed { source, .. } => Some(source),
        }
    }
}

/// A [`TableConfig`](crate::TableConfig) whose `type_id` does not fit in a [`Handle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTypeId {
    /// the rejected `type_id`
    pub type_id: u16,
}

impl fmt::Display for InvalidTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`type_id` must be at most {}, but got {}",
            Handle::MAX_TYPE_ID,
            self.type_id
        )
    }
}

impl Error for InvalidTypeId {}
