#![forbid(missing_docs, unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Integer descriptor tables backed by a [`HandleMap`]
//!
//! A [`DescriptorTable`] hands out the raw 32-bit value of a [`Handle`] as a
//! flat integer [`Descriptor`], the way an OS hands out file descriptors, and
//! turns it back into a handle on every access. Because the handle carries a
//! generation, a descriptor that was closed is rejected even after its slot
//! was reused by a newer resource.
//!
//! There is no global table. Create one for whatever owns the resources
//! (a session, an interpreter, a connection) and pass it around.
//!
//! ```
//! use handle_map_fd::{DescriptorError, DescriptorTable};
//!
//! let mut table = DescriptorTable::new();
//! let fd = table.open(String::from("stdout"));
//! assert_eq!(table.get(fd).map(String::as_str), Ok("stdout"));
//!
//! assert_eq!(table.close(fd).as_deref(), Ok("stdout"));
//! assert!(matches!(table.close(fd), Err(DescriptorError::Closed { .. })));
//! ```
//!
//! # Features
//!
//! `shared` (default) - [`SharedDescriptorTable`], a table behind a `parking_lot` mutex
//!
//! `serde` - `Serialize`/`Deserialize` for [`Descriptor`] and [`TableConfig`]
//!
//! `unchecked` - forwards to `handle-map-core/unchecked`

use std::{fmt, num::NonZeroU32};

pub use handle_map_core::{Handle, HandleMap, InvalidHandle};

mod error;
#[cfg(feature = "shared")]
#[cfg_attr(docsrs, doc(cfg(feature = "shared")))]
mod shared;

pub use error::{DescriptorError, InvalidTypeId};
#[cfg(feature = "shared")]
#[cfg_attr(docsrs, doc(cfg(feature = "shared")))]
pub use shared::SharedDescriptorTable;

/// The raw value of a [`Handle`], handed out as a flat integer
///
/// Handles minted by a [`HandleMap`] start at generation 1, so a descriptor
/// is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Descriptor(NonZeroU32);

impl Descriptor {
    /// Reinterpret a raw integer as a descriptor, `None` for zero
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// The raw integer
    pub const fn get(self) -> u32 { self.0.get() }

    /// The handle this descriptor stands for
    pub const fn handle(self) -> Handle { Handle::from_raw(self.0.get()) }

    fn from_handle(handle: Handle) -> Self {
        match Self::from_raw(handle.to_raw()) {
            Some(descriptor) => descriptor,
            None => unreachable!("a `HandleMap` never hands out the null handle"),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}

impl From<Descriptor> for u32 {
    fn from(descriptor: Descriptor) -> Self { descriptor.get() }
}

/// How to build a [`DescriptorTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTableConfig"))]
pub struct TableConfig {
    /// The `type_id` stamped into every descriptor, either 0 or 1
    pub type_id: u16,
    /// The number of resources to reserve space for
    pub reserve: usize,
}

impl Default for TableConfig {
    fn default() -> Self { Self { type_id: 1, reserve: 32 } }
}

impl TableConfig {
    /// Check that `type_id` fits in a [`Handle`]
    pub fn validate(self) -> Result<Self, InvalidTypeId> {
        if self.type_id > Handle::MAX_TYPE_ID {
            Err(InvalidTypeId { type_id: self.type_id })
        } else {
            Ok(self)
        }
    }
}

// missing fields take their default, and the result goes through `validate`
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct RawTableConfig {
    type_id: u16,
    reserve: usize,
}

#[cfg(feature = "serde")]
impl Default for RawTableConfig {
    fn default() -> Self {
        let TableConfig { type_id, reserve } = TableConfig::default();
        Self { type_id, reserve }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawTableConfig> for TableConfig {
    type Error = InvalidTypeId;

    fn try_from(RawTableConfig { type_id, reserve }: RawTableConfig) -> Result<Self, Self::Error> {
        Self { type_id, reserve }.validate()
    }
}

/// A table of open resources, addressed by [`Descriptor`]
#[derive(Debug, Clone)]
pub struct DescriptorTable<R> {
    handles: HandleMap<R>,
}

impl<R> Default for DescriptorTable<R> {
    fn default() -> Self { Self::new() }
}

impl<R> DescriptorTable<R> {
    /// Create an empty table with the default [`TableConfig`]
    pub fn new() -> Self { Self::with_config(TableConfig::default()) }

    /// Create an empty table
    ///
    /// # Panics
    ///
    /// If `config.type_id` is larger than 1, see [`try_with_config`](Self::try_with_config)
    #[track_caller]
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            handles: HandleMap::new(config.type_id, config.reserve),
        }
    }

    /// Create an empty table, or report a `type_id` that does not fit in a [`Handle`]
    pub fn try_with_config(config: TableConfig) -> Result<Self, InvalidTypeId> {
        config.validate().map(Self::with_config)
    }

    /// The handle map backing this table
    pub fn handles(&self) -> &HandleMap<R> { &self.handles }

    /// Returns the number of open resources
    pub fn len(&self) -> usize { self.handles.len() }

    /// Returns true if no resources are open
    pub fn is_empty(&self) -> bool { self.handles.is_empty() }

    /// Register a resource and return its descriptor
    pub fn open(&mut self, resource: R) -> Descriptor {
        let descriptor = Descriptor::from_handle(self.handles.insert(resource));
        tracing::debug!(%descriptor, open = self.handles.len(), "opened descriptor");
        descriptor
    }

    /// The descriptor of `resource` if it is already registered, otherwise
    /// register it
    pub fn fileno(&mut self, resource: R) -> Descriptor
    where
        R: PartialEq,
    {
        match self.descriptor_of(&resource) {
            Some(descriptor) => descriptor,
            None => self.open(resource),
        }
    }

    /// The descriptor of the first open resource equal to `resource`
    pub fn descriptor_of(&self, resource: &R) -> Option<Descriptor>
    where
        R: PartialEq,
    {
        self.handles.find(resource).map(Descriptor::from_handle)
    }

    /// Returns true if `descriptor` refers to an open resource
    pub fn is_open(&self, descriptor: Descriptor) -> bool { self.handles.is_valid(descriptor.handle()) }

    fn check(&self, descriptor: Descriptor) -> Result<usize, DescriptorError> {
        self.handles.validate(descriptor.handle()).map_err(|err| {
            let err = DescriptorError::new(descriptor, err);
            match err {
                // a descriptor from another table is a bug in the caller
                DescriptorError::Foreign { source, .. } => {
                    tracing::warn!(%descriptor, error = %source, "rejected foreign descriptor")
                }
                _ => tracing::debug!(%descriptor, error = %err, "rejected descriptor"),
            }
            err
        })
    }

    /// Look up a raw integer descriptor
    pub fn lookup(&self, raw: u32) -> Result<&R, DescriptorError> {
        let descriptor = Descriptor::from_raw(raw).ok_or(DescriptorError::Null)?;
        self.get(descriptor)
    }

    /// A shared reference to the resource behind `descriptor`
    pub fn get(&self, descriptor: Descriptor) -> Result<&R, DescriptorError> {
        let index = self.check(descriptor)?;
        Ok(&self.handles.items()[index])
    }

    /// A unique reference to the resource behind `descriptor`
    pub fn get_mut(&mut self, descriptor: Descriptor) -> Result<&mut R, DescriptorError> {
        let index = self.check(descriptor)?;
        Ok(&mut self.handles.items_mut()[index])
    }

    /// Run `f` on the resource behind `descriptor`
    pub fn with<U, F: FnOnce(&mut R) -> U>(&mut self, descriptor: Descriptor, f: F) -> Result<U, DescriptorError> {
        self.get_mut(descriptor).map(f)
    }

    /// Unregister the resource behind `descriptor` and give it back
    ///
    /// The descriptor is stale from then on, even once its slot is reused.
    pub fn close(&mut self, descriptor: Descriptor) -> Result<R, DescriptorError> {
        self.check(descriptor)?;

        match self.handles.remove(descriptor.handle()) {
            Some(resource) => {
                tracing::debug!(%descriptor, open = self.handles.len(), "closed descriptor");
                Ok(resource)
            }
            None => unreachable!("descriptor {} was checked before removal", descriptor),
        }
    }

    /// Unregister every resource, returning how many there were
    ///
    /// Every descriptor handed out so far is stale afterwards.
    pub fn close_all(&mut self) -> usize {
        let closed = self.handles.len();
        self.handles.clear();
        tracing::debug!(closed, "closed all descriptors");
        closed
    }

    /// The descriptors of all open resources, in no particular order
    pub fn descriptors(&self) -> impl '_ + ExactSizeIterator<Item = Descriptor> {
        self.handles.handles().map(Descriptor::from_handle)
    }

    /// The descriptors and resources of all open resources, in no particular order
    pub fn iter(&self) -> impl '_ + ExactSizeIterator<Item = (Descriptor, &R)> {
        self.handles
            .entries()
            .map(|(handle, resource)| (Descriptor::from_handle(handle), resource))
    }
}
