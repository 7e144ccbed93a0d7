use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{Descriptor, DescriptorError, DescriptorTable, TableConfig};

/// A [`DescriptorTable`] that can be shared between threads
///
/// Cloning this type gives another reference to the same table. Every method
/// locks the table for the duration of the call. Use [`lock`](Self::lock)
/// to run several operations under one lock.
pub struct SharedDescriptorTable<R> {
    table: Arc<Mutex<DescriptorTable<R>>>,
}

impl<R> Clone for SharedDescriptorTable<R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<R> Default for SharedDescriptorTable<R> {
    fn default() -> Self { Self::new() }
}

impl<R> From<DescriptorTable<R>> for SharedDescriptorTable<R> {
    fn from(table: DescriptorTable<R>) -> Self {
        Self {
            table: Arc::new(Mutex::new(table)),
        }
    }
}

impl<R> SharedDescriptorTable<R> {
    /// Create an empty table with the default [`TableConfig`]
    pub fn new() -> Self { Self::from(DescriptorTable::new()) }

    /// Create an empty table
    #[track_caller]
    pub fn with_config(config: TableConfig) -> Self { Self::from(DescriptorTable::with_config(config)) }

    /// Lock the table
    pub fn lock(&self) -> MutexGuard<'_, DescriptorTable<R>> { self.table.lock() }

    /// see [`DescriptorTable::open`]
    pub fn open(&self, resource: R) -> Descriptor { self.lock().open(resource) }

    /// see [`DescriptorTable::close`]
    pub fn close(&self, descriptor: Descriptor) -> Result<R, DescriptorError> { self.lock().close(descriptor) }

    /// see [`DescriptorTable::with`]
    pub fn with<U, F: FnOnce(&mut R) -> U>(&self, descriptor: Descriptor, f: F) -> Result<U, DescriptorError> {
        self.lock().with(descriptor, f)
    }

    /// see [`DescriptorTable::is_open`]
    pub fn is_open(&self, descriptor: Descriptor) -> bool { self.lock().is_open(descriptor) }

    /// see [`DescriptorTable::len`]
    pub fn len(&self) -> usize { self.lock().len() }

    /// see [`DescriptorTable::is_empty`]
    pub fn is_empty(&self) -> bool { self.lock().is_empty() }
}

impl<R: std::fmt::Debug> std::fmt::Debug for SharedDescriptorTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDescriptorTable")
            .field("table", &self.table)
            .finish()
    }
}
