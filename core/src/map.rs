//! Handle Maps - Fast Access, Super-Fast Iteration, Fast Mutation
//!
//! A handle map stores all of it's values in a `Vec<_>`, with no holes, and
//! hands out [`Handle`]s that point into a separate sparse array of slots.
//! Accessing a value goes through the slot, so there is one extra
//! indirection, but iterating over the values is just iterating over a slice.
//!
//! Removing a value swaps the last value into its place, then patches the
//! slot of the moved value. To make that possible, every value has a
//! [`Meta`] record that points back at its slot.
//!
//! Slots that don't hold a value form a FIFO linked-list that is threaded
//! through the `index` field of the slots themselves. Removal pushes to the
//! back of the list, insertion pops from the front, so slots are reused in
//! the order they were freed. Each slot is versioned by a [`Generation`],
//! which is advanced on every removal.

use core::{
    borrow::Borrow,
    fmt,
    ops::{Index, IndexMut},
};

use std::vec::Vec;

use crate::{Generation, Handle, InvalidHandle};

mod defrag;
mod iter;

pub use iter::{Entries, EntriesMut, Handles};

/// The sentinel `index` that terminates the free list
///
/// A map never grows past this many slots, so the sentinel can never be
/// mistaken for a slot or a dense index.
pub const FREE_LIST_END: u16 = u16::MAX;

/// Metadata stored alongside every value in the dense array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Meta {
    /// The index of the slot in the sparse array that points at this value
    pub dense_to_sparse: u16,
}

/// A dense slot map
///
/// See the [module level docs](self) for details on the layout.
#[derive(Clone)]
pub struct HandleMap<T> {
    items: Vec<T>,
    meta: Vec<Meta>,
    ids: Vec<Handle>,
    free_front: u16,
    free_back: u16,
    type_id: u16,
    fragmented: bool,
}

impl<T> HandleMap<T> {
    /// Create a new map that stamps `type_id` into all of it's handles, with
    /// space reserved for `reserve_count` values
    ///
    /// # Panics
    ///
    /// If `type_id` is larger than [`Handle::MAX_TYPE_ID`]
    #[track_caller]
    pub fn new(type_id: u16, reserve_count: usize) -> Self {
        assert!(
            type_id <= Handle::MAX_TYPE_ID,
            "`type_id` must fit in a `Handle`, but got {}",
            type_id
        );

        Self {
            items: Vec::with_capacity(reserve_count),
            meta: Vec::with_capacity(reserve_count),
            ids: Vec::with_capacity(reserve_count),
            free_front: FREE_LIST_END,
            free_back: FREE_LIST_END,
            type_id,
            fragmented: false,
        }
    }

    /// The `type_id` stamped into every handle of this map
    pub fn type_id(&self) -> u16 { self.type_id }

    /// Returns true if the map is empty
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Returns the number of values in this map
    pub fn len(&self) -> usize { self.items.len() }

    /// Returns the number of slots in this map, both occupied and free
    pub fn slots(&self) -> usize { self.ids.len() }

    /// Returns the capacity of the dense array
    pub fn capacity(&self) -> usize { self.items.capacity() }

    /// Reserves capacity for at least `additional` more values
    pub fn reserve(&mut self, additional: usize) {
        let free = self.ids.len() - self.items.len();
        self.items.reserve(additional);
        self.meta.reserve(additional);
        self.ids.reserve(additional.saturating_sub(free));
    }

    /// Returns true if the map was changed by an insertion or a removal
    /// since the last complete [`defragment`](Self::defragment)
    pub fn is_fragmented(&self) -> bool { self.fragmented }

    /// The first slot of the free list, or `None` if the list is empty
    pub fn free_list_front(&self) -> Option<u16> { Some(self.free_front).filter(|&front| front != FREE_LIST_END) }

    /// The last slot of the free list, or `None` if the list is empty
    pub fn free_list_back(&self) -> Option<u16> { Some(self.free_back).filter(|&back| back != FREE_LIST_END) }

    /// The dense array of values
    pub fn items(&self) -> &[T] { &self.items }

    /// The dense array of values
    ///
    /// Values can be changed through this slice, but not inserted or removed.
    pub fn items_mut(&mut self) -> &mut [T] { &mut self.items }

    /// The dense array of metadata, parallel to [`items`](Self::items)
    pub fn meta(&self) -> &[Meta] { &self.meta }

    /// The dense array of metadata, parallel to [`items`](Self::items)
    ///
    /// Writing a different back-pointer here will corrupt the map.
    pub fn meta_mut(&mut self) -> &mut [Meta] { &mut self.meta }

    /// The sparse array of slots
    pub fn ids(&self) -> &[Handle] { &self.ids }

    /// The sparse array of slots
    ///
    /// Writing to the slots here will corrupt the map.
    pub fn ids_mut(&mut self) -> &mut [Handle] { &mut self.ids }
}

#[cold]
#[inline(never)]
#[track_caller]
fn invalid_handle(err: InvalidHandle) -> ! {
    panic!("Tried to access a `HandleMap` with an invalid `Handle`: {}", err)
}

#[cold]
#[inline(never)]
#[track_caller]
fn slots_exhausted() -> ! {
    panic!(
        "Could not insert into a `HandleMap`: all {} slots are occupied",
        FREE_LIST_END
    )
}

cfg_if::cfg_if! {
    if #[cfg(all(feature = "unchecked", not(debug_assertions)))] {
        #[inline]
        #[track_caller]
        fn checked_index<T>(map: &HandleMap<T>, handle: Handle) -> usize {
            usize::from(map.ids[usize::from(handle.index())].index())
        }
    } else {
        #[inline]
        #[track_caller]
        fn checked_index<T>(map: &HandleMap<T>, handle: Handle) -> usize {
            match map.validate(handle) {
                Ok(index) => index,
                Err(err) => invalid_handle(err),
            }
        }
    }
}

impl<T> HandleMap<T> {
    /// Insert a value in the map, returning the handle assigned to the value.
    ///
    /// The oldest free slot is reused if there is one, otherwise a new slot
    /// is grown.
    ///
    /// # Panics
    ///
    /// If all `0xFFFF` slots are occupied
    #[track_caller]
    pub fn insert(&mut self, value: T) -> Handle {
        let dense = self.items.len() as u16;

        let handle = if self.free_front == FREE_LIST_END {
            let index = self.ids.len();

            if index >= usize::from(FREE_LIST_END) {
                slots_exhausted()
            }

            let inner = Handle::new(dense, Generation::FIRST, self.type_id, false);
            self.ids.push(inner);
            inner.with_index(index as u16)
        } else {
            let index = self.free_front;
            let slot = &mut self.ids[usize::from(index)];

            // a free slot's index is the next free slot
            self.free_front = slot.index();
            if self.free_front == FREE_LIST_END {
                self.free_back = FREE_LIST_END;
            }

            *slot = slot.with_free(false).with_index(dense);
            slot.with_index(index)
        };

        self.fragmented = true;
        self.items.push(value);
        self.meta.push(Meta {
            dense_to_sparse: handle.index(),
        });

        handle
    }

    /// Insert `n` values produced by `f`, returning their handles in order
    pub fn emplace_items<F: FnMut() -> T>(&mut self, n: usize, mut f: F) -> Vec<Handle> {
        self.reserve(n);
        (0..n).map(|_| self.insert(f())).collect()
    }

    /// Check `handle` against this map, and return the position of it's value
    /// in the dense array
    ///
    /// The checks run in this order: the slot index is in range, the `type_id`
    /// matches, the generation matches, the slot points at a live value.
    pub fn validate(&self, handle: Handle) -> Result<usize, InvalidHandle> {
        let inner = match self.ids.get(usize::from(handle.index())) {
            Some(&inner) => inner,
            None => {
                return Err(InvalidHandle::IndexOutOfRange {
                    index: handle.index(),
                    slots: self.ids.len(),
                })
            }
        };

        if handle.type_id() != self.type_id {
            return Err(InvalidHandle::TypeMismatch {
                expected: self.type_id,
                found: handle.type_id(),
            })
        }

        if handle.is_free() || inner.is_free() || handle.generation() != inner.generation() {
            return Err(InvalidHandle::StaleGeneration {
                expected: inner.generation(),
                found: handle.generation(),
            })
        }

        let index = usize::from(inner.index());

        if index >= self.items.len() {
            return Err(InvalidHandle::DenseIndexOutOfRange {
                index: inner.index(),
                len: self.items.len(),
            })
        }

        Ok(index)
    }

    /// Return true if a value is associated with the given handle.
    pub fn is_valid(&self, handle: Handle) -> bool { self.validate(handle).is_ok() }

    /// The position of the value associated with `handle` in the dense array
    ///
    /// # Panics
    ///
    /// If `handle` is not valid, see [`at`](Self::at)
    #[track_caller]
    pub fn inner_index(&self, handle: Handle) -> usize { checked_index(self, handle) }

    /// Return a shared reference to the value associated with the given handle.
    ///
    /// # Panics
    ///
    /// If `handle` is not associated with a value, with a message that names
    /// the failed check. With the `unchecked` feature in a release build, only
    /// the slot and dense indices are bounds checked, and a stale handle may
    /// silently return an unrelated value. Use [`get`](Self::get) or
    /// [`is_valid`](Self::is_valid) when that matters.
    #[track_caller]
    pub fn at(&self, handle: Handle) -> &T {
        let index = checked_index(self, handle);
        &self.items[index]
    }

    /// Return a unique reference to the value associated with the given handle.
    ///
    /// # Panics
    ///
    /// see [`at`](Self::at)
    #[track_caller]
    pub fn at_mut(&mut self, handle: Handle) -> &mut T {
        let index = checked_index(self, handle);
        &mut self.items[index]
    }

    /// Return a shared reference to the value associated with the given handle.
    ///
    /// If the given handle is not associated with a value, then None is returned.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let index = self.validate(handle).ok()?;
        self.items.get(index)
    }

    /// Return a unique reference to the value associated with the given handle.
    ///
    /// If the given handle is not associated with a value, then None is returned.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let index = self.validate(handle).ok()?;
        self.items.get_mut(index)
    }

    /// The handle of the value at position `index` of the dense array
    pub fn handle_of(&self, index: usize) -> Option<Handle> {
        let slot = self.meta.get(index)?.dense_to_sparse;
        Some(self.ids[usize::from(slot)].with_index(slot))
    }

    /// Find the handle of the first value that is equal to `value`
    ///
    /// This is a linear scan over the dense array.
    pub fn find(&self, value: &T) -> Option<Handle>
    where
        T: PartialEq,
    {
        let index = self.items.iter().position(|item| item == value)?;
        self.handle_of(index)
    }

    /// Remove and return the value associated with the given handle.
    ///
    /// The slot is pushed onto the back of the free list with it's generation
    /// advanced, so `handle` (and every copy of it) goes stale.
    ///
    /// Returns `None` if handle is not associated with a value.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let dense = self.validate(handle).ok()?;
        let index = handle.index();

        let slot = &mut self.ids[usize::from(index)];
        *slot = slot
            .with_free(true)
            .with_generation(slot.generation().next())
            .with_index(FREE_LIST_END);

        if self.free_front == FREE_LIST_END {
            self.free_front = index;
        } else {
            let back = &mut self.ids[usize::from(self.free_back)];
            *back = back.with_index(index);
        }
        self.free_back = index;

        let value = self.items.swap_remove(dense);
        self.meta.swap_remove(dense);

        // if the last value wasn't removed, it now lives at `dense`
        if let Some(moved) = self.meta.get(dense) {
            let slot = &mut self.ids[usize::from(moved.dense_to_sparse)];
            debug_assert_eq!(usize::from(slot.index()), self.items.len());
            *slot = slot.with_index(dense as u16);
        }

        debug_assert_eq!(self.items.len(), self.meta.len());
        self.fragmented = true;

        Some(value)
    }

    /// Remove the value associated with the given handle.
    ///
    /// Returns the number of values removed, 0 or 1.
    pub fn erase(&mut self, handle: Handle) -> usize {
        match self.remove(handle) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Remove all of the values associated with `handles`, one after another
    ///
    /// Returns the number of values removed. Stale or repeated handles are
    /// skipped.
    pub fn erase_items<I>(&mut self, handles: I) -> usize
    where
        I: IntoIterator,
        I::Item: Borrow<Handle>,
    {
        handles.into_iter().map(|handle| self.erase(*handle.borrow())).sum()
    }

    /// Remove all values, keeping every slot
    ///
    /// Every slot is freed with it's generation advanced, and the free list is
    /// rebuilt in slot order. All handles issued before the `clear` are
    /// reliably detected as stale afterwards. This is `O(slots)`, see
    /// [`reset`](Self::reset) for the constant time version.
    pub fn clear(&mut self) {
        self.items.clear();
        self.meta.clear();
        self.fragmented = false;

        let slots = self.ids.len();

        if slots == 0 {
            return
        }

        for (index, slot) in self.ids.iter_mut().enumerate() {
            *slot = slot
                .with_free(true)
                .with_generation(slot.generation().next())
                .with_index(index as u16 + 1);
        }

        let last = slots - 1;
        self.ids[last] = self.ids[last].with_index(FREE_LIST_END);
        self.free_front = 0;
        self.free_back = last as u16;

        tracing::trace!(slots, "cleared handle map");
    }

    /// Remove all values and all slots, keeping the allocations
    ///
    /// This is constant time (aside from dropping the values), but slot
    /// indices start over from zero, so a handle issued before the `reset`
    /// may become valid again once new values are inserted. Use
    /// [`clear`](Self::clear) if stale handles may still be around.
    pub fn reset(&mut self) {
        let slots = self.ids.len();

        self.items.clear();
        self.meta.clear();
        self.ids.clear();
        self.free_front = FREE_LIST_END;
        self.free_back = FREE_LIST_END;
        self.fragmented = false;

        tracing::trace!(slots, "reset handle map");
    }
}

impl<T> Index<Handle> for HandleMap<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, handle: Handle) -> &Self::Output { self.at(handle) }
}

impl<T> IndexMut<Handle> for HandleMap<T> {
    #[track_caller]
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output { self.at_mut(handle) }
}

impl<T> Extend<T> for HandleMap<T> {
    fn extend<Iter: IntoIterator<Item = T>>(&mut self, iter: Iter) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        iter.for_each(move |value| {
            self.insert(value);
        });
    }
}

impl<T: fmt::Debug> fmt::Debug for HandleMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleMap")
            .field("type_id", &self.type_id)
            .field("items", &self.items)
            .field("ids", &self.ids)
            .field("free_list", &(self.free_list_front(), self.free_list_back()))
            .finish()
    }
}
