use core::{iter::FusedIterator, slice};

use std::vec;

use super::{HandleMap, Meta};
use crate::Handle;

fn outer_handle(ids: &[Handle], meta: &Meta) -> Handle {
    let slot = meta.dense_to_sparse;
    ids[usize::from(slot)].with_index(slot)
}

impl<T> HandleMap<T> {
    /// An iterator of shared references to the values, in dense order
    pub fn iter(&self) -> slice::Iter<'_, T> { self.items.iter() }

    /// An iterator of unique references to the values, in dense order
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> { self.items.iter_mut() }

    /// An iterator over the handles of all values, in dense order
    pub fn handles(&self) -> Handles<'_> {
        Handles {
            meta: self.meta.iter(),
            ids: &self.ids,
        }
    }

    /// An iterator of handles and shared references to the values, in dense order
    pub fn entries(&self) -> Entries<'_, T> {
        Entries {
            handles: self.handles(),
            items: self.items.iter(),
        }
    }

    /// An iterator of handles and unique references to the values, in dense order
    pub fn entries_mut(&mut self) -> EntriesMut<'_, T> {
        EntriesMut {
            handles: Handles {
                meta: self.meta.iter(),
                ids: &self.ids,
            },
            items: self.items.iter_mut(),
        }
    }
}

/// Returned by [`HandleMap::handles`]
#[derive(Clone)]
pub struct Handles<'a> {
    meta: slice::Iter<'a, Meta>,
    ids: &'a [Handle],
}

impl Iterator for Handles<'_> {
    type Item = Handle;

    fn next(&mut self) -> Option<Self::Item> {
        let ids = self.ids;
        self.meta.next().map(|meta| outer_handle(ids, meta))
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.meta.size_hint() }
}

impl DoubleEndedIterator for Handles<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let ids = self.ids;
        self.meta.next_back().map(|meta| outer_handle(ids, meta))
    }
}

impl ExactSizeIterator for Handles<'_> {}
impl FusedIterator for Handles<'_> {}

/// Returned by [`HandleMap::entries`]
pub struct Entries<'a, T> {
    handles: Handles<'a>,
    items: slice::Iter<'a, T>,
}

/// Returned by [`HandleMap::entries_mut`]
pub struct EntriesMut<'a, T> {
    handles: Handles<'a>,
    items: slice::IterMut<'a, T>,
}

macro_rules! entries_impl {
    ($name:ident, $item:ty) => {
        impl<'a, T> Iterator for $name<'a, T> {
            type Item = (Handle, $item);

            fn next(&mut self) -> Option<Self::Item> { Some((self.handles.next()?, self.items.next()?)) }

            fn size_hint(&self) -> (usize, Option<usize>) { self.items.size_hint() }
        }

        impl<'a, T> DoubleEndedIterator for $name<'a, T> {
            fn next_back(&mut self) -> Option<Self::Item> { Some((self.handles.next_back()?, self.items.next_back()?)) }
        }

        impl<T> ExactSizeIterator for $name<'_, T> {}
        impl<T> FusedIterator for $name<'_, T> {}
    };
}

entries_impl!(Entries, &'a T);
entries_impl!(EntriesMut, &'a mut T);

impl<T> IntoIterator for HandleMap<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter { self.items.into_iter() }
}

impl<'a, T> IntoIterator for &'a HandleMap<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl<'a, T> IntoIterator for &'a mut HandleMap<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter { self.iter_mut() }
}
