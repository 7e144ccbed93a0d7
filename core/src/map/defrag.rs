use core::cmp::Ordering;

use super::HandleMap;

impl<T> HandleMap<T> {
    /// Reorder the dense array with a stable insertion sort, so that
    /// iteration visits values in the order given by `compare`
    ///
    /// Removals scramble the dense array, since the last value is moved into
    /// every hole. This restores a cache friendly order. The sort can be
    /// spread over many calls: each call moves at most `max_swaps` values by
    /// one position (`0` means no limit), and the map remembers whether there
    /// is more to do. Once a call runs to completion, later calls return
    /// immediately until the next insertion or removal.
    ///
    /// Every move patches the slots of the two values involved, so all
    /// handles stay valid.
    ///
    /// Returns the number of moves made. Each resumed call starts from the
    /// front, so it should be given the same `compare` as the previous ones.
    pub fn defragment<F>(&mut self, mut compare: F, max_swaps: usize) -> usize
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if !self.fragmented {
            return 0
        }

        let max_swaps = if max_swaps == 0 { usize::MAX } else { max_swaps };
        let mut swaps = 0;

        for i in 1..self.items.len() {
            let mut j = i;

            while j > 0 && compare(&self.items[j - 1], &self.items[j]) == Ordering::Greater {
                if swaps == max_swaps {
                    tracing::trace!(swaps, "paused defragmenting handle map");
                    return swaps
                }

                self.swap_dense(j - 1, j);
                swaps += 1;
                j -= 1;
            }
        }

        self.fragmented = false;
        tracing::debug!(swaps, len = self.items.len(), "defragmented handle map");

        swaps
    }

    /// [`defragment`](Self::defragment) using a key extraction function
    pub fn defragment_by_key<K, F>(&mut self, mut key: F, max_swaps: usize) -> usize
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.defragment(|a, b| key(a).cmp(&key(b)), max_swaps)
    }

    fn swap_dense(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.meta.swap(a, b);

        for index in [a, b] {
            let slot = &mut self.ids[usize::from(self.meta[index].dense_to_sparse)];
            *slot = slot.with_index(index as u16);
        }
    }
}

#[cfg(test)]
mod test {
    use crate::HandleMap;
    use std::vec::Vec;

    fn scrambled() -> (HandleMap<u32>, Vec<crate::Handle>) {
        let mut map = HandleMap::new(0, 0);
        let handles = map.emplace_items(6, || 0);
        for (value, &handle) in handles.iter().enumerate() {
            map[handle] = value as u32;
        }
        map.erase(handles[0]);
        map.erase(handles[2]);
        (map, handles)
    }

    #[test]
    fn sorts_and_keeps_handles() {
        let (mut map, handles) = scrambled();
        assert_eq!(map.items(), [5, 1, 4, 3]);

        let swaps = map.defragment(|a, b| a.cmp(b), 0);
        assert_eq!(swaps, 4);
        assert_eq!(map.items(), [1, 3, 4, 5]);
        assert!(!map.is_fragmented());

        for &index in &[1, 3, 4, 5] {
            assert_eq!(map[handles[index]], index as u32);
        }
        for (dense, meta) in map.meta().iter().enumerate() {
            assert_eq!(usize::from(map.ids()[usize::from(meta.dense_to_sparse)].index()), dense);
        }
    }

    #[test]
    fn bounded_and_resumable() {
        let (mut map, handles) = scrambled();

        let mut calls = 0;
        let mut total = 0;
        while map.is_fragmented() {
            let swaps = map.defragment_by_key(|&value| value, 1);
            assert!(swaps <= 1);
            total += swaps;
            calls += 1;
        }

        assert_eq!(total, 4);
        assert!(calls >= 4);
        assert_eq!(map.items(), [1, 3, 4, 5]);
        assert_eq!(map[handles[5]], 5);
    }

    #[test]
    fn only_after_mutation() {
        let (mut map, _) = scrambled();
        map.defragment(|a, b| a.cmp(b), 0);
        assert_eq!(map.defragment(|a, b| b.cmp(a), 0), 0);
        assert_eq!(map.items(), [1, 3, 4, 5]);

        map.insert(0);
        assert!(map.is_fragmented());
        assert_eq!(map.defragment(|a, b| a.cmp(b), 0), 4);
        assert_eq!(map.items(), [0, 1, 3, 4, 5]);
    }

    #[test]
    fn stable() {
        let mut map = HandleMap::new(0, 0);
        let a = map.insert((1, 'a'));
        let b = map.insert((0, 'b'));
        let c = map.insert((1, 'c'));

        map.defragment_by_key(|&(key, _)| key, 0);
        assert_eq!(map.items(), [(0, 'b'), (1, 'a'), (1, 'c')]);
        assert_eq!(map[a].1, 'a');
        assert_eq!(map[b].1, 'b');
        assert_eq!(map[c].1, 'c');
    }
}
