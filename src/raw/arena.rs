use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes.
///
/// Released slots are recycled through a free list, so handles held by live
/// nodes never move while the tree rebalances around them.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.vacant.len())
    }

    pub(crate) fn insert(&mut self, element: T) -> Handle {
        if let Some(handle) = self.vacant.pop() {
            self.slots[handle.slot()] = Some(element);
            return handle;
        }

        assert!(
            self.slots.len() <= Handle::MAX,
            "`Arena::insert()` - arena is at maximum capacity ({})",
            Handle::MAX + 1
        );
        self.slots.push(Some(element));
        Handle::from_slot(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.slot()].as_ref().expect("`Arena::get()` - `handle` is vacant!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.slot()].as_mut().expect("`Arena::get_mut()` - `handle` is vacant!")
    }

    /// Splits the storage into disjoint mutable borrows, indexed by slot.
    pub(crate) fn slots_mut(&mut self) -> Vec<Option<&mut T>> {
        self.slots.iter_mut().map(Option::as_mut).collect()
    }

    pub(crate) fn remove(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.slot()].take().expect("`Arena::remove()` - `handle` is vacant!");
        self.vacant.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn with_capacity_reserves_slots() {
        let arena: Arena<u8> = Arena::with_capacity(12);
        assert!(arena.capacity() >= 12);
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn removed_slot_is_reused() {
        let mut arena = Arena::new();
        let a = arena.insert('a');
        let _b = arena.insert('b');
        assert_eq!(arena.remove(a), 'a');
        let c = arena.insert('c');
        assert_eq!(a, c);
        assert_eq!(*arena.get(c), 'c');
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "`Arena::get()` - `handle` is vacant!")]
    fn vacant_handle_panics() {
        let mut arena = Arena::new();
        let handle = arena.insert(1u8);
        arena.remove(handle);
        let _ = arena.get(handle);
    }

    proptest! {
        #[test]
        fn arena_tracks_a_model(steps in prop::collection::vec(step_strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for step in steps {
                match step {
                    Step::Insert(value) => {
                        let handle = arena.insert(value);
                        model.push((handle, value));
                    }
                    Step::Overwrite(which, value) if !model.is_empty() => {
                        let index = which % model.len();
                        *arena.get_mut(model[index].0) = value;
                        model[index].1 = value;
                    }
                    Step::Remove(which) if !model.is_empty() => {
                        let index = which % model.len();
                        let (handle, value) = model.swap_remove(index);
                        prop_assert_eq!(arena.remove(handle), value);
                    }
                    Step::Clear => {
                        arena.clear();
                        model.clear();
                    }
                    _ => {}
                }

                prop_assert_eq!(arena.len(), model.len());
                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Step {
        Insert(u32),
        Overwrite(usize, u32),
        Remove(usize),
        Clear,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            20 => any::<u32>().prop_map(Step::Insert),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Step::Overwrite(which, value)),
            8 => any::<usize>().prop_map(Step::Remove),
            1 => Just(Step::Clear),
        ]
    }
}
