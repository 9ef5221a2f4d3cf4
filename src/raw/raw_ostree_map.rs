use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;

use super::arena::Arena;
use super::cursor::InOrder;
use super::handle::Handle;
use super::node::Node;
use super::size::Size;
use crate::watcher::{MapEntry, Watcher};

mod balance;

/// The AVL tree backing `OSTreeMap`.
pub(crate) struct RawOSTreeMap<K, V, W> {
    /// Arena storing every node of the tree.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Called after every status recomputation.
    watcher: W,
}

/// Where an insertion landed.
pub(crate) struct Placement<V> {
    /// The node now holding the inserted key.
    pub(crate) handle: Handle,
    /// The value the key held before, if it was already present.
    pub(crate) replaced: Option<V>,
}

impl<K, V, W> RawOSTreeMap<K, V, W> {
    pub(crate) const fn new(watcher: W) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            watcher,
        }
    }

    pub(crate) fn with_capacity(capacity: usize, watcher: W) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            watcher,
        }
    }

    /// Returns the number of entries; the root's subtree size.
    pub(crate) fn len(&self) -> usize {
        self.size(self.root)
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn root_entry(&self) -> Option<MapEntry<'_, K, V>> {
        self.root.map(|handle| MapEntry::new(&self.nodes, handle))
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    /// Mutable access to a node's value. Bypasses the watcher, so callers must
    /// either own an unwatched map or recompute afterwards.
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        self.nodes.get_mut(handle).value_mut()
    }

    pub(crate) fn watcher(&self) -> &W {
        &self.watcher
    }

    /// Swaps the watcher. Only sound while the tree is empty.
    pub(crate) fn replace_watcher(&mut self, watcher: W) -> W {
        debug_assert!(self.is_empty(), "watcher replaced on a populated tree");
        core::mem::replace(&mut self.watcher, watcher)
    }

    pub(crate) fn in_order(&self) -> InOrder<'_, K, V> {
        InOrder::new(&self.nodes, self.root)
    }

    /// Every entry in key order, values mutable. Unwatched callers only.
    pub(crate) fn entries_mut(&mut self) -> Vec<(&K, &mut V)> {
        let order: Vec<Handle> = InOrder::new(&self.nodes, self.root).collect();
        let mut slots = self.nodes.slots_mut();
        order
            .into_iter()
            .map(|handle| slots[handle.slot()].take().expect("in-order walk visited a slot twice").entry_mut())
            .collect()
    }

    #[inline]
    fn height(&self, node: Option<Handle>) -> u8 {
        node.map_or(0, |handle| self.nodes.get(handle).height())
    }

    #[inline]
    fn size(&self, node: Option<Handle>) -> usize {
        Size::of(node.map(|handle| self.nodes.get(handle).size()))
    }

    /// `height(right) - height(left)`.
    #[inline]
    fn factor(&self, handle: Handle) -> i8 {
        let node = self.nodes.get(handle);
        #[allow(clippy::cast_possible_wrap)]
        let factor = self.height(node.right()) as i8 - self.height(node.left()) as i8;
        factor
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left() {
            current = left;
        }
        Some(current)
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right() {
            current = right;
        }
        Some(current)
    }

    /// Finds the node at 1-based sorted position `position`.
    pub(crate) fn select(&self, position: usize) -> Option<Handle> {
        if position == 0 || position > self.len() {
            return None;
        }

        let mut current = self.root;
        let mut remaining = position;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let left_size = self.size(node.left());
            match remaining.cmp(&(left_size + 1)) {
                Ordering::Less => current = node.left(),
                Ordering::Equal => return Some(handle),
                Ordering::Greater => {
                    remaining -= left_size + 1;
                    current = node.right();
                }
            }
        }

        debug_assert!(false, "select: subtree sizes disagree with len {}", self.len());
        None
    }
}

impl<K: Ord, V, W> RawOSTreeMap<K, V, W> {
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Equal => return Some(handle),
                Ordering::Greater => current = node.right(),
            }
        }
        None
    }

    /// Number of keys `<= key`.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        let mut rank = 0;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Equal => return rank + self.size(node.left()) + 1,
                Ordering::Greater => {
                    rank += self.size(node.left()) + 1;
                    current = node.right();
                }
            }
        }
        rank
    }

    /// Single descent keeping the best node seen so far. `accept` says whether a
    /// node's key qualifies; qualifying keys lie on a prefix (`towards_right`) or a
    /// suffix of the key order, which decides the direction to keep searching.
    fn neighbor<Q, F>(&self, key: &Q, towards_right: bool, accept: F) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        F: Fn(Ordering) -> bool,
    {
        let mut best = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let qualifies = accept(key.cmp(node.key().borrow()).reverse());
            if qualifies {
                best = Some(handle);
            }
            current = if qualifies == towards_right { node.right() } else { node.left() };
        }
        best
    }

    /// Greatest key `< key`.
    pub(crate) fn lower<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(key, true, Ordering::is_lt)
    }

    /// Greatest key `<= key`.
    pub(crate) fn floor<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(key, true, Ordering::is_le)
    }

    /// Least key `> key`.
    pub(crate) fn higher<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(key, false, Ordering::is_gt)
    }

    /// Least key `>= key`.
    pub(crate) fn ceiling<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(key, false, Ordering::is_ge)
    }
}

impl<K: Ord, V, W: Watcher<K, V>> RawOSTreeMap<K, V, W> {
    /// Inserts or overwrites `key`.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Placement<V> {
        let (root, placement) = self.insert_at(self.root, key, value);
        self.root = Some(root);
        placement
    }

    /// Removes `key`, returning its entry if it was present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (root, removed) = self.remove_at(self.root, key);
        self.root = root;
        removed
    }

    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        let (root, first) = self.detach_min(self.root?);
        self.root = root;
        Some(self.release(first))
    }

    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        let (root, last) = self.detach_max(self.root?);
        self.root = root;
        Some(self.release(last))
    }

    /// Frees a detached node, telling the watcher its key is gone.
    fn release(&mut self, handle: Handle) -> (K, V) {
        let node = self.nodes.remove(handle);
        self.watcher.unlink(node.key());
        node.into_entry()
    }

    /// Edits every value in place, then recomputes every node bottom-up so the
    /// watcher observes the new values.
    pub(crate) fn update_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V),
    {
        for (key, value) in self.entries_mut() {
            f(key, value);
        }
        if let Some(root) = self.root {
            self.recompute_subtree(root);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.watcher.reset();
    }

    /// Moves every entry out in key order. O(n), no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len());
        let mut pending: Vec<Handle> = Vec::new();
        let mut current = self.root.take();

        loop {
            while let Some(handle) = current {
                pending.push(handle);
                current = self.nodes.get(handle).left();
            }
            let Some(handle) = pending.pop() else {
                break;
            };
            let node = self.nodes.remove(handle);
            current = node.right();
            entries.push(node.into_entry());
        }

        self.nodes.clear();
        self.watcher.reset();
        entries
    }
}
