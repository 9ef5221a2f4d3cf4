use core::borrow::Borrow;
use core::hash::Hash;

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use crate::watcher::{MapEntry, Watcher};

/// Subtree multiplicity totals for an `OSTreeMap<T, usize>`.
///
/// For every node the index stores `count(node) + total(left) + total(right)`,
/// keyed by the node's key. Rows are rewritten bottom-up as the tree is
/// recomputed, dropped when their key leaves the map and cleared on reset, so the
/// index always describes the current tree shape. Rows live in a hash table, so
/// reading the total of any live subtree is O(1) expected.
///
/// The counts of the watched map must sum to at most `usize::MAX`; a recompute
/// that would overflow panics. [`OSMultiSet`](crate::OSMultiSet) rejects such
/// updates before touching its map.
///
/// This is the watcher behind [`OSMultiSet`](crate::OSMultiSet), but it works with any
/// map of counts:
///
/// ```
/// use avl_ost::{MultiplicityIndex, OSTreeMap};
///
/// let mut stock: OSTreeMap<&str, usize, _> = OSTreeMap::with_watcher(MultiplicityIndex::new());
/// stock.insert("apples", 3);
/// stock.insert("pears", 4);
/// stock.insert("plums", 5);
/// assert_eq!(stock.watcher().total_of(stock.root()), 12);
/// ```
#[derive(Clone, Debug)]
pub struct MultiplicityIndex<T> {
    totals: HashMap<T, usize, FxBuildHasher>,
}

impl<T> MultiplicityIndex<T> {
    /// An empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self { totals: HashMap::with_hasher(FxBuildHasher) }
    }

    /// Number of rows, one per key in the watched map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns `true` if the index holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl<T: Hash + Eq> MultiplicityIndex<T> {
    /// Total multiplicity of the subtree rooted at `entry`; 0 for an absent subtree.
    ///
    /// # Panics
    ///
    /// Panics if `entry` belongs to a map this index does not watch.
    #[must_use]
    pub fn total_of(&self, entry: Option<MapEntry<'_, T, usize>>) -> usize {
        entry.map_or(0, |entry| {
            *self.totals.get(entry.key()).expect("`MultiplicityIndex::total_of()` - no row for a live key!")
        })
    }

    /// The stored total for the subtree rooted at `key`, if `key` is in the map.
    pub fn get<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.totals.get(key).copied()
    }
}

impl<T> Default for MultiplicityIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq + Clone> Watcher<T, usize> for MultiplicityIndex<T> {
    fn watch(
        &mut self,
        node: MapEntry<'_, T, usize>,
        left: Option<MapEntry<'_, T, usize>>,
        right: Option<MapEntry<'_, T, usize>>,
    ) {
        let total = node
            .value()
            .checked_add(self.total_of(left))
            .and_then(|total| total.checked_add(self.total_of(right)))
            .expect("`MultiplicityIndex::watch()` - subtree total overflows `usize`!");
        match self.totals.get_mut(node.key()) {
            Some(row) => *row = total,
            None => {
                self.totals.insert(node.key().clone(), total);
            }
        }
    }

    fn unlink(&mut self, key: &T) {
        self.totals.remove(key);
    }

    fn reset(&mut self) {
        self.totals.clear();
    }
}
