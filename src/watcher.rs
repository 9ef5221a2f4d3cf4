//! Bottom-up augmentation hooks.
//!
//! An [`OSTreeMap`](crate::OSTreeMap) recomputes the height and size of every node whose
//! subtree changed, children first. A [`Watcher`] is called right after each of those
//! recomputations and can keep any subtree-scoped aggregate (a sum, a maximum, a
//! multiplicity total) consistent with the tree's current shape, including across
//! rotations.

use core::fmt;

use crate::raw::{Arena, Handle, Node};

/// Observer of structural recomputations.
///
/// # Ordering
///
/// When `watch` is called for a node, both children have already been recomputed (and
/// watched) during the same operation, so aggregates read from them are final. Rotations
/// recompute the demoted root before the promoted one.
///
/// # Examples
///
/// Track the sum of values in every subtree, keyed by the subtree root's key:
///
/// ```
/// use std::collections::BTreeMap;
/// use avl_ost::{MapEntry, OSTreeMap, Watcher};
///
/// #[derive(Clone, Default)]
/// struct SubtreeSums(BTreeMap<u32, u64>);
///
/// impl SubtreeSums {
///     fn of(&self, entry: Option<MapEntry<'_, u32, u64>>) -> u64 {
///         entry.map_or(0, |e| self.0[e.key()])
///     }
/// }
///
/// impl Watcher<u32, u64> for SubtreeSums {
///     fn watch(
///         &mut self,
///         node: MapEntry<'_, u32, u64>,
///         left: Option<MapEntry<'_, u32, u64>>,
///         right: Option<MapEntry<'_, u32, u64>>,
///     ) {
///         let sum = node.value() + self.of(left) + self.of(right);
///         self.0.insert(*node.key(), sum);
///     }
///
///     fn unlink(&mut self, key: &u32) {
///         self.0.remove(key);
///     }
/// }
///
/// let mut map = OSTreeMap::with_watcher(SubtreeSums::default());
/// for k in 1..=10 {
///     map.insert(k, u64::from(k));
/// }
/// let root = map.root().unwrap();
/// assert_eq!(map.watcher().of(Some(root)), 55);
/// ```
pub trait Watcher<K, V> {
    /// Called after `node`'s height and size were recomputed.
    fn watch(&mut self, node: MapEntry<'_, K, V>, left: Option<MapEntry<'_, K, V>>, right: Option<MapEntry<'_, K, V>>);

    /// Called once when `key` is removed from the map.
    fn unlink(&mut self, key: &K) {
        let _ = key;
    }

    /// Called when the map drops every entry at once.
    fn reset(&mut self) {}
}

/// The watcher of a map without augmentation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Unwatched;

impl<K, V> Watcher<K, V> for Unwatched {
    #[inline]
    fn watch(&mut self, _: MapEntry<'_, K, V>, _: Option<MapEntry<'_, K, V>>, _: Option<MapEntry<'_, K, V>>) {}
}

/// A read-only view of one node of an [`OSTreeMap`](crate::OSTreeMap).
///
/// Views are handed to [`Watcher`]s and returned by [`OSTreeMap::root`](crate::OSTreeMap::root)
/// for external traversal (diagnostics, printing, custom descents). They cannot mutate
/// the tree.
pub struct MapEntry<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    handle: Handle,
}

impl<'a, K, V> MapEntry<'a, K, V> {
    pub(crate) fn new(nodes: &'a Arena<Node<K, V>>, handle: Handle) -> Self {
        Self { nodes, handle }
    }

    fn node(&self) -> &'a Node<K, V> {
        self.nodes.get(self.handle)
    }

    /// The node's key.
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.node().key()
    }

    /// The node's value.
    #[must_use]
    pub fn value(&self) -> &'a V {
        self.node().value()
    }

    /// Both halves of the entry.
    #[must_use]
    pub fn key_value(&self) -> (&'a K, &'a V) {
        let node = self.node();
        (node.key(), node.value())
    }

    /// The root of the left subtree, if any.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.node().left().map(|handle| Self::new(self.nodes, handle))
    }

    /// The root of the right subtree, if any.
    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.node().right().map(|handle| Self::new(self.nodes, handle))
    }

    /// Height of the subtree rooted here; a leaf has height 1.
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.node().height())
    }

    /// Number of entries in the subtree rooted here, this one included.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        self.node().size().get()
    }
}

impl<K, V> Clone for MapEntry<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for MapEntry<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MapEntry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapEntry")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .field("subtree_len", &self.subtree_len())
            .finish()
    }
}
