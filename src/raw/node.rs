use super::handle::Handle;
use super::size::Size;

/// A node of the AVL tree.
///
/// Children are owned through their handles; a subtree belongs to exactly one
/// parent (or to the tree's root slot).
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    left: Option<Handle>,
    right: Option<Handle>,
    // Leaf height is 1. An AVL tree of u32::MAX nodes is at most 46 levels tall.
    height: u8,
    size: Size,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf.
    pub(crate) fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) fn size(&self) -> Size {
        self.size
    }

    /// Stores freshly computed status; see `RawOSTreeMap::recompute_status`.
    pub(crate) fn set_status(&mut self, height: u8, size: Size) {
        self.height = height;
        self.size = size;
    }

    /// Swaps in a successor's entry during a two-child removal, returning the
    /// entry this node held.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        let key = core::mem::replace(&mut self.key, key);
        let value = core::mem::replace(&mut self.value, value);
        (key, value)
    }

    pub(crate) fn entry_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
