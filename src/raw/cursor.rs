use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;

// Covers every AVL tree that fits in a `Handle` without spilling.
const SPINE: usize = 48;

type Spine = SmallVec<[Handle; SPINE]>;

/// Double-ended in-order walk over a subtree.
///
/// Each end keeps the spine of nodes still to be visited; `remaining` stops the two
/// ends from crossing.
pub(crate) struct InOrder<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    front: Spine,
    back: Spine,
    remaining: usize,
}

impl<'a, K, V> InOrder<'a, K, V> {
    pub(crate) fn new(nodes: &'a Arena<Node<K, V>>, root: Option<Handle>) -> Self {
        let remaining = root.map_or(0, |handle| nodes.get(handle).size().get());
        let mut walk = Self {
            nodes,
            front: SmallVec::new(),
            back: SmallVec::new(),
            remaining,
        };
        walk.push_left_spine(root);
        walk.push_right_spine(root);
        walk
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &'a Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn len(&self) -> usize {
        self.remaining
    }

    fn push_left_spine(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.front.push(handle);
            current = self.nodes.get(handle).left();
        }
    }

    fn push_right_spine(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.back.push(handle);
            current = self.nodes.get(handle).right();
        }
    }
}

impl<K, V> Iterator for InOrder<'_, K, V> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front.pop()?;
        self.push_left_spine(self.nodes.get(handle).right());
        self.remaining -= 1;
        Some(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for InOrder<'_, K, V> {
    fn next_back(&mut self) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back.pop()?;
        self.push_right_spine(self.nodes.get(handle).left());
        self.remaining -= 1;
        Some(handle)
    }
}

impl<K, V> Clone for InOrder<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}
