//! AVL balance engine: status recomputation, rotations and the recursive
//! insert/remove descents that return the (possibly new) subtree root.
//!
//! Every node on a mutated path is recomputed on the way back up, children before
//! parents, and the watcher sees each recomputation as it happens.

use core::borrow::Borrow;
use core::cmp::Ordering;

use super::{Placement, RawOSTreeMap};
use crate::raw::{Handle, Node};
use crate::raw::size::Size;
use crate::watcher::{MapEntry, Watcher};

impl<K, V, W: Watcher<K, V>> RawOSTreeMap<K, V, W> {
    /// Refreshes height and size from the children, then notifies the watcher.
    pub(super) fn recompute_status(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        let height = 1 + self.height(left).max(self.height(right));
        let size = Size::from_usize(1 + self.size(left) + self.size(right));
        self.nodes.get_mut(handle).set_status(height, size);

        let nodes = &self.nodes;
        self.watcher.watch(
            MapEntry::new(nodes, handle),
            left.map(|child| MapEntry::new(nodes, child)),
            right.map(|child| MapEntry::new(nodes, child)),
        );
    }

    /// Post-order recomputation of a whole subtree.
    pub(super) fn recompute_subtree(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        if let Some(left) = left {
            self.recompute_subtree(left);
        }
        if let Some(right) = right {
            self.recompute_subtree(right);
        }
        self.recompute_status(handle);
    }

    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).right().expect("rotate_left: node has no right child");
        let inner = self.nodes.get(pivot).left();

        self.nodes.get_mut(handle).set_right(inner);
        self.nodes.get_mut(pivot).set_left(Some(handle));
        self.recompute_status(handle);
        self.recompute_status(pivot);
        pivot
    }

    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let pivot = self.nodes.get(handle).left().expect("rotate_right: node has no left child");
        let inner = self.nodes.get(pivot).right();

        self.nodes.get_mut(handle).set_left(inner);
        self.nodes.get_mut(pivot).set_right(Some(handle));
        self.recompute_status(handle);
        self.recompute_status(pivot);
        pivot
    }

    /// Restores `|factor| <= 1` at `handle`, whose children are balanced and whose
    /// status is current. One single or double rotation suffices because a single
    /// insert or remove moves a subtree's height by at most one.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        match self.factor(handle) {
            -2 => {
                let left = self.nodes.get(handle).left().expect("left-heavy node has a left child");
                if self.factor(left) > 0 {
                    let left = self.rotate_left(left);
                    self.nodes.get_mut(handle).set_left(Some(left));
                }
                self.rotate_right(handle)
            }
            2 => {
                let right = self.nodes.get(handle).right().expect("right-heavy node has a right child");
                if self.factor(right) < 0 {
                    let right = self.rotate_right(right);
                    self.nodes.get_mut(handle).set_right(Some(right));
                }
                self.rotate_left(handle)
            }
            _ => handle,
        }
    }

    /// Recompute and rebalance on the way back up.
    #[inline]
    fn settle(&mut self, handle: Handle) -> Handle {
        self.recompute_status(handle);
        self.rebalance(handle)
    }

    /// Detaches the leftmost node of the subtree. Returns the new subtree root and
    /// the detached node, which is still allocated.
    pub(super) fn detach_min(&mut self, handle: Handle) -> (Option<Handle>, Handle) {
        let node = self.nodes.get(handle);
        let Some(left) = node.left() else {
            return (node.right(), handle);
        };
        let (left, min) = self.detach_min(left);
        self.nodes.get_mut(handle).set_left(left);
        (Some(self.settle(handle)), min)
    }

    /// Mirror of [`Self::detach_min`].
    pub(super) fn detach_max(&mut self, handle: Handle) -> (Option<Handle>, Handle) {
        let node = self.nodes.get(handle);
        let Some(right) = node.right() else {
            return (node.left(), handle);
        };
        let (right, max) = self.detach_max(right);
        self.nodes.get_mut(handle).set_right(right);
        (Some(self.settle(handle)), max)
    }
}

impl<K: Ord, V, W: Watcher<K, V>> RawOSTreeMap<K, V, W> {
    pub(super) fn insert_at(&mut self, node: Option<Handle>, key: K, value: V) -> (Handle, Placement<V>) {
        let Some(handle) = node else {
            let handle = self.nodes.insert(Node::leaf(key, value));
            self.recompute_status(handle);
            return (handle, Placement { handle, replaced: None });
        };

        let current = self.nodes.get(handle);
        let (left, right) = (current.left(), current.right());
        let placement = match key.cmp(current.key()) {
            Ordering::Less => {
                let (left, placement) = self.insert_at(left, key, value);
                self.nodes.get_mut(handle).set_left(Some(left));
                placement
            }
            Ordering::Greater => {
                let (right, placement) = self.insert_at(right, key, value);
                self.nodes.get_mut(handle).set_right(Some(right));
                placement
            }
            Ordering::Equal => {
                // Shape is unchanged, but the watcher must see the new value.
                let replaced = core::mem::replace(self.nodes.get_mut(handle).value_mut(), value);
                Placement {
                    handle,
                    replaced: Some(replaced),
                }
            }
        };

        (self.settle(handle), placement)
    }

    pub(super) fn remove_at<Q>(&mut self, node: Option<Handle>, key: &Q) -> (Option<Handle>, Option<(K, V)>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(handle) = node else {
            return (None, None);
        };

        let current = self.nodes.get(handle);
        let (left, right) = (current.left(), current.right());
        let removed = match key.cmp(current.key().borrow()) {
            Ordering::Less => {
                let (left, removed) = self.remove_at(left, key);
                self.nodes.get_mut(handle).set_left(left);
                removed
            }
            Ordering::Greater => {
                let (right, removed) = self.remove_at(right, key);
                self.nodes.get_mut(handle).set_right(right);
                removed
            }
            Ordering::Equal => match (left, right) {
                (_, None) => return (left, Some(self.release(handle))),
                (None, Some(_)) => return (right, Some(self.release(handle))),
                (Some(_), Some(right)) => {
                    // The in-order successor donates its entry and is unlinked instead.
                    let (right, successor) = self.detach_min(right);
                    let (key, value) = self.nodes.remove(successor).into_entry();
                    let node = self.nodes.get_mut(handle);
                    node.set_right(right);
                    let (key, value) = node.replace_entry(key, value);
                    self.watcher.unlink(&key);
                    Some((key, value))
                }
            },
        };

        if removed.is_none() {
            return (Some(handle), None);
        }
        (Some(self.settle(handle)), removed)
    }
}
