use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use tracing::{debug, trace};

use crate::TreeError;
use crate::raw::{InOrder, RawOSTreeMap};
use crate::watcher::{MapEntry, Unwatched, Watcher};

mod capacity;
mod navigation;
mod order_statistic;

pub use crate::Rank;

/// An ordered map based on an [AVL tree] with order statistics.
///
/// Given a key type with a [total order], an ordered map stores its entries in key order.
/// Every node also records the height and the size of its subtree, which turns
/// "how many keys are `<= k`" ([`rank`]) and "which key sits at position `i`"
/// ([`select`]) into single O(log n) descents.
///
/// The third type parameter is the map's [`Watcher`]. It defaults to [`Unwatched`]; a
/// custom watcher is notified bottom-up after every node recomputation and can keep a
/// subtree aggregate (a sum, a maximum, a multiplicity total) in step with the tree.
/// Because a watcher reads values when it is notified, mutable value access that
/// bypasses the tree ([`get_mut`], [`iter_mut`], [`values_mut`], `IndexMut<Rank>`) only
/// exists on unwatched maps. Watched maps change values through [`insert`] or
/// [`update_values`].
///
/// A map may carry a default factory, a plain `fn() -> V` consulted by
/// [`get_or_create`] when the key is missing.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the map. The behavior
/// resulting from such a logic error is not specified, but will be encapsulated to the `OSTreeMap`
/// that observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use avl_ost::OSTreeMap;
///
/// let mut standings = OSTreeMap::new();
/// standings.insert(31, "Okafor");
/// standings.insert(18, "Lindqvist");
/// standings.insert(25, "Moreau");
///
/// // keys come out sorted.
/// let names: Vec<_> = standings.values().copied().collect();
/// assert_eq!(names, ["Lindqvist", "Moreau", "Okafor"]);
///
/// // order statistics.
/// assert_eq!(standings.rank(&25), 2);
/// assert_eq!(standings.select(1), Ok((&18, &"Lindqvist")));
///
/// // neighbors.
/// assert_eq!(standings.lower(&25), Ok((&18, &"Lindqvist")));
/// assert_eq!(standings.ceiling(&26), Ok((&31, &"Okafor")));
/// ```
///
/// A map with a default factory materializes values on demand:
///
/// ```
/// use avl_ost::OSTreeMap;
///
/// let mut hits: OSTreeMap<&str, u32> = OSTreeMap::with_factory(|| 0);
/// assert_eq!(hits.get_or_create("index.html"), Some(&0));
/// assert_eq!(hits.len(), 1);
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
/// [`rank`]: OSTreeMap::rank
/// [`select`]: OSTreeMap::select
/// [`get_mut`]: OSTreeMap::get_mut
/// [`iter_mut`]: OSTreeMap::iter_mut
/// [`values_mut`]: OSTreeMap::values_mut
/// [`insert`]: OSTreeMap::insert
/// [`update_values`]: OSTreeMap::update_values
/// [`get_or_create`]: OSTreeMap::get_or_create
pub struct OSTreeMap<K, V, W = Unwatched> {
    raw: RawOSTreeMap<K, V, W>,
    factory: Option<fn() -> V>,
}

/// An iterator over the entries of an `OSTreeMap`.
///
/// This `struct` is created by the [`iter`] method on [`OSTreeMap`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use avl_ost::OSTreeMap;
///
/// let map = OSTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: OSTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    walk: InOrder<'a, K, V>,
}

/// A mutable iterator over the entries of an unwatched `OSTreeMap`.
///
/// This `struct` is created by the [`iter_mut`] method on [`OSTreeMap`].
///
/// [`iter_mut`]: OSTreeMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K, V> {
    inner: alloc::vec::IntoIter<(&'a K, &'a mut V)>,
}

/// An owning iterator over the entries of an `OSTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`OSTreeMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `OSTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`OSTreeMap`].
///
/// [`keys`]: OSTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `OSTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`OSTreeMap`].
///
/// [`values`]: OSTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of an unwatched `OSTreeMap`.
///
/// This `struct` is created by the [`values_mut`] method on [`OSTreeMap`].
///
/// [`values_mut`]: OSTreeMap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

/// An owning iterator over the keys of an `OSTreeMap`.
///
/// This `struct` is created by the [`into_keys`] method on [`OSTreeMap`].
///
/// [`into_keys`]: OSTreeMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the values of an `OSTreeMap`.
///
/// This `struct` is created by the [`into_values`] method on [`OSTreeMap`].
///
/// [`into_values`]: OSTreeMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

impl<K, V> OSTreeMap<K, V> {
    /// Makes a new, empty, unwatched `OSTreeMap` without a default factory.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_watcher(Unwatched)
    }

    /// Makes a new, empty `OSTreeMap` whose [`get_or_create`](Self::get_or_create)
    /// materializes missing values with `factory`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::with_factory(|| 100);
    /// assert_eq!(map.get_or_create(1), Some(&100));
    /// assert!(map.contains_key(&1));
    /// ```
    #[must_use]
    pub const fn with_factory(factory: fn() -> V) -> Self {
        Self {
            raw: RawOSTreeMap::new(Unwatched),
            factory: Some(factory),
        }
    }

    /// Returns the value corresponding to the key, mutably.
    ///
    /// Only unwatched maps hand out mutable values; see the type-level documentation.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::from([(1, "a")]);
    /// if let Some(value) = map.get_mut(&1) {
    ///     *value = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.value_mut(handle))
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [1, 12, 13]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n) to collect the entries up front.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw.entries_mut().into_iter(),
        }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::from([(1, 10), (2, 20)]);
    /// for value in map.values_mut() {
    ///     *value += 1;
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [11, 21]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }
}

impl<K, V, W> OSTreeMap<K, V, W> {
    /// Makes a new, empty `OSTreeMap` notifying `watcher` after every node
    /// recomputation.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeMap, Unwatched};
    ///
    /// let map: OSTreeMap<u8, u8, Unwatched> = OSTreeMap::with_watcher(Unwatched);
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub const fn with_watcher(watcher: W) -> Self {
        Self {
            raw: RawOSTreeMap::new(watcher),
            factory: None,
        }
    }

    /// Installs the default factory used by [`get_or_create`](Self::get_or_create).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Usage`] if the map is not empty. The factory is left
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeMap, TreeError};
    ///
    /// let mut map = OSTreeMap::new();
    /// assert!(map.set_factory(|| 7).is_ok());
    /// map.insert(1, 1);
    /// assert!(matches!(map.set_factory(|| 8), Err(TreeError::Usage(_))));
    /// ```
    pub fn set_factory(&mut self, factory: fn() -> V) -> Result<(), TreeError> {
        if !self.is_empty() {
            debug!(len = self.len(), "rejected default factory on a populated map");
            return Err(TreeError::Usage("default factory set on a non-empty map"));
        }
        self.factory = Some(factory);
        Ok(())
    }

    /// Replaces the watcher, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Usage`] if the map is not empty; a watcher that missed
    /// earlier recomputations could not be brought up to date. The rejected watcher
    /// is dropped.
    pub fn set_watcher(&mut self, watcher: W) -> Result<W, TreeError> {
        if !self.is_empty() {
            debug!(len = self.len(), "rejected watcher on a populated map");
            return Err(TreeError::Usage("watcher set on a non-empty map"));
        }
        Ok(self.raw.replace_watcher(watcher))
    }

    /// The default factory, if one is installed.
    #[must_use]
    pub fn factory(&self) -> Option<fn() -> V> {
        self.factory
    }

    /// The map's watcher.
    #[must_use]
    pub fn watcher(&self) -> &W {
        self.raw.watcher()
    }

    /// A read-only view of the root node, for external traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map = OSTreeMap::from([(1, ()), (2, ()), (3, ())]);
    /// let root = map.root().unwrap();
    /// assert_eq!(*root.key(), 2);
    /// assert_eq!(root.height(), 2);
    /// assert_eq!(root.left().map(|e| *e.key()), Some(1));
    /// ```
    #[must_use]
    pub fn root(&self) -> Option<MapEntry<'_, K, V>> {
        self.raw.root_entry()
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map = OSTreeMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { walk: self.raw.in_order() }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V, W> OSTreeMap<K, V, W> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// This is a pure read: it never consults the default factory. See
    /// [`get_or_create`](Self::get_or_create) for the materializing variant.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::with_factory(|| "fresh");
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// assert_eq!(map.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.raw.node(self.raw.find(key)?);
        Some((node.key(), node.value()))
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map = OSTreeMap::from([("x", 1)]);
    /// assert_eq!(*map.get_or(&"x", &0), 1);
    /// assert_eq!(*map.get_or(&"y", &0), 0);
    /// ```
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }
}

impl<K: Ord, V, W: Watcher<K, V>> OSTreeMap<K, V, W> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated. The watcher is notified along the
    /// path in both cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "c"), Some("a"));
    /// assert_eq!(map[&37], "c");
    /// assert_eq!(map.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value).replaced
    }

    /// Returns the value for `key`, inserting one from the default factory when the
    /// key is missing.
    ///
    /// Returns `None` only when the key is missing and no factory is installed; the
    /// map is then unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut plain: OSTreeMap<i32, i32> = OSTreeMap::new();
    /// assert_eq!(plain.get_or_create(1), None);
    /// assert!(plain.is_empty());
    ///
    /// let mut defaulted = OSTreeMap::with_factory(|| 100);
    /// assert_eq!(defaulted.get_or_create(1), Some(&100));
    /// assert_eq!(defaulted.len(), 1);
    /// ```
    pub fn get_or_create(&mut self, key: K) -> Option<&V> {
        if let Some(handle) = self.raw.find(&key) {
            return Some(self.raw.node(handle).value());
        }
        let factory = self.factory?;
        let placement = self.raw.insert(key, factory());
        Some(self.raw.node(placement.handle).value())
    }

    /// Returns the value for `key`, inserting `value` first if the key is missing.
    pub fn get_or_insert(&mut self, key: K, value: V) -> &V {
        self.get_or_insert_with(key, || value)
    }

    /// Returns the value for `key`, inserting the result of `f` first if the key is
    /// missing. `f` is not called when the key is present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::new();
    /// assert_eq!(*map.get_or_insert_with("k", || 1), 1);
    /// assert_eq!(*map.get_or_insert_with("k", || unreachable!()), 1);
    /// ```
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, f: F) -> &V {
        let handle = match self.raw.find(&key) {
            Some(handle) => handle,
            None => self.raw.insert(key, f()).handle,
        };
        self.raw.node(handle).value()
    }

    /// Removes a key from the map, returning the value at the key if the key was
    /// previously in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key
    /// was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.pop_first(), Some((2, "b")));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.pop_first()
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.pop_last()
    }

    /// Clears the map, removing all elements. The watcher is reset; the factory is
    /// kept.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Retains only the entries for which `f` returns `true`, visiting them in
    /// ascending key order.
    ///
    /// The map is rebuilt from the kept entries and the watcher is reset first.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map: OSTreeMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.keys().copied().eq([0, 2, 4, 6]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n)
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let before = self.len();
        for (key, mut value) in self.raw.drain_to_vec() {
            if f(&key, &mut value) {
                self.raw.insert(key, value);
            }
        }
        trace!(before, after = self.len(), "retain rebuilt the map");
    }

    /// Applies `f` to every value in key order, then recomputes every node so the
    /// watcher observes the new values.
    ///
    /// This is how values of a watched map are edited in bulk.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let mut map = OSTreeMap::from([(1, 1), (2, 2)]);
    /// map.update_values(|k, v| *v += k * 100);
    /// assert!(map.values().copied().eq([101, 202]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn update_values<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V),
    {
        self.raw.update_values(f);
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys { inner: self.into_iter() }
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues { inner: self.into_iter() }
    }
}

impl<K, V, W> OSTreeMap<K, V, W>
where
    K: Clone + Ord,
    V: Clone,
    W: Clone + Watcher<K, V>,
{
    /// An empty map with a reset copy of this map's watcher and the same factory.
    fn empty_like(&self, capacity: usize) -> Self {
        let mut watcher = self.raw.watcher().clone();
        watcher.reset();
        Self {
            raw: RawOSTreeMap::with_capacity(capacity, watcher),
            factory: self.factory,
        }
    }

    /// Builds a new map holding the `n` smallest entries.
    ///
    /// The result is a copy, not a view; `n` larger than the map copies all of it.
    /// The copy shares the factory and gets a reset clone of the watcher.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map: OSTreeMap<i32, char> = (0..10).zip('a'..).collect();
    /// let head = map.head_map(4);
    /// assert!(head.keys().copied().eq(0..4));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) in the size of the result.
    #[must_use]
    pub fn head_map(&self, n: usize) -> Self {
        let mut head = self.empty_like(n.min(self.len()));
        for (key, value) in self.iter().take(n) {
            head.insert(key.clone(), value.clone());
        }
        trace!(requested = n, len = head.len(), "head_map copied entries");
        head
    }

    /// Builds a new map holding the `n` largest entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map: OSTreeMap<i32, char> = (0..10).zip('a'..).collect();
    /// let tail = map.tail_map(4);
    /// assert!(tail.keys().copied().eq(6..10));
    /// ```
    #[must_use]
    pub fn tail_map(&self, n: usize) -> Self {
        let mut tail = self.empty_like(n.min(self.len()));
        for (key, value) in self.iter().rev().take(n) {
            tail.insert(key.clone(), value.clone());
        }
        trace!(requested = n, len = tail.len(), "tail_map copied entries");
        tail
    }
}

impl<K, V, W> Clone for OSTreeMap<K, V, W>
where
    K: Clone + Ord,
    V: Clone,
    W: Clone + Watcher<K, V>,
{
    /// Deep copy by re-insertion; the clone's watcher is a reset copy that observes
    /// the rebuild.
    fn clone(&self) -> Self {
        let mut copy = self.empty_like(self.len());
        for (key, value) in self {
            copy.insert(key.clone(), value.clone());
        }
        trace!(len = copy.len(), "cloned map by re-insertion");
        copy
    }
}

impl<K: Hash, V: Hash, W> Hash for OSTreeMap<K, V, W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, W> PartialEq for OSTreeMap<K, V, W> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, W> Eq for OSTreeMap<K, V, W> {}

impl<K: PartialOrd, V: PartialOrd, W> PartialOrd for OSTreeMap<K, V, W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, W> Ord for OSTreeMap<K, V, W> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, W> fmt::Debug for OSTreeMap<K, V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for OSTreeMap<K, V> {
    fn default() -> Self {
        OSTreeMap::new()
    }
}

impl<K: Ord, V, W: Watcher<K, V> + Default> FromIterator<(K, V)> for OSTreeMap<K, V, W> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = OSTreeMap::with_watcher(W::default());
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, W: Watcher<K, V>> Extend<(K, V)> for OSTreeMap<K, V, W> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy, W: Watcher<K, V>> Extend<(&'a K, &'a V)> for OSTreeMap<K, V, W> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, W> IntoIterator for &'a OSTreeMap<K, V, W> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OSTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K: Ord, V, W: Watcher<K, V>> IntoIterator for OSTreeMap<K, V, W> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map = OSTreeMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V, W> Index<&Q> for OSTreeMap<K, V, W>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OSTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.walk.next()?;
        let node = self.walk.node(handle);
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.walk.next_back()?;
        let node = self.walk.node(handle);
        Some((node.key(), node.value()))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.walk.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            walk: self.walk.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    /// Creates an empty `ostree_map::IntoIter`.
    ///
    /// ```
    /// # use avl_ost::ostree_map;
    /// let iter: ostree_map::IntoIter<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            inner: Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for ValuesMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for IntoKeys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoKeys").field("len", &self.inner.len()).finish()
    }
}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<K, V: fmt::Debug> fmt::Debug for IntoValues<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoValues").field("len", &self.inner.len()).finish()
    }
}
