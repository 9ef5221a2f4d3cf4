use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::OSTreeMap;
use crate::{Rank, TreeError};

impl<K, V, W> OSTreeMap<K, V, W> {
    /// Returns the entry at 1-based position `index` in sorted order.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty, otherwise
    /// [`TreeError::OutOfRange`] if `index` is outside `1..=len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeMap, TreeError};
    ///
    /// let map = OSTreeMap::from([("c", 30), ("a", 10), ("b", 20)]);
    /// assert_eq!(map.select(2), Ok((&"b", &20)));
    /// assert_eq!(map.select(0), Err(TreeError::OutOfRange { index: 0, len: 3 }));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn select(&self, index: usize) -> Result<(&K, &V), TreeError> {
        if self.is_empty() {
            return Err(TreeError::EmptyCollection);
        }
        let handle = self.raw.select(index).ok_or(TreeError::OutOfRange { index, len: self.len() })?;
        let node = self.raw.node(handle);
        Ok((node.key(), node.value()))
    }
}

impl<K: Ord, V, W> OSTreeMap<K, V, W> {
    /// Returns the number of keys less than or equal to `key`.
    ///
    /// `key` need not be present: the result is 0 below every key and `len()` above
    /// every key. For a present key it is the key's 1-based position, so
    /// `select(rank(k))` yields `k`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map = OSTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.rank(&5), 0);
    /// assert_eq!(map.rank(&20), 2);
    /// assert_eq!(map.rank(&25), 2);
    /// assert_eq!(map.rank(&99), 3);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(key)
    }
}

/// Indexes into the map by 1-based rank.
///
/// # Panics
///
/// Panics if `rank` is outside `1..=len`.
///
/// # Examples
///
/// ```
/// use avl_ost::{OSTreeMap, Rank};
///
/// let map = OSTreeMap::from([("a", 1), ("b", 2)]);
/// assert_eq!(map[Rank(2)], 2);
/// ```
impl<K, V, W> Index<Rank> for OSTreeMap<K, V, W> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select(rank.0).map(|(_, v)| v).expect("rank out of bounds")
    }
}

/// Mutably indexes into an unwatched map by 1-based rank.
///
/// # Panics
///
/// Panics if `rank` is outside `1..=len`.
///
/// # Examples
///
/// ```
/// use avl_ost::{OSTreeMap, Rank};
///
/// let mut map = OSTreeMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] = 5;
/// assert_eq!(map.get(&"a"), Some(&5));
/// ```
impl<K, V> IndexMut<Rank> for OSTreeMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        let handle = self.raw.select(rank.0).expect("rank out of bounds");
        self.raw.value_mut(handle)
    }
}
