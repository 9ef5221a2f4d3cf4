//! A sorted multiset with multiplicity-aware rank and select.
//!
//! [`OSMultiSet`] stores one map entry per distinct element, holding its
//! multiplicity. A [`MultiplicityIndex`] watches the map and keeps the total
//! multiplicity of every subtree in a hash table, which lets rank and select
//! count duplicates in O(log n) without any tree code of their own.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::Hash;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use tracing::trace;

use crate::ostree_map::{self, OSTreeMap};
use crate::{OSTreeSet, TreeError};

mod multiplicity_index;

pub use multiplicity_index::MultiplicityIndex;

/// A sorted multiset built on [`OSTreeMap`] and [`MultiplicityIndex`].
///
/// [`len`](Self::len) counts distinct elements; [`total`](Self::total) counts them
/// with multiplicity. Positions used by [`rank`](Self::rank) and
/// [`select`](Self::select) are 1-based over the expanded multiset, in which every
/// element occupies a block of consecutive positions as wide as its multiplicity.
///
/// # Examples
///
/// ```
/// use avl_ost::OSMultiSet;
///
/// let mut set = OSMultiSet::new();
/// for x in 0..10 {
///     set.insert(x);
///     set.insert(x);
/// }
///
/// assert_eq!(set.total(), 20);
/// assert_eq!(set.rank(&5), 12);
/// assert_eq!(set.select(5), Ok(&2));
/// assert_eq!(set.select(7), Ok(&3));
/// ```
pub struct OSMultiSet<T> {
    map: OSTreeMap<T, usize, MultiplicityIndex<T>>,
}

/// An iterator over a multiset's elements, each repeated by its multiplicity.
///
/// This `struct` is created by the [`iter`](OSMultiSet::iter) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    entries: ostree_map::Iter<'a, T, usize>,
    current: Option<&'a T>,
    repeat: usize,
    remaining: usize,
}

/// An iterator over a multiset's distinct elements and their multiplicities.
///
/// This `struct` is created by the [`counts`](OSMultiSet::counts) method.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Counts<'a, T> {
    entries: ostree_map::Iter<'a, T, usize>,
}

impl<T: Ord + Clone + Hash> OSMultiSet<T> {
    /// Makes a new, empty `OSMultiSet`.
    #[must_use]
    pub const fn new() -> Self {
        OSMultiSet {
            map: OSTreeMap::with_watcher(MultiplicityIndex::new()),
        }
    }

    /// Returns the number of distinct elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns the number of elements counted with multiplicity.
    ///
    /// # Complexity
    ///
    /// O(1) expected: one index lookup at the root.
    #[must_use]
    pub fn total(&self) -> usize {
        self.map.watcher().total_of(self.map.root())
    }

    /// Returns `true` if the multiset contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Adds one copy of `value`.
    pub fn insert(&mut self, value: T) {
        self.insert_n(value, 1);
    }

    /// Adds `n` copies of `value`. Adding zero copies is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let mut set = OSMultiSet::new();
    /// set.insert_n('x', 3);
    /// set.insert_n('y', 0);
    /// assert_eq!(set.count(&'x'), 3);
    /// assert!(!set.contains(&'y'));
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the total multiplicity would exceed `usize::MAX`. The multiset is
    /// left unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_n(&mut self, value: T, n: usize) {
        if n == 0 {
            return;
        }
        assert!(
            self.total().checked_add(n).is_some(),
            "`OSMultiSet::insert_n()` - total multiplicity overflows `usize`!"
        );
        let count = self.count(&value);
        self.map.insert(value, count + n);
    }

    /// Removes one copy of `value`. Returns whether a copy was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_n(value, 1) > 0
    }

    /// Removes up to `n` copies of `value`, deleting the element once its count
    /// reaches zero. Returns how many copies were removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let mut set = OSMultiSet::from([7, 7, 7]);
    /// assert_eq!(set.remove_n(&7, 2), 2);
    /// assert_eq!(set.count(&7), 1);
    /// assert_eq!(set.remove_n(&7, 5), 1);
    /// assert!(set.is_empty());
    /// ```
    pub fn remove_n<Q>(&mut self, value: &Q, n: usize) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some((key, &count)) = self.map.get_key_value(value) else {
            return 0;
        };
        if n == 0 {
            return 0;
        }
        if n >= count {
            self.map.remove(value);
            return count;
        }
        let key = key.clone();
        self.map.insert(key, count - n);
        n
    }

    /// Removes every copy of `value`. Returns how many copies were removed.
    pub fn remove_all<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove(value).unwrap_or(0)
    }

    /// Returns the multiplicity of `value`, 0 if absent.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get(value).copied().unwrap_or(0)
    }

    /// Returns `true` if at least one copy of `value` is present.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.contains_key(value)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the number of elements `<= value`, counted with multiplicity.
    ///
    /// For a present element this is the last position of its block of copies.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let set = OSMultiSet::from([1, 2, 2, 2, 5]);
    /// assert_eq!(set.rank(&0), 0);
    /// assert_eq!(set.rank(&2), 4);
    /// assert_eq!(set.rank(&3), 4);
    /// assert_eq!(set.rank(&9), 5);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) expected: one O(1) index lookup per level.
    pub fn rank<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = self.map.watcher();
        let mut rank = 0;
        let mut current = self.map.root();
        while let Some(entry) = current {
            match value.cmp(entry.key().borrow()) {
                Ordering::Less => current = entry.left(),
                Ordering::Equal => return rank + index.total_of(entry.left()) + *entry.value(),
                Ordering::Greater => {
                    rank += index.total_of(entry.left()) + *entry.value();
                    current = entry.right();
                }
            }
        }
        rank
    }

    /// Returns the element at 1-based position `index` of the expanded multiset.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty, otherwise
    /// [`TreeError::OutOfRange`] if `index` is outside `1..=total`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSMultiSet, TreeError};
    ///
    /// let set = OSMultiSet::from(['a', 'b', 'b']);
    /// assert_eq!(set.select(1), Ok(&'a'));
    /// assert_eq!(set.select(3), Ok(&'b'));
    /// assert_eq!(set.select(4), Err(TreeError::OutOfRange { index: 4, len: 3 }));
    /// ```
    pub fn select(&self, index: usize) -> Result<&T, TreeError> {
        if self.is_empty() {
            return Err(TreeError::EmptyCollection);
        }
        let total = self.total();
        let out_of_range = TreeError::OutOfRange { index, len: total };
        if index == 0 || index > total {
            return Err(out_of_range);
        }

        let totals = self.map.watcher();
        let mut remaining = index;
        let mut current = self.map.root();
        while let Some(entry) = current {
            let left = totals.total_of(entry.left());
            let count = *entry.value();
            if remaining <= left {
                current = entry.left();
            } else if remaining <= left + count {
                return Ok(entry.key());
            } else {
                remaining -= left + count;
                current = entry.right();
            }
        }
        Err(out_of_range)
    }

    /// Returns the smallest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty.
    pub fn first(&self) -> Result<&T, TreeError> {
        self.map.first().map(|(k, _)| k)
    }

    /// Returns the largest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty.
    pub fn last(&self) -> Result<&T, TreeError> {
        self.map.last().map(|(k, _)| k)
    }

    /// Returns the greatest element strictly less than `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty, [`TreeError::NotFound`]
    /// if no element qualifies.
    pub fn lower<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.lower(value).map(|(k, _)| k)
    }

    /// Returns the greatest element less than or equal to `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty, [`TreeError::NotFound`]
    /// if no element qualifies.
    pub fn floor<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.floor(value).map(|(k, _)| k)
    }

    /// Returns the least element strictly greater than `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty, [`TreeError::NotFound`]
    /// if no element qualifies.
    pub fn higher<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.higher(value).map(|(k, _)| k)
    }

    /// Returns the least element greater than or equal to `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the multiset is empty, [`TreeError::NotFound`]
    /// if no element qualifies.
    pub fn ceiling<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.ceiling(value).map(|(k, _)| k)
    }

    /// Builds a new multiset from the `n` smallest distinct elements, keeping their
    /// multiplicities.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let set = OSMultiSet::from([1, 1, 2, 3, 3, 3]);
    /// let head = set.head(2);
    /// assert_eq!(head.len(), 2);
    /// assert_eq!(head.total(), 3);
    /// ```
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        OSMultiSet { map: self.map.head_map(n) }
    }

    /// Builds a new multiset from the `n` largest distinct elements, keeping their
    /// multiplicities.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        OSMultiSet { map: self.map.tail_map(n) }
    }

    /// Returns a new multiset holding each element with the larger of its two
    /// multiplicities.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let a = OSMultiSet::from([1, 1, 2]);
    /// let b = OSMultiSet::from([1, 2, 2, 3]);
    /// let union = a.union(&b);
    /// assert_eq!((union.count(&1), union.count(&2), union.count(&3)), (2, 2, 1));
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (value, count) in other.counts() {
            let extra = count.saturating_sub(self.count(value));
            result.insert_n(value.clone(), extra);
        }
        trace!(total = result.total(), "multiset union");
        result
    }

    /// Returns a new multiset holding each common element with the smaller of its
    /// two multiplicities.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        let mut result = OSMultiSet::new();
        for (value, count) in small.counts() {
            result.insert_n(value.clone(), count.min(large.count(value)));
        }
        trace!(total = result.total(), "multiset intersection");
        result
    }

    /// Returns a new multiset holding the copies of `self` left after taking away
    /// those of `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let a = OSMultiSet::from([1, 1, 1, 2]);
    /// let b = OSMultiSet::from([1, 2, 2]);
    /// let left = a.difference(&b);
    /// assert_eq!((left.count(&1), left.count(&2)), (2, 0));
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = OSMultiSet::new();
        for (value, count) in self.counts() {
            result.insert_n(value.clone(), count.saturating_sub(other.count(value)));
        }
        trace!(total = result.total(), "multiset difference");
        result
    }

    /// Returns a new multiset whose multiplicities are the sums of both operands'.
    #[must_use]
    pub fn sum(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (value, count) in other.counts() {
            result.insert_n(value.clone(), count);
        }
        trace!(total = result.total(), "multiset sum");
        result
    }

    /// Returns `true` if no element occurs more often in `self` than in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.total() <= other.total() && self.counts().all(|(value, count)| count <= other.count(value))
    }

    /// Retains only the elements for which `f`, given the element and its
    /// multiplicity, returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T, usize) -> bool,
    {
        self.map.retain(|value, count| f(value, *count));
    }

    /// Replaces every multiplicity with `f(element, multiplicity)`; a new
    /// multiplicity of zero deletes the element.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let mut set = OSMultiSet::from([1, 2, 2, 3, 3, 3]);
    /// set.update_counts(|_, n| n - 1);
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(set.total(), 3);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the new multiplicities sum past `usize::MAX`. `f` has then been
    /// called for every element, but the multiset is left unchanged.
    pub fn update_counts<F>(&mut self, mut f: F)
    where
        F: FnMut(&T, usize) -> usize,
    {
        let updated: Vec<usize> = self.counts().map(|(value, count)| f(value, count)).collect();
        assert!(
            updated.iter().try_fold(0usize, |total, &count| total.checked_add(count)).is_some(),
            "`OSMultiSet::update_counts()` - total multiplicity overflows `usize`!"
        );
        let mut updated = updated.into_iter();
        self.map.retain(|_, count| {
            *count = updated.next().unwrap_or(0);
            *count > 0
        });
    }

    /// Gets an iterator over the elements in ascending order, each repeated by its
    /// multiplicity.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSMultiSet;
    ///
    /// let set = OSMultiSet::from([3, 1, 3]);
    /// assert!(set.iter().copied().eq([1, 3, 3]));
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            entries: self.map.iter(),
            current: None,
            repeat: 0,
            remaining: self.total(),
        }
    }

    /// Gets an iterator over the distinct elements and their multiplicities.
    pub fn counts(&self) -> Counts<'_, T> {
        Counts { entries: self.map.iter() }
    }

    /// Collects the distinct elements into an [`OSTreeSet`].
    #[must_use]
    pub fn to_set(&self) -> OSTreeSet<T> {
        self.map.keys().cloned().collect()
    }
}

impl<T: Ord + Clone + Hash> Clone for OSMultiSet<T> {
    fn clone(&self) -> Self {
        OSMultiSet { map: self.map.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for OSMultiSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for OSMultiSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq> Eq for OSMultiSet<T> {}

impl<T: Ord + Clone + Hash> Default for OSMultiSet<T> {
    fn default() -> Self {
        OSMultiSet::new()
    }
}

impl<T: Ord + Clone + Hash> FromIterator<T> for OSMultiSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OSMultiSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord + Clone + Hash> Extend<T> for OSMultiSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord + Clone + Hash, const N: usize> From<[T; N]> for OSMultiSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T: Ord + Clone + Hash> IntoIterator for &'a OSMultiSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        while self.repeat == 0 {
            let (value, &count) = self.entries.next()?;
            self.current = Some(value);
            self.repeat = count;
        }
        self.repeat -= 1;
        self.remaining -= 1;
        self.current
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            entries: self.entries.clone(),
            current: self.current,
            repeat: self.repeat,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Counts<'a, T> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(value, &count)| (value, count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> DoubleEndedIterator for Counts<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|(value, &count)| (value, count))
    }
}

impl<T> ExactSizeIterator for Counts<'_, T> {}

impl<T> FusedIterator for Counts<'_, T> {}

impl<T> Clone for Counts<'_, T> {
    fn clone(&self) -> Self {
        Counts {
            entries: self.entries.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Counts<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.clone()).finish()
    }
}
