use core::borrow::Borrow;
use core::cmp::Ordering::{self, Equal, Greater, Less};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{BitAnd, BitOr, BitXor, Sub};

use tracing::trace;

use crate::TreeError;
use crate::ostree_map::{IntoKeys, Keys, OSTreeMap};

mod capacity;
mod order_statistic;

/// An ordered set based on an AVL tree with order statistics.
///
/// Every operation delegates to an [`OSTreeMap`] with unit values; see its
/// documentation for the balancing and complexity guarantees.
///
/// Set algebra ([`union`], [`intersection`], [`difference`],
/// [`symmetric_difference`]) builds and returns a new set; [`insert`] and
/// [`remove`] mutate the receiver.
///
/// It is a logic error for an item to be modified in such a way that the item's ordering relative
/// to any other item, as determined by the [`Ord`] trait, changes while it is in the set.
///
/// # Examples
///
/// ```
/// use avl_ost::OSTreeSet;
///
/// let mut primes = OSTreeSet::new();
/// for p in [7, 2, 11, 5, 3] {
///     primes.insert(p);
/// }
///
/// assert_eq!(primes.first(), Ok(&2));
/// assert_eq!(primes.rank(&6), 3);
/// assert_eq!(primes.select(4), Ok(&7));
/// assert_eq!(primes.higher(&7), Ok(&11));
///
/// let odd = OSTreeSet::from([1, 3, 5, 7, 9, 11]);
/// let both = &primes & &odd;
/// assert!(both.iter().copied().eq([3, 5, 7, 11]));
/// ```
///
/// [`union`]: OSTreeSet::union
/// [`intersection`]: OSTreeSet::intersection
/// [`difference`]: OSTreeSet::difference
/// [`symmetric_difference`]: OSTreeSet::symmetric_difference
/// [`insert`]: OSTreeSet::insert
/// [`remove`]: OSTreeSet::remove
pub struct OSTreeSet<T> {
    map: OSTreeMap<T, ()>,
}

/// An iterator over the items of an `OSTreeSet`.
///
/// This `struct` is created by the [`iter`] method on [`OSTreeSet`].
///
/// [`iter`]: OSTreeSet::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    iter: Keys<'a, T, ()>,
}

/// An owning iterator over the items of an `OSTreeSet` in ascending order.
///
/// This `struct` is created by the [`into_iter`] method on [`OSTreeSet`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: OSTreeSet#method.into_iter
pub struct IntoIter<T> {
    iter: IntoKeys<T, ()>,
}

/// Walks two ascending iterators in lockstep, pairing equal items.
struct MergeIterInner<I: Iterator> {
    a: I,
    b: I,
    peeked: Option<Peeked<I>>,
}

enum Peeked<I: Iterator> {
    A(I::Item),
    B(I::Item),
}

impl<I: Iterator> MergeIterInner<I> {
    fn new(a: I, b: I) -> Self {
        MergeIterInner { a, b, peeked: None }
    }

    /// The next item of either side: `(Some(a), None)` if `a < b`, `(None, Some(b))`
    /// if `b < a`, both when equal, `(None, None)` once both are exhausted.
    fn nexts(&mut self) -> (Option<I::Item>, Option<I::Item>)
    where
        I::Item: Ord,
    {
        let (a_next, b_next) = match self.peeked.take() {
            Some(Peeked::A(a)) => (Some(a), self.b.next()),
            Some(Peeked::B(b)) => (self.a.next(), Some(b)),
            None => (self.a.next(), self.b.next()),
        };

        match (a_next, b_next) {
            (Some(a), Some(b)) => match a.cmp(&b) {
                Less => {
                    self.peeked = Some(Peeked::B(b));
                    (Some(a), None)
                }
                Greater => {
                    self.peeked = Some(Peeked::A(a));
                    (None, Some(b))
                }
                Equal => (Some(a), Some(b)),
            },
            other => other,
        }
    }
}

impl<T> OSTreeSet<T> {
    /// Makes a new, empty `OSTreeSet`.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> OSTreeSet<T> {
        OSTreeSet { map: OSTreeMap::new() }
    }

    /// Returns the number of elements in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Gets an iterator that visits the elements in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set = OSTreeSet::from([3, 1, 2]);
    /// let mut set_iter = set.iter();
    /// assert_eq!(set_iter.next(), Some(&1));
    /// assert_eq!(set_iter.next_back(), Some(&3));
    /// assert_eq!(set_iter.next(), Some(&2));
    /// assert_eq!(set_iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { iter: self.map.keys() }
    }

    /// Returns the smallest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty.
    pub fn first(&self) -> Result<&T, TreeError> {
        self.map.first().map(|(k, ())| k)
    }

    /// Returns the largest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty.
    pub fn last(&self) -> Result<&T, TreeError> {
        self.map.last().map(|(k, ())| k)
    }
}

impl<T: Ord> OSTreeSet<T> {
    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let mut set = OSTreeSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Removes a value from the set. Returns whether the value was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove(value).is_some()
    }

    /// Removes and returns the value in the set equal to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.remove_entry(value).map(|(k, ())| k)
    }

    /// Returns `true` if the set contains an element equal to the value.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.contains_key(value)
    }

    /// Returns a reference to the element in the set, if any, that is equal to the
    /// value.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.get_key_value(value).map(|(k, ())| k)
    }

    /// Removes the first element from the set and returns it, if any.
    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(k, ())| k)
    }

    /// Removes the last element from the set and returns it, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(k, ())| k)
    }

    /// Clears the set, removing all elements.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Retains only the elements specified by the predicate, visiting them in
    /// ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let mut set = OSTreeSet::from([1, 2, 3, 4, 5, 6]);
    /// set.retain(|&k| k % 2 == 0);
    /// assert!(set.iter().eq([2, 4, 6].iter()));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|k, _| f(k));
    }

    /// Returns the greatest element strictly less than `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty, [`TreeError::NotFound`] if
    /// no element qualifies.
    pub fn lower<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.lower(value).map(|(k, ())| k)
    }

    /// Returns the greatest element less than or equal to `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty, [`TreeError::NotFound`] if
    /// no element qualifies.
    pub fn floor<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.floor(value).map(|(k, ())| k)
    }

    /// Returns the least element strictly greater than `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty, [`TreeError::NotFound`] if
    /// no element qualifies.
    pub fn higher<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.higher(value).map(|(k, ())| k)
    }

    /// Returns the least element greater than or equal to `value`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty, [`TreeError::NotFound`] if
    /// no element qualifies.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeSet, TreeError};
    ///
    /// let set = OSTreeSet::from([10, 20]);
    /// assert_eq!(set.ceiling(&15), Ok(&20));
    /// assert_eq!(set.ceiling(&25), Err(TreeError::NotFound));
    /// ```
    pub fn ceiling<Q>(&self, value: &Q) -> Result<&T, TreeError>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.ceiling(value).map(|(k, ())| k)
    }

    /// Returns `true` if `self` has no elements in common with `other`.
    ///
    /// The smaller set drives the scan; each of its elements is looked up in the
    /// larger one.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let a = OSTreeSet::from([1, 2, 3]);
    /// let mut b = OSTreeSet::new();
    /// assert!(a.is_disjoint(&b));
    /// b.insert(4);
    /// assert!(a.is_disjoint(&b));
    /// b.insert(1);
    /// assert!(!a.is_disjoint(&b));
    /// ```
    #[must_use]
    pub fn is_disjoint(&self, other: &OSTreeSet<T>) -> bool {
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        !small.iter().any(|value| large.contains(value))
    }

    /// Returns `true` if every element of `self` is in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let sup = OSTreeSet::from([1, 2, 3]);
    /// assert!(OSTreeSet::from([1, 3]).is_subset(&sup));
    /// assert!(!OSTreeSet::from([1, 4]).is_subset(&sup));
    /// ```
    #[must_use]
    pub fn is_subset(&self, other: &OSTreeSet<T>) -> bool {
        self.len() <= other.len() && self.iter().all(|value| other.contains(value))
    }

    /// Returns `true` if every element of `other` is in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &OSTreeSet<T>) -> bool {
        other.is_subset(self)
    }
}

impl<T: Clone + Ord> OSTreeSet<T> {
    /// Collects the merge of both sets, keeping the items `keep` accepts given which
    /// sides hold them.
    fn merged(&self, other: &OSTreeSet<T>, keep: fn(bool, bool) -> bool) -> OSTreeSet<T> {
        let mut merge = MergeIterInner::new(self.iter(), other.iter());
        let mut result = OSTreeSet::new();
        loop {
            let (a, b) = merge.nexts();
            let Some(value) = a.or(b) else {
                break;
            };
            if keep(a.is_some(), b.is_some()) {
                result.insert(value.clone());
            }
        }
        trace!(left = self.len(), right = other.len(), len = result.len(), "set algebra built a new set");
        result
    }

    /// Returns a new set with the elements in `self` or `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let a = OSTreeSet::from([1, 2]);
    /// let b = OSTreeSet::from([2, 3]);
    /// assert!(a.union(&b).into_iter().eq([1, 2, 3]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O((n + m) log(n + m))
    #[must_use]
    pub fn union(&self, other: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.merged(other, |_, _| true)
    }

    /// Returns a new set with the elements in both `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.merged(other, |in_self, in_other| in_self && in_other)
    }

    /// Returns a new set with the elements in `self` but not in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let a = OSTreeSet::from([1, 2, 3]);
    /// let b = OSTreeSet::from([2, 3, 4]);
    /// assert!(a.difference(&b).into_iter().eq([1]));
    /// ```
    #[must_use]
    pub fn difference(&self, other: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.merged(other, |in_self, in_other| in_self && !in_other)
    }

    /// Returns a new set with the elements in exactly one of `self` and `other`.
    #[must_use]
    pub fn symmetric_difference(&self, other: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.merged(other, |in_self, in_other| in_self != in_other)
    }
}

impl<T: Hash> Hash for OSTreeSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<T: PartialEq> PartialEq for OSTreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map.eq(&other.map)
    }
}

impl<T: Eq> Eq for OSTreeSet<T> {}

impl<T: PartialOrd> PartialOrd for OSTreeSet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.map.partial_cmp(&other.map)
    }
}

impl<T: Ord> Ord for OSTreeSet<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.map.cmp(&other.map)
    }
}

impl<T: Clone + Ord> Clone for OSTreeSet<T> {
    fn clone(&self) -> Self {
        OSTreeSet { map: self.map.clone() }
    }
}

impl<T: fmt::Debug> fmt::Debug for OSTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for OSTreeSet<T> {
    fn default() -> Self {
        OSTreeSet::new()
    }
}

impl<T: Ord> FromIterator<T> for OSTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OSTreeSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for OSTreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for OSTreeSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord + Clone> Sub<&OSTreeSet<T>> for &OSTreeSet<T> {
    type Output = OSTreeSet<T>;

    /// Returns the difference of `self` and `rhs` as a new `OSTreeSet<T>`.
    fn sub(self, rhs: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.difference(rhs)
    }
}

impl<T: Ord + Clone> BitXor<&OSTreeSet<T>> for &OSTreeSet<T> {
    type Output = OSTreeSet<T>;

    /// Returns the symmetric difference of `self` and `rhs` as a new `OSTreeSet<T>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let a = OSTreeSet::from([1, 2]);
    /// let b = OSTreeSet::from([2, 3]);
    /// assert_eq!(&a ^ &b, OSTreeSet::from([1, 3]));
    /// ```
    fn bitxor(self, rhs: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.symmetric_difference(rhs)
    }
}

impl<T: Ord + Clone> BitAnd<&OSTreeSet<T>> for &OSTreeSet<T> {
    type Output = OSTreeSet<T>;

    /// Returns the intersection of `self` and `rhs` as a new `OSTreeSet<T>`.
    fn bitand(self, rhs: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.intersection(rhs)
    }
}

impl<T: Ord + Clone> BitOr<&OSTreeSet<T>> for &OSTreeSet<T> {
    type Output = OSTreeSet<T>;

    /// Returns the union of `self` and `rhs` as a new `OSTreeSet<T>`.
    fn bitor(self, rhs: &OSTreeSet<T>) -> OSTreeSet<T> {
        self.union(rhs)
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for OSTreeSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<T: Ord> IntoIterator for OSTreeSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the `OSTreeSet`'s contents in ascending order.
    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            iter: self.map.into_keys(),
        }
    }
}

impl<'a, T> IntoIterator for &'a OSTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.iter.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            iter: self.iter.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.iter.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.iter.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.iter.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.iter).finish()
    }
}
