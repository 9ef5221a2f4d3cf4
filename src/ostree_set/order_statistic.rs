use core::borrow::Borrow;
use core::ops::Index;

use super::OSTreeSet;
use crate::{Rank, TreeError};

impl<T> OSTreeSet<T> {
    /// Returns the element at 1-based position `index` in sorted order.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the set is empty, otherwise
    /// [`TreeError::OutOfRange`] if `index` is outside `1..=len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set = OSTreeSet::from([10, 20, 30]);
    /// assert_eq!(set.select(2), Ok(&20));
    /// assert!(set.select(4).is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn select(&self, index: usize) -> Result<&T, TreeError> {
        self.map.select(index).map(|(k, ())| k)
    }
}

impl<T: Ord> OSTreeSet<T> {
    /// Returns the number of elements less than or equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set = OSTreeSet::from([10, 20]);
    /// assert_eq!(set.rank(&20), 2);
    /// assert_eq!(set.rank(&15), 1);
    /// ```
    pub fn rank<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.map.rank(value)
    }
}

impl<T: Clone + Ord> OSTreeSet<T> {
    /// Builds a new set with the `n` smallest elements.
    ///
    /// The cut-off is a count of elements, not a bound on their values.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set: OSTreeSet<i32> = (0..10).collect();
    /// assert!(set.head(3).into_iter().eq(0..3));
    /// assert_eq!(set.head(99), set);
    /// ```
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        OSTreeSet { map: self.map.head_map(n) }
    }

    /// Builds a new set with the `n` largest elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set: OSTreeSet<i32> = (0..10).collect();
    /// assert!(set.tail(3).into_iter().eq(7..10));
    /// ```
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        OSTreeSet { map: self.map.tail_map(n) }
    }

    /// Builds a new set with the elements `<= value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set = OSTreeSet::from([10, 20, 30]);
    /// assert!(set.head_to(&25).into_iter().eq([10, 20]));
    /// assert!(set.head_to(&20).into_iter().eq([10, 20]));
    /// ```
    #[must_use]
    pub fn head_to<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.head(self.rank(value))
    }

    /// Builds a new set with the elements `>= value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set = OSTreeSet::from([10, 20, 30]);
    /// assert!(set.tail_from(&20).into_iter().eq([20, 30]));
    /// assert!(set.tail_from(&31).is_empty());
    /// ```
    #[must_use]
    pub fn tail_from<Q>(&self, value: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let below = self.rank(value) - usize::from(self.contains(value));
        self.tail(self.len() - below)
    }
}

/// Indexes into the set by 1-based rank.
///
/// # Panics
///
/// Panics if `rank` is outside `1..=len`.
///
/// # Examples
///
/// ```
/// use avl_ost::{OSTreeSet, Rank};
///
/// let set = OSTreeSet::from([10, 20, 30]);
/// assert_eq!(set[Rank(2)], 20);
/// ```
impl<T> Index<Rank> for OSTreeSet<T> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.select(rank.0).expect("rank out of bounds")
    }
}
