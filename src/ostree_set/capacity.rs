use super::OSTreeSet;
use crate::OSTreeMap;

impl<T> OSTreeSet<T> {
    /// Creates an empty set with room for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeSet;
    ///
    /// let set: OSTreeSet<i32> = OSTreeSet::with_capacity(16);
    /// assert!(set.is_empty());
    /// assert!(set.capacity() >= 16);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSTreeSet {
            map: OSTreeMap::with_capacity(capacity),
        }
    }

    /// Returns the number of elements the set can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }
}
