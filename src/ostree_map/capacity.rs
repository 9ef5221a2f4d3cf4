use super::OSTreeMap;
use crate::raw::RawOSTreeMap;
use crate::watcher::Unwatched;

impl<K, V> OSTreeMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries before the
    /// node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map: OSTreeMap<i32, i32> = OSTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSTreeMap {
            raw: RawOSTreeMap::with_capacity(capacity, Unwatched),
            factory: None,
        }
    }
}

impl<K, V, W> OSTreeMap<K, V, W> {
    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
