use core::borrow::Borrow;

use super::OSTreeMap;
use crate::TreeError;
use crate::raw::Handle;

impl<K, V, W> OSTreeMap<K, V, W> {
    fn entry_at(&self, handle: Handle) -> (&K, &V) {
        let node = self.raw.node(handle);
        (node.key(), node.value())
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeMap, TreeError};
    ///
    /// let mut map = OSTreeMap::new();
    /// assert_eq!(map.first(), Err(TreeError::EmptyCollection));
    /// map.insert(2, "b");
    /// map.insert(1, "a");
    /// assert_eq!(map.first(), Ok((&1, &"a")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn first(&self) -> Result<(&K, &V), TreeError> {
        self.raw.first().map(|handle| self.entry_at(handle)).ok_or(TreeError::EmptyCollection)
    }

    /// Returns the entry with the largest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty.
    pub fn last(&self) -> Result<(&K, &V), TreeError> {
        self.raw.last().map(|handle| self.entry_at(handle)).ok_or(TreeError::EmptyCollection)
    }

    /// Maps the outcome of a neighbor descent to the public error contract.
    fn neighbor(&self, found: Option<Handle>) -> Result<(&K, &V), TreeError> {
        if self.is_empty() {
            return Err(TreeError::EmptyCollection);
        }
        found.map(|handle| self.entry_at(handle)).ok_or(TreeError::NotFound)
    }
}

impl<K: Ord, V, W> OSTreeMap<K, V, W> {
    /// Returns the entry with the greatest key strictly less than `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty, [`TreeError::NotFound`] if
    /// every key is `>= key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeMap, TreeError};
    ///
    /// let map = OSTreeMap::from([(10, 'a'), (20, 'b')]);
    /// assert_eq!(map.lower(&20), Ok((&10, &'a')));
    /// assert_eq!(map.lower(&10), Err(TreeError::NotFound));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn lower<Q>(&self, key: &Q) -> Result<(&K, &V), TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(self.raw.lower(key))
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty, [`TreeError::NotFound`] if
    /// every key is `> key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::OSTreeMap;
    ///
    /// let map = OSTreeMap::from([(10, 'a'), (20, 'b')]);
    /// assert_eq!(map.floor(&20), Ok((&20, &'b')));
    /// assert_eq!(map.floor(&19), Ok((&10, &'a')));
    /// ```
    pub fn floor<Q>(&self, key: &Q) -> Result<(&K, &V), TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(self.raw.floor(key))
    }

    /// Returns the entry with the least key strictly greater than `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty, [`TreeError::NotFound`] if
    /// every key is `<= key`.
    pub fn higher<Q>(&self, key: &Q) -> Result<(&K, &V), TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(self.raw.higher(key))
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty, [`TreeError::NotFound`] if
    /// every key is `< key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_ost::{OSTreeMap, TreeError};
    ///
    /// let map = OSTreeMap::from([(10, 'a'), (20, 'b')]);
    /// assert_eq!(map.ceiling(&11), Ok((&20, &'b')));
    /// assert_eq!(map.ceiling(&21), Err(TreeError::NotFound));
    /// ```
    pub fn ceiling<Q>(&self, key: &Q) -> Result<(&K, &V), TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.neighbor(self.raw.ceiling(key))
    }
}
