/// A 1-based position in the sorted order of a map or set.
///
/// `Rank(1)` is the smallest key, `Rank(len)` the largest. This matches the value
/// returned by the collections' `rank` methods, so `map[Rank(map.rank(&k))]` is the
/// value stored under `k`.
///
/// # Examples
///
/// ```
/// use avl_ost::{OSTreeMap, Rank};
///
/// let mut map = OSTreeMap::new();
/// map.insert("a", 10);
/// map.insert("b", 20);
///
/// assert_eq!(map[Rank(1)], 10);
/// assert_eq!(map[Rank(map.rank(&"b"))], 20);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
