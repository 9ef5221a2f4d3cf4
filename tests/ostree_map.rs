use std::collections::BTreeMap;

use avl_ost::{MapEntry, OSTreeMap, Rank, TreeError, Unwatched, Watcher};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

fn key_strategy() -> impl Strategy<Value = i64> {
    // Smaller than TEST_SIZE so that keys collide.
    -1_000i64..1_000i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    -1_000i64..1_000i64
}

/// Walks the tree through its public read-only view and asserts the AVL shape.
/// Returns `(height, size)`.
fn check_shape<K: Ord, V>(entry: Option<MapEntry<'_, K, V>>) -> (usize, usize) {
    let Some(entry) = entry else {
        return (0, 0);
    };
    if let Some(left) = entry.left() {
        assert!(left.key() < entry.key(), "left child out of order");
    }
    if let Some(right) = entry.right() {
        assert!(right.key() > entry.key(), "right child out of order");
    }
    let (left_height, left_size) = check_shape(entry.left());
    let (right_height, right_size) = check_shape(entry.right());
    assert!(left_height.abs_diff(right_height) <= 1, "unbalanced node");
    assert_eq!(entry.height(), 1 + left_height.max(right_height));
    assert_eq!(entry.subtree_len(), 1 + left_size + right_size);
    (entry.height(), entry.subtree_len())
}

fn ascending(n: i32) -> OSTreeMap<i32, i32> {
    let mut map = OSTreeMap::new();
    for key in 0..n {
        map.insert(key, key * 10);
    }
    map
}

/// Sum of values in every subtree, keyed by the subtree root.
#[derive(Clone, Default)]
struct SubtreeSums(BTreeMap<i64, i64>);

impl SubtreeSums {
    fn of(&self, entry: Option<MapEntry<'_, i64, i64>>) -> i64 {
        entry.map_or(0, |e| self.0[e.key()])
    }
}

impl Watcher<i64, i64> for SubtreeSums {
    fn watch(
        &mut self,
        node: MapEntry<'_, i64, i64>,
        left: Option<MapEntry<'_, i64, i64>>,
        right: Option<MapEntry<'_, i64, i64>>,
    ) {
        let sum = node.value() + self.of(left) + self.of(right);
        self.0.insert(*node.key(), sum);
    }

    fn unlink(&mut self, key: &i64) {
        self.0.remove(key);
    }

    fn reset(&mut self) {
        self.0.clear();
    }
}

/// Records the shape each key had when it was last watched, and asserts that every
/// child handed to `watch` was already watched in its current shape.
#[derive(Clone, Default)]
struct BottomUp(BTreeMap<i64, (usize, usize)>);

impl BottomUp {
    fn assert_settled(&self, child: Option<MapEntry<'_, i64, i64>>) -> (usize, usize) {
        let Some(child) = child else {
            return (0, 0);
        };
        let live = (child.height(), child.subtree_len());
        assert_eq!(self.0.get(child.key()), Some(&live), "child {} watched after its parent", child.key());
        live
    }
}

impl Watcher<i64, i64> for BottomUp {
    fn watch(
        &mut self,
        node: MapEntry<'_, i64, i64>,
        left: Option<MapEntry<'_, i64, i64>>,
        right: Option<MapEntry<'_, i64, i64>>,
    ) {
        let (left_height, left_size) = self.assert_settled(left);
        let (right_height, right_size) = self.assert_settled(right);
        assert_eq!(node.height(), 1 + left_height.max(right_height));
        assert_eq!(node.subtree_len(), 1 + left_size + right_size);
        self.0.insert(*node.key(), (node.height(), node.subtree_len()));
    }

    fn unlink(&mut self, key: &i64) {
        self.0.remove(key);
    }

    fn reset(&mut self) {
        self.0.clear();
    }
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    GetKeyValue(i64),
    First,
    Last,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => key_strategy().prop_map(MapOp::GetKeyValue),
        1 => Just(MapOp::First),
        1 => Just(MapOp::Last),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both OSTreeMap and BTreeMap and
    /// asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut os_map: OSTreeMap<i64, i64> = OSTreeMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(os_map.insert(*k, *v), bt_map.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(os_map.remove(k), bt_map.remove(k), "remove({})", k);
                    prop_assert!(!os_map.contains_key(k));
                }
                MapOp::Get(k) => prop_assert_eq!(os_map.get(k), bt_map.get(k), "get({})", k),
                MapOp::ContainsKey(k) => prop_assert_eq!(os_map.contains_key(k), bt_map.contains_key(k)),
                MapOp::GetKeyValue(k) => prop_assert_eq!(os_map.get_key_value(k), bt_map.get_key_value(k)),
                MapOp::First => prop_assert_eq!(os_map.first().ok(), bt_map.first_key_value()),
                MapOp::Last => prop_assert_eq!(os_map.last().ok(), bt_map.last_key_value()),
                MapOp::PopFirst => prop_assert_eq!(os_map.pop_first(), bt_map.pop_first()),
                MapOp::PopLast => prop_assert_eq!(os_map.pop_last(), bt_map.pop_last()),
            }
            prop_assert_eq!(os_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(os_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }

        check_shape(os_map.root());
        prop_assert!(os_map.iter().eq(bt_map.iter()));
    }

    /// Every removal keeps the tree balanced, not just the final state.
    #[test]
    fn shape_holds_after_each_removal(
        keys in proptest::collection::btree_set(key_strategy(), 1..300),
        order in proptest::collection::vec(any::<prop::sample::Index>(), 1..300),
    ) {
        let mut map: OSTreeMap<i64, ()> = keys.iter().map(|&k| (k, ())).collect();
        let keys: Vec<i64> = keys.into_iter().collect();
        for pick in order {
            let key = keys[pick.index(keys.len())];
            let before = map.len();
            let was_present = map.contains_key(&key);
            map.remove(&key);
            prop_assert_eq!(map.len(), before - usize::from(was_present));
            check_shape(map.root());
        }
    }

    #[test]
    fn iter_is_double_ended_and_exact(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        prop_assert_eq!(os_map.iter().len(), bt_map.len());
        prop_assert!(os_map.iter().rev().eq(bt_map.iter().rev()));
        prop_assert!(os_map.keys().eq(bt_map.keys()));
        prop_assert!(os_map.values().eq(bt_map.values()));

        // Alternate ends until they meet.
        let mut iter = os_map.iter();
        let mut model = bt_map.iter();
        loop {
            let front = iter.next();
            prop_assert_eq!(front, model.next());
            let back = iter.next_back();
            prop_assert_eq!(back, model.next_back());
            if front.is_none() || back.is_none() {
                break;
            }
        }
    }

    #[test]
    fn into_iter_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        prop_assert!(os_map.clone().into_keys().eq(bt_map.clone().into_keys()));
        prop_assert!(os_map.clone().into_values().eq(bt_map.clone().into_values()));
        prop_assert!(os_map.into_iter().eq(bt_map));
    }

    #[test]
    fn retain_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        os_map.retain(|k, v| {
            *v += 1;
            k % 3 != 0
        });
        bt_map.retain(|k, v| {
            *v += 1;
            k % 3 != 0
        });
        prop_assert!(os_map.iter().eq(bt_map.iter()));
        check_shape(os_map.root());
    }

    #[test]
    fn iter_mut_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        for ((_, os_v), (_, bt_v)) in os_map.iter_mut().zip(bt_map.iter_mut()) {
            *os_v = os_v.wrapping_mul(3);
            *bt_v = bt_v.wrapping_mul(3);
        }
        for value in os_map.values_mut() {
            *value -= 1;
        }
        for value in bt_map.values_mut() {
            *value -= 1;
        }
        if let Some(&key) = bt_map.keys().next() {
            *os_map.get_mut(&key).unwrap() = 0;
            *bt_map.get_mut(&key).unwrap() = 0;
        }
        prop_assert!(os_map.iter().eq(bt_map.iter()));
    }

    #[test]
    fn clone_eq_and_ord_match_btreemap(
        entries_a in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE / 4),
        entries_b in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE / 4),
    ) {
        let os_a: OSTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let os_b: OSTreeMap<i64, i64> = entries_b.iter().copied().collect();
        let bt_a: BTreeMap<i64, i64> = entries_a.iter().copied().collect();
        let bt_b: BTreeMap<i64, i64> = entries_b.iter().copied().collect();

        let copy = os_a.clone();
        prop_assert_eq!(&copy, &os_a);
        check_shape(copy.root());
        prop_assert_eq!(os_a == os_b, bt_a == bt_b);
        prop_assert_eq!(os_a.cmp(&os_b), bt_a.cmp(&bt_b));
    }
}

// ─── Order statistics and neighbors ──────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn rank_and_select_match_sorted_vec(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();
        let sorted: Vec<(&i64, &i64)> = bt_map.iter().collect();

        for (position, &(key, value)) in sorted.iter().enumerate() {
            prop_assert_eq!(os_map.select(position + 1), Ok((key, value)));
            prop_assert_eq!(os_map.rank(key), position + 1);
            prop_assert_eq!(&os_map[Rank(position + 1)], value);
            // Round trip.
            prop_assert_eq!(os_map.select(os_map.rank(key)).map(|(k, _)| k), Ok(key));
        }
        let len = sorted.len();
        prop_assert_eq!(os_map.select(0), Err(TreeError::OutOfRange { index: 0, len }));
        prop_assert_eq!(os_map.select(len + 1), Err(TreeError::OutOfRange { index: len + 1, len }));
    }

    #[test]
    fn rank_of_absent_keys_counts_smaller_keys(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        probes in proptest::collection::vec(-1_200i64..1_200, 100),
    ) {
        let os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();
        for probe in probes {
            prop_assert_eq!(os_map.rank(&probe), bt_map.range(..=probe).count());
        }
    }

    #[test]
    fn neighbors_match_btreemap_ranges(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE),
        probes in proptest::collection::vec(-1_200i64..1_200, 100),
    ) {
        let os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();
        for probe in probes {
            prop_assert_eq!(os_map.lower(&probe), bt_map.range(..probe).next_back().ok_or(TreeError::NotFound));
            prop_assert_eq!(os_map.floor(&probe), bt_map.range(..=probe).next_back().ok_or(TreeError::NotFound));
            prop_assert_eq!(os_map.higher(&probe), bt_map.range(probe + 1..).next().ok_or(TreeError::NotFound));
            prop_assert_eq!(os_map.ceiling(&probe), bt_map.range(probe..).next().ok_or(TreeError::NotFound));
        }
    }

    #[test]
    fn head_and_tail_copy_the_extremes(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), 0..TEST_SIZE),
        n in 0usize..TEST_SIZE,
    ) {
        let os_map: OSTreeMap<i64, i64> = entries.iter().copied().collect();
        let bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        let head = os_map.head_map(n);
        let tail = os_map.tail_map(n);
        prop_assert!(head.iter().eq(bt_map.iter().take(n)));
        prop_assert!(tail.iter().eq(bt_map.iter().skip(bt_map.len().saturating_sub(n))));
        check_shape(head.root());
        check_shape(tail.root());
        // Copies, not views.
        prop_assert_eq!(os_map.len(), bt_map.len());
    }
}

// ─── Watchers ────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// The root's aggregate always equals the sum of all values, across inserts,
    /// overwrites, removals, pops and clones.
    #[test]
    fn watched_sums_follow_every_mutation(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map: OSTreeMap<i64, i64, SubtreeSums> = OSTreeMap::with_watcher(SubtreeSums::default());
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    map.insert(*k, *v);
                    model.insert(*k, *v);
                }
                MapOp::Remove(k) => {
                    map.remove(k);
                    model.remove(k);
                }
                MapOp::PopFirst => {
                    map.pop_first();
                    model.pop_first();
                }
                MapOp::PopLast => {
                    map.pop_last();
                    model.pop_last();
                }
                _ => {}
            }
            prop_assert_eq!(map.watcher().of(map.root()), model.values().sum::<i64>());
            prop_assert_eq!(map.watcher().0.len(), map.len());
        }

        let copy = map.clone();
        prop_assert_eq!(copy.watcher().of(copy.root()), model.values().sum::<i64>());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Every `watch` call sees children whose status is already final, and the
    /// recorded shapes match the live tree after each operation.
    #[test]
    fn children_are_watched_before_their_parent(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut map: OSTreeMap<i64, i64, BottomUp> = OSTreeMap::with_watcher(BottomUp::default());
        let mut model: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    map.insert(*k, *v);
                    model.insert(*k, *v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(map.remove(k), model.remove(k));
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(map.pop_first(), model.pop_first());
                }
                MapOp::PopLast => {
                    prop_assert_eq!(map.pop_last(), model.pop_last());
                }
                _ => {}
            }
            prop_assert_eq!(map.watcher().assert_settled(map.root()), check_shape(map.root()));
            prop_assert!(map.watcher().0.keys().eq(model.keys()));
        }
    }
}

#[test]
fn update_values_refreshes_watched_aggregates() {
    let mut map: OSTreeMap<i64, i64, SubtreeSums> = OSTreeMap::with_watcher(SubtreeSums::default());
    for key in 1..=100 {
        map.insert(key, key);
    }
    map.update_values(|_, v| *v *= 2);
    assert_eq!(map.watcher().of(map.root()), 10_100);

    map.retain(|k, _| k % 2 == 0);
    assert_eq!(map.watcher().of(map.root()), 2 * (2..=100).step_by(2).sum::<i64>());
    assert_eq!(map.watcher().0.len(), 50);
}

#[test]
fn head_map_gets_its_own_watcher() {
    let mut map: OSTreeMap<i64, i64, SubtreeSums> = OSTreeMap::with_watcher(SubtreeSums::default());
    for key in 0..10 {
        map.insert(key, 1);
    }
    let head = map.head_map(4);
    assert_eq!(head.watcher().of(head.root()), 4);
    assert_eq!(map.watcher().of(map.root()), 10);
}

#[test]
fn clear_resets_the_watcher() {
    let mut map: OSTreeMap<i64, i64, SubtreeSums> = OSTreeMap::with_watcher(SubtreeSums::default());
    map.extend([(1, 1), (2, 2)]);
    map.clear();
    assert!(map.watcher().0.is_empty());
    assert_eq!(map.root().map(|e| *e.key()), None);
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[test]
fn configuration_is_rejected_once_populated() {
    let mut map: OSTreeMap<i32, i32> = OSTreeMap::new();
    assert_eq!(map.set_factory(|| 1), Ok(()));
    assert_eq!(map.set_watcher(Unwatched), Ok(Unwatched));

    map.insert(1, 1);
    assert!(matches!(map.set_factory(|| 2), Err(TreeError::Usage(_))));
    assert!(matches!(map.set_watcher(Unwatched), Err(TreeError::Usage(_))));
    // The rejected factory is not installed.
    assert_eq!(map.get_or_create(5), Some(&1));
}

#[test]
fn factory_is_only_consulted_by_get_or_create() {
    let mut map: OSTreeMap<&str, Vec<u8>> = OSTreeMap::with_factory(Vec::new);
    assert_eq!(map.get(&"a"), None);
    assert!(map.is_empty());
    assert_eq!(map.get_or_create("a"), Some(&Vec::new()));
    assert_eq!(map.len(), 1);

    let copy = map.head_map(1);
    assert!(copy.factory().is_some());
}

#[test]
fn get_or_variants() {
    let mut map = OSTreeMap::from([(1, "one")]);
    assert_eq!(*map.get_or(&2, &"none"), "none");
    assert_eq!(*map.get_or_insert(1, "uno"), "one");
    assert_eq!(*map.get_or_insert(2, "two"), "two");
    assert_eq!(*map.get_or_insert_with(3, || "three"), "three");
    assert_eq!(map.len(), 3);
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn empty_map_reports_empty_collection() {
    let map: OSTreeMap<i32, i32> = OSTreeMap::new();
    assert_eq!(map.first(), Err(TreeError::EmptyCollection));
    assert_eq!(map.last(), Err(TreeError::EmptyCollection));
    assert_eq!(map.select(1), Err(TreeError::EmptyCollection));
    assert_eq!(map.lower(&0), Err(TreeError::EmptyCollection));
    assert_eq!(map.higher(&0), Err(TreeError::EmptyCollection));
    assert_eq!(map.floor(&0), Err(TreeError::EmptyCollection));
    assert_eq!(map.ceiling(&0), Err(TreeError::EmptyCollection));
    assert_eq!(map.rank(&0), 0);
}

#[test]
#[should_panic(expected = "rank out of bounds")]
fn index_by_rank_zero_panics() {
    let map = ascending(3);
    let _ = map[Rank(0)];
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_by_missing_key_panics() {
    let map = ascending(3);
    let _ = map[&7];
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn scenario_neighbors_on_ascending_keys() {
    let map = ascending(10);
    assert_eq!(map.floor(&11).map(|(k, _)| *k), Ok(9));
    assert_eq!(map.lower(&7).map(|(k, _)| *k), Ok(6));
    assert_eq!(map.higher(&7).map(|(k, _)| *k), Ok(8));
    assert_eq!(map.ceiling(&-1).map(|(k, _)| *k), Ok(0));
}

#[test]
fn scenario_head_and_tail_maps() {
    let map = ascending(10);
    assert_eq!(map.head_map(4).into_keys().collect::<Vec<_>>(), [0, 1, 2, 3]);
    assert_eq!(map.tail_map(4).into_keys().collect::<Vec<_>>(), [6, 7, 8, 9]);
}

#[test]
fn scenario_delete_lower_half() {
    let mut map = ascending(10);
    for key in 0..5 {
        assert!(map.remove(&key).is_some());
    }
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [5, 6, 7, 8, 9]);
    check_shape(map.root());
}

#[test]
fn scenario_default_factory() {
    let mut map = OSTreeMap::with_factory(|| 100);
    assert_eq!(map.get_or_create(1), Some(&100));
    assert!(map.contains_key(&1));
    assert_eq!(map.len(), 1);
}

#[test]
fn overwrite_keeps_len_and_last_value_wins() {
    let mut map = ascending(5);
    assert_eq!(map.insert(3, -1), Some(30));
    assert_eq!(map.insert(3, -2), Some(-1));
    assert_eq!(map.len(), 5);
    assert_eq!(map[&3], -2);
}

#[test]
fn index_mut_by_rank_updates_value() {
    let mut map = ascending(5);
    map[Rank(5)] = 0;
    assert_eq!(map.get(&4), Some(&0));
    assert_eq!(format!("{:?}", map.head_map(2)), "{0: 0, 1: 10}");
}

#[test]
fn capacity_is_reserved_up_front() {
    let map: OSTreeMap<u8, u8> = OSTreeMap::with_capacity(64);
    assert!(map.capacity() >= 64);
    assert!(map.is_empty());
}

// ─── Iteration ───────────────────────────────────────────────────────────────

#[test]
fn deep_trees_iterate_from_both_ends() {
    let map = ascending(100_000);
    let height = map.root().map_or(0, |root| root.height());
    assert!((17..=24).contains(&height), "height {height}");

    assert!(map.keys().copied().eq(0..100_000));
    assert!(map.keys().rev().copied().eq((0..100_000).rev()));

    let mut iter = map.iter();
    for key in 0..40_000 {
        assert_eq!(iter.next(), Some((&key, &(key * 10))));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(99_999 - key));
    }
    let rest = iter.clone();
    assert_eq!(rest.len(), 20_000);
    assert!(rest.map(|(k, _)| *k).eq(40_000..60_000));
    assert_eq!(iter.count(), 20_000);
}
