//! AVL order-statistic collections for Rust.
//!
//! This crate provides [`OSTreeMap`], [`OSTreeSet`] and [`OSMultiSet`], height-balanced
//! binary search trees that answer rank, select and neighbor queries in O(log n):
//!
//! - [`rank`](OSTreeMap::rank) - Number of keys less than or equal to a key
//! - [`select`](OSTreeMap::select) - The key at a 1-based sorted position
//! - [`lower`](OSTreeMap::lower), [`floor`](OSTreeMap::floor), [`ceiling`](OSTreeMap::ceiling),
//!   [`higher`](OSTreeMap::higher) - Nearest keys around a probe
//! - Indexing by [`Rank`] - e.g., `map[Rank(1)]` for the first value
//!
//! Maps accept a [`Watcher`], a hook called bottom-up after every node recomputation,
//! which keeps user-defined subtree aggregates consistent across rotations. The
//! multiset is built on it: a [`MultiplicityIndex`] holds per-subtree multiplicity
//! totals so that rank and select count duplicates.
//!
//! # Example
//!
//! ```
//! use avl_ost::{OSMultiSet, OSTreeMap, TreeError};
//!
//! let mut scores = OSTreeMap::new();
//! for (name, score) in [("Alice", 100), ("Bob", 85), ("Carol", 92)] {
//!     scores.insert(name, score);
//! }
//!
//! assert_eq!(scores.rank(&"Bob"), 2);
//! assert_eq!(scores.select(3), Ok((&"Carol", &92)));
//! assert_eq!(scores.select(4), Err(TreeError::OutOfRange { index: 4, len: 3 }));
//! assert_eq!(scores.floor(&"Bz"), Ok((&"Bob", &85)));
//!
//! let mut rolls = OSMultiSet::new();
//! for roll in [3, 1, 3, 6, 3] {
//!     rolls.insert(roll);
//! }
//! assert_eq!(rolls.total(), 5);
//! assert_eq!(rolls.rank(&3), 4);
//! assert_eq!(rolls.select(2), Ok(&3));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes live in one slot vector addressed by compact handles
//! - **Augmentation** - Subtree aggregates through [`Watcher`], with no tree code to fork
//!
//! # Implementation
//!
//! Every node stores its height and subtree size. Mutations descend recursively and,
//! on the way back up, recompute each node on the path, notify the watcher and apply
//! at most one single or double rotation per node.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod multiset;
pub mod ostree_map;
pub mod ostree_set;
pub mod watcher;

pub use error::TreeError;
pub use multiset::{MultiplicityIndex, OSMultiSet};
pub use order_statistic::Rank;
pub use ostree_map::OSTreeMap;
pub use ostree_set::OSTreeSet;
pub use watcher::{MapEntry, Unwatched, Watcher};
