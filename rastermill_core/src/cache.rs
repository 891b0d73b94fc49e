//! This module provides [`TileCache`], a concurrent memoizing cache for
//! computed tiles.
//!
//! Concurrent requests for the same key share one computation: the first
//! requester runs the closure, later requesters block until the value is ready
//! and receive a clone. The cache is bounded by entry count; once the bound is
//! reached, the least recently used half of the entries is evicted.
//!
//! # Examples
//!
//! ```rust
//! use rastermill_core::TileCache;
//!
//! let cache = TileCache::<(u32, u32), u64>::with_maximum_entries(100);
//! let value = cache.get_or_compute((3, 4), || 42);
//! assert_eq!(value, 42);
//! // the closure is not run again for a cached key
//! assert_eq!(cache.get_or_compute((3, 4), || unreachable!()), 42);
//! ```

use log::trace;
use std::{
	collections::HashMap,
	fmt::Debug,
	hash::Hash,
	sync::{Arc, Mutex, OnceLock},
};

struct Slot<V> {
	cell: Arc<OnceLock<V>>,
	last_access: u64,
}

struct State<K, V> {
	slots: HashMap<K, Slot<V>>,
	last_index: u64,
}

/// A concurrent memoizing cache with an entry-count bound.
pub struct TileCache<K, V> {
	state: Mutex<State<K, V>>,
	max_entries: usize,
}

impl<K, V> TileCache<K, V>
where
	K: Clone + Eq + Hash,
	V: Clone,
{
	/// Creates a cache holding at most `max_entries` values.
	///
	/// # Panics
	/// Panics if `max_entries` is zero.
	pub fn with_maximum_entries(max_entries: usize) -> TileCache<K, V> {
		assert!(max_entries >= 1, "cache must be able to store at least one entry");
		TileCache {
			state: Mutex::new(State {
				slots: HashMap::new(),
				last_index: 0,
			}),
			max_entries,
		}
	}

	/// Returns the cached value for `key`, computing it if absent.
	///
	/// At most one invocation of `compute` runs per key at a time; concurrent
	/// requesters for the same key block until the winner's result is ready.
	pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
		let cell = {
			let mut state = self.state.lock().unwrap();
			if state.slots.len() >= self.max_entries && !state.slots.contains_key(&key) {
				Self::cleanup(&mut state.slots);
			}
			state.last_index += 1;
			let last_index = state.last_index;
			let slot = state.slots.entry(key).or_insert_with(|| Slot {
				cell: Arc::new(OnceLock::new()),
				last_access: 0,
			});
			slot.last_access = last_index;
			Arc::clone(&slot.cell)
		};
		cell.get_or_init(compute).clone()
	}

	/// Returns the cached value for `key` if it is present and completed.
	pub fn get(&self, key: &K) -> Option<V> {
		let state = self.state.lock().unwrap();
		state.slots.get(key).and_then(|slot| slot.cell.get().cloned())
	}

	pub fn len(&self) -> usize {
		self.state.lock().unwrap().slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Removes the least recently accessed half of the entries.
	fn cleanup(slots: &mut HashMap<K, Slot<V>>) {
		let mut accesses: Vec<u64> = slots.values().map(|slot| slot.last_access).collect();
		accesses.sort_unstable();
		let median = accesses[accesses.len() / 2];
		slots.retain(|_, slot| slot.last_access > median);
		trace!("tile cache cleanup, {} entries remain", slots.len());
	}
}

impl<K, V> Debug for TileCache<K, V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TileCache")
			.field("length", &self.state.lock().unwrap().slots.len())
			.field("max_entries", &self.max_entries)
			.finish()
	}
}
