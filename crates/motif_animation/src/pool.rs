//! Generation-stamped keyed pools
//!
//! Values live in a slot arena and are found through a hash index. Each
//! lookup stamps the entry with the pool's current generation; [`StampedPool::gc`]
//! evicts entries that have not been looked up for more than a given number of
//! generations. Removal leaves a hole in the arena that the next insert reuses.

use rustc_hash::{FxHashMap, FxHasher};
use slotmap::{new_key_type, SlotMap};
use std::hash::{Hash, Hasher};

new_key_type! {
    /// Arena slot of a pooled entry
    pub struct SlotId;
}

/// Key of an animated channel
///
/// Built from two caller-owned identifiers (typically a widget id and a
/// property id) folded into a 32-bit hash. Distinct pairs are assumed not to
/// collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u32);

impl ChannelId {
    pub fn new(owner: u32, channel: u32) -> Self {
        let mut h = FxHasher::default();
        h.write_u32(owner);
        h.write_u32(channel);
        let v = h.finish();
        Self((v ^ (v >> 32)) as u32)
    }

    /// Use a precomputed hash directly
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A pooled value with its last-seen generation
#[derive(Debug)]
struct Stamped<K, V> {
    key: K,
    last_seen: u32,
    value: V,
}

/// Keyed arena with age-based eviction
#[derive(Debug)]
pub struct StampedPool<K, V> {
    name: &'static str,
    slots: SlotMap<SlotId, Stamped<K, V>>,
    index: FxHashMap<K, SlotId>,
    generation: u32,
}

impl<K, V> StampedPool<K, V>
where
    K: Copy + Eq + Hash,
{
    /// Create an empty pool; `name` identifies it in logs
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: SlotMap::with_key(),
            index: FxHashMap::default(),
            generation: 0,
        }
    }

    /// Fetch the entry for `key`, creating it with `init` on first use.
    ///
    /// The entry is stamped with the current generation.
    pub fn get_or_insert_with(&mut self, key: K, init: impl FnOnce() -> V) -> &mut V {
        let generation = self.generation;
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.slots.insert(Stamped {
                    key,
                    last_seen: generation,
                    value: init(),
                });
                self.index.insert(key, slot);
                slot
            }
        };
        // Index and arena are only ever modified together
        let entry = &mut self.slots[slot];
        entry.last_seen = generation;
        &mut entry.value
    }

    /// Read an entry without stamping it
    pub fn peek(&self, key: &K) -> Option<&V> {
        let slot = self.index.get(key)?;
        self.slots.get(*slot).map(|e| &e.value)
    }

    /// Mutate an entry without stamping it
    pub fn peek_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = self.index.get(key)?;
        self.slots.get_mut(*slot).map(|e| &mut e.value)
    }

    /// Mutate an existing entry and stamp it
    pub fn touch(&mut self, key: &K) -> Option<&mut V> {
        let generation = self.generation;
        let slot = self.index.get(key)?;
        self.slots.get_mut(*slot).map(|e| {
            e.last_seen = generation;
            &mut e.value
        })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Remove an entry immediately
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.slots.remove(slot).map(|e| e.value)
    }

    /// Advance the generation counter; call once per frame
    pub fn begin_frame(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Remove every entry not stamped within the last `max_age` generations.
    ///
    /// Returns the number of entries removed.
    pub fn gc(&mut self, max_age: u32) -> usize {
        let generation = self.generation;
        let before = self.slots.len();
        let index = &mut self.index;
        self.slots.retain(|_, entry| {
            let keep = generation.wrapping_sub(entry.last_seen) <= max_age;
            if !keep {
                index.remove(&entry.key);
            }
            keep
        });
        let removed = before - self.slots.len();
        if removed > 0 {
            tracing::debug!(
                pool = self.name,
                removed,
                remaining = self.slots.len(),
                "collected stale entries"
            );
        }
        removed
    }

    /// Pre-size storage for `additional` more entries
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
        self.index.reserve(additional);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Visit every entry mutably; entries for which `f` returns true are stamped
    pub fn update_each(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        let generation = self.generation;
        for entry in self.slots.values_mut() {
            if f(&entry.key, &mut entry.value) {
                entry.last_seen = generation;
            }
        }
    }

    /// Iterate entries in arena order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.values().map(|e| (&e.key, &e.value))
    }
}

impl<K, V> StampedPool<K, V>
where
    K: Copy + Eq + Hash,
    V: Default,
{
    /// Fetch or default-create the entry for `key`, stamping it
    pub fn get(&mut self, key: K) -> &mut V {
        self.get_or_insert_with(key, V::default)
    }
}
