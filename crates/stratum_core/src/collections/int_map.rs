//! Open-addressed integer map.
//!
//! [`IntMap`] maps `u64` keys to `u64` values with linear probing over a
//! power-of-two table. It backs name lookups by storing [`hash_str`] of a
//! name as the key, so a string lookup costs one hash plus a short probe.
//!
//! # Design
//!
//! - The slot of a key is `key & (capacity - 1)`; keys are expected to be
//!   hashes already.
//! - [`INVALID_KEY`] (`u64::MAX`) marks an empty slot and cannot be stored.
//! - The table doubles (rehashing every entry) before the load factor would
//!   exceed one half.
//! - Removal uses backward-shift deletion, so probe chains stay intact
//!   without tombstones.

const DEFAULT_CAPACITY: usize = 32;

/// Marks an empty slot. Never a valid key.
pub const INVALID_KEY: u64 = u64::MAX;

const HASH_SEED: u64 = 5381;

/// Hashes a name into an [`IntMap`] key.
///
/// Computed from the last byte backwards as `h = byte + 33 * h`, starting
/// from 5381. Never returns [`INVALID_KEY`].
#[must_use]
pub fn hash_str(name: &str) -> u64 {
    let hash = name
        .bytes()
        .rev()
        .fold(HASH_SEED, |hash, byte| u64::from(byte).wrapping_add(hash.wrapping_mul(33)));
    if hash == INVALID_KEY { hash ^ 1 } else { hash }
}

/// Integer-to-integer hash map with linear probing.
#[derive(Debug, Clone)]
pub struct IntMap {
    keys: Box<[u64]>,
    values: Box<[u64]>,
    len: usize,
}

impl Default for IntMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a map whose table holds at least `capacity` slots (rounded up
    /// to a power of two).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        Self {
            keys: vec![INVALID_KEY; capacity].into_boxed_slice(),
            values: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Inserts a new entry. Returns `false` (and logs) if `key` is already
    /// present or is [`INVALID_KEY`]; the existing value is left untouched.
    pub fn insert(&mut self, key: u64, value: u64) -> bool {
        if key == INVALID_KEY {
            log::error!("IntMap: INVALID_KEY cannot be inserted");
            return false;
        }
        if (self.len + 1) * 2 > self.capacity() {
            self.grow();
        }
        match self.probe(key) {
            Ok(_) => {
                log::warn!("IntMap: key {key:#x} already present");
                false
            }
            Err(slot) => {
                self.keys[slot] = key;
                self.values[slot] = value;
                self.len += 1;
                true
            }
        }
    }

    /// Inserts or overwrites, returning the previous value.
    pub fn replace(&mut self, key: u64, value: u64) -> Option<u64> {
        if let Ok(slot) = self.probe(key) {
            return Some(std::mem::replace(&mut self.values[slot], value));
        }
        self.insert(key, value);
        None
    }

    #[must_use]
    pub fn get(&self, key: u64) -> Option<u64> {
        self.probe(key).ok().map(|slot| self.values[slot])
    }

    #[must_use]
    pub fn contains_key(&self, key: u64) -> bool {
        self.probe(key).is_ok()
    }

    /// Removes `key`. A missing key is logged as an error.
    pub fn remove(&mut self, key: u64) -> Option<u64> {
        let Ok(slot) = self.probe(key) else {
            log::error!("IntMap: remove of missing key {key:#x}");
            return None;
        };
        let value = self.values[slot];
        self.erase_slot(slot);
        self.len -= 1;
        Some(value)
    }

    pub fn clear(&mut self) {
        self.keys.fill(INVALID_KEY);
        self.len = 0;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Iterates entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter(|(key, _)| **key != INVALID_KEY)
            .map(|(key, value)| (*key, *value))
    }

    #[inline]
    fn mask(&self) -> usize {
        self.keys.len() - 1
    }

    #[inline]
    fn home_slot(&self, key: u64) -> usize {
        (key as usize) & self.mask()
    }

    /// `Ok(slot)` holding `key`, or `Err(slot)` of the empty slot ending its
    /// probe chain.
    fn probe(&self, key: u64) -> Result<usize, usize> {
        let mask = self.mask();
        let mut slot = self.home_slot(key);
        loop {
            match self.keys[slot] {
                k if k == key && key != INVALID_KEY => return Ok(slot),
                INVALID_KEY => return Err(slot),
                _ => slot = (slot + 1) & mask,
            }
        }
    }

    fn erase_slot(&mut self, slot: usize) {
        let mask = self.mask();
        let mut hole = slot;
        let mut next = (slot + 1) & mask;
        while self.keys[next] != INVALID_KEY {
            let home = self.home_slot(self.keys[next]);
            // Shift back unless `home` lies cyclically within (hole, next].
            let stays = if hole <= next {
                hole < home && home <= next
            } else {
                hole < home || home <= next
            };
            if !stays {
                self.keys[hole] = self.keys[next];
                self.values[hole] = self.values[next];
                hole = next;
            }
            next = (next + 1) & mask;
        }
        self.keys[hole] = INVALID_KEY;
    }

    fn grow(&mut self) {
        let old_keys = std::mem::take(&mut self.keys);
        let old_values = std::mem::take(&mut self.values);
        let capacity = old_keys.len() * 2;
        self.keys = vec![INVALID_KEY; capacity].into_boxed_slice();
        self.values = vec![0; capacity].into_boxed_slice();

        for (key, value) in old_keys.iter().zip(old_values.iter()) {
            if *key != INVALID_KEY {
                if let Err(slot) = self.probe(*key) {
                    self.keys[slot] = *key;
                    self.values[slot] = *value;
                }
            }
        }
        log::debug!("IntMap grown to {capacity} slots");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_insert_keeps_first_value() {
        let mut map = IntMap::new();
        assert!(map.insert(7, 1));
        assert!(!map.insert(7, 2));
        assert_eq!(map.get(7), Some(1));
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let mut map = IntMap::new();
        assert!(!map.insert(INVALID_KEY, 3));
        assert!(map.is_empty());
        assert_eq!(map.get(INVALID_KEY), None);
    }

    #[test]
    fn test_growth_keeps_every_entry() {
        let mut map = IntMap::with_capacity(4);
        for key in 0..100u64 {
            assert!(map.insert(key * 7, key));
        }
        assert!(map.capacity() >= 200);
        for key in 0..100u64 {
            assert_eq!(map.get(key * 7), Some(key));
        }
    }

    #[test]
    fn test_remove_preserves_colliding_chain() {
        let mut map = IntMap::with_capacity(8);
        // 1, 17 and 33 all hash to slot 1 of an 8-slot table.
        map.insert(1, 10);
        map.insert(17, 20);
        map.insert(33, 30);
        assert_eq!(map.remove(1), Some(10));
        assert_eq!(map.get(17), Some(20));
        assert_eq!(map.get(33), Some(30));
        assert_eq!(map.remove(1), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_chain_wrapping_the_table_end() {
        let mut map = IntMap::with_capacity(16);
        map.insert(15, 1);
        map.insert(31, 2);
        map.insert(47, 3);
        map.remove(15);
        assert_eq!(map.get(31), Some(2));
        assert_eq!(map.get(47), Some(3));
        map.remove(31);
        assert_eq!(map.get(47), Some(3));
    }

    #[test]
    fn test_replace_overwrites() {
        let mut map = IntMap::new();
        assert_eq!(map.replace(5, 1), None);
        assert_eq!(map.replace(5, 2), Some(1));
        assert_eq!(map.get(5), Some(2));
    }

    #[test]
    fn test_hash_str_matches_recurrence() {
        assert_eq!(hash_str(""), 5381);
        assert_eq!(hash_str("a"), 97 + 33 * 5381);
        assert_eq!(hash_str("ab"), 97 + 33 * (98 + 33 * 5381));
        assert_ne!(hash_str("albedo"), hash_str("normal"));
    }
}
