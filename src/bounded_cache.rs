//! # Bounded Cache
//!
//! A small insertion-ordered cache used by the filter engine to memoize
//! filtered and mappable result sets.
//!
//! Eviction is by insertion order, not access order: reading an entry never
//! extends its life. Once stored, an entry is returned verbatim until it is
//! evicted or the cache is cleared.

use std::collections::HashMap;
use std::hash::Hash;

/// A bounded cache with O(n) eviction of the oldest insert.
///
/// For our use case (10 entries max), the linear scan for eviction
/// is acceptable and simpler than maintaining a linked list.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, CacheEntry<V>>,
    insert_counter: u64,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    inserted_at: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    /// Create a new cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity + 1),
            insert_counter: 0,
        }
    }

    /// Get a value from the cache. Does not affect eviction order.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Get a cloned value from the cache (useful when you can't hold a reference).
    pub fn get_cloned(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    /// Insert a value, evicting the oldest insert if the bound is exceeded.
    ///
    /// Replacing an existing key keeps its first insertion position.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            return;
        }

        self.insert_counter += 1;
        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: self.insert_counter,
            },
        );

        if self.entries.len() > self.capacity {
            self.evict_oldest();
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insert_counter = 0;
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the cache contains a key.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Maximum number of entries retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Evict the entry that was inserted first.
    fn evict_oldest(&mut self) {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(k, _)| k.clone());

        if let Some(key) = oldest_key {
            self.entries.remove(&key);
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Default for BoundedCache<K, V> {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut cache: BoundedCache<String, i32> = BoundedCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.get(&"a".to_string()), Some(&1));
        assert_eq!(cache.get(&"b".to_string()), Some(&2));
        assert_eq!(cache.get(&"c".to_string()), Some(&3));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_eviction_ignores_reads() {
        let mut cache: BoundedCache<String, i32> = BoundedCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        // Reading "a" must not save it
        cache.get(&"a".to_string());

        cache.insert("d".to_string(), 4);

        assert!(!cache.contains(&"a".to_string()));
        assert!(cache.contains(&"b".to_string()));
        assert!(cache.contains(&"c".to_string()));
        assert!(cache.contains(&"d".to_string()));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_eleven_inserts_keep_ten() {
        let mut cache: BoundedCache<String, usize> = BoundedCache::new(10);
        for i in 0..11 {
            cache.insert(format!("key-{}", i), i);
        }

        assert_eq!(cache.len(), 10);
        assert!(!cache.contains(&"key-0".to_string()));
        assert!(cache.contains(&"key-1".to_string()));
        assert!(cache.contains(&"key-10".to_string()));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache: BoundedCache<String, i32> = BoundedCache::new(2);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("a".to_string(), 10);
        assert_eq!(cache.get(&"a".to_string()), Some(&10));
        assert_eq!(cache.len(), 2);

        // "a" is still the oldest insert
        cache.insert("c".to_string(), 3);
        assert!(!cache.contains(&"a".to_string()));
        assert!(cache.contains(&"b".to_string()));
    }

    #[test]
    fn test_clear() {
        let mut cache: BoundedCache<String, i32> = BoundedCache::new(3);

        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        cache.clear();

        assert!(cache.is_empty());
    }
}
