//! Chained hash table with insertion-ordered iteration.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const INITIAL_BUCKETS: usize = 16;

/// A hash table using separate chaining.
///
/// Entries live in a dense vector in insertion order; each bucket chains the
/// indices of the entries hashing to it. The bucket count doubles whenever an
/// insert would push the load factor above 3/4, so chains stay short and
/// lookups are O(1) amortized. Entries are never removed.
///
/// Hashing uses [`DefaultHasher`] with fixed keys, so bucket placement is
/// reproducible across runs.
///
/// # Examples
///
/// ```
/// use u_dispatch::store::HashTable;
///
/// let mut table = HashTable::new();
/// assert!(table.try_insert(40, "last").is_ok());
/// assert!(table.try_insert(1, "first").is_ok());
/// assert!(table.try_insert(40, "again").is_err());
///
/// assert_eq!(table.get(&40), Some(&"last"));
/// let keys: Vec<_> = table.keys().copied().collect();
/// assert_eq!(keys, vec![40, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct HashTable<K, V> {
    buckets: Vec<Vec<usize>>,
    entries: Vec<(K, V)>,
}

impl<K: Hash + Eq, V> HashTable<K, V> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::with_buckets(INITIAL_BUCKETS)
    }

    /// Creates an empty table sized for `capacity` entries without resizing.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buckets = INITIAL_BUCKETS;
        while capacity * 4 > buckets * 3 {
            buckets *= 2;
        }
        Self::with_buckets(buckets)
    }

    fn with_buckets(count: usize) -> Self {
        Self {
            buckets: vec![Vec::new(); count],
            entries: Vec::new(),
        }
    }

    /// Inserts a new entry.
    ///
    /// Returns the key and value back if the key is already present; the
    /// stored entry is left untouched.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        if self.position(&key).is_some() {
            return Err((key, value));
        }
        if (self.entries.len() + 1) * 4 > self.buckets.len() * 3 {
            self.grow();
        }
        let bucket = self.bucket_of(&key);
        self.buckets[bucket].push(self.entries.len());
        self.entries.push((key, value));
        Ok(())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.position(key).map(move |i| &mut self.entries[i].1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of buckets currently allocated.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .copied()
            .find(|&i| self.entries[i].0 == *key)
    }

    fn bucket_of(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    fn grow(&mut self) {
        let count = self.buckets.len() * 2;
        self.buckets = vec![Vec::new(); count];
        for i in 0..self.entries.len() {
            let bucket = self.bucket_of(&self.entries[i].0);
            self.buckets[bucket].push(i);
        }
    }
}

impl<K: Hash + Eq, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
