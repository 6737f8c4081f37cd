use std::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, BuildHasherDefault, DefaultHasher, Hash},
};

use log::{debug, trace};

use super::DictError;
use super::hash_table::{Entry, HashTable, IntoIter, Iter, IterMut};

/// Bucket count used by [`Dictionary::new`], and by tables created with zero buckets
/// once they receive their first entry
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor threshold used unless one is given at construction
pub const DEFAULT_LOAD_FACTOR: f64 = 0.8;

/// Deterministic hasher, so scan order only depends on the keys and the bucket count
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// Associative array backed by a separately chained hash table.
///
/// The table grows (doubling its bucket count and rehashing every entry) right after
/// an insertion pushes `size / capacity` above the load factor. It never shrinks.
/// The load factor belongs to the instance; tables do not share any configuration.
///
/// Iteration order (`iter`, `keys`, `key_set`, `for_each`, `Display`) is bucket-scan
/// order: neither insertion order nor sorted.
///
/// Not synchronized. Share it across threads only behind your own lock.
#[derive(Debug, Clone)]
pub struct Dictionary<K, V, S = DefaultHashBuilder> {
    table: HashTable<K, V, S>,
    load_factor: f64,
}

impl<K, V> Dictionary<K, V> {
    /// Creates an empty dictionary with [`DEFAULT_CAPACITY`] buckets
    /// and a load factor of [`DEFAULT_LOAD_FACTOR`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty dictionary with `capacity` buckets.
    ///
    /// A capacity of 0 is allowed, the buckets get allocated on the first insertion.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::new_with_buckets(capacity, DefaultHashBuilder::default()),
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    pub fn with_load_factor(load_factor: f64) -> Result<Self, DictError> {
        Self::with_capacity_and_load_factor(DEFAULT_CAPACITY, load_factor)
    }

    /// # Errors
    ///
    /// [`DictError::InvalidLoadFactor`] unless `load_factor` is finite and positive
    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Result<Self, DictError> {
        Self::with_hasher(capacity, load_factor, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for Dictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Dictionary<K, V, S> {
    /// Creates an empty dictionary hashing its keys with `hasher`
    pub fn with_hasher(capacity: usize, load_factor: f64, hasher: S) -> Result<Self, DictError> {
        if !load_factor.is_finite() || load_factor <= 0.0 {
            return Err(DictError::InvalidLoadFactor(load_factor));
        }

        Ok(Self {
            table: HashTable::new_with_buckets(capacity, hasher),
            load_factor,
        })
    }

    /// Number of key-value pairs
    pub fn size(&self) -> usize {
        self.table.items
    }

    /// Same as [`size`](Self::size)
    pub fn len(&self) -> usize {
        self.table.items
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of buckets
    pub fn capacity(&self) -> usize {
        self.table.bucket_count()
    }

    /// The resize threshold of this dictionary, not the current fill ratio
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Current `size / capacity` ratio
    pub fn load_ratio(&self) -> f64 {
        if self.capacity() == 0 {
            0f64
        } else {
            self.size() as f64 / self.capacity() as f64
        }
    }

    pub fn hasher(&self) -> &S {
        &self.table.hasher
    }

    /// Removes every entry. The bucket count stays as it is.
    pub fn clear(&mut self) -> &mut Self {
        self.table.clear();
        self
    }

    // [adapters]

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.table.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// All keys flattened bucket by bucket
    pub fn key_set(&self) -> Vec<&K> {
        self.keys().collect()
    }

    /// Runs `action` on every key, in the same order as [`key_set`](Self::key_set)
    pub fn for_each_key<F>(&self, mut action: F) -> &Self
    where
        F: FnMut(&K),
    {
        for (k, _) in self.iter() {
            action(k);
        }
        self
    }

    pub fn for_each<F>(&self, mut action: F) -> &Self
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            action(k, v);
        }
        self
    }

    /// O(n), scans every bucket
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|v| v == value)
    }
}

impl<K, V, S> Dictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts or updates, always returning `true`.
    ///
    /// An existing key gets its value overwritten in place and `size` stays the same.
    /// A new key is appended to its bucket, and if the load factor is exceeded afterwards
    /// the bucket count doubles and every entry is rehashed.
    ///
    /// # Panics
    ///
    /// Panics if growing the table fails, see [`try_put`](Self::try_put) for the
    /// fallible version.
    pub fn put(&mut self, key: K, value: V) -> bool {
        match self.try_put(key, value) {
            Ok(done) => done,
            Err(e) => panic!("dictionary resize failed: {e}"),
        }
    }

    /// Like [`put`](Self::put) but reports a failed resize instead of panicking.
    ///
    /// When the resize fails the new entry is still stored, the table just stays
    /// above its load factor.
    pub fn try_put(&mut self, key: K, value: V) -> Result<bool, DictError> {
        if self.table.bucket_count() == 0 {
            self.table.resize(DEFAULT_CAPACITY)?;
        }

        let replaced = self.table.insert(Entry { key, value });
        if replaced.is_none() && self.load_ratio() > self.load_factor {
            self.grow()?;
        }
        Ok(true)
    }

    /// [`put`](Self::put), returning the dictionary for chaining
    pub fn put_and_return(&mut self, key: K, value: V) -> &mut Self {
        self.put(key, value);
        self
    }

    /// Stores the pair only if the key is not present yet
    pub fn put_if_absent(&mut self, key: K, value: V) -> &mut Self {
        if !self.contains_key(&key) {
            self.put(key, value);
        }
        self
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get_mut(key).map(|e| &mut e.value)
    }

    pub fn get_or_default<'a, Q>(&'a self, key: &Q, fallback: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).unwrap_or(fallback)
    }

    /// Returns the value stored under `key`, storing `fallback` first if there is none.
    ///
    /// The returned reference comes from a fresh lookup after the insert,
    /// not from `fallback` itself.
    pub fn get_or_default_and_put(&mut self, key: K, fallback: V) -> &mut V
    where
        K: Clone,
    {
        if !self.contains_key(&key) {
            self.put(key.clone(), fallback);
        }
        match self.get_mut(&key) {
            Some(v) => v,
            None => unreachable!("key was stored right before the lookup"),
        }
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).is_some()
    }

    /// Overwrites the value of an existing key, does nothing for a missing one
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> &mut Self
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        if let Some(v) = self.get_mut(key) {
            *v = value;
        }
        self
    }

    /// Swaps in `new` only if `key` is present *and* currently maps to `expected`
    pub fn replace_if<Q>(&mut self, key: &Q, expected: &V, new: V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: PartialEq,
    {
        match self.get_mut(key) {
            Some(v) if *v == *expected => {
                *v = new;
                true
            }
            _ => false,
        }
    }

    /// Combines `value` into an existing entry with `combiner(old, value)`,
    /// or inserts `value` as is when the key is missing
    pub fn merge_with<F>(&mut self, key: K, value: V, combiner: F) -> &mut Self
    where
        F: FnOnce(&V, V) -> V,
    {
        match self.get_mut(&key) {
            Some(old) => {
                let merged = combiner(&*old, value);
                *old = merged;
            }
            None => {
                self.put(key, value);
            }
        }
        self
    }

    /// Union-merge: copies over every key of `other` that `self` does not have.
    /// On conflicts `self` keeps its value.
    pub fn merge<S2>(&mut self, other: &Dictionary<K, V, S2>) -> &mut Self
    where
        K: Clone,
        V: Clone,
    {
        for (k, v) in other.iter() {
            if !self.contains_key(k) {
                self.put(k.clone(), v.clone());
            }
        }
        self
    }

    /// Same as [`merge`](Self::merge) but consumes `other`, so nothing is cloned
    pub fn absorb<S2>(&mut self, other: Dictionary<K, V, S2>) -> &mut Self {
        for (k, v) in other {
            self.put_if_absent(k, v);
        }
        self
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key).is_some()
    }

    /// Removes the key and hands back its value
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key).map(|e| e.value)
    }

    // [private]

    fn grow(&mut self) -> Result<(), DictError> {
        let buckets = self.table.bucket_count();
        let new_cap = buckets
            .checked_mul(2)
            .ok_or(DictError::CapacityOverflow { buckets })?;

        debug!(
            "load factor {} exceeded ({} items in {} buckets), growing to {}",
            self.load_factor,
            self.size(),
            buckets,
            new_cap
        );
        self.table.resize(new_cap)
    }
}

/// Keys in bucket-scan order
#[derive(Debug, Clone)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Values in bucket-scan order
#[derive(Debug, Clone)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V, S> IntoIterator for Dictionary<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_entries()
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dictionary<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut Dictionary<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, S> Extend<(K, V)> for Dictionary<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Dictionary<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        dict.extend(iter);
        trace!(target: "from_iter", "collected {} entries into {} buckets", dict.size(), dict.capacity());
        dict
    }
}

/// Equal when both hold the same key set with equal values,
/// regardless of bucket layout or load factor
impl<K, V, S, S2> PartialEq<Dictionary<K, V, S2>> for Dictionary<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    S2: BuildHasher,
{
    fn eq(&self, other: &Dictionary<K, V, S2>) -> bool {
        self.size() == other.size() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for Dictionary<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

/// `{k1=v1, k2=v2}` in bucket-scan order
impl<K, V, S> fmt::Display for Dictionary<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}
