use std::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
    slice, vec,
};

use log::trace;

use super::DictError;

/// A single owned key-value pair stored in a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Entries sharing a slot, scanned linearly (first match wins)
pub(crate) type Bucket<K, V> = Vec<Entry<K, V>>;

/// Bucket storage with separate chaining.
///
/// This layer never decides *when* to grow, it only knows how to.
/// The owning [`Dictionary`](super::Dictionary) applies the load factor policy.
#[derive(Debug, Clone)]
pub(crate) struct HashTable<K, V, S> {
    pub(crate) buckets: Vec<Bucket<K, V>>,
    pub(crate) items: usize,
    pub(crate) hasher: S,
}

/// Maps a hash onto a slot. Unsigned arithmetic throughout, so there is
/// no negative index for any hash value.
#[inline]
fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    (hash % bucket_count as u64) as usize
}

impl<K, V, S> HashTable<K, V, S> {
    /// Creates a new `HashTable` with `cap` many buckets
    pub fn new_with_buckets(cap: usize, hasher: S) -> Self {
        Self {
            buckets: (0..cap).map(|_| Vec::new()).collect(),
            items: 0,
            hasher,
        }
    }

    /// Shorthand for `self.items == 0`
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Returns the number of buckets, or "slots" of the hash table
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Empties every bucket, keeping the bucket count
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.items = 0;
    }

    // [adapters]

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            current: Default::default(),
            remaining: self.items,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            remaining: self.items,
            buckets: self.buckets.iter_mut(),
            current: Default::default(),
        }
    }

    pub fn into_entries(self) -> IntoIter<K, V> {
        IntoIter {
            remaining: self.items,
            buckets: self.buckets.into_iter(),
            current: Default::default(),
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn idx<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized + Hash,
    {
        if self.buckets.is_empty() {
            return None;
        }
        Some(bucket_index(self.hasher.hash_one(key), self.buckets.len()))
    }

    /// Inserts an entry, overwriting the value in place if the key is already
    /// present in its bucket. Returns the previous value.
    ///
    /// This does not resize.
    ///
    /// # Panics
    ///
    /// Panics if the table has no buckets.
    pub fn insert(&mut self, entry: Entry<K, V>) -> Option<V> {
        assert_ne!(self.bucket_count(), 0, "inserting into a table without buckets");
        let i = bucket_index(self.hasher.hash_one(&entry.key), self.buckets.len());
        let bucket = &mut self.buckets[i];

        match bucket.iter_mut().find(|e| e.key == entry.key) {
            Some(e) => Some(std::mem::replace(&mut e.value, entry.value)),
            None => {
                bucket.push(entry);
                self.items += 1;
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.idx(key)?;
        self.buckets[i].iter().find(|e| e.key.borrow() == key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.idx(key)?;
        self.buckets[i].iter_mut().find(|e| e.key.borrow() == key)
    }

    /// Removes the first matching entry of the key's bucket,
    /// keeping the order of the remaining chain
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let i = self.idx(key)?;
        let bucket = &mut self.buckets[i];
        let pos = bucket.iter().position(|e| e.key.borrow() == key)?;
        self.items -= 1;
        Some(bucket.remove(pos))
    }

    /// Reallocates the bucket array with `new_cap` slots and reinserts every entry,
    /// walking the old buckets in order.
    ///
    /// # Errors
    ///
    /// Returns [`DictError::AllocationFailed`] if the new bucket array cannot be
    /// allocated, in which case the table is left untouched.
    pub fn resize(&mut self, new_cap: usize) -> Result<(), DictError> {
        let mut new_buckets: Vec<Bucket<K, V>> = Vec::new();
        new_buckets
            .try_reserve_exact(new_cap)
            .map_err(|_| DictError::AllocationFailed { buckets: new_cap })?;
        new_buckets.resize_with(new_cap, Vec::new);

        trace!(target: "resize", "{} -> {} buckets, {} items", self.buckets.len(), new_cap, self.items);

        let hasher = &self.hasher;
        for bucket in self.buckets.drain(..) {
            for entry in bucket {
                let i = bucket_index(hasher.hash_one(&entry.key), new_cap);
                new_buckets[i].push(entry);
            }
        }

        self.buckets = new_buckets;
        Ok(())
    }
}

/// Borrowing iterator over the entries in bucket-scan order
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    buckets: slice::Iter<'a, Bucket<K, V>>,
    current: slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.current.next() {
                Some(entry) => {
                    self.remaining -= 1;
                    return Some((&entry.key, &entry.value));
                }
                None => self.current = self.buckets.next()?.iter(),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator handing out mutable values in bucket-scan order
#[derive(Debug)]
pub struct IterMut<'a, K, V> {
    buckets: slice::IterMut<'a, Bucket<K, V>>,
    current: slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.current.next() {
                Some(entry) => {
                    self.remaining -= 1;
                    return Some((&entry.key, &mut entry.value));
                }
                None => self.current = self.buckets.next()?.iter_mut(),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// Owning iterator, drains buckets in scan order
#[derive(Debug)]
pub struct IntoIter<K, V> {
    buckets: vec::IntoIter<Bucket<K, V>>,
    current: vec::IntoIter<Entry<K, V>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.current.next() {
                Some(entry) => {
                    self.remaining -= 1;
                    return Some((entry.key, entry.value));
                }
                None => self.current = self.buckets.next()?.into_iter(),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
