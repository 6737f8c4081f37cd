//! Separately chained hash table with per-instance load factor.
//!
//! [`Dictionary`] keeps its entries in a fixed array of buckets, each bucket a short
//! chain scanned linearly. It doubles the bucket count and rehashes everything right
//! after an insertion pushes the fill ratio above the load factor.

mod hashmap;
mod macros;

pub use hashmap::{
    DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, DefaultHashBuilder, DictError, Dictionary, IntoIter, Iter,
    IterMut, Keys, Values,
};
