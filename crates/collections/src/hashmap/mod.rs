use thiserror::Error;

mod dict;
mod hash_table;
#[cfg(feature = "serde")]
mod serde_impl;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DictError {
    #[error("Load factor must be finite and greater than zero, got: {0}")]
    InvalidLoadFactor(f64),
    #[error("Bucket count overflows usize when growing from {buckets} buckets")]
    CapacityOverflow { buckets: usize },
    #[error("Couldnt allocate {buckets} buckets")]
    AllocationFailed { buckets: usize },
}

pub use dict::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, DefaultHashBuilder, Dictionary, Keys, Values};
pub use hash_table::{IntoIter, Iter, IterMut};
