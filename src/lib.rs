#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors reported by swaps and cursors.
pub mod error;

/// Hash functions from `i32` to non-negative integers.
///
/// The tables consume a hash function through [`HashFunction`]; the free
/// functions here are ready-made choices for it.
pub mod hash_functions;

/// The capability contract shared by both collision strategies.
pub mod hash_table;

/// An integer hash set using open addressing with linear probing.
pub mod linear_probing;

/// An integer hash set using separate chaining.
pub mod separate_chaining;

pub use error::Result;
pub use error::TableError;
pub use hash_functions::HashFunction;
pub use hash_table::HashTable;
pub use linear_probing::LinearProbingHashTable;
pub use separate_chaining::SeparateChainingHashTable;
