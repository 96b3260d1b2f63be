//! # splay-map
//!
//! A self-adjusting binary search tree (splay tree) and a hash map that uses
//! one splay tree per bucket.
//!
//! Every access rotates the touched node to the root of its tree, giving
//! amortized `O(log n)` operations and making recently used keys cheap to
//! reach again. [`AdaptiveHashMap`] routes each key to a fixed bucket and
//! lets that bucket's tree adapt to the access pattern of the keys that
//! collide there.
//!
//! Failures are reported through [`Error`] and leave the structure
//! unchanged.
//!
//! ## Example
//!
//! ```rust
//! use splay_map::{AdaptiveHashMap, Error, SplayTree};
//!
//! let mut tree = SplayTree::new();
//! for key in [5, 3, 8, 1, 4] {
//!     tree.insert(key, key * 10).unwrap();
//! }
//! assert_eq!(tree.peek(&3), Ok(&30));
//! assert_eq!(tree.root(), Some((&3, &30)));
//! assert_eq!(tree.minimum_key(), Ok(1));
//!
//! let mut map = AdaptiveHashMap::with_buckets(4);
//! map.insert(2u64, "two").unwrap();
//! assert_eq!(map.insert(2, "again"), Err(Error::DuplicateKey));
//! assert_eq!(map.extract(&2), Ok("two"));
//! assert!(map.is_empty());
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod adaptive_hash_map;
mod error;
mod node;
mod splay_tree;
mod tracing_helpers;

pub use adaptive_hash_map::{AdaptiveHashMap, HashCode, DEFAULT_BUCKET_COUNT};
pub use error::{Error, Result};
pub use splay_tree::{Iter, SplayTree};

#[cfg(test)]
mod proptests;
