//! Hash map whose buckets are splay trees.
//!
//! Colliding keys share a bucket's [`SplayTree`], so keys that are read
//! repeatedly drift toward that bucket's root and a skewed access pattern
//! stays cheap even when a bucket is long.

use crate::error::Result;
use crate::splay_tree::SplayTree;
use crate::tracing_helpers::debug_log;

// =============================================================================
// Configuration
// =============================================================================

/// Bucket count used by [`AdaptiveHashMap::new`].
pub const DEFAULT_BUCKET_COUNT: usize = 1;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

// =============================================================================
// Hash codes
// =============================================================================

/// Deterministic hash used to route a key to its bucket.
///
/// Unlike [`std::hash::Hash`] with a random state, the code depends only on
/// the key, so a key always lands in the same bucket for a given bucket
/// count. Integers hash to their own value (signed integers through their
/// two's complement bit pattern), which makes routing plain modulo.
pub trait HashCode {
    fn hash_code(&self) -> u64;
}

macro_rules! impl_hash_code_as_u64 {
    ($($t:ty),* $(,)?) => {
        $(
            impl HashCode for $t {
                #[inline]
                fn hash_code(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

// Signed types sign-extend to 64 bits first so -1i8 and -1i64 agree.
macro_rules! impl_hash_code_signed {
    ($($t:ty),* $(,)?) => {
        $(
            impl HashCode for $t {
                #[inline]
                fn hash_code(&self) -> u64 {
                    *self as i64 as u64
                }
            }
        )*
    };
}

impl_hash_code_as_u64!(u8, u16, u32, u64, u128, usize);
impl_hash_code_signed!(i8, i16, i32, i64, isize);

impl HashCode for i128 {
    #[inline]
    fn hash_code(&self) -> u64 {
        *self as u64
    }
}

impl HashCode for bool {
    #[inline]
    fn hash_code(&self) -> u64 {
        u64::from(*self)
    }
}

impl HashCode for char {
    #[inline]
    fn hash_code(&self) -> u64 {
        u64::from(u32::from(*self))
    }
}

/// FNV-1a over raw bytes.
#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl HashCode for [u8] {
    fn hash_code(&self) -> u64 {
        fnv1a(self)
    }
}

impl HashCode for Vec<u8> {
    fn hash_code(&self) -> u64 {
        fnv1a(self)
    }
}

impl HashCode for str {
    fn hash_code(&self) -> u64 {
        fnv1a(self.as_bytes())
    }
}

impl HashCode for String {
    fn hash_code(&self) -> u64 {
        fnv1a(self.as_bytes())
    }
}

impl<T: HashCode + ?Sized> HashCode for &T {
    #[inline]
    fn hash_code(&self) -> u64 {
        (**self).hash_code()
    }
}

// =============================================================================
// AdaptiveHashMap
// =============================================================================

/// Fixed-size hash table of independent splay-tree buckets.
///
/// The bucket count is chosen at construction and never changes.
///
/// ```rust
/// use splay_map::{AdaptiveHashMap, Error};
///
/// let mut map = AdaptiveHashMap::with_buckets(4);
/// map.insert(2u32, "two").unwrap();
/// map.insert(6, "six").unwrap();
///
/// // 2 and 6 collide in bucket 2; each lookup still finds its own value.
/// assert_eq!(map.hash_code(&6), 2);
/// assert_eq!(map.peek(&6), Ok(&"six"));
/// assert_eq!(map.bucket(2).len(), 2);
/// assert_eq!(map.extract(&10), Err(Error::NonexistentKey));
/// ```
#[derive(Clone)]
pub struct AdaptiveHashMap<K, V> {
    buckets: Vec<SplayTree<K, V>>,
    count: usize,
}

impl<K, V> AdaptiveHashMap<K, V> {
    /// Map with [`DEFAULT_BUCKET_COUNT`] buckets.
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKET_COUNT)
    }

    /// Map with `bucket_count` buckets.
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_buckets(bucket_count: usize) -> Self {
        assert!(bucket_count > 0, "bucket count must be non-zero");
        debug_log!(bucket_count, "creating adaptive hash map");
        Self {
            buckets: (0..bucket_count).map(|_| SplayTree::new()).collect(),
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// All buckets, indexed by bucket number.
    pub fn buckets(&self) -> &[SplayTree<K, V>] {
        &self.buckets
    }

    /// # Panics
    ///
    /// Panics if `idx >= self.bucket_count()`.
    pub fn bucket(&self, idx: usize) -> &SplayTree<K, V> {
        &self.buckets[idx]
    }

    /// Entries bucket by bucket, in key order within each bucket.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets.iter().flat_map(SplayTree::iter)
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.count = 0;
    }
}

impl<K: HashCode, V> AdaptiveHashMap<K, V> {
    /// Bucket index for `key`.
    #[inline]
    pub fn hash_code(&self, key: &K) -> usize {
        (key.hash_code() % self.buckets.len() as u64) as usize
    }
}

impl<K: HashCode + Ord, V> AdaptiveHashMap<K, V> {
    /// Insert into the key's bucket, making it that bucket's root.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let idx = self.hash_code(&key);
        self.buckets[idx].insert(key, value)?;
        self.count += 1;
        Ok(())
    }

    pub fn peek(&mut self, key: &K) -> Result<&V> {
        let idx = self.hash_code(key);
        self.buckets[idx].peek(key)
    }

    pub fn peek_mut(&mut self, key: &K) -> Result<&mut V> {
        let idx = self.hash_code(key);
        self.buckets[idx].peek_mut(key)
    }

    pub fn extract(&mut self, key: &K) -> Result<V> {
        let idx = self.hash_code(key);
        let value = self.buckets[idx].extract(key)?;
        self.count -= 1;
        Ok(value)
    }

    /// Panic unless every bucket is a valid splay tree, every key sits in
    /// the bucket it hashes to, and `len` is the sum of the bucket sizes.
    #[track_caller]
    pub fn assert_valid(&self) {
        let mut total = 0usize;
        for (idx, bucket) in self.buckets.iter().enumerate() {
            bucket.assert_valid();
            for key in bucket.keys() {
                assert_eq!(self.hash_code(key), idx, "key stored in wrong bucket");
            }
            total += bucket.len();
        }
        assert_eq!(total, self.count, "len must equal the sum of bucket sizes");
    }
}

impl<K, V> Default for AdaptiveHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for AdaptiveHashMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
