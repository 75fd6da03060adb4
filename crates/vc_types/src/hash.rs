//! Fixed-seed hashing shared by the type caches and binder bookkeeping.
//!
//! Hash results only depend on the input, so a structural hash computed once
//! for a [`TypeExpression`](crate::TypeExpression) stays valid for its whole life.

use core::hash::{BuildHasher, Hash};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5D1F_72A4_C90B_3E86);

/// Hasher produced by [`FixedHashState`].
pub type FixedHasher = FoldHasher<'static>;

/// Build-hasher with a random but fixed seed, based on `foldhash`.
///
/// # Examples
///
/// ```
/// use core::hash::BuildHasher;
/// use vc_types::hash::FixedHashState;
///
/// let a = FixedHashState.hash_one("key");
/// let b = FixedHashState.hash_one("key");
/// assert_eq!(a, b);
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// A `hashbrown` map using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A `hashbrown` set using [`FixedHashState`].
pub type HashSet<K> = hashbrown::HashSet<K, FixedHashState>;

/// Hashes a single value with the fixed state.
#[inline]
pub fn fixed_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    FixedHashState.hash_one(value)
}
