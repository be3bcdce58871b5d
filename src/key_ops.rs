//! Key behaviour: how a `ChainHashMap` hashes and compares its keys.
//!
//! The map never calls `Hash`/`Eq` on its own; every hash and every
//! equality check goes through the `KeyOps` value it was built with. The
//! stored 32-bit hash is reused on rehash, so `hash` runs exactly once per
//! inserted key plus once per lookup.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Hash and equality capability for keys of type `K`.
///
/// Implementations must be consistent: `equal(a, b)` implies
/// `hash(a) == hash(b)`.
pub trait KeyOps<K: ?Sized> {
    fn hash(&self, key: &K) -> u32;
    fn equal(&self, a: &K, b: &K) -> bool;
}

/// Identity behaviour for integer and pointer keys: the hash is the value
/// truncated to 32 bits, equality is `==`.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityKeys;

impl KeyOps<usize> for IdentityKeys {
    #[inline]
    fn hash(&self, key: &usize) -> u32 {
        *key as u32
    }
    #[inline]
    fn equal(&self, a: &usize, b: &usize) -> bool {
        a == b
    }
}

impl KeyOps<u64> for IdentityKeys {
    #[inline]
    fn hash(&self, key: &u64) -> u32 {
        *key as u32
    }
    #[inline]
    fn equal(&self, a: &u64, b: &u64) -> bool {
        a == b
    }
}

impl KeyOps<u32> for IdentityKeys {
    #[inline]
    fn hash(&self, key: &u32) -> u32 {
        *key
    }
    #[inline]
    fn equal(&self, a: &u32, b: &u32) -> bool {
        a == b
    }
}

impl<T> KeyOps<*const T> for IdentityKeys {
    #[inline]
    fn hash(&self, key: &*const T) -> u32 {
        *key as usize as u32
    }
    #[inline]
    fn equal(&self, a: &*const T, b: &*const T) -> bool {
        core::ptr::eq(*a, *b)
    }
}

impl<T> KeyOps<*mut T> for IdentityKeys {
    #[inline]
    fn hash(&self, key: &*mut T) -> u32 {
        *key as usize as u32
    }
    #[inline]
    fn equal(&self, a: &*mut T, b: &*mut T) -> bool {
        core::ptr::eq(*a, *b)
    }
}

/// String content behaviour: djb2 over the UTF-8 bytes, byte-wise equality.
#[derive(Copy, Clone, Debug, Default)]
pub struct StrKeys;

impl StrKeys {
    const SEED: u32 = 5381;

    fn djb2(s: &str) -> u32 {
        s.bytes().fold(Self::SEED, |h, b| {
            h.wrapping_shl(5).wrapping_add(h).wrapping_add(b as u32)
        })
    }
}

impl<K> KeyOps<K> for StrKeys
where
    K: AsRef<str> + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        Self::djb2(key.as_ref())
    }
    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a.as_ref() == b.as_ref()
    }
}

/// Adapter for any `K: Hash + Eq`, hashing through a `BuildHasher` and
/// folding the 64-bit result down to 32 bits.
#[derive(Clone, Debug, Default)]
pub struct HashedKeys<S = DefaultHashBuilder> {
    hasher: S,
}

impl HashedKeys {
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<S> HashedKeys<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<K, S> KeyOps<K> for HashedKeys<S>
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        let h = self.hasher.hash_one(key);
        (h ^ (h >> 32)) as u32
    }
    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Keys and values with a distinguished absent state.
///
/// [`ChainHashMap::put_nullable`](crate::ChainHashMap::put_nullable) drops a
/// pair whose key and value are both absent instead of storing it.
pub trait Nullable {
    fn is_null(&self) -> bool;
}

impl<T: ?Sized> Nullable for *const T {
    #[inline]
    fn is_null(&self) -> bool {
        <*const T>::is_null(*self)
    }
}

impl<T: ?Sized> Nullable for *mut T {
    #[inline]
    fn is_null(&self) -> bool {
        <*mut T>::is_null(*self)
    }
}

impl<T> Nullable for Option<T> {
    #[inline]
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

/// A hash closure and an equality closure bundled as `KeyOps`.
#[derive(Clone)]
pub struct FnKeys<H, E> {
    hash: H,
    equal: E,
}

impl<H, E> FnKeys<H, E> {
    pub fn new(hash: H, equal: E) -> Self {
        Self { hash, equal }
    }
}

impl<K, H, E> KeyOps<K> for FnKeys<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u32,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        (self.hash)(key)
    }
    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        (self.equal)(a, b)
    }
}
