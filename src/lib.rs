//! chain-hashmap: a single-threaded hash map with separate chaining,
//! pluggable key behaviour and release hooks for entries it lets go of.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the bucket layout, collision chains, growth policy and
//!   removal in one small structure whose invariants can be checked by
//!   walking it.
//! - Pieces:
//!   - KeyOps<K>: hash (32-bit) and equality for keys; built-ins cover
//!     integer/pointer identity, string content, and any `Hash + Eq` key
//!     through a `BuildHasher`.
//!   - Release<T>: hook receiving every key or value the map displaces,
//!     removes or drops. Closures work directly; `NoRelease` just drops.
//!   - ChainHashMap<K, V, O, FK, FV>: the map itself.
//!
//! Layout
//! - A power-of-two bucket array; `hash & mask` picks the slot.
//! - Each slot is `Vacant` or holds an inline head entry. Overflow entries
//!   live in a `SlotMap` arena and are linked by arena key, so walking or
//!   freeing a chain is a loop, never recursion.
//! - A slot with a non-empty chain always has an occupied head: removing
//!   the head pulls its successor up.
//! - Every entry keeps the 32-bit hash it was inserted with. Rehashing
//!   uses the stored hash and never calls back into `KeyOps`.
//!
//! Growth
//! - When the live count reaches `capacity * fill_rate` (0.6 by default)
//!   the slot count doubles. Chain nodes are relinked into the new array
//!   rather than copied. A failed allocation of the new array is logged
//!   and skipped; the map stays valid and retries on the next insert.
//!
//! Failure boundaries
//! - Invalid configuration panics at construction.
//! - Allocation failure of the bucket array surfaces as `TableError`.
//! - An exhausted chain-node budget rejects the `put` and returns the
//!   caller's pair inside `PutError`.
//! - Lookups and removals of absent keys return `None`/`false`.
//! - `put` stores whatever it is given. `put_nullable` is the variant for
//!   pointer or `Option` payloads: a pair whose key and value are both
//!   null is dropped and reported as success.
//!
//! Notes and non-goals
//! - Single-threaded; mutation requires `&mut self`, there is no locking.
//! - Iteration order is unspecified.
//! - No persistence.

mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod config;
mod error;
pub mod key_ops;
pub mod release;

// Public surface
pub use chain_hash_map::{ChainHashMap, ChainStats, Iter};
pub use config::Config;
pub use error::{PutError, TableError};
pub use key_ops::{FnKeys, HashedKeys, IdentityKeys, KeyOps, Nullable, StrKeys};
pub use release::{NoRelease, Release};
