//! Hashing for stable class identities.
//!
//! Uses FNV-1a for fast, const-compatible hashing with good distribution.
//! A `ClassId` is derived from the class name alone, so the same class
//! always gets the same identity regardless of declaration order.

use crate::ClassId;

/// FNV-1a 64-bit hash, usable in const context.
pub const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x100000001b3);
        i += 1;
    }
    hash
}

/// Hash a class name into a `ClassId`.
///
/// The result is guaranteed to be non-zero (0 is reserved as "no class"),
/// and is computable in const context so the `entity_hierarchy!` macro can
/// embed ids at compile time.
#[inline]
pub const fn class_id(name: &[u8]) -> ClassId {
    let full = fnv1a_64(name);
    // Mix bits for better distribution
    let mixed = full ^ (full >> 32) ^ (full >> 17);
    if mixed == 0 { 1 } else { mixed }
}
