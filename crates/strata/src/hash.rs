use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::Xxh3;

/// Computes a stable 64-bit fingerprint of a structurally hashable value.
///
/// Fingerprints identify indexes and tag support queries with a correlation
/// value, so they must be reproducible across processes and platforms. The
/// standard library hasher makes no such guarantee; xxh3 with a fixed seed
/// does.
pub fn fingerprint<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = Xxh3::new();
    value.hash(&mut hasher);
    hasher.finish()
}
