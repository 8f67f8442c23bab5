//! DJB2 string hashing used to place keys in the slot array.

const DJB2_SEED: u64 = 5381;

/// DJB2 over the key's bytes: `h = h * 33 + byte`, with wrapping arithmetic.
#[inline]
pub fn djb2(key: &str) -> u64 {
    key.bytes().fold(DJB2_SEED, |h, c| {
        (h << 5).wrapping_add(h).wrapping_add(u64::from(c))
    })
}

/// Home slot of `key` in a slot array of `capacity` entries.
///
/// Depends on `capacity`, so every resize has to recompute it for each key.
#[inline]
pub fn slot_for(key: &str, capacity: usize) -> usize {
    debug_assert!(capacity > 0, "slot array must not be empty");
    (djb2(key) % capacity as u64) as usize
}
