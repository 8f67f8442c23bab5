//! Three-state slot stored in the table's array.

use crate::error::AllocError;

#[derive(Debug)]
pub(crate) enum Slot<V> {
    Empty,
    Occupied { key: String, value: V },
    // Deleted entry: lookups continue past it, inserts may reuse it.
    Tombstone,
}

impl<V> Slot<V> {
    #[inline]
    pub(crate) fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&str, &V)> {
        match self {
            Slot::Occupied { key, value } => Some((key.as_str(), value)),
            _ => None,
        }
    }
}

/// Allocate `capacity` empty slots, reporting failure instead of aborting.
pub(crate) fn empty_slots<V>(capacity: usize) -> Result<Vec<Slot<V>>, AllocError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|e| AllocError::slot_array(capacity, e))?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots)
}

/// Copy a borrowed key into storage owned by the table.
pub(crate) fn copy_key(key: &str) -> Result<String, AllocError> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(key.len())
        .map_err(|e| AllocError::key(key.len(), e))?;
    owned.push_str(key);
    Ok(owned)
}
