//! Table: open addressing with linear probing, tombstones and full-rehash resizing.

use crate::cursor::Cursor;
use crate::error::AllocError;
use crate::hash::slot_for;
use crate::slot::{copy_key, empty_slots, Slot};
use core::fmt;
use core::mem;
use log::{debug, trace, warn};

/// Capacity of a fresh table and the floor below which it never shrinks.
pub const INITIAL_CAPACITY: usize = 128;

type Destructor<V> = Box<dyn FnMut(V)>;

/// Outcome of a probe sequence for one key.
enum Probe {
    /// Occupied slot holding the key.
    Found(usize),
    /// Key absent; first reusable slot of the sequence.
    Vacant(usize),
    /// Key absent and every slot is occupied.
    Exhausted,
}

/// String-keyed hash table.
///
/// Values are owned by the table. When a destructor is configured it receives
/// values that are overwritten by `save` and values still stored when the
/// table is dropped; `delete` hands the value back to the caller instead.
///
/// ```
/// use str_table::Table;
///
/// let mut t = Table::new();
/// t.save("x", 1).unwrap();
/// t.save("x", 3).unwrap();
/// assert_eq!(t.get("x"), Some(&3));
/// assert_eq!(t.delete("x"), Some(3));
/// assert!(t.is_empty());
/// ```
pub struct Table<V> {
    slots: Vec<Slot<V>>,
    count: usize,
    destructor: Option<Destructor<V>>,
}

impl<V> Table<V> {
    pub fn new() -> Self {
        Self::from_destructor(None)
    }

    /// Table whose overwritten and leftover values are passed to `destructor`.
    pub fn with_destructor<F>(destructor: F) -> Self
    where
        F: FnMut(V) + 'static,
    {
        Self::from_destructor(Some(Box::new(destructor)))
    }

    /// Like [`Table::new`], but reports a failed initial allocation.
    pub fn try_new() -> Result<Self, AllocError> {
        Self::try_from_destructor(None)
    }

    /// Like [`Table::with_destructor`], but reports a failed initial allocation.
    pub fn try_with_destructor<F>(destructor: F) -> Result<Self, AllocError>
    where
        F: FnMut(V) + 'static,
    {
        Self::try_from_destructor(Some(Box::new(destructor)))
    }

    fn from_destructor(destructor: Option<Destructor<V>>) -> Self {
        let mut slots = Vec::with_capacity(INITIAL_CAPACITY);
        slots.resize_with(INITIAL_CAPACITY, || Slot::Empty);
        Self {
            slots,
            count: 0,
            destructor,
        }
    }

    fn try_from_destructor(destructor: Option<Destructor<V>>) -> Result<Self, AllocError> {
        Ok(Self {
            slots: empty_slots(INITIAL_CAPACITY)?,
            count: 0,
            destructor,
        })
    }

    /// Number of stored keys. Tombstones are not counted.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots in the array, occupied or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }

    fn probe(&self, key: &str) -> Probe {
        let capacity = self.capacity();
        let mut pos = slot_for(key, capacity);
        let mut reusable = None;
        for _ in 0..capacity {
            match &self.slots[pos] {
                Slot::Empty => return Probe::Vacant(reusable.unwrap_or(pos)),
                Slot::Occupied { key: k, .. } if k == key => return Probe::Found(pos),
                Slot::Occupied { .. } => {}
                Slot::Tombstone => {
                    reusable.get_or_insert(pos);
                }
            }
            pos += 1;
            if pos == capacity {
                pos = 0;
            }
        }
        match reusable {
            Some(pos) => Probe::Vacant(pos),
            None => Probe::Exhausted,
        }
    }

    fn find(&self, key: &str) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.probe(key) {
            Probe::Found(pos) => Some(pos),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Insert `key` or overwrite its value.
    ///
    /// Grows the table first when it is three quarters full. On error the
    /// table is left exactly as it was (capacity and slot order included)
    /// and `value` is dropped.
    pub fn save(&mut self, key: &str, value: V) -> Result<(), AllocError> {
        // A new key is copied before any growth so a failed copy changes nothing.
        let mut owned = if self.contains(key) {
            None
        } else {
            Some(copy_key(key)?)
        };

        if self.count >= self.capacity() * 3 / 4 {
            let grown = self
                .capacity()
                .checked_mul(2)
                .ok_or_else(|| AllocError::capacity_overflow(self.capacity()))?;
            self.resize(grown)?;
        }

        match self.probe(key) {
            Probe::Found(pos) => {
                let old = match &mut self.slots[pos] {
                    Slot::Occupied { value: stored, .. } => mem::replace(stored, value),
                    _ => unreachable!("probe found a non-occupied slot"),
                };
                trace!("save: overwrote {key:?} at slot {pos}");
                self.dispose(old);
            }
            Probe::Vacant(pos) => {
                let key = match owned.take() {
                    Some(key) => key,
                    None => copy_key(key)?,
                };
                trace!("save: inserted {key:?} at slot {pos}");
                self.slots[pos] = Slot::Occupied { key, value };
                self.count += 1;
            }
            Probe::Exhausted => unreachable!("count stays below capacity after growth"),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let pos = self.find(key)?;
        match &self.slots[pos] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let pos = self.find(key)?;
        match &mut self.slots[pos] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Remove `key` and hand its value back without running the destructor.
    ///
    /// May halve the capacity when fewer than a quarter of the slots stay
    /// occupied, never going below [`INITIAL_CAPACITY`].
    ///
    /// Tombstones are only cleared by a resize. A table at the floor that
    /// churns through many distinct keys can fill with tombstones, after
    /// which lookups and inserts scan the whole slot array.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        if self.is_empty() {
            return None;
        }
        self.shrink_if_sparse();

        let pos = self.find(key)?;
        let removed = mem::replace(&mut self.slots[pos], Slot::Tombstone);
        self.count -= 1;
        self.shrink_if_sparse();

        match removed {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    fn shrink_if_sparse(&mut self) {
        let capacity = self.capacity();
        if self.count < capacity / 4 && capacity / 2 >= INITIAL_CAPACITY {
            if let Err(e) = self.resize(capacity / 2) {
                warn!("delete: keeping {capacity} slots, shrink failed: {e}");
            }
        }
    }

    /// Rehash every stored entry into a fresh array of `new_capacity` slots.
    ///
    /// Tombstones are discarded. Keys and values are moved, not copied.
    pub(crate) fn resize(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        debug_assert!(self.count < new_capacity);
        let fresh = empty_slots(new_capacity)?;
        let old = mem::replace(&mut self.slots, fresh);
        let old_capacity = old.len();
        let mut tombstones = 0usize;

        for slot in old {
            match slot {
                Slot::Occupied { key, value } => {
                    let mut pos = slot_for(&key, new_capacity);
                    while !matches!(self.slots[pos], Slot::Empty) {
                        pos += 1;
                        if pos == new_capacity {
                            pos = 0;
                        }
                    }
                    self.slots[pos] = Slot::Occupied { key, value };
                }
                Slot::Tombstone => tombstones += 1,
                Slot::Empty => {}
            }
        }

        debug!(
            "resized table from {old_capacity} to {new_capacity} slots ({} entries, {tombstones} tombstones dropped)",
            self.count
        );
        Ok(())
    }

    fn dispose(&mut self, value: V) {
        match self.destructor.as_mut() {
            Some(destructor) => destructor(value),
            None => drop(value),
        }
    }

    /// Tear the table down, passing every stored value to the destructor.
    ///
    /// Same as dropping the table.
    pub fn destroy(self) {
        drop(self);
    }

    /// Cursor positioned at the first stored key.
    pub fn cursor(&self) -> Cursor<'_, V> {
        Cursor::new(self)
    }

    /// Entries in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.count,
        }
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for Table<V> {
    fn drop(&mut self) {
        let Some(destructor) = self.destructor.as_mut() else {
            return;
        };
        for slot in self.slots.drain(..) {
            if let Slot::Occupied { value, .. } = slot {
                destructor(value);
            }
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Table<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, value)` pairs in slot order.
pub struct Iter<'a, V> {
    it: core::slice::Iter<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.it.by_ref().find_map(Slot::entry)?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Iterator over keys in slot order.
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V> IntoIterator for &'a Table<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
