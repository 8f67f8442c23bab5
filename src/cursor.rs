//! Cursor: read-only walk over the occupied slots of a `Table`.
//!
//! The cursor borrows the table, so the table cannot be mutated (or dropped)
//! while a cursor over it is alive. Order is physical slot order and changes
//! whenever the table resizes.

use crate::slot::Slot;
use crate::table::Table;
use core::fmt;

pub struct Cursor<'a, V> {
    table: &'a Table<V>,
    index: usize,
}

impl<'a, V> Cursor<'a, V> {
    /// Position at the first occupied slot, or at the end for an empty table.
    pub fn new(table: &'a Table<V>) -> Self {
        let index = if table.is_empty() {
            table.capacity()
        } else {
            next_occupied(table.slots(), 0)
        };
        Self { table, index }
    }

    /// Move to the next occupied slot or to the end.
    ///
    /// Returns false only when the cursor was already at the end.
    pub fn advance(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.index = next_occupied(self.table.slots(), self.index + 1);
        true
    }

    /// Key under the cursor; `None` at the end.
    pub fn current(&self) -> Option<&'a str> {
        self.current_entry().map(|(k, _)| k)
    }

    pub fn current_value(&self) -> Option<&'a V> {
        self.current_entry().map(|(_, v)| v)
    }

    pub fn current_entry(&self) -> Option<(&'a str, &'a V)> {
        self.table.slots().get(self.index).and_then(Slot::entry)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.index == self.table.capacity()
    }
}

// First occupied index at or after `from`, or `slots.len()` if none.
fn next_occupied<V>(slots: &[Slot<V>], from: usize) -> usize {
    slots[from..]
        .iter()
        .position(Slot::is_occupied)
        .map_or(slots.len(), |offset| from + offset)
}

/// Yields the key under the cursor, then advances.
impl<'a, V> Iterator for Cursor<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.current()?;
        self.advance();
        Some(key)
    }
}

impl<V> fmt::Debug for Cursor<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("capacity", &self.table.capacity())
            .field("current", &self.current())
            .finish()
    }
}
