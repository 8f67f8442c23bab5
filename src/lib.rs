//! str-table: a single-threaded, string-keyed hash table built on open
//! addressing with linear probing, plus a borrowing cursor over its slots.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small table whose probing and resizing behavior is fully
//!   specified, so placement and iteration order can be reasoned about.
//! - Pieces:
//!   - `hash`: DJB2 over key bytes, reduced modulo the current capacity.
//!   - `slot`: three-state slot (`Empty`, `Occupied`, `Tombstone`) and
//!     the fallible allocation helpers for slot arrays and key copies.
//!   - `Table<V>`: the slot array, occupied count and optional value
//!     destructor; save/get/delete/contains and full-rehash resizing.
//!   - `Cursor<'a, V>`: read-only index walk over occupied slots.
//!
//! Constraints
//! - Single-threaded: the destructor is a boxed `FnMut`, so `Table` is
//!   neither `Send` nor `Sync`.
//! - Keys are copied into table-owned `String`s on insert.
//! - Growth doubles at 3/4 occupancy; shrink halves below 1/4 occupancy
//!   but never under `INITIAL_CAPACITY` (128).
//! - Resizing is a full synchronous rehash; tombstones do not survive it.
//!
//! Probe invariant
//! - From a key's home slot, scanning forward (with wrap) reaches the key's
//!   occupied slot before any empty slot. Deletion leaves a tombstone rather
//!   than an empty slot so that later keys in the same run stay reachable.
//! - Inserts reuse the first tombstone on the probe path, but only after the
//!   scan has ruled out an existing occupied slot for the same key.
//!
//! Ownership of values
//! - The table owns stored values. The optional destructor receives values
//!   replaced by `save` and values still present at teardown.
//! - `delete` returns the value to the caller and does not call the
//!   destructor.
//!
//! Errors
//! - Allocation failure of the slot array or a key copy is the only error
//!   (`AllocError`). Missing keys are `None`, not errors.
//!
//! Cursor validity
//! - A cursor borrows its table immutably, so mutating the table while a
//!   cursor is alive does not compile.

pub mod cursor;
mod error;
pub mod hash;
mod slot;
pub mod table;
mod table_proptest;

// Public surface
pub use cursor::Cursor;
pub use error::{AllocError, Allocation};
pub use table::{Iter, Keys, Table, INITIAL_CAPACITY};
