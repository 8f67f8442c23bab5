// Failed save leaves the table untouched.
//
// This binary installs a global allocator that refuses allocations of one
// exact size while armed, so a key copy of that length fails on demand.
// Invariants exercised:
// - A failed save reports the key allocation and leaves count, capacity and
//   slot order exactly as they were, even when the save would have grown
//   the table.
// - The table stays usable; a later save grows it normally.
use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use str_table::{Allocation, Table, INITIAL_CAPACITY};

const REFUSED_SIZE: usize = 77_777;

static ARMED: AtomicBool = AtomicBool::new(false);

// Tests in this binary share ARMED; run them one at a time.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

struct RefusingAlloc;

unsafe impl GlobalAlloc for RefusingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if ARMED.load(Ordering::SeqCst) && layout.size() == REFUSED_SIZE {
            return ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, p: *mut u8, layout: Layout) {
        System.dealloc(p, layout)
    }
}

#[global_allocator]
static GLOBAL: RefusingAlloc = RefusingAlloc;

// Test: key copy failure at the growth threshold.
// Assumes: 96 entries in a 128-slot table, so the next new key would grow it.
// Verifies: Err names the key allocation; capacity, count and key order are unchanged.
#[test]
fn failed_key_copy_does_not_grow_table() {
    let _serial = serial();
    let mut t = Table::new();
    let threshold = INITIAL_CAPACITY * 3 / 4;
    for i in 0..threshold {
        t.save(&format!("key{i}"), i).unwrap();
    }
    let order_before: Vec<String> = t.keys().map(str::to_string).collect();
    let long_key = "x".repeat(REFUSED_SIZE);

    ARMED.store(true, Ordering::SeqCst);
    let res = t.save(&long_key, threshold);
    ARMED.store(false, Ordering::SeqCst);

    let err = res.expect_err("key copy must fail");
    assert_eq!(
        err.allocation(),
        Allocation::Key {
            len: REFUSED_SIZE
        }
    );
    assert_eq!(t.capacity(), INITIAL_CAPACITY);
    assert_eq!(t.count(), threshold);
    assert!(!t.contains(&long_key));
    let order_after: Vec<String> = t.keys().map(str::to_string).collect();
    assert_eq!(order_before, order_after);

    // Disarmed, the same save succeeds and grows the table.
    t.save(&long_key, threshold).unwrap();
    assert_eq!(t.capacity(), INITIAL_CAPACITY * 2);
    assert_eq!(t.get(&long_key), Some(&threshold));
}

// Test: overwriting an existing key never copies it.
// Assumes: the key is already stored.
// Verifies: the overwrite succeeds while allocations of the key's length are refused.
#[test]
fn overwrite_needs_no_key_allocation() {
    let _serial = serial();
    let long_key = "y".repeat(REFUSED_SIZE);
    let mut t = Table::new();
    t.save(&long_key, 1).unwrap();

    ARMED.store(true, Ordering::SeqCst);
    let res = t.save(&long_key, 2);
    ARMED.store(false, Ordering::SeqCst);

    assert!(res.is_ok());
    assert_eq!(t.get(&long_key), Some(&2));
    assert_eq!(t.count(), 1);
}
