use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::locks::{BankError, MutexBank};

#[test]
fn allocates_requested_number_of_slots() {
    let bank = MutexBank::allocate(41, 4096).unwrap();
    assert_eq!(bank.len(), 41);
    assert!(!bank.is_empty());
    assert_eq!(bank.is_locked(40), Some(false));
    assert_eq!(bank.is_locked(41), None);
}

#[test]
fn zero_slots_is_a_valid_empty_bank() {
    let bank = MutexBank::allocate(0, 4096).unwrap();
    assert!(bank.is_empty());
    assert_eq!(bank.is_locked(0), None);
}

#[test]
fn rejects_negative_count() {
    let err = MutexBank::allocate(-1, 4096).unwrap_err();
    assert_eq!(err, BankError::NegativeSlotCount(-1));
}

#[test]
fn rejects_count_above_max() {
    let err = MutexBank::allocate(9, 8).unwrap_err();
    match err {
        BankError::TooManySlots { requested, max } => {
            assert_eq!(requested, 9);
            assert_eq!(max, 8);
        }
        other => panic!("expected TooManySlots, got {other:?}"),
    }
}

#[test]
fn lock_and_unlock_toggle_slot_state() {
    let bank = MutexBank::allocate(2, 16).unwrap();

    bank.lock(1);
    assert_eq!(bank.is_locked(1), Some(true));
    assert_eq!(bank.is_locked(0), Some(false));

    // A second slot can be taken while the first is held.
    bank.lock(0);
    bank.unlock(0);

    bank.unlock(1);
    assert_eq!(bank.is_locked(1), Some(false));
}

#[test]
fn one_slot_serialises_many_threads() {
    let bank = Arc::new(MutexBank::allocate(1, 16).unwrap());
    let holders = Arc::new(AtomicUsize::new(0));
    let total = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bank = bank.clone();
            let holders = holders.clone();
            let total = total.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    bank.lock(0);
                    assert_eq!(holders.fetch_add(1, Ordering::SeqCst), 0, "two holders of slot 0");
                    total.fetch_add(1, Ordering::Relaxed);
                    holders.fetch_sub(1, Ordering::SeqCst);
                    bank.unlock(0);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(total.load(Ordering::Relaxed), 8 * 500);
    assert_eq!(bank.is_locked(0), Some(false));
}
