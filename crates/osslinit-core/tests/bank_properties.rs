use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use proptest::prelude::*;

use osslinit_core::{LockRequest, LockingBridge, MutexBank};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // One thread per slot plus one roaming thread, all cycling lock/unlock.
    #[test]
    fn concurrent_cycles_never_share_a_slot(n in 0usize..24, rounds in 1usize..40) {
        let bank = MutexBank::allocate(n as i64, 64).unwrap();
        let holders: Vec<AtomicUsize> = (0..n).map(|_| AtomicUsize::new(0)).collect();

        thread::scope(|s| {
            for slot in 0..n {
                let bank = &bank;
                let holders = &holders;
                s.spawn(move || {
                    for _ in 0..rounds {
                        bank.lock(slot);
                        assert_eq!(holders[slot].fetch_add(1, Ordering::SeqCst), 0);
                        holders[slot].fetch_sub(1, Ordering::SeqCst);
                        bank.unlock(slot);
                    }
                });
            }

            let bank = &bank;
            let holders = &holders;
            s.spawn(move || {
                for r in 0..rounds {
                    for slot in 0..n {
                        let slot = (slot + r) % n;
                        bank.lock(slot);
                        assert_eq!(holders[slot].fetch_add(1, Ordering::SeqCst), 0);
                        holders[slot].fetch_sub(1, Ordering::SeqCst);
                        bank.unlock(slot);
                    }
                }
            });
        });

        for slot in 0..n {
            prop_assert_eq!(bank.is_locked(slot), Some(false));
        }
    }

    // Nested acquisition in ascending slot order, as the native library does.
    #[test]
    fn nested_ascending_locks_do_not_deadlock(n in 2usize..12, threads in 2usize..6) {
        let bridge = LockingBridge::new(MutexBank::allocate(n as i64, 64).unwrap());

        thread::scope(|s| {
            for _ in 0..threads {
                let bridge = &bridge;
                s.spawn(move || {
                    for _ in 0..50 {
                        for slot in 0..n {
                            bridge.on_lock_event(LockRequest::acquire(slot, "nested", 1));
                        }
                        for slot in (0..n).rev() {
                            bridge.on_lock_event(LockRequest::release(slot, "nested", 2));
                        }
                    }
                });
            }
        });

        for slot in 0..n {
            prop_assert_eq!(bridge.bank().is_locked(slot), Some(false));
        }
    }
}
