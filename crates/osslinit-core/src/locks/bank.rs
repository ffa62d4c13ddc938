use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;

use crate::fatal::{abort_with, FatalError};
use crate::locks::BankError;

thread_local! {
    static THREAD_TOKEN: u8 = const { 0 };
}

// Address of a per-thread static: unique among live threads, never zero, no allocation.
fn current_thread_token() -> usize {
    THREAD_TOKEN.with(|t| t as *const u8 as usize)
}

const NO_OWNER: usize = 0;

struct Slot {
    raw: RawMutex,
    owner: AtomicUsize,
}

impl Slot {
    fn new() -> Self {
        Self {
            raw: RawMutex::INIT,
            owner: AtomicUsize::new(NO_OWNER),
        }
    }
}

/// Fixed-size array of locks, one per slot the native library asks for.
///
/// Slots are locked and unlocked by index, without guards, because the
/// native side acquires in one callback and releases in another. Index `i`
/// names the same lock for as long as the bank lives.
pub struct MutexBank {
    slots: Box<[Slot]>,
}

impl MutexBank {
    /// Allocate `requested` slots, refusing negative counts and counts above `max`.
    pub fn allocate(requested: i64, max: usize) -> Result<Self, BankError> {
        if requested < 0 {
            return Err(BankError::NegativeSlotCount(requested));
        }

        let n = usize::try_from(requested).map_err(|_| BankError::TooManySlots { requested, max })?;
        if n > max {
            return Err(BankError::TooManySlots { requested, max });
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(n)
            .map_err(|e| BankError::Allocation {
                requested: n,
                reason: e.to_string(),
            })?;
        slots.extend((0..n).map(|_| Slot::new()));

        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Block until `slot` is free, then take it.
    ///
    /// Aborts on an out-of-range index or if this thread already holds the slot.
    pub fn lock(&self, slot: usize) {
        let s = self.slot(slot);
        let me = current_thread_token();

        // Only this thread ever stores `me`, so a relaxed load sees its own write.
        if s.owner.load(Ordering::Relaxed) == me {
            abort_with(FatalError::ReentrantAcquire { slot });
        }

        s.raw.lock();
        s.owner.store(me, Ordering::Relaxed);
    }

    /// Release `slot`. Aborts unless the calling thread holds it.
    pub fn unlock(&self, slot: usize) {
        let s = self.slot(slot);

        if s.owner.load(Ordering::Relaxed) != current_thread_token() {
            abort_with(FatalError::ReleaseNotHeld { slot });
        }

        s.owner.store(NO_OWNER, Ordering::Relaxed);
        // SAFETY: the owner check above proves this thread acquired `raw`.
        unsafe { s.raw.unlock() }
    }

    /// Whether `slot` is currently held by any thread; `None` when out of range.
    pub fn is_locked(&self, slot: usize) -> Option<bool> {
        self.slots.get(slot).map(|s| s.raw.is_locked())
    }

    fn slot(&self, slot: usize) -> &Slot {
        match self.slots.get(slot) {
            Some(s) => s,
            None => abort_with(FatalError::SlotOutOfRange {
                slot: i64::try_from(slot).unwrap_or(i64::MAX),
                len: self.slots.len(),
            }),
        }
    }
}

impl fmt::Debug for MutexBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutexBank").field("len", &self.slots.len()).finish()
    }
}
