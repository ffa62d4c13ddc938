use std::fmt;

use crate::fatal::{abort_with, FatalError};
use crate::locks::MutexBank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOp {
    Acquire,
    Release,
}

impl LockOp {
    pub const CRYPTO_LOCK: i32 = 1;
    pub const CRYPTO_UNLOCK: i32 = 2;
    pub const CRYPTO_READ: i32 = 4;
    pub const CRYPTO_WRITE: i32 = 8;

    /// Decode the mode flags a native locking callback receives.
    ///
    /// Read and write bits are accepted but ignored: every slot is exclusive.
    pub fn from_mode_bits(mode: i32) -> Result<Self, FatalError> {
        match mode & !(Self::CRYPTO_READ | Self::CRYPTO_WRITE) {
            Self::CRYPTO_LOCK => Ok(LockOp::Acquire),
            Self::CRYPTO_UNLOCK => Ok(LockOp::Release),
            _ => Err(FatalError::UnknownLockMode(mode)),
        }
    }
}

/// One lock event from the native library. `file` and `line` are diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRequest<'a> {
    pub op: LockOp,
    pub slot: usize,
    pub file: &'a str,
    pub line: u32,
}

impl<'a> LockRequest<'a> {
    pub fn acquire(slot: usize, file: &'a str, line: u32) -> Self {
        Self { op: LockOp::Acquire, slot, file, line }
    }

    pub fn release(slot: usize, file: &'a str, line: u32) -> Self {
        Self { op: LockOp::Release, slot, file, line }
    }
}

impl fmt::Display for LockRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} slot {} from {}:{}", self.op, self.slot, self.file, self.line)
    }
}

/*
    Target of the native library's locking callback.
      - Owns the process-lifetime MutexBank.
      - Never returns an error and never allocates on the success path;
        any inconsistency aborts.
*/
#[derive(Debug)]
pub struct LockingBridge {
    bank: MutexBank,
}

impl LockingBridge {
    pub fn new(bank: MutexBank) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &MutexBank {
        &self.bank
    }

    pub fn on_lock_event(&self, request: LockRequest<'_>) {
        match request.op {
            LockOp::Acquire => self.bank.lock(request.slot),
            LockOp::Release => self.bank.unlock(request.slot),
        }
    }

    /// Entry point for C-typed callback arguments, as a backend trampoline receives them.
    pub fn on_native_event(&self, mode: i32, slot: i32, file: &str, line: i32) {
        let op = LockOp::from_mode_bits(mode).unwrap_or_else(|e| abort_with(e));
        let slot = usize::try_from(slot).unwrap_or_else(|_| {
            abort_with(FatalError::SlotOutOfRange {
                slot: i64::from(slot),
                len: self.bank.len(),
            })
        });
        let line = u32::try_from(line).unwrap_or(0);

        self.on_lock_event(LockRequest { op, slot, file, line });
    }
}
