use thiserror::Error;

use crate::init::InitStep;
use crate::locks::BankError;

// Conditions the native library cannot be told about. Every one of them ends the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("lock bank allocation failed: {0}")]
    LockBank(#[from] BankError),

    #[error("lock slot {slot} out of range for a bank of {len} slots")]
    SlotOutOfRange { slot: i64, len: usize },

    #[error("lock slot {slot} acquired twice by the same thread")]
    ReentrantAcquire { slot: usize },

    #[error("lock slot {slot} released by a thread that does not hold it")]
    ReleaseNotHeld { slot: usize },

    #[error("unrecognised lock mode bits {0:#x}")]
    UnknownLockMode(i32),

    #[error("locking callback invoked before a bridge was installed")]
    BridgeNotInstalled,

    #[error("native setup panicked during step: {step}")]
    SetupPanicked { step: InitStep },
}

/// Log `err` and abort the process.
///
/// Used wherever the native call site offers no channel for a failure:
/// inside the locking callback, when the lock bank cannot be sized, and
/// when a setup step unwinds.
/// Never unwinds.
#[cold]
pub fn abort_with(err: FatalError) -> ! {
    tracing::error!(error = %err, "fatal native library condition, aborting");
    eprintln!("osslinit: fatal: {err}");
    std::process::abort()
}
