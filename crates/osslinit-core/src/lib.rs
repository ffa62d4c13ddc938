/*
    osslinit-core
        one-time setup of a native crypto library, the lock bridge it
        calls into, and translation of its per-thread error queue.
      - Backends plug in through `init::NativeLibrary` and `errqueue::ErrorQueue`.
      - `simulated` is an in-process library for tests, behind the
        `simulated` feature.
 */

pub mod error;
pub mod fatal;

pub mod locks;
pub mod init;
pub mod errqueue;
#[cfg(any(test, feature = "simulated"))]
pub mod simulated;

pub use error::OsslInitError;
pub use errqueue::{drain_current_thread_errors, discard_current_thread_errors, AggregateError, ErrorCode, ErrorRecord};
pub use init::{InitOptions, InitState, NativeLibrary, Sequencer};
pub use locks::{LockOp, LockRequest, LockingBridge, MutexBank};
