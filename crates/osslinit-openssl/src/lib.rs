/*
    osslinit-openssl
      - OpenSSL implementation of osslinit-core's NativeLibrary and ErrorQueue.
      - All `unsafe` is confined to `openssl::ffi`.
      - Call `init()` before any other OpenSSL call; after a failing call,
        `drain_errors()` on the same thread before touching OpenSSL again.
*/
mod openssl;

use std::os::raw::c_int;

use osslinit_core::errqueue::{discard_current_thread_errors, drain_current_thread_errors, CodeParts, ErrorQueue};
use osslinit_core::{AggregateError, ErrorCode, InitOptions, InitState, LockingBridge, NativeLibrary, OsslInitError};

/// libssl / libcrypto, as linked through openssl-sys.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSsl;

impl NativeLibrary for OpenSsl {
    fn name(&self) -> &'static str {
        "openssl"
    }

    fn load_config(&self, appname: Option<&str>) {
        openssl::safe::load_config(appname)
    }

    fn load_builtin_engines(&self) {
        openssl::safe::load_builtin_engines()
    }

    fn load_error_strings(&self) {
        openssl::safe::load_error_strings()
    }

    fn library_init(&self) {
        openssl::safe::library_init()
    }

    fn add_all_algorithms(&self) {
        openssl::safe::add_all_algorithms()
    }

    fn lock_slots(&self) -> i64 {
        openssl::safe::lock_slots()
    }

    fn install_locking_callback(&self, bridge: &'static LockingBridge) {
        openssl::safe::install_locking_callback(bridge)
    }
}

impl ErrorQueue for OpenSsl {
    fn pop_error(&self) -> ErrorCode {
        openssl::safe::pop_error()
    }

    fn library_string(&self, code: ErrorCode) -> Option<String> {
        openssl::safe::library_string(code)
    }

    fn function_string(&self, code: ErrorCode) -> Option<String> {
        openssl::safe::function_string(code)
    }

    fn reason_string(&self, code: ErrorCode) -> Option<String> {
        openssl::safe::reason_string(code)
    }

    fn unpack(&self, code: ErrorCode) -> CodeParts {
        if cfg!(ossl300) {
            CodeParts::from_v3(code)
        } else {
            CodeParts::from_v1(code)
        }
    }
}

/// Initialize OpenSSL. Idempotent and thread-safe.
///
/// Uses default options unless an earlier `init_with`/`init_from_env` already
/// configured the library, in which case that configuration stands.
pub fn init() -> &'static LockingBridge {
    openssl::ensure()
}

/// Initialize with explicit options. Only the first initializing caller's options apply.
pub fn init_with(options: InitOptions) -> &'static LockingBridge {
    openssl::init_with(options)
}

/// Initialize with options read from `OSSLINIT_*` environment variables.
pub fn init_from_env() -> Result<&'static LockingBridge, OsslInitError> {
    let options = InitOptions::from_env()?;
    Ok(openssl::init_with(options))
}

pub fn state() -> InitState {
    openssl::state()
}

/// The bridge OpenSSL was handed, once initialized.
pub fn installed_bridge() -> Option<&'static LockingBridge> {
    openssl::safe::installed_bridge()
}

/// Hex `OPENSSL_VERSION_NUMBER` of the headers this crate was built against.
pub fn version_number() -> u64 {
    u64::from_str_radix(env!("OSSLINIT_OPENSSL_VERSION_NUMBER"), 16).unwrap_or(0)
}

/// Drain this thread's OpenSSL error queue.
pub fn drain_errors() -> AggregateError {
    drain_current_thread_errors(&OpenSsl)
}

/// Clear stale codes from this thread's queue; returns how many were dropped.
pub fn discard_errors() -> usize {
    discard_current_thread_errors(&OpenSsl)
}

// Return-code conventions of OpenSSL calls; each drains on failure.

pub fn cvt(rc: c_int) -> Result<c_int, AggregateError> {
    if rc <= 0 {
        Err(drain_errors())
    } else {
        Ok(rc)
    }
}

pub fn cvt_n(rc: c_int) -> Result<c_int, AggregateError> {
    if rc < 0 {
        Err(drain_errors())
    } else {
        Ok(rc)
    }
}

pub fn cvt_p<T>(p: *mut T) -> Result<*mut T, AggregateError> {
    if p.is_null() {
        Err(drain_errors())
    } else {
        Ok(p)
    }
}

/// Parse `der` as an X509 certificate and discard it.
///
/// Exists to provoke a real native failure from diagnostics and tests.
pub fn probe_der_certificate(der: &[u8]) -> Result<(), AggregateError> {
    openssl::ensure();
    openssl::safe::probe_der_certificate(der)
}
