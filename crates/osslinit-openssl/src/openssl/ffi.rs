//! Unsafe FFI calls into libcrypto / libssl.
//!
//! Policy: This is the only module allowed to use `unsafe` in this crate.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_long, c_uchar, c_ulong};
use std::ptr;

use once_cell::sync::OnceCell;
use openssl_sys as ossl;
#[cfg(not(ossl110))]
use osslinit_core::fatal::{abort_with, FatalError};
use osslinit_core::LockingBridge;

// Target of the native locking callback. Set once, before registration.
static BRIDGE: OnceCell<&'static LockingBridge> = OnceCell::new();

// --- 1.0.x setup entry points ---
#[cfg(not(ossl110))]
mod legacy {
    use std::os::raw::{c_char, c_int};

    pub(super) type LockingCallback = unsafe extern "C" fn(c_int, c_int, *const c_char, c_int);

    extern "C" {
        pub(super) fn OPENSSL_config(config_name: *const c_char);
        pub(super) fn ENGINE_load_builtin_engines();
        pub(super) fn SSL_load_error_strings();
        pub(super) fn SSL_library_init() -> c_int;
        pub(super) fn OPENSSL_add_all_algorithms_noconf();
        pub(super) fn CRYPTO_num_locks() -> c_int;
        pub(super) fn CRYPTO_set_locking_callback(func: Option<LockingCallback>);
    }
}

// --- 1.1+ setup entry points ---
#[cfg(ossl110)]
#[allow(non_camel_case_types)]
pub(crate) enum OPENSSL_INIT_SETTINGS {}

#[cfg(ossl110)]
mod modern {
    use std::os::raw::{c_char, c_int};

    use super::OPENSSL_INIT_SETTINGS;

    extern "C" {
        pub(super) fn OPENSSL_init_crypto(opts: u64, settings: *const OPENSSL_INIT_SETTINGS) -> c_int;
        pub(super) fn OPENSSL_init_ssl(opts: u64, settings: *const OPENSSL_INIT_SETTINGS) -> c_int;
        #[cfg(not(libressl))]
        pub(super) fn OPENSSL_INIT_new() -> *mut OPENSSL_INIT_SETTINGS;
        #[cfg(not(libressl))]
        pub(super) fn OPENSSL_INIT_set_config_appname(settings: *mut OPENSSL_INIT_SETTINGS, name: *const c_char) -> c_int;
        #[cfg(not(libressl))]
        pub(super) fn OPENSSL_INIT_free(settings: *mut OPENSSL_INIT_SETTINGS);
    }
}

#[cfg(ossl110)]
pub(crate) mod init_flags {
    pub const LOAD_CRYPTO_STRINGS: u64 = 0x0000_0002;
    pub const ADD_ALL_CIPHERS: u64 = 0x0000_0004;
    pub const ADD_ALL_DIGESTS: u64 = 0x0000_0008;
    pub const LOAD_CONFIG: u64 = 0x0000_0040;
    pub const ENGINE_RDRAND: u64 = 0x0000_0200;
    pub const ENGINE_DYNAMIC: u64 = 0x0000_0400;
    pub const ENGINE_CRYPTODEV: u64 = 0x0000_1000;
    pub const ENGINE_CAPI: u64 = 0x0000_2000;
    pub const ENGINE_PADLOCK: u64 = 0x0000_4000;
    pub const ENGINE_ALL_BUILTIN: u64 =
        ENGINE_RDRAND | ENGINE_DYNAMIC | ENGINE_CRYPTODEV | ENGINE_CAPI | ENGINE_PADLOCK;
    pub const LOAD_SSL_STRINGS: u64 = 0x0020_0000;
}

#[cfg(not(ossl300))]
extern "C" {
    fn ERR_func_error_string(e: c_ulong) -> *const c_char;
}

#[cfg(not(ossl110))]
pub(crate) fn openssl_config(name: *const c_char) {
    unsafe { legacy::OPENSSL_config(name) }
}

#[cfg(not(ossl110))]
pub(crate) fn engine_load_builtin_engines() {
    unsafe { legacy::ENGINE_load_builtin_engines() }
}

#[cfg(not(ossl110))]
pub(crate) fn ssl_load_error_strings() {
    unsafe { legacy::SSL_load_error_strings() }
}

#[cfg(not(ossl110))]
pub(crate) fn ssl_library_init() -> c_int {
    unsafe { legacy::SSL_library_init() }
}

#[cfg(not(ossl110))]
pub(crate) fn add_all_algorithms_noconf() {
    unsafe { legacy::OPENSSL_add_all_algorithms_noconf() }
}

#[cfg(not(ossl110))]
pub(crate) fn crypto_num_locks() -> c_int {
    unsafe { legacy::CRYPTO_num_locks() }
}

#[cfg(ossl110)]
pub(crate) fn init_crypto(opts: u64, settings: *const OPENSSL_INIT_SETTINGS) -> c_int {
    unsafe { modern::OPENSSL_init_crypto(opts, settings) }
}

#[cfg(ossl110)]
pub(crate) fn init_ssl(opts: u64, settings: *const OPENSSL_INIT_SETTINGS) -> c_int {
    unsafe { modern::OPENSSL_init_ssl(opts, settings) }
}

// Settings carrying a config appname, or null if the library refused them.
#[cfg(all(ossl110, not(libressl)))]
pub(crate) fn init_settings_with_appname(name: &CStr) -> *mut OPENSSL_INIT_SETTINGS {
    unsafe {
        let settings = modern::OPENSSL_INIT_new();
        if settings.is_null() {
            return ptr::null_mut();
        }
        if modern::OPENSSL_INIT_set_config_appname(settings, name.as_ptr()) != 1 {
            modern::OPENSSL_INIT_free(settings);
            return ptr::null_mut();
        }
        settings
    }
}

#[cfg(all(ossl110, not(libressl)))]
pub(crate) fn init_settings_free(settings: *mut OPENSSL_INIT_SETTINGS) {
    if !settings.is_null() {
        unsafe { modern::OPENSSL_INIT_free(settings) }
    }
}

// --- locking callback ---

#[cfg(not(ossl110))]
unsafe extern "C" fn locking_trampoline(mode: c_int, n: c_int, file: *const c_char, line: c_int) {
    let file = if file.is_null() {
        ""
    } else {
        unsafe { CStr::from_ptr(file) }.to_str().unwrap_or("")
    };

    match BRIDGE.get() {
        Some(bridge) => bridge.on_native_event(mode, n, file, line),
        None => abort_with(FatalError::BridgeNotInstalled),
    }
}

/// Make `bridge` the callback target. Returns false if another bridge was already set.
pub(crate) fn set_bridge(bridge: &'static LockingBridge) -> bool {
    BRIDGE.set(bridge).is_ok()
}

pub(crate) fn bridge() -> Option<&'static LockingBridge> {
    BRIDGE.get().copied()
}

#[cfg(not(ossl110))]
pub(crate) fn register_locking_callback() {
    unsafe { legacy::CRYPTO_set_locking_callback(Some(locking_trampoline)) }
}

// --- error queue ---

pub(crate) fn err_get_error() -> c_ulong {
    unsafe { ossl::ERR_get_error() }
}

// Copies the string out; the native pointer is static table storage but may be null.
fn copy_cstr(p: *const c_char) -> Option<String> {
    if p.is_null() {
        return None;
    }
    let s = unsafe { CStr::from_ptr(p) };
    Some(s.to_string_lossy().into_owned())
}

pub(crate) fn err_lib_error_string(code: c_ulong) -> Option<String> {
    copy_cstr(unsafe { ossl::ERR_lib_error_string(code) })
}

#[cfg(not(ossl300))]
pub(crate) fn err_func_error_string(code: c_ulong) -> Option<String> {
    copy_cstr(unsafe { ERR_func_error_string(code) })
}

#[cfg(ossl300)]
pub(crate) fn err_func_error_string(_code: c_ulong) -> Option<String> {
    None
}

pub(crate) fn err_reason_error_string(code: c_ulong) -> Option<String> {
    copy_cstr(unsafe { ossl::ERR_reason_error_string(code) })
}

// --- DER probe ---

/// Parse `len` bytes at `der` as an X509 certificate and free the result.
pub(crate) fn d2i_x509_and_free(der: *const c_uchar, len: c_long) -> bool {
    unsafe {
        let mut p = der;
        let cert = ossl::d2i_X509(ptr::null_mut(), &mut p, len);
        if cert.is_null() {
            return false;
        }
        ossl::X509_free(cert);
        true
    }
}
