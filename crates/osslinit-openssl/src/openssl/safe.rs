use std::ffi::CString;
use std::os::raw::{c_int, c_long, c_ulong};

use osslinit_core::errqueue::{drain_current_thread_errors, AggregateError, ErrorCode};
use osslinit_core::init::InitStep;
use osslinit_core::LockingBridge;

use super::ffi;
use crate::OpenSsl;

// Setup calls have no failure channel; anything they queued is logged and cleared.
fn note_setup_rc(step: InitStep, rc: c_int) {
    if rc != 1 {
        let err = drain_current_thread_errors(&OpenSsl);
        tracing::warn!(step = %step, rc, error = %err, "native setup call reported failure");
    }
}

fn appname_cstring(appname: Option<&str>) -> Option<CString> {
    let name = appname?;
    match CString::new(name) {
        Ok(c) => Some(c),
        Err(_) => {
            tracing::warn!(appname = name, "config appname contains NUL, using library default");
            None
        }
    }
}

#[cfg(not(ossl110))]
pub(crate) fn load_config(appname: Option<&str>) {
    let name = appname_cstring(appname);
    ffi::openssl_config(name.as_ref().map_or(std::ptr::null(), |n| n.as_ptr()));
}

#[cfg(all(ossl110, not(libressl)))]
pub(crate) fn load_config(appname: Option<&str>) {
    let settings = match appname_cstring(appname) {
        Some(name) => ffi::init_settings_with_appname(&name),
        None => std::ptr::null_mut(),
    };
    let rc = ffi::init_crypto(ffi::init_flags::LOAD_CONFIG, settings);
    ffi::init_settings_free(settings);
    note_setup_rc(InitStep::LoadConfig, rc);
}

#[cfg(libressl)]
pub(crate) fn load_config(appname: Option<&str>) {
    if appname.is_some() {
        tracing::warn!("config appname is not supported on LibreSSL, using library default");
    }
    let rc = ffi::init_crypto(ffi::init_flags::LOAD_CONFIG, std::ptr::null());
    note_setup_rc(InitStep::LoadConfig, rc);
}

#[cfg(not(ossl110))]
pub(crate) fn load_builtin_engines() {
    ffi::engine_load_builtin_engines();
}

#[cfg(ossl110)]
pub(crate) fn load_builtin_engines() {
    let rc = ffi::init_crypto(ffi::init_flags::ENGINE_ALL_BUILTIN, std::ptr::null());
    note_setup_rc(InitStep::LoadBuiltinEngines, rc);
}

#[cfg(not(ossl110))]
pub(crate) fn load_error_strings() {
    ffi::ssl_load_error_strings();
}

#[cfg(ossl110)]
pub(crate) fn load_error_strings() {
    let opts = ffi::init_flags::LOAD_SSL_STRINGS | ffi::init_flags::LOAD_CRYPTO_STRINGS;
    let rc = ffi::init_ssl(opts, std::ptr::null());
    note_setup_rc(InitStep::LoadErrorStrings, rc);
}

#[cfg(not(ossl110))]
pub(crate) fn library_init() {
    note_setup_rc(InitStep::LibraryInit, ffi::ssl_library_init());
}

#[cfg(ossl110)]
pub(crate) fn library_init() {
    note_setup_rc(InitStep::LibraryInit, ffi::init_ssl(0, std::ptr::null()));
}

#[cfg(not(ossl110))]
pub(crate) fn add_all_algorithms() {
    ffi::add_all_algorithms_noconf();
}

#[cfg(ossl110)]
pub(crate) fn add_all_algorithms() {
    let opts = ffi::init_flags::ADD_ALL_CIPHERS | ffi::init_flags::ADD_ALL_DIGESTS;
    note_setup_rc(InitStep::AddAllAlgorithms, ffi::init_crypto(opts, std::ptr::null()));
}

#[cfg(not(ossl110))]
pub(crate) fn lock_slots() -> i64 {
    i64::from(ffi::crypto_num_locks())
}

// CRYPTO_num_locks() is a macro for 1 from 1.1.0 on.
#[cfg(ossl110)]
pub(crate) fn lock_slots() -> i64 {
    1
}

pub(crate) fn install_locking_callback(bridge: &'static LockingBridge) {
    if !ffi::set_bridge(bridge) {
        tracing::warn!("locking bridge already installed, keeping the first");
        return;
    }

    #[cfg(not(ossl110))]
    ffi::register_locking_callback();

    #[cfg(ossl110)]
    tracing::debug!("library manages its own locking, callback kept for inspection only");
}

pub(crate) fn installed_bridge() -> Option<&'static LockingBridge> {
    ffi::bridge()
}

// --- error queue ---

pub(crate) fn pop_error() -> ErrorCode {
    ErrorCode(u64::from(ffi::err_get_error()))
}

// Codes come from ERR_get_error, so they always fit back into c_ulong.
fn native_code(code: ErrorCode) -> c_ulong {
    code.0 as c_ulong
}

pub(crate) fn library_string(code: ErrorCode) -> Option<String> {
    ffi::err_lib_error_string(native_code(code))
}

pub(crate) fn function_string(code: ErrorCode) -> Option<String> {
    ffi::err_func_error_string(native_code(code))
}

pub(crate) fn reason_string(code: ErrorCode) -> Option<String> {
    ffi::err_reason_error_string(native_code(code))
}

// --- DER probe ---

pub(crate) fn probe_der_certificate(der: &[u8]) -> Result<(), AggregateError> {
    let Ok(len) = c_long::try_from(der.len()) else {
        return Err(AggregateError::default());
    };

    if ffi::d2i_x509_and_free(der.as_ptr(), len) {
        Ok(())
    } else {
        Err(drain_current_thread_errors(&OpenSsl))
    }
}
