// Derive version cfgs from the metadata openssl-sys exports to dependents.
use std::env;

fn main() {
    println!("cargo:rustc-check-cfg=cfg(ossl110)");
    println!("cargo:rustc-check-cfg=cfg(ossl300)");
    println!("cargo:rustc-check-cfg=cfg(libressl)");
    println!("cargo:rerun-if-env-changed=DEP_OPENSSL_VERSION_NUMBER");
    println!("cargo:rerun-if-env-changed=DEP_OPENSSL_LIBRESSL_VERSION_NUMBER");

    if env::var("DEP_OPENSSL_LIBRESSL_VERSION_NUMBER").is_ok() {
        // LibreSSL keeps the 1.1 init entry points and manages its own locks.
        println!("cargo:rustc-cfg=libressl");
        println!("cargo:rustc-cfg=ossl110");
    }

    let version = env::var("DEP_OPENSSL_VERSION_NUMBER")
        .ok()
        .and_then(|v| u64::from_str_radix(v.trim(), 16).ok())
        .unwrap_or(0);

    println!("cargo:rustc-env=OSSLINIT_OPENSSL_VERSION_NUMBER={version:x}");

    if version >= 0x1_01_00_00_0 {
        println!("cargo:rustc-cfg=ossl110");
    }
    if version >= 0x3_00_00_00_0 {
        println!("cargo:rustc-cfg=ossl300");
    }
}
