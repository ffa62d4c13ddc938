use std::sync::{Arc, Barrier};
use std::thread;

use osslinit_core::InitState;
use osslinit_openssl::{discard_errors, drain_errors, init, installed_bridge, probe_der_certificate, state};

// Not a certificate: 'n' is not a SEQUENCE tag.
const GARBAGE_DER: &[u8] = b"not a certificate";

#[test]
fn concurrent_init_yields_one_bridge() {
    let start = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                init() as *const _ as usize
            })
        })
        .collect();

    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));

    assert_eq!(state(), InitState::Done);
    let installed = installed_bridge().unwrap();
    assert_eq!(installed as *const _ as usize, addrs[0]);
    assert!(!installed.bank().is_empty());
}

#[test]
fn parse_failure_drains_named_records() {
    init();
    discard_errors();

    let err = probe_der_certificate(GARBAGE_DER).unwrap_err();

    assert!(!err.is_empty(), "expected queued codes");
    for record in err.records() {
        assert!(!record.code.is_none());
        assert!(!record.library.is_empty());
        assert!(!record.reason.is_empty());
        // Tables were loaded by init, so nothing falls back to numbers.
        assert!(!record.library.starts_with("lib("), "unresolved: {record}");
        assert_eq!(record.to_string(), format!("{}:{}:{}", record.library, record.function, record.reason));
    }
    assert_eq!(err.to_string().lines().count(), err.len());

    // The drain consumed everything.
    assert!(drain_errors().is_empty());
}

#[test]
fn failure_on_one_thread_is_invisible_to_another() {
    init();
    discard_errors();

    let seen_by_worker = thread::spawn(|| {
        let err = probe_der_certificate(GARBAGE_DER).unwrap_err();
        err.len()
    })
    .join()
    .unwrap();

    assert!(seen_by_worker > 0);
    assert!(drain_errors().is_empty());
}
