use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::errqueue::{
    discard_current_thread_errors, drain_current_thread_errors, AggregateError, CodeParts, ErrorCode, ErrorQueue,
    ErrorQueueIter,
};

// Minimal queue: codes in a deque, strings only for codes listed in `names`.
#[derive(Default)]
struct FixedQueue {
    codes: RefCell<VecDeque<ErrorCode>>,
    names: HashMap<ErrorCode, (&'static str, &'static str, &'static str)>,
    pops: RefCell<usize>,
}

impl FixedQueue {
    fn with(codes: &[ErrorCode]) -> Self {
        Self {
            codes: RefCell::new(codes.iter().copied().collect()),
            ..Self::default()
        }
    }

    fn named(mut self, code: ErrorCode, lib: &'static str, func: &'static str, reason: &'static str) -> Self {
        self.names.insert(code, (lib, func, reason));
        self
    }
}

impl ErrorQueue for FixedQueue {
    fn pop_error(&self) -> ErrorCode {
        *self.pops.borrow_mut() += 1;
        self.codes.borrow_mut().pop_front().unwrap_or(ErrorCode::NONE)
    }

    fn library_string(&self, code: ErrorCode) -> Option<String> {
        self.names.get(&code).map(|n| n.0.to_string())
    }

    fn function_string(&self, code: ErrorCode) -> Option<String> {
        self.names.get(&code).map(|n| n.1.to_string())
    }

    fn reason_string(&self, code: ErrorCode) -> Option<String> {
        self.names.get(&code).map(|n| n.2.to_string())
    }
}

const A: ErrorCode = ErrorCode::pack(13, 104, 168);
const B: ErrorCode = ErrorCode::pack(13, 107, 58);
const C: ErrorCode = ErrorCode::pack(9, 111, 108);

#[test]
fn empty_queue_drains_to_empty_aggregate() {
    let q = FixedQueue::with(&[]);
    let err = drain_current_thread_errors(&q);

    assert!(err.is_empty());
    assert_eq!(err.len(), 0);
    assert_eq!(err.to_string(), AggregateError::EMPTY_MESSAGE);
}

#[test]
fn drains_oldest_first() {
    let q = FixedQueue::with(&[A, B, C])
        .named(A, "asn1 encoding routines", "ASN1_CHECK_TLEN", "wrong tag")
        .named(B, "asn1 encoding routines", "ASN1_ITEM_EX_D2I", "nested asn1 error")
        .named(C, "PEM routines", "PEM_read_bio", "no start line");

    let err = drain_current_thread_errors(&q);

    assert_eq!(err.codes().collect::<Vec<_>>(), vec![A, B, C]);
    assert_eq!(
        err.to_string(),
        "asn1 encoding routines:ASN1_CHECK_TLEN:wrong tag\n\
         asn1 encoding routines:ASN1_ITEM_EX_D2I:nested asn1 error\n\
         PEM routines:PEM_read_bio:no start line"
    );
}

#[test]
fn unknown_codes_render_numerically() {
    let q = FixedQueue::with(&[A]);
    let err = drain_current_thread_errors(&q);

    assert_eq!(err.to_string(), "lib(13):func(104):reason(168)");
}

#[test]
fn v3_codes_leave_function_blank() {
    struct V3(FixedQueue);
    impl ErrorQueue for V3 {
        fn pop_error(&self) -> ErrorCode {
            self.0.pop_error()
        }
        fn library_string(&self, _: ErrorCode) -> Option<String> {
            None
        }
        fn function_string(&self, _: ErrorCode) -> Option<String> {
            None
        }
        fn reason_string(&self, _: ErrorCode) -> Option<String> {
            None
        }
        fn unpack(&self, code: ErrorCode) -> CodeParts {
            CodeParts::from_v3(code)
        }
    }

    // lib 13 << 23 | reason 142
    let code = ErrorCode((13 << 23) | 142);
    let err = drain_current_thread_errors(&V3(FixedQueue::with(&[code])));

    assert_eq!(err.to_string(), "lib(13)::reason(142)");
}

#[test]
fn iterator_stops_at_sentinel_and_stays_stopped() {
    let q = FixedQueue::with(&[A, B]);
    let mut it = ErrorQueueIter::new(&q);

    assert!(it.next().is_some());
    assert!(it.next().is_some());
    assert!(it.next().is_none());
    assert!(it.next().is_none());

    // Two codes plus one sentinel read; the fused iterator does not pop again.
    assert_eq!(*q.pops.borrow(), 3);
}

#[test]
fn discard_counts_dropped_codes() {
    let q = FixedQueue::with(&[A, B, C]);
    assert_eq!(discard_current_thread_errors(&q), 3);
    assert!(drain_current_thread_errors(&q).is_empty());
}

#[test]
fn code_parts_follow_v1_layout() {
    let parts = CodeParts::from_v1(ErrorCode::pack(20, 0xabc, 0x123));
    assert_eq!(parts.library, 20);
    assert_eq!(parts.function, 0xabc);
    assert_eq!(parts.reason, 0x123);
    assert_eq!(ErrorCode::pack(20, 0xabc, 0x123).to_string(), "14ABC123");
}

#[test]
fn aggregate_is_a_leaf_std_error() {
    let q = FixedQueue::with(&[A, C])
        .named(A, "asn1 encoding routines", "ASN1_CHECK_TLEN", "wrong tag")
        .named(C, "PEM routines", "PEM_read_bio", "no start line");

    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(drain_current_thread_errors(&q));

    assert!(boxed.source().is_none());
    assert_eq!(
        boxed.to_string(),
        "asn1 encoding routines:ASN1_CHECK_TLEN:wrong tag\nPEM routines:PEM_read_bio:no start line"
    );

    let wrapped = crate::OsslInitError::from(AggregateError::default());
    let source = std::error::Error::source(&wrapped).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some(AggregateError::EMPTY_MESSAGE));
}
