use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::errqueue::{AggregateError, ErrorCode, ErrorQueue, ErrorRecord};

impl ErrorRecord {
    /// Resolve `code` through the queue's string tables, falling back to numbers.
    pub fn resolve<Q: ErrorQueue + ?Sized>(queue: &Q, code: ErrorCode) -> Self {
        let parts = queue.unpack(code);

        let library = queue
            .library_string(code)
            .unwrap_or_else(|| format!("lib({})", parts.library));
        // 3.x codes have no function number: blank, not func(0).
        let function = queue.function_string(code).unwrap_or_else(|| match parts.function {
            0 => String::new(),
            n => format!("func({n})"),
        });
        let reason = queue
            .reason_string(code)
            .unwrap_or_else(|| format!("reason({})", parts.reason));

        Self {
            code,
            library,
            function,
            reason,
        }
    }
}

/// Pops the calling thread's queue until the sentinel, yielding one record per code.
///
/// `!Send`: the queue it reads belongs to the thread that created it.
pub struct ErrorQueueIter<'q, Q: ?Sized> {
    queue: &'q Q,
    finished: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl<'q, Q: ErrorQueue + ?Sized> ErrorQueueIter<'q, Q> {
    pub fn new(queue: &'q Q) -> Self {
        Self {
            queue,
            finished: false,
            _thread_bound: PhantomData,
        }
    }
}

impl<Q: ErrorQueue + ?Sized> Iterator for ErrorQueueIter<'_, Q> {
    type Item = ErrorRecord;

    fn next(&mut self) -> Option<ErrorRecord> {
        if self.finished {
            return None;
        }

        let code = self.queue.pop_error();
        if code.is_none() {
            self.finished = true;
            return None;
        }

        Some(ErrorRecord::resolve(self.queue, code))
    }
}

impl<Q: ErrorQueue + ?Sized> FusedIterator for ErrorQueueIter<'_, Q> {}

/// Drain everything queued on this thread into one error value.
///
/// Call it on the thread whose native call failed, before that thread makes
/// any other native call.
pub fn drain_current_thread_errors<Q: ErrorQueue + ?Sized>(queue: &Q) -> AggregateError {
    AggregateError::new(ErrorQueueIter::new(queue).collect())
}

/// Drop stale codes without resolving them. Returns how many were dropped.
pub fn discard_current_thread_errors<Q: ErrorQueue + ?Sized>(queue: &Q) -> usize {
    let mut dropped = 0;
    while !queue.pop_error().is_none() {
        dropped += 1;
    }
    dropped
}
