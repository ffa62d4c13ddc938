use std::fmt;

use thiserror::Error;

/// A packed native error code. Zero is the empty-queue sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(pub u64);

impl ErrorCode {
    pub const NONE: ErrorCode = ErrorCode(0);

    /// Pack with the 1.x layout: 8-bit library, 12-bit function, 12-bit reason.
    pub const fn pack(library: u32, function: u32, reason: u32) -> Self {
        ErrorCode(
            (((library & 0xff) as u64) << 24) | (((function & 0xfff) as u64) << 12) | ((reason & 0xfff) as u64),
        )
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParts {
    pub library: u32,
    pub function: u32,
    pub reason: u32,
}

impl CodeParts {
    pub fn from_v1(code: ErrorCode) -> Self {
        Self {
            library: ((code.0 >> 24) & 0xff) as u32,
            function: ((code.0 >> 12) & 0xfff) as u32,
            reason: (code.0 & 0xfff) as u32,
        }
    }

    // 3.x moved the library to bits 23..31, widened the reason and dropped function codes.
    pub fn from_v3(code: ErrorCode) -> Self {
        Self {
            library: ((code.0 >> 23) & 0xff) as u32,
            function: 0,
            reason: (code.0 & 0x7f_ffff) as u32,
        }
    }
}

/// One drained queue entry, copied out of native storage.
///
/// Renders as `library:function:reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: ErrorCode,
    pub library: String,
    pub function: String,
    pub reason: String,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.library, self.function, self.reason)
    }
}

/// Every record drained after one failed native call, oldest first.
///
/// An empty aggregate is still an error: the native library does not always
/// queue a code when it reports failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render_records(.records))]
pub struct AggregateError {
    records: Vec<ErrorRecord>,
}

impl AggregateError {
    pub const EMPTY_MESSAGE: &'static str = "native operation failed without queued error codes";

    pub fn new(records: Vec<ErrorRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.records.iter().map(|r| r.code)
    }

    pub fn into_records(self) -> Vec<ErrorRecord> {
        self.records
    }
}

fn render_records(records: &[ErrorRecord]) -> String {
    if records.is_empty() {
        return AggregateError::EMPTY_MESSAGE.to_owned();
    }

    records.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}
