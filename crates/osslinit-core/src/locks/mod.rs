pub mod bank;
pub mod bridge;

pub use bank::*;
pub use bridge::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    #[error("native library reported a negative lock count: {0}")]
    NegativeSlotCount(i64),

    #[error("lock count {requested} exceeds the configured maximum of {max}")]
    TooManySlots { requested: i64, max: usize },

    #[error("could not allocate {requested} lock slots: {reason}")]
    Allocation { requested: usize, reason: String },
}

#[cfg(test)]
mod bank_tests;
