pub mod traits;
pub mod types;

pub mod sequencer;

pub use traits::*;
pub use types::*;
pub use sequencer::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config appname must not be empty")]
    EmptyAppname,

    #[error("config appname contains a NUL byte at offset {0}")]
    NulInAppname(usize),

    #[error("max lock slots must be at least 1")]
    ZeroLockSlots,

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}
