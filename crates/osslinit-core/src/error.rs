use thiserror::Error;

use crate::{errqueue::AggregateError, init::ConfigError};

#[derive(Debug, Error)]
pub enum OsslInitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("native library errors: {0}")]
    Native(#[from] AggregateError),
}
