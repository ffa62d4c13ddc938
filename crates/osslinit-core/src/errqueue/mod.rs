pub mod traits;
pub mod types;

pub mod drain;

pub use traits::*;
pub use types::*;
pub use drain::*;

#[cfg(test)]
mod drain_tests;
