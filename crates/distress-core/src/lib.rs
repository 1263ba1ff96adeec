pub mod error;
pub mod math;
pub mod providers;
pub mod scores;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::DistressError;
pub use types::*;

/// Standard result type for all distress-scoring operations
pub type DistressResult<T> = Result<T, DistressError>;
