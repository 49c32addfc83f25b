use thiserror::Error;

/// Core error type shared across huntseed crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Scale parameters that make identifier derivation inexact.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A derivation was asked for an index outside the resolved layout.
    #[error("{entity} index {index} is out of range (bound {bound})")]
    OutOfRange {
        entity: &'static str,
        index: u64,
        bound: u64,
    },
    /// A derived total does not fit in a 64-bit identifier.
    #[error("identifier overflow: {0}")]
    Overflow(String),
}

impl Error {
    pub(crate) fn out_of_range(entity: &'static str, index: u64, bound: u64) -> Self {
        Self::OutOfRange {
            entity,
            index,
            bound,
        }
    }
}

/// Convenience alias for results returned by huntseed crates.
pub type Result<T> = std::result::Result<T, Error>;
