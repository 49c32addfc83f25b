//! Offline verification of generated fixture directories.
//!
//! Reads the files written by `huntseed-generate` back and checks every
//! cross-entity reference against the [`huntseed_core::FixtureLayout`].

pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use engine::VerifyEngine;
pub use errors::EvalError;
pub use metrics::{CheckStats, FileMetrics, VerificationReport};
pub use model::{VerificationResult, VerifyOptions, Violation};
