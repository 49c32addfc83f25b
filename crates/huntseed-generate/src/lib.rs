//! Fixture generation for huntseed.
//!
//! Turns a validated [`huntseed_core::FixtureLayout`] into streamed CSV and
//! NDJSON fixture files, one per [`Stage`], plus a `generation_report.json`
//! describing the run.

pub mod clock;
pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod generators;
pub mod model;
pub mod output;
pub mod progress;
pub mod sink;
pub mod stage;
pub mod token;

pub use clock::RunClock;
pub use engine::{GenerationEngine, GenerationResult, REPORT_FILE};
pub use errors::GenerationError;
pub use faker_rs::{FakeRsFaker, Faker};
pub use model::{GenerateOptions, GenerationReport, RunStatus, StageReport};
pub use sink::{FixtureSink, SinkSummary, with_sink};
pub use stage::Stage;
