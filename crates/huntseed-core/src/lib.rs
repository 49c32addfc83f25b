//! Core contracts for huntseed.
//!
//! This crate holds the run configuration, the validated fixture layout, and
//! the closed-form identity rules every generator derives its references from.
//! It performs no I/O.

pub mod config;
pub mod error;
pub mod identity;
pub mod layout;

pub use config::{AmountConfig, AuthConfig, OutputConfig, ScaleConfig, SeedConfig, Secret, TaskSplit};
pub use error::{Error, Result};
pub use layout::{
    ChallengeKind, ChallengeLayout, ChallengePosition, ChatLayout, FixtureLayout, GroupLayout,
    HuntingLayout, TaskLayout, TaskSlice, UserLayout,
};
