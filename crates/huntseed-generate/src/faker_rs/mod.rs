//! Cosmetic randomness for descriptive fields.
//!
//! Identifiers never come from here. Generators receive a [`Faker`] by value,
//! so swapping the source (or pinning it in tests) cannot shift any id.

mod adapter;

pub use adapter::FakeRsFaker;

use crate::stage::Stage;

/// Source of names, sentences, URLs and opaque tokens.
pub trait Faker {
    fn full_name(&mut self) -> String;
    fn email(&mut self) -> String;
    fn company_name(&mut self) -> String;
    fn catch_phrase(&mut self) -> String;
    fn image_url(&mut self) -> String;
    fn url(&mut self) -> String;
    fn sentence(&mut self) -> String;
    /// Inclusive random count in `min..=max`.
    fn count_between(&mut self, min: usize, max: usize) -> usize;
    /// Opaque unique value (UUID v4 text form).
    fn opaque_token(&mut self) -> String;

    fn sentences(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| self.sentence())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn url_list(&mut self, min: usize, max: usize) -> Vec<String> {
        let count = self.count_between(min, max);
        (0..count).map(|_| self.url()).collect()
    }
}

/// Per-stage seed so each stage is reproducible on its own.
pub fn stage_seed(seed: u64, stage: Stage) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in stage.file_name().as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
