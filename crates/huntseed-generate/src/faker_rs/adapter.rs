use fake::Fake;
use fake::faker::company::en::{CatchPhrase, CompanyName};
use fake::faker::internet::en::{DomainSuffix, SafeEmail};
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::Name;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Faker, stage_seed};
use crate::stage::Stage;

/// [`Faker`] backed by the `fake` crate and a seeded ChaCha stream.
pub struct FakeRsFaker {
    rng: ChaCha8Rng,
}

impl FakeRsFaker {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn for_stage(seed: u64, stage: Stage) -> Self {
        Self::seeded(stage_seed(seed, stage))
    }

    fn word(&mut self) -> String {
        let word: String = Word().fake_with_rng(&mut self.rng);
        word.to_lowercase()
    }
}

impl Faker for FakeRsFaker {
    fn full_name(&mut self) -> String {
        Name().fake_with_rng(&mut self.rng)
    }

    fn email(&mut self) -> String {
        SafeEmail().fake_with_rng(&mut self.rng)
    }

    fn company_name(&mut self) -> String {
        CompanyName().fake_with_rng(&mut self.rng)
    }

    fn catch_phrase(&mut self) -> String {
        CatchPhrase().fake_with_rng(&mut self.rng)
    }

    fn image_url(&mut self) -> String {
        let seed = self.word();
        let width = 320 * self.rng.random_range(1..=4_u32);
        let height = 240 * self.rng.random_range(1..=4_u32);
        format!("https://picsum.photos/seed/{seed}/{width}/{height}")
    }

    fn url(&mut self) -> String {
        let host = self.word();
        let suffix: String = DomainSuffix().fake_with_rng(&mut self.rng);
        let path = self.word();
        format!("https://{host}.{suffix}/{path}")
    }

    fn sentence(&mut self) -> String {
        Sentence(3..9).fake_with_rng(&mut self.rng)
    }

    fn count_between(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    fn opaque_token(&mut self) -> String {
        let mut bytes = [0_u8; 16];
        self.rng.fill_bytes(&mut bytes);
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }
}
