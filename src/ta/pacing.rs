use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DelayRange;

/// Per-TA source of simulated work times and revision decisions.
#[derive(Debug)]
pub struct Pacer {
    rng: StdRng,
}

impl Pacer {
    /// A fixed `seed` gives TA `ta_id` the stream `seed + ta_id`, so runs
    /// repeat while TAs still differ from each other.
    pub fn new(seed: Option<u64>, ta_id: u64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(ta_id)),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// A random duration within `range`, inclusive.
    pub fn delay(&mut self, range: DelayRange) -> Duration {
        let ms = self.rng.gen_range(range.min_ms..=range.max_ms);
        Duration::from_millis(ms)
    }

    pub fn should_revise(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }
}
