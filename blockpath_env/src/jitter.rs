// Deterministic heading noise for the mock agent.
//
// SplitMix64 (Steele, Lea & Flood, 2014) driving a uniform sample in
// [-amplitude, amplitude). Hand-rolled so the mock needs no RNG crate and
// replays identically on every platform for a given seed.
//
// **Critical constraint: determinism.** The same seed must always produce the
// same sequence. No floating point inside the generator itself; floats only
// appear when a raw `u64` is mapped into a sample.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadingJitter {
    state: u64,
    amplitude_deg: f64,
}

impl HeadingJitter {
    pub fn new(seed: u64, amplitude_deg: f64) -> Self {
        Self {
            state: seed,
            amplitude_deg: amplitude_deg.abs(),
        }
    }

    pub fn amplitude_deg(&self) -> f64 {
        self.amplitude_deg
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1), from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Heading offset in degrees, uniform in [-amplitude, amplitude).
    /// Always 0 for a zero amplitude, without advancing the state.
    pub fn sample(&mut self) -> f64 {
        if self.amplitude_deg == 0.0 {
            return 0.0;
        }
        (self.next_f64() * 2.0 - 1.0) * self.amplitude_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = HeadingJitter::new(7, 2.0);
        let mut b = HeadingJitter::new(7, 2.0);
        for _ in 0..500 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = HeadingJitter::new(1, 2.0);
        let mut b = HeadingJitter::new(2, 2.0);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn known_first_output() {
        // Reference value for SplitMix64 seeded with 0.
        let mut j = HeadingJitter::new(0, 1.0);
        assert_eq!(j.next_u64(), 0xe220_a839_7b1d_cdaf);
    }

    #[test]
    fn samples_stay_within_amplitude() {
        let mut j = HeadingJitter::new(99, 3.0);
        for _ in 0..10_000 {
            let s = j.sample();
            assert!((-3.0..3.0).contains(&s), "sample out of range: {s}");
        }
    }

    #[test]
    fn zero_amplitude_is_silent() {
        let mut j = HeadingJitter::new(5, 0.0);
        let before = j.clone();
        assert_eq!(j.sample(), 0.0);
        assert_eq!(j, before);
    }
}
