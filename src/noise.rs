//! Noise sources. All draws go through the caller-supplied RNG so a
//! seeded generator renders reproducibly.

use core::f64::consts::PI;

use rand::Rng;

use crate::error::SynthError;
use crate::filter::LpFilter1;
use crate::math::{cos, sqrt};

/// Returns uniform white noise in [-1, +1).
/// The slight asymmetry of the half-open range is tolerated.
pub(crate) fn white_noise<R: Rng>(rng: &mut R) -> f64 {
    rng.random_range(-1.0..1.0)
}

/// A low-pass filtered noise source.
///
/// The legacy program used a first-order LP filter with b = 0.75 at a
/// 10 kHz sample rate. The filter here reproduces that response at the
/// configured sample rate by matching the gain at 1 kHz, and applies the
/// amplitude compensation `2.5 * sqrt(fs / 10000)`. The square-root law
/// follows from the output variance of a first-order LP driven by white
/// noise, `a^2 / (1 - b^2)`, and holds the RMS level steady across
/// sample rates.
pub(crate) struct LpNoiseSource {
    lp_filter: LpFilter1,
}

impl LpNoiseSource {
    pub fn new(sample_rate: usize) -> Result<Self, SynthError> {
        let legacy_b = 0.75;
        let legacy_sample_rate = 10000.0;
        let f = 1000.0;
        let w = 2.0 * PI * f / legacy_sample_rate;
        let g = (1.0 - legacy_b) / sqrt(1.0 - 2.0 * legacy_b * cos(w) + legacy_b * legacy_b);
        let extra_gain = 2.5 * sqrt(sample_rate as f64 / 10000.0);
        let mut lp_filter = LpFilter1::new(sample_rate);
        lp_filter.set(f, g, extra_gain)?;
        Ok(LpNoiseSource { lp_filter })
    }

    /// Returns the next LP-filtered noise sample.
    pub fn next<R: Rng>(&mut self, rng: &mut R) -> f64 {
        self.lp_filter.step(white_noise(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn white_noise_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let x = white_noise(&mut rng);
            assert!((-1.0..1.0).contains(&x), "out of range: {x}");
        }
    }

    #[test]
    fn amplitude_is_invariant_across_sample_rates() {
        let rms_10k = rms_over_one_second(10_000);
        let rms_44k = rms_over_one_second(44_100);
        let ratio = rms_44k / rms_10k;
        assert!((0.9..1.1).contains(&ratio), "rms ratio {ratio}");
    }

    #[test]
    fn construction_fails_when_nyquist_is_below_the_match_point() {
        // the response is matched at 1 kHz, which must be below fs/2
        assert!(LpNoiseSource::new(1500).is_err());
    }

    fn rms_over_one_second(sample_rate: usize) -> f64 {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut source = LpNoiseSource::new(sample_rate).unwrap();
        let energy: f64 = (0..sample_rate)
            .map(|_| {
                let s = source.next(&mut rng);
                s * s
            })
            .sum();
        sqrt(energy / sample_rate as f64)
    }
}
