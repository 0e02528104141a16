//! Glottal excitation sources. The variant is chosen once per generator
//! and dispatched through a tagged union with one `start_period` /
//! `next_sample` pair, so the per-sample loop pays a single match.

use rand::Rng;

use crate::error::SynthError;
use crate::filter::Resonator;
use crate::noise::white_noise;
use crate::params::GlottalSourceKind;

/// Band-limited pulse source: a resonator configured as a one-pole
/// low-pass with bandwidth `fs / open_phase_length` is driven with the
/// doublet 0, +1, -1, 0, 0, ...
pub(crate) struct ImpulsiveSource {
    sample_rate: usize,
    resonator: Resonator,
    /// current sample position within the F0 period
    position_in_period: usize,
}

impl ImpulsiveSource {
    fn new(sample_rate: usize) -> Self {
        let mut resonator = Resonator::new(sample_rate);
        resonator.set_mute();
        ImpulsiveSource {
            sample_rate,
            resonator,
            position_in_period: 0,
        }
    }

    fn start_period(&mut self, open_phase_length: usize) -> Result<(), SynthError> {
        self.position_in_period = 0;
        if open_phase_length == 0 {
            // silent period; muting also clears the ringing state
            self.resonator.set_mute();
            return Ok(());
        }
        let bw = self.sample_rate as f64 / open_phase_length as f64;
        self.resonator.set(0.0, bw, 1.0)?;
        self.resonator.adjust_impulse_gain(1.0);
        Ok(())
    }

    fn next(&mut self) -> f64 {
        let pulse = match self.position_in_period {
            1 => 1.0,
            2 => -1.0,
            _ => 0.0,
        };
        self.position_in_period += 1;
        self.resonator.step(pulse)
    }
}

/// "Natural" source following the KLGLOTT88 model: the derivative of the
/// glottal flow `t^2 - t^3`, integrated sample by sample from its second
/// derivative. At the end of the open phase the value jumps back to zero;
/// the classic Klatt model leaves that collision unsmoothed.
pub(crate) struct NaturalSource {
    /// current signal value
    value: f64,
    /// current first derivative
    slope: f64,
    /// current second derivative
    curve: f64,
    /// open glottis phase length in samples
    open_phase_length: usize,
    /// current sample position within the F0 period
    position_in_period: usize,
}

impl NaturalSource {
    fn new() -> Self {
        NaturalSource {
            value: 0.0,
            slope: 0.0,
            curve: 0.0,
            open_phase_length: 0,
            position_in_period: 0,
        }
    }

    fn start_period(&mut self, open_phase_length: usize) {
        const AMPLIFICATION: f64 = 5.0;
        self.open_phase_length = open_phase_length;
        self.position_in_period = 0;
        self.value = 0.0;
        if open_phase_length == 0 {
            self.slope = 0.0;
            self.curve = 0.0;
            return;
        }
        let t = open_phase_length as f64;
        self.curve = -AMPLIFICATION / (t * t);
        self.slope = -self.curve * t / 3.0;
    }

    fn next(&mut self) -> f64 {
        let position = self.position_in_period;
        self.position_in_period += 1;
        if position >= self.open_phase_length {
            self.value = 0.0;
            return 0.0;
        }
        self.slope += self.curve;
        self.value += self.slope;
        self.value
    }
}

/// Glottal excitation, one variant per [`GlottalSourceKind`].
pub(crate) enum GlottalSource {
    Impulsive(ImpulsiveSource),
    Natural(NaturalSource),
    Noise,
}

impl GlottalSource {
    pub fn new(kind: GlottalSourceKind, sample_rate: usize) -> Self {
        match kind {
            GlottalSourceKind::Impulsive => {
                GlottalSource::Impulsive(ImpulsiveSource::new(sample_rate))
            }
            GlottalSourceKind::Natural => GlottalSource::Natural(NaturalSource::new()),
            GlottalSourceKind::Noise => GlottalSource::Noise,
        }
    }

    /// Re-initializes the source for a new F0 period.
    pub fn start_period(&mut self, open_phase_length: usize) -> Result<(), SynthError> {
        match self {
            GlottalSource::Impulsive(source) => source.start_period(open_phase_length),
            GlottalSource::Natural(source) => {
                source.start_period(open_phase_length);
                Ok(())
            }
            GlottalSource::Noise => Ok(()),
        }
    }

    /// Advances the source by one sample.
    pub fn next_sample<R: Rng>(&mut self, rng: &mut R) -> f64 {
        match self {
            GlottalSource::Impulsive(source) => source.next(),
            GlottalSource::Natural(source) => source.next(),
            GlottalSource::Noise => white_noise(rng),
        }
    }
}
