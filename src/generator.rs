//! The sound generator: period-synchronous parameter scheduling, the
//! cascade and parallel filter branches, and the per-sample pipeline.
//!
//! Data flow per sample: glottal source -> tilt filter -> (+ breathiness
//! during the open phase) -> cascade branch and parallel branch, each
//! gated by its enable flag -> sum -> output low-pass -> overall gain.

use alloc::vec;
use alloc::vec::Vec;
use core::f64::consts::PI;

use rand::Rng;

use crate::error::SynthError;
use crate::filter::{AntiResonator, DifferencingFilter, LpFilter1, Resonator};
use crate::glottal::GlottalSource;
use crate::math::{cos, round, sin, sqrt};
use crate::noise::{white_noise, LpNoiseSource};
use crate::params::{db_to_lin, FrameParams, MainParams, MAX_ORAL_FORMANTS};

/// Scalar state derived from the active frame, refreshed at each period
/// boundary. Keeping plain copies of the per-sample inputs here means the
/// hot path never reads `FrameParams` itself.
#[derive(Debug, Clone, Copy, Default)]
struct FrameState {
    /// linear breathiness level
    breathiness_lin: f64,
    /// linear overall gain
    gain_lin: f64,

    // Cascade branch:
    cascade_enabled: bool,
    /// linear voicing amplitude for the cascade branch
    cascade_voicing_lin: f64,
    /// linear aspiration amplitude for the cascade branch
    cascade_aspiration_lin: f64,
    cascade_aspiration_mod: f64,

    // Parallel branch:
    parallel_enabled: bool,
    /// linear voicing amplitude for the parallel branch
    parallel_voicing_lin: f64,
    /// linear aspiration amplitude for the parallel branch
    parallel_aspiration_lin: f64,
    parallel_aspiration_mod: f64,
    /// linear frication noise level
    frication_lin: f64,
    frication_mod: f64,
    /// linear bypass level
    parallel_bypass_lin: f64,
}

impl FrameState {
    fn derive(frame: &FrameParams) -> Self {
        // A NaN gain selects automatic gain control: the per-sample gain
        // is unity and the rendered buffer is rescaled afterwards.
        let gain_db = if frame.gain_db.is_nan() {
            0.0
        } else {
            frame.gain_db
        };
        FrameState {
            breathiness_lin: db_to_lin(frame.breathiness_db),
            gain_lin: db_to_lin(gain_db),
            cascade_enabled: frame.cascade_enabled,
            cascade_voicing_lin: db_to_lin(frame.cascade_voicing_db),
            cascade_aspiration_lin: db_to_lin(frame.cascade_aspiration_db),
            cascade_aspiration_mod: frame.cascade_aspiration_mod,
            parallel_enabled: frame.parallel_enabled,
            parallel_voicing_lin: db_to_lin(frame.parallel_voicing_db),
            parallel_aspiration_lin: db_to_lin(frame.parallel_aspiration_db),
            parallel_aspiration_mod: frame.parallel_aspiration_mod,
            frication_lin: db_to_lin(frame.frication_db),
            frication_mod: frame.frication_mod,
            parallel_bypass_lin: db_to_lin(frame.parallel_bypass_db),
        }
    }
}

/// State of the current F0 period.
#[derive(Debug, Clone, Copy, Default)]
struct PeriodState {
    /// modulated fundamental frequency for this period, in Hz, or 0
    f0: f64,
    /// period length in samples
    period_length: usize,
    /// open glottis phase length in samples
    open_phase_length: usize,
    /// current sample position within the period
    position_in_period: usize,
}

/// Cascade vocal-tract model: nasal antiformant, nasal formant and up to
/// six oral formant resonators in series.
struct CascadeBranch {
    aspiration_noise: LpNoiseSource,
    nasal_antiformant: AntiResonator,
    nasal_formant: Resonator,
    oral_formants: Vec<Resonator>,
}

impl CascadeBranch {
    fn new(sample_rate: usize) -> Result<Self, SynthError> {
        Ok(CascadeBranch {
            aspiration_noise: LpNoiseSource::new(sample_rate)?,
            nasal_antiformant: AntiResonator::new(sample_rate),
            nasal_formant: Resonator::new(sample_rate),
            oral_formants: (0..MAX_ORAL_FORMANTS)
                .map(|_| Resonator::new(sample_rate))
                .collect(),
        })
    }

    fn configure(&mut self, frame: &FrameParams) -> Result<(), SynthError> {
        if usable(frame.nasal_antiformant_freq) && usable(frame.nasal_antiformant_bw) {
            self.nasal_antiformant
                .set(frame.nasal_antiformant_freq, frame.nasal_antiformant_bw)?;
        } else {
            self.nasal_antiformant.set_passthrough();
        }
        if usable(frame.nasal_formant_freq) && usable(frame.nasal_formant_bw) {
            self.nasal_formant
                .set(frame.nasal_formant_freq, frame.nasal_formant_bw, 1.0)?;
        } else {
            self.nasal_formant.set_passthrough();
        }
        for (i, resonator) in self.oral_formants.iter_mut().enumerate() {
            let f = formant_entry(&frame.oral_formant_freq, i);
            let bw = formant_entry(&frame.oral_formant_bw, i);
            if usable(f) && usable(bw) {
                resonator.set(f, bw, 1.0)?;
            } else {
                resonator.set_passthrough();
            }
        }
        Ok(())
    }

    fn step<R: Rng>(
        &mut self,
        rng: &mut R,
        voice: f64,
        f_state: &FrameState,
        period: &PeriodState,
    ) -> f64 {
        // glottal turbulence is louder near closure, so aspiration is
        // modulated down only in the second half of the period
        let modulation = if period.position_in_period >= period.period_length / 2 {
            f_state.cascade_aspiration_mod
        } else {
            0.0
        };
        let aspiration =
            self.aspiration_noise.next(rng) * f_state.cascade_aspiration_lin * (1.0 - modulation);
        let mut v = voice * f_state.cascade_voicing_lin + aspiration;
        v = self.nasal_antiformant.step(v);
        v = self.nasal_formant.step(v);
        for resonator in &mut self.oral_formants {
            v = resonator.step(v);
        }
        v
    }
}

/// Parallel branch: the nasal formant and F1 are fed by the raw source to
/// preserve low-frequency energy; F2..F6 and the bypass are fed by the
/// differenced source plus frication noise, with alternating signs on
/// F2..F6 to compensate phase interference between adjacent resonators
/// (Klatt 1980, Fig. 13).
struct ParallelBranch {
    sample_rate: usize,
    aspiration_noise: LpNoiseSource,
    frication_noise: LpNoiseSource,
    differencing: DifferencingFilter,
    nasal_formant: Resonator,
    oral_formants: Vec<Resonator>,
}

impl ParallelBranch {
    fn new(sample_rate: usize) -> Result<Self, SynthError> {
        Ok(ParallelBranch {
            sample_rate,
            aspiration_noise: LpNoiseSource::new(sample_rate)?,
            frication_noise: LpNoiseSource::new(sample_rate)?,
            differencing: DifferencingFilter::new(),
            nasal_formant: Resonator::new(sample_rate),
            oral_formants: (0..MAX_ORAL_FORMANTS)
                .map(|_| Resonator::new(sample_rate))
                .collect(),
        })
    }

    fn configure(&mut self, frame: &FrameParams) -> Result<(), SynthError> {
        let nasal_gain = db_to_lin(frame.nasal_formant_db);
        if usable(frame.nasal_formant_freq) && usable(frame.nasal_formant_bw) && nasal_gain > 0.0 {
            self.nasal_formant
                .set(frame.nasal_formant_freq, frame.nasal_formant_bw, 1.0)?;
            self.nasal_formant.adjust_peak_gain(nasal_gain)?;
        } else {
            self.nasal_formant.set_mute();
        }
        for (i, resonator) in self.oral_formants.iter_mut().enumerate() {
            let f = formant_entry(&frame.oral_formant_freq, i);
            let bw = formant_entry(&frame.oral_formant_bw, i);
            let peak_gain = db_to_lin(formant_entry(&frame.oral_formant_db, i));
            if usable(f) && usable(bw) && peak_gain > 0.0 {
                resonator.set(f, bw, 1.0)?;
                // F2..F6 receive the differenced source; dividing by the
                // differencing filter's gain at f makes the configured dB
                // value the actual peak level
                let w = 2.0 * PI * f / self.sample_rate as f64;
                let diff_gain = sqrt(2.0 - 2.0 * cos(w));
                let gain = if i >= 1 { peak_gain / diff_gain } else { peak_gain };
                resonator.adjust_peak_gain(gain)?;
            } else {
                resonator.set_mute();
            }
        }
        Ok(())
    }

    fn step<R: Rng>(
        &mut self,
        rng: &mut R,
        voice: f64,
        f_state: &FrameState,
        period: &PeriodState,
    ) -> f64 {
        let second_half = period.position_in_period >= period.period_length / 2;
        let aspiration_mod = if second_half {
            f_state.parallel_aspiration_mod
        } else {
            0.0
        };
        let aspiration = self.aspiration_noise.next(rng)
            * f_state.parallel_aspiration_lin
            * (1.0 - aspiration_mod);
        let source = voice * f_state.parallel_voicing_lin + aspiration;
        let source_difference = self.differencing.step(source);
        let frication_mod = if second_half { f_state.frication_mod } else { 0.0 };
        let frication =
            self.frication_noise.next(rng) * f_state.frication_lin * (1.0 - frication_mod);
        let source2 = source_difference + frication;
        let mut v = self.nasal_formant.step(source);
        v += self.oral_formants[0].step(source);
        for (i, resonator) in self.oral_formants.iter_mut().enumerate().skip(1) {
            // (-1)^(i+1): F2 and every second formant above it add in
            // phase, F3/F5 are negated
            let alternating_sign = if i % 2 == 0 { -1.0 } else { 1.0 };
            v += alternating_sign * resonator.step(source2);
        }
        v + f_state.parallel_bypass_lin * source2
    }
}

/// Sound generator.
///
/// Owns every filter and source. It persists across frames, carrying
/// filter state over frame boundaries to avoid discontinuities; new frame
/// parameters queued by [`Generator::generate_frame`] take effect at the
/// next F0 period boundary.
pub struct Generator<R> {
    sample_rate: usize,
    rng: R,
    /// currently active frame parameters
    active_frame: Option<FrameParams>,
    /// frame parameters queued for the next period boundary
    pending_frame: Option<FrameParams>,
    f_state: FrameState,
    period: PeriodState,
    /// current absolute sample position
    abs_position: usize,
    /// random flutter time offset in seconds, fixed at construction to
    /// decorrelate multiple generators
    flutter_offset: f64,
    glottal_source: GlottalSource,
    /// spectral tilt filter
    tilt_filter: LpFilter1,
    cascade: CascadeBranch,
    parallel: ParallelBranch,
    /// output low-pass filter
    output_lp: Resonator,
}

impl<R: Rng> Generator<R> {
    pub fn new(main: &MainParams, mut rng: R) -> Result<Self, SynthError> {
        let sample_rate = main.sample_rate;
        let flutter_offset = rng.random_range(0.0..1000.0);
        let mut output_lp = Resonator::new(sample_rate);
        output_lp.set(0.0, sample_rate as f64 / 2.0, 1.0)?;
        Ok(Generator {
            sample_rate,
            glottal_source: GlottalSource::new(main.glottal_source, sample_rate),
            tilt_filter: LpFilter1::new(sample_rate),
            cascade: CascadeBranch::new(sample_rate)?,
            parallel: ParallelBranch::new(sample_rate)?,
            output_lp,
            rng,
            active_frame: None,
            pending_frame: None,
            f_state: FrameState::default(),
            period: PeriodState::default(),
            abs_position: 0,
            flutter_offset,
        })
    }

    /// Generates one frame of sound into `out`.
    ///
    /// The buffer length determines the number of samples;
    /// `frame.duration` is ignored here. The new parameters take effect
    /// at the next F0 period boundary.
    ///
    /// # Errors
    ///
    /// [`SynthError::ReusedFrameParams`] if `frame` has the same value as
    /// the previously supplied frame (nothing is written in that case),
    /// or a filter configuration error for out-of-range parameters.
    pub fn generate_frame(
        &mut self,
        frame: &FrameParams,
        out: &mut [f64],
    ) -> Result<(), SynthError> {
        if self
            .last_accepted()
            .is_some_and(|last| last.same_value(frame))
        {
            return Err(SynthError::ReusedFrameParams);
        }
        self.pending_frame = Some(frame.clone());

        for out_sample in out.iter_mut() {
            if self.period.position_in_period >= self.period.period_length {
                self.begin_period()?;
            }
            *out_sample = self.next_sample();
            self.period.position_in_period += 1;
            self.abs_position += 1;
        }

        if frame.gain_db.is_nan() {
            normalize_rms(out, frame.agc_rms_level);
        }
        Ok(())
    }

    fn last_accepted(&self) -> Option<&FrameParams> {
        self.pending_frame.as_ref().or(self.active_frame.as_ref())
    }

    fn next_sample(&mut self) -> f64 {
        let mut voice = self.glottal_source.next_sample(&mut self.rng);
        voice = self.tilt_filter.step(voice);
        if self.period.position_in_period < self.period.open_phase_length {
            // add breathiness (turbulence) while the glottis is open
            voice += white_noise(&mut self.rng) * self.f_state.breathiness_lin;
        }
        let cascade_out = if self.f_state.cascade_enabled {
            self.cascade
                .step(&mut self.rng, voice, &self.f_state, &self.period)
        } else {
            0.0
        };
        let parallel_out = if self.f_state.parallel_enabled {
            self.parallel
                .step(&mut self.rng, voice, &self.f_state, &self.period)
        } else {
            0.0
        };
        let out = self.output_lp.step(cascade_out + parallel_out);
        out * self.f_state.gain_lin
    }

    /// Starts a new F0 period: adopts pending frame parameters, applies
    /// flutter, computes the period and open phase lengths and restarts
    /// the glottal source.
    fn begin_period(&mut self) -> Result<(), SynthError> {
        if let Some(pending) = self.pending_frame.take() {
            // new frame parameters are only activated at period
            // boundaries, so filter coefficients never change mid-period
            self.apply_frame_params(&pending)?;
            self.active_frame = Some(pending);
        }
        let Some(frame) = self.active_frame.as_ref() else {
            return Ok(());
        };
        let flutter_time = self.abs_position as f64 / self.sample_rate as f64 + self.flutter_offset;
        self.period.f0 = modulate_f0(frame.f0, frame.flutter_level, flutter_time);
        self.period.period_length = if self.period.f0 > 0.0 {
            (round(self.sample_rate as f64 / self.period.f0) as usize).max(1)
        } else {
            1
        };
        self.period.open_phase_length = if self.period.period_length > 1 {
            round(self.period.period_length as f64 * frame.open_phase_ratio) as usize
        } else {
            0
        };
        self.period.position_in_period = 0;
        self.glottal_source.start_period(self.period.open_phase_length)
    }

    fn apply_frame_params(&mut self, frame: &FrameParams) -> Result<(), SynthError> {
        self.f_state = FrameState::derive(frame);
        configure_tilt_filter(&mut self.tilt_filter, frame.tilt_db)?;
        self.cascade.configure(frame)?;
        self.parallel.configure(frame)?;
        Ok(())
    }
}

/// Generates a sound consisting of multiple frames.
///
/// Each frame occupies `round(duration * sample_rate)` samples of the
/// returned buffer, rendered by one generator so filter state carries
/// across frame boundaries.
///
/// # Errors
///
/// Propagates the first [`SynthError`] from construction or any frame.
pub fn generate_sound<R: Rng>(
    main: &MainParams,
    frames: &[FrameParams],
    rng: R,
) -> Result<Vec<f64>, SynthError> {
    let mut generator = Generator::new(main, rng)?;
    let total: usize = frames
        .iter()
        .map(|frame| frame_sample_count(frame, main.sample_rate))
        .sum();
    let mut out = vec![0.0; total];
    let mut position = 0;
    for frame in frames {
        let length = frame_sample_count(frame, main.sample_rate);
        generator.generate_frame(frame, &mut out[position..position + length])?;
        position += length;
    }
    Ok(out)
}

fn frame_sample_count(frame: &FrameParams, sample_rate: usize) -> usize {
    round(frame.duration * sample_rate as f64) as usize
}

/// Modulates the fundamental frequency with slow quasi-periodic flutter.
///
/// The sine frequencies 12.7, 7.1 and 4.7 Hz take a long time to realign,
/// so the perturbation pattern does not audibly repeat. A flutter level
/// of 0.25 gives a quite realistic deviation from constant pitch.
fn modulate_f0(f0: f64, flutter_level: f64, time: f64) -> f64 {
    if flutter_level <= 0.0 {
        return f0;
    }
    let w = 2.0 * PI * time;
    let perturbation = sin(12.7 * w) + sin(7.1 * w) + sin(4.7 * w);
    f0 * (1.0 + perturbation * flutter_level / 50.0)
}

fn configure_tilt_filter(filter: &mut LpFilter1, tilt_db: f64) -> Result<(), SynthError> {
    if tilt_db == 0.0 || tilt_db.is_nan() {
        filter.set_passthrough();
        Ok(())
    } else {
        filter.set(3000.0, db_to_lin(-tilt_db), 1.0)
    }
}

/// A formant parameter is usable when it is finite and non-zero; 0 and
/// the NaN sentinel both disable the formant.
fn usable(x: f64) -> bool {
    x.is_finite() && x != 0.0
}

/// Oral formant arrays are semantically of length `MAX_ORAL_FORMANTS`;
/// a missing tail entry behaves like the NaN sentinel.
fn formant_entry(values: &[f64], i: usize) -> f64 {
    values.get(i).copied().unwrap_or(f64::NAN)
}

/// Automatic gain control: rescales the buffer to the target RMS level.
/// An all-zero buffer is left untouched.
fn normalize_rms(buf: &mut [f64], target_rms: f64) {
    let rms = compute_rms(buf);
    if rms == 0.0 {
        return;
    }
    let factor = target_rms / rms;
    for sample in buf.iter_mut() {
        *sample *= factor;
    }
}

fn compute_rms(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    sqrt(buf.iter().map(|sample| sample * sample).sum::<f64>() / buf.len() as f64)
}
