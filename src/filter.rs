//! Primitive filters of the synthesis core: a first-order IIR low-pass, a
//! two-pole resonator, a two-zero anti-resonator and a first-difference
//! high-pass.
//!
//! Coefficients are only ever rewritten at F0 period boundaries; the
//! per-sample `step` methods read them. Reconfiguring a filter keeps its
//! delay state so the signal stays continuous, while switching to
//! passthrough or muted clears the state so a later return to active does
//! not click.

use core::f64::consts::PI;

use crate::error::SynthError;
use crate::math::{cos, exp, sqrt};

/// Operating mode shared by all coefficient filters. The per-sample path
/// branches on this exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterMode {
    Active,
    /// Output equals input.
    Passthrough,
    /// Output is zero.
    Muted,
}

/// A first-order IIR low-pass filter.
///
/// # Formulas
/// ```text
///    y[n] = a * x[n] + b * y[n-1]
///    w = 2 * PI * f / sampleRate
///    |H(w)| = a / sqrt(1 - 2b * cos(w) + b^2)
///    |H(0)| = a / (1 - b)                          for b < 1
/// ```
/// `set` solves for `b` so that the gain at `f` is `g` relative to a DC
/// gain of 1:
/// ```text
///    (g^2 - 1) * b^2 + 2 * (1 - g^2 * cos(w)) * b + g^2 - 1 = 0
///    q = (1 - g^2 * cos(w)) / (1 - g^2)
///    b^2 - 2 * q * b + 1 = 0
///    b = q - sqrt(q^2 - 1)
/// ```
/// and then scales the whole response by `extra_gain`, which becomes the
/// DC gain.
pub(crate) struct LpFilter1 {
    sample_rate: usize,
    /// filter coefficient a
    a: f64,
    /// filter coefficient b
    b: f64,
    /// y[n-1], last output value
    y1: f64,
    mode: FilterMode,
}

impl LpFilter1 {
    pub fn new(sample_rate: usize) -> Self {
        LpFilter1 {
            sample_rate,
            a: 0.0,
            b: 0.0,
            y1: 0.0,
            mode: FilterMode::Passthrough,
        }
    }

    /// Adjusts the coefficients without resetting the delay state.
    /// `f` must lie in (0, fs/2), `g` in (0, 1); all arguments must be
    /// finite.
    pub fn set(&mut self, f: f64, g: f64, extra_gain: f64) -> Result<(), SynthError> {
        let nyquist = self.sample_rate as f64 / 2.0;
        if !f.is_finite()
            || f <= 0.0
            || f >= nyquist
            || !g.is_finite()
            || g <= 0.0
            || g >= 1.0
            || !extra_gain.is_finite()
        {
            return Err(SynthError::InvalidFilterParameter("low-pass"));
        }
        let w = 2.0 * PI * f / self.sample_rate as f64;
        let q = (1.0 - g * g * cos(w)) / (1.0 - g * g);
        self.b = q - sqrt(q * q - 1.0);
        self.a = (1.0 - self.b) * extra_gain;
        self.mode = FilterMode::Active;
        Ok(())
    }

    pub fn set_passthrough(&mut self) {
        self.mode = FilterMode::Passthrough;
        self.y1 = 0.0;
    }

    #[allow(dead_code)]
    pub fn set_mute(&mut self) {
        self.mode = FilterMode::Muted;
        self.y1 = 0.0;
    }

    pub fn step(&mut self, x: f64) -> f64 {
        match self.mode {
            FilterMode::Passthrough => x,
            FilterMode::Muted => 0.0,
            FilterMode::Active => {
                let y = self.a * x + self.b * self.y1;
                self.y1 = y;
                y
            }
        }
    }
}

/// A Klatt resonator, a second-order IIR filter. With `f = 0` it
/// degenerates into a low-pass.
///
/// # Formulas
/// ```text
///    y[n] = a * x[n] + b * y[n-1] + c * y[n-2]
///    r = exp(-PI * bw / sampleRate)
///    w0 = 2 * PI * f / sampleRate
///    b = 2 * r * cos(w0)
///    c = -r^2
///    |H(0)| = a / (1 - b - c)
///    |H(f)| = a / (1 - r)            (approximately, at the peak)
/// ```
pub(crate) struct Resonator {
    sample_rate: usize,
    /// filter coefficient a
    a: f64,
    /// filter coefficient b
    b: f64,
    /// filter coefficient c
    c: f64,
    /// y[n-1], last output value
    y1: f64,
    /// y[n-2], second-last output value
    y2: f64,
    r: f64,
    mode: FilterMode,
}

impl Resonator {
    pub fn new(sample_rate: usize) -> Self {
        Resonator {
            sample_rate,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            y1: 0.0,
            y2: 0.0,
            r: 0.0,
            mode: FilterMode::Passthrough,
        }
    }

    /// Adjusts the coefficients without resetting the delay state.
    /// `f` may be 0 for low-pass use; it must lie in [0, fs/2). `bw` and
    /// `dc_gain` must be positive and finite.
    pub fn set(&mut self, f: f64, bw: f64, dc_gain: f64) -> Result<(), SynthError> {
        let nyquist = self.sample_rate as f64 / 2.0;
        if !f.is_finite()
            || f < 0.0
            || f >= nyquist
            || !bw.is_finite()
            || bw <= 0.0
            || !dc_gain.is_finite()
            || dc_gain <= 0.0
        {
            return Err(SynthError::InvalidFilterParameter("resonator"));
        }
        self.r = exp(-PI * bw / self.sample_rate as f64);
        let w = 2.0 * PI * f / self.sample_rate as f64;
        self.c = -(self.r * self.r);
        self.b = 2.0 * self.r * cos(w);
        self.a = (1.0 - self.b - self.c) * dc_gain;
        self.mode = FilterMode::Active;
        Ok(())
    }

    pub fn set_passthrough(&mut self) {
        self.mode = FilterMode::Passthrough;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn set_mute(&mut self) {
        self.mode = FilterMode::Muted;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    /// Overrides coefficient `a` directly, for impulse-driven use.
    pub fn adjust_impulse_gain(&mut self, new_a: f64) {
        self.a = new_a;
    }

    /// Scales the response so the gain at the resonance frequency is
    /// `peak_gain`.
    pub fn adjust_peak_gain(&mut self, peak_gain: f64) -> Result<(), SynthError> {
        if !peak_gain.is_finite() || peak_gain <= 0.0 {
            return Err(SynthError::InvalidPeakGain);
        }
        self.a = peak_gain * (1.0 - self.r);
        Ok(())
    }

    pub fn step(&mut self, x: f64) -> f64 {
        match self.mode {
            FilterMode::Passthrough => x,
            FilterMode::Muted => 0.0,
            FilterMode::Active => {
                let y = self.a * x + self.b * self.y1 + self.c * self.y2;
                self.y2 = self.y1;
                self.y1 = y;
                y
            }
        }
    }
}

/// A Klatt anti-resonator, a second-order FIR filter. The coefficients are
/// the inverted resonator coefficients:
/// ```text
///    y[n] = a * x[n] + b * x[n-1] + c * x[n-2]
///    a = 1 / a0,  b = -b0 / a0,  c = -c0 / a0
/// ```
/// where `a0`, `b0`, `c0` are the resonator coefficients for the same
/// frequency and bandwidth. DC gain is 1.
pub(crate) struct AntiResonator {
    sample_rate: usize,
    a: f64,
    b: f64,
    c: f64,
    /// x[n-1], last input value
    x1: f64,
    /// x[n-2], second-last input value
    x2: f64,
    mode: FilterMode,
}

impl AntiResonator {
    pub fn new(sample_rate: usize) -> Self {
        AntiResonator {
            sample_rate,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            x1: 0.0,
            x2: 0.0,
            mode: FilterMode::Passthrough,
        }
    }

    /// Adjusts the coefficients without resetting the delay state.
    /// `f` must lie in (0, fs/2), `bw` must be positive; both finite.
    pub fn set(&mut self, f: f64, bw: f64) -> Result<(), SynthError> {
        let nyquist = self.sample_rate as f64 / 2.0;
        if !f.is_finite() || f <= 0.0 || f >= nyquist || !bw.is_finite() || bw <= 0.0 {
            return Err(SynthError::InvalidFilterParameter("anti-resonator"));
        }
        let r = exp(-PI * bw / self.sample_rate as f64);
        let w = 2.0 * PI * f / self.sample_rate as f64;
        let c0 = -(r * r);
        let b0 = 2.0 * r * cos(w);
        let a0 = 1.0 - b0 - c0;
        if a0 == 0.0 {
            // degenerate configuration, emits zero
            self.a = 0.0;
            self.b = 0.0;
            self.c = 0.0;
            self.mode = FilterMode::Active;
            return Ok(());
        }
        self.a = 1.0 / a0;
        self.b = -b0 / a0;
        self.c = -c0 / a0;
        self.mode = FilterMode::Active;
        Ok(())
    }

    pub fn set_passthrough(&mut self) {
        self.mode = FilterMode::Passthrough;
        self.x1 = 0.0;
        self.x2 = 0.0;
    }

    #[allow(dead_code)]
    pub fn set_mute(&mut self) {
        self.mode = FilterMode::Muted;
        self.x1 = 0.0;
        self.x2 = 0.0;
    }

    pub fn step(&mut self, x: f64) -> f64 {
        match self.mode {
            FilterMode::Passthrough => x,
            FilterMode::Muted => 0.0,
            FilterMode::Active => {
                let y = self.a * x + self.b * self.x1 + self.c * self.x2;
                self.x2 = self.x1;
                self.x1 = x;
                y
            }
        }
    }
}

/// A differencing filter, `y[n] = x[n] - x[n-1]`. First-order FIR
/// high-pass whose response `sqrt(2 - 2 cos(w))` depends on the sample
/// rate; that dependence is part of the legacy behavior and is kept.
pub(crate) struct DifferencingFilter {
    /// x[n-1], last input value
    x1: f64,
}

impl DifferencingFilter {
    pub fn new() -> Self {
        DifferencingFilter { x1: 0.0 }
    }

    pub fn step(&mut self, x: f64) -> f64 {
        let y = x - self.x1;
        self.x1 = x;
        y
    }
}
