//! Benchmark for the full per-sample synthesis pipeline.
//!
//! Run with: cargo bench
//!
//! One second of a steady vowel at 44.1 kHz exercises the glottal source,
//! both filter branches and the period scheduler; the time per iteration
//! divided by 44100 gives the per-sample cost.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use formant_synth::{generate_sound, FrameParams, GlottalSourceKind, MainParams};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn vowel_frame() -> FrameParams {
    FrameParams {
        duration: 1.0,
        f0: 247.0,
        flutter_level: 0.25,
        open_phase_ratio: 0.7,
        breathiness_db: -25.0,
        tilt_db: 0.0,
        gain_db: -10.0,
        agc_rms_level: 0.18,
        nasal_formant_freq: f64::NAN,
        nasal_formant_bw: f64::NAN,
        oral_formant_freq: vec![520.0, 1006.0, 2831.0, 3168.0, 4135.0, 5020.0],
        oral_formant_bw: vec![76.0, 102.0, 72.0, 102.0, 816.0, 596.0],
        cascade_enabled: true,
        cascade_voicing_db: 0.0,
        cascade_aspiration_db: -25.0,
        cascade_aspiration_mod: 0.5,
        nasal_antiformant_freq: f64::NAN,
        nasal_antiformant_bw: f64::NAN,
        parallel_enabled: true,
        parallel_voicing_db: 0.0,
        parallel_aspiration_db: -25.0,
        parallel_aspiration_mod: 0.5,
        frication_db: -30.0,
        frication_mod: 0.5,
        parallel_bypass_db: -99.0,
        nasal_formant_db: 0.0,
        oral_formant_db: vec![0.0, -8.0, -15.0, -19.0, -30.0, -35.0],
    }
}

fn bench_generate_sound(c: &mut Criterion) {
    let main = MainParams {
        sample_rate: 44100,
        glottal_source: GlottalSourceKind::Impulsive,
    };
    let frames = vec![vowel_frame()];
    c.bench_function("generate_sound/vowel_1s", |b| {
        b.iter(|| {
            let rng = SmallRng::seed_from_u64(69);
            generate_sound(black_box(&main), black_box(&frames), rng).unwrap()
        })
    });
}

criterion_group!(benches, bench_generate_sound);
criterion_main!(benches);
