//! Renders one second of a steady vowel to `vowel.wav`.
//!
//! Run with: cargo run --example render_wav

use formant_synth::{generate_sound, FrameParams, GlottalSourceKind, MainParams};
use hound::{SampleFormat, WavSpec, WavWriter};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const SAMPLE_RATE: usize = 44100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let main_params = MainParams {
        sample_rate: SAMPLE_RATE,
        glottal_source: GlottalSourceKind::Impulsive,
    };
    let frame = FrameParams {
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
        parallel_enabled: false,
        parallel_voicing_db: 0.0,
        parallel_aspiration_db: -25.0,
        parallel_aspiration_mod: 0.5,
        frication_db: -30.0,
        frication_mod: 0.5,
        parallel_bypass_db: -99.0,
        nasal_formant_db: 0.0,
        oral_formant_db: vec![0.0, -8.0, -15.0, -19.0, -30.0, -35.0],
    };

    let sound = generate_sound(&main_params, &[frame], SmallRng::seed_from_u64(69))?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create("vowel.wav", spec)?;
    for sample in sound {
        writer.write_sample(sample as f32)?;
    }
    writer.finalize()?;
    println!("wrote vowel.wav");
    Ok(())
}
