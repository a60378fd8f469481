//! Shared wav fixtures for integration tests.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Write a 16-bit mono wav file at `sample_rate` containing `samples`.
pub fn write_wav_i16(path: &Path, sample_rate: u32, samples: &[i16]) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav fixture");
    for &sample in samples {
        writer.write_sample(sample).expect("write fixture sample");
    }
    writer.finalize().expect("finalize wav fixture");
}

/// Mixed 440/880/220 Hz sine signal, the classic preview test tone.
pub fn mixed_sine_i16(len: usize, sample_rate: u32) -> Vec<i16> {
    use std::f64::consts::PI;
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let sample = 0.5 * (2.0 * PI * 440.0 * t).sin()
                + 0.3 * (2.0 * PI * 880.0 * t).sin()
                + 0.2 * (2.0 * PI * 220.0 * t).sin();
            (sample * 32_767.0) as i16
        })
        .collect()
}
