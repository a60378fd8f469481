use std::io::Cursor;
use std::path::Path;

use hound::SampleFormat;

use super::error::WaveformError;
use super::pcm::PcmBuffer;

/// Check that `path` points at an existing regular file with a `.wav`
/// extension (case-insensitive) before any parsing is attempted.
pub(crate) fn validate_wav_path(path: &Path) -> Result<(), WaveformError> {
    if !path.is_file() {
        return Err(WaveformError::file(path, "file does not exist"));
    }
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if !is_wav {
        return Err(WaveformError::file(path, "not a .wav file"));
    }
    Ok(())
}

/// Decode a wav file from disk into a [`PcmBuffer`].
///
/// Rejects missing files and non-`.wav` extensions without parsing.
pub fn decode_wav_file(path: &Path) -> Result<PcmBuffer, WaveformError> {
    validate_wav_path(path)?;
    let bytes = std::fs::read(path)
        .map_err(|source| WaveformError::file(path, format!("read failed: {source}")))?;
    decode_wav_bytes(&bytes)
}

/// Decode in-memory wav bytes into a [`PcmBuffer`].
///
/// Only integer PCM at 8/16/24/32 bits is accepted; anything else is a
/// [`WaveformError::Decode`]. A structurally valid file with zero frames is
/// also rejected so downstream reduction never sees an empty buffer.
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<PcmBuffer, WaveformError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|error| WaveformError::decode(error.to_string()))?;
    let spec = reader.spec();
    if spec.sample_format == SampleFormat::Float {
        return Err(WaveformError::decode("float sample data is not supported"));
    }
    if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(WaveformError::decode(format!(
            "unsupported bit depth: {}",
            spec.bits_per_sample
        )));
    }
    let samples: Vec<i32> = reader
        .samples::<i32>()
        .map(|s| s.map_err(|error| WaveformError::decode(format!("sample error: {error}"))))
        .collect::<Result<_, _>>()?;
    if samples.is_empty() {
        return Err(WaveformError::decode("wav contains no frames"));
    }
    Ok(PcmBuffer {
        sample_rate: spec.sample_rate,
        channels: spec.channels.max(1),
        bits_per_sample: spec.bits_per_sample,
        samples,
    })
}
