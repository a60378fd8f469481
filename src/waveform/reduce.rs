use super::error::WaveformError;
use super::loader::CancelToken;
use super::pcm::PcmBuffer;

/// Fewest output points a wide display will be reduced to.
pub const MIN_POINTS: usize = 40;
/// Most output points any display width produces.
pub const MAX_POINTS: usize = 200;
/// Display pixels represented by one output point.
pub const POINTS_DIVISOR: u32 = 4;
/// Upper bound of the normalized output range.
pub const OUTPUT_SCALE: f32 = 32_768.0;

// Below this many samples per chunk, peak detection stops being meaningful
// for short files, so the point count shrinks instead.
const MIN_SAMPLES_PER_CHUNK: usize = 10;

/// Reduced display data: one peak magnitude per chunk, scaled to
/// `[0, OUTPUT_SCALE]`. Never empty; immutable once produced.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformSeries {
    points: Vec<f32>,
}

impl WaveformSeries {
    /// Ordered chunk magnitudes.
    pub fn points(&self) -> &[f32] {
        &self.points
    }

    /// Number of chunks in the series.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a successfully produced series.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest magnitude in the series.
    pub fn max_value(&self) -> f32 {
        self.points.iter().fold(0.0_f32, |acc, &p| acc.max(p))
    }
}

/// Reduce decoded PCM to a series sized for `target_width` display units.
pub fn reduce(pcm: &PcmBuffer, target_width: u32) -> Result<WaveformSeries, WaveformError> {
    reduce_with_cancel(pcm, target_width, &CancelToken::new())
}

/// Reduce with a cooperative cancellation check between chunks.
///
/// Downmixes to per-frame channel means, walks non-overlapping windows of
/// `chunk_size` frames collecting the largest absolute excursion of each, and
/// normalizes so the loudest chunk lands exactly on [`OUTPUT_SCALE`]. The
/// trailing partial window is dropped, matching the visual output the series
/// feeds.
pub fn reduce_with_cancel(
    pcm: &PcmBuffer,
    target_width: u32,
    cancel: &CancelToken,
) -> Result<WaveformSeries, WaveformError> {
    if target_width == 0 {
        return Err(WaveformError::invalid("target width must be positive"));
    }
    let mono: Vec<i32> = pcm.mono_frames().collect();
    let sample_count = mono.len();
    if sample_count == 0 {
        return Err(WaveformError::decode("no samples to reduce"));
    }

    let mut target_points =
        ((target_width / POINTS_DIVISOR) as usize).clamp(MIN_POINTS, MAX_POINTS);
    if sample_count < target_points * MIN_SAMPLES_PER_CHUNK {
        target_points = (sample_count / MIN_SAMPLES_PER_CHUNK).max(1);
    }
    let chunk_size = (sample_count / target_points).max(1);

    let mut peaks: Vec<i64> = Vec::with_capacity(target_points.min(MAX_POINTS));
    if sample_count > chunk_size {
        let mut start = 0;
        while start < sample_count - chunk_size && peaks.len() < MAX_POINTS {
            if cancel.is_cancelled() {
                return Err(WaveformError::Cancelled);
            }
            peaks.push(chunk_peak(&mono[start..start + chunk_size]));
            start += chunk_size;
        }
    }
    if peaks.is_empty() {
        // Shorter than one chunk: a single window over everything keeps the
        // success path non-empty.
        peaks.push(chunk_peak(&mono));
    }

    // Silence normalizes against 1 so the series stays all-zero instead of
    // dividing by zero.
    let max_peak = peaks.iter().copied().max().unwrap_or(0).max(1);
    let points = peaks
        .iter()
        .map(|&peak| (peak as f64 / max_peak as f64 * OUTPUT_SCALE as f64) as f32)
        .collect();
    Ok(WaveformSeries { points })
}

/// Largest absolute excursion within one window: `max(|min|, |max|)`.
fn chunk_peak(window: &[i32]) -> i64 {
    let mut min = i32::MAX;
    let mut max = i32::MIN;
    for &sample in window {
        min = min.min(sample);
        max = max.max(sample);
    }
    (min as i64).abs().max((max as i64).abs())
}
