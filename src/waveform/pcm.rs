/// Decoded PCM audio, interleaved and widened sign-correctly to `i32`.
///
/// Owned by the worker invocation that decoded it and dropped once reduction
/// has produced its series.
#[derive(Clone, Debug)]
pub struct PcmBuffer {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels (at least 1).
    pub channels: u16,
    /// Bit depth of the source data (8, 16, 24, or 32).
    pub bits_per_sample: u16,
    /// Interleaved signed samples, one per channel per frame.
    pub samples: Vec<i32>,
}

impl PcmBuffer {
    /// Effective channel count (minimum 1).
    pub fn channel_count(&self) -> usize {
        self.channels.max(1) as usize
    }

    /// Number of complete frames in the buffer.
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count()
    }

    /// Iterate frames as their arithmetic mean across channels.
    ///
    /// The mean is computed in integer width with truncating division so a
    /// DC-biased multi-channel signal averages rather than picking one
    /// channel. A trailing incomplete frame is ignored.
    pub fn mono_frames(&self) -> MonoFrames<'_> {
        MonoFrames {
            samples: &self.samples,
            channels: self.channel_count(),
            pos: 0,
        }
    }
}

/// Iterator over per-frame channel means.
pub struct MonoFrames<'a> {
    samples: &'a [i32],
    channels: usize,
    pos: usize,
}

impl Iterator for MonoFrames<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let end = start + self.channels;
        if end > self.samples.len() {
            return None;
        }
        self.pos = end;
        if self.channels == 1 {
            return Some(self.samples[start]);
        }
        let sum: i64 = self.samples[start..end].iter().map(|&s| s as i64).sum();
        Some((sum / self.channels as i64) as i32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.samples.len() - self.pos) / self.channels;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MonoFrames<'_> {}
