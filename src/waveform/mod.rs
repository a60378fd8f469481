mod decode;
mod error;
mod loader;
mod pcm;
mod reduce;

pub use decode::{decode_wav_bytes, decode_wav_file};
pub use error::WaveformError;
pub use loader::{CancelToken, WaveformDelivery, WaveformLoader};
pub use pcm::{MonoFrames, PcmBuffer};
pub use reduce::{
    MAX_POINTS, MIN_POINTS, OUTPUT_SCALE, POINTS_DIVISOR, WaveformSeries, reduce,
    reduce_with_cancel,
};
