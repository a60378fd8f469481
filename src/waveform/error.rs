use std::path::PathBuf;
use thiserror::Error;

/// Failure modes surfaced by waveform decoding and loading.
#[derive(Debug, Error)]
pub enum WaveformError {
    /// A request was rejected before any worker was involved.
    #[error("Invalid request: {message}")]
    InvalidArgument {
        /// What was wrong with the request.
        message: String,
    },
    /// The file is missing, unreadable, or not a wav file.
    #[error("Cannot load {path}: {message}")]
    File {
        /// Path the caller asked for.
        path: PathBuf,
        /// Why the file was rejected.
        message: String,
    },
    /// The wav container or sample data is malformed.
    #[error("Invalid wav: {message}")]
    Decode {
        /// Parser-level description of the problem.
        message: String,
    },
    /// The request was superseded or aborted before completion.
    #[error("Request cancelled")]
    Cancelled,
}

impl WaveformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::File {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// True when the failure is a normal supersession rather than an error.
    ///
    /// Callers use this to skip user-facing error reporting when a request was
    /// simply replaced by a newer one.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
