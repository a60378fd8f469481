//! Library exports for reuse in the CLI and tests.
/// Application directory helpers.
pub mod app_dirs;
/// Logging setup.
pub mod logging;
/// App settings persisted as TOML.
pub mod settings;
/// Waveform decoding and reduction.
pub mod waveform;
