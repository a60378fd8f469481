//! Command-line entry point: reduce a wav file to its display waveform and
//! print a summary of the series.

use std::time::Duration;

use wavepeek::logging;
use wavepeek::settings::{self, Settings};
use wavepeek::waveform::WaveformLoader;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let settings = settings::load_or_default().unwrap_or_else(|err| {
        eprintln!("Using default settings: {err}");
        Settings::default()
    });

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: wavepeek <file.wav> [width]");
        std::process::exit(2);
    };
    let target_width = match args.next() {
        Some(raw) => match raw.parse::<u32>() {
            Ok(width) => width,
            Err(_) => {
                eprintln!("Width must be a positive integer, got {raw:?}");
                std::process::exit(2);
            }
        },
        None => settings.target_width,
    };

    let loader = WaveformLoader::spawn();
    if let Err(err) = loader.request(path, target_width) {
        eprintln!("{err}");
        std::process::exit(2);
    }
    let outcome = loader.wait_for_latest(LOAD_TIMEOUT);
    let mut exit_code = 0;
    match outcome {
        Some(delivery) => match delivery.result {
            Ok(series) => {
                println!(
                    "{} points, peak {:.0}",
                    series.len(),
                    series.max_value()
                );
                let rendered: Vec<String> = series
                    .points()
                    .iter()
                    .map(|p| format!("{p:.0}"))
                    .collect();
                println!("{}", rendered.join(" "));
            }
            Err(err) => {
                eprintln!("{err}");
                exit_code = 1;
            }
        },
        None => {
            eprintln!("Timed out waiting for waveform");
            exit_code = 1;
        }
    }
    loader.shutdown(settings.shutdown_wait());
    std::process::exit(exit_code);
}
