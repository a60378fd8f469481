mod support;

use std::time::{Duration, Instant};

use wavepeek::waveform::{MAX_POINTS, OUTPUT_SCALE, WaveformError, WaveformLoader};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn delivers_series_for_valid_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    // 0.1 s at 8 kHz: 800 samples, so width 200 reduces to 49 points.
    support::write_wav_i16(&path, 8_000, &support::mixed_sine_i16(800, 8_000));

    let loader = WaveformLoader::spawn();
    let sequence = loader.request(&path, 200).unwrap();
    let delivery = loader
        .wait_for_latest(DELIVERY_TIMEOUT)
        .expect("delivery within timeout");

    assert_eq!(delivery.sequence, sequence);
    let series = delivery.result.expect("successful series");
    assert_eq!(series.len(), 49);
    assert_eq!(series.max_value(), OUTPUT_SCALE);
    assert!(series.len() <= MAX_POINTS);
    assert!(loader.shutdown(Duration::from_secs(2)));
}

#[test]
fn missing_path_delivers_file_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = WaveformLoader::spawn();
    loader.request(dir.path().join("absent.wav"), 200).unwrap();
    let delivery = loader
        .wait_for_latest(DELIVERY_TIMEOUT)
        .expect("delivery within timeout");
    let err = delivery.result.unwrap_err();
    assert!(matches!(err, WaveformError::File { .. }));
    assert!(!err.is_cancelled());
}

#[test]
fn wrong_extension_delivers_file_error_without_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.mp3");
    // Perfectly valid wav bytes behind a refused extension.
    support::write_wav_i16(&path, 8_000, &support::mixed_sine_i16(800, 8_000));

    let loader = WaveformLoader::spawn();
    loader.request(&path, 200).unwrap();
    let delivery = loader
        .wait_for_latest(DELIVERY_TIMEOUT)
        .expect("delivery within timeout");
    assert!(matches!(
        delivery.result.unwrap_err(),
        WaveformError::File { .. }
    ));
}

#[test]
fn newer_request_supersedes_older() {
    let dir = tempfile::tempdir().unwrap();
    let long_path = dir.path().join("long.wav");
    let short_path = dir.path().join("short.wav");
    support::write_wav_i16(&long_path, 44_100, &support::mixed_sine_i16(500_000, 44_100));
    support::write_wav_i16(&short_path, 8_000, &support::mixed_sine_i16(800, 8_000));

    let loader = WaveformLoader::spawn();
    let first = loader.request(&long_path, 800).unwrap();
    let second = loader.request(&short_path, 200).unwrap();
    assert!(second > first);

    let delivery = loader
        .wait_for_latest(DELIVERY_TIMEOUT)
        .expect("delivery within timeout");
    assert_eq!(delivery.sequence, second);
    let series = delivery.result.expect("latest request succeeds");
    assert_eq!(series.len(), 49);

    // The superseded request must leave no further terminal deliveries.
    std::thread::sleep(Duration::from_millis(100));
    assert!(loader.latest_delivery().is_none());
}

#[test]
fn rapid_requests_resolve_to_last_one() {
    let dir = tempfile::tempdir().unwrap();
    let loader = WaveformLoader::spawn();
    let mut last_sequence = 0;
    for idx in 0..5 {
        let path = dir.path().join(format!("tone_{idx}.wav"));
        support::write_wav_i16(&path, 8_000, &support::mixed_sine_i16(4_000, 8_000));
        last_sequence = loader.request(&path, 400).unwrap();
    }
    let delivery = loader
        .wait_for_latest(DELIVERY_TIMEOUT)
        .expect("delivery within timeout");
    assert_eq!(delivery.sequence, last_sequence);
    assert!(delivery.result.is_ok());
}

#[test]
fn stale_delivery_is_dropped_after_new_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    support::write_wav_i16(&path, 8_000, &support::mixed_sine_i16(800, 8_000));

    let loader = WaveformLoader::spawn();
    loader.request(&path, 200).unwrap();
    // Let the first delivery land in the channel before superseding it.
    std::thread::sleep(Duration::from_millis(200));
    let second = loader.request(&path, 400).unwrap();

    let delivery = loader
        .wait_for_latest(DELIVERY_TIMEOUT)
        .expect("delivery within timeout");
    assert_eq!(delivery.sequence, second);
}

#[test]
fn shutdown_returns_within_bound() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.wav");
    support::write_wav_i16(&path, 44_100, &support::mixed_sine_i16(1_000_000, 44_100));

    let loader = WaveformLoader::spawn();
    loader.request(&path, 800).unwrap();

    let bound = Duration::from_secs(2);
    let started = Instant::now();
    loader.shutdown(bound);
    // Never blocks past the bound, with a little slack for scheduling.
    assert!(started.elapsed() < bound + Duration::from_millis(500));
}
