use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::decode;
use super::error::WaveformError;
use super::reduce::{self, WaveformSeries};

const JOIN_POLL: Duration = Duration::from_millis(5);

/// Cooperative cancellation flag shared between a request and its worker.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the holder to stop at its next check.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One outstanding waveform computation.
struct LoadJob {
    path: PathBuf,
    target_width: u32,
    sequence: u64,
    cancel: CancelToken,
}

/// Terminal outcome for one request, tagged with its sequence number so
/// receivers can drop deliveries that a newer request has made stale.
#[derive(Debug)]
pub struct WaveformDelivery {
    /// Sequence number of the request this outcome belongs to.
    pub sequence: u64,
    /// The series on success, or the classified failure.
    pub result: Result<WaveformSeries, WaveformError>,
}

#[derive(Default)]
struct JobQueueState {
    pending: Option<LoadJob>,
    active: Option<CancelToken>,
    shutdown: bool,
}

/// Latest-only queue: a new job replaces any pending one and cancels the job
/// the worker is currently running.
struct JobQueue {
    state: Mutex<JobQueueState>,
    ready: Condvar,
}

impl JobQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(JobQueueState::default()),
            ready: Condvar::new(),
        }
    }

    fn send(&self, job: LoadJob) {
        let mut state = self.state.lock().expect("waveform job queue poisoned");
        if let Some(prev) = state.pending.take() {
            prev.cancel.cancel();
        }
        if let Some(active) = state.active.as_ref() {
            active.cancel();
        }
        state.pending = Some(job);
        self.ready.notify_one();
    }

    /// Block until a job is available; `None` once shutdown is requested.
    fn take_blocking(&self) -> Option<LoadJob> {
        let mut state = self.state.lock().expect("waveform job queue poisoned");
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(job) = state.pending.take() {
                state.active = Some(job.cancel.clone());
                return Some(job);
            }
            state = self.ready.wait(state).expect("waveform job queue poisoned");
        }
    }

    fn finish_active(&self) {
        let mut state = self.state.lock().expect("waveform job queue poisoned");
        state.active = None;
    }

    fn request_shutdown(&self) {
        let mut state = self.state.lock().expect("waveform job queue poisoned");
        state.shutdown = true;
        if let Some(prev) = state.pending.take() {
            prev.cancel.cancel();
        }
        if let Some(active) = state.active.as_ref() {
            active.cancel();
        }
        self.ready.notify_one();
    }

    #[cfg(test)]
    fn try_take(&self) -> Option<LoadJob> {
        let mut state = self.state.lock().expect("waveform job queue poisoned");
        state.pending.take()
    }
}

/// Runs wav decode plus reduction on a background thread, delivering at most
/// one terminal outcome per request.
///
/// The caller's thread never blocks on a load: `request` validates
/// synchronously and hands the job to the worker, and outcomes arrive on a
/// channel the caller drains at its own pace. Issuing a new request cancels
/// whatever the worker is doing for the previous one.
pub struct WaveformLoader {
    queue: Arc<JobQueue>,
    results: Receiver<WaveformDelivery>,
    latest_sequence: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl WaveformLoader {
    /// Start the background worker and return the loader handle.
    pub fn spawn() -> Self {
        let queue = Arc::new(JobQueue::new());
        let (result_tx, result_rx) = channel::<WaveformDelivery>();
        let worker_queue = Arc::clone(&queue);
        let worker = thread::Builder::new()
            .name("waveform-load".to_string())
            .spawn(move || worker_loop(worker_queue, result_tx))
            .map_err(|err| warn!("Waveform worker failed to start: {err}"))
            .ok();
        Self {
            queue,
            results: result_rx,
            latest_sequence: Arc::new(AtomicU64::new(0)),
            worker,
        }
    }

    /// Queue a load for `path` at `target_width` display units, superseding
    /// any in-flight request. Returns the request's sequence number.
    ///
    /// Argument problems fail synchronously without touching worker state.
    pub fn request(
        &self,
        path: impl Into<PathBuf>,
        target_width: u32,
    ) -> Result<u64, WaveformError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(WaveformError::invalid("path must not be empty"));
        }
        if target_width == 0 {
            return Err(WaveformError::invalid("target width must be positive"));
        }
        let sequence = self.latest_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(sequence, path = %path.display(), target_width, "waveform load requested");
        self.queue.send(LoadJob {
            path,
            target_width,
            sequence,
            cancel: CancelToken::new(),
        });
        Ok(sequence)
    }

    /// Sequence number of the newest request issued through this loader.
    pub fn latest_sequence(&self) -> u64 {
        self.latest_sequence.load(Ordering::SeqCst)
    }

    /// Drain ready deliveries, dropping stale ones, and return the outcome of
    /// the newest request if it has arrived.
    pub fn latest_delivery(&self) -> Option<WaveformDelivery> {
        let latest = self.latest_sequence();
        let mut newest = None;
        while let Ok(delivery) = self.results.try_recv() {
            if delivery.sequence == latest {
                newest = Some(delivery);
            } else {
                debug!(sequence = delivery.sequence, latest, "dropping stale waveform delivery");
            }
        }
        newest
    }

    /// Block until the newest request delivers or `timeout` elapses.
    ///
    /// Stale deliveries from superseded requests are discarded along the way.
    /// Intended for CLI use and tests; UI callers poll [`latest_delivery`]
    /// instead.
    ///
    /// [`latest_delivery`]: Self::latest_delivery
    pub fn wait_for_latest(&self, timeout: Duration) -> Option<WaveformDelivery> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            match self.results.recv_timeout(remaining) {
                Ok(delivery) if delivery.sequence == self.latest_sequence() => {
                    return Some(delivery);
                }
                Ok(delivery) => {
                    debug!(sequence = delivery.sequence, "dropping stale waveform delivery");
                }
                Err(_) => return None,
            }
        }
    }

    /// Stop the worker, waiting up to `wait` for it to exit.
    ///
    /// Returns true once the worker has been joined. If it does not respond to
    /// cooperative cancellation within the bound, the thread is detached so the
    /// caller is never blocked past `wait`; a detached worker can no longer
    /// deliver because the result channel is dropped with the loader.
    pub fn shutdown(mut self, wait: Duration) -> bool {
        self.queue.request_shutdown();
        let Some(handle) = self.worker.take() else {
            return true;
        };
        let deadline = Instant::now() + wait;
        while Instant::now() < deadline {
            if handle.is_finished() {
                return handle.join().is_ok();
            }
            thread::sleep(JOIN_POLL);
        }
        warn!("Waveform worker did not stop within {wait:?}; detaching");
        false
    }
}

impl Drop for WaveformLoader {
    fn drop(&mut self) {
        // Never block the caller on drop; the worker observes shutdown and
        // exits on its own.
        self.queue.request_shutdown();
    }
}

fn worker_loop(queue: Arc<JobQueue>, results: Sender<WaveformDelivery>) {
    while let Some(job) = queue.take_blocking() {
        let started = Instant::now();
        let result = run_job(&job);
        queue.finish_active();
        match &result {
            Ok(series) => debug!(
                sequence = job.sequence,
                points = series.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "waveform load finished"
            ),
            Err(err) if err.is_cancelled() => {
                debug!(sequence = job.sequence, "waveform load cancelled");
            }
            Err(err) => debug!(sequence = job.sequence, %err, "waveform load failed"),
        }
        if results
            .send(WaveformDelivery {
                sequence: job.sequence,
                result,
            })
            .is_err()
        {
            // Loader dropped; nobody is listening anymore.
            return;
        }
    }
}

fn run_job(job: &LoadJob) -> Result<WaveformSeries, WaveformError> {
    if job.cancel.is_cancelled() {
        return Err(WaveformError::Cancelled);
    }
    let pcm = decode::decode_wav_file(&job.path)?;
    if job.cancel.is_cancelled() {
        return Err(WaveformError::Cancelled);
    }
    reduce::reduce_with_cancel(&pcm, job.target_width, &job.cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(path: &str, sequence: u64) -> LoadJob {
        LoadJob {
            path: PathBuf::from(path),
            target_width: 200,
            sequence,
            cancel: CancelToken::new(),
        }
    }

    #[test]
    fn latest_job_replaces_and_cancels_pending() {
        let queue = JobQueue::new();
        let first = job("one.wav", 1);
        let first_cancel = first.cancel.clone();
        queue.send(first);
        queue.send(job("two.wav", 2));

        assert!(first_cancel.is_cancelled());
        let pending = queue.try_take().expect("expected pending job");
        assert_eq!(pending.sequence, 2);
        assert!(!pending.cancel.is_cancelled());
        assert!(queue.try_take().is_none());
    }

    #[test]
    fn send_cancels_active_job() {
        let queue = JobQueue::new();
        queue.send(job("one.wav", 1));
        let active = queue.take_blocking().expect("job available");
        queue.send(job("two.wav", 2));
        assert!(active.cancel.is_cancelled());
    }

    #[test]
    fn shutdown_unblocks_take() {
        let queue = Arc::new(JobQueue::new());
        let waiter = Arc::clone(&queue);
        let handle = thread::spawn(move || waiter.take_blocking());
        thread::sleep(Duration::from_millis(20));
        queue.request_shutdown();
        assert!(handle.join().unwrap().is_none());
    }

    #[test]
    fn empty_path_fails_synchronously() {
        let loader = WaveformLoader::spawn();
        let err = loader.request("", 200).unwrap_err();
        assert!(matches!(err, WaveformError::InvalidArgument { .. }));
        assert_eq!(loader.latest_sequence(), 0);
    }

    #[test]
    fn zero_width_fails_synchronously() {
        let loader = WaveformLoader::spawn();
        let err = loader.request("some.wav", 0).unwrap_err();
        assert!(matches!(err, WaveformError::InvalidArgument { .. }));
        assert_eq!(loader.latest_sequence(), 0);
    }

    #[test]
    fn sequence_numbers_increase_per_request() {
        let loader = WaveformLoader::spawn();
        let first = loader.request("missing-a.wav", 100).unwrap();
        let second = loader.request("missing-b.wav", 100).unwrap();
        assert!(second > first);
        assert_eq!(loader.latest_sequence(), second);
    }
}
