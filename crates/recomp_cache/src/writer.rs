//! Fire-and-forget disk writes.
//!
//! The orchestrator hands promoted results to a [`WriteScheduler`] and
//! returns immediately. [`BackgroundWriter`] feeds a bounded queue drained by
//! a single worker thread; when the queue is full the request is dropped
//! rather than blocking the caller.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use recomp_config::WriterConfig;

use crate::artifact::write_artifact_file;

/// Accepts disk writes without ever blocking on them.
pub trait WriteScheduler: Send + Sync {
    /// Requests that `content` be written to `base_dir.join(relative_path)`.
    ///
    /// Failures are the scheduler's concern and are never reported back.
    fn schedule_write(&self, base_dir: &Path, relative_path: &Path, content: Arc<str>);
}

/// A scheduler that discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWriter;

impl WriteScheduler for NoopWriter {
    fn schedule_write(&self, _base_dir: &Path, _relative_path: &Path, _content: Arc<str>) {}
}

/// Counters describing what a [`BackgroundWriter`] has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Artifacts written successfully.
    pub written: u64,
    /// Writes that failed.
    pub failed: u64,
    /// Requests dropped because the queue was full or closed.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    written: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

enum Job {
    Write { path: PathBuf, content: Arc<str> },
    Flush(Sender<()>),
}

/// Writes artifacts on a dedicated worker thread.
pub struct BackgroundWriter {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl BackgroundWriter {
    /// Starts the worker thread with a queue of `config.queue_capacity` requests.
    pub fn new(config: &WriterConfig) -> std::io::Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity.max(1));
        let counters = Arc::new(Counters::default());
        let worker_counters = Arc::clone(&counters);
        let worker = std::thread::Builder::new()
            .name("recomp-writer".to_string())
            .spawn(move || run_worker(receiver, worker_counters))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            counters,
        })
    }

    /// Blocks until every request accepted before this call has been processed.
    pub fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if sender.send(Job::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Returns a snapshot of the writer's counters.
    pub fn stats(&self) -> WriterStats {
        WriterStats {
            written: self.counters.written.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl WriteScheduler for BackgroundWriter {
    fn schedule_write(&self, base_dir: &Path, relative_path: &Path, content: Arc<str>) {
        let path = base_dir.join(relative_path);
        let Some(sender) = &self.sender else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        match sender.try_send(Job::Write { path, content }) {
            Ok(()) => {}
            Err(TrySendError::Full(Job::Write { path, .. })) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    target: "recomp.cache",
                    path = %path.display(),
                    "write queue full; dropping disk write"
                );
            }
            Err(_) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    target: "recomp.cache",
                    "write queue closed; dropping disk write"
                );
            }
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain the queue and exit.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(receiver: Receiver<Job>, counters: Arc<Counters>) {
    for job in receiver {
        match job {
            Job::Write { path, content } => match write_artifact_file(&path, &content) {
                Ok(()) => {
                    counters.written.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        target: "recomp.cache",
                        path = %path.display(),
                        error = %err,
                        "failed to write cache artifact"
                    );
                }
            },
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
