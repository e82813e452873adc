//! Background batch production.
//!
//! `BatchPrefetcher` keeps a fixed number of worker threads requesting the
//! same `Request` from a shared `Pipeline` and parks the results in a bounded
//! channel, so a consumer (e.g. a training loop) rarely waits for I/O or
//! resampling. Each worker runs its own traversals; the pipeline itself holds
//! no per-traversal state, so no locking is needed.
//!
//! ```text
//! [worker 0] ─┐
//! [worker 1] ─┼──► bounded(cache_size) ──► next_batch()
//! [worker n] ─┘
//! ```

use crate::config::PrefetchConfig;
use crate::error::{Result, VolpipeError};
use crate::pipeline::batch::Batch;
use crate::pipeline::executor::Pipeline;
use crate::pipeline::request::Request;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Pool of workers filling a bounded queue of batches.
pub struct BatchPrefetcher {
    rx: Option<Receiver<Result<Batch>>>,
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl BatchPrefetcher {
    /// Start `config.workers` threads producing batches for `request`.
    pub fn spawn(pipeline: Arc<Pipeline>, request: Request, config: &PrefetchConfig) -> Result<Self> {
        config.validate()?;

        let (tx, rx) = bounded(config.cache_size);
        let running = Arc::new(AtomicBool::new(true));
        let request = Arc::new(request);

        let mut prefetcher = Self {
            rx: Some(rx),
            running: running.clone(),
            workers: Vec::with_capacity(config.workers),
        };

        for index in 0..config.workers {
            let pipeline = pipeline.clone();
            let request = request.clone();
            let running = running.clone();
            let tx = tx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("volpipe-prefetch-{}", index))
                .spawn(move || worker_loop(index, &pipeline, &request, &running, &tx))?;
            prefetcher.workers.push(handle);
        }

        tracing::info!(
            "Prefetching started: {} workers, cache size {}",
            config.workers,
            config.cache_size
        );
        Ok(prefetcher)
    }

    /// Block until the next batch (or the error a worker hit) is available.
    pub fn next_batch(&self) -> Result<Batch> {
        let rx = self.receiver()?;
        rx.recv().map_err(|_| Self::stopped())?
    }

    /// Next batch if one is ready right now.
    pub fn try_next_batch(&self) -> Option<Result<Batch>> {
        let rx = self.rx.as_ref()?;
        match rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Self::stopped())),
        }
    }

    /// Wait at most `timeout` for the next batch.
    pub fn next_batch_timeout(&self, timeout: Duration) -> Option<Result<Batch>> {
        let rx = self.rx.as_ref()?;
        match rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(Self::stopped())),
        }
    }

    /// Number of batches waiting in the queue.
    pub fn queued(&self) -> usize {
        self.rx.as_ref().map_or(0, Receiver::len)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop all workers and wait for them to exit.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() && self.rx.is_none() {
            return;
        }
        self.running.store(false, Ordering::Release);
        // Dropping the receiver unblocks workers waiting on a full queue.
        self.rx = None;
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("Prefetch worker panicked");
            }
        }
        tracing::info!("Prefetching stopped");
    }

    fn receiver(&self) -> Result<&Receiver<Result<Batch>>> {
        self.rx.as_ref().ok_or_else(Self::stopped)
    }

    fn stopped() -> VolpipeError {
        VolpipeError::Source("prefetch workers stopped".to_string())
    }
}

impl Drop for BatchPrefetcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    index: usize,
    pipeline: &Pipeline,
    request: &Request,
    running: &AtomicBool,
    tx: &Sender<Result<Batch>>,
) {
    tracing::debug!("prefetch worker {} started", index);
    while running.load(Ordering::Acquire) {
        let result = pipeline.request_batch(request);
        if let Err(e) = &result {
            tracing::warn!("prefetch worker {} failed: {}", index, e);
        }
        if tx.send(result).is_err() {
            break;
        }
    }
    tracing::debug!("prefetch worker {} exiting", index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Roi};
    use crate::pipeline::executor::PipelineBuilder;
    use crate::pipeline::nodes::DownSample;
    use crate::pipeline::source::ArraySource;
    use crate::volume::{DataType, Volume, VolumeData};

    fn pipeline() -> Arc<Pipeline> {
        let extent = Roi::from_slices(&[0, 0], &[32, 32]).unwrap();
        let volume = Volume::new(
            VolumeData::zeros(DataType::U8, &[32, 32]),
            extent,
            Coordinate::from([1, 1]),
        )
        .unwrap();
        let pipeline = PipelineBuilder::new(ArraySource::new("memory").with_volume("raw", volume))
            .node(DownSample::single("raw", 2u32, "raw_2").unwrap())
            .build()
            .unwrap();
        Arc::new(pipeline)
    }

    #[test]
    fn test_rejects_zero_workers() {
        let config = PrefetchConfig {
            workers: 0,
            cache_size: 4,
        };
        let request = Request::new();
        assert!(BatchPrefetcher::spawn(pipeline(), request, &config)
            .err()
            .unwrap()
            .is_configuration());
    }

    #[test]
    fn test_produces_batches() {
        let config = PrefetchConfig {
            workers: 2,
            cache_size: 2,
        };
        let request =
            Request::new().with("raw_2", Roi::from_slices(&[4, 4], &[4, 4]).unwrap());
        let mut prefetcher = BatchPrefetcher::spawn(pipeline(), request.clone(), &config).unwrap();

        let mut ids = Vec::new();
        for _ in 0..5 {
            let batch = prefetcher.next_batch().unwrap();
            assert!(batch.verify(&request).is_ok());
            ids.push(batch.id());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);

        prefetcher.shutdown();
        assert!(!prefetcher.is_running());
        assert!(prefetcher.next_batch().is_err());
        assert_eq!(prefetcher.queued(), 0);
    }

    #[test]
    fn test_forwards_errors() {
        let config = PrefetchConfig {
            workers: 1,
            cache_size: 1,
        };
        // needs raw [-2:6), partly outside the source
        let request =
            Request::new().with("raw_2", Roi::from_slices(&[0, 0], &[4, 4]).unwrap());
        let prefetcher = BatchPrefetcher::spawn(pipeline(), request, &config).unwrap();
        let err = prefetcher.next_batch().unwrap_err();
        assert!(err.is_containment_violation());
    }
}
