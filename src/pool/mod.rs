//! Worker pool
//!
//! The target list is split into one contiguous shard per worker. Each worker is a
//! tokio task that opens its own driver session, runs a [`Traversal`] over its shard
//! and closes the session. Workers share nothing mutable; results come back in shard
//! order regardless of which worker finishes first.

mod partition;

pub use partition::partition;

use crate::driver::{ChallengeGate, DriverFactory, PageDriver};
use crate::extract::Extractor;
use crate::traversal::Traversal;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::Instrument;

/// Runs shards in parallel, one driver session per worker
pub struct WorkerPool<F: DriverFactory> {
    factory: Arc<F>,
    gate: Arc<ChallengeGate>,
    workers: NonZeroUsize,
}

impl<F: DriverFactory> WorkerPool<F> {
    pub fn new(factory: Arc<F>, gate: ChallengeGate, workers: NonZeroUsize) -> Self {
        Self {
            factory,
            gate: Arc::new(gate),
            workers,
        }
    }

    /// Traverses every target and returns each shard's records, in shard order
    ///
    /// A worker that cannot open a session or panics contributes an empty shard.
    pub async fn run<E: Extractor>(
        &self,
        targets: &[String],
        extractor: Arc<E>,
    ) -> Vec<Vec<E::Record>> {
        let shards = partition(targets, self.workers);

        tracing::info!(
            "Dispatching {} targets to {} workers",
            targets.len(),
            self.workers
        );

        let mut handles = Vec::with_capacity(shards.len());
        for (worker, shard) in shards.into_iter().enumerate() {
            let factory = self.factory.clone();
            let gate = self.gate.clone();
            let extractor = extractor.clone();

            let span = tracing::info_span!("worker", id = worker);
            let handle = tokio::spawn(
                async move {
                    run_shard(factory.as_ref(), extractor.as_ref(), gate.as_ref(), worker, &shard)
                        .await
                }
                .instrument(span),
            );
            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(records) => results.push(records),
                Err(e) => {
                    tracing::error!(worker, "Worker failed: {}", e);
                    results.push(Vec::new());
                }
            }
        }
        results
    }
}

/// One worker's lifetime: open a session, traverse, close
async fn run_shard<F: DriverFactory, E: Extractor>(
    factory: &F,
    extractor: &E,
    gate: &ChallengeGate,
    worker: usize,
    shard: &[String],
) -> Vec<E::Record> {
    if shard.is_empty() {
        tracing::debug!(worker, "Empty shard, not opening a session");
        return Vec::new();
    }

    let mut driver = match factory.open(worker).await {
        Ok(driver) => driver,
        Err(e) => {
            tracing::error!(worker, "Could not open a driver session: {}", e);
            return Vec::new();
        }
    };

    let records = Traversal::new(&mut driver, extractor, gate, worker)
        .run(shard)
        .await;

    if let Err(e) = driver.close().await {
        tracing::warn!(worker, "Error closing driver session: {}", e);
    }

    records
}
