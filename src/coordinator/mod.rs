//! Batch execution
//!
//! A run splits its work items into batches of `batch_size`. Inside a batch
//! at most `max_workers` items are in flight; the next batch starts only
//! after every item of the current one reached a terminal record, followed
//! by `delay_between_batches` (skipped after the last batch). Records reach
//! the sink in completion order.

mod settings;
mod worker;

pub use settings::BatchSettings;

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::decode::ContentDecoder;
use crate::fetch::Fetcher;
use crate::humanize::{HumanDuration, Throughput};
use crate::record::{BatchSummary, ErrorKind, ResultRecord, WorkItem};
use crate::resume::ResumeIndex;
use crate::sink::ResultSink;
use worker::ItemContext;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Cannot create download folder {path}: {source}")]
    DownloadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a finished (or interrupted) run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: BatchSummary,
    /// Terminal records in the order they were emitted
    pub records: Vec<ResultRecord>,
    /// Batches that were started
    pub batches: usize,
    pub elapsed: Duration,
    /// Cancelled before every item was attempted
    pub interrupted: bool,
}

pub struct BatchCoordinator {
    settings: BatchSettings,
    context: Arc<ItemContext>,
    sink: Arc<dyn ResultSink>,
    cancel: CancellationToken,
}

impl BatchCoordinator {
    pub fn new(
        settings: BatchSettings,
        api: ApiConfig,
        fetcher: Arc<dyn Fetcher>,
        decoder: ContentDecoder,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let context = Arc::new(ItemContext {
            fetcher,
            decoder,
            api,
            download_folder: settings.download_folder.clone(),
            attempts: settings.attempts(),
        });

        Self {
            settings,
            context,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token (e.g. tied to a shutdown signal)
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancelling stops the run at the next batch boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self, items: Vec<WorkItem>) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let total = items.len();
        let mut records = Vec::with_capacity(total);

        let pending = if self.settings.resume {
            let index = ResumeIndex::build(&self.settings.download_folder).await;
            let (done, pending): (Vec<_>, Vec<_>) =
                items.into_iter().partition(|item| index.contains(&item.id));
            if !done.is_empty() {
                info!(skipped = done.len(), "Skipping ids already downloaded");
            }
            for item in done {
                let record = ResultRecord::new(
                    item.id,
                    ErrorKind::AlreadyExists,
                    "Already downloaded (resume)",
                );
                self.emit(&record).await;
                records.push(record);
            }
            pending
        } else {
            items
        };

        let folder = &self.settings.download_folder;
        tokio::fs::create_dir_all(folder)
            .await
            .map_err(|source| RunError::DownloadFolder {
                path: folder.clone(),
                source,
            })?;

        let batch_count = pending.len().div_ceil(self.settings.chunk_size());
        let workers = self.settings.workers();
        let delay = self.settings.delay_between_batches;
        let mut batches = 0;

        info!(
            total,
            pending = pending.len(),
            batches = batch_count,
            workers,
            "Starting download run"
        );

        for (index, batch) in pending.chunks(self.settings.chunk_size()).enumerate() {
            if self.cancel.is_cancelled() {
                warn!(batch = index + 1, "Run cancelled, remaining batches skipped");
                break;
            }

            batches += 1;
            debug!(batch = index + 1, of = batch_count, size = batch.len(), "Starting batch");

            let mut completed = stream::iter(batch.iter().cloned())
                .map(|item| self.spawn_item(item))
                .buffer_unordered(workers);

            while let Some(record) = completed.next().await {
                if record.is_success() {
                    info!(id = %record.id, kind = %record.kind, "{}", record.message);
                } else {
                    warn!(id = %record.id, kind = %record.kind, "{}", record.message);
                }
                self.emit(&record).await;
                records.push(record);
            }

            let done = records.len();
            let succeeded = records.iter().filter(|r| r.is_success()).count();
            let throughput = Throughput::measure(done, total, started.elapsed());
            info!(
                batch = index + 1,
                of = batch_count,
                done,
                total,
                percent = %format!("{:.1}%", done as f64 * 100.0 / total.max(1) as f64),
                succeeded,
                failed = done - succeeded,
                rate = %format!("{:.2}/s", throughput.per_sec),
                eta = %HumanDuration(throughput.eta),
                "Batch complete"
            );

            if index + 1 < batch_count && !delay.is_zero() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {
                        warn!("Run cancelled during batch delay");
                        break;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        let elapsed = started.elapsed();
        let summary = BatchSummary::from_records(&records);
        if let Err(e) = self.sink.finish(&summary, elapsed).await {
            warn!(error = %e, "Failed to write run summary");
        }

        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            skipped = summary.skipped,
            success_rate = %format!("{:.2}%", summary.success_rate),
            elapsed = %HumanDuration(elapsed),
            "Run finished"
        );

        Ok(RunReport {
            interrupted: records.len() < total,
            summary,
            records,
            batches,
            elapsed,
        })
    }

    /// Run one item on its own task; a panic becomes an `UNKNOWN_ERROR` record
    async fn spawn_item(&self, item: WorkItem) -> ResultRecord {
        let id = item.id.clone();
        match tokio::spawn(worker::process_item(self.context.clone(), item)).await {
            Ok(record) => record,
            Err(e) => {
                warn!(id = %id, error = %e, "Worker task failed");
                ResultRecord::new(id, ErrorKind::UnknownError, format!("Worker task failed: {e}"))
            }
        }
    }

    async fn emit(&self, record: &ResultRecord) {
        if let Err(e) = self.sink.append(record).await {
            warn!(id = %record.id, error = %e, "Failed to record result");
        }
    }
}
