use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::DownloadConfig;

/// Knobs for one [`BatchCoordinator`](super::BatchCoordinator) run
#[derive(Debug, Clone, Builder)]
pub struct BatchSettings {
    #[builder(into)]
    pub download_folder: PathBuf,
    #[builder(default = 5)]
    pub max_workers: usize,
    #[builder(default = 20)]
    pub batch_size: usize,
    #[builder(default = Duration::from_secs(1))]
    pub delay_between_batches: Duration,
    #[builder(default = true)]
    pub retry_on_failure: bool,
    #[builder(default = 3)]
    pub max_retries: u32,
    #[builder(default = true)]
    pub resume: bool,
}

impl BatchSettings {
    pub fn from_config(download: &DownloadConfig) -> Self {
        Self {
            download_folder: download.download_folder.clone(),
            max_workers: download.max_workers,
            batch_size: download.batch_size,
            delay_between_batches: Duration::from_secs_f64(download.delay_between_batches.max(0.0)),
            retry_on_failure: download.retry_on_failure,
            max_retries: download.max_retries,
            resume: download.resume,
        }
    }

    /// Fetch attempts allowed per item, including the first
    pub fn attempts(&self) -> u32 {
        if self.retry_on_failure {
            self.max_retries.saturating_add(1)
        } else {
            1
        }
    }

    pub(crate) fn workers(&self) -> usize {
        self.max_workers.max(1)
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
