//! Destinations for finished records
//!
//! The coordinator appends every terminal record exactly once, in completion
//! order. Implementations must tolerate concurrent `append` calls.

mod files;
mod memory;

pub use files::{CSV_HEADER, FileSink, RunHeader};
pub use memory::MemorySink;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::record::{BatchSummary, ResultRecord};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sink lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, SinkError>;

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist one terminal record
    async fn append(&self, record: &ResultRecord) -> Result<()>;

    /// Called once after the last record of a run
    async fn finish(&self, _summary: &BatchSummary, _elapsed: Duration) -> Result<()> {
        Ok(())
    }
}
