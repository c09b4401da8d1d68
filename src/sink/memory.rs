use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::{Result, ResultSink, SinkError};
use crate::record::{BatchSummary, ResultRecord};

/// Keeps records in memory; used by tests and embedders
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ResultRecord>>,
    summary: Mutex<Option<BatchSummary>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ResultRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> Option<BatchSummary> {
        self.summary.lock().ok().and_then(|summary| summary.clone())
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn append(&self, record: &ResultRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(record.clone());
        Ok(())
    }

    async fn finish(&self, summary: &BatchSummary, _elapsed: Duration) -> Result<()> {
        *self.summary.lock().map_err(|_| SinkError::Poisoned)? = Some(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ErrorKind;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concurrent_appends() {
        let sink = Arc::new(MemorySink::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                let record = ResultRecord::new(i.to_string(), ErrorKind::Success, "ok");
                sink.append(&record).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(sink.records().len(), 32);
        assert!(sink.summary().is_none());
    }
}
