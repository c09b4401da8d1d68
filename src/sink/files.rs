//! Text + CSV run logs on disk

use async_trait::async_trait;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{Result, ResultSink, SinkError};
use crate::humanize::HumanDuration;
use crate::record::{BatchSummary, ResultRecord};

/// Column names of the structured log
pub const CSV_HEADER: [&str; 5] = ["ID", "STATUS", "ERROR_KIND", "MESSAGE", "TIMESTAMP"];

/// Context written at the top of the text log
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub run_id: Uuid,
    pub source: String,
    pub total: usize,
    pub max_workers: usize,
    pub batch_size: usize,
    pub delay_between_batches: f64,
}

struct Writers {
    text: BufWriter<File>,
    csv: csv::Writer<File>,
}

/// Appends one line per record to `download_log_*.txt` and one row to
/// `download_detailed_*.csv`; both are flushed after every record
pub struct FileSink {
    text_path: PathBuf,
    csv_path: PathBuf,
    writers: Mutex<Writers>,
}

impl FileSink {
    pub fn create(log_folder: &Path, header: &RunHeader) -> Result<Self> {
        fs::create_dir_all(log_folder)?;

        // v7 ids share their leading timestamp bits; the tail is random
        let run_id = header.run_id.simple().to_string();
        let stamp = format!(
            "{}_{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            &run_id[run_id.len() - 8..]
        );
        let text_path = log_folder.join(format!("download_log_{stamp}.txt"));
        let csv_path = log_folder.join(format!("download_detailed_{stamp}.csv"));

        let mut text = BufWriter::new(File::create(&text_path)?);
        writeln!(text, "=== DOCFETCH DOWNLOAD LOG ===")?;
        writeln!(text, "Run: {}", header.run_id)?;
        writeln!(text, "Started: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(text, "Source: {}", header.source)?;
        writeln!(text, "Files to process: {}", header.total)?;
        writeln!(
            text,
            "Config: {} workers, {} batch size, {}s delay",
            header.max_workers, header.batch_size, header.delay_between_batches
        )?;
        writeln!(text, "=== DOWNLOAD RESULTS ===")?;
        text.flush()?;

        let csv_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&csv_path)?;
        let mut csv = csv::Writer::from_writer(csv_file);
        csv.write_record(CSV_HEADER)?;
        csv.flush()?;

        info!(text = %text_path.display(), csv = %csv_path.display(), "Run logs created");

        Ok(Self {
            text_path,
            csv_path,
            writers: Mutex::new(Writers { text, csv }),
        })
    }

    pub fn text_path(&self) -> &Path {
        &self.text_path
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

#[async_trait]
impl ResultSink for FileSink {
    async fn append(&self, record: &ResultRecord) -> Result<()> {
        let mut writers = self.writers.lock().map_err(|_| SinkError::Poisoned)?;

        writeln!(
            writers.text,
            "{},{},{},{}",
            record.timestamp.format("%H:%M:%S"),
            record.id,
            record.status,
            record.message
        )?;
        writers.text.flush()?;

        let timestamp = record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        writers.csv.write_record([
            record.id.as_str(),
            record.status.as_str(),
            record.kind.as_str(),
            record.message.as_str(),
            timestamp.as_str(),
        ])?;
        writers.csv.flush()?;

        Ok(())
    }

    async fn finish(&self, summary: &BatchSummary, elapsed: Duration) -> Result<()> {
        let mut writers = self.writers.lock().map_err(|_| SinkError::Poisoned)?;
        let text = &mut writers.text;

        writeln!(text)?;
        writeln!(text, "=== FINAL SUMMARY ===")?;
        writeln!(text, "Duration: {}", HumanDuration(elapsed))?;
        writeln!(text, "Processed: {}", summary.total)?;
        writeln!(text, "Success: {}", summary.successful)?;
        writeln!(text, "Failed: {}", summary.failed)?;
        writeln!(text, "Skipped: {}", summary.skipped)?;
        if summary.total > 0 {
            writeln!(text, "Success rate: {:.2}%", summary.success_rate)?;
        }

        let breakdown = summary.error_breakdown();
        if !breakdown.is_empty() {
            writeln!(text)?;
            writeln!(text, "Error breakdown:")?;
            for (kind, count) in breakdown {
                writeln!(text, "  {kind}: {count}")?;
            }
        }
        text.flush()?;

        Ok(())
    }
}
