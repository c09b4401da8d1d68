//! Per-item pipeline: fetch (with retries) → decode → write

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::decode::{ContentDecoder, DecodedPayload};
use crate::fetch::{FetchError, Fetcher};
use crate::humanize::ByteSize;
use crate::record::{ErrorKind, ResultRecord, WorkItem};

/// Everything a worker task needs, shared across one run
pub(crate) struct ItemContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub decoder: ContentDecoder,
    pub api: ApiConfig,
    pub download_folder: PathBuf,
    pub attempts: u32,
}

/// Drive one item to its terminal record; never fails
pub(crate) async fn process_item(ctx: Arc<ItemContext>, item: WorkItem) -> ResultRecord {
    let id = item.id;

    let Some(url) = ctx.api.url_for(&id) else {
        return ResultRecord::new(id, ErrorKind::UnknownError, "No download endpoint configured");
    };

    let body = match fetch_with_retry(ctx.fetcher.as_ref(), &id, &url, ctx.attempts).await {
        Ok(body) => body,
        Err(e) => return ResultRecord::new(id, e.kind(), e.to_string()),
    };

    let payload = match ctx.decoder.decode(&id, &body) {
        Ok(payload) => payload,
        Err(e) => return ResultRecord::new(id, e.kind(), e.to_string()),
    };

    let stored = payload.stored_name();
    match write_payload(&ctx.download_folder, &stored, &payload).await {
        Ok(WriteOutcome::Written) => {
            let size = ByteSize(payload.bytes.len() as u64);
            ResultRecord::new(id, ErrorKind::Success, format!("{} ({size})", payload.filename))
        }
        Ok(WriteOutcome::Exists) => ResultRecord::new(
            id,
            ErrorKind::AlreadyExists,
            format!("File already exists: {stored}"),
        ),
        Err(e) => {
            warn!(id = %id, file = %stored, error = %e, "Write failed");
            ResultRecord::new(id, ErrorKind::UnknownError, format!("Write failed: {e}"))
        }
    }
}

/// Fixed attempt budget, no backoff; only transient failures are retried
async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    id: &str,
    url: &str,
    attempts: u32,
) -> Result<bytes::Bytes, FetchError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) if e.is_retryable() && attempt < attempts => {
                debug!(id, attempt, max_attempts = attempts, error = %e, "Retrying fetch");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum WriteOutcome {
    Written,
    Exists,
}

/// Write to `.{name}.part` then rename, so the final name only ever
/// appears with complete content
async fn write_payload(
    folder: &Path,
    stored: &str,
    payload: &DecodedPayload,
) -> std::io::Result<WriteOutcome> {
    let target = folder.join(stored);
    if tokio::fs::try_exists(&target).await? {
        return Ok(WriteOutcome::Exists);
    }

    let part = folder.join(format!(".{stored}.part"));
    let result = async {
        let mut file = tokio::fs::File::create(&part).await?;
        file.write_all(&payload.bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&part, &target).await
    }
    .await;

    if let Err(e) = result {
        if let Err(cleanup) = tokio::fs::remove_file(&part).await {
            debug!(file = %part.display(), error = %cleanup, "Temporary file not removed");
        }
        return Err(e);
    }
    Ok(WriteOutcome::Written)
}
