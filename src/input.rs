//! Where work items come from: literal lists, CSV columns, a previous
//! run's log, or the API's list endpoint

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::decode::{JsonPath, PathError};
use crate::fetch::{FetchError, Fetcher};
use crate::record::{ErrorKind, Status, WorkItem};
use crate::sink::CSV_HEADER;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read CSV {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: String, column: String },

    #[error("No list_endpoint configured")]
    NoListEndpoint,

    #[error("List endpoint request failed: {0}")]
    ListFetch(#[from] FetchError),

    #[error("List endpoint returned invalid JSON: {0}")]
    ListJson(#[from] serde_json::Error),

    #[error("List endpoint response: {0}")]
    ListPath(#[from] PathError),

    #[error("List endpoint response at '{0}' is not an array")]
    NotAnArray(String),
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Trimmed, non-empty ids in input order
pub fn ids_from_list<I, S>(values: I) -> Vec<WorkItem>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .map(WorkItem::from)
        .collect()
}

/// Read `column` from a header CSV; `start_line` is 1-indexed over data rows
pub fn ids_from_csv(path: &Path, column: &str, start_line: Option<usize>) -> Result<Vec<WorkItem>> {
    let shown = path.display().to_string();
    let csv_err = |source| InputError::Csv {
        path: shown.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let index = column_index(reader.headers().map_err(csv_err)?, column).ok_or_else(|| {
        InputError::MissingColumn {
            path: shown.clone(),
            column: column.to_string(),
        }
    })?;

    let skip = start_line.unwrap_or(1).saturating_sub(1);
    let mut values = Vec::new();
    for row in reader.records().skip(skip) {
        let row = row.map_err(csv_err)?;
        if let Some(value) = row.get(index) {
            values.push(value.to_string());
        }
    }

    let items = ids_from_list(values);
    info!(path = %shown, column, count = items.len(), "Loaded ids from CSV");
    Ok(items)
}

/// Failed entries of a previous run's structured log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailedLog {
    pub items: Vec<WorkItem>,
    /// Recorded `ERROR_KIND` of the failed ids
    pub kinds: BTreeMap<ErrorKind, usize>,
}

/// Ids recorded as `FAILED` and never as succeeded in a structured run log
pub fn failed_ids_from_log(path: &Path) -> Result<Vec<WorkItem>> {
    let log = read_failed_log(path)?;
    let kinds: Vec<String> = log
        .kinds
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect();
    info!(
        path = %path.display(),
        count = log.items.len(),
        kinds = %kinds.join(","),
        "Loaded failed ids from run log"
    );
    Ok(log.items)
}

pub fn read_failed_log(path: &Path) -> Result<FailedLog> {
    let shown = path.display().to_string();
    let csv_err = |source| InputError::Csv {
        path: shown.clone(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let missing = |column: &str| InputError::MissingColumn {
        path: shown.clone(),
        column: column.to_string(),
    };
    let id_index = column_index(&headers, CSV_HEADER[0]).ok_or_else(|| missing(CSV_HEADER[0]))?;
    let status_index =
        column_index(&headers, CSV_HEADER[1]).ok_or_else(|| missing(CSV_HEADER[1]))?;
    let kind_index = column_index(&headers, CSV_HEADER[2]);

    let mut failed: Vec<(String, Option<ErrorKind>)> = Vec::new();
    let mut succeeded = HashSet::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let (Some(id), Some(status)) = (row.get(id_index), row.get(status_index)) else {
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        if status.trim() != Status::Failed.as_str() {
            succeeded.insert(id.to_string());
            continue;
        }

        let kind = kind_index.and_then(|i| row.get(i)).and_then(|raw| {
            raw.parse::<ErrorKind>()
                .map_err(|e| warn!(path = %shown, id, error = %e, "Ignoring error kind"))
                .ok()
        });
        failed.push((id.to_string(), kind));
    }

    let mut log = FailedLog::default();
    for (id, kind) in failed {
        if succeeded.contains(&id) {
            continue;
        }
        if let Some(kind) = kind {
            *log.kinds.entry(kind).or_insert(0) += 1;
        }
        log.items.push(WorkItem::from(id));
    }
    Ok(log)
}

/// Drop repeated ids, keeping the first occurrence
pub fn dedupe(items: Vec<WorkItem>) -> Vec<WorkItem> {
    let before = items.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<WorkItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    if unique.len() < before {
        warn!(
            duplicates = before - unique.len(),
            "Duplicate ids removed from input"
        );
    }
    unique
}

/// Ask the API for the id list (`list_endpoint` → `list_path` → `id_field`)
pub async fn list_ids(fetcher: &dyn Fetcher, api: &ApiConfig) -> Result<Vec<WorkItem>> {
    let endpoint = api
        .list_endpoint
        .as_deref()
        .ok_or(InputError::NoListEndpoint)?;

    info!(endpoint, "Fetching id list");
    let body = fetcher.fetch(endpoint).await?;
    let json: Value = serde_json::from_slice(&body)?;

    let list_path = JsonPath::parse(&api.list_path)?;
    let entries = list_path
        .resolve(&json)?
        .as_array()
        .ok_or_else(|| InputError::NotAnArray(api.list_path.clone()))?;

    let id_path = JsonPath::parse(&api.id_field)?;
    let ids = entries.iter().filter_map(|entry| {
        match id_path.lookup(entry)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    });

    let items = ids_from_list(ids);
    info!(endpoint, count = items.len(), "Id list fetched");
    Ok(items)
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
}
