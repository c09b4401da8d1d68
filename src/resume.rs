//! Set of ids already materialised in the output directory
//!
//! Files are named `{id}_{filename}` with the id passed through
//! [`sanitize_component`]. Ids may themselves contain `_`, so every prefix
//! of a file name that ends right before a `_` is a candidate id key.
//! Temporary `.part` files start with a dot and are never counted.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::decode::filename::sanitize_component;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeIndex {
    keys: HashSet<String>,
}

impl ResumeIndex {
    /// Scan `output_dir` once (non-recursive)
    ///
    /// An unreadable or missing directory yields an empty index and a warning.
    pub async fn build(output_dir: &Path) -> Self {
        let mut entries = match tokio::fs::read_dir(output_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %output_dir.display(), "Output directory does not exist yet");
                return Self::default();
            }
            Err(e) => {
                warn!(dir = %output_dir.display(), error = %e, "Cannot scan output directory, resume disabled for this run");
                return Self::default();
            }
        };

        let mut index = Self::default();
        let mut files = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(dir = %output_dir.display(), error = %e, "Directory scan interrupted, using partial index");
                    break;
                }
            };

            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                files += 1;
                index.insert_file_name(name);
            }
        }

        debug!(dir = %output_dir.display(), files, keys = index.keys.len(), "Resume index built");
        index
    }

    fn insert_file_name(&mut self, name: &str) {
        self.keys
            .extend(id_prefixes(name).into_iter().map(str::to_string));
    }

    /// True when a file named `{id}_*` exists for this id
    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains(&sanitize_component(id))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Every `{id}` for which `name` matches `{id}_*`
///
/// `INV_7_doc.pdf` → `["INV", "INV_7"]`; hidden files yield nothing.
pub fn id_prefixes(name: &str) -> Vec<&str> {
    if name.starts_with('.') {
        return Vec::new();
    }
    name.match_indices('_')
        .map(|(at, _)| at)
        .filter(|&at| at > 0 && at + 1 < name.len())
        .map(|at| &name[..at])
        .collect()
}
