//! Persistence of completed searches
//!
//! Every search is written twice under the data directory:
//! `json/<stem>.json` (structured record) and, when there are results,
//! `csv/<stem>.csv` (tabular record). Records are never updated or removed.

mod csv;

pub use self::csv::{flatten, Table, SPEC_PREFIX};

use crate::results::SearchResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const JSON_EXT: &str = "json";
const CSV_EXT: &str = "csv";
/// Longest query part of a record filename, in bytes
const MAX_STEM_QUERY_BYTES: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read search record {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where one search was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaths {
    pub json_path: PathBuf,
    /// `None` when there were no results to tabulate
    pub csv_path: Option<PathBuf>,
}

/// Summary of one stored search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub query: String,
    pub timestamp: String,
    pub result_count: usize,
}

#[derive(Serialize)]
struct RecordRef<'a> {
    query: &'a str,
    timestamp: String,
    results: &'a [SearchResult],
}

/// Read side keeps results untyped so hand-edited listings still count
#[derive(Deserialize)]
struct StoredRecord {
    query: String,
    timestamp: String,
    results: Vec<serde_json::Value>,
}

/// File-backed store for search records
#[derive(Debug, Clone)]
pub struct Storage {
    json_dir: PathBuf,
    csv_dir: PathBuf,
}

impl Storage {
    /// Open the store, creating `json/` and `csv/` under `data_dir` if needed
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref();
        let json_dir = data_dir.join(JSON_EXT);
        let csv_dir = data_dir.join(CSV_EXT);

        for dir in [&json_dir, &csv_dir] {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }

        Ok(Self { json_dir, csv_dir })
    }

    pub fn json_dir(&self) -> &Path {
        &self.json_dir
    }

    pub fn csv_dir(&self) -> &Path {
        &self.csv_dir
    }

    /// Write the structured record and, for non-empty results, the tabular record.
    ///
    /// Both files share one stem. If the stem is already taken a counter
    /// suffix is appended rather than overwriting an earlier search.
    pub async fn save_results(
        &self,
        query: &str,
        results: &[SearchResult],
    ) -> Result<SavedPaths, StorageError> {
        let now = Utc::now();
        let record = RecordRef {
            query,
            timestamp: now.to_rfc3339(),
            results,
        };
        let body = serde_json::to_vec_pretty(&record).map_err(|e| StorageError::Json {
            path: self.json_dir.clone(),
            source: e,
        })?;

        let (stem, json_path, mut file) = self.create_record_file(&base_stem(query, now)).await?;
        file.write_all(&body)
            .await
            .map_err(|e| StorageError::io(&json_path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::io(&json_path, e))?;
        debug!("Wrote structured record {}", json_path.display());

        let csv_path = if results.is_empty() {
            None
        } else {
            let path = self.csv_dir.join(format!("{}.{}", stem, CSV_EXT));
            fs::write(&path, flatten(results).to_csv())
                .await
                .map_err(|e| StorageError::io(&path, e))?;
            debug!("Wrote tabular record {}", path.display());
            Some(path)
        };

        info!("Saved {} results for '{}' as {}", results.len(), query, stem);
        Ok(SavedPaths {
            json_path,
            csv_path,
        })
    }

    async fn create_record_file(
        &self,
        base: &str,
    ) -> Result<(String, PathBuf, fs::File), StorageError> {
        let mut n = 0u32;
        loop {
            let stem = if n == 0 {
                base.to_string()
            } else {
                format!("{}_{}", base, n)
            };
            let path = self.json_dir.join(format!("{}.{}", stem, JSON_EXT));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((stem, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(StorageError::io(&path, e)),
            }
        }
    }

    /// Summaries of the `limit` most recently created structured records, newest first.
    ///
    /// A record that cannot be read or parsed fails the whole listing.
    pub async fn get_recent_searches(&self, limit: usize) -> Result<Vec<RecentSearch>, StorageError> {
        let mut entries = fs::read_dir(&self.json_dir)
            .await
            .map_err(|e| StorageError::io(&self.json_dir, e))?;

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.json_dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(JSON_EXT) {
                continue;
            }
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StorageError::io(&path, e))?;
            if !meta.is_file() {
                continue;
            }
            // Not every filesystem records birth time
            let created = meta
                .created()
                .or_else(|_| meta.modified())
                .map_err(|e| StorageError::io(&path, e))?;
            files.push((created, path));
        }

        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        files.truncate(limit);

        let mut recent = Vec::with_capacity(files.len());
        for (_, path) in files {
            let bytes = fs::read(&path)
                .await
                .map_err(|e| StorageError::io(&path, e))?;
            let record: StoredRecord =
                serde_json::from_slice(&bytes).map_err(|e| StorageError::Json {
                    path: path.clone(),
                    source: e,
                })?;
            recent.push(RecentSearch {
                query: record.query,
                timestamp: record.timestamp,
                result_count: record.results.len(),
            });
        }

        Ok(recent)
    }
}

/// Filesystem-safe form of a query: letters, digits, spaces, `-` and `_`
/// are kept, the rest dropped; ends trimmed; spaces become underscores.
pub fn sanitize_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// `<sanitized query>_<YYYYMMDD_HHMMSS>`, the query part cut to at most
/// 100 bytes on a char boundary
pub fn base_stem(query: &str, at: DateTime<Utc>) -> String {
    let sanitized = sanitize_query(query);
    let mut end = sanitized.len().min(MAX_STEM_QUERY_BYTES);
    while !sanitized.is_char_boundary(end) {
        end -= 1;
    }
    let prefix = sanitized[..end].trim_end_matches('_');
    format!("{}_{}", prefix, at.format("%Y%m%d_%H%M%S"))
}
