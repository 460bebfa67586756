//! Recently loaded files.
//!
//! [`FileHistory`] keeps up to [`DEFAULT_HISTORY_CAPACITY`] datasets, newest
//! first, so a previous upload can be reopened without reading the file again.
//! The whole history is persisted as one JSON document.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::dataset::{Dataset, Row};
use crate::error::{ErrorContext, Result};

pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// A dataset remembered together with where and when it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub file_name: String,
    pub upload_timestamp: DateTime<Utc>,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub column_count: usize,
}

impl HistoryEntry {
    /// Captures a copy of a dataset under the given id.
    pub fn from_dataset(
        id: impl Into<String>,
        file_name: impl Into<String>,
        dataset: &Dataset,
        upload_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            upload_timestamp,
            columns: dataset.columns().to_vec(),
            rows: dataset.rows().to_vec(),
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
        }
    }

    /// Rebuilds the dataset this entry was captured from.
    pub fn to_dataset(&self) -> Result<Dataset> {
        Dataset::new(self.columns.clone(), self.rows.clone())
    }

    /// Relative age of the upload, e.g. "5 mins ago".
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        format_relative(self.upload_timestamp, now)
    }
}

/// Bounded, most-recent-first list of loaded files.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
    next_seq: u64,
}

impl Default for FileHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl FileHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            next_seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a dataset as the newest entry and returns it.
    ///
    /// Re-adding the same file creates a second entry. The oldest entry is
    /// evicted once the history is full. A zero-capacity history keeps
    /// nothing and returns `None`.
    pub fn add(&mut self, file_name: impl Into<String>, dataset: &Dataset) -> Option<&HistoryEntry> {
        self.add_at(file_name, dataset, Utc::now())
    }

    /// Like [`add`](Self::add) with an explicit timestamp.
    pub fn add_at(
        &mut self,
        file_name: impl Into<String>,
        dataset: &Dataset,
        timestamp: DateTime<Utc>,
    ) -> Option<&HistoryEntry> {
        let id = format!("{}-{}", timestamp.timestamp_millis(), self.next_seq);
        self.next_seq += 1;
        self.push_front(HistoryEntry::from_dataset(id, file_name, dataset, timestamp))
    }

    fn push_front(&mut self, entry: HistoryEntry) -> Option<&HistoryEntry> {
        if self.capacity == 0 {
            debug!(id = %entry.id, "History capacity is zero, not storing entry");
            return None;
        }
        debug!(id = %entry.id, file = %entry.file_name, "Adding history entry");
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                debug!(id = %evicted.id, "Evicted history entry");
            }
        }
        self.entries.front()
    }

    /// Removes an entry by id.
    pub fn remove(&mut self, id: &str) -> Option<HistoryEntry> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        self.entries.remove(position)
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a history file. A missing file yields an empty history.
    ///
    /// Entries beyond the capacity are dropped, oldest first.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref();
        let mut history = Self::with_capacity(capacity);

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history file yet");
                return Ok(history);
            }
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<HistoryEntry> = serde_json::from_slice(&bytes)?;
        history.next_seq = next_sequence(&entries);
        history.entries = entries.into_iter().take(capacity).collect();

        info!(entries = history.len(), "Loaded file history");
        Ok(history)
    }

    /// Writes the history as a JSON array, newest first.
    #[instrument(skip_all, fields(path = %path.as_ref().display(), entries = self.len()))]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Creating history directory {}", parent.display()))?;
        }

        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        let json = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(path, json).await?;

        info!("Saved file history");
        Ok(())
    }
}

/// One past the largest `-{seq}` suffix among stored ids.
fn next_sequence(entries: &[HistoryEntry]) -> u64 {
    entries
        .iter()
        .filter_map(|e| e.id.rsplit_once('-')?.1.parse::<u64>().ok())
        .max()
        .map_or(0, |seq| seq + 1)
}

/// Formats how long ago `timestamp` was, relative to `now`.
///
/// Under a minute reads "Just now", then minutes, hours and days (up to six)
/// with plural suffixes. Older timestamps fall back to a short date such as
/// "Mar 4", with the year appended when it differs from `now`'s.
pub fn format_relative(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (now - timestamp).num_milliseconds();
    let mins = diff_ms.div_euclid(MINUTE_MS);
    let hours = diff_ms.div_euclid(HOUR_MS);
    let days = diff_ms.div_euclid(DAY_MS);

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{mins} min{} ago", plural(mins))
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else if days < 7 {
        format!("{days} day{} ago", plural(days))
    } else if timestamp.year() != now.year() {
        timestamp.format("%b %-d, %Y").to_string()
    } else {
        timestamp.format("%b %-d").to_string()
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}
