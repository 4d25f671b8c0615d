//! Timestamped snapshots and "latest database" selection

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use chrono::NaiveDateTime;
use serde_json::Value;
use shared::util::parse_snapshot_stamp;

use super::StoreError;
use crate::core::DataPaths;
use crate::core::paths::{JSON_SUFFIX, PRODUCT_PREFIX};

/// How the newest snapshot is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotSelection {
    /// By the `YYYY-MM-DD_HH-MM-SS` embedded in the file name
    #[default]
    ByEmbeddedTimestamp,
    /// By filesystem modification time
    ByModifiedTime,
}

impl FromStr for SnapshotSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" | "name" => Ok(Self::ByEmbeddedTimestamp),
            "mtime" | "modified" => Ok(Self::ByModifiedTime),
            other => Err(format!("unknown snapshot selection: {other}")),
        }
    }
}

impl fmt::Display for SnapshotSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByEmbeddedTimestamp => f.write_str("timestamp"),
            Self::ByModifiedTime => f.write_str("mtime"),
        }
    }
}

/// One `<prefix><stamp>.json` file
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub path: PathBuf,
    pub name: String,
    pub stamp: Option<NaiveDateTime>,
    pub modified: Option<SystemTime>,
}

/// Snapshots named `<prefix>*.json` in `dir`, newest first
///
/// Working copies (`*temp*`) are never snapshots. A missing directory has no
/// snapshots.
pub fn list_snapshots(
    dir: &Path,
    prefix: &str,
    selection: SnapshotSelection,
) -> Result<Vec<SnapshotEntry>, StoreError> {
    let reader = match std::fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };

    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(middle) = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(JSON_SUFFIX))
        else {
            continue;
        };
        if middle.contains("temp") {
            continue;
        }
        let stamp = parse_snapshot_stamp(middle);
        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        entries.push(SnapshotEntry {
            path: entry.path(),
            name,
            stamp,
            modified,
        });
    }

    match selection {
        SnapshotSelection::ByEmbeddedTimestamp => entries.sort_by(|a, b| {
            (b.stamp.is_some(), b.stamp, &b.name).cmp(&(a.stamp.is_some(), a.stamp, &a.name))
        }),
        SnapshotSelection::ByModifiedTime => {
            entries.sort_by(|a, b| (b.modified, &b.name).cmp(&(a.modified, &a.name)))
        }
    }
    Ok(entries)
}

/// File the product store reads and writes by default
///
/// The working copy wins when present, then the newest snapshot, then the
/// fallback `sku_database.json`.
pub fn latest_database_path(
    paths: &DataPaths,
    selection: SnapshotSelection,
) -> Result<PathBuf, StoreError> {
    let working = paths.working_file();
    if working.exists() {
        return Ok(working);
    }
    Ok(list_snapshots(paths.base(), PRODUCT_PREFIX, selection)?
        .into_iter()
        .next()
        .map(|e| e.path)
        .unwrap_or_else(|| paths.fallback_file()))
}

/// Newest snapshot that is non-empty and parses to a non-empty object
pub fn newest_valid_snapshot(
    dir: &Path,
    prefix: &str,
    selection: SnapshotSelection,
) -> Result<Option<PathBuf>, StoreError> {
    for entry in list_snapshots(dir, prefix, selection)? {
        if is_valid_snapshot(&entry.path) {
            return Ok(Some(entry.path));
        }
        tracing::debug!(path = %entry.path.display(), "Skipping invalid snapshot");
    }
    Ok(None)
}

fn is_valid_snapshot(path: &Path) -> bool {
    let Ok(text) = std::fs::read_to_string(path) else {
        return false;
    };
    if text.trim().is_empty() {
        return false;
    }
    matches!(serde_json::from_str::<Value>(&text), Ok(Value::Object(map)) if !map.is_empty())
}
