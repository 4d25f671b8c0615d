//! Time helpers shared by the store, snapshots and cloud sync

use chrono::{DateTime, Local, NaiveDateTime};

/// Snapshot filename timestamp, e.g. `2024-03-01_14-05-09`
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `last_export` field format, e.g. `2024-03-01 14:05:09`
pub const LAST_EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Export directory name under `Excel Exports/`, e.g. `03-01-24_14-05`
pub const EXPORT_DIR_FORMAT: &str = "%m-%d-%y_%H-%M";

/// Local time formatted for snapshot filenames
pub fn snapshot_stamp(at: DateTime<Local>) -> String {
    at.format(SNAPSHOT_TIMESTAMP_FORMAT).to_string()
}

/// Local time formatted for `last_export`
pub fn last_export_stamp(at: DateTime<Local>) -> String {
    at.format(LAST_EXPORT_FORMAT).to_string()
}

/// Local time formatted for an export directory name
pub fn export_dir_stamp(at: DateTime<Local>) -> String {
    at.format(EXPORT_DIR_FORMAT).to_string()
}

/// Parse a snapshot filename timestamp
pub fn parse_snapshot_stamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, SNAPSHOT_TIMESTAMP_FORMAT).ok()
}
