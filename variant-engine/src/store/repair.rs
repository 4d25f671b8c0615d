//! Truncation repair for half-written JSON files
//!
//! A file cut off mid-write usually still holds a complete document up to
//! its last closing bracket; anything after it is dropped.

use std::path::Path;

use serde_json::Value;

use super::{StoreError, atomic};

/// Outcome of a successful repair
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub value: Value,
    /// Bytes dropped from the end of the file
    pub dropped: usize,
}

/// Cut `bytes` after their last `}` or `]` and parse what remains
///
/// Works on raw bytes so the tail may hold anything, including invalid
/// UTF-8; the kept head must itself be valid JSON.
pub fn truncate_and_parse(bytes: &[u8]) -> Option<(Value, usize)> {
    let cut = bytes.iter().rposition(|&b| b == b'}' || b == b']')?;
    let head = &bytes[..=cut];
    serde_json::from_slice(head)
        .ok()
        .map(|value| (value, bytes.len() - head.len()))
}

/// Try to repair `path` in place
///
/// Returns `Ok(None)` when the content cannot be salvaged; the file is then
/// left as it was. The kept bytes are written back unchanged.
pub fn try_repair(path: &Path, keep_backup: bool) -> Result<Option<Repaired>, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;

    let Some((value, dropped)) = truncate_and_parse(&bytes) else {
        tracing::warn!(path = %path.display(), "JSON repair failed");
        return Ok(None);
    };

    atomic::write_atomic(path, &bytes[..bytes.len() - dropped], keep_backup)?;
    tracing::warn!(path = %path.display(), dropped, "Repaired truncated JSON file");
    Ok(Some(Repaired { value, dropped }))
}
