//! Atomic file replacement
//!
//! A save is staged in a temp file next to the target, fsynced, and renamed
//! into place. Until the rename the previous file is untouched, so a crash
//! mid-save leaves the old content readable. With backups enabled the
//! previous file is also copied to `<name>.backup` for the duration of the
//! swap.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use super::StoreError;

/// Backup path kept while a save is in flight: `<file>.backup`
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".backup");
    target.with_file_name(name)
}

/// Bytes written and synced to a temp file, not yet visible at the target
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

/// Stage `bytes` for `target` in a temp file in the same directory
pub fn stage(target: &Path, bytes: &[u8]) -> Result<StagedWrite, StoreError> {
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(temp.path(), e))?;

    Ok(StagedWrite {
        temp,
        target: target.to_path_buf(),
    })
}

impl StagedWrite {
    /// Rename the staged file over the target
    pub fn commit(self, keep_backup: bool) -> Result<(), StoreError> {
        let backup = backup_path(&self.target);
        let backed_up = keep_backup && self.target.exists();
        if backed_up {
            std::fs::copy(&self.target, &backup).map_err(|e| StoreError::io(&backup, e))?;
        }

        self.temp
            .persist(&self.target)
            .map_err(|e| StoreError::io(&self.target, e.error))?;

        if backed_up && let Err(e) = std::fs::remove_file(&backup) {
            tracing::warn!(path = %backup.display(), error = %e, "Failed to remove backup after save");
        }
        Ok(())
    }
}

/// Replace `target` with `bytes` atomically
pub fn write_atomic(target: &Path, bytes: &[u8], keep_backup: bool) -> Result<(), StoreError> {
    stage(target, bytes)?.commit(keep_backup)
}

/// Replace `target` with pretty-printed JSON (2-space indent)
pub fn write_json<T: Serialize + ?Sized>(
    target: &Path,
    value: &T,
    keep_backup: bool,
) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value).map_err(StoreError::Encode)?;
    write_atomic(target, &json, keep_backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_json_replaces_file_and_drops_backup() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("db.json");
        std::fs::write(&target, "{\"old\": 1}").unwrap();

        write_json(&target, &json!({"new": 2}), true).unwrap();

        let text = std::fs::read_to_string(&target).unwrap();
        assert_eq!(text, "{\n  \"new\": 2\n}");
        assert!(!backup_path(&target).exists());
    }

    #[test]
    fn test_uncommitted_stage_leaves_old_content() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("db.json");
        std::fs::write(&target, "old").unwrap();

        let staged = stage(&target, b"new").unwrap();
        drop(staged);

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/data/sku_database_temp.json")),
            PathBuf::from("/data/sku_database_temp.json.backup")
        );
    }
}
