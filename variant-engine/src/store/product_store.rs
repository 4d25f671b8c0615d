//! ProductStore - the multi-product JSON database
//!
//! One JSON object keyed by base SKU. Records are kept as raw JSON and
//! decoded on access, so a record that fails to decode never blocks the
//! others and is written back byte-for-byte as it was read. Key order is
//! insertion order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use shared::ProductRecord;

use super::recovery::{LoadOutcome, RecoveryChoice, RecoveryPrompt};
use super::snapshot::{SnapshotSelection, latest_database_path, newest_valid_snapshot};
use super::{StoreError, atomic, repair};
use crate::core::DataPaths;
use crate::core::paths::PRODUCT_PREFIX;

const LAST_EXPORT: &str = "last_export";

/// Save behaviour shared by the product store and the cost database
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    pub write_backup: bool,
    pub selection: SnapshotSelection,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            write_backup: true,
            selection: SnapshotSelection::default(),
        }
    }
}

/// Parse a database file body into its product map
fn parse_root(text: &str) -> Result<Map<String, Value>, String> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::NotAnObject.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn read_root(path: &Path) -> Result<Map<String, Value>, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    parse_root(&text).map_err(|reason| StoreError::Corrupted {
        path: path.to_path_buf(),
        reason,
    })
}

pub struct ProductStore {
    path: PathBuf,
    products: Map<String, Value>,
    options: StoreOptions,
    save_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("path", &self.path)
            .field("products", &self.products.len())
            .finish()
    }
}

impl ProductStore {
    /// Open the latest database in the folder
    pub fn open(
        paths: &DataPaths,
        options: StoreOptions,
        save_lock: Arc<Mutex<()>>,
        prompt: &mut dyn RecoveryPrompt,
    ) -> Result<(Self, LoadOutcome), StoreError> {
        let path = latest_database_path(paths, options.selection)?;
        Self::open_file(paths, path, options, save_lock, prompt)
    }

    /// Open a specific database file, repairing or recovering as needed
    pub fn open_file(
        paths: &DataPaths,
        path: PathBuf,
        options: StoreOptions,
        save_lock: Arc<Mutex<()>>,
        prompt: &mut dyn RecoveryPrompt,
    ) -> Result<(Self, LoadOutcome), StoreError> {
        let (path, products, outcome) = Self::load(paths, path, options, prompt)?;
        tracing::info!(
            path = %path.display(),
            products = products.len(),
            outcome = ?outcome,
            "Product store opened"
        );
        Ok((
            Self {
                path,
                products,
                options,
                save_lock,
            },
            outcome,
        ))
    }

    /// Empty store that will save to `path`
    pub fn empty(path: impl Into<PathBuf>, options: StoreOptions, save_lock: Arc<Mutex<()>>) -> Self {
        Self {
            path: path.into(),
            products: Map::new(),
            options,
            save_lock,
        }
    }

    fn load(
        paths: &DataPaths,
        path: PathBuf,
        options: StoreOptions,
        prompt: &mut dyn RecoveryPrompt,
    ) -> Result<(PathBuf, Map<String, Value>, LoadOutcome), StoreError> {
        if !path.exists() {
            return Ok((path, Map::new(), LoadOutcome::Created));
        }

        let text = std::fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
        let reason = match parse_root(&String::from_utf8_lossy(&text)) {
            Ok(map) => return Ok((path, map, LoadOutcome::Loaded)),
            Err(reason) => reason,
        };
        tracing::warn!(path = %path.display(), reason = %reason, "Database file is corrupted, attempting repair");

        if let Some(repaired) = repair::try_repair(&path, options.write_backup)?
            && let Value::Object(map) = repaired.value
        {
            let outcome = LoadOutcome::Repaired {
                dropped: repaired.dropped,
            };
            return Ok((path, map, outcome));
        }

        let snapshot = newest_valid_snapshot(paths.base(), PRODUCT_PREFIX, options.selection)?
            .filter(|s| *s != path);
        match prompt.choose(&path, snapshot.as_deref()) {
            RecoveryChoice::RestoreSnapshot => {
                let from = snapshot.ok_or_else(|| StoreError::NoValidSnapshot(paths.base().to_path_buf()))?;
                let working = paths.working_file();
                std::fs::copy(&from, &working).map_err(|e| StoreError::io(&working, e))?;
                let map = read_root(&working)?;
                tracing::warn!(from = %from.display(), "Restored database from snapshot");
                Ok((working, map, LoadOutcome::Restored { from }))
            }
            RecoveryChoice::StartEmpty => {
                tracing::warn!(path = %path.display(), "Starting with an empty database");
                Ok((path, Map::new(), LoadOutcome::StartedEmpty))
            }
            RecoveryChoice::Abort => Err(StoreError::RecoveryAborted),
        }
    }

    // ========== Queries ==========

    /// File this store was loaded from and saves back to
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.products.contains_key(key)
    }

    /// Base SKUs in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.products.keys().cloned().collect()
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.products.get(key)
    }

    pub fn get(&self, key: &str) -> Result<Option<ProductRecord>, StoreError> {
        self.products
            .get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| StoreError::Decode {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn require(&self, key: &str) -> Result<ProductRecord, StoreError> {
        self.get(key)?
            .ok_or_else(|| StoreError::ProductNotFound(key.to_string()))
    }

    pub fn last_export(&self, key: &str) -> Option<&str> {
        self.products
            .get(key)
            .and_then(|v| v.get(LAST_EXPORT))
            .and_then(Value::as_str)
    }

    // ========== Mutations ==========

    /// Insert or replace a product. A stored `last_export` survives when the
    /// new record has none.
    pub fn put(&mut self, key: &str, record: &ProductRecord) -> Result<(), StoreError> {
        let mut value = serde_json::to_value(record).map_err(StoreError::Encode)?;
        if record.last_export.is_none()
            && let Some(previous) = self.products.get(key).and_then(|v| v.get(LAST_EXPORT)).cloned()
            && let Value::Object(map) = &mut value
        {
            map.insert(LAST_EXPORT.to_string(), previous);
        }
        self.products.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<Value, StoreError> {
        self.products
            .shift_remove(key)
            .ok_or_else(|| StoreError::ProductNotFound(key.to_string()))
    }

    /// Move a product to a new base SKU, keeping its position
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        if !self.products.contains_key(old) {
            return Err(StoreError::ProductNotFound(old.to_string()));
        }
        if old == new {
            return Ok(());
        }
        if self.products.contains_key(new) {
            return Err(StoreError::ProductExists(new.to_string()));
        }

        let products = std::mem::take(&mut self.products);
        for (key, mut value) in products {
            if key == old {
                if let Value::Object(map) = &mut value {
                    map.insert("base_sku".to_string(), Value::String(new.to_string()));
                }
                self.products.insert(new.to_string(), value);
            } else {
                self.products.insert(key, value);
            }
        }
        Ok(())
    }

    /// Stamp `last_export`; a missing product gets a record holding only it
    pub fn touch_last_export(&mut self, key: &str, stamp: &str) {
        let stamp = Value::String(stamp.to_string());
        match self.products.get_mut(key) {
            Some(Value::Object(map)) => {
                map.insert(LAST_EXPORT.to_string(), stamp);
            }
            _ => {
                let mut map = Map::new();
                map.insert(LAST_EXPORT.to_string(), stamp);
                self.products.insert(key.to_string(), Value::Object(map));
            }
        }
    }

    // ========== Persistence ==========

    /// Write the whole store back to [`Self::path`]
    pub fn save(&self) -> Result<(), StoreError> {
        self.write_to(&self.path)
    }

    /// Write a new timestamped snapshot and drop the working copy
    pub fn save_snapshot(&mut self, paths: &DataPaths, stamp: &str) -> Result<PathBuf, StoreError> {
        let target = paths.snapshot_file(stamp);
        self.write_to(&target)?;

        let working = paths.working_file();
        if working.exists() {
            std::fs::remove_file(&working).map_err(|e| StoreError::io(&working, e))?;
        }
        self.path = target.clone();
        tracing::info!(path = %target.display(), "Saved database snapshot");
        Ok(target)
    }

    /// Write to the working copy
    pub fn save_working(&mut self, paths: &DataPaths) -> Result<PathBuf, StoreError> {
        let target = paths.working_file();
        self.write_to(&target)?;
        self.path = target.clone();
        Ok(target)
    }

    fn write_to(&self, target: &Path) -> Result<(), StoreError> {
        let _guard = self.save_lock.lock();
        atomic::write_json(target, &self.products, self.options.write_backup)?;
        tracing::debug!(path = %target.display(), products = self.products.len(), "Database saved");
        Ok(())
    }
}

/// Make `backup` the working copy
pub fn revert_to_backup(paths: &DataPaths, backup: &Path) -> Result<PathBuf, StoreError> {
    if !backup.is_file() {
        return Err(StoreError::SnapshotNotFound(backup.to_path_buf()));
    }
    read_root(backup)?;
    let working = paths.working_file();
    std::fs::copy(backup, &working).map_err(|e| StoreError::io(&working, e))?;
    tracing::info!(from = %backup.display(), "Reverted working database to backup");
    Ok(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::recovery::FixedChoice;
    use shared::Amount;
    use tempfile::TempDir;

    fn open(paths: &DataPaths, choice: RecoveryChoice) -> Result<(ProductStore, LoadOutcome), StoreError> {
        ProductStore::open(
            paths,
            StoreOptions::default(),
            Arc::new(Mutex::new(())),
            &mut FixedChoice(choice),
        )
    }

    fn record(base: &str) -> ProductRecord {
        ProductRecord {
            base_sku: base.to_string(),
            base_price: Amount::new("10"),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let (store, outcome) = open(&paths, RecoveryChoice::Abort).unwrap();
        assert!(store.is_empty());
        assert_eq!(outcome, LoadOutcome::Created);
        assert_eq!(store.path(), paths.fallback_file());
    }

    #[test]
    fn test_put_keeps_last_export() {
        let dir = TempDir::new().unwrap();
        let mut store = ProductStore::empty(
            dir.path().join("db.json"),
            StoreOptions::default(),
            Arc::new(Mutex::new(())),
        );
        store.touch_last_export("A", "2024-01-01 00:00:00");
        assert!(store.get("A").unwrap().unwrap().input_df.is_empty());

        store.put("A", &record("A")).unwrap();
        assert_eq!(store.last_export("A"), Some("2024-01-01 00:00:00"));
        assert_eq!(store.require("A").unwrap().base_price.as_str(), "10");
    }

    #[test]
    fn test_rename_keeps_position_and_refuses_conflicts() {
        let dir = TempDir::new().unwrap();
        let mut store = ProductStore::empty(
            dir.path().join("db.json"),
            StoreOptions::default(),
            Arc::new(Mutex::new(())),
        );
        for key in ["A", "B", "C"] {
            store.put(key, &record(key)).unwrap();
        }

        store.rename("B", "B2").unwrap();
        assert_eq!(store.keys(), vec!["A", "B2", "C"]);
        assert_eq!(store.require("B2").unwrap().base_sku, "B2");

        assert!(matches!(store.rename("A", "C"), Err(StoreError::ProductExists(_))));
        assert!(matches!(store.rename("X", "Y"), Err(StoreError::ProductNotFound(_))));
    }

    #[test]
    fn test_remove_keeps_order() {
        let dir = TempDir::new().unwrap();
        let mut store = ProductStore::empty(
            dir.path().join("db.json"),
            StoreOptions::default(),
            Arc::new(Mutex::new(())),
        );
        for key in ["A", "B", "C"] {
            store.put(key, &record(key)).unwrap();
        }
        store.remove("A").unwrap();
        assert_eq!(store.keys(), vec!["B", "C"]);
        assert!(store.remove("A").is_err());
    }

    #[test]
    fn test_snapshot_save_removes_working_copy() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let (mut store, _) = open(&paths, RecoveryChoice::Abort).unwrap();
        store.put("A", &record("A")).unwrap();

        store.save_working(&paths).unwrap();
        assert!(paths.working_file().exists());

        let snapshot = store.save_snapshot(&paths, "2024-05-01_12-00-00").unwrap();
        assert!(!paths.working_file().exists());
        assert_eq!(store.path(), snapshot);

        let (reopened, outcome) = open(&paths, RecoveryChoice::Abort).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(reopened.path(), snapshot);
        assert_eq!(reopened.keys(), vec!["A"]);
    }

    #[test]
    fn test_undecodable_record_is_preserved() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        std::fs::write(
            paths.working_file(),
            r#"{"A": {"master_df": "not a table"}, "B": {"base_sku": "B"}}"#,
        )
        .unwrap();

        let (store, _) = open(&paths, RecoveryChoice::Abort).unwrap();
        assert!(matches!(store.get("A"), Err(StoreError::Decode { .. })));
        assert_eq!(store.require("B").unwrap().base_sku, "B");

        store.save().unwrap();
        let text = std::fs::read_to_string(paths.working_file()).unwrap();
        assert!(text.contains("\"master_df\": \"not a table\""));
    }

    #[test]
    fn test_revert_to_backup() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let backup = dir.path().join("old.json");
        std::fs::write(&backup, r#"{"OLD": {}}"#).unwrap();

        let working = revert_to_backup(&paths, &backup).unwrap();
        assert_eq!(working, paths.working_file());

        let (store, _) = open(&paths, RecoveryChoice::Abort).unwrap();
        assert_eq!(store.keys(), vec!["OLD"]);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            revert_to_backup(&paths, &missing),
            Err(StoreError::SnapshotNotFound(_))
        ));
    }
}
