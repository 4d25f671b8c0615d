//! DataPaths - database folder layout
//!
//! ```text
//! {database_folder}/
//! ├── sku_database_temp.json            # working copy (wins when present)
//! ├── sku_database_<timestamp>.json     # saved snapshots
//! ├── sku_database.json                 # fallback when nothing else exists
//! ├── cost_db.json                      # part number -> price
//! ├── cost_db_<timestamp>.json          # cost snapshots (cloud pulls)
//! └── Excel Exports/
//!     └── <mm-dd-yy_HH-MM>/<base sku>.csv
//! ```

use std::path::{Path, PathBuf};

pub const PRODUCT_PREFIX: &str = "sku_database_";
pub const COST_PREFIX: &str = "cost_db_";
pub const JSON_SUFFIX: &str = ".json";
pub const WORKING_FILE: &str = "sku_database_temp.json";
pub const FALLBACK_FILE: &str = "sku_database.json";
pub const COST_FILE: &str = "cost_db.json";
pub const EXPORTS_DIR: &str = "Excel Exports";

/// Database folder path manager
#[derive(Debug, Clone)]
pub struct DataPaths {
    base: PathBuf,
}

impl DataPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Working copy: {base}/sku_database_temp.json
    pub fn working_file(&self) -> PathBuf {
        self.base.join(WORKING_FILE)
    }

    /// Fallback store: {base}/sku_database.json
    pub fn fallback_file(&self) -> PathBuf {
        self.base.join(FALLBACK_FILE)
    }

    /// Snapshot: {base}/sku_database_{stamp}.json
    pub fn snapshot_file(&self, stamp: &str) -> PathBuf {
        self.base.join(format!("{PRODUCT_PREFIX}{stamp}{JSON_SUFFIX}"))
    }

    /// Cost database: {base}/cost_db.json
    pub fn cost_file(&self) -> PathBuf {
        self.base.join(COST_FILE)
    }

    /// Exports root: {base}/Excel Exports/
    pub fn exports_dir(&self) -> PathBuf {
        self.base.join(EXPORTS_DIR)
    }

    /// One export run: {base}/Excel Exports/{stamp}/
    pub fn export_run_dir(&self, stamp: &str) -> PathBuf {
        self.exports_dir().join(stamp)
    }

    /// Create the database folder if missing
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)
    }
}
