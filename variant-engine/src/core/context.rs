use std::path::PathBuf;
use std::sync::Arc;

use cloud_client::{ClientConfig, HelperClient};
use parking_lot::Mutex;

use crate::core::{Config, DataPaths};
use crate::store::{StoreError, StoreOptions};
use crate::{AppError, AppResult};

/// Application context - everything a workflow needs, created once at startup
///
/// Cheap to clone: all shared parts sit behind `Arc`.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | settings (immutable) |
/// | paths | DataPaths | database folder layout |
/// | save_lock | Mutex<()> | serializes every file save |
/// | cloud | Option<HelperClient> | helper service client, absent when it failed to build |
#[derive(Clone)]
pub struct AppContext {
    config: Arc<Config>,
    paths: DataPaths,
    save_lock: Arc<Mutex<()>>,
    cloud: Option<HelperClient>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("database_folder", &self.paths.base())
            .field("cloud", &self.cloud.as_ref().map(|c| c.base_url()))
            .finish()
    }
}

impl AppContext {
    /// Resolve the database folder, create it, and build the cloud client
    pub fn new(config: Config) -> AppResult<Self> {
        let folder = config.database_folder()?;
        let cloud = match ClientConfig::new(config.cloud_service_url.clone())
            .with_timeout(config.cloud_timeout_secs)
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "Cloud helper client unavailable");
                None
            }
        };
        Self::build(config, folder, cloud)
    }

    /// Context on an explicit folder without a cloud client
    pub fn local(config: Config, folder: impl Into<PathBuf>) -> AppResult<Self> {
        Self::build(config, folder.into(), None)
    }

    /// Replace the cloud client (tests point this at a mock service)
    pub fn with_cloud(mut self, client: HelperClient) -> Self {
        self.cloud = Some(client);
        self
    }

    fn build(config: Config, folder: PathBuf, cloud: Option<HelperClient>) -> AppResult<Self> {
        let paths = DataPaths::new(folder);
        paths
            .ensure_dirs()
            .map_err(|e| StoreError::io(paths.base(), e))?;
        tracing::debug!(folder = %paths.base().display(), "Database folder ready");

        Ok(Self {
            config: Arc::new(config),
            paths,
            save_lock: Arc::new(Mutex::new(())),
            cloud,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    /// Lock shared by every store and cost-database save
    pub fn save_lock(&self) -> Arc<Mutex<()>> {
        self.save_lock.clone()
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            write_backup: self.config.write_backup,
            selection: self.config.snapshot_selection,
        }
    }

    pub fn cloud(&self) -> AppResult<&HelperClient> {
        self.cloud.as_ref().ok_or(AppError::CloudUnavailable)
    }
}
